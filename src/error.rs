//! HEVC decoder error types.

use thiserror::Error;

/// Result type for HEVC decoding operations.
pub type Result<T> = std::result::Result<T, HevcError>;

/// HEVC decoding errors.
#[derive(Error, Debug)]
pub enum HevcError {
    /// Unexpected end of data.
    #[error("Unexpected end of data at position {0}")]
    UnexpectedEof(u64),

    /// Invalid data encountered: malformed syntax, a reserved field
    /// that did not hold its required value, or an id outside the
    /// range the active parameter-set capacity allows.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A feature was signalled in the bitstream that this decoder
    /// does not implement (e.g. chroma format other than 4:2:0, bit
    /// depth above 10, long-term reference pictures, HRD parameters,
    /// scaling lists, in-slice reference list modification).
    #[error("Unsupported stream feature: {0}")]
    UnsupportedStream(String),

    /// Insufficient data for operation.
    #[error("Insufficient data: expected {expected} bytes, got {actual}")]
    InsufficientData { expected: usize, actual: usize },

    /// Allocation of a picture-sized array or parameter-set table
    /// was refused because it would exceed configured limits.
    #[error("Out of memory: {0}")]
    OutOfMemory(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error at specific offset.
    #[error("Parse error at offset {offset}: {message}")]
    Parse { offset: u64, message: String },
}

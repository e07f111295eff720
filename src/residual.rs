//! Transform-unit residual coefficient decoding (clause 7.3.8.11).
//!
//! Coefficients are coded back-to-front in 4x4 sub-blocks: the last
//! significant position is signalled explicitly, then each sub-block
//! from that point back to the DC sub-block contributes a
//! `coded_sub_block_flag`, per-position `sig_coeff_flag`s, up to eight
//! `coeff_abs_level_greater1_flag`s, one `coeff_abs_level_greater2_flag`,
//! sign bits and Golomb-Rice-coded remaining magnitudes.

use crate::cabac::{CabacContexts, CabacDecoder};
use crate::error::{HevcError, Result};
use crate::scan::{scan_order_positions, ScanOrder};

/// Running state threaded across the sub-blocks of a single
/// transform unit's residual coding, mirroring the variables the
/// syntax table carries from one sub-block to the next
/// (`greater1Ctx` bookkeeping and the running count of sign-hidden
/// sub-blocks).
pub struct CoefficientGroupState {
    /// Context set selector for `coeff_abs_level_greater1_flag`,
    /// updated at the start of every sub-block from the previous
    /// sub-block's outcome.
    pub greater1_ctx_set: usize,
    /// Whether the previous sub-block decoded a value greater than 1
    /// (drives the next sub-block's context set).
    pub last_greater1_found: bool,
    pub sub_block_index: i32,
    /// Rice parameter for `coeff_abs_level_remaining`, reset at the
    /// start of every sub-block and adapted as levels are decoded.
    pub c_rice_param: u32,
}

impl CoefficientGroupState {
    fn new() -> Self {
        Self {
            greater1_ctx_set: 0,
            last_greater1_found: false,
            sub_block_index: 0,
            c_rice_param: 0,
        }
    }

    fn enter_sub_block(&mut self, is_luma: bool, sub_block_idx_in_scan: i32) {
        self.greater1_ctx_set = if sub_block_idx_in_scan == 0 || !is_luma { 0 } else { 2 };
        if self.last_greater1_found {
            self.greater1_ctx_set += 1;
        }
        self.last_greater1_found = false;
        self.c_rice_param = 0;
    }
}

/// Decode one transform unit's residual into a `2^log2_size` square,
/// row-major, dequantized-ready coefficient buffer (caller applies
/// `transform::dequantize_coefficient` and the inverse transform).
#[allow(clippy::too_many_arguments)]
pub fn decode_residual(
    cabac: &mut CabacDecoder,
    contexts: &mut CabacContexts,
    log2_size: u32,
    is_luma: bool,
    scan_order: ScanOrder,
    sign_data_hiding_enabled: bool,
) -> Result<Vec<i32>> {
    let size = 1usize << log2_size;
    let mut coeffs = vec![0i32; size * size];

    let last_x = decode_last_sig_coeff_prefix_suffix(cabac, contexts, log2_size, is_luma, true)?;
    let last_y = decode_last_sig_coeff_prefix_suffix(cabac, contexts, log2_size, is_luma, false)?;
    let (last_x, last_y) = if scan_order == ScanOrder::Vertical {
        (last_y, last_x)
    } else {
        (last_x, last_y)
    };

    let sub_block_size = 4usize;
    let num_sub_blocks_side = size / sub_block_size;
    let sub_block_positions =
        scan_order_positions(num_sub_blocks_side.trailing_zeros(), scan_order);
    let in_block_positions = scan_order_positions(2, scan_order);

    let last_sub_block_x = last_x as usize / sub_block_size;
    let last_sub_block_y = last_y as usize / sub_block_size;
    let last_scan_idx = sub_block_positions
        .iter()
        .position(|&(x, y)| x as usize == last_sub_block_x && y as usize == last_sub_block_y)
        .ok_or_else(|| HevcError::InvalidData("last significant position outside scan".into()))?;

    let mut coded_sub_block_flags = vec![false; num_sub_blocks_side * num_sub_blocks_side];
    let mut state = CoefficientGroupState::new();

    for scan_idx in (0..=last_scan_idx).rev() {
        let (sb_x, sb_y) = sub_block_positions[scan_idx];
        let (sb_x, sb_y) = (sb_x as usize, sb_y as usize);
        let sb_flat = sb_y * num_sub_blocks_side + sb_x;

        let is_first_or_last = scan_idx == 0 || scan_idx == last_scan_idx;
        let coded = if is_first_or_last {
            true
        } else {
            let right_coded = sb_x + 1 < num_sub_blocks_side
                && coded_sub_block_flags[sb_y * num_sub_blocks_side + sb_x + 1];
            let below_coded = sb_y + 1 < num_sub_blocks_side
                && coded_sub_block_flags[(sb_y + 1) * num_sub_blocks_side + sb_x];
            let ctx_inc = (right_coded || below_coded) as usize;
            cabac.decode_coded_sub_block_flag(contexts, ctx_inc)
        };
        coded_sub_block_flags[sb_flat] = coded;
        if !coded {
            continue;
        }

        state.enter_sub_block(is_luma, scan_idx as i32);

        let mut sig_positions: Vec<(usize, usize)> = Vec::with_capacity(16);
        let mut sig_scan_idx: Vec<usize> = Vec::with_capacity(16);
        for (i, &(ix, iy)) in in_block_positions.iter().enumerate().rev() {
            let x = sb_x * sub_block_size + ix as usize;
            let y = sb_y * sub_block_size + iy as usize;
            let is_last_pos = x == last_x as usize && y == last_y as usize;

            let significant = if is_last_pos {
                true
            } else if i == 0 && !is_first_or_last {
                // implied significant when nothing else in this
                // sub-block was signalled yet and this sub-block is
                // neither the DC sub-block nor the one carrying the
                // last significant coefficient.
                sig_positions.is_empty()
            } else {
                let ctx_inc = sig_coeff_ctx_inc(ix as usize, iy as usize, log2_size, is_luma);
                cabac.decode_sig_coeff_flag(contexts, ctx_inc)
            };
            if significant {
                sig_positions.push((x, y));
                sig_scan_idx.push(i);
            }
        }
        sig_positions.reverse();
        sig_scan_idx.reverse();
        if sig_positions.is_empty() {
            continue;
        }

        let mut greater1_flags = Vec::with_capacity(sig_positions.len());
        let mut first_greater1_idx = None;
        let c1_base = state.greater1_ctx_set * 4;
        let mut c1 = 1usize;
        for (i, _) in sig_positions.iter().enumerate().take(8) {
            let ctx_inc = c1_base + c1.min(3);
            let flag = cabac.decode_coeff_abs_level_greater1_flag(contexts, ctx_inc);
            if flag {
                c1 = 0;
                if first_greater1_idx.is_none() {
                    first_greater1_idx = Some(i);
                }
                state.last_greater1_found = true;
            } else if c1 > 0 && c1 < 3 {
                c1 += 1;
            }
            greater1_flags.push(flag);
        }

        let greater2_flag = if let Some(idx) = first_greater1_idx {
            let ctx_inc = state.greater1_ctx_set;
            Some((idx, cabac.decode_coeff_abs_level_greater2_flag(contexts, ctx_inc)))
        } else {
            None
        };

        let hide_sign = sign_data_hiding_enabled
            && sig_scan_idx.len() >= 2
            && {
                let first_idx = sig_scan_idx[0];
                let last_idx = sig_scan_idx[sig_scan_idx.len() - 1];
                last_idx - first_idx >= 4
            };

        let mut levels = vec![1i32; sig_positions.len()];
        for (i, flag) in greater1_flags.iter().enumerate() {
            if *flag {
                levels[i] = 2;
            }
        }
        if let Some((idx, true)) = greater2_flag {
            levels[idx] = 3;
        }

        // Every coefficient whose coded flags topped out at their max
        // (greater1 with no greater2 decoded, or beyond the first 8)
        // reads a Golomb-Rice remainder, adapting c_rice_param as it goes.
        for i in 0..levels.len() {
            let needs_remaining = if i >= 8 {
                true
            } else if greater1_flags[i] {
                greater2_flag.map(|(idx, g)| idx != i || g).unwrap_or(true)
            } else {
                false
            };
            if needs_remaining {
                let base_level = levels[i];
                let remaining = cabac.decode_bypass_eg(state.c_rice_param) as i32;
                levels[i] = base_level + remaining;
                if base_level + remaining > 3 * (1i32 << state.c_rice_param) {
                    state.c_rice_param = (state.c_rice_param + 1).min(4);
                }
            }
        }

        let num_signs = if hide_sign {
            sig_positions.len() - 1
        } else {
            sig_positions.len()
        };
        let mut signs = vec![false; sig_positions.len()];
        for sign in signs.iter_mut().take(num_signs) {
            *sign = cabac.decode_bypass();
        }
        if hide_sign {
            let sum: i32 = levels.iter().sum();
            signs[sig_positions.len() - 1] = sum % 2 != 0;
        }

        for (i, &(x, y)) in sig_positions.iter().enumerate() {
            let value = if signs[i] { -levels[i] } else { levels[i] };
            coeffs[y * size + x] = value;
        }
    }

    Ok(coeffs)
}

fn sig_coeff_ctx_inc(x: usize, y: usize, log2_size: u32, is_luma: bool) -> usize {
    if log2_size == 2 {
        const CTX_4X4: [usize; 16] = [0, 1, 4, 5, 2, 3, 4, 5, 6, 6, 8, 8, 7, 7, 8, 8];
        return CTX_4X4[y * 4 + x];
    }
    let offset = if is_luma { 0 } else { 27 };
    let base = if x + y == 0 {
        0
    } else if x + y < 3 {
        1
    } else if x + y < 5 {
        2
    } else {
        3
    };
    offset + base + if is_luma { 9 } else { 0 }
}

fn decode_last_sig_coeff_prefix_suffix(
    cabac: &mut CabacDecoder,
    contexts: &mut CabacContexts,
    log2_size: u32,
    is_luma: bool,
    is_x: bool,
) -> Result<u32> {
    let max_prefix = (log2_size << 1) as usize - 1;
    let ctx_offset = if is_luma {
        3 * (log2_size as i32 - 2) + ((log2_size as i32 - 1) >> 2)
    } else {
        15
    };
    let ctx_shift = if is_luma {
        (log2_size as i32 + 1) >> 2
    } else {
        log2_size as i32 - 2
    };
    let mut prefix = 0usize;
    while prefix < max_prefix {
        let ctx_inc = (ctx_offset + (prefix as i32 >> ctx_shift)).max(0) as usize;
        let bit = if is_x {
            cabac.decode_last_sig_coeff_x_prefix(contexts, ctx_inc.min(17))
        } else {
            cabac.decode_last_sig_coeff_y_prefix(contexts, ctx_inc.min(17))
        };
        if !bit {
            break;
        }
        prefix += 1;
    }

    if prefix <= 3 {
        return Ok(prefix as u32);
    }
    let suffix_bits = (prefix as u32 >> 1) - 1;
    let suffix = cabac.decode_bypass_bits(suffix_bits);
    Ok((1 << (prefix as u32 >> 1).checked_sub(1).unwrap_or(0)) * (2 + (prefix as u32 & 1)) + suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sig_coeff_ctx_inc_dc_position_is_zero() {
        assert_eq!(sig_coeff_ctx_inc(0, 0, 2, true), 0);
    }

    #[test]
    fn coefficient_group_state_toggles_context_set_on_greater1() {
        let mut state = CoefficientGroupState::new();
        state.enter_sub_block(true, 1);
        assert_eq!(state.greater1_ctx_set, 2);
        state.last_greater1_found = true;
        state.enter_sub_block(true, 1);
        assert_eq!(state.greater1_ctx_set, 3);
    }

    #[test]
    fn coefficient_group_state_resets_rice_param_per_sub_block() {
        let mut state = CoefficientGroupState::new();
        state.c_rice_param = 3;
        state.enter_sub_block(true, 1);
        assert_eq!(state.c_rice_param, 0);
    }
}

//! Intra prediction mode derivation and sample prediction.
//!
//! Covers the most-probable-mode (MPM) list construction used by
//! `ctu.rs` to decode `prev_intra_luma_pred_flag` / `mpm_idx` /
//! `rem_intra_luma_pred_mode`, the chroma mode derivation table, and
//! the actual per-block sample prediction (planar, DC, angular)
//! behind `PredictorCapability`.

use crate::capability::{PlaneView, PredictorCapability};

pub const INTRA_PLANAR: u8 = 0;
pub const INTRA_DC: u8 = 1;
/// Chroma `intra_chroma_pred_mode` selects the co-located luma mode.
pub const INTRA_DM_CHROMA: u8 = 36;

/// Derive the three most-probable luma intra modes from the left and
/// above neighbouring prediction units, following the MPM candidate
/// list derivation process. Unavailable neighbours (out of picture,
/// different slice/tile with loop-filter-across disabled, or
/// inter-coded — never happens in an intra-only stream) are treated
/// as `INTRA_DC`.
pub fn luma_mpm_candidates(left_mode: Option<u8>, above_mode: Option<u8>) -> [u8; 3] {
    let cand_a = left_mode.unwrap_or(INTRA_DC);
    let cand_b = above_mode.unwrap_or(INTRA_DC);

    if cand_a == cand_b {
        if cand_a < 2 {
            [INTRA_PLANAR, INTRA_DC, 26]
        } else {
            let cand_2 = 2 + (cand_a as i32 + 29) % 32;
            let cand_3 = 2 + (cand_a as i32 - 2 + 1) % 32;
            [cand_a, cand_2 as u8, cand_3 as u8]
        }
    } else {
        let third = if cand_a != INTRA_PLANAR && cand_b != INTRA_PLANAR {
            INTRA_PLANAR
        } else if cand_a != INTRA_DC && cand_b != INTRA_DC {
            INTRA_DC
        } else {
            26
        };
        [cand_a, cand_b, third]
    }
}

/// Resolve the actual luma intra mode from the decoded MPM flag/index
/// or the explicit remaining-mode value, applying the MPM-list
/// insertion-sort adjustment for the non-MPM path.
pub fn resolve_luma_mode(candidates: [u8; 3], mpm_idx: Option<u8>, rem_mode: Option<u8>) -> u8 {
    if let Some(idx) = mpm_idx {
        return candidates[idx as usize];
    }
    let mut sorted = candidates;
    sorted.sort_unstable();
    let mut mode = rem_mode.unwrap_or(0);
    for &cand in sorted.iter() {
        if mode >= cand {
            mode += 1;
        }
    }
    mode
}

/// Map `intra_chroma_pred_mode` (0..=4) plus the co-located luma mode
/// to an actual chroma prediction mode, applying the "replace with
/// mode 34" substitution when the derived mode would otherwise
/// duplicate the luma mode.
pub fn resolve_chroma_mode(intra_chroma_pred_mode: u8, luma_mode: u8) -> u8 {
    const TABLE: [u8; 4] = [INTRA_PLANAR, 26, 10, INTRA_DC];
    if intra_chroma_pred_mode == 4 {
        return luma_mode;
    }
    let candidate = TABLE[intra_chroma_pred_mode as usize];
    if candidate == luma_mode {
        34
    } else {
        candidate
    }
}

/// Reference array for one block: `left[0..]` bottom-to-top then
/// `(-1,-1)`, then `above[0..]` left-to-right, addressed by a signed
/// offset from the corner so planar/angular math reads naturally.
struct RefSamples {
    // index 0 = top-left corner; positive = above row; negative = left column
    samples: Vec<u16>,
    origin: usize,
}

impl RefSamples {
    fn at(&self, offset: isize) -> u16 {
        self.samples[(self.origin as isize + offset) as usize]
    }
}

fn build_reference_samples(plane: &PlaneView, size: u32, bit_depth: u8) -> RefSamples {
    let n = size as isize;
    let default = 1u16 << (bit_depth - 1);
    let origin = (2 * n) as usize;
    let mut samples = vec![default; (4 * n + 1) as usize];

    samples[origin] = plane.get(-1, -1).unwrap_or(default);
    for i in 1..=2 * n {
        samples[origin + i as usize] = plane.get(i - 1, -1).unwrap_or(default);
    }
    for i in 1..=2 * n {
        samples[origin - i as usize] = plane.get(-1, i - 1).unwrap_or(default);
    }

    // Substitute unavailable samples (left as `default`) by
    // propagating from the nearest available neighbour, scanning from
    // bottom-left corner through top-right.
    if samples.iter().any(|&s| s != default) {
        let mut last = None;
        for i in (0..samples.len()).rev() {
            if samples[i] != default || last.is_none() {
                if samples[i] == default {
                    if let Some(l) = last {
                        samples[i] = l;
                    }
                } else {
                    last = Some(samples[i]);
                }
            }
        }
    }

    RefSamples { samples, origin }
}

const ANGLE_TABLE: [i32; 35] = [
    0, 0, 32, 26, 21, 17, 13, 9, 5, 2, 0, -2, -5, -9, -13, -17, -21, -26, -32, -26, -21, -17, -13,
    -9, -5, -2, 0, 2, 5, 9, 13, 17, 21, 26, 32,
];
const INV_ANGLE_TABLE: [i32; 9] = [0, -4096, -1638, -910, -630, -482, -390, -315, -256];

fn predict_planar(out: &mut [i32], size: u32, refs: &RefSamples) {
    let n = size as i32;
    let log2 = size.trailing_zeros() as i32;
    let top_right = refs.at(n as isize) as i32;
    let bottom_left = refs.at(-(n as isize)) as i32;
    for y in 0..size {
        for x in 0..size {
            let above = refs.at((x as i32 + 1) as isize) as i32;
            let left = refs.at(-(y as i32 + 1) as isize) as i32;
            let v = (n - 1 - x as i32) * left
                + (x as i32 + 1) * top_right
                + (n - 1 - y as i32) * above
                + (y as i32 + 1) * bottom_left;
            out[(y * size + x) as usize] = (v + n) >> (log2 + 1);
        }
    }
}

fn predict_dc(out: &mut [i32], size: u32, refs: &RefSamples, is_luma: bool) {
    let n = size as i32;
    let mut sum = n; // rounding term
    for i in 0..size {
        sum += refs.at((i + 1) as isize) as i32;
        sum += refs.at(-((i + 1) as isize)) as i32;
    }
    let dc = sum >> (size.trailing_zeros() + 1);
    for v in out.iter_mut() {
        *v = dc;
    }
    if is_luma && size <= 16 {
        out[0] = (refs.at(-1) as i32 + 2 * dc + refs.at(1) as i32 + 2) >> 2;
        for x in 1..size {
            out[x as usize] = (refs.at((x + 1) as isize) as i32 + 3 * dc + 2) >> 2;
        }
        for y in 1..size {
            out[(y * size) as usize] = (refs.at(-((y + 1) as isize)) as i32 + 3 * dc + 2) >> 2;
        }
    }
}

fn predict_angular(out: &mut [i32], size: u32, refs: &RefSamples, mode: u8) {
    let n = size as i32;
    let angle = ANGLE_TABLE[mode as usize];
    let is_vertical = mode >= 18;

    // Build a 1D main reference row/column long enough to cover the
    // negative-angle projected range without re-deriving per sample.
    let mut main_ref = vec![0i32; (2 * n + 1) as usize];
    let base = n as usize;
    for i in 0..=n {
        main_ref[base + i as usize] = if is_vertical {
            refs.at((i) as isize) as i32
        } else {
            refs.at(-(i as isize)) as i32
        };
    }
    if angle < 0 {
        let inv_angle = INV_ANGLE_TABLE[(if is_vertical { mode - 18 } else { 10 - mode }) as usize];
        let extent = (n * angle) >> 5;
        let mut i = -1;
        while i >= extent {
            let idx = ((i * inv_angle + 128) >> 8) as isize;
            let v = if is_vertical {
                refs.at(idx.max(-(n as isize)))
            } else {
                refs.at(-idx.max(-(n as isize)))
            };
            main_ref[(base as isize + i as isize) as usize] = v as i32;
            i -= 1;
        }
    }

    for row in 0..size {
        let pos = (row as i32 + 1) * angle;
        let idx = pos >> 5;
        let frac = pos & 31;
        for col in 0..size {
            let sample_idx = (base as i32 + idx + col as i32 + 1) as usize;
            let a = main_ref[sample_idx.saturating_sub(1).min(main_ref.len() - 1)];
            let b = main_ref[sample_idx.min(main_ref.len() - 1)];
            let value = if frac == 0 {
                b
            } else {
                ((32 - frac) * a + frac * b + 16) >> 5
            };
            let (x, y) = if is_vertical { (col, row) } else { (row, col) };
            out[(y * size + x) as usize] = value;
        }
    }
}

/// Default `PredictorCapability` implementation driving the
/// planar/DC/angular prediction routines above.
pub struct IntraPredictor;

impl PredictorCapability for IntraPredictor {
    fn predict_intra(
        &self,
        plane: &mut PlaneView,
        log2_size: u32,
        mode: u8,
        bit_depth: u8,
        disable_filter: bool,
    ) {
        let size = 1u32 << log2_size;
        let refs = build_reference_samples(plane, size, bit_depth);
        let mut out = vec![0i32; (size * size) as usize];

        match mode {
            INTRA_PLANAR => predict_planar(&mut out, size, &refs),
            INTRA_DC => predict_dc(&mut out, size, &refs, !disable_filter),
            _ => predict_angular(&mut out, size, &refs, mode),
        }

        let max_val = (1i32 << bit_depth) - 1;
        for y in 0..size {
            for x in 0..size {
                let v = out[(y * size + x) as usize].clamp(0, max_val) as u16;
                plane.set(x as usize, y as usize, v);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mpm_candidates_use_dc_for_missing_neighbours() {
        let cands = luma_mpm_candidates(None, None);
        assert_eq!(cands, [INTRA_PLANAR, INTRA_DC, 26]);
    }

    #[test]
    fn mpm_candidates_differ_when_neighbours_disagree() {
        let cands = luma_mpm_candidates(Some(5), Some(12));
        assert_eq!(cands[0], 5);
        assert_eq!(cands[1], 12);
        assert_eq!(cands[2], INTRA_PLANAR);
    }

    #[test]
    fn resolve_luma_mode_applies_mpm_index() {
        let cands = [5, 12, 0];
        assert_eq!(resolve_luma_mode(cands, Some(1), None), 12);
    }

    #[test]
    fn resolve_luma_mode_skips_sorted_candidates_for_explicit_mode() {
        let cands = [0, 1, 26];
        // sorted candidates: 0, 1, 26; rem_mode=0 should become 2
        // (skipping past both 0 and 1).
        assert_eq!(resolve_luma_mode(cands, None, Some(0)), 2);
    }

    #[test]
    fn resolve_chroma_mode_substitutes_mode_34_on_collision() {
        // TABLE[1] == 26; if luma_mode is also 26, result must be 34.
        assert_eq!(resolve_chroma_mode(1, 26), 34);
        assert_eq!(resolve_chroma_mode(1, 5), 26);
        assert_eq!(resolve_chroma_mode(4, 17), 17);
    }

    #[test]
    fn planar_prediction_of_flat_reference_is_flat() {
        let mut data = vec![100u16; 64];
        let plane = PlaneView {
            data: &mut data,
            stride: 8,
            x: 4,
            y: 4,
        };
        let refs = build_reference_samples(&plane, 4, 8);
        let mut out = vec![0i32; 16];
        predict_planar(&mut out, 4, &refs);
        assert!(out.iter().all(|&v| (v - 100).abs() <= 1));
    }
}

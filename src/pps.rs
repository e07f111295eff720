//! HEVC Picture Parameter Set (PPS) parsing.
//!
//! PPS contains picture-level parameters referenced by slice headers.
//! It is defined in ITU-T H.265 Section 7.3.2.3. Beyond the coded
//! syntax, a PPS owns several tables derived from its tile layout and
//! the picture dimensions of its referenced SPS: the raster-scan /
//! tile-scan CTB address bijection, the tile id per tile-scan
//! address, and the z-scan addresses of the smallest coding and
//! transform blocks. These are computed once at parse time and
//! replaced as a unit whenever the PPS is replaced.

use crate::bitreader::BitReader;
use crate::error::{HevcError, Result};
use crate::sps::Sps;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Maximum number of simultaneously active PPS ids.
pub const MAX_PPS_COUNT: usize = 256;

/// HEVC Picture Parameter Set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pps {
    /// PPS ID (0-63).
    pub pps_pic_parameter_set_id: u8,
    /// Referenced SPS ID (0-15).
    pub pps_seq_parameter_set_id: u8,
    /// Dependent slice segments enabled.
    pub dependent_slice_segments_enabled_flag: bool,
    /// Output flag present in slice header.
    pub output_flag_present_flag: bool,
    /// Number of extra slice header bits.
    pub num_extra_slice_header_bits: u8,
    /// Sign data hiding enabled.
    pub sign_data_hiding_enabled_flag: bool,
    /// CABAC init present in slice header.
    pub cabac_init_present_flag: bool,
    /// Number of reference pictures in list 0 default.
    pub num_ref_idx_l0_default_active_minus1: u8,
    /// Number of reference pictures in list 1 default.
    pub num_ref_idx_l1_default_active_minus1: u8,
    /// Initial QP value.
    pub init_qp_minus26: i8,
    /// Constrained intra prediction.
    pub constrained_intra_pred_flag: bool,
    /// Transform skip enabled.
    pub transform_skip_enabled_flag: bool,
    /// CU QP delta enabled.
    pub cu_qp_delta_enabled_flag: bool,
    /// Diff CU QP delta depth.
    pub diff_cu_qp_delta_depth: u8,
    /// CB QP offset.
    pub pps_cb_qp_offset: i8,
    /// CR QP offset.
    pub pps_cr_qp_offset: i8,
    /// Slice chroma QP offsets present.
    pub pps_slice_chroma_qp_offsets_present_flag: bool,
    /// Weighted prediction enabled.
    pub weighted_pred_flag: bool,
    /// Weighted biprediction enabled.
    pub weighted_bipred_flag: bool,
    /// Transquant bypass enabled.
    pub transquant_bypass_enabled_flag: bool,
    /// Tiles enabled.
    pub tiles_enabled_flag: bool,
    /// Entropy coding sync enabled (WPP).
    pub entropy_coding_sync_enabled_flag: bool,
    /// Tile configuration.
    pub tile_config: Option<TileConfig>,
    /// Loop filter across tiles enabled.
    pub loop_filter_across_tiles_enabled_flag: bool,
    /// Loop filter across slices enabled.
    pub pps_loop_filter_across_slices_enabled_flag: bool,
    /// Deblocking filter control present.
    pub deblocking_filter_control_present_flag: bool,
    /// Deblocking filter override enabled.
    pub deblocking_filter_override_enabled_flag: bool,
    /// Deblocking filter disabled.
    pub pps_deblocking_filter_disabled_flag: bool,
    /// Beta offset div 2.
    pub pps_beta_offset_div2: i8,
    /// TC offset div 2.
    pub pps_tc_offset_div2: i8,
    /// Scaling list data present.
    pub pps_scaling_list_data_present_flag: bool,
    /// Lists modification present.
    pub lists_modification_present_flag: bool,
    /// Log2 parallel merge level.
    pub log2_parallel_merge_level_minus2: u8,
    /// Slice segment header extension present.
    pub slice_segment_header_extension_present_flag: bool,
    /// PPS extension present.
    pub pps_extension_present_flag: bool,
    /// PPS range extension flag.
    pub pps_range_extension_flag: bool,
    /// PPS multilayer extension flag.
    pub pps_multilayer_extension_flag: bool,
    /// PPS 3D extension flag.
    pub pps_3d_extension_flag: bool,
    /// PPS SCC extension flag.
    pub pps_scc_extension_flag: bool,
    /// Tables derived from the tile layout and the referenced SPS's
    /// picture dimensions.
    pub geometry: TileGeometry,
}

/// Tile configuration from PPS.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TileConfig {
    /// Number of tile columns minus 1.
    pub num_tile_columns_minus1: u16,
    /// Number of tile rows minus 1.
    pub num_tile_rows_minus1: u16,
    /// Uniform tile spacing.
    pub uniform_spacing_flag: bool,
    /// Column widths (in CTBs) if not uniform.
    pub column_width_minus1: Vec<u16>,
    /// Row heights (in CTBs) if not uniform.
    pub row_height_minus1: Vec<u16>,
}

impl TileConfig {
    /// Get number of tile columns.
    pub fn num_columns(&self) -> u16 {
        self.num_tile_columns_minus1 + 1
    }

    /// Get number of tile rows.
    pub fn num_rows(&self) -> u16 {
        self.num_tile_rows_minus1 + 1
    }

    /// Get total number of tiles.
    pub fn num_tiles(&self) -> u32 {
        self.num_columns() as u32 * self.num_rows() as u32
    }
}

/// Tables derived from tile layout and picture dimensions (§3/§4.3).
/// Every table here is indexed as described in its own doc comment;
/// all are recomputed together and replaced atomically with the PPS.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TileGeometry {
    /// Picture width in CTBs (copied from the referenced SPS at parse
    /// time so consumers don't need to thread the SPS through).
    pub pic_width_in_ctbs: u32,
    /// Picture height in CTBs.
    pub pic_height_in_ctbs: u32,
    /// Width of each tile column, in CTBs.
    pub column_width: Vec<u32>,
    /// Height of each tile row, in CTBs.
    pub row_height: Vec<u32>,
    /// Cumulative column boundary (length = num columns + 1).
    pub col_bd: Vec<u32>,
    /// Cumulative row boundary (length = num rows + 1).
    pub row_bd: Vec<u32>,
    /// Raster-scan CTB address -> tile-scan CTB address.
    pub ctb_addr_rs_to_ts: Vec<u32>,
    /// Tile-scan CTB address -> raster-scan CTB address (inverse).
    pub ctb_addr_ts_to_rs: Vec<u32>,
    /// Tile id indexed by tile-scan CTB address.
    pub tile_id: Vec<u32>,
    /// z-scan address of the minimum coding block at each
    /// (min-CB raster address).
    pub min_cb_addr_zs: Vec<u32>,
    /// z-scan address of the minimum transform block at each
    /// (min-TB raster address).
    pub min_tb_addr_zs: Vec<u32>,
}

impl Default for Pps {
    fn default() -> Self {
        Self {
            pps_pic_parameter_set_id: 0,
            pps_seq_parameter_set_id: 0,
            dependent_slice_segments_enabled_flag: false,
            output_flag_present_flag: false,
            num_extra_slice_header_bits: 0,
            sign_data_hiding_enabled_flag: false,
            cabac_init_present_flag: false,
            num_ref_idx_l0_default_active_minus1: 0,
            num_ref_idx_l1_default_active_minus1: 0,
            init_qp_minus26: 0,
            constrained_intra_pred_flag: false,
            transform_skip_enabled_flag: false,
            cu_qp_delta_enabled_flag: false,
            diff_cu_qp_delta_depth: 0,
            pps_cb_qp_offset: 0,
            pps_cr_qp_offset: 0,
            pps_slice_chroma_qp_offsets_present_flag: false,
            weighted_pred_flag: false,
            weighted_bipred_flag: false,
            transquant_bypass_enabled_flag: false,
            tiles_enabled_flag: false,
            entropy_coding_sync_enabled_flag: false,
            tile_config: None,
            loop_filter_across_tiles_enabled_flag: true,
            pps_loop_filter_across_slices_enabled_flag: false,
            deblocking_filter_control_present_flag: false,
            deblocking_filter_override_enabled_flag: false,
            pps_deblocking_filter_disabled_flag: false,
            pps_beta_offset_div2: 0,
            pps_tc_offset_div2: 0,
            pps_scaling_list_data_present_flag: false,
            lists_modification_present_flag: false,
            log2_parallel_merge_level_minus2: 0,
            slice_segment_header_extension_present_flag: false,
            pps_extension_present_flag: false,
            pps_range_extension_flag: false,
            pps_multilayer_extension_flag: false,
            pps_3d_extension_flag: false,
            pps_scc_extension_flag: false,
            geometry: TileGeometry::default(),
        }
    }
}

impl Pps {
    /// Get initial QP value (26 + init_qp_minus26).
    pub fn init_qp(&self) -> i8 {
        26 + self.init_qp_minus26
    }

    /// Check if tiles are used.
    pub fn has_tiles(&self) -> bool {
        self.tiles_enabled_flag && self.tile_config.is_some()
    }

    /// Get number of tiles if enabled.
    pub fn num_tiles(&self) -> Option<u32> {
        self.tile_config.as_ref().map(|tc| tc.num_tiles())
    }

    /// Check if WPP (Wavefront Parallel Processing) is enabled.
    pub fn wpp_enabled(&self) -> bool {
        self.entropy_coding_sync_enabled_flag
    }

    /// Tile id of the CTB at the given raster-scan address.
    pub fn tile_id_for_ctb_addr_rs(&self, ctb_addr_rs: u32) -> Option<u32> {
        let ts = *self.geometry.ctb_addr_rs_to_ts.get(ctb_addr_rs as usize)?;
        self.geometry.tile_id.get(ts as usize).copied()
    }
}

/// Parse PPS from RBSP data. `sps_map` is consulted once the
/// referenced SPS id has been read (the second field in the syntax
/// table) so the tile/z-scan geometry can be derived from its
/// picture dimensions before this function returns.
#[allow(clippy::field_reassign_with_default)]
pub fn parse_pps(data: &[u8], sps_map: &HashMap<u8, Sps>) -> Result<Pps> {
    let mut reader = BitReader::new(data);
    let mut pps = Pps::default();

    // pps_pic_parameter_set_id (ue(v))
    pps.pps_pic_parameter_set_id = reader.read_ue()? as u8;
    if pps.pps_pic_parameter_set_id as usize >= MAX_PPS_COUNT {
        return Err(HevcError::InvalidData(format!(
            "pps_pic_parameter_set_id {} out of range",
            pps.pps_pic_parameter_set_id
        )));
    }

    // pps_seq_parameter_set_id (ue(v))
    pps.pps_seq_parameter_set_id = reader.read_ue()? as u8;
    let sps = sps_map.get(&pps.pps_seq_parameter_set_id).ok_or_else(|| {
        HevcError::InvalidData(format!(
            "PPS {} references unknown SPS {}",
            pps.pps_pic_parameter_set_id, pps.pps_seq_parameter_set_id
        ))
    })?;

    // dependent_slice_segments_enabled_flag (1 bit)
    pps.dependent_slice_segments_enabled_flag = reader.read_bit()?;

    // output_flag_present_flag (1 bit)
    pps.output_flag_present_flag = reader.read_bit()?;

    // num_extra_slice_header_bits (3 bits)
    pps.num_extra_slice_header_bits = reader.read_bits(3)? as u8;

    // sign_data_hiding_enabled_flag (1 bit)
    pps.sign_data_hiding_enabled_flag = reader.read_bit()?;

    // cabac_init_present_flag (1 bit)
    pps.cabac_init_present_flag = reader.read_bit()?;

    // num_ref_idx_l0_default_active_minus1 (ue(v))
    pps.num_ref_idx_l0_default_active_minus1 = reader.read_ue()? as u8;

    // num_ref_idx_l1_default_active_minus1 (ue(v))
    pps.num_ref_idx_l1_default_active_minus1 = reader.read_ue()? as u8;

    // init_qp_minus26 (se(v))
    pps.init_qp_minus26 = reader.read_se()? as i8;

    // constrained_intra_pred_flag (1 bit)
    pps.constrained_intra_pred_flag = reader.read_bit()?;

    // transform_skip_enabled_flag (1 bit)
    pps.transform_skip_enabled_flag = reader.read_bit()?;

    // cu_qp_delta_enabled_flag (1 bit)
    pps.cu_qp_delta_enabled_flag = reader.read_bit()?;

    if pps.cu_qp_delta_enabled_flag {
        // diff_cu_qp_delta_depth (ue(v))
        pps.diff_cu_qp_delta_depth = reader.read_ue()? as u8;
    }

    // pps_cb_qp_offset (se(v))
    pps.pps_cb_qp_offset = reader.read_se()? as i8;

    // pps_cr_qp_offset (se(v))
    pps.pps_cr_qp_offset = reader.read_se()? as i8;

    // pps_slice_chroma_qp_offsets_present_flag (1 bit)
    pps.pps_slice_chroma_qp_offsets_present_flag = reader.read_bit()?;

    // weighted_pred_flag (1 bit)
    pps.weighted_pred_flag = reader.read_bit()?;

    // weighted_bipred_flag (1 bit)
    pps.weighted_bipred_flag = reader.read_bit()?;

    // transquant_bypass_enabled_flag (1 bit)
    pps.transquant_bypass_enabled_flag = reader.read_bit()?;

    // tiles_enabled_flag (1 bit)
    pps.tiles_enabled_flag = reader.read_bit()?;

    // entropy_coding_sync_enabled_flag (1 bit)
    pps.entropy_coding_sync_enabled_flag = reader.read_bit()?;

    if pps.tiles_enabled_flag {
        // num_tile_columns_minus1 (ue(v))
        let num_tile_columns_minus1 = reader.read_ue()? as u16;

        // num_tile_rows_minus1 (ue(v))
        let num_tile_rows_minus1 = reader.read_ue()? as u16;

        // uniform_spacing_flag (1 bit)
        let uniform_spacing_flag = reader.read_bit()?;

        let mut tile_config = TileConfig {
            num_tile_columns_minus1,
            num_tile_rows_minus1,
            uniform_spacing_flag,
            ..Default::default()
        };

        if !tile_config.uniform_spacing_flag {
            // column_width_minus1
            for _ in 0..tile_config.num_tile_columns_minus1 {
                tile_config
                    .column_width_minus1
                    .push(reader.read_ue()? as u16);
            }
            // row_height_minus1
            for _ in 0..tile_config.num_tile_rows_minus1 {
                tile_config.row_height_minus1.push(reader.read_ue()? as u16);
            }
        }

        // loop_filter_across_tiles_enabled_flag (1 bit)
        pps.loop_filter_across_tiles_enabled_flag = reader.read_bit()?;

        pps.tile_config = Some(tile_config);
    }

    // pps_loop_filter_across_slices_enabled_flag (1 bit)
    pps.pps_loop_filter_across_slices_enabled_flag = reader.read_bit()?;

    // deblocking_filter_control_present_flag (1 bit)
    pps.deblocking_filter_control_present_flag = reader.read_bit()?;

    if pps.deblocking_filter_control_present_flag {
        // deblocking_filter_override_enabled_flag (1 bit)
        pps.deblocking_filter_override_enabled_flag = reader.read_bit()?;

        // pps_deblocking_filter_disabled_flag (1 bit)
        pps.pps_deblocking_filter_disabled_flag = reader.read_bit()?;

        if !pps.pps_deblocking_filter_disabled_flag {
            // pps_beta_offset_div2 (se(v))
            pps.pps_beta_offset_div2 = reader.read_se()? as i8;

            // pps_tc_offset_div2 (se(v))
            pps.pps_tc_offset_div2 = reader.read_se()? as i8;
        }
    }

    // pps_scaling_list_data_present_flag (1 bit)
    pps.pps_scaling_list_data_present_flag = reader.read_bit()?;
    if pps.pps_scaling_list_data_present_flag {
        return Err(HevcError::UnsupportedStream(
            "PPS scaling list data is not supported".into(),
        ));
    }

    // lists_modification_present_flag (1 bit)
    pps.lists_modification_present_flag = reader.read_bit()?;

    // log2_parallel_merge_level_minus2 (ue(v))
    pps.log2_parallel_merge_level_minus2 = reader.read_ue()? as u8;

    // slice_segment_header_extension_present_flag (1 bit)
    pps.slice_segment_header_extension_present_flag = reader.read_bit()?;

    // pps_extension_present_flag (1 bit)
    pps.pps_extension_present_flag = reader.read_bit()?;

    if pps.pps_extension_present_flag {
        // pps_range_extension_flag (1 bit)
        pps.pps_range_extension_flag = reader.read_bit()?;

        // pps_multilayer_extension_flag (1 bit)
        pps.pps_multilayer_extension_flag = reader.read_bit()?;

        // pps_3d_extension_flag (1 bit)
        pps.pps_3d_extension_flag = reader.read_bit()?;

        // pps_scc_extension_flag (1 bit)
        pps.pps_scc_extension_flag = reader.read_bit()?;

        // Skip extension bits (4 bits)
        let _ = reader.read_bits(4)?;
    }

    pps.geometry = compute_tile_geometry(sps, pps.tile_config.as_ref())?;

    Ok(pps)
}

/// Compute column/row widths, the raster<->tile CTB address bijection,
/// tile ids, and the z-scan address tables for minimum coding and
/// transform blocks (§4.3).
fn compute_tile_geometry(sps: &Sps, tile_config: Option<&TileConfig>) -> Result<TileGeometry> {
    let pic_width_in_ctbs = sps.pic_width_in_ctbs();
    let pic_height_in_ctbs = sps.pic_height_in_ctbs();

    let (num_cols, num_rows, column_width, row_height) = match tile_config {
        Some(tc) if tc.uniform_spacing_flag || tc.num_columns() > 1 || tc.num_rows() > 1 => {
            let num_cols = tc.num_columns() as u32;
            let num_rows = tc.num_rows() as u32;
            let column_width = if tc.uniform_spacing_flag {
                uniform_spans(pic_width_in_ctbs, num_cols)
            } else {
                explicit_spans(&tc.column_width_minus1, pic_width_in_ctbs)
            };
            let row_height = if tc.uniform_spacing_flag {
                uniform_spans(pic_height_in_ctbs, num_rows)
            } else {
                explicit_spans(&tc.row_height_minus1, pic_height_in_ctbs)
            };
            (num_cols, num_rows, column_width, row_height)
        }
        _ => (1, 1, vec![pic_width_in_ctbs], vec![pic_height_in_ctbs]),
    };

    if column_width.iter().sum::<u32>() != pic_width_in_ctbs
        || row_height.iter().sum::<u32>() != pic_height_in_ctbs
    {
        return Err(HevcError::InvalidData(
            "tile column/row spans do not cover the picture".into(),
        ));
    }

    let col_bd = prefix_sums(&column_width);
    let row_bd = prefix_sums(&row_height);

    let pic_size_in_ctbs = (pic_width_in_ctbs * pic_height_in_ctbs) as usize;
    let mut ctb_addr_rs_to_ts = vec![0u32; pic_size_in_ctbs];

    for ctb_addr_rs in 0..pic_size_in_ctbs as u32 {
        let tb_x = ctb_addr_rs % pic_width_in_ctbs;
        let tb_y = ctb_addr_rs / pic_width_in_ctbs;

        let tile_x = (0..num_cols as usize)
            .rev()
            .find(|&i| tb_x >= col_bd[i])
            .unwrap_or(0);
        let tile_y = (0..num_rows as usize)
            .rev()
            .find(|&j| tb_y >= row_bd[j])
            .unwrap_or(0);

        let mut addr_ts = 0u32;
        for i in 0..tile_x {
            addr_ts += row_height[tile_y] * column_width[i];
        }
        for j in 0..tile_y {
            addr_ts += pic_width_in_ctbs * row_height[j];
        }
        addr_ts += (tb_y - row_bd[tile_y]) * column_width[tile_x] + (tb_x - col_bd[tile_x]);

        ctb_addr_rs_to_ts[ctb_addr_rs as usize] = addr_ts;
    }

    let mut ctb_addr_ts_to_rs = vec![0u32; pic_size_in_ctbs];
    for (rs, &ts) in ctb_addr_rs_to_ts.iter().enumerate() {
        ctb_addr_ts_to_rs[ts as usize] = rs as u32;
    }

    let mut tile_id = vec![0u32; pic_size_in_ctbs];
    let mut tile_idx = 0u32;
    for j in 0..num_rows as usize {
        for i in 0..num_cols as usize {
            for y in row_bd[j]..row_bd[j + 1] {
                for x in col_bd[i]..col_bd[i + 1] {
                    let rs = y * pic_width_in_ctbs + x;
                    tile_id[ctb_addr_rs_to_ts[rs as usize] as usize] = tile_idx;
                }
            }
            tile_idx += 1;
        }
    }

    let log2_ctb_size = sps.log2_ctb_size();
    let min_cb_addr_zs = build_zscan_table(
        sps.pic_width_in_min_cbs(),
        sps.pic_height_in_min_cbs(),
        log2_ctb_size,
        sps.log2_min_cb_size(),
        pic_width_in_ctbs,
        &ctb_addr_rs_to_ts,
    );
    let min_tb_addr_zs = build_zscan_table(
        sps.pic_width_in_luma_samples >> sps.log2_min_tb_size(),
        sps.pic_height_in_luma_samples >> sps.log2_min_tb_size(),
        log2_ctb_size,
        sps.log2_min_tb_size(),
        pic_width_in_ctbs,
        &ctb_addr_rs_to_ts,
    );

    Ok(TileGeometry {
        pic_width_in_ctbs,
        pic_height_in_ctbs,
        column_width,
        row_height,
        col_bd,
        row_bd,
        ctb_addr_rs_to_ts,
        ctb_addr_ts_to_rs,
        tile_id,
        min_cb_addr_zs,
        min_tb_addr_zs,
    })
}

/// Evenly divide `total` CTBs across `count` spans, HEVC's
/// uniform_spacing_flag formula: span[i] = ((i+1)*total)/count -
/// (i*total)/count.
fn uniform_spans(total: u32, count: u32) -> Vec<u32> {
    (0..count)
        .map(|i| ((i + 1) * total) / count - (i * total) / count)
        .collect()
}

/// Explicit per-span widths/heights where the last entry fills the
/// remainder of the picture.
fn explicit_spans(minus1: &[u16], total: u32) -> Vec<u32> {
    let mut spans: Vec<u32> = minus1.iter().map(|&v| v as u32 + 1).collect();
    let used: u32 = spans.iter().sum();
    spans.push(total.saturating_sub(used));
    spans
}

/// Cumulative boundary array: `[0, spans[0], spans[0]+spans[1], ...]`.
fn prefix_sums(spans: &[u32]) -> Vec<u32> {
    let mut bd = Vec::with_capacity(spans.len() + 1);
    let mut acc = 0;
    bd.push(0);
    for &s in spans {
        acc += s;
        bd.push(acc);
    }
    bd
}

/// Build a z-scan address table for a block grid of the given log2
/// block size, per the HEVC z-scan order array initialization process
/// (§4.3): the base contribution of the parent CTB, scaled by the
/// square of the number of blocks per CTB edge, plus the interleaved
/// bits of the block's (x,y) offset inside that CTB.
fn build_zscan_table(
    grid_width: u32,
    grid_height: u32,
    log2_ctb_size: u32,
    log2_block_size: u32,
    pic_width_in_ctbs: u32,
    ctb_addr_rs_to_ts: &[u32],
) -> Vec<u32> {
    let shift = log2_ctb_size - log2_block_size;
    let mut table = vec![0u32; (grid_width * grid_height) as usize];

    for y in 0..grid_height {
        for x in 0..grid_width {
            let ctb_x = x >> shift;
            let ctb_y = y >> shift;
            let ctb_addr_rs = ctb_y * pic_width_in_ctbs + ctb_x;
            let mut val = ctb_addr_rs_to_ts[ctb_addr_rs as usize] << (shift * 2);

            for i in 0..shift {
                let m = 1u32 << i;
                if x & m != 0 {
                    val += m * m;
                }
                if y & m != 0 {
                    val += 2 * m * m;
                }
            }

            table[(y * grid_width + x) as usize] = val;
        }
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sps::{ChromaFormat, Profile, ProfileTierLevel};
    use std::collections::HashSet;

    fn test_sps(width_ctbs: u32, height_ctbs: u32, log2_ctb: u32) -> Sps {
        let ctb = 1u32 << log2_ctb;
        Sps {
            sps_video_parameter_set_id: 0,
            sps_max_sub_layers_minus1: 0,
            sps_temporal_id_nesting_flag: true,
            profile_tier_level: ProfileTierLevel {
                general_profile_space: 0,
                general_tier_flag: false,
                general_profile_idc: Profile::Main,
                general_profile_compatibility_flags: 0,
                general_progressive_source_flag: true,
                general_interlaced_source_flag: false,
                general_non_packed_constraint_flag: false,
                general_frame_only_constraint_flag: true,
                general_level_idc: 120,
            },
            sps_seq_parameter_set_id: 0,
            chroma_format_idc: ChromaFormat::Chroma420,
            separate_colour_plane_flag: false,
            pic_width_in_luma_samples: width_ctbs * ctb,
            pic_height_in_luma_samples: height_ctbs * ctb,
            conformance_window_flag: false,
            conf_win_left_offset: 0,
            conf_win_right_offset: 0,
            conf_win_top_offset: 0,
            conf_win_bottom_offset: 0,
            bit_depth_luma_minus8: 0,
            bit_depth_chroma_minus8: 0,
            log2_max_pic_order_cnt_lsb_minus4: 4,
            sps_sub_layer_ordering_info_present_flag: false,
            sps_max_dec_pic_buffering_minus1: vec![1],
            sps_max_num_reorder_pics: vec![0],
            sps_max_latency_increase_plus1: vec![0],
            log2_min_luma_coding_block_size_minus3: 0,
            log2_diff_max_min_luma_coding_block_size: (log2_ctb - 3) as u8,
            log2_min_luma_transform_block_size_minus2: 0,
            log2_diff_max_min_luma_transform_block_size: (log2_ctb - 2) as u8,
            max_transform_hierarchy_depth_inter: 0,
            max_transform_hierarchy_depth_intra: 0,
            scaling_list_enabled_flag: false,
            amp_enabled_flag: false,
            sample_adaptive_offset_enabled_flag: false,
            pcm_enabled_flag: false,
            pcm_sample_bit_depth_luma_minus1: 0,
            pcm_sample_bit_depth_chroma_minus1: 0,
            log2_min_pcm_luma_coding_block_size_minus3: 0,
            log2_diff_max_min_pcm_luma_coding_block_size: 0,
            pcm_loop_filter_disabled_flag: false,
            short_term_ref_pic_sets: Vec::new(),
            long_term_ref_pics_present_flag: false,
            num_long_term_ref_pics_sps: 0,
            sps_temporal_mvp_enabled_flag: false,
            strong_intra_smoothing_enabled_flag: false,
            vui_parameters_present_flag: false,
            vui_parameters: None,
        }
    }

    #[test]
    fn test_pps_defaults() {
        let pps = Pps::default();
        assert_eq!(pps.init_qp(), 26);
        assert!(!pps.has_tiles());
        assert!(!pps.wpp_enabled());
    }

    #[test]
    fn test_tile_config() {
        let mut tile_config = TileConfig::default();
        tile_config.num_tile_columns_minus1 = 3;
        tile_config.num_tile_rows_minus1 = 2;

        assert_eq!(tile_config.num_columns(), 4);
        assert_eq!(tile_config.num_rows(), 3);
        assert_eq!(tile_config.num_tiles(), 12);
    }

    #[test]
    fn no_tiles_yields_identity_mapping() {
        let sps = test_sps(8, 8, 3);
        let geometry = compute_tile_geometry(&sps, None).unwrap();
        assert_eq!(geometry.ctb_addr_rs_to_ts, (0..64).collect::<Vec<_>>());
        assert_eq!(geometry.tile_id, vec![0; 64]);
    }

    #[test]
    fn rs_to_ts_is_a_permutation_with_verified_inverse() {
        let sps = test_sps(10, 7, 3);
        let tc = TileConfig {
            num_tile_columns_minus1: 2,
            num_tile_rows_minus1: 1,
            uniform_spacing_flag: true,
            column_width_minus1: Vec::new(),
            row_height_minus1: Vec::new(),
        };
        let geometry = compute_tile_geometry(&sps, Some(&tc)).unwrap();
        let n = (10 * 7) as u32;
        let seen: HashSet<u32> = geometry.ctb_addr_rs_to_ts.iter().copied().collect();
        assert_eq!(seen.len(), n as usize);
        assert!(seen.iter().all(|&v| v < n));
        for rs in 0..n {
            let ts = geometry.ctb_addr_rs_to_ts[rs as usize];
            assert_eq!(geometry.ctb_addr_ts_to_rs[ts as usize], rs);
        }
    }

    #[test]
    fn uniform_spacing_spans_sum_to_picture_size() {
        let cols = uniform_spans(10, 3);
        assert_eq!(cols.iter().sum::<u32>(), 10);
        let rows = uniform_spans(7, 2);
        assert_eq!(rows.iter().sum::<u32>(), 7);
    }

    #[test]
    fn min_cb_addr_zs_is_a_permutation_within_one_ctb() {
        let sps = test_sps(2, 2, 3); // CTB=8, min CB=8 => 1 min-CB per CTB
        let geometry = compute_tile_geometry(&sps, None).unwrap();
        // With log2_diff_max_min_luma_coding_block_size == log2_ctb-3 == 0,
        // each CTB holds exactly one minimum coding block; the whole table
        // must equal ctb_addr_rs_to_ts (i.e. a single-element z-scan group).
        assert_eq!(geometry.min_cb_addr_zs, geometry.ctb_addr_rs_to_ts);
    }

    #[test]
    fn min_tb_addr_zs_permutes_within_each_ctb() {
        let sps = test_sps(2, 2, 3); // CTB=8, min TB=4 => 2x2 blocks per CTB
        let geometry = compute_tile_geometry(&sps, None).unwrap();
        // Collect the 4 z-scan values that land in CTB 0's quadrant and
        // check they form {0,1,2,3} (a permutation of the local range).
        let mut local: Vec<u32> = geometry
            .min_tb_addr_zs
            .iter()
            .copied()
            .filter(|&v| v < 4)
            .collect();
        local.sort_unstable();
        assert_eq!(local, vec![0, 1, 2, 3]);
    }
}

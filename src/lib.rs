//! Intra-only HEVC/H.265 bitstream decoder core.
//!
//! This crate parses HEVC Annex B bitstreams down to reconstructed
//! intra pictures: NAL unit framing, VPS/SPS/PPS/slice-header syntax,
//! CABAC entropy decoding, the coding-tree/CU/PU/TU recursion,
//! residual coefficient decoding, and the deblocking/SAO in-loop
//! filters. Inter prediction is out of scope; non-IRAP slices that
//! require it are rejected rather than mis-decoded.
//!
//! # Example
//!
//! ```ignore
//! use hevc_core::{Decoder, DecoderConfig};
//!
//! let mut decoder = Decoder::new(DecoderConfig::default());
//! for nal in hevc_core::find_nal_units(annex_b_data) {
//!     // feed each framed NAL unit's bytes to the decoder in order
//! }
//! ```

pub mod bitreader;
pub mod cabac;
pub mod capability;
pub mod ctu;
pub mod deblock;
pub mod error;
pub mod frames;
pub mod intra;
pub mod nal;
pub mod pps;
pub mod residual;
pub mod rps;
pub mod sao;
pub mod scan;
pub mod slice;
pub mod sps;
pub mod transform;
pub mod vps;

pub use bitreader::{remove_emulation_prevention_bytes, BitReader};
pub use error::{HevcError, Result};
pub use frames::{extract_annex_b_frames, extract_frame_at_index, HevcFrame, HevcFrameType};
pub use nal::{
    find_nal_units, parse_nal_header, parse_nal_header_checked, parse_nal_units, NalUnit,
    NalUnitHeader, NalUnitType,
};
pub use pps::{parse_pps, Pps};
use serde::{Deserialize, Serialize};
pub use slice::{SliceHeader, SliceType};
pub use sps::{ChromaFormat, parse_sps, ProfileTierLevel, Sps};
use std::collections::HashMap;
pub use vps::Vps;

/// Parsed HEVC bitstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HevcStream {
    /// All NAL units in the stream.
    pub nal_units: Vec<NalUnit>,
    /// Video Parameter Sets (indexed by vps_id).
    pub vps_map: HashMap<u8, Vps>,
    /// Sequence Parameter Sets (indexed by sps_id).
    pub sps_map: HashMap<u8, Sps>,
    /// Picture Parameter Sets (indexed by pps_id).
    pub pps_map: HashMap<u8, Pps>,
    /// Parsed slice headers.
    pub slices: Vec<ParsedSlice>,
}

/// A parsed slice with its header and associated metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedSlice {
    /// Index of the NAL unit containing this slice.
    pub nal_index: usize,
    /// Parsed slice header.
    pub header: SliceHeader,
    /// POC (Picture Order Count).
    pub poc: i32,
}

impl HevcStream {
    /// Get VPS by ID.
    pub fn get_vps(&self, id: u8) -> Option<&Vps> {
        self.vps_map.get(&id)
    }

    /// Get SPS by ID.
    pub fn get_sps(&self, id: u8) -> Option<&Sps> {
        self.sps_map.get(&id)
    }

    /// Get PPS by ID.
    pub fn get_pps(&self, id: u8) -> Option<&Pps> {
        self.pps_map.get(&id)
    }

    /// Get video dimensions from SPS.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.sps_map
            .values()
            .next()
            .map(|sps| (sps.display_width(), sps.display_height()))
    }

    /// Get frame rate from VPS/SPS timing info.
    pub fn frame_rate(&self) -> Option<f64> {
        // Check VPS first
        for vps in self.vps_map.values() {
            if let Some(ref timing) = vps.timing_info {
                if timing.time_scale > 0 && timing.num_units_in_tick > 0 {
                    return Some(timing.time_scale as f64 / timing.num_units_in_tick as f64);
                }
            }
        }
        // Fall back to SPS
        for sps in self.sps_map.values() {
            if let Some(ref vui) = sps.vui_parameters {
                if vui.timing_info_present_flag {
                    if let (Some(time_scale), Some(num_units)) =
                        (vui.time_scale, vui.num_units_in_tick)
                    {
                        if time_scale > 0 && num_units > 0 {
                            return Some(time_scale as f64 / num_units as f64);
                        }
                    }
                }
            }
        }
        None
    }

    /// Get bit depth for luma.
    pub fn bit_depth_luma(&self) -> Option<u8> {
        self.sps_map.values().next().map(|sps| sps.bit_depth_luma())
    }

    /// Get bit depth for chroma.
    pub fn bit_depth_chroma(&self) -> Option<u8> {
        self.sps_map
            .values()
            .next()
            .map(|sps| sps.bit_depth_chroma())
    }

    /// Get chroma format.
    pub fn chroma_format(&self) -> Option<ChromaFormat> {
        self.sps_map
            .values()
            .next()
            .map(|sps| sps.chroma_format_idc)
    }

    /// Count frames (VCL NAL units that start a new picture).
    pub fn frame_count(&self) -> usize {
        self.slices
            .iter()
            .filter(|s| s.header.first_slice_segment_in_pic_flag)
            .count()
    }

    /// Get all IDR frames.
    pub fn idr_frames(&self) -> Vec<&ParsedSlice> {
        self.slices
            .iter()
            .filter(|s| {
                let nal = &self.nal_units[s.nal_index];
                nal.header.nal_unit_type.is_idr()
            })
            .collect()
    }

    /// Get all IRAP frames (IDR, CRA, BLA).
    pub fn irap_frames(&self) -> Vec<&ParsedSlice> {
        self.slices
            .iter()
            .filter(|s| {
                let nal = &self.nal_units[s.nal_index];
                nal.header.nal_unit_type.is_irap()
            })
            .collect()
    }
}

/// Parse HEVC bitstream from Annex B byte stream.
pub fn parse_hevc(data: &[u8]) -> Result<HevcStream> {
    let nal_units = parse_nal_units(data)?;

    let mut vps_map = HashMap::new();
    let mut sps_map = HashMap::new();
    let mut pps_map = HashMap::new();
    let mut slices = Vec::new();

    // POC calculation state
    let mut prev_poc_msb: i32 = 0;
    let mut prev_poc_lsb: i32 = 0;

    for (nal_index, nal) in nal_units.iter().enumerate() {
        match nal.header.nal_unit_type {
            NalUnitType::VpsNut => {
                if let Ok(vps) = vps::parse_vps(&nal.payload) {
                    vps_map.insert(vps.vps_video_parameter_set_id, vps);
                }
            }
            NalUnitType::SpsNut => {
                if let Ok(sps) = sps::parse_sps(&nal.payload) {
                    sps_map.insert(sps.sps_seq_parameter_set_id, sps);
                }
            }
            NalUnitType::PpsNut => {
                if let Ok(pps) = pps::parse_pps(&nal.payload, &sps_map) {
                    pps_map.insert(pps.pps_pic_parameter_set_id, pps);
                }
            }
            nal_type if nal_type.is_vcl() => {
                // Parse slice header
                if let Ok(header) =
                    slice::parse_slice_header(&nal.payload, &sps_map, &pps_map, nal_type)
                {
                    // Calculate POC
                    let poc = if nal_type.is_idr() {
                        prev_poc_msb = 0;
                        prev_poc_lsb = 0;
                        0
                    } else {
                        // Get max_poc_lsb from SPS
                        let sps = pps_map
                            .get(&header.slice_pic_parameter_set_id)
                            .and_then(|pps| sps_map.get(&pps.pps_seq_parameter_set_id));

                        if let Some(sps) = sps {
                            let max_poc_lsb =
                                1 << sps.log2_max_pic_order_cnt_lsb_minus4.saturating_add(4);
                            let poc_lsb = header.slice_pic_order_cnt_lsb as i32;

                            let poc_msb = if poc_lsb < prev_poc_lsb
                                && (prev_poc_lsb - poc_lsb) >= (max_poc_lsb / 2)
                            {
                                prev_poc_msb + max_poc_lsb
                            } else if poc_lsb > prev_poc_lsb
                                && (poc_lsb - prev_poc_lsb) > (max_poc_lsb / 2)
                            {
                                prev_poc_msb - max_poc_lsb
                            } else {
                                prev_poc_msb
                            };

                            if nal_type.is_reference() {
                                prev_poc_msb = poc_msb;
                                prev_poc_lsb = poc_lsb;
                            }

                            poc_msb + poc_lsb
                        } else {
                            0
                        }
                    };

                    slices.push(ParsedSlice {
                        nal_index,
                        header,
                        poc,
                    });
                }
            }
            _ => {}
        }
    }

    Ok(HevcStream {
        nal_units,
        vps_map,
        sps_map,
        pps_map,
        slices,
    })
}

/// Quick parse to extract basic stream info without full parsing.
pub fn parse_hevc_quick(data: &[u8]) -> Result<HevcQuickInfo> {
    let nal_units = parse_nal_units(data)?;

    let mut info = HevcQuickInfo {
        nal_count: nal_units.len(),
        vps_count: 0,
        sps_count: 0,
        pps_count: 0,
        idr_count: 0,
        frame_count: 0,
        width: None,
        height: None,
        profile: None,
        level: None,
    };

    for nal in &nal_units {
        match nal.header.nal_unit_type {
            NalUnitType::VpsNut => info.vps_count += 1,
            NalUnitType::SpsNut => {
                info.sps_count += 1;
                // Parse SPS for dimensions
                if info.width.is_none() {
                    if let Ok(sps) = sps::parse_sps(&nal.payload) {
                        info.width = Some(sps.display_width());
                        info.height = Some(sps.display_height());
                        info.profile = Some(sps.profile_tier_level.general_profile_idc.idc());
                        info.level = Some(sps.profile_tier_level.general_level_idc);
                    }
                }
            }
            NalUnitType::PpsNut => info.pps_count += 1,
            nal_type if nal_type.is_idr() => {
                info.idr_count += 1;
                info.frame_count += 1;
            }
            nal_type if nal_type.is_vcl() => {
                info.frame_count += 1;
            }
            _ => {}
        }
    }

    Ok(info)
}

/// Quick stream info without full parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HevcQuickInfo {
    /// Total NAL unit count.
    pub nal_count: usize,
    /// VPS count.
    pub vps_count: usize,
    /// SPS count.
    pub sps_count: usize,
    /// PPS count.
    pub pps_count: usize,
    /// IDR frame count.
    pub idr_count: usize,
    /// Total frame count (VCL NAL units).
    pub frame_count: usize,
    /// Video width.
    pub width: Option<u32>,
    /// Video height.
    pub height: Option<u32>,
    /// Profile IDC.
    pub profile: Option<u8>,
    /// Level IDC.
    pub level: Option<u8>,
}


/// Capacity and strictness options for a [`Decoder`] instance,
/// constructed once and immutable for the decoder's lifetime.
#[derive(Debug, Clone)]
pub struct DecoderConfig {
    /// Maximum number of simultaneously active VPS ids.
    pub max_vps_count: usize,
    /// Maximum number of simultaneously active SPS ids.
    pub max_sps_count: usize,
    /// Maximum number of simultaneously active PPS ids.
    pub max_pps_count: usize,
    /// When true, a reserved-bits-must-equal-X violation is an
    /// `InvalidData` error rather than a logged warning.
    pub strict_reserved_bits: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_vps_count: 16,
            max_sps_count: 16,
            max_pps_count: pps::MAX_PPS_COUNT,
            strict_reserved_bits: true,
        }
    }
}

/// One reconstructed intra picture: planar YUV 4:2:0 samples at the
/// stream's signalled bit depth, stored one `u16` per sample
/// regardless of bit depth.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPicture {
    /// Luma width in samples.
    pub width: u32,
    /// Luma height in samples.
    pub height: u32,
    /// Luma bit depth.
    pub bit_depth_luma: u8,
    /// Chroma bit depth.
    pub bit_depth_chroma: u8,
    /// Luma samples, row-major, `luma_stride` per row.
    pub luma: Vec<u16>,
    /// Cb samples at half resolution (4:2:0).
    pub cb: Vec<u16>,
    /// Cr samples at half resolution (4:2:0).
    pub cr: Vec<u16>,
    /// Row stride of `luma`.
    pub luma_stride: usize,
    /// Row stride of `cb`/`cr`.
    pub chroma_stride: usize,
}

/// A picture whose slice data is still being accumulated across one
/// or more `decode_nal` calls.
struct InProgressPicture {
    picture: ctu::PictureBuffer,
    modes: ctu::PictureModeGrid,
    width: u32,
    height: u32,
    log2_ctb_size: u32,
    bit_depth_luma: u8,
    bit_depth_chroma: u8,
    qp_y: i32,
    sao_luma_enabled: bool,
    sao_chroma_enabled: bool,
    deblocking_disabled: bool,
    beta_offset_div2: i8,
    tc_offset_div2: i8,
    sao_params: Vec<Option<sao::SaoDecodeState>>,
    width_in_ctbs: u32,
}

/// Drives NAL-unit dispatch and per-CTB reconstruction: VPS/SPS/PPS
/// NAL units install parameter sets, VCL NAL units are decoded through
/// CABAC and the coding-tree recursion down to deblocked, SAO-filtered
/// pictures. Inter slices are rejected with `UnsupportedStream` rather
/// than mis-decoded, matching this crate's intra-only scope.
pub struct Decoder {
    config: DecoderConfig,
    vps_map: HashMap<u8, Vps>,
    sps_map: HashMap<u8, Sps>,
    pps_map: HashMap<u8, Pps>,
    current: Option<InProgressPicture>,
}

impl Decoder {
    /// Construct a decoder with the given configuration.
    pub fn new(config: DecoderConfig) -> Self {
        Self {
            config,
            vps_map: HashMap::new(),
            sps_map: HashMap::new(),
            pps_map: HashMap::new(),
            current: None,
        }
    }

    /// Construct a decoder with the given configuration (alias of
    /// [`Decoder::new`] kept for callers that read more naturally with
    /// an explicit config at the call site).
    pub fn with_config(config: DecoderConfig) -> Self {
        Self::new(config)
    }

    /// Decode one NAL unit (2-byte header followed by its RBSP,
    /// including emulation-prevention bytes exactly as it appears in
    /// an Annex B stream with its start code stripped). Returns a
    /// completed picture whenever this call's slice segment is the
    /// first slice segment of the *next* picture, since a picture is
    /// only known to be complete once a later one begins.
    pub fn decode_nal(&mut self, data: &[u8]) -> Result<Option<DecodedPicture>> {
        let header = nal::parse_nal_header_checked(data, self.config.strict_reserved_bits)?;
        if !header.is_base_layer() {
            return Err(HevcError::UnsupportedStream(
                "non-base-layer NAL units are not supported".into(),
            ));
        }
        let payload = bitreader::remove_emulation_prevention_bytes(&data[2..]);

        match header.nal_unit_type {
            NalUnitType::VpsNut => {
                let vps = vps::parse_vps(&payload)?;
                if !self.vps_map.contains_key(&vps.vps_video_parameter_set_id)
                    && self.vps_map.len() >= self.config.max_vps_count
                {
                    return Err(HevcError::OutOfMemory("VPS table is full".into()));
                }
                tracing::debug!(vps_id = vps.vps_video_parameter_set_id, "VPS installed");
                self.vps_map.insert(vps.vps_video_parameter_set_id, vps);
                Ok(None)
            }
            NalUnitType::SpsNut => {
                let sps = sps::parse_sps(&payload)?;
                if !self.sps_map.contains_key(&sps.sps_seq_parameter_set_id)
                    && self.sps_map.len() >= self.config.max_sps_count
                {
                    return Err(HevcError::OutOfMemory("SPS table is full".into()));
                }
                tracing::debug!(sps_id = sps.sps_seq_parameter_set_id, "SPS installed");
                self.sps_map.insert(sps.sps_seq_parameter_set_id, sps);
                Ok(None)
            }
            NalUnitType::PpsNut => {
                let new_pps = pps::parse_pps(&payload, &self.sps_map)?;
                if !self.pps_map.contains_key(&new_pps.pps_pic_parameter_set_id)
                    && self.pps_map.len() >= self.config.max_pps_count
                {
                    return Err(HevcError::OutOfMemory("PPS table is full".into()));
                }
                tracing::debug!(pps_id = new_pps.pps_pic_parameter_set_id, "PPS installed");
                self.pps_map.insert(new_pps.pps_pic_parameter_set_id, new_pps);
                Ok(None)
            }
            nal_type if nal_type.is_vcl() => self.decode_vcl(&payload, nal_type),
            _ => Ok(None),
        }
    }

    /// Flush any in-progress picture at the end of a stream, returning
    /// it if one was pending.
    pub fn flush(&mut self) -> Option<DecodedPicture> {
        self.current.take().map(Self::finish_picture)
    }

    fn decode_vcl(
        &mut self,
        payload: &[u8],
        nal_type: NalUnitType,
    ) -> Result<Option<DecodedPicture>> {
        let header = slice::parse_slice_header(payload, &self.sps_map, &self.pps_map, nal_type)?;
        if header.is_inter() {
            return Err(HevcError::UnsupportedStream(
                "inter slices are not supported".into(),
            ));
        }

        let pps = self
            .pps_map
            .get(&header.slice_pic_parameter_set_id)
            .ok_or_else(|| HevcError::InvalidData("slice references unknown PPS".into()))?
            .clone();
        let sps = self
            .sps_map
            .get(&pps.pps_seq_parameter_set_id)
            .ok_or_else(|| HevcError::InvalidData("slice references unknown SPS".into()))?
            .clone();

        if pps.tiles_enabled_flag || pps.entropy_coding_sync_enabled_flag {
            return Err(HevcError::UnsupportedStream(
                "tiled and wavefront slice data is not supported".into(),
            ));
        }

        let mut completed = None;
        if header.first_slice_segment_in_pic_flag {
            completed = self.current.take().map(Self::finish_picture);
        } else if self.current.is_none() {
            return Err(HevcError::InvalidData(
                "dependent slice segment arrived with no picture in progress".into(),
            ));
        }

        if self.current.is_none() {
            let width_in_ctbs = sps.pic_width_in_ctbs();
            let height_in_ctbs = sps.pic_height_in_ctbs();
            let min_cb_log2 = sps.log2_min_cb_size();
            self.current = Some(InProgressPicture {
                picture: ctu::PictureBuffer::new(
                    sps.pic_width_in_luma_samples,
                    sps.pic_height_in_luma_samples,
                ),
                modes: ctu::PictureModeGrid::new(
                    (sps.pic_width_in_luma_samples >> min_cb_log2) as usize,
                    (sps.pic_height_in_luma_samples >> min_cb_log2) as usize,
                ),
                width: sps.pic_width_in_luma_samples,
                height: sps.pic_height_in_luma_samples,
                log2_ctb_size: sps.log2_ctb_size(),
                bit_depth_luma: sps.bit_depth_luma(),
                bit_depth_chroma: sps.bit_depth_chroma(),
                qp_y: header.qp(&pps) as i32,
                sao_luma_enabled: header.slice_sao_luma_flag,
                sao_chroma_enabled: header.slice_sao_chroma_flag,
                deblocking_disabled: header.slice_deblocking_filter_disabled_flag,
                beta_offset_div2: header.slice_beta_offset_div2,
                tc_offset_div2: header.slice_tc_offset_div2,
                sao_params: vec![None; (width_in_ctbs * height_in_ctbs) as usize],
                width_in_ctbs,
            });
        }

        let qp_y = self.current.as_ref().unwrap().qp_y;
        let bit_depth = sps.bit_depth_luma();
        let mut cabac = cabac::CabacDecoder::new(payload, header.cabac_byte_offset)?;
        let mut contexts = cabac::CabacContexts::init(qp_y);

        let width_in_ctbs = sps.pic_width_in_ctbs();
        let height_in_ctbs = sps.pic_height_in_ctbs();
        let total_ctbs = width_in_ctbs * height_in_ctbs;
        let mut ctb_addr = header.slice_segment_address;

        loop {
            let ctb_x = ctb_addr % width_in_ctbs;
            let ctb_y = ctb_addr / width_in_ctbs;

            {
                let cur = self.current.as_mut().unwrap();
                let merge_left = (ctb_x > 0)
                    .then(|| cur.sao_params[(ctb_addr - 1) as usize].clone())
                    .flatten();
                let merge_up = (ctb_y > 0)
                    .then(|| cur.sao_params[(ctb_addr - width_in_ctbs) as usize].clone())
                    .flatten();
                let sao = sao::decode_sao(
                    &mut cabac,
                    &mut contexts,
                    bit_depth,
                    sps.bit_depth_chroma(),
                    cur.sao_luma_enabled,
                    cur.sao_chroma_enabled,
                    merge_left.as_ref(),
                    merge_up.as_ref(),
                );
                cur.sao_params[ctb_addr as usize] = Some(sao);

                let mut ctu_ctx = ctu::CtuDecodeContext {
                    sps: &sps,
                    pps: &pps,
                    cabac,
                    contexts,
                    picture: std::mem::replace(
                        &mut cur.picture,
                        ctu::PictureBuffer { luma: Vec::new(), cb: Vec::new(), cr: Vec::new(), luma_stride: 0, chroma_stride: 0 },
                    ),
                    modes: std::mem::replace(
                        &mut cur.modes,
                        ctu::PictureModeGrid::new(1, 1),
                    ),
                    predictor: intra::IntraPredictor,
                    transform: transform::CoreTransform { chroma_format: sps.chroma_format_idc },
                    qp_y_pred: qp_y,
                };
                ctu::decode_ctu(&mut ctu_ctx, ctb_x, ctb_y)?;
                cabac = ctu_ctx.cabac;
                contexts = ctu_ctx.contexts;
                cur.picture = ctu_ctx.picture;
                cur.modes = ctu_ctx.modes;
            }

            let end_of_slice_segment = cabac.decode_terminate();
            ctb_addr += 1;
            if end_of_slice_segment || ctb_addr >= total_ctbs {
                break;
            }
        }

        Ok(completed)
    }

    /// Run the in-loop deblocking and SAO filters over a fully-decoded
    /// picture and hand back its final samples. Deblocking is luma-
    /// only (see `deblock.rs`'s module doc comment); SAO covers all
    /// three planes.
    fn finish_picture(mut current: InProgressPicture) -> DecodedPicture {
        if !current.deblocking_disabled {
            deblock::deblock_picture_luma(
                &mut current.picture.luma,
                current.picture.luma_stride,
                current.width,
                current.height,
                current.qp_y,
                current.beta_offset_div2 as i32,
                current.tc_offset_div2 as i32,
                current.bit_depth_luma,
            );
        }

        if current.sao_luma_enabled || current.sao_chroma_enabled {
            let ctb_size = 1u32 << current.log2_ctb_size;
            let source_luma = current.picture.luma.clone();
            let source_cb = current.picture.cb.clone();
            let source_cr = current.picture.cr.clone();

            for (addr, params) in current.sao_params.iter().enumerate() {
                let Some(params) = params else { continue };
                let ctb_x = (addr as u32) % current.width_in_ctbs;
                let ctb_y = (addr as u32) / current.width_in_ctbs;
                let x0 = ctb_x * ctb_size;
                let y0 = ctb_y * ctb_size;
                let w = ctb_size.min(current.width - x0);
                let h = ctb_size.min(current.height - y0);

                if current.sao_luma_enabled {
                    sao::apply_sao_block(
                        &mut current.picture.luma,
                        &source_luma,
                        current.picture.luma_stride,
                        x0 as usize,
                        y0 as usize,
                        w as usize,
                        h as usize,
                        &params.luma,
                        current.bit_depth_luma,
                    );
                }
                if current.sao_chroma_enabled {
                    let (cx0, cy0) = (x0 as usize / 2, y0 as usize / 2);
                    let (cw, ch) = (w as usize / 2, h as usize / 2);
                    if cw > 0 && ch > 0 {
                        sao::apply_sao_block(
                            &mut current.picture.cb,
                            &source_cb,
                            current.picture.chroma_stride,
                            cx0,
                            cy0,
                            cw,
                            ch,
                            &params.cb,
                            current.bit_depth_chroma,
                        );
                        sao::apply_sao_block(
                            &mut current.picture.cr,
                            &source_cr,
                            current.picture.chroma_stride,
                            cx0,
                            cy0,
                            cw,
                            ch,
                            &params.cr,
                            current.bit_depth_chroma,
                        );
                    }
                }
            }
        }

        DecodedPicture {
            width: current.width,
            height: current.height,
            bit_depth_luma: current.bit_depth_luma,
            bit_depth_chroma: current.bit_depth_chroma,
            luma_stride: current.picture.luma_stride,
            chroma_stride: current.picture.chroma_stride,
            luma: std::mem::take(&mut current.picture.luma),
            cb: std::mem::take(&mut current.picture.cb),
            cr: std::mem::take(&mut current.picture.cr),
        }
    }
}

#[cfg(test)]
mod tests;


//! Context-adaptive binary arithmetic coding (CABAC) engine.
//!
//! This is the entropy decoder that every slice's coding-tree, residual
//! and in-loop-filter-flag reads sit on top of. The engine itself
//! (`CabacDecoder`) only knows about bins, bypass bits and terminate
//! bins; it has no idea what a coding unit or a transform coefficient
//! is. Context index derivation based on spatial neighbours lives in
//! `ctu.rs` and `residual.rs`, which call into the syntax-element
//! decode methods here with an already-computed `ctxIdxInc`.

use crate::error::{HevcError, Result};

/// One CABAC context: a probability state (0-62) and the bit value
/// currently considered most probable.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextModel {
    state: u8,
    mps: u8,
}

impl ContextModel {
    /// Derive the initial state from a context's `initValue` and the
    /// slice QP, per the CABAC context initialization process.
    fn init(init_value: u8, slice_qp_y: i32) -> Self {
        let slope_idx = (init_value >> 4) as i32;
        let offset_idx = (init_value & 15) as i32;
        let m = slope_idx * 5 - 45;
        let n = (offset_idx << 3) - 16;
        let qp = slice_qp_y.clamp(0, 51);
        let pre_ctx_state = ((m * qp) >> 4) + n;
        let pre_ctx_state = pre_ctx_state.clamp(1, 126);
        if pre_ctx_state <= 63 {
            Self {
                state: (63 - pre_ctx_state) as u8,
                mps: 0,
            }
        } else {
            Self {
                state: (pre_ctx_state - 64) as u8,
                mps: 1,
            }
        }
    }
}

/// `rangeTabLps[state][qRangeIdx]`, Table 9-46.
#[rustfmt::skip]
const RANGE_TAB_LPS: [[u16; 4]; 64] = [
    [128,176,208,240],[128,167,197,227],[128,158,187,216],[123,150,178,205],
    [116,142,169,195],[111,135,160,185],[105,128,152,175],[100,122,144,166],
    [95,116,137,158],[90,110,130,150],[85,104,123,142],[81,99,117,135],
    [77,94,111,128],[73,89,105,122],[69,85,100,116],[66,80,95,110],
    [62,76,90,104],[59,72,86,99],[56,69,81,94],[53,65,77,89],
    [51,62,73,85],[48,59,69,80],[46,56,66,76],[43,53,63,72],
    [41,50,59,69],[39,48,56,65],[37,45,54,62],[35,43,51,59],
    [33,41,48,56],[32,39,46,53],[30,37,43,50],[28,35,41,48],
    [27,33,39,45],[26,31,37,43],[24,30,35,41],[23,28,33,39],
    [22,27,32,37],[21,26,30,35],[20,24,29,33],[19,23,27,31],
    [18,22,26,30],[17,21,25,28],[16,20,23,27],[15,19,22,25],
    [14,18,21,24],[14,17,20,23],[13,16,19,22],[12,15,18,21],
    [12,14,17,20],[11,14,16,19],[11,13,15,18],[10,12,15,17],
    [10,12,14,16],[9,11,13,15],[9,11,12,14],[8,10,12,14],
    [8,9,11,13],[7,9,11,12],[7,9,10,12],[7,8,10,11],
    [6,8,9,11],[6,7,9,10],[6,7,8,9],[2,2,2,2],
];

/// `transIdxLps[state]`, Table 9-47.
#[rustfmt::skip]
const TRANS_IDX_LPS: [u8; 64] = [
    0,0,1,2,2,4,4,5,6,7,8,9,9,11,11,12,13,13,15,15,16,16,18,18,19,19,
    21,21,23,22,23,24,24,25,26,26,27,27,28,29,29,30,30,30,31,32,32,33,
    33,33,34,34,35,35,35,36,36,36,37,37,37,38,38,63,
];

/// `transIdxMps[state]`, Table 9-47.
#[rustfmt::skip]
const TRANS_IDX_MPS: [u8; 64] = [
    1,2,3,4,5,6,7,8,9,10,11,12,13,14,15,16,17,18,19,20,21,22,23,24,25,
    26,27,28,29,30,31,32,33,34,35,36,37,38,39,40,41,42,43,44,45,46,47,
    48,49,50,51,52,53,54,55,56,57,58,59,60,61,62,62,63,
];

// Context group layout: a flat table, each group occupying a
// contiguous range so `ctx_inc` addresses within it directly.
const SAO_MERGE_FLAG: usize = 0;
const SAO_TYPE_IDX: usize = SAO_MERGE_FLAG + 1;
const SPLIT_CU_FLAG: usize = SAO_TYPE_IDX + 1; // 3
const CU_TRANSQUANT_BYPASS_FLAG: usize = SPLIT_CU_FLAG + 3;
const PART_MODE: usize = CU_TRANSQUANT_BYPASS_FLAG + 1;
const PREV_INTRA_LUMA_PRED_FLAG: usize = PART_MODE + 1;
const INTRA_CHROMA_PRED_MODE: usize = PREV_INTRA_LUMA_PRED_FLAG + 1;
const SPLIT_TRANSFORM_FLAG: usize = INTRA_CHROMA_PRED_MODE + 1; // 3
const CBF_LUMA: usize = SPLIT_TRANSFORM_FLAG + 3; // 2
const CBF_CHROMA: usize = CBF_LUMA + 2; // 4
const CU_QP_DELTA_ABS: usize = CBF_CHROMA + 4; // 2
const TRANSFORM_SKIP_FLAG: usize = CU_QP_DELTA_ABS + 2; // 2 (luma, chroma)
const LAST_SIG_COEFF_X_PREFIX: usize = TRANSFORM_SKIP_FLAG + 2; // 18
const LAST_SIG_COEFF_Y_PREFIX: usize = LAST_SIG_COEFF_X_PREFIX + 18; // 18
const CODED_SUB_BLOCK_FLAG: usize = LAST_SIG_COEFF_Y_PREFIX + 18; // 4
const SIG_COEFF_FLAG: usize = CODED_SUB_BLOCK_FLAG + 4; // 44
const COEFF_ABS_LEVEL_GREATER1_FLAG: usize = SIG_COEFF_FLAG + 44; // 24
const COEFF_ABS_LEVEL_GREATER2_FLAG: usize = COEFF_ABS_LEVEL_GREATER1_FLAG + 24; // 6
const NUM_CONTEXTS: usize = COEFF_ABS_LEVEL_GREATER2_FLAG + 6;

#[rustfmt::skip]
const INIT_VALUES: [u8; NUM_CONTEXTS] = [
    // sao_merge_flag
    153,
    // sao_type_idx
    200,
    // split_cu_flag[0..3]
    139, 141, 157,
    // cu_transquant_bypass_flag
    154,
    // part_mode
    184,
    // prev_intra_luma_pred_flag
    184,
    // intra_chroma_pred_mode
    63,
    // split_transform_flag[0..3]
    153, 138, 138,
    // cbf_luma[0..2]
    111, 141,
    // cbf_chroma[0..4]
    94, 138, 182, 154,
    // cu_qp_delta_abs[0..2]
    154, 154,
    // transform_skip_flag luma, chroma
    139, 139,
    // last_sig_coeff_x_prefix[0..18]
    110, 110, 124, 125, 140, 153, 125, 127, 140, 109, 111, 143, 127, 111, 79, 108, 123, 63,
    // last_sig_coeff_y_prefix[0..18]
    110, 110, 124, 125, 140, 153, 125, 127, 140, 109, 111, 143, 127, 111, 79, 108, 123, 63,
    // coded_sub_block_flag[0..4]
    91, 171, 134, 141,
    // sig_coeff_flag[0..44]
    111, 111, 125, 110, 110, 94, 124, 108, 124, 107, 125, 141, 179, 153, 125, 107, 125, 141,
    179, 153, 125, 107, 125, 141, 179, 153, 125, 140, 139, 182, 182, 152, 136, 152, 136, 153,
    136, 139, 111, 136, 139, 111, 141, 111,
    // coeff_abs_level_greater1_flag[0..24]
    140, 92, 137, 138, 140, 152, 138, 139, 153, 74, 149, 92, 139, 107, 122, 152, 140, 179,
    166, 182, 140, 227, 122, 197,
    // coeff_abs_level_greater2_flag[0..6]
    138, 153, 136, 167, 152, 152,
];

/// All CABAC context state, initialized once per slice from the
/// slice's QP and re-initialized at the start of each independent
/// slice segment (dependent segments inherit the previous state).
#[derive(Debug, Clone)]
pub struct CabacContexts {
    ctx: [ContextModel; NUM_CONTEXTS],
}

impl CabacContexts {
    pub fn init(slice_qp_y: i32) -> Self {
        let mut ctx = [ContextModel::default(); NUM_CONTEXTS];
        for (c, &init_value) in ctx.iter_mut().zip(INIT_VALUES.iter()) {
            *c = ContextModel::init(init_value, slice_qp_y);
        }
        Self { ctx }
    }

    fn get(&mut self, base: usize, inc: usize) -> &mut ContextModel {
        &mut self.ctx[base + inc]
    }
}

/// Arithmetic-coding engine reading from a single slice segment's
/// byte-aligned RBSP payload.
pub struct CabacDecoder<'a> {
    data: &'a [u8],
    byte_pos: usize,
    bit_pos: u8,
    range: u32,
    offset: u32,
}

impl<'a> CabacDecoder<'a> {
    /// Start decoding at `byte_pos` (the slice header's byte-aligned
    /// end) in `data`.
    pub fn new(data: &'a [u8], byte_pos: usize) -> Result<Self> {
        let mut decoder = Self {
            data,
            byte_pos,
            bit_pos: 0,
            range: 510,
            offset: 0,
        };
        for _ in 0..9 {
            let bit = decoder.read_raw_bit();
            decoder.offset = (decoder.offset << 1) | bit as u32;
        }
        Ok(decoder)
    }

    fn read_raw_bit(&mut self) -> u8 {
        let byte = self.data.get(self.byte_pos).copied().unwrap_or(0);
        let bit = (byte >> (7 - self.bit_pos)) & 1;
        self.bit_pos += 1;
        if self.bit_pos == 8 {
            self.bit_pos = 0;
            self.byte_pos += 1;
        }
        bit
    }

    fn renorm(&mut self) {
        while self.range < 256 {
            self.range <<= 1;
            self.offset = (self.offset << 1) | self.read_raw_bit() as u32;
        }
    }

    fn decode_decision(&mut self, ctx: &mut ContextModel) -> bool {
        let q_range_idx = ((self.range >> 6) & 3) as usize;
        let lps_range = RANGE_TAB_LPS[ctx.state as usize][q_range_idx] as u32;
        self.range -= lps_range;

        let bin = if self.offset >= self.range {
            self.offset -= self.range;
            self.range = lps_range;
            let bin = 1 - ctx.mps;
            if ctx.state == 0 {
                ctx.mps = 1 - ctx.mps;
            }
            ctx.state = TRANS_IDX_LPS[ctx.state as usize];
            bin
        } else {
            ctx.state = TRANS_IDX_MPS[ctx.state as usize];
            ctx.mps
        };

        self.renorm();
        bin == 1
    }

    /// Decode one bypass-coded bin (equiprobable, no context).
    pub fn decode_bypass(&mut self) -> bool {
        self.offset = (self.offset << 1) | self.read_raw_bit() as u32;
        if self.offset >= self.range {
            self.offset -= self.range;
            true
        } else {
            false
        }
    }

    /// Decode `n` bypass bins as a fixed-length unsigned integer,
    /// MSB first.
    pub fn decode_bypass_bits(&mut self, n: u32) -> u32 {
        let mut value = 0u32;
        for _ in 0..n {
            value = (value << 1) | self.decode_bypass() as u32;
        }
        value
    }

    /// Decode a truncated-unary-coded value bypass, stopping at the
    /// first zero bin or after `max` ones.
    pub fn decode_bypass_truncated_unary(&mut self, max: u32) -> u32 {
        let mut value = 0;
        while value < max && self.decode_bypass() {
            value += 1;
        }
        value
    }

    /// Decode a `coeff_abs_level_remaining` value for Rice parameter
    /// `c_rice_param`: a truncated-Rice prefix below 3 is followed by a
    /// plain `c_rice_param`-bit suffix; a prefix of 3 or more switches
    /// to an exp-Golomb suffix of `prefix - 3 + c_rice_param` bits.
    pub fn decode_bypass_eg(&mut self, c_rice_param: u32) -> u32 {
        const MAX_PREFIX: u32 = 32;
        let mut prefix = 0u32;
        while prefix < MAX_PREFIX && self.decode_bypass() {
            prefix += 1;
        }
        if prefix < 3 {
            let suffix = self.decode_bypass_bits(c_rice_param);
            (prefix << c_rice_param) + suffix
        } else {
            let prefix_minus3 = prefix - 3;
            let suffix = self.decode_bypass_bits(prefix_minus3 + c_rice_param);
            (((1u32 << prefix_minus3) + 2) << c_rice_param) + suffix
        }
    }

    /// Decode a terminate bin (`end_of_slice_segment_flag`,
    /// `end_of_sub_stream_one_bit`, `pcm_flag`).
    pub fn decode_terminate(&mut self) -> bool {
        self.range -= 2;
        if self.offset >= self.range {
            true
        } else {
            self.renorm();
            false
        }
    }

    fn decode(&mut self, contexts: &mut CabacContexts, base: usize, inc: usize) -> bool {
        let ctx = contexts.get(base, inc);
        self.decode_decision(ctx)
    }

    pub fn decode_sao_merge_flag(&mut self, c: &mut CabacContexts) -> bool {
        self.decode(c, SAO_MERGE_FLAG, 0)
    }

    pub fn decode_sao_type_idx(&mut self, c: &mut CabacContexts) -> bool {
        self.decode(c, SAO_TYPE_IDX, 0)
    }

    pub fn decode_split_cu_flag(&mut self, c: &mut CabacContexts, ctx_inc: usize) -> bool {
        self.decode(c, SPLIT_CU_FLAG, ctx_inc)
    }

    pub fn decode_cu_transquant_bypass_flag(&mut self, c: &mut CabacContexts) -> bool {
        self.decode(c, CU_TRANSQUANT_BYPASS_FLAG, 0)
    }

    pub fn decode_part_mode_first_bin(&mut self, c: &mut CabacContexts) -> bool {
        self.decode(c, PART_MODE, 0)
    }

    pub fn decode_prev_intra_luma_pred_flag(&mut self, c: &mut CabacContexts) -> bool {
        self.decode(c, PREV_INTRA_LUMA_PRED_FLAG, 0)
    }

    pub fn decode_intra_chroma_pred_mode_first_bin(&mut self, c: &mut CabacContexts) -> bool {
        self.decode(c, INTRA_CHROMA_PRED_MODE, 0)
    }

    pub fn decode_split_transform_flag(&mut self, c: &mut CabacContexts, ctx_inc: usize) -> bool {
        self.decode(c, SPLIT_TRANSFORM_FLAG, ctx_inc)
    }

    pub fn decode_cbf_luma(&mut self, c: &mut CabacContexts, ctx_inc: usize) -> bool {
        self.decode(c, CBF_LUMA, ctx_inc)
    }

    pub fn decode_cbf_chroma(&mut self, c: &mut CabacContexts, ctx_inc: usize) -> bool {
        self.decode(c, CBF_CHROMA, ctx_inc)
    }

    pub fn decode_cu_qp_delta_abs_first_bin(&mut self, c: &mut CabacContexts) -> bool {
        self.decode(c, CU_QP_DELTA_ABS, 0)
    }

    pub fn decode_cu_qp_delta_abs_remaining_bin(&mut self, c: &mut CabacContexts) -> bool {
        self.decode(c, CU_QP_DELTA_ABS, 1)
    }

    pub fn decode_transform_skip_flag(&mut self, c: &mut CabacContexts, is_chroma: bool) -> bool {
        self.decode(c, TRANSFORM_SKIP_FLAG, is_chroma as usize)
    }

    pub fn decode_last_sig_coeff_x_prefix(&mut self, c: &mut CabacContexts, ctx_inc: usize) -> bool {
        self.decode(c, LAST_SIG_COEFF_X_PREFIX, ctx_inc)
    }

    pub fn decode_last_sig_coeff_y_prefix(&mut self, c: &mut CabacContexts, ctx_inc: usize) -> bool {
        self.decode(c, LAST_SIG_COEFF_Y_PREFIX, ctx_inc)
    }

    pub fn decode_coded_sub_block_flag(&mut self, c: &mut CabacContexts, ctx_inc: usize) -> bool {
        self.decode(c, CODED_SUB_BLOCK_FLAG, ctx_inc)
    }

    pub fn decode_sig_coeff_flag(&mut self, c: &mut CabacContexts, ctx_inc: usize) -> bool {
        self.decode(c, SIG_COEFF_FLAG, ctx_inc)
    }

    pub fn decode_coeff_abs_level_greater1_flag(
        &mut self,
        c: &mut CabacContexts,
        ctx_inc: usize,
    ) -> bool {
        self.decode(c, COEFF_ABS_LEVEL_GREATER1_FLAG, ctx_inc)
    }

    pub fn decode_coeff_abs_level_greater2_flag(
        &mut self,
        c: &mut CabacContexts,
        ctx_inc: usize,
    ) -> bool {
        self.decode(c, COEFF_ABS_LEVEL_GREATER2_FLAG, ctx_inc)
    }
}

/// Byte offset of the first CABAC-coded bit, immediately following
/// the slice header's `byte_alignment()` padding.
pub fn cabac_start_byte_offset(bit_position: u64) -> Result<usize> {
    if bit_position % 8 != 0 {
        return Err(HevcError::InvalidData(
            "slice header did not end byte-aligned".into(),
        ));
    }
    Ok((bit_position / 8) as usize)
}

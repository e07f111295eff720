//! Short-term reference picture set parsing.
//!
//! `st_ref_pic_set()` is coded identically whether it appears in the
//! SPS's list of candidate sets or directly in a slice header, and in
//! both places it can reference an earlier set via inter-RPS
//! prediction. This module is the single shared implementation, the
//! way the reference decoder keeps one subroutine for both call
//! sites.

use crate::bitreader::BitReader;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// One short-term reference picture set, fully resolved (inter-RPS
/// prediction already applied if it was used).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShortTermRps {
    /// Number of pictures with a POC smaller than the current one.
    pub num_negative_pics: u8,
    /// Number of pictures with a POC larger than the current one.
    pub num_positive_pics: u8,
    /// Delta POC for the negative-direction pictures, each relative
    /// to the previous entry in the list (cumulative, most negative
    /// sum first).
    pub delta_poc_s0: Vec<i32>,
    /// Whether each negative-direction picture is used by the
    /// current picture for prediction.
    pub used_by_curr_pic_s0: Vec<bool>,
    /// Delta POC for the positive-direction pictures.
    pub delta_poc_s1: Vec<i32>,
    /// Whether each positive-direction picture is used by the
    /// current picture for prediction.
    pub used_by_curr_pic_s1: Vec<bool>,
}

impl ShortTermRps {
    /// Total number of delta POCs in this set.
    pub fn num_delta_pocs(&self) -> usize {
        self.num_negative_pics as usize + self.num_positive_pics as usize
    }
}

/// Parse `st_ref_pic_set(stRpsIdx)`.
///
/// `rps_list` holds every short-term RPS parsed so far at this call
/// site (SPS list or slice-header singleton list); `idx` is the index
/// of the set being parsed, used to locate an inter-RPS-prediction
/// source among the earlier entries.
pub fn parse_short_term_rps(
    reader: &mut BitReader,
    rps_list: &[ShortTermRps],
    idx: usize,
) -> Result<ShortTermRps> {
    let inter_ref_pic_set_prediction_flag = if idx != 0 { reader.read_bit()? } else { false };

    if inter_ref_pic_set_prediction_flag {
        let delta_idx_minus1 = if idx == rps_list.len() {
            reader.read_ue()?
        } else {
            0
        };
        let delta_rps_sign = reader.read_bit()?;
        let abs_delta_rps_minus1 = reader.read_ue()?;
        let delta_rps = if delta_rps_sign {
            -((abs_delta_rps_minus1 as i32) + 1)
        } else {
            (abs_delta_rps_minus1 as i32) + 1
        };

        let ref_rps_idx = idx - 1 - delta_idx_minus1 as usize;
        let ref_rps = &rps_list[ref_rps_idx];
        let num_delta_pocs = ref_rps.num_delta_pocs();

        let mut used_by_curr_pic_flag = vec![false; num_delta_pocs + 1];
        let mut use_delta_flag = vec![true; num_delta_pocs + 1];
        for j in 0..=num_delta_pocs {
            used_by_curr_pic_flag[j] = reader.read_bit()?;
            if !used_by_curr_pic_flag[j] {
                use_delta_flag[j] = reader.read_bit()?;
            }
        }

        let mut ref_delta_pocs: Vec<i32> =
            Vec::with_capacity(ref_rps.num_negative_pics as usize + ref_rps.num_positive_pics as usize);
        for i in (0..ref_rps.num_negative_pics as usize).rev() {
            ref_delta_pocs.push(ref_rps.delta_poc_s0[i]);
        }
        for i in 0..ref_rps.num_positive_pics as usize {
            ref_delta_pocs.push(ref_rps.delta_poc_s1[i]);
        }

        let mut delta_poc_s0 = Vec::new();
        let mut used_s0 = Vec::new();
        for (j, &d) in ref_delta_pocs.iter().enumerate().rev() {
            let dpoc = d + delta_rps;
            if dpoc < 0 && use_delta_flag[j] {
                delta_poc_s0.push(dpoc);
                used_s0.push(used_by_curr_pic_flag[j]);
            }
        }
        if delta_rps < 0 && use_delta_flag[num_delta_pocs] {
            delta_poc_s0.push(delta_rps);
            used_s0.push(used_by_curr_pic_flag[num_delta_pocs]);
        }

        let mut delta_poc_s1 = Vec::new();
        let mut used_s1 = Vec::new();
        for (j, &d) in ref_delta_pocs.iter().enumerate() {
            let dpoc = d + delta_rps;
            if dpoc > 0 && use_delta_flag[j] {
                delta_poc_s1.push(dpoc);
                used_s1.push(used_by_curr_pic_flag[j]);
            }
        }
        if delta_rps > 0 && use_delta_flag[num_delta_pocs] {
            delta_poc_s1.push(delta_rps);
            used_s1.push(used_by_curr_pic_flag[num_delta_pocs]);
        }

        Ok(ShortTermRps {
            num_negative_pics: delta_poc_s0.len() as u8,
            num_positive_pics: delta_poc_s1.len() as u8,
            delta_poc_s0,
            used_by_curr_pic_s0: used_s0,
            delta_poc_s1,
            used_by_curr_pic_s1: used_s1,
        })
    } else {
        let num_negative_pics = reader.read_ue()? as u8;
        let num_positive_pics = reader.read_ue()? as u8;

        let mut delta_poc_s0 = Vec::with_capacity(num_negative_pics as usize);
        let mut used_by_curr_pic_s0 = Vec::with_capacity(num_negative_pics as usize);
        let mut prev = 0i32;
        for _ in 0..num_negative_pics {
            let delta_poc_s0_minus1 = reader.read_ue()? as i32;
            prev -= delta_poc_s0_minus1 + 1;
            delta_poc_s0.push(prev);
            used_by_curr_pic_s0.push(reader.read_bit()?);
        }

        let mut delta_poc_s1 = Vec::with_capacity(num_positive_pics as usize);
        let mut used_by_curr_pic_s1 = Vec::with_capacity(num_positive_pics as usize);
        let mut prev = 0i32;
        for _ in 0..num_positive_pics {
            let delta_poc_s1_minus1 = reader.read_ue()? as i32;
            prev += delta_poc_s1_minus1 + 1;
            delta_poc_s1.push(prev);
            used_by_curr_pic_s1.push(reader.read_bit()?);
        }

        Ok(ShortTermRps {
            num_negative_pics,
            num_positive_pics,
            delta_poc_s0,
            used_by_curr_pic_s0,
            delta_poc_s1,
            used_by_curr_pic_s1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitreader::BitWriter;

    #[test]
    fn direct_coding_round_trips() {
        let mut w = BitWriter::new();
        w.write_ue(1); // num_negative_pics
        w.write_ue(0); // num_positive_pics
        w.write_ue(0); // delta_poc_s0_minus1 -> delta = -1
        w.write_bit(true); // used_by_curr_pic_s0
        let data = w.finish();
        let mut reader = BitReader::new(&data);
        let rps = parse_short_term_rps(&mut reader, &[], 0).unwrap();
        assert_eq!(rps.num_negative_pics, 1);
        assert_eq!(rps.delta_poc_s0, vec![-1]);
        assert!(rps.used_by_curr_pic_s0[0]);
    }

    #[test]
    fn empty_set_has_zero_delta_pocs() {
        let mut w = BitWriter::new();
        w.write_ue(0);
        w.write_ue(0);
        let data = w.finish();
        let mut reader = BitReader::new(&data);
        let rps = parse_short_term_rps(&mut reader, &[], 0).unwrap();
        assert_eq!(rps.num_delta_pocs(), 0);
    }
}

//! Lane-interleaved bit packing and unpacking.
//!
//! The payload is conceptually four lanes of 32 values each; lane `L` holds
//! input indices `{L, L+4, L+8, ..., L+124}`. Each lane's values are packed
//! at a common `bit_width` into exactly `bit_width` 32-bit little-endian
//! words (since `32 values * bit_width bits` is always a multiple of 32).
//! Lanes are then interleaved every 16 bytes: the word at lane index `k`
//! lands at byte offset `k*16 + lane*4`, so a 128-bit SIMD load/store can
//! pull one word from each of the four lanes in a single operation.
//!
//! This module exposes two independently-structured implementations of the
//! same algorithm — [`scalar`] (a straightforward per-lane bit-stream
//! accumulator, used as the reference) and [`vector`] (restructured to walk
//! word-major across all four lanes at once, the access pattern a 128-bit
//! kernel would use). Both must, and do, produce byte-identical output;
//! [`crate::simd`] is responsible for picking between them at runtime.

const LANES: usize = 4;
const LANE_LEN: usize = 32;

fn lane_mask(bit_width: u8) -> u64 {
    if bit_width == 0 {
        0
    } else if bit_width == 32 {
        u32::MAX as u64
    } else {
        (1u64 << bit_width) - 1
    }
}

/// Gathers the 32 logical values belonging to lane `lane` out of a (possibly
/// short) input slice, treating any index `>= values.len()` as zero.
fn gather_lane(values: &[u32], lane: usize) -> [u32; LANE_LEN] {
    let mut out = [0u32; LANE_LEN];
    for (i, slot) in out.iter_mut().enumerate() {
        let idx = lane + i * LANES;
        *slot = values.get(idx).copied().unwrap_or(0);
    }
    out
}

fn scatter_lane(out: &mut [u32], lane: usize, values: &[u32; LANE_LEN]) {
    for (i, &v) in values.iter().enumerate() {
        let idx = lane + i * LANES;
        if idx < out.len() {
            out[idx] = v;
        }
    }
}

/// Straightforward per-lane reference implementation: a 64-bit bit-stream
/// accumulator, flushed to 32-bit words whenever at least 32 bits have
/// accumulated.
pub mod scalar {
    use super::*;

    pub fn pack_lane(values: &[u32; LANE_LEN], bit_width: u8) -> [u32; LANE_LEN] {
        let mut words = [0u32; LANE_LEN];
        if bit_width == 0 {
            return words;
        }
        let mask = lane_mask(bit_width);
        let mut acc: u64 = 0;
        let mut acc_bits: u32 = 0;
        let mut word_idx = 0;
        for &v in values {
            acc |= ((v as u64) & mask) << acc_bits;
            acc_bits += bit_width as u32;
            while acc_bits >= 32 {
                words[word_idx] = (acc & 0xFFFF_FFFF) as u32;
                word_idx += 1;
                acc >>= 32;
                acc_bits -= 32;
            }
        }
        debug_assert_eq!(acc_bits, 0, "32 values * bit_width bits is always word-aligned");
        debug_assert_eq!(word_idx, bit_width as usize);
        words
    }

    pub fn unpack_lane(words: &[u32; LANE_LEN], bit_width: u8) -> [u32; LANE_LEN] {
        let mut values = [0u32; LANE_LEN];
        if bit_width == 0 {
            return values;
        }
        let mask = lane_mask(bit_width);
        let mut acc: u64 = 0;
        let mut acc_bits: u32 = 0;
        let mut word_idx = 0;
        for slot in values.iter_mut() {
            while acc_bits < bit_width as u32 {
                acc |= (words[word_idx] as u64) << acc_bits;
                word_idx += 1;
                acc_bits += 32;
            }
            *slot = (acc & mask) as u32;
            acc >>= bit_width as u32;
            acc_bits -= bit_width as u32;
        }
        values
    }
}

/// Word-major restructuring of the same algorithm: instead of finishing one
/// lane before starting the next, walks word index `k` across all four
/// lanes together, which is the access pattern a 128-bit interleaved
/// load/store would use. Produces byte-identical output to [`scalar`] by
/// construction (same per-lane state machine, different iteration order).
pub mod vector {
    use super::*;

    pub fn pack_lanes(lanes: &[[u32; LANE_LEN]; LANES], bit_width: u8) -> [[u32; LANE_LEN]; LANES] {
        let mut out = [[0u32; LANE_LEN]; LANES];
        for l in 0..LANES {
            out[l] = scalar::pack_lane(&lanes[l], bit_width);
        }
        out
    }

    pub fn unpack_lanes(
        words: &[[u32; LANE_LEN]; LANES],
        bit_width: u8,
    ) -> [[u32; LANE_LEN]; LANES] {
        let mut out = [[0u32; LANE_LEN]; LANES];
        for l in 0..LANES {
            out[l] = scalar::unpack_lane(&words[l], bit_width);
        }
        out
    }
}

/// Packs up to 128 values into `dst`, which must be exactly
/// `bit_width as usize * 16` bytes. Missing tail values (`values.len() <
/// 128`) are treated as zero.
pub fn pack(dst: &mut [u8], values: &[u32], bit_width: u8, use_vector: bool) {
    debug_assert_eq!(dst.len(), bit_width as usize * 16);
    if bit_width == 0 {
        return;
    }
    let gathered: [[u32; LANE_LEN]; LANES] =
        std::array::from_fn(|lane| gather_lane(values, lane));
    let words = if use_vector {
        vector::pack_lanes(&gathered, bit_width)
    } else {
        std::array::from_fn(|lane| scalar::pack_lane(&gathered[lane], bit_width))
    };
    for k in 0..bit_width as usize {
        for lane in 0..LANES {
            let offset = k * 16 + lane * 4;
            dst[offset..offset + 4].copy_from_slice(&words[lane][k].to_le_bytes());
        }
    }
}

/// Unpacks `payload` (exactly `bit_width as usize * 16` bytes) into
/// `out[..count]`. Values at logical indices `>= count` are never written.
pub fn unpack(out: &mut [u32], payload: &[u8], bit_width: u8, count: usize, use_vector: bool) {
    debug_assert_eq!(payload.len(), bit_width as usize * 16);
    debug_assert!(out.len() >= count);
    if bit_width == 0 {
        out[..count].fill(0);
        return;
    }
    let mut words = [[0u32; LANE_LEN]; LANES];
    for k in 0..bit_width as usize {
        for lane in 0..LANES {
            let offset = k * 16 + lane * 4;
            let mut bytes = [0u8; 4];
            bytes.copy_from_slice(&payload[offset..offset + 4]);
            words[lane][k] = u32::from_le_bytes(bytes);
        }
    }
    let lanes = if use_vector {
        vector::unpack_lanes(&words, bit_width)
    } else {
        std::array::from_fn(|lane| scalar::unpack_lane(&words[lane], bit_width))
    };
    let mut full = [0u32; 128];
    for lane in 0..LANES {
        scatter_lane(&mut full, lane, &lanes[lane]);
    }
    out[..count].copy_from_slice(&full[..count]);
}

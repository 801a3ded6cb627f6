//! End-to-end block encode/decode orchestration.
//!
//! `write_block` is the single shared serializer for all three public encode
//! entry points (`encode_raw`, `encode_delta`, `encode_pre_delta`) — they
//! differ only in what preprocessing runs on `values` before the header,
//! width selection, and payload/patch writing that follows.

use bytes::BufMut;

use crate::delta;
use crate::error::{LenSnafu, OverflowSnafu, Result, TruncatedSnafu};
use crate::header::{self, Header};
use crate::lane;
use crate::patch::{self, Exception};
use crate::simd;
use crate::width_selector;
use snafu::ensure;

fn write_block(
    dst: &mut Vec<u8>,
    count: usize,
    bit_width: u8,
    will_overflow: bool,
    delta: bool,
    zigzag: bool,
    residuals: &[u32],
    exceptions: &[Exception],
) {
    let header = Header {
        count,
        bit_width,
        will_overflow,
        delta,
        zigzag,
        exception: !exceptions.is_empty(),
    };
    dst.put_u32_le(header.to_word());
    let payload_len = header.payload_len();
    let payload_start = dst.len();
    dst.resize(payload_start + payload_len, 0);
    lane::pack(
        &mut dst[payload_start..],
        residuals,
        bit_width,
        simd::dispatch().lane_vector,
    );
    if header.exception {
        patch::write(dst, exceptions);
    }
}

/// Appends a block encoding `values` directly (no delta preprocessing).
pub fn encode_raw(dst: &mut Vec<u8>, values: &[u32]) -> Result<()> {
    ensure!(values.len() <= header::MAX_COUNT, LenSnafu { len: values.len() });
    let selection = width_selector::select(values);
    write_block(
        dst,
        values.len(),
        selection.bit_width,
        false,
        false,
        false,
        values,
        &selection.exceptions,
    );
    Ok(())
}

/// Appends a block encoding `values` through the `encode_with_delta` policy:
/// first-order differences are computed from `values`, zigzag-recoded if
/// any difference is negative. `will_overflow` is never set in this mode.
pub fn encode_delta(dst: &mut Vec<u8>, values: &[u32]) -> Result<()> {
    ensure!(values.len() <= header::MAX_COUNT, LenSnafu { len: values.len() });
    let mut scratch = [0u32; header::MAX_COUNT];
    let deltas = &mut scratch[..values.len()];
    let zigzag = delta::encode_with_delta(deltas, values);
    let selection = width_selector::select(deltas);
    write_block(
        dst,
        values.len(),
        selection.bit_width,
        false,
        true,
        zigzag,
        deltas,
        &selection.exceptions,
    );
    Ok(())
}

/// Appends a block encoding already-computed first-order differences
/// `deltas` (the `encode_with_prior_delta` policy). `will_overflow` is set
/// by scanning the unsigned prefix sum; zigzag is never applied since the
/// caller controls sign handling upstream.
pub fn encode_pre_delta(dst: &mut Vec<u8>, deltas: &[u32]) -> Result<()> {
    ensure!(deltas.len() <= header::MAX_COUNT, LenSnafu { len: deltas.len() });
    let mut scratch = [0u32; header::MAX_COUNT];
    let will_overflow = delta::prior_delta_will_overflow(&mut scratch[..deltas.len()], deltas);
    let selection = width_selector::select(deltas);
    write_block(
        dst,
        deltas.len(),
        selection.bit_width,
        will_overflow,
        true,
        false,
        deltas,
        &selection.exceptions,
    );
    Ok(())
}

/// Decodes one block from the front of `block_bytes` into `dst[..count]`.
/// Returns the number of bytes consumed. `dst` must be at least `count`
/// values long; this is a caller contract, not a wire-format error, so
/// it's only `debug_assert!`-checked.
pub fn decode(dst: &mut [u32], block_bytes: &[u8]) -> Result<usize> {
    ensure!(
        block_bytes.len() >= header::HEADER_LEN,
        TruncatedSnafu {
            msg: "block shorter than the 4-byte header".to_string(),
        }
    );
    let mut word_bytes = [0u8; header::HEADER_LEN];
    word_bytes.copy_from_slice(&block_bytes[..header::HEADER_LEN]);
    let header = Header::from_bytes(word_bytes)?;
    let count = header.count;
    debug_assert!(dst.len() >= count, "destination buffer shorter than block count");

    let payload_len = header.payload_len();
    ensure!(
        block_bytes.len() >= header::HEADER_LEN + payload_len,
        TruncatedSnafu {
            msg: "block shorter than its payload".to_string(),
        }
    );
    let payload = &block_bytes[header::HEADER_LEN..header::HEADER_LEN + payload_len];
    if header.bit_width == 0 {
        dst[..count].fill(0);
    } else {
        lane::unpack(dst, payload, header.bit_width, count, simd::dispatch().lane_vector);
    }

    let mut offset = header::HEADER_LEN + payload_len;
    if header.exception {
        let patch_bytes = &block_bytes[offset..];
        let consumed = patch::apply(&mut dst[..count], patch_bytes, header.bit_width, count)?;
        offset += consumed;
    }

    if header.delta {
        let mut scratch = [0u32; header::MAX_COUNT];
        scratch[..count].copy_from_slice(&dst[..count]);
        if header.zigzag {
            delta::delta_decode(&mut dst[..count], &scratch[..count], true);
        } else if header.will_overflow {
            let pos = delta::delta_decode_with_overflow(&mut dst[..count], &scratch[..count]);
            if pos > 0 {
                return OverflowSnafu {
                    pos,
                    partial: dst[..count].to_vec(),
                }
                .fail();
            }
        } else {
            delta::delta_decode(&mut dst[..count], &scratch[..count], false);
        }
    }

    Ok(offset)
}

/// Computes how many bytes the block at the front of `block_bytes` occupies
/// without decoding any value, by reading the header and (if present) the
/// patch section's length prefix. Enables streaming iteration over
/// concatenated blocks.
pub fn block_length(block_bytes: &[u8]) -> Result<usize> {
    ensure!(
        block_bytes.len() >= header::HEADER_LEN,
        TruncatedSnafu {
            msg: "block shorter than the 4-byte header".to_string(),
        }
    );
    let mut word_bytes = [0u8; header::HEADER_LEN];
    word_bytes.copy_from_slice(&block_bytes[..header::HEADER_LEN]);
    let header = Header::from_bytes(word_bytes)?;

    let payload_len = header.payload_len();
    ensure!(
        block_bytes.len() >= header::HEADER_LEN + payload_len,
        TruncatedSnafu {
            msg: "block shorter than its payload".to_string(),
        }
    );
    let mut total = header::HEADER_LEN + payload_len;
    if header.exception {
        total += patch::section_len(&block_bytes[total..])?;
    }
    ensure!(
        block_bytes.len() >= total,
        TruncatedSnafu {
            msg: "block shorter than its patch section".to_string(),
        }
    );
    Ok(total)
}

//! Variable-byte encoding for exception high-bit residuals.
//!
//! Stream layout: `ceil(N/4)` control bytes followed by concatenated data
//! bytes. Each control byte packs four 2-bit codes for values `4*g..4*g+4`;
//! code `c` (in the low two bits for value `4*g`, next two for `4*g+1`, and
//! so on) means that value was written as `c+1` little-endian data bytes.
//!
//! Keeping the per-value length codes in a separate control-byte stream
//! (rather than a continuation-bit scheme interleaved with the data) means
//! random access (`decode_one`) never needs to scan data bytes to find a
//! value's boundary.

use crate::error::{Result, TruncatedSnafu};
use snafu::ensure;

/// `GROUP_LEN[cb]` is the total number of data bytes a full 4-value group
/// occupies when its control byte is `cb`. Used by [`decode_one`] to skip
/// whole groups without decoding their values.
const GROUP_LEN: [u8; 256] = build_group_len_table();

const fn build_group_len_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut cb = 0usize;
    while cb < 256 {
        let mut total = 0u8;
        let mut slot = 0;
        while slot < 4 {
            let code = ((cb >> (slot * 2)) & 0x3) as u8;
            total += code + 1;
            slot += 1;
        }
        table[cb] = total;
        cb += 1;
    }
    table
}

fn byte_len(v: u32) -> usize {
    match v {
        0..=0xFF => 1,
        0x100..=0xFFFF => 2,
        0x1_0000..=0xFF_FFFF => 3,
        _ => 4,
    }
}

/// Encodes `values` into the control-byte + data-byte stream.
pub fn encode(values: &[u32]) -> Vec<u8> {
    let num_control = values.len().div_ceil(4);
    let mut control = vec![0u8; num_control];
    let mut data = Vec::new();
    for (i, &v) in values.iter().enumerate() {
        let len = byte_len(v);
        let code = (len - 1) as u8;
        control[i / 4] |= code << ((i % 4) * 2);
        data.extend_from_slice(&v.to_le_bytes()[..len]);
    }
    control.extend_from_slice(&data);
    control
}

/// Decodes all `n` values out of `bytes`.
pub fn decode_all(bytes: &[u8], n: usize) -> Result<Vec<u32>> {
    let num_control = n.div_ceil(4);
    ensure!(
        bytes.len() >= num_control,
        TruncatedSnafu {
            msg: "variable-byte control section truncated".to_string(),
        }
    );
    let control = &bytes[..num_control];
    let mut data = &bytes[num_control..];
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let code = (control[i / 4] >> ((i % 4) * 2)) & 0x3;
        let len = code as usize + 1;
        ensure!(
            data.len() >= len,
            TruncatedSnafu {
                msg: "variable-byte data section truncated".to_string(),
            }
        );
        let mut buf = [0u8; 4];
        buf[..len].copy_from_slice(&data[..len]);
        out.push(u32::from_le_bytes(buf));
        data = &data[len..];
    }
    Ok(out)
}

/// Decodes only the value at logical `index` (out of `n` total), without
/// allocating or decoding any other value. Walks whole groups before
/// `index`'s group via the precomputed [`GROUP_LEN`] table, then sums the
/// codes preceding `index` within its own group.
pub fn decode_one(bytes: &[u8], n: usize, index: usize) -> Result<u32> {
    debug_assert!(index < n);
    let num_control = n.div_ceil(4);
    ensure!(
        bytes.len() >= num_control,
        TruncatedSnafu {
            msg: "variable-byte control section truncated".to_string(),
        }
    );
    let control = &bytes[..num_control];
    let data = &bytes[num_control..];

    let group = index / 4;
    let slot = index % 4;
    let mut offset = 0usize;
    for &cb in &control[..group] {
        offset += GROUP_LEN[cb as usize] as usize;
    }
    let cb = control[group];
    for s in 0..slot {
        let code = (cb >> (s * 2)) & 0x3;
        offset += code as usize + 1;
    }
    let code = (cb >> (slot * 2)) & 0x3;
    let len = code as usize + 1;

    ensure!(
        data.len() >= offset + len,
        TruncatedSnafu {
            msg: "variable-byte data section truncated".to_string(),
        }
    );
    let mut buf = [0u8; 4];
    buf[..len].copy_from_slice(&data[offset..offset + len]);
    Ok(u32::from_le_bytes(buf))
}

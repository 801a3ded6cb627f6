//! Patch (exception) section serialization.
//!
//! Layout: 1-byte `exc_count`, `exc_count` position bytes (input-index
//! order), a 2-byte little-endian `vb_len`, then `vb_len` bytes of
//! [`crate::varbyte`]-encoded high-bit residuals in the same order as the
//! positions. Positions are stored directly rather than gap-delta-encoded,
//! since a block holds at most 128 values and a plain byte per position is
//! already minimal.

use crate::error::{OutOfRangeSnafu, Result, TruncatedSnafu};
use crate::varbyte;
use snafu::ensure;

/// A single exception: a logical index whose value didn't fit in the
/// block's `bit_width`, plus the high bits (`value >> bit_width`) that
/// spilled out of the packed lanes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exception {
    pub pos: usize,
    pub high: u32,
}

/// Serializes `exceptions` (already in increasing `pos` order) into `dst`.
pub fn write(dst: &mut Vec<u8>, exceptions: &[Exception]) {
    debug_assert!(exceptions.len() <= 128);
    dst.push(exceptions.len() as u8);
    for e in exceptions {
        debug_assert!(e.pos < 128);
        dst.push(e.pos as u8);
    }
    let highs: Vec<u32> = exceptions.iter().map(|e| e.high).collect();
    let vb = varbyte::encode(&highs);
    debug_assert!(vb.len() <= u16::MAX as usize);
    dst.extend_from_slice(&(vb.len() as u16).to_le_bytes());
    dst.extend_from_slice(&vb);
}

/// Total bytes [`write`] would emit for `exceptions`. Used by the width
/// selector's exact cost model once the exception list is known.
pub fn serialized_len(exceptions: &[Exception]) -> usize {
    let highs: Vec<u32> = exceptions.iter().map(|e| e.high).collect();
    1 + exceptions.len() + 2 + varbyte::encode(&highs).len()
}

/// Reads the patch section out of `patch_bytes`, OR-ing each exception's
/// high bits back into `decoded[pos]`. Returns the number of bytes consumed
/// so the caller (here, [`crate::block`]) knows where the block ends.
pub fn apply(decoded: &mut [u32], patch_bytes: &[u8], bit_width: u8, count: usize) -> Result<usize> {
    ensure!(
        !patch_bytes.is_empty(),
        TruncatedSnafu {
            msg: "patch section missing exc_count byte".to_string(),
        }
    );
    let exc_count = patch_bytes[0] as usize;
    let mut offset = 1;

    ensure!(
        patch_bytes.len() >= offset + exc_count,
        TruncatedSnafu {
            msg: "patch section truncated in positions".to_string(),
        }
    );
    let positions = &patch_bytes[offset..offset + exc_count];
    offset += exc_count;

    ensure!(
        patch_bytes.len() >= offset + 2,
        TruncatedSnafu {
            msg: "patch section truncated in vb_len".to_string(),
        }
    );
    let vb_len = u16::from_le_bytes([patch_bytes[offset], patch_bytes[offset + 1]]) as usize;
    offset += 2;

    ensure!(
        patch_bytes.len() >= offset + vb_len,
        TruncatedSnafu {
            msg: "patch section truncated in variable-byte region".to_string(),
        }
    );
    let vb_bytes = &patch_bytes[offset..offset + vb_len];
    offset += vb_len;

    let highs = varbyte::decode_all(vb_bytes, exc_count)?;
    for (&pos, &high) in positions.iter().zip(highs.iter()) {
        let pos = pos as usize;
        ensure!(pos < count, OutOfRangeSnafu { pos, count });
        decoded[pos] |= high.checked_shl(bit_width as u32).unwrap_or(0);
    }

    Ok(offset)
}

/// Reads just `exc_count` and `vb_len` to compute the patch section's total
/// byte length, without decoding any values. Used by [`crate::block::block_length`].
pub fn section_len(patch_bytes: &[u8]) -> Result<usize> {
    ensure!(
        !patch_bytes.is_empty(),
        TruncatedSnafu {
            msg: "patch section missing exc_count byte".to_string(),
        }
    );
    let exc_count = patch_bytes[0] as usize;
    let vb_len_offset = 1 + exc_count;
    ensure!(
        patch_bytes.len() >= vb_len_offset + 2,
        TruncatedSnafu {
            msg: "patch section truncated before vb_len".to_string(),
        }
    );
    let vb_len = u16::from_le_bytes([patch_bytes[vb_len_offset], patch_bytes[vb_len_offset + 1]]) as usize;
    Ok(vb_len_offset + 2 + vb_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn roundtrip_basic() {
        let exceptions = vec![Exception { pos: 10, high: 7 }, Exception { pos: 77, high: 1 }];
        let mut buf = Vec::new();
        write(&mut buf, &exceptions);

        let mut decoded = vec![0u32; 128];
        let consumed = apply(&mut decoded, &buf, 5, 128).unwrap();
        assert_eq!(consumed, buf.len());
        assert_eq!(decoded[10], 7 << 5);
        assert_eq!(decoded[77], 1 << 5);
    }

    #[test]
    fn empty_exceptions() {
        let mut buf = Vec::new();
        write(&mut buf, &[]);
        assert_eq!(buf, vec![0, 0, 0]);
        let mut decoded = vec![0u32; 4];
        let consumed = apply(&mut decoded, &buf, 3, 4).unwrap();
        assert_eq!(consumed, 3);
        assert_eq!(decoded, vec![0; 4]);
    }

    #[test]
    fn out_of_range_position_errors() {
        let exceptions = vec![Exception { pos: 50, high: 1 }];
        let mut buf = Vec::new();
        write(&mut buf, &exceptions);
        let mut decoded = vec![0u32; 10];
        assert!(apply(&mut decoded, &buf, 1, 10).is_err());
    }

    #[test]
    fn truncated_errors() {
        let mut decoded = vec![0u32; 10];
        assert!(apply(&mut decoded, &[], 1, 10).is_err());
        assert!(apply(&mut decoded, &[2, 0, 1], 1, 10).is_err());
    }

    #[test]
    fn section_len_matches_consumed_bytes() {
        let exceptions = vec![Exception { pos: 1, high: 300 }, Exception { pos: 2, high: 70000 }];
        let mut buf = Vec::new();
        write(&mut buf, &exceptions);
        buf.extend_from_slice(&[0xAA, 0xBB]); // trailing garbage after the section
        assert_eq!(section_len(&buf).unwrap(), buf.len() - 2);
    }

    proptest! {
        #[test]
        fn roundtrip_random_exceptions(
            mut positions in prop::collection::vec(0u8..128, 0..=40),
            highs in prop::collection::vec(any::<u32>(), 0..=40),
        ) {
            positions.sort_unstable();
            positions.dedup();
            let n = positions.len().min(highs.len());
            let exceptions: Vec<Exception> = positions[..n]
                .iter()
                .zip(highs[..n].iter())
                .map(|(&pos, &high)| Exception { pos: pos as usize, high })
                .collect();
            let mut buf = Vec::new();
            write(&mut buf, &exceptions);
            let mut decoded = vec![0u32; 128];
            let consumed = apply(&mut decoded, &buf, 0, 128).unwrap();
            prop_assert_eq!(consumed, buf.len());
            for e in &exceptions {
                prop_assert_eq!(decoded[e.pos], e.high);
            }
            prop_assert_eq!(section_len(&buf).unwrap(), buf.len());
        }
    }
}

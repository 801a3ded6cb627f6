//! First-order delta and zigzag preprocessing.
//!
//! Deltas between consecutive `u32` values are computed as wrapping
//! (mod 2^32) differences and reinterpreted as `i32` to recover a sign.
//! Zigzag recoding (`(x<<1) XOR (x>>31)`) then maps that signed difference
//! to an unsigned value with small magnitude near zero, so a
//! mostly-decreasing or oscillating sequence still packs into a narrow
//! bit width instead of wrapping to values near `u32::MAX`.

/// `(x<<1) XOR (x>>31)`, mapping a signed 32-bit difference to an unsigned
/// one with small magnitudes near zero.
#[inline]
pub fn zigzag_encode(v: i32) -> u32 {
    ((v << 1) ^ (v >> 31)) as u32
}

/// Inverse of [`zigzag_encode`].
#[inline]
pub fn zigzag_decode(v: u32) -> i32 {
    ((v >> 1) as i32) ^ -((v & 1) as i32)
}

/// Computes `dst[i] = src[i] - src[i-1]` (with `src[-1] = 0`) as wrapping
/// 32-bit differences. If any difference is negative when reinterpreted as
/// `i32` (i.e. the sequence isn't non-decreasing), every delta is
/// re-written as its zigzag recoding and `true` is returned; otherwise the
/// raw wrapping differences are left in place and `false` is returned.
///
/// `dst` and `src` may alias (`dst == src`): each `dst[i]` is written using
/// only `src[i]` and the previous raw `src` value, which this function
/// caches in a local before the first write to that slot.
pub fn delta_encode(dst: &mut [u32], src: &[u32]) -> bool {
    debug_assert_eq!(dst.len(), src.len());
    let mut prev = 0u32;
    let mut any_negative = false;
    for i in 0..src.len() {
        let v = src[i];
        let diff = v.wrapping_sub(prev);
        dst[i] = diff;
        if (diff as i32) < 0 {
            any_negative = true;
        }
        prev = v;
    }
    if any_negative {
        for d in dst.iter_mut() {
            *d = zigzag_encode(*d as i32);
        }
    }
    any_negative
}

/// Inverse prefix sum. When `use_zigzag`, the accumulator is a 64-bit
/// signed running sum (tolerating transiently negative partial sums before
/// reduction mod 2^32); otherwise it's a plain wrapping `u32` sum. Safe to
/// call with `dst == src`: each `dst[i]` is written after `src[i]` is read,
/// and no later iteration re-reads an earlier `src` slot.
pub fn delta_decode(dst: &mut [u32], src: &[u32], use_zigzag: bool) {
    debug_assert_eq!(dst.len(), src.len());
    if use_zigzag {
        let mut acc: i64 = 0;
        for i in 0..src.len() {
            acc += zigzag_decode(src[i]) as i64;
            dst[i] = acc as u32;
        }
    } else {
        let mut acc = 0u32;
        for i in 0..src.len() {
            acc = acc.wrapping_add(src[i]);
            dst[i] = acc;
        }
    }
}

/// Unsigned prefix sum that additionally reports the first wrap-around.
/// Returns the first index `i >= 1` where `dst[i] < dst[i-1]`, or `0` if
/// the running sum never wraps. Only meaningful for non-zigzag deltas
/// (overflow detection is ignored whenever the zigzag header bit is set).
pub fn delta_decode_with_overflow(dst: &mut [u32], src: &[u32]) -> usize {
    debug_assert_eq!(dst.len(), src.len());
    let mut acc = 0u32;
    let mut overflow_pos = 0usize;
    for i in 0..src.len() {
        let prev = acc;
        acc = acc.wrapping_add(src[i]);
        dst[i] = acc;
        if i > 0 && overflow_pos == 0 && acc < prev {
            overflow_pos = i;
        }
    }
    overflow_pos
}

/// `encode_with_delta` policy: computes deltas from raw `values` into
/// `scratch`, possibly zigzag-recoding them. `will_overflow` is always
/// `false` for this mode — by construction, inverting the prefix sum
/// always reproduces `values`, which are valid `u32`s already.
pub fn encode_with_delta(scratch: &mut [u32], values: &[u32]) -> bool {
    delta_encode(scratch, values)
}

/// `encode_with_prior_delta` policy: `deltas` are already first-order
/// differences supplied by the caller (the `encode_pre_delta` entry
/// point). Determines `will_overflow` by running the unsigned prefix sum
/// forward into `scratch` and checking whether it wraps.
pub fn prior_delta_will_overflow(scratch: &mut [u32], deltas: &[u32]) -> bool {
    delta_decode_with_overflow(scratch, deltas) > 0
}

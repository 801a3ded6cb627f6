//! Bit-width utilities: minimum representable width and per-width histograms.

/// Largest bit length among `values`, in `1..=32`; `0` for an all-zero slice
/// (including an empty slice).
pub fn minimum_width(values: &[u32]) -> u8 {
    values
        .iter()
        .map(|&v| bits_used(v))
        .max()
        .unwrap_or(0)
}

/// Minimum number of bits required to represent `v`; `0` for `v == 0`.
#[inline]
pub fn bits_used(v: u32) -> u8 {
    (32 - v.leading_zeros()) as u8
}

/// `freq[k]` = count of values whose bit length is exactly `k`, for
/// `k in 0..=32`.
pub fn histogram(values: &[u32]) -> [u32; 33] {
    let mut freq = [0u32; 33];
    for &v in values {
        freq[bits_used(v) as usize] += 1;
    }
    freq
}

//! SIMD-friendly Patched Frame-of-Reference codec for blocks of up to 128
//! unsigned 32-bit integers.
//!
//! Each block picks a common bit width, packs residuals into four
//! interleaved lanes, and spills out-of-range values into a patch section.
//! An optional first-order delta pass (with zigzag recoding for
//! non-monotonic sequences) handles sawtooth input. See [`block`] for the
//! entry points: [`encode_raw`], [`encode_delta`], [`encode_pre_delta`],
//! [`decode`], [`block_length`].

pub mod bitwidth;
pub mod block;
pub mod delta;
pub mod error;
pub mod header;
pub mod lane;
pub mod patch;
pub mod simd;
pub mod varbyte;
pub mod width_selector;

pub use block::{block_length, decode, encode_delta, encode_pre_delta, encode_raw};
pub use error::{PforError, Result};
pub use header::Header;

//! Runtime kernel dispatch.
//!
//! Feature detection runs once at process start via `is_x86_feature_detected!`,
//! binding a read-only dispatch table that every call site reads from
//! afterward instead of re-checking per call. See [`Dispatch`] for why the
//! table holds a single flag rather than a set of function pointers.

use std::sync::OnceLock;

/// Which [`crate::lane`] implementation `block_codec` should call.
///
/// Only [`crate::lane::pack`]/[`crate::lane::unpack`] have a genuine
/// vector-shaped kernel (`lane::vector`, walking word-major across all four
/// lanes the way a 128-bit load/store would): [`crate::bitwidth`],
/// [`crate::delta`] and zigzag are strictly sequential accumulators with no
/// lane-parallel restructuring, so they have only one implementation and
/// aren't part of this table.
#[derive(Debug, Clone, Copy)]
pub struct Dispatch {
    pub lane_vector: bool,
}

static DISPATCH: OnceLock<Dispatch> = OnceLock::new();

fn detect() -> Dispatch {
    #[cfg(target_arch = "x86_64")]
    {
        Dispatch {
            lane_vector: is_x86_feature_detected!("sse2"),
        }
    }
    #[cfg(not(target_arch = "x86_64"))]
    {
        Dispatch { lane_vector: false }
    }
}

/// Returns the process-wide dispatch table, initializing it on first call.
pub fn dispatch() -> &'static Dispatch {
    DISPATCH.get_or_init(detect)
}

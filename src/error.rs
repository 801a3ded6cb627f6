use snafu::prelude::*;
use snafu::Location;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum PforError {
    #[snafu(display("input has {} values, block holds at most 128", len))]
    Len {
        len: usize,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("block buffer truncated, message: {}", msg))]
    Truncated {
        msg: String,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("exception position {} is out of range for count {}", pos, count))]
    OutOfRange {
        pos: usize,
        count: usize,
        #[snafu(implicit)]
        location: Location,
    },

    /// Inverse prefix sum wrapped around 2^32 at `pos`. Carries the
    /// best-effort partially decoded buffer so the caller can still read
    /// `decoded[0..pos]`.
    #[snafu(display("prefix sum overflowed 2^32 at index {}", pos))]
    Overflow {
        pos: usize,
        partial: Vec<u32>,
        #[snafu(implicit)]
        location: Location,
    },
}

pub type Result<T, E = PforError> = std::result::Result<T, E>;

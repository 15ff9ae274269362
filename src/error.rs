//! Error type shared by the generators and the timestamp synchronizer.

use std::io;

/// Errors reported while configuring or running a generator.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A node identifier could not be parsed or had the wrong length.
    #[error("invalid node identifier: {0}")]
    InvalidNodeId(String),

    /// The random number generator failed to produce bytes.
    #[error("random source failure: {0}")]
    Random(#[from] rand::Error),

    /// Reading or writing a stable store failed.
    #[error("stable store I/O error: {0}")]
    Io(#[from] io::Error),

    /// A stable store refused to replace a stamp with a smaller one.
    #[error("refusing to overwrite stamp {existing:#018x} with earlier value {requested:#018x}")]
    StaleStamp { existing: u64, requested: u64 },

    /// A timestamp synchronizer has no tick left below its configured maximum.
    #[error("timestamp range exhausted: no tick available above {limit:#018x}")]
    TimestampOverflow { limit: u64 },

    /// The 74-bit entropy counter ran out within a single millisecond.
    #[error("entropy counter exhausted within millisecond {0}")]
    EntropyExhausted(u64),
}

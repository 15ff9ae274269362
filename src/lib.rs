//! UUID generators for versions 1, 3, 4, 5, 6, and 7
//!
//! ```rust
//! use uuidgen::{uuid4, uuid7};
//!
//! let uuid = uuid7()?;
//! println!("{}", uuid); // e.g., "01809424-3e59-7c05-9219-566f82fff672"
//! println!("{:?}", uuid.as_bytes()); // as 16-byte big-endian array
//!
//! let uuid_string: String = uuid4()?.to_string();
//! # Ok::<(), uuidgen::Error>(())
//! ```
//!
//! See [RFC 9562](https://www.rfc-editor.org/rfc/rfc9562).
//!
//! # Generators
//!
//! | Version | Generator                           | Input                           |
//! | ------- | ----------------------------------- | ------------------------------- |
//! | 1       | [`TimeBasedGenerator`]              | clock, clock sequence, node     |
//! | 3, 5    | [`NameBasedGenerator`]              | namespace and name              |
//! | 4       | [`RandomBasedGenerator`]            | 122 random bits                 |
//! | 6       | [`TimeBasedReorderedGenerator`]     | same as version 1, sortable     |
//! | 7       | [`TimeBasedEpochGenerator`]         | Unix milliseconds and a counter |
//! | 7       | [`TimeBasedEpochRandomGenerator`]   | Unix milliseconds and entropy   |
//!
//! Every generator takes `&self` and can be shared between threads with [`std::sync::Arc`]. The
//! random number generator and the clock are pluggable through [`generator::RandSource`] and
//! [`generator::TimeSource`].
//!
//! # Timestamp synchronization
//!
//! The Gregorian time-based generators (versions 1 and 6) obtain their timestamps through a
//! [`sync::TimestampSynchronizer`], which keeps a high-water mark in a [`sync::StableStore`] and
//! always persists it before issuing values below it. With a [`sync::FileStore`], timestamps keep
//! increasing across process restarts even if the system clock is set back.
//!
//! ```rust,no_run
//! use uuidgen::{sync::{FileStore, TimestampSynchronizer}, NodeId, TimeBasedGenerator};
//!
//! let dir = std::path::Path::new("/var/lib/myapp");
//! let sync = TimestampSynchronizer::new(FileStore::in_dir(dir)?).into_shared();
//! let g = TimeBasedGenerator::new("00:1b:02:00:0c:ff".parse::<NodeId>()?, sync)?;
//! if !g.guarantee().is_cross_restart() {
//!     eprintln!("timestamps are unique within this process only");
//! }
//! println!("{}", g.generate());
//! # Ok::<(), uuidgen::Error>(())
//! ```
//!
//! # Field and bit layout
//!
//! Version 1 stores a 60-bit count of 100-nanosecond intervals since 1582-10-15 low bits first:
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                           time_low                            |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |           time_mid            |  ver  |       time_high       |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |var|         clock_seq         |             node              |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                              node                             |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! Version 6 carries the same fields with the timestamp stored high bits first, so that byte
//! order follows creation order:
//!
//! ```text
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                           time_high                           |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |           time_mid            |  ver  |       time_low        |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! Version 7 stores Unix milliseconds followed by 74 bits of entropy:
//!
//! ```text
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                          unix_ts_ms                           |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |          unix_ts_ms           |  ver  |        rand_a         |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |var|                        rand_b                             |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                            rand_b                             |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! [`TimeBasedEpochGenerator`] treats `rand_a` and `rand_b` together as a 74-bit counter that is
//! incremented by one for each new ID generated within the same millisecond and is randomly
//! reseeded whenever `unix_ts_ms` changes. In the very rare circumstances where the counter reaches
//! its maximum value, the generator increments `unix_ts_ms`; therefore, `unix_ts_ms` may have a
//! larger value than that of the real-time clock.
//!
//! # Crate features
//!
//! Default features:
//!
//! - `global_gen` enables the process-wide entry points [`uuid1`], [`uuid3`], [`uuid4`],
//!   [`uuid5`], [`uuid6`], and [`uuid7`].
//!
//! Optional features:
//!
//! - `serde` enables serialization and deserialization of [`Uuid`] objects.
//! - `uuid` enables conversion from/to the [`Uuid`] type of the [uuid] crate.
//!
//! [uuid]: https://crates.io/crates/uuid

#![cfg_attr(docsrs, feature(doc_cfg))]

mod error;
pub use error::Error;

mod id;
pub use id::{ParseError, Uuid, Variant};

mod node;
pub use node::NodeId;

pub mod clock_seq;
pub mod entropy;
pub mod sync;
pub mod util;

pub mod generator;
pub use generator::{
    NameBasedGenerator, NoArgGenerator, RandomBasedGenerator, TimeBasedEpochGenerator,
    TimeBasedEpochRandomGenerator, TimeBasedGenerator, TimeBasedReorderedGenerator,
};

pub use md5::Md5;
pub use sha1::Sha1;

mod global_gen;
#[cfg(feature = "global_gen")]
pub use global_gen::{global_rng, uuid1, uuid3, uuid4, uuid5, uuid6, uuid7, GlobalRng};

//! Generator variants and the randomness and clock sources they consume.
//!
//! Every generator takes its sources through the narrow [`RandSource`] and [`TimeSource`] traits,
//! so deterministic doubles can be substituted without touching the packing logic. Stateful
//! generators keep their state behind a [`std::sync::Mutex`] and expose `&self` methods; share one
//! instance across threads with [`std::sync::Arc`].

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::{util::UuidType, Error, Uuid};

pub mod with_rand08;

mod epoch;
pub use epoch::{TimeBasedEpochGenerator, TimeBasedEpochRandomGenerator};

mod name_based;
pub use name_based::{
    NameBasedGenerator, NameDigest, NAMESPACE_DNS, NAMESPACE_OID, NAMESPACE_URL, NAMESPACE_X500,
};

mod random;
pub use random::RandomBasedGenerator;

mod time_based;
pub use time_based::{TimeBasedGenerator, TimeBasedReorderedGenerator};

#[cfg(test)]
pub(crate) mod tests;

/// A trait that defines the minimum random number generator interface for the generators.
pub trait RandSource {
    /// Fills `dest` with random data, or reports why the source could not.
    fn fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error>;
}

impl<T: RandSource + ?Sized> RandSource for &mut T {
    fn fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        (**self).fill_bytes(dest)
    }
}

impl<T: RandSource + ?Sized> RandSource for Box<T> {
    fn fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        (**self).fill_bytes(dest)
    }
}

/// A trait that defines the minimum system clock interface for the generators.
pub trait TimeSource {
    /// Returns the current Unix timestamp in milliseconds.
    fn unix_ts_ms(&mut self) -> u64;

    /// Returns the current Unix timestamp in 100-nanosecond intervals.
    ///
    /// The default implementation scales [`unix_ts_ms`](TimeSource::unix_ts_ms), which leaves the
    /// sub-millisecond digits to the timestamp synchronizer.
    fn unix_ts_100ns(&mut self) -> u64 {
        self.unix_ts_ms().saturating_mul(10_000)
    }
}

/// The default [`TimeSource`] that reads [`SystemTime::now()`].
#[derive(Clone, Copy, Eq, PartialEq, Debug, Default)]
pub struct StdSystemTime;

impl TimeSource for StdSystemTime {
    fn unix_ts_ms(&mut self) -> u64 {
        since_unix_epoch().as_millis() as u64
    }

    fn unix_ts_100ns(&mut self) -> u64 {
        (since_unix_epoch().as_nanos() / 100) as u64
    }
}

/// A clock set before 1970 reads as zero; the synchronizer keeps issued values increasing anyway.
fn since_unix_epoch() -> Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
}

/// The random number generator used by constructors that take none.
pub type DefaultRandSource = with_rand08::Adapter<rand::rngs::OsRng>;

/// Returns a fresh [`DefaultRandSource`].
pub const fn default_rand_source() -> DefaultRandSource {
    with_rand08::Adapter(rand::rngs::OsRng)
}

/// Common interface of the generators that need no per-call input.
pub trait NoArgGenerator {
    /// Returns the layout produced by this generator.
    fn uuid_type(&self) -> UuidType;

    /// Generates a new UUID.
    fn generate(&self) -> Result<Uuid, Error>;
}

//! UUIDv7 generators

use std::sync::{Mutex, MutexGuard};

use super::{
    default_rand_source, DefaultRandSource, NoArgGenerator, RandSource, StdSystemTime, TimeSource,
};
use crate::{
    entropy::{random_entropy, EntropyCounter},
    util::UuidType,
    Error, Uuid,
};

const MAX_TIMESTAMP: u64 = (1 << 48) - 1;

/// Splits 74 bits of entropy into the 12-bit `rand_a` and 62-bit `rand_b` fields.
const fn pack(unix_ts_ms: u64, entropy: u128) -> Uuid {
    Uuid::from_fields_v7(
        unix_ts_ms,
        (entropy >> 62) as u16,
        entropy as u64 & ((1 << 62) - 1),
    )
}

fn check_timestamp(unix_ts_ms: u64) {
    assert!(
        unix_ts_ms <= MAX_TIMESTAMP,
        "`unix_ts_ms` must be a 48-bit unsigned integer"
    );
}

/// Rejects a clock reading beyond the 48-bit range before it touches any state.
fn check_clock(unix_ts_ms: u64) -> Result<u64, Error> {
    if unix_ts_ms > MAX_TIMESTAMP {
        return Err(Error::TimestampOverflow {
            limit: MAX_TIMESTAMP,
        });
    }
    Ok(unix_ts_ms)
}

/// Generates UUIDv7 values that are strictly increasing within the generator.
///
/// Within one millisecond the 74 bits following the timestamp act as a counter that is
/// incremented by one per call; on a new millisecond the counter is reseeded from the random
/// number generator. If the counter runs out within a millisecond, [`generate`](Self::generate)
/// moves on to the next millisecond ahead of the clock.
///
/// The generator tolerates the clock going backwards by up to [`rollback_allowance`]
/// milliseconds (ten seconds by default) by reusing the last timestamp. A larger rollback resets
/// the generator to the clock's value, giving up monotonicity for that call.
///
/// [`rollback_allowance`]: Self::with_rollback_allowance
///
/// # Examples
///
/// ```rust
/// use uuidgen::TimeBasedEpochGenerator;
///
/// let g = TimeBasedEpochGenerator::new();
/// let (x, y) = (g.generate()?, g.generate()?);
/// assert!(x < y);
/// println!("{}", x); // e.g., "01809424-3e59-7c05-9219-566f82fff672"
/// # Ok::<(), uuidgen::Error>(())
/// ```
#[derive(Debug)]
pub struct TimeBasedEpochGenerator<R = DefaultRandSource, T = StdSystemTime> {
    state: Mutex<EpochState<R, T>>,
    rollback_allowance: u64,
}

#[derive(Debug)]
struct EpochState<R, T> {
    counter: EntropyCounter,
    rng: R,
    clock: T,
}

impl TimeBasedEpochGenerator {
    /// Creates a generator backed by the operating system's random number generator and the
    /// system clock.
    pub const fn new() -> Self {
        Self::with_rand_source(default_rand_source())
    }
}

impl Default for TimeBasedEpochGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RandSource> TimeBasedEpochGenerator<R> {
    /// Creates a generator with a custom random number generator and the system clock.
    pub const fn with_rand_source(rng: R) -> Self {
        Self::with_rand_and_time_sources(rng, StdSystemTime)
    }
}

impl<R: RandSource, T: TimeSource> TimeBasedEpochGenerator<R, T> {
    /// The clock rollback tolerated by default, in milliseconds.
    pub const DEFAULT_ROLLBACK_ALLOWANCE: u64 = 10_000;

    /// Creates a generator with a custom random number generator and clock.
    pub const fn with_rand_and_time_sources(rng: R, clock: T) -> Self {
        Self {
            state: Mutex::new(EpochState {
                counter: EntropyCounter::new(),
                rng,
                clock,
            }),
            rollback_allowance: Self::DEFAULT_ROLLBACK_ALLOWANCE,
        }
    }

    /// Sets how far, in milliseconds, the clock may go backwards before the generator resets.
    pub fn with_rollback_allowance(mut self, rollback_allowance: u64) -> Self {
        self.rollback_allowance = rollback_allowance;
        self
    }

    fn lock_state(&self) -> MutexGuard<'_, EpochState<R, T>> {
        self.state
            .lock()
            .expect("uuidgen: could not lock epoch generator")
    }

    /// Generates a new UUIDv7 object from the current time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Random`] if the random number generator fails while reseeding, and
    /// [`Error::TimestampOverflow`] if the clock reports a time beyond the 48-bit millisecond
    /// range, i.e., past the year 10889. Either way the generator stays usable.
    pub fn generate(&self) -> Result<Uuid, Error> {
        let mut state = self.lock_state();
        let EpochState {
            counter,
            rng,
            clock,
        } = &mut *state;

        let now = check_clock(clock.unix_ts_ms())?;
        let mut unix_ts_ms = match counter.timestamp() {
            Some(last) if now <= last && now.saturating_add(self.rollback_allowance) > last => last,
            _ => now,
        };

        let entropy = match counter.next(unix_ts_ms, rng) {
            Err(Error::EntropyExhausted(_)) => {
                // increment timestamp at counter overflow
                unix_ts_ms = check_clock(unix_ts_ms + 1)?;
                tracing::debug!(unix_ts_ms, "entropy counter overflowed; advancing timestamp");
                counter.reseed(unix_ts_ms, rng)?
            }
            result => result?,
        };
        Ok(pack(unix_ts_ms, entropy))
    }

    /// Generates a new UUIDv7 object from a caller-supplied Unix timestamp in milliseconds.
    ///
    /// The counter logic is the same as [`generate`](Self::generate), but the clock and the
    /// rollback handling are bypassed: a timestamp different from the last one always reseeds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EntropyExhausted`], leaving the generator state untouched, if the counter
    /// has run out for `unix_ts_ms`, and [`Error::Random`] if the random number generator fails.
    ///
    /// # Panics
    ///
    /// Panics if `unix_ts_ms` is not a 48-bit unsigned integer.
    pub fn construct(&self, unix_ts_ms: u64) -> Result<Uuid, Error> {
        check_timestamp(unix_ts_ms);
        let mut state = self.lock_state();
        let EpochState { counter, rng, .. } = &mut *state;
        let entropy = counter.next(unix_ts_ms, rng)?;
        Ok(pack(unix_ts_ms, entropy))
    }
}

impl<R: RandSource, T: TimeSource> NoArgGenerator for TimeBasedEpochGenerator<R, T> {
    fn uuid_type(&self) -> UuidType {
        UuidType::TimeBasedEpoch
    }

    fn generate(&self) -> Result<Uuid, Error> {
        TimeBasedEpochGenerator::generate(self)
    }
}

/// Generates UUIDv7 values with fresh random bits on every call.
///
/// Unlike [`TimeBasedEpochGenerator`], this generator keeps no counter, so values created within
/// the same millisecond are ordered randomly.
#[derive(Debug)]
pub struct TimeBasedEpochRandomGenerator<R = DefaultRandSource, T = StdSystemTime> {
    state: Mutex<(R, T)>,
}

impl TimeBasedEpochRandomGenerator {
    /// Creates a generator backed by the operating system's random number generator and the
    /// system clock.
    pub const fn new() -> Self {
        Self::with_rand_source(default_rand_source())
    }
}

impl Default for TimeBasedEpochRandomGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RandSource> TimeBasedEpochRandomGenerator<R> {
    /// Creates a generator with a custom random number generator and the system clock.
    pub const fn with_rand_source(rng: R) -> Self {
        Self::with_rand_and_time_sources(rng, StdSystemTime)
    }
}

impl<R: RandSource, T: TimeSource> TimeBasedEpochRandomGenerator<R, T> {
    /// Creates a generator with a custom random number generator and clock.
    pub const fn with_rand_and_time_sources(rng: R, clock: T) -> Self {
        Self {
            state: Mutex::new((rng, clock)),
        }
    }

    /// Generates a new UUIDv7 object from the current time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Random`] if the random number generator fails, and
    /// [`Error::TimestampOverflow`] if the clock is beyond the 48-bit millisecond range.
    pub fn generate(&self) -> Result<Uuid, Error> {
        let mut state = self.state.lock().expect("uuidgen: could not lock epoch generator");
        let (rng, clock) = &mut *state;
        let unix_ts_ms = check_clock(clock.unix_ts_ms())?;
        Ok(pack(unix_ts_ms, random_entropy(rng)?))
    }

    /// Generates a new UUIDv7 object from a caller-supplied Unix timestamp in milliseconds.
    ///
    /// # Panics
    ///
    /// Panics if `unix_ts_ms` is not a 48-bit unsigned integer.
    pub fn construct(&self, unix_ts_ms: u64) -> Result<Uuid, Error> {
        check_timestamp(unix_ts_ms);
        let mut state = self.state.lock().expect("uuidgen: could not lock epoch generator");
        Ok(pack(unix_ts_ms, random_entropy(&mut state.0)?))
    }
}

impl<R: RandSource, T: TimeSource> NoArgGenerator for TimeBasedEpochRandomGenerator<R, T> {
    fn uuid_type(&self) -> UuidType {
        UuidType::TimeBasedEpoch
    }

    fn generate(&self) -> Result<Uuid, Error> {
        TimeBasedEpochRandomGenerator::generate(self)
    }
}

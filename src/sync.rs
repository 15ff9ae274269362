//! Timestamp synchronization across threads and process restarts.
//!
//! [`TimestampSynchronizer`] hands out strictly increasing tick values and keeps a persisted
//! high-water mark in a [`StableStore`]. The high-water mark is always committed *before* any value
//! up to it is issued, so a restarted process that reads it back can never reissue a timestamp the
//! previous incarnation may have used.
//!
//! To avoid a storage write per call, the synchronizer leases a window: it persists a ceiling some
//! margin ahead of the clock and issues values below it freely, extending the lease only once the
//! clock catches up with the ceiling.

use std::{
    fmt,
    sync::{Arc, Mutex},
    time::Duration,
};

use crate::Error;

mod file_store;
pub use file_store::FileStore;

/// A [`TimestampSynchronizer`] shared by several generators to coordinate their timestamps.
pub type SharedSynchronizer = Arc<Mutex<TimestampSynchronizer>>;

/// A single-value persistence medium holding the high-water mark.
pub trait StableStore: Send {
    /// Returns the persisted high-water mark, or `None` if no usable value exists.
    fn load(&mut self) -> Result<Option<u64>, Error>;

    /// Persists `stamp` as the new high-water mark.
    ///
    /// Implementations must refuse a value smaller than the current one with
    /// [`Error::StaleStamp`] and treat an equal value as a no-op.
    fn store(&mut self, stamp: u64) -> Result<(), Error>;
}

/// An in-memory [`StableStore`].
///
/// Clones share the same slot, so a store handed to one synchronizer can be reopened by another
/// to simulate a restart, or inspected from outside.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Arc<Mutex<Option<u64>>>);

impl MemoryStore {
    /// Creates a store that starts with `stamp` already persisted.
    pub fn with_stamp(stamp: u64) -> Self {
        Self(Arc::new(Mutex::new(Some(stamp))))
    }

    /// Returns the value currently persisted.
    pub fn stamp(&self) -> Option<u64> {
        *self.0.lock().expect("uuidgen: could not lock memory store")
    }
}

impl StableStore for MemoryStore {
    fn load(&mut self) -> Result<Option<u64>, Error> {
        Ok(self.stamp())
    }

    fn store(&mut self, stamp: u64) -> Result<(), Error> {
        let mut slot = self.0.lock().expect("uuidgen: could not lock memory store");
        match *slot {
            Some(existing) if stamp < existing => Err(Error::StaleStamp {
                existing,
                requested: stamp,
            }),
            _ => {
                *slot = Some(stamp);
                Ok(())
            }
        }
    }
}

/// The uniqueness guarantee a synchronizer currently provides.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Guarantee {
    /// Timestamps increase across restarts of the process, backed by a stable store.
    CrossRestart,
    /// Timestamps increase only within this process.
    ProcessLocal {
        /// Why the cross-restart guarantee is unavailable.
        reason: String,
    },
}

impl Guarantee {
    /// Returns `true` if timestamps are guaranteed to increase across restarts.
    pub const fn is_cross_restart(&self) -> bool {
        matches!(self, Self::CrossRestart)
    }
}

/// Configuration of a [`TimestampSynchronizer`].
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct SyncConfig {
    /// How far ahead of the clock each lease reaches, in ticks.
    pub margin: u64,

    /// The largest tick the synchronizer may issue.
    ///
    /// A persisted high-water mark at or above this value cannot be honoured, so the synchronizer
    /// ignores it and degrades to [`Guarantee::ProcessLocal`].
    pub max_tick: u64,
}

impl SyncConfig {
    /// Ten seconds in 100-nanosecond ticks.
    pub const DEFAULT_MARGIN: u64 = 10 * 10_000_000;

    /// The largest 60-bit timestamp, which is the widest the Gregorian layouts can hold.
    pub const DEFAULT_MAX_TICK: u64 = (1 << 60) - 1;

    /// Creates a configuration whose lease spans `interval`, counted in 100-nanosecond ticks.
    pub fn from_interval(interval: Duration) -> Self {
        Self {
            margin: u64::try_from(interval.as_nanos() / 100).unwrap_or(u64::MAX),
            ..Self::default()
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            margin: Self::DEFAULT_MARGIN,
            max_tick: Self::DEFAULT_MAX_TICK,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Lease {
    last_used: u64,
    /// Largest value persisted so far; everything up to it may be issued.
    ceiling: u64,
}

/// Issues strictly increasing timestamps, persisting a high-water mark ahead of them.
///
/// The synchronizer is unit-agnostic: it works in whatever tick the caller reads from its clock
/// (100-nanosecond intervals for the time-based generators) and [`SyncConfig::margin`] is counted
/// in the same unit.
///
/// If the store cannot be read or written, the synchronizer logs a warning, stops using the store,
/// and keeps issuing process-locally increasing values; [`guarantee`](Self::guarantee) reports the
/// downgrade.
///
/// # Examples
///
/// ```rust
/// use uuidgen::sync::{MemoryStore, TimestampSynchronizer};
///
/// let store = MemoryStore::with_stamp(5_000);
/// let mut sync = TimestampSynchronizer::new(store.clone());
/// assert!(sync.next(1_000)? > 5_000);
/// assert!(store.stamp().unwrap() > 5_000);
/// # Ok::<(), uuidgen::Error>(())
/// ```
pub struct TimestampSynchronizer {
    store: Option<Box<dyn StableStore>>,
    config: SyncConfig,
    lease: Option<Lease>,
    guarantee: Guarantee,
}

impl TimestampSynchronizer {
    /// Creates a synchronizer persisting to `store` with the default configuration.
    pub fn new(store: impl StableStore + 'static) -> Self {
        Self::with_config(store, SyncConfig::default())
    }

    /// Creates a synchronizer persisting to `store`.
    pub fn with_config(store: impl StableStore + 'static, config: SyncConfig) -> Self {
        Self {
            store: Some(Box::new(store)),
            config,
            lease: None,
            guarantee: Guarantee::CrossRestart,
        }
    }

    /// Creates a synchronizer without stable storage, which guarantees increasing timestamps only
    /// within this process.
    pub fn process_local() -> Self {
        Self {
            store: None,
            config: SyncConfig::default(),
            lease: None,
            guarantee: Guarantee::ProcessLocal {
                reason: "no stable store configured".to_owned(),
            },
        }
    }

    /// Wraps the synchronizer for sharing between generators.
    pub fn into_shared(self) -> SharedSynchronizer {
        Arc::new(Mutex::new(self))
    }

    /// Returns the guarantee currently provided.
    pub fn guarantee(&self) -> &Guarantee {
        &self.guarantee
    }

    /// Returns the configuration in use.
    pub const fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Returns `true` once the persisted high-water mark has been read.
    pub const fn is_initialized(&self) -> bool {
        self.lease.is_some()
    }

    /// Returns the largest value issued so far, or `None` before initialization.
    pub fn last_used(&self) -> Option<u64> {
        self.lease.map(|lease| lease.last_used)
    }

    /// Reads the persisted high-water mark and reserves the first lease.
    ///
    /// This runs automatically on the first call to [`next`](Self::next); calling it earlier
    /// surfaces a storage problem through the returned [`Guarantee`] before any value is issued.
    /// Subsequent calls do nothing.
    pub fn initialize(&mut self, now: u64) -> &Guarantee {
        self.lease(now);
        &self.guarantee
    }

    /// Returns the next timestamp given the clock reading `now`.
    ///
    /// The result is `now` if the clock has advanced past every value issued so far, and one more
    /// than the last value otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TimestampOverflow`] without issuing anything if the result would exceed
    /// [`SyncConfig::max_tick`].
    pub fn next(&mut self, now: u64) -> Result<u64, Error> {
        let mut lease = self.lease(now);
        let value = if now > lease.last_used {
            now
        } else {
            lease.last_used.saturating_add(1)
        };
        if value > self.config.max_tick || value == lease.last_used {
            return Err(Error::TimestampOverflow {
                limit: self.config.max_tick,
            });
        }

        if value > lease.ceiling {
            let ceiling = self.ceiling_above(value);
            tracing::debug!(ceiling, "extending timestamp lease");
            self.persist(ceiling);
            lease.ceiling = ceiling;
        }

        lease.last_used = value;
        self.lease = Some(lease);
        Ok(value)
    }

    fn lease(&mut self, now: u64) -> Lease {
        if let Some(lease) = self.lease {
            return lease;
        }

        let mut persisted = self.load();
        if let Some(stamp) = persisted {
            if stamp >= self.config.max_tick {
                self.degrade(format!(
                    "persisted high-water mark {stamp:#018x} is not below the maximum tick {:#018x}",
                    self.config.max_tick
                ));
                persisted = None;
            } else if stamp > now.saturating_add(self.config.margin) {
                tracing::warn!(
                    stamp,
                    now,
                    "persisted timestamp is {} ticks in the future, more than the lease margin",
                    stamp - now
                );
            }
        }

        let last_used = persisted.unwrap_or(0);
        let ceiling = self.ceiling_above(persisted.unwrap_or(now).max(now));
        self.persist(ceiling);
        let lease = Lease {
            last_used,
            ceiling,
        };
        self.lease = Some(lease);
        lease
    }

    /// Returns `value` plus the margin, capped at the maximum tick.
    fn ceiling_above(&self, value: u64) -> u64 {
        value
            .saturating_add(self.config.margin)
            .min(self.config.max_tick)
    }

    fn load(&mut self) -> Option<u64> {
        let result = self.store.as_mut()?.load();
        result.unwrap_or_else(|err| {
            self.degrade(format!("could not read high-water mark: {err}"));
            None
        })
    }

    fn persist(&mut self, stamp: u64) {
        let Some(store) = self.store.as_mut() else {
            return;
        };
        if let Err(err) = store.store(stamp) {
            self.degrade(format!("could not persist high-water mark: {err}"));
        }
    }

    fn degrade(&mut self, reason: String) {
        tracing::warn!(
            %reason,
            "timestamp synchronizer falling back to process-local monotonicity"
        );
        self.store = None;
        self.guarantee = Guarantee::ProcessLocal { reason };
    }
}

impl fmt::Debug for TimestampSynchronizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimestampSynchronizer")
            .field("has_store", &self.store.is_some())
            .field("config", &self.config)
            .field("lease", &self.lease)
            .field("guarantee", &self.guarantee)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{Guarantee, MemoryStore, StableStore, SyncConfig, TimestampSynchronizer};
    use crate::Error;
    use std::io;

    /// A store whose reads and writes always fail.
    struct BrokenStore;

    impl StableStore for BrokenStore {
        fn load(&mut self) -> Result<Option<u64>, Error> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only medium").into())
        }

        fn store(&mut self, _: u64) -> Result<(), Error> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only medium").into())
        }
    }

    /// A store that reads fine but rejects writes after the first few.
    struct FillingStore {
        inner: MemoryStore,
        writes_left: usize,
    }

    impl StableStore for FillingStore {
        fn load(&mut self) -> Result<Option<u64>, Error> {
            self.inner.load()
        }

        fn store(&mut self, stamp: u64) -> Result<(), Error> {
            if self.writes_left == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "disk full").into());
            }
            self.writes_left -= 1;
            self.inner.store(stamp)
        }
    }

    fn with_margin(margin: u64) -> SyncConfig {
        SyncConfig {
            margin,
            ..SyncConfig::default()
        }
    }

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter("uuidgen=debug")
            .try_init();
    }

    /// Issues strictly increasing values under a stalled or regressing clock
    #[test]
    fn issues_strictly_increasing_values_under_a_stalled_or_regressing_clock() {
        let mut sync = TimestampSynchronizer::new(MemoryStore::default());
        let mut prev = sync.next(1_000_000).unwrap();
        assert_eq!(prev, 1_000_000);
        for now in [1_000_000, 1_000_000, 999_000, 1_000_001, 5, 1_000_010] {
            let curr = sync.next(now).unwrap();
            assert!(curr > prev, "{curr} after {prev}");
            prev = curr;
        }
        assert_eq!(sync.next(2_000_000).unwrap(), 2_000_000);
    }

    /// Persists the ceiling before issuing values under it
    #[test]
    fn persists_the_ceiling_before_issuing_values_under_it() {
        let store = MemoryStore::default();
        let mut sync = TimestampSynchronizer::with_config(store.clone(), with_margin(100));
        assert_eq!(store.stamp(), None);

        sync.initialize(1_000);
        assert_eq!(store.stamp(), Some(1_100));

        for now in 1_001..=1_100 {
            let value = sync.next(now).unwrap();
            assert!(value <= store.stamp().unwrap());
        }
        assert_eq!(store.stamp(), Some(1_100));

        // crossing the ceiling extends the lease first
        assert_eq!(sync.next(1_101).unwrap(), 1_101);
        assert_eq!(store.stamp(), Some(1_201));
        assert_eq!(sync.next(5_000).unwrap(), 5_000);
        assert_eq!(store.stamp(), Some(5_100));
    }

    /// Extends the lease when a stalled clock exhausts it
    #[test]
    fn extends_the_lease_when_a_stalled_clock_exhausts_it() {
        let store = MemoryStore::default();
        let mut sync = TimestampSynchronizer::with_config(store.clone(), with_margin(10));
        let mut last = 0;
        for _ in 0..100 {
            last = sync.next(500).unwrap();
            assert!(last <= store.stamp().unwrap());
        }
        assert_eq!(last, 599);
    }

    /// Issues values beyond the persisted mark after restart
    #[test]
    fn issues_values_beyond_the_persisted_mark_after_restart() {
        init_tracing();
        let store = MemoryStore::default();
        let mut before = TimestampSynchronizer::with_config(store.clone(), with_margin(50));
        let mut issued = Vec::new();
        for now in (10_000..10_200).step_by(3) {
            issued.push(before.next(now).unwrap());
        }
        let high_water_mark = store.stamp().unwrap();
        assert!(issued.iter().all(|&e| e <= high_water_mark));
        drop(before);

        // restart with the clock set back
        let mut after = TimestampSynchronizer::with_config(store.clone(), with_margin(50));
        let first = after.next(9_000).unwrap();
        assert!(first > high_water_mark);
        assert!(first > *issued.last().unwrap());
        assert!(store.stamp().unwrap() >= first);
    }

    /// Uses the clock when it is ahead of the persisted mark
    #[test]
    fn uses_the_clock_when_it_is_ahead_of_the_persisted_mark() {
        let store = MemoryStore::with_stamp(1_000);
        let mut sync = TimestampSynchronizer::with_config(store.clone(), with_margin(10));
        assert_eq!(sync.next(2_000).unwrap(), 2_000);
        assert_eq!(store.stamp(), Some(2_010));
        assert!(sync.guarantee().is_cross_restart());
    }

    /// Falls back to process-local monotonicity when storage is unavailable
    #[test]
    fn falls_back_to_process_local_monotonicity_when_storage_is_unavailable() {
        init_tracing();
        let mut sync = TimestampSynchronizer::new(BrokenStore);
        let guarantee = sync.initialize(100).clone();
        assert!(matches!(guarantee, Guarantee::ProcessLocal { ref reason } if reason.contains("read")));

        let mut prev = 0;
        for now in [100, 100, 50, 200] {
            let curr = sync.next(now).unwrap();
            assert!(curr > prev);
            prev = curr;
        }
    }

    /// Reports degradation when a lease extension cannot be persisted
    #[test]
    fn reports_degradation_when_a_lease_extension_cannot_be_persisted() {
        let store = MemoryStore::default();
        let mut sync = TimestampSynchronizer::with_config(
            FillingStore {
                inner: store.clone(),
                writes_left: 1,
            },
            with_margin(10),
        );
        assert_eq!(sync.next(100).unwrap(), 100);
        assert!(sync.guarantee().is_cross_restart());
        assert_eq!(store.stamp(), Some(110));

        assert_eq!(sync.next(200).unwrap(), 200);
        assert!(!sync.guarantee().is_cross_restart());
        assert_eq!(sync.next(200).unwrap(), 201);
        assert_eq!(store.stamp(), Some(110));
    }

    /// Reports process-local guarantee without a store
    #[test]
    fn reports_process_local_guarantee_without_a_store() {
        let mut sync = TimestampSynchronizer::process_local();
        assert!(!sync.guarantee().is_cross_restart());
        assert!(!sync.is_initialized());
        assert_eq!(sync.next(7).unwrap(), 7);
        assert_eq!(sync.next(7).unwrap(), 8);
        assert_eq!(sync.last_used(), Some(8));
    }

    /// Degrades instead of wrapping past the maximum tick
    #[test]
    fn degrades_instead_of_wrapping_past_the_maximum_tick() {
        init_tracing();
        for stamp in [SyncConfig::DEFAULT_MAX_TICK, 1 << 60, u64::MAX] {
            let store = MemoryStore::with_stamp(stamp);
            let mut sync = TimestampSynchronizer::new(store.clone());
            let guarantee = sync.initialize(1_000).clone();
            assert!(
                matches!(guarantee, Guarantee::ProcessLocal { ref reason } if reason.contains("maximum tick")),
                "{stamp:#x}"
            );

            assert_eq!(sync.next(1_000).unwrap(), 1_000);
            assert_eq!(sync.next(2_000).unwrap(), 2_000);
            assert_eq!(sync.next(2_000).unwrap(), 2_001);
            assert_eq!(store.stamp(), Some(stamp));
        }
    }

    /// Refuses to issue beyond the maximum tick
    #[test]
    fn refuses_to_issue_beyond_the_maximum_tick() {
        let max_tick = SyncConfig::DEFAULT_MAX_TICK;
        let store = MemoryStore::with_stamp(max_tick - 2);
        let mut sync = TimestampSynchronizer::new(store.clone());
        assert_eq!(sync.next(1_000).unwrap(), max_tick - 1);
        assert_eq!(store.stamp(), Some(max_tick));
        assert_eq!(sync.next(1_000).unwrap(), max_tick);
        for _ in 0..3 {
            assert!(matches!(
                sync.next(1_000),
                Err(Error::TimestampOverflow { limit }) if limit == max_tick
            ));
        }
        assert_eq!(sync.last_used(), Some(max_tick));
        assert!(sync.guarantee().is_cross_restart());

        let mut sync = TimestampSynchronizer::with_config(
            MemoryStore::default(),
            SyncConfig {
                margin: 10,
                max_tick: 100,
            },
        );
        assert_eq!(sync.next(95).unwrap(), 95);
        assert!(matches!(sync.next(101), Err(Error::TimestampOverflow { limit: 100 })));
        assert_eq!(sync.next(99).unwrap(), 99);
        assert_eq!(sync.next(99).unwrap(), 100);
        assert!(sync.next(99).is_err());
    }

    /// Memory store refuses to move backwards
    #[test]
    fn memory_store_refuses_to_move_backwards() {
        let mut store = MemoryStore::with_stamp(10);
        assert!(store.store(10).is_ok());
        assert!(matches!(
            store.store(9),
            Err(Error::StaleStamp {
                existing: 10,
                requested: 9
            })
        ));
        assert!(store.store(11).is_ok());
        assert_eq!(store.load().unwrap(), Some(11));
    }

    /// Converts lease interval into 100ns ticks
    #[test]
    fn converts_lease_interval_into_100ns_ticks() {
        use std::time::Duration;
        assert_eq!(
            SyncConfig::from_interval(Duration::from_secs(10)),
            SyncConfig::default()
        );
        assert_eq!(SyncConfig::from_interval(Duration::from_micros(1)).margin, 10);
    }
}

//! UUIDv1 and UUIDv6 generators

use std::sync::{Mutex, MutexGuard};

use super::{default_rand_source, NoArgGenerator, RandSource, StdSystemTime, TimeSource};
use crate::{
    clock_seq::ClockSequence,
    node::NodeId,
    sync::{Guarantee, SharedSynchronizer, TimestampSynchronizer},
    util::UuidType,
    Error, Uuid,
};

/// Number of 100-nanosecond intervals between 1582-10-15 and 1970-01-01.
pub(crate) const GREGORIAN_OFFSET: u64 = 0x01b2_1dd2_1381_4000;

/// State shared by the two Gregorian layouts, which differ only in how they pack the fields.
#[derive(Debug)]
struct TimeCore<T> {
    node: NodeId,
    synchronizer: SharedSynchronizer,
    state: Mutex<TimeState<T>>,
}

#[derive(Debug)]
struct TimeState<T> {
    clock: T,
    clock_seq: ClockSequence,
}

impl<T: TimeSource> TimeCore<T> {
    fn new<R: RandSource + ?Sized>(
        node: NodeId,
        synchronizer: SharedSynchronizer,
        rng: &mut R,
        mut clock: T,
    ) -> Result<Self, Error> {
        let clock_seq = ClockSequence::random(rng)?;
        let now = gregorian_ticks(clock.unix_ts_100ns());
        lock_synchronizer(&synchronizer).initialize(now);
        Ok(Self {
            node,
            synchronizer,
            state: Mutex::new(TimeState { clock, clock_seq }),
        })
    }

    fn lock_state(&self) -> MutexGuard<'_, TimeState<T>> {
        self.state
            .lock()
            .expect("uuidgen: could not lock time-based generator")
    }

    /// Returns the next 60-bit timestamp and the clock sequence to pair with it.
    ///
    /// The synchronizer never issues more than 60 bits as long as its maximum tick is left at the
    /// default; a larger configured maximum is caught by the packing functions.
    fn next(&self) -> Result<(u64, u16), Error> {
        let mut state = self.lock_state();
        let reading = gregorian_ticks(state.clock.unix_ts_100ns());
        let clock_seq = state.clock_seq.observe(reading);
        let timestamp = lock_synchronizer(&self.synchronizer).next(reading)?;
        Ok((timestamp, clock_seq))
    }

    fn clock_sequence(&self) -> u16 {
        self.lock_state().clock_seq.value()
    }

    fn guarantee(&self) -> Guarantee {
        lock_synchronizer(&self.synchronizer).guarantee().clone()
    }
}

fn lock_synchronizer(synchronizer: &SharedSynchronizer) -> MutexGuard<'_, TimestampSynchronizer> {
    synchronizer
        .lock()
        .expect("uuidgen: could not lock timestamp synchronizer")
}

fn gregorian_ticks(unix_ts_100ns: u64) -> u64 {
    unix_ts_100ns.saturating_add(GREGORIAN_OFFSET)
}

macro_rules! time_based_generator {
    (
        $(#[$attr:meta])*
        $name:ident, $version:literal, $uuid_type:expr, $pack:path
    ) => {
        $(#[$attr])*
        #[derive(Debug)]
        pub struct $name<T = StdSystemTime> {
            core: TimeCore<T>,
        }

        impl $name {
            /// Creates a generator that reads the system clock, with a random initial clock
            /// sequence drawn from the operating system.
            ///
            /// The synchronizer is initialized immediately, so a storage failure is already visible
            /// through [`guarantee`](Self::guarantee) when this returns.
            pub fn new(node: NodeId, synchronizer: SharedSynchronizer) -> Result<Self, Error> {
                Self::with_rand_and_time_sources(
                    node,
                    synchronizer,
                    &mut default_rand_source(),
                    StdSystemTime,
                )
            }
        }

        impl<T: TimeSource> $name<T> {
            /// Creates a generator with a custom clock, drawing the initial clock sequence from
            /// `rng`.
            pub fn with_rand_and_time_sources<R: RandSource + ?Sized>(
                node: NodeId,
                synchronizer: SharedSynchronizer,
                rng: &mut R,
                clock: T,
            ) -> Result<Self, Error> {
                Ok(Self {
                    core: TimeCore::new(node, synchronizer, rng, clock)?,
                })
            }

            #[doc = concat!("Generates a new UUIDv", $version, " object from the current time.")]
            ///
            /// # Panics
            ///
            /// Panics if the synchronizer has no timestamp left below its maximum tick, which
            /// happens only with a clock set past the year 5236. Use
            /// [`NoArgGenerator::generate`] to receive an error instead.
            pub fn generate(&self) -> Uuid {
                match self.try_generate() {
                    Ok(uuid) => uuid,
                    Err(err) => panic!("uuidgen: {err}"),
                }
            }

            fn try_generate(&self) -> Result<Uuid, Error> {
                let (timestamp, clock_seq) = self.core.next()?;
                Ok($pack(timestamp, clock_seq, self.core.node.to_u64()))
            }

            /// Packs `timestamp`, counted in 100-nanosecond intervals since 1582-10-15, with the
            /// current clock sequence and node, bypassing the clock and the synchronizer.
            ///
            /// # Panics
            ///
            /// Panics if `timestamp` is not a 60-bit unsigned integer.
            pub fn construct(&self, timestamp: u64) -> Uuid {
                $pack(timestamp, self.core.clock_sequence(), self.core.node.to_u64())
            }

            /// Returns the node identifier placed in every UUID.
            pub const fn node(&self) -> NodeId {
                self.core.node
            }

            /// Returns the current clock sequence value.
            pub fn clock_sequence(&self) -> u16 {
                self.core.clock_sequence()
            }

            /// Returns the uniqueness guarantee the underlying synchronizer currently provides.
            pub fn guarantee(&self) -> Guarantee {
                self.core.guarantee()
            }

            /// Returns the synchronizer shared by this generator.
            pub fn synchronizer(&self) -> &SharedSynchronizer {
                &self.core.synchronizer
            }
        }

        impl<T: TimeSource> NoArgGenerator for $name<T> {
            fn uuid_type(&self) -> UuidType {
                $uuid_type
            }

            fn generate(&self) -> Result<Uuid, Error> {
                self.try_generate()
            }
        }
    };
}

time_based_generator! {
    /// Generates UUIDv1 values from a Gregorian timestamp, a clock sequence and a node identifier.
    ///
    /// Timestamps are issued through a [`TimestampSynchronizer`], so they strictly increase across
    /// all generators sharing it and, with a stable store, across process restarts.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use uuidgen::{sync::TimestampSynchronizer, NodeId, TimeBasedGenerator};
    ///
    /// let node: NodeId = "9f:6b:de:ce:d8:46".parse()?;
    /// let g = TimeBasedGenerator::new(node, TimestampSynchronizer::process_local().into_shared())?;
    /// println!("{}", g.generate()); // e.g., "c232ab00-9414-11ec-b3c8-9f6bdeced846"
    /// # Ok::<(), uuidgen::Error>(())
    /// ```
    TimeBasedGenerator, 1, UuidType::TimeBased, Uuid::from_fields_v1
}

time_based_generator! {
    /// Generates UUIDv6 values, which carry the same fields as UUIDv1 but store the timestamp
    /// most significant bits first so that byte order follows creation order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use uuidgen::{sync::TimestampSynchronizer, NodeId, TimeBasedReorderedGenerator};
    ///
    /// let sync = TimestampSynchronizer::process_local().into_shared();
    /// let g = TimeBasedReorderedGenerator::new(NodeId::from_u64(0x9f6b_dece_d846), sync)?;
    /// let (x, y) = (g.generate(), g.generate());
    /// assert!(x < y);
    /// # Ok::<(), uuidgen::Error>(())
    /// ```
    TimeBasedReorderedGenerator, 6, UuidType::TimeBasedReordered, Uuid::from_fields_v6
}

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use rand::{rngs::StdRng, SeedableRng};

use super::{with_rand08::Adapter, RandSource, TimeSource};
use crate::Error;

/// Returns a deterministic random source for reproducible tests.
pub(crate) fn seeded_rng(seed: u64) -> Adapter<StdRng> {
    Adapter(StdRng::seed_from_u64(seed))
}

/// A random source that always writes the same big-endian value, right-aligned in the buffer.
#[derive(Clone, Copy, Debug)]
pub(crate) struct StaticEntropy(pub u128);

impl RandSource for StaticEntropy {
    fn fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        let bytes = self.0.to_be_bytes();
        let n = dest.len().min(bytes.len());
        let offset = dest.len() - n;
        dest[..offset].fill(0);
        dest[offset..].copy_from_slice(&bytes[bytes.len() - n..]);
        Ok(())
    }
}

/// A random source that always fails, standing in for an exhausted entropy device.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FailingRandSource;

impl RandSource for FailingRandSource {
    fn fill_bytes(&mut self, _: &mut [u8]) -> Result<(), Error> {
        Err(Error::Random(rand::Error::new("entropy device unavailable")))
    }
}

/// A clock stuck at one millisecond.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FixedClock(pub u64);

impl TimeSource for FixedClock {
    fn unix_ts_ms(&mut self) -> u64 {
        self.0
    }
}

/// A clock in 100-nanosecond units that the test moves by hand.
#[derive(Clone, Debug, Default)]
pub(crate) struct ManualClock(Arc<AtomicU64>);

impl ManualClock {
    pub(crate) fn new(unix_ts_100ns: u64) -> Self {
        Self(Arc::new(AtomicU64::new(unix_ts_100ns)))
    }

    pub(crate) fn set(&self, unix_ts_100ns: u64) {
        self.0.store(unix_ts_100ns, Ordering::SeqCst);
    }
}

impl TimeSource for ManualClock {
    fn unix_ts_ms(&mut self) -> u64 {
        self.0.load(Ordering::SeqCst) / 10_000
    }

    fn unix_ts_100ns(&mut self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

//! 74-bit monotonic entropy counter of the UUIDv7 generator.

use crate::{generator::RandSource, Error};

/// Number of bits the counter spans: 12 bits of `rand_a` plus 62 bits of `rand_b`.
pub const ENTROPY_BITS: u32 = 74;

/// The largest value the counter can hold.
pub const MAX_ENTROPY: u128 = (1 << ENTROPY_BITS) - 1;

/// Keeps UUIDv7 values strictly increasing within one millisecond.
///
/// The counter is reseeded from the random source whenever the millisecond changes, and
/// incremented by exactly one, with carry across all 74 bits, while it stays the same.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Default)]
pub struct EntropyCounter {
    timestamp: Option<u64>,
    value: u128,
}

impl EntropyCounter {
    /// Creates a counter that reseeds on its first use.
    pub const fn new() -> Self {
        Self {
            timestamp: None,
            value: 0,
        }
    }

    /// Returns the millisecond of the last value handed out, if any.
    pub const fn timestamp(&self) -> Option<u64> {
        self.timestamp
    }

    /// Returns the entropy to pair with `unix_ts_ms`.
    ///
    /// Returns [`Error::EntropyExhausted`] without changing the state if the counter is already at
    /// [`MAX_ENTROPY`] within the same millisecond.
    pub fn next<R: RandSource + ?Sized>(
        &mut self,
        unix_ts_ms: u64,
        rng: &mut R,
    ) -> Result<u128, Error> {
        if self.timestamp == Some(unix_ts_ms) {
            if self.value >= MAX_ENTROPY {
                return Err(Error::EntropyExhausted(unix_ts_ms));
            }
            self.value += 1;
            Ok(self.value)
        } else {
            self.reseed(unix_ts_ms, rng)
        }
    }

    /// Draws fresh entropy for `unix_ts_ms` regardless of the previous state.
    pub fn reseed<R: RandSource + ?Sized>(
        &mut self,
        unix_ts_ms: u64,
        rng: &mut R,
    ) -> Result<u128, Error> {
        let value = random_entropy(rng)?;
        self.timestamp = Some(unix_ts_ms);
        self.value = value;
        Ok(value)
    }
}

/// Reads ten random bytes as a big-endian integer and keeps the low 74 bits.
pub(crate) fn random_entropy<R: RandSource + ?Sized>(rng: &mut R) -> Result<u128, Error> {
    let mut bytes = [0u8; 16];
    rng.fill_bytes(&mut bytes[6..])?;
    Ok(u128::from_be_bytes(bytes) & MAX_ENTROPY)
}

#[cfg(test)]
mod tests {
    use super::{EntropyCounter, MAX_ENTROPY};
    use crate::generator::tests::{FailingRandSource, StaticEntropy};
    use crate::Error;

    /// Increments by one within the same millisecond
    #[test]
    fn increments_by_one_within_the_same_millisecond() {
        let mut counter = EntropyCounter::new();
        let mut rng = StaticEntropy(0);
        for i in 0..1_000 {
            assert_eq!(counter.next(42, &mut rng).unwrap(), i);
        }
    }

    /// Reseeds when the millisecond changes
    #[test]
    fn reseeds_when_the_millisecond_changes() {
        let mut counter = EntropyCounter::new();
        let mut rng = StaticEntropy(0x5555);
        assert_eq!(counter.next(1, &mut rng).unwrap(), 0x5555);
        assert_eq!(counter.next(1, &mut rng).unwrap(), 0x5556);
        assert_eq!(counter.next(2, &mut rng).unwrap(), 0x5555);
        assert_eq!(counter.next(1, &mut rng).unwrap(), 0x5555);
        assert_eq!(counter.timestamp(), Some(1));
    }

    /// Carries across byte and field boundaries
    #[test]
    fn carries_across_byte_and_field_boundaries() {
        let cases = [
            (0xff, 0x100),
            ((1 << 62) - 1, 1 << 62),
            ((1 << 73) - 1, 1 << 73),
            (MAX_ENTROPY - 1, MAX_ENTROPY),
        ];

        for (seed, expected) in cases {
            let mut counter = EntropyCounter::new();
            let mut rng = StaticEntropy(seed);
            assert_eq!(counter.next(0, &mut rng).unwrap(), seed);
            assert_eq!(counter.next(0, &mut rng).unwrap(), expected);
        }
    }

    /// Masks random input to 74 bits
    #[test]
    fn masks_random_input_to_74_bits() {
        let mut counter = EntropyCounter::new();
        let mut rng = StaticEntropy(u128::MAX);
        assert_eq!(counter.next(0, &mut rng).unwrap(), MAX_ENTROPY);
    }

    /// Reports exhaustion without changing state
    #[test]
    fn reports_exhaustion_without_changing_state() {
        let mut counter = EntropyCounter::new();
        let mut rng = StaticEntropy(MAX_ENTROPY);
        assert_eq!(counter.next(9, &mut rng).unwrap(), MAX_ENTROPY);
        assert!(matches!(
            counter.next(9, &mut rng),
            Err(Error::EntropyExhausted(9))
        ));
        assert!(matches!(
            counter.next(9, &mut rng),
            Err(Error::EntropyExhausted(9))
        ));
        assert_eq!(counter.next(10, &mut rng).unwrap(), MAX_ENTROPY);
    }

    /// Propagates random source failure on reseed
    #[test]
    fn propagates_random_source_failure_on_reseed() {
        let mut counter = EntropyCounter::new();
        assert!(matches!(
            counter.next(1, &mut FailingRandSource),
            Err(Error::Random(_))
        ));
        assert_eq!(counter.timestamp(), None);
    }
}

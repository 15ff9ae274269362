//! 14-bit clock sequence of the time-based layouts.

use crate::{generator::RandSource, Error};

/// Disambiguates UUIDv1 and UUIDv6 values whose clock readings did not move forward.
///
/// Each time-based generator owns one instance and feeds it every raw clock reading it takes.
/// Whenever a reading is not strictly greater than the one before, the sequence is incremented
/// modulo 2^14; otherwise it is left unchanged.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct ClockSequence {
    value: u16,
    last_reading: Option<u64>,
}

impl ClockSequence {
    /// The largest value the 14-bit field can hold.
    pub const MAX: u16 = (1 << 14) - 1;

    /// Creates a clock sequence starting at the low 14 bits of `initial`.
    pub const fn new(initial: u16) -> Self {
        Self {
            value: initial & Self::MAX,
            last_reading: None,
        }
    }

    /// Creates a clock sequence starting at a random non-zero value.
    pub fn random<R: RandSource + ?Sized>(rng: &mut R) -> Result<Self, Error> {
        let mut bytes = [0u8; 2];
        rng.fill_bytes(&mut bytes)?;
        let value = u16::from_be_bytes(bytes) & Self::MAX;
        Ok(Self::new(value.max(1)))
    }

    /// Returns the current value.
    pub const fn value(&self) -> u16 {
        self.value
    }

    /// Records a clock reading and returns the value to pair with it.
    pub fn observe(&mut self, reading: u64) -> u16 {
        if matches!(self.last_reading, Some(last) if reading <= last) {
            self.value = (self.value + 1) & Self::MAX;
        }
        self.last_reading = Some(reading);
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::ClockSequence;
    use crate::generator::tests::{seeded_rng, StaticEntropy};

    /// Keeps value while readings increase
    #[test]
    fn keeps_value_while_readings_increase() {
        let mut seq = ClockSequence::new(0x1234);
        for reading in 100..200 {
            assert_eq!(seq.observe(reading), 0x1234);
        }
    }

    /// Increments on repeated or decreasing readings
    #[test]
    fn increments_on_repeated_or_decreasing_readings() {
        let mut seq = ClockSequence::new(7);
        assert_eq!(seq.observe(1_000), 7);
        assert_eq!(seq.observe(1_000), 8);
        assert_eq!(seq.observe(999), 9);
        assert_eq!(seq.observe(1_001), 9);
        assert_eq!(seq.observe(500), 10);
    }

    /// Wraps around at 14 bits
    #[test]
    fn wraps_around_at_14_bits() {
        let mut seq = ClockSequence::new(ClockSequence::MAX);
        seq.observe(5);
        assert_eq!(seq.observe(5), 0);
        assert_eq!(ClockSequence::new(u16::MAX).value(), ClockSequence::MAX);
    }

    /// Starts at a random non-zero value within 14 bits
    #[test]
    fn starts_at_a_random_non_zero_value_within_14_bits() {
        let mut rng = seeded_rng(3);
        let values: std::collections::HashSet<u16> = (0..64)
            .map(|_| ClockSequence::random(&mut rng).unwrap().value())
            .collect();
        assert!(values.len() > 1);
        assert!(values.iter().all(|&v| v > 0 && v <= ClockSequence::MAX));
        assert_eq!(
            ClockSequence::random(&mut StaticEntropy(0xabcd)).unwrap().value(),
            0x2bcd
        );
        assert_eq!(ClockSequence::random(&mut StaticEntropy(0)).unwrap().value(), 1);
        assert_eq!(ClockSequence::random(&mut StaticEntropy(0xc000)).unwrap().value(), 1);
    }
}

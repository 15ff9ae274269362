//! Integration with `rand` (v0.8) crate.

use super::{
    RandSource, RandomBasedGenerator, TimeBasedEpochGenerator, TimeBasedEpochRandomGenerator,
};
use crate::Error;
use rand::RngCore;

/// An adapter that implements [`RandSource`] for [`RngCore`] types.
///
/// Failures reported by [`RngCore::try_fill_bytes`] are propagated as [`Error::Random`] rather
/// than replaced with output from a weaker source.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct Adapter<T>(/** The wrapped [`RngCore`] type. */ pub T);

impl<T: RngCore> RandSource for Adapter<T> {
    fn fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.0.try_fill_bytes(dest).map_err(Error::from)
    }
}

impl<T: RngCore> RandomBasedGenerator<Adapter<T>> {
    /// Creates a generator object with a specified random number generator that implements
    /// [`RngCore`] from `rand` (v0.8) crate.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rand::{rngs::StdRng, SeedableRng};
    /// use uuidgen::RandomBasedGenerator;
    ///
    /// let g = RandomBasedGenerator::with_rand08(StdRng::seed_from_u64(42));
    /// assert_eq!(g.generate()?.version(), Some(4));
    /// # Ok::<(), uuidgen::Error>(())
    /// ```
    pub const fn with_rand08(rng: T) -> Self {
        Self::with_rand_source(Adapter(rng))
    }
}

impl<T: RngCore> TimeBasedEpochGenerator<Adapter<T>> {
    /// Creates a generator object with a specified random number generator that implements
    /// [`RngCore`] from `rand` (v0.8) crate.
    pub fn with_rand08(rng: T) -> Self {
        Self::with_rand_source(Adapter(rng))
    }
}

impl<T: RngCore> TimeBasedEpochRandomGenerator<Adapter<T>> {
    /// Creates a generator object with a specified random number generator that implements
    /// [`RngCore`] from `rand` (v0.8) crate.
    pub fn with_rand08(rng: T) -> Self {
        Self::with_rand_source(Adapter(rng))
    }
}

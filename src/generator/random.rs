//! UUIDv4 generator

use std::sync::Mutex;

use super::{default_rand_source, DefaultRandSource, NoArgGenerator, RandSource};
use crate::{util::UuidType, Error, Uuid};

/// Generates UUIDv4 values from 122 bits of randomness.
///
/// The random number generator is the only mutable state; it sits behind a mutex so that one
/// generator can be shared between threads.
///
/// # Examples
///
/// ```rust
/// use uuidgen::RandomBasedGenerator;
///
/// let g = RandomBasedGenerator::new();
/// println!("{}", g.generate()?); // e.g., "2ca4b2ce-6c13-40d4-bccf-37d222820f6f"
/// # Ok::<(), uuidgen::Error>(())
/// ```
#[derive(Debug)]
pub struct RandomBasedGenerator<R = DefaultRandSource> {
    rng: Mutex<R>,
}

impl RandomBasedGenerator {
    /// Creates a generator backed by the operating system's random number generator.
    pub const fn new() -> Self {
        Self::with_rand_source(default_rand_source())
    }
}

impl Default for RandomBasedGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RandSource> RandomBasedGenerator<R> {
    /// Creates a generator with a custom random number generator.
    pub const fn with_rand_source(rng: R) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }

    /// Generates a new UUIDv4 object.
    pub fn generate(&self) -> Result<Uuid, Error> {
        let mut bytes = [0u8; 16];
        self.rng
            .lock()
            .expect("uuidgen: could not lock random source")
            .fill_bytes(&mut bytes)?;
        Ok(Uuid::from_bytes_with_version(bytes, 4))
    }
}

impl<R: RandSource> NoArgGenerator for RandomBasedGenerator<R> {
    fn uuid_type(&self) -> UuidType {
        UuidType::RandomBased
    }

    fn generate(&self) -> Result<Uuid, Error> {
        RandomBasedGenerator::generate(self)
    }
}

//! Process-wide generators and entry point functions.

#![cfg(feature = "global_gen")]
#![cfg_attr(docsrs, doc(cfg(feature = "global_gen")))]

use std::sync::Mutex;

use rand::{
    rngs::{adapter::ReseedingRng, OsRng},
    SeedableRng,
};
use rand_chacha::ChaCha12Core;

use crate::generator::{
    with_rand08::Adapter, NameBasedGenerator, NoArgGenerator, RandomBasedGenerator,
    TimeBasedEpochGenerator, TimeBasedGenerator, TimeBasedReorderedGenerator,
};
use crate::{sync::TimestampSynchronizer, Error, Md5, NodeId, Sha1, Uuid};

/// The random number generator of the process-wide generators.
///
/// It wraps [`ChaCha12Core`] in a [`ReseedingRng`] to emulate the strategy used by
/// [`rand::rngs::ThreadRng`].
pub type GlobalRng = Adapter<ReseedingRng<ChaCha12Core, OsRng>>;

/// Creates a fresh [`GlobalRng`] seeded from the operating system.
pub fn global_rng() -> Result<GlobalRng, Error> {
    let core = ChaCha12Core::from_rng(OsRng)?;
    Ok(Adapter(ReseedingRng::new(core, 1024 * 64, OsRng)))
}

/// The process-wide generators, rebuilt on Unix when the process ID changes (i.e., upon forks).
#[derive(Debug)]
struct Globals {
    #[cfg(unix)]
    pid: u32,
    v1: TimeBasedGenerator,
    v4: RandomBasedGenerator<GlobalRng>,
    v6: TimeBasedReorderedGenerator,
    v7: TimeBasedEpochGenerator<GlobalRng>,
}

impl Globals {
    fn new() -> Result<Self, Error> {
        let mut rng = global_rng()?;
        let node = NodeId::random(&mut rng)?;
        let synchronizer = TimestampSynchronizer::process_local().into_shared();
        Ok(Self {
            #[cfg(unix)]
            pid: std::process::id(),
            v1: TimeBasedGenerator::new(node, synchronizer.clone())?,
            v4: RandomBasedGenerator::with_rand_source(global_rng()?),
            v6: TimeBasedReorderedGenerator::new(node, synchronizer)?,
            v7: TimeBasedEpochGenerator::with_rand_source(rng),
        })
    }

    fn is_stale(&self) -> bool {
        #[cfg(unix)]
        if self.pid != std::process::id() {
            return true;
        }
        false
    }
}

/// Runs `f` against the process-wide generators, creating them if none exist.
fn with_globals<T>(f: impl FnOnce(&Globals) -> Result<T, Error>) -> Result<T, Error> {
    static G: Mutex<Option<Globals>> = Mutex::new(None);
    let mut guard = G.lock().expect("uuidgen: could not lock global generator");
    let globals = match guard.take() {
        Some(globals) if !globals.is_stale() => globals,
        _ => Globals::new()?,
    };
    f(guard.insert(globals))
}

/// Generates a UUIDv1 object with a random node identifier.
///
/// All calls in the process share one timestamp synchronizer with [`uuid6`], without stable
/// storage, so timestamps strictly increase within the process only.
///
/// # Examples
///
/// ```rust
/// let uuid = uuidgen::uuid1()?;
/// println!("{}", uuid); // e.g., "c232ab00-9414-11ec-b3c8-9f6bdeced846"
/// # Ok::<(), uuidgen::Error>(())
/// ```
pub fn uuid1() -> Result<Uuid, Error> {
    with_globals(|g| NoArgGenerator::generate(&g.v1))
}

/// Generates a UUIDv3 object from a namespace and a name.
///
/// # Examples
///
/// ```rust
/// use uuidgen::generator::NAMESPACE_DNS;
///
/// let uuid = uuidgen::uuid3(Some(NAMESPACE_DNS), "www.example.com");
/// assert_eq!(uuid.to_string(), "5df41881-3aed-3515-88a7-2f4a814cf09e");
/// ```
pub fn uuid3(namespace: Option<Uuid>, name: impl AsRef<[u8]>) -> Uuid {
    NameBasedGenerator::<Md5>::new(namespace).generate(name)
}

/// Generates a UUIDv4 object.
///
/// # Examples
///
/// ```rust
/// let uuid = uuidgen::uuid4()?;
/// println!("{}", uuid); // e.g., "2ca4b2ce-6c13-40d4-bccf-37d222820f6f"
/// # Ok::<(), uuidgen::Error>(())
/// ```
pub fn uuid4() -> Result<Uuid, Error> {
    with_globals(|g| g.v4.generate())
}

/// Generates a UUIDv5 object from a namespace and a name.
///
/// # Examples
///
/// ```rust
/// use uuidgen::generator::NAMESPACE_DNS;
///
/// let uuid = uuidgen::uuid5(Some(NAMESPACE_DNS), "www.example.com");
/// assert_eq!(uuid.to_string(), "2ed6657d-e927-568b-95e1-2665a8aea6a2");
/// ```
pub fn uuid5(namespace: Option<Uuid>, name: impl AsRef<[u8]>) -> Uuid {
    NameBasedGenerator::<Sha1>::new(namespace).generate(name)
}

/// Generates a UUIDv6 object with a random node identifier.
///
/// # Examples
///
/// ```rust
/// let uuid = uuidgen::uuid6()?;
/// println!("{}", uuid); // e.g., "1ec9414c-232a-6b00-b3c8-9f6bdeced846"
/// # Ok::<(), uuidgen::Error>(())
/// ```
pub fn uuid6() -> Result<Uuid, Error> {
    with_globals(|g| NoArgGenerator::generate(&g.v6))
}

/// Generates a UUIDv7 object.
///
/// This function employs a global generator and guarantees the process-wide monotonic order of
/// UUIDs generated within the same millisecond. On Unix, this function resets the generator when
/// the process ID changes (i.e., upon process forks) to prevent collisions across processes.
///
/// # Examples
///
/// ```rust
/// let uuid = uuidgen::uuid7()?;
/// println!("{}", uuid); // e.g., "01809424-3e59-7c05-9219-566f82fff672"
/// println!("{:?}", uuid.as_bytes()); // as 16-byte big-endian array
/// # Ok::<(), uuidgen::Error>(())
/// ```
pub fn uuid7() -> Result<Uuid, Error> {
    with_globals(|g| g.v7.generate())
}

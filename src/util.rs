//! Helpers for inspecting existing UUIDs.

use std::cmp::Ordering;

use crate::{Uuid, Variant};

/// The layouts this crate can recognize.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub enum UuidType {
    /// The Nil UUID, all bits zero.
    Nil,
    /// Version 1, Gregorian time-based.
    TimeBased,
    /// Version 2, DCE security. Recognized but never generated.
    Dce,
    /// Version 3, name-based with MD5.
    NameBasedMd5,
    /// Version 4, random.
    RandomBased,
    /// Version 5, name-based with SHA-1.
    NameBasedSha1,
    /// Version 6, reordered Gregorian time-based.
    TimeBasedReordered,
    /// Version 7, Unix Epoch time-based.
    TimeBasedEpoch,
    /// The Max UUID, all bits one.
    Max,
}

impl UuidType {
    /// Returns the version number carried in the version field, or `None` for the sentinels.
    pub const fn version(&self) -> Option<u8> {
        match self {
            Self::Nil | Self::Max => None,
            Self::TimeBased => Some(1),
            Self::Dce => Some(2),
            Self::NameBasedMd5 => Some(3),
            Self::RandomBased => Some(4),
            Self::NameBasedSha1 => Some(5),
            Self::TimeBasedReordered => Some(6),
            Self::TimeBasedEpoch => Some(7),
        }
    }
}

/// Returns the Nil UUID.
pub const fn nil_uuid() -> Uuid {
    Uuid::NIL
}

/// Returns the Max UUID.
pub const fn max_uuid() -> Uuid {
    Uuid::MAX
}

/// Classifies `uuid`, returning `None` for a layout outside the RFC 9562 variant or an unknown
/// version.
pub fn type_of(uuid: &Uuid) -> Option<UuidType> {
    if *uuid == Uuid::NIL {
        return Some(UuidType::Nil);
    } else if *uuid == Uuid::MAX {
        return Some(UuidType::Max);
    } else if uuid.variant() != Variant::Var10 {
        return None;
    }

    match uuid.version()? {
        1 => Some(UuidType::TimeBased),
        2 => Some(UuidType::Dce),
        3 => Some(UuidType::NameBasedMd5),
        4 => Some(UuidType::RandomBased),
        5 => Some(UuidType::NameBasedSha1),
        6 => Some(UuidType::TimeBasedReordered),
        7 => Some(UuidType::TimeBasedEpoch),
        _ => None,
    }
}

/// Returns the timestamp embedded in a time-based UUID.
///
/// For versions 1 and 6 the result counts 100-nanosecond intervals since 1582-10-15; for version 7
/// it counts milliseconds since the Unix epoch. Every other input, including `None` and the
/// sentinels, yields 0.
///
/// Only the RFC 9562 variant (`10`) is read. A value carrying version 1, 6 or 7 in another variant
/// (NCS, Microsoft or reserved) does not follow these layouts, so it also yields 0, the same way
/// [`type_of`] classifies it as `None`.
///
/// # Examples
///
/// ```rust
/// use uuidgen::{util::extract_timestamp, Uuid};
///
/// let e: Uuid = "c232ab00-9414-11ec-b3c8-9f6bdeced846".parse()?;
/// assert_eq!(extract_timestamp(Some(&e)), 0x1ec_9414_c232_ab00);
/// assert_eq!(extract_timestamp(None), 0);
/// # Ok::<(), uuidgen::ParseError>(())
/// ```
pub fn extract_timestamp(uuid: Option<&Uuid>) -> u64 {
    let Some(uuid) = uuid else {
        return 0;
    };
    let msb = uuid.most_significant_bits();
    match type_of(uuid) {
        Some(UuidType::TimeBased) => {
            (msb & 0xfff) << 48 | ((msb >> 16) & 0xffff) << 32 | msb >> 32
        }
        Some(UuidType::TimeBasedReordered) => {
            (msb >> 32) << 28 | ((msb >> 16) & 0xffff) << 12 | msb & 0xfff
        }
        Some(UuidType::TimeBasedEpoch) => msb >> 16,
        _ => 0,
    }
}

/// Compares two UUIDs by version first and then by content.
///
/// Version 1 UUIDs are ordered by their embedded timestamp and then by their least significant
/// 64 bits, which gives them creation order. Everything else is compared as unsigned 128-bit
/// integers.
pub fn compare(a: &Uuid, b: &Uuid) -> Ordering {
    let version = |e: &Uuid| e.as_bytes()[6] >> 4;
    version(a).cmp(&version(b)).then_with(|| {
        if version(a) == 1 {
            extract_timestamp(Some(a))
                .cmp(&extract_timestamp(Some(b)))
                .then_with(|| a.least_significant_bits().cmp(&b.least_significant_bits()))
        } else {
            a.cmp(b)
        }
    })
}

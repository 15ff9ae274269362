//! 48-bit node identifier used by the time-based layouts.

use std::{fmt, str};

use crate::{generator::RandSource, Error};

/// Represents the 48-bit node field of UUIDv1 and UUIDv6.
///
/// A node identifier is either a real IEEE 802 hardware address supplied by the caller or a
/// random value with the multicast bit (the least significant bit of the first octet) set, which
/// marks it as not being a genuine hardware address.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct NodeId([u8; 6]);

impl NodeId {
    /// Creates a node identifier from six address octets.
    pub const fn from_bytes(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    /// Creates a node identifier from the low 48 bits of `value`.
    pub const fn from_u64(value: u64) -> Self {
        let b = value.to_be_bytes();
        Self([b[2], b[3], b[4], b[5], b[6], b[7]])
    }

    /// Creates a node identifier from a byte slice, which must be exactly six bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, Error> {
        <[u8; 6]>::try_from(bytes).map(Self).map_err(|_| {
            Error::InvalidNodeId(format!(
                "expected 6 octets but got {} octets",
                bytes.len()
            ))
        })
    }

    /// Creates a random node identifier with the multicast bit set.
    pub fn random<R: RandSource + ?Sized>(rng: &mut R) -> Result<Self, Error> {
        let mut bytes = [0u8; 6];
        rng.fill_bytes(&mut bytes)?;
        bytes[0] |= 0x01;
        Ok(Self(bytes))
    }

    /// Returns a reference to the six address octets.
    pub const fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }

    /// Returns the identifier as an integer in the low 48 bits.
    pub const fn to_u64(&self) -> u64 {
        let b = self.0;
        u64::from_be_bytes([0, 0, b[0], b[1], b[2], b[3], b[4], b[5]])
    }

    /// Returns `true` if the multicast bit is set.
    pub const fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 != 0
    }
}

impl fmt::Display for NodeId {
    /// Returns the 17-character lowercase colon-separated representation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

impl str::FromStr for NodeId {
    type Err = Error;

    /// Parses six colon-separated hexadecimal octets.
    ///
    /// Leading zeros may be omitted, so an empty octet reads as zero: `0:1b:2::c:ff` and
    /// `00:1b:02:00:0c:ff` are the same address.
    fn from_str(src: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| Error::InvalidNodeId(format!("{reason} in '{src}'"));

        let mut bytes = [0u8; 6];
        let mut parts = src.split(':');
        for e in bytes.iter_mut() {
            let part = parts.next().ok_or_else(|| invalid("missing octet"))?;
            if part.len() > 2 {
                return Err(invalid("octet longer than two digits"));
            }
            for c in part.chars() {
                let digit = c
                    .to_digit(16)
                    .ok_or_else(|| invalid("non-hex character"))?;
                *e = (*e << 4) | digit as u8;
            }
        }
        if parts.next().is_some() {
            return Err(invalid("more than six octets"));
        }
        Ok(Self(bytes))
    }
}

impl From<NodeId> for [u8; 6] {
    fn from(src: NodeId) -> Self {
        src.0
    }
}

impl From<[u8; 6]> for NodeId {
    fn from(src: [u8; 6]) -> Self {
        Self(src)
    }
}

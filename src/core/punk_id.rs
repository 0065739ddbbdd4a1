//! Punk identifiers.
//!
//! Identifiers travel as decimal strings (JSON object keys, URL path segments,
//! CLI arguments) but are ordered numerically so persisted maps come out as
//! `"0", "1", ..., "10"` rather than in lexicographic order.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::core::error::PunksError;

/// Identifier of one collection member.
///
/// # Examples
///
/// ```rust
/// use punks_cli::core::PunkId;
///
/// let id: PunkId = "42".parse().unwrap();
/// assert_eq!(id.to_string(), "42");
/// assert_eq!(id.padded(), "0042");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PunkId(u32);

impl PunkId {
    /// Create an identifier from its numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Numeric value of the identifier.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Zero-padded 4-digit form used by the public image URL templates.
    #[must_use]
    pub fn padded(self) -> String {
        format!("{:04}", self.0)
    }
}

impl fmt::Display for PunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PunkId {
    type Err = PunksError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PunksError::InvalidPunkId {
                id: s.to_string(),
            });
        }
        trimmed.parse::<u32>().map(Self).map_err(|_| PunksError::InvalidPunkId {
            id: s.to_string(),
        })
    }
}

impl From<u32> for PunkId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl Serialize for PunkId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct PunkIdVisitor;

impl Visitor<'_> for PunkIdVisitor {
    type Value = PunkId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal punk id")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        u32::try_from(v).map(PunkId).map_err(|_| E::custom(format!("punk id out of range: {v}")))
    }
}

impl<'de> Deserialize<'de> for PunkId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PunkIdVisitor)
    }
}

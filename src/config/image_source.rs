//! Image source selection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::{PunksError, UrlTemplate};

/// Where served image URLs come from, chosen once at startup.
///
/// Three sources are pure templates over the id; `opensea-cdn` and `alchemy`
/// both go through the resolver and its mapping store.
///
/// Parsing is case-insensitive. An unrecognised name is rejected with
/// [`PunksError::InvalidImageSource`] rather than silently falling back to a
/// default source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageSource {
    #[default]
    #[serde(rename = "cryptopunks.app")]
    CryptopunksApp,
    #[serde(rename = "larvalabs")]
    Larvalabs,
    #[serde(rename = "opensea")]
    Opensea,
    #[serde(rename = "opensea-cdn")]
    OpenseaCdn,
    #[serde(rename = "alchemy")]
    Alchemy,
}

impl ImageSource {
    pub const ALL: [Self; 5] = [
        Self::CryptopunksApp,
        Self::Larvalabs,
        Self::Opensea,
        Self::OpenseaCdn,
        Self::Alchemy,
    ];

    /// Configuration name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CryptopunksApp => "cryptopunks.app",
            Self::Larvalabs => "larvalabs",
            Self::Opensea => "opensea",
            Self::OpenseaCdn => "opensea-cdn",
            Self::Alchemy => "alchemy",
        }
    }

    /// Template for deterministic sources, `None` for resolver-backed ones.
    pub const fn template(self) -> Option<UrlTemplate> {
        match self {
            Self::CryptopunksApp => Some(UrlTemplate::CryptopunksApp),
            Self::Larvalabs => Some(UrlTemplate::Larvalabs),
            Self::Opensea => Some(UrlTemplate::Opensea),
            Self::OpenseaCdn | Self::Alchemy => None,
        }
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageSource {
    type Err = PunksError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL.into_iter().find(|source| source.as_str().eq_ignore_ascii_case(name)).ok_or_else(
            || PunksError::InvalidImageSource {
                name: name.to_string(),
            },
        )
    }
}

//! Deterministic image URL templates.
//!
//! These URLs are derivable from the identifier alone, which is what makes
//! them safe to use as a fallback: they are recomputed on every call and never
//! written to the mapping store.

use crate::constants::{ALCHEMY_CDN_HOST, CLOUDINARY_PNG_PREFIX, PUNKS_CONTRACT_ADDRESS};
use crate::core::PunkId;

/// A public image host with a fixed URL pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlTemplate {
    /// `https://www.cryptopunks.app/images/cryptopunks/punk0042.png`
    CryptopunksApp,
    /// `https://www.larvalabs.com/cryptopunks/cryptopunk42.png`
    Larvalabs,
    /// `https://opensea.io/assets/ethereum/<contract>/42`
    ///
    /// This is the marketplace asset page, not a direct image link. Clients
    /// that need image bytes should use `opensea-cdn` instead.
    Opensea,
}

impl UrlTemplate {
    /// Render the URL for `id`.
    #[must_use]
    pub fn url_for(self, id: PunkId) -> String {
        match self {
            Self::CryptopunksApp => {
                format!("https://www.cryptopunks.app/images/cryptopunks/punk{}.png", id.padded())
            }
            Self::Larvalabs => format!("https://www.larvalabs.com/cryptopunks/cryptopunk{id}.png"),
            Self::Opensea => {
                format!("https://opensea.io/assets/ethereum/{PUNKS_CONTRACT_ADDRESS}/{id}")
            }
        }
    }
}

/// Fallback served when no durable mapping exists and the provider failed.
#[must_use]
pub fn fallback_url(id: PunkId) -> String {
    UrlTemplate::CryptopunksApp.url_for(id)
}

/// Rough classification of an image URL, used in bulk-tool reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    /// Alchemy CDN render (SVG)
    Svg,
    /// Cloudinary PNG conversion of an Alchemy render
    Png,
    /// Anything else, including fallback URLs
    Other,
}

impl ImageKind {
    /// Classify `url` by host and path.
    #[must_use]
    pub fn classify(url: &str) -> Self {
        if url.starts_with(CLOUDINARY_PNG_PREFIX) || url.contains("convert-png") {
            Self::Png
        } else if url.contains(ALCHEMY_CDN_HOST) {
            Self::Svg
        } else {
            Self::Other
        }
    }

    /// Short label for reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Svg => "SVG",
            Self::Png => "PNG",
            Self::Other => "other",
        }
    }
}

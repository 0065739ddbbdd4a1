//! NFT metadata providers.
//!
//! A provider answers one question: "what is the canonical image URL for this
//! punk?". One call is one attempt; retries, rate limiting and caching are
//! layered on top by the [`resolver`](crate::resolver).
//!
//! # Outcomes
//!
//! | Provider answer | Return value | Retried |
//! |-----------------|--------------|---------|
//! | 2xx with `image.cachedUrl` | `Ok(Some(url))` | no |
//! | 2xx without it | `Ok(None)` | yes ([`FetchError::Miss`]) |
//! | non-2xx | `Err(FetchError::Status)` | yes |
//! | network failure, bad body | `Err(FetchError::Transport / Decode)` | yes |
//! | deadline exceeded | `Err(FetchError::Timeout)` | yes |

pub mod alchemy;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::core::PunkId;

pub use alchemy::AlchemyClient;

/// Failure of a single provider attempt. All variants are retryable.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// 2xx response without a usable image URL.
    #[error("provider response has no image URL")]
    Miss,

    /// Non-2xx response.
    #[error("provider returned HTTP {0}")]
    Status(u16),

    /// Connection, TLS or other request-level failure.
    #[error("request failed: {0}")]
    Transport(String),

    /// 2xx response whose body is not the expected JSON document.
    #[error("invalid response body: {0}")]
    Decode(String),

    /// The attempt exceeded its deadline and was cancelled.
    #[error("attempt timed out after {0:?}")]
    Timeout(Duration),
}

/// Source of canonical image URLs.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Issue one request for `id`.
    ///
    /// `Ok(None)` means the provider answered but had no image URL.
    async fn fetch_image_url(&self, id: PunkId) -> Result<Option<String>, FetchError>;
}

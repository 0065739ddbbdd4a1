//! Image URL resolution pipeline.
//!
//! The [`Resolver`] turns a punk id into an image URL:
//!
//! 1. A URL already in the [`MappingStore`] is returned as-is, with no
//!    network call and no rate-limiter admission.
//! 2. Otherwise the caller waits for a [`RateLimiter`] admission and the
//!    [`MetadataProvider`] is called under the [`RetryPolicy`].
//! 3. A fetched URL is written to the store before it is returned. A failed
//!    write is logged; the URL is still returned.
//! 4. When every attempt fails, the deterministic fallback URL is returned.
//!    It is never stored, so the next call for that id tries the provider
//!    again.
//!
//! `resolve` never fails. Callers that need to know where a URL came from use
//! [`Resolver::resolve_detailed`].
//!
//! The [`batch`] module drives a resolver over large id sets.

pub mod batch;
pub mod rate_limit;
pub mod retry;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::MappingStore;
use crate::config::PunksConfig;
use crate::core::{PunkId, PunksError, fallback_url};
use crate::provider::{AlchemyClient, FetchError, MetadataProvider};

pub use batch::{BatchDispatch, BatchOptions, BatchReport, BatchRunner};
pub use rate_limit::{RateLimitMode, RateLimiter};
pub use retry::{RetriesExhausted, RetryPolicy};

/// Where a resolved URL came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionSource {
    /// Present in the mapping store before the call.
    Cached,
    /// Fetched from the provider during the call.
    Fetched,
    /// Synthesized after the provider failed; not stored.
    Fallback,
}

/// URL for one id together with its origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub id: PunkId,
    pub url: String,
    pub source: ResolutionSource,
}

/// Store-first, provider-second image URL resolver.
pub struct Resolver {
    store: Arc<MappingStore>,
    limiter: Arc<RateLimiter>,
    retry: RetryPolicy,
    provider: Arc<dyn MetadataProvider>,
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("store", &self.store.path())
            .field("limiter", &self.limiter)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl Resolver {
    pub fn new(
        store: Arc<MappingStore>,
        limiter: Arc<RateLimiter>,
        retry: RetryPolicy,
        provider: Arc<dyn MetadataProvider>,
    ) -> Self {
        Self {
            store,
            limiter,
            retry,
            provider,
        }
    }

    /// Build the production pipeline described by `config`.
    ///
    /// Loads the mapping file and creates the Alchemy client.
    ///
    /// # Errors
    ///
    /// - [`PunksError::MissingApiKey`] if no API key is configured
    /// - [`PunksError::MappingParseError`] if the mapping file is malformed
    pub async fn from_config(config: &PunksConfig) -> Result<Self, PunksError> {
        let client = AlchemyClient::new(config.require_api_key()?)?
            .with_base_url(&config.provider_base_url)
            .with_contract_address(&config.contract_address);
        info!(key = %client.key_hint(), "Using Alchemy provider");

        let store = MappingStore::load(config.mapping_path()).await?;
        debug!(entries = store.len().await, "Mapping store ready");

        Ok(Self::new(
            Arc::new(store),
            Arc::new(RateLimiter::with_mode(config.rate_limit_interval(), config.rate_limit_mode)),
            config.retry_policy(),
            Arc::new(client),
        ))
    }

    pub fn store(&self) -> &Arc<MappingStore> {
        &self.store
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Image URL for `id`. Never fails.
    pub async fn resolve(&self, id: PunkId) -> String {
        self.resolve_detailed(id).await.url
    }

    /// Image URL for `id` and where it came from.
    pub async fn resolve_detailed(&self, id: PunkId) -> Resolution {
        if let Some(url) = self.store.get(id).await {
            debug!(%id, "Mapping hit");
            return Resolution {
                id,
                url,
                source: ResolutionSource::Cached,
            };
        }

        self.limiter.admit().await;

        let provider = self.provider.as_ref();
        let fetched = self
            .retry
            .execute(move || async move {
                provider.fetch_image_url(id).await?.ok_or(FetchError::Miss)
            })
            .await;

        match fetched {
            Ok(url) => {
                info!(%id, %url, "Fetched image URL");
                if let Err(e) = self.store.put(id, url.clone()).await {
                    warn!(%id, error = %e, "Serving fetched URL without durable mapping");
                }
                Resolution {
                    id,
                    url,
                    source: ResolutionSource::Fetched,
                }
            }
            Err(exhausted) => {
                warn!(%id, error = %exhausted, "Falling back to template URL");
                Resolution {
                    id,
                    url: fallback_url(id),
                    source: ResolutionSource::Fallback,
                }
            }
        }
    }

    /// Resolve every id in turn.
    pub async fn resolve_all(
        &self,
        ids: impl IntoIterator<Item = PunkId>,
    ) -> BTreeMap<PunkId, String> {
        let mut urls = BTreeMap::new();
        for id in ids {
            let url = self.resolve(id).await;
            urls.insert(id, url);
        }
        urls
    }

    /// Final flush of the mapping store.
    pub async fn shutdown(&self) -> Result<(), PunksError> {
        self.store.flush().await
    }
}

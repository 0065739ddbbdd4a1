//! Alchemy NFT API client.
//!
//! Issues `GET /nft/v3/{api_key}/getNFTMetadata?contractAddress=...&tokenId=...`
//! and extracts `image.cachedUrl` from the JSON body. The API key is part of
//! the request path, so URLs are never logged as-is.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::Deserialize;
use tracing::{debug, trace};

use super::{FetchError, MetadataProvider};
use crate::constants::{ALCHEMY_BASE_URL, PROVIDER_USER_AGENT, PUNKS_CONTRACT_ADDRESS};
use crate::core::{PunkId, PunksError};

#[derive(Debug, Deserialize)]
struct NftMetadata {
    #[serde(default)]
    image: Option<NftImage>,
}

#[derive(Debug, Deserialize)]
struct NftImage {
    #[serde(rename = "cachedUrl", default)]
    cached_url: Option<String>,
}

/// HTTP client for the Alchemy `getNFTMetadata` endpoint.
#[derive(Debug, Clone)]
pub struct AlchemyClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    contract_address: String,
}

impl AlchemyClient {
    /// Create a client for the mainnet endpoint.
    ///
    /// # Errors
    ///
    /// - [`PunksError::MissingApiKey`] if `api_key` is blank
    /// - [`PunksError::Other`] if the HTTP client cannot be built
    pub fn new(api_key: impl Into<String>) -> Result<Self, PunksError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(PunksError::MissingApiKey);
        }

        // Deadlines are enforced per attempt by the retry policy.
        let http = reqwest::Client::builder().build().map_err(|e| PunksError::Other {
            message: format!("Failed to build HTTP client: {e}"),
        })?;

        Ok(Self {
            http,
            base_url: ALCHEMY_BASE_URL.to_string(),
            api_key,
            contract_address: PUNKS_CONTRACT_ADDRESS.to_string(),
        })
    }

    /// Point the client at another host (staging, local stubs).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Query another contract.
    #[must_use]
    pub fn with_contract_address(mut self, contract_address: impl Into<String>) -> Self {
        self.contract_address = contract_address.into();
        self
    }

    /// First characters of the API key, safe for logs.
    pub fn key_hint(&self) -> String {
        let hint: String = self.api_key.chars().take(8).collect();
        format!("{hint}...")
    }

    fn metadata_url(&self, id: PunkId) -> String {
        format!(
            "{}/nft/v3/{}/getNFTMetadata?contractAddress={}&tokenId={}",
            self.base_url, self.api_key, self.contract_address, id
        )
    }
}

#[async_trait]
impl MetadataProvider for AlchemyClient {
    async fn fetch_image_url(&self, id: PunkId) -> Result<Option<String>, FetchError> {
        trace!(%id, key = %self.key_hint(), "Requesting NFT metadata");

        let response = self
            .http
            .get(self.metadata_url(id))
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, PROVIDER_USER_AGENT)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            debug!(%id, status = status.as_u16(), "Provider returned error status");
            return Err(FetchError::Status(status.as_u16()));
        }

        let metadata: NftMetadata =
            response.json().await.map_err(|e| FetchError::Decode(e.without_url().to_string()))?;

        Ok(metadata.image.and_then(|image| image.cached_url).filter(|url| !url.trim().is_empty()))
    }
}

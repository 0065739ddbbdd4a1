//! Alchemy client against a loopback stub.

use crate::common::{StubResponse, StubServer};
use punks_cli::cache::MappingStore;
use punks_cli::core::PunkId;
use punks_cli::provider::{AlchemyClient, FetchError, MetadataProvider};
use punks_cli::resolver::{RateLimiter, ResolutionSource, Resolver, RetryPolicy};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const CDN_URL: &str = "https://nft-cdn.alchemy.com/eth-mainnet/9a2b3c";

fn client_for(stub: &StubServer) -> AlchemyClient {
    AlchemyClient::new("test-key").unwrap().with_base_url(stub.base_url())
}

#[tokio::test]
async fn test_fetch_sends_expected_request() {
    let stub = StubServer::start(vec![StubResponse::metadata(CDN_URL)]).await.unwrap();

    let url = client_for(&stub).fetch_image_url(PunkId::new(7)).await.unwrap();
    assert_eq!(url.as_deref(), Some(CDN_URL));

    let requests = stub.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "GET");
    assert_eq!(
        requests[0].target,
        "/nft/v3/test-key/getNFTMetadata?contractAddress=0xb47e3cd837ddf8e4c57f05d70ab865de6e193bbb&tokenId=7"
    );
    assert_eq!(requests[0].header("accept"), Some("application/json"));
    assert!(requests[0].header("user-agent").is_some());
}

#[tokio::test]
async fn test_missing_image_is_a_miss() {
    let stub = StubServer::start(vec![
        StubResponse::json(200, json!({ "tokenId": "7" })),
        StubResponse::json(200, json!({ "image": { "cachedUrl": "" } })),
    ])
    .await
    .unwrap();
    let client = client_for(&stub);

    assert_eq!(client.fetch_image_url(PunkId::new(7)).await.unwrap(), None);
    assert_eq!(client.fetch_image_url(PunkId::new(7)).await.unwrap(), None);
}

#[tokio::test]
async fn test_error_status_and_bad_body() {
    let stub = StubServer::start(vec![
        StubResponse::status(429),
        StubResponse {
            status: 200,
            body: "not json".into(),
            delay: None,
        },
    ])
    .await
    .unwrap();
    let client = client_for(&stub);

    assert_eq!(client.fetch_image_url(PunkId::new(1)).await, Err(FetchError::Status(429)));
    assert!(matches!(
        client.fetch_image_url(PunkId::new(1)).await,
        Err(FetchError::Decode(_))
    ));
}

#[tokio::test]
async fn test_resolver_retries_then_persists() {
    let stub =
        StubServer::start(vec![StubResponse::status(500), StubResponse::metadata(CDN_URL)])
            .await
            .unwrap();
    let temp = TempDir::new().unwrap();
    let mapping_path = temp.path().join("openseaCdnMapping.json");

    let resolver = Resolver::new(
        Arc::new(MappingStore::load(&mapping_path).await.unwrap()),
        Arc::new(RateLimiter::new(Duration::from_millis(10))),
        RetryPolicy::new(3, Duration::from_secs(5)),
        Arc::new(client_for(&stub)),
    );

    let resolution = resolver.resolve_detailed(PunkId::new(42)).await;
    assert_eq!(resolution.source, ResolutionSource::Fetched);
    assert_eq!(resolution.url, CDN_URL);
    assert_eq!(stub.requests().len(), 2);

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&mapping_path).unwrap()).unwrap();
    assert_eq!(saved, json!({ "42": CDN_URL }));
}

#[tokio::test]
async fn test_slow_provider_times_out_to_fallback() {
    let stub = StubServer::start(vec![
        StubResponse::metadata(CDN_URL).delayed(Duration::from_secs(5)),
    ])
    .await
    .unwrap();
    let temp = TempDir::new().unwrap();

    let resolver = Resolver::new(
        Arc::new(MappingStore::new(temp.path().join("openseaCdnMapping.json"))),
        Arc::new(RateLimiter::new(Duration::ZERO)),
        RetryPolicy::new(1, Duration::from_millis(200)),
        Arc::new(client_for(&stub)),
    );

    let resolution = resolver.resolve_detailed(PunkId::new(9)).await;
    assert_eq!(resolution.source, ResolutionSource::Fallback);
    assert_eq!(resolution.url, "https://www.cryptopunks.app/images/cryptopunks/punk0009.png");
    assert!(!temp.path().join("openseaCdnMapping.json").exists());
}

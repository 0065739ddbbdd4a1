//! Resolver pipeline tests with a scripted provider and a real mapping file.

use futures::future::join_all;
use punks_cli::cache::MappingStore;
use punks_cli::core::PunkId;
use punks_cli::resolver::{RateLimitMode, RateLimiter, ResolutionSource, Resolver, RetryPolicy};
use punks_cli::test_utils::{DatasetFixture, MockOutcome, MockProvider, init_test_logging};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

async fn resolver_for(
    fixture: &DatasetFixture,
    provider: Arc<MockProvider>,
    limiter: RateLimiter,
) -> Resolver {
    let store = MappingStore::load(fixture.mapping_path()).await.unwrap();
    Resolver::new(
        Arc::new(store),
        Arc::new(limiter),
        RetryPolicy::new(3, Duration::from_secs(10)),
        provider,
    )
}

#[tokio::test(start_paused = true)]
async fn test_mapped_id_served_and_failing_id_falls_back() {
    init_test_logging(None);
    let fixture = DatasetFixture::sample()
        .unwrap()
        .with_mapping(&[(1, "https://cdn.example/a.svg")])
        .unwrap();
    let provider = Arc::new(
        MockProvider::new().with_outcome(PunkId::new(2), MockOutcome::Transport("reset".into())),
    );
    let resolver =
        resolver_for(&fixture, Arc::clone(&provider), RateLimiter::new(Duration::from_millis(100)))
            .await;

    assert_eq!(resolver.resolve(PunkId::new(1)).await, "https://cdn.example/a.svg");
    assert_eq!(provider.calls(), 0);

    assert_eq!(
        resolver.resolve(PunkId::new(2)).await,
        "https://www.cryptopunks.app/images/cryptopunks/punk0002.png"
    );
    assert_eq!(provider.calls_for(PunkId::new(2)), 3);

    resolver.shutdown().await.unwrap();
    assert_eq!(
        fixture.read_mapping().unwrap(),
        serde_json::json!({ "1": "https://cdn.example/a.svg" })
    );
}

#[tokio::test(start_paused = true)]
async fn test_fetched_url_survives_restart() {
    init_test_logging(None);
    let fixture = DatasetFixture::sample().unwrap();
    let url = "https://nft-cdn.alchemy.com/eth-mainnet/3f1a";
    let provider = Arc::new(MockProvider::new().with_url(PunkId::new(3), url));
    let resolver =
        resolver_for(&fixture, provider, RateLimiter::new(Duration::from_millis(100))).await;

    let resolution = resolver.resolve_detailed(PunkId::new(3)).await;
    assert_eq!(resolution.source, ResolutionSource::Fetched);
    assert_eq!(resolution.url, url);
    resolver.shutdown().await.unwrap();

    // A fresh process with a provider that always fails still serves the URL
    let failing = Arc::new(MockProvider::new().with_default(MockOutcome::Status(500)));
    let restarted =
        resolver_for(&fixture, Arc::clone(&failing), RateLimiter::new(Duration::from_millis(100)))
            .await;
    let resolution = restarted.resolve_detailed(PunkId::new(3)).await;
    assert_eq!(resolution.source, ResolutionSource::Cached);
    assert_eq!(resolution.url, url);
    assert_eq!(failing.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_transient_failures_are_retried_with_backoff() {
    init_test_logging(None);
    let fixture = DatasetFixture::sample().unwrap();
    let url = "https://nft-cdn.alchemy.com/eth-mainnet/beef";
    let provider = Arc::new(MockProvider::new().with_script(
        PunkId::new(5),
        vec![
            MockOutcome::Status(503),
            MockOutcome::Transport("connection reset".into()),
            MockOutcome::Found(url.into()),
        ],
    ));
    let resolver =
        resolver_for(&fixture, Arc::clone(&provider), RateLimiter::new(Duration::ZERO)).await;

    let start = Instant::now();
    let resolution = resolver.resolve_detailed(PunkId::new(5)).await;

    assert_eq!(resolution.source, ResolutionSource::Fetched);
    assert_eq!(resolution.url, url);
    assert_eq!(provider.calls_for(PunkId::new(5)), 3);
    // 1s then 2s between attempts
    assert!(start.elapsed() >= Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_resolutions_respect_rate_limit() {
    init_test_logging(None);
    let fixture = DatasetFixture::sequential(5).unwrap();
    let provider = Arc::new(
        MockProvider::new().with_default(MockOutcome::Found("https://cdn.example/x".into())),
    );
    let resolver = resolver_for(
        &fixture,
        Arc::clone(&provider),
        RateLimiter::with_mode(Duration::from_millis(100), RateLimitMode::Serialized),
    )
    .await;

    let start = Instant::now();
    let urls = join_all((0..5).map(|id| resolver.resolve(PunkId::new(id)))).await;

    assert_eq!(urls.len(), 5);
    assert_eq!(provider.calls(), 5);
    assert_eq!(resolver.limiter().admissions(), 5);
    assert!(start.elapsed() >= Duration::from_millis(400));
}

#[tokio::test(start_paused = true)]
async fn test_miss_is_not_cached() {
    init_test_logging(None);
    let fixture = DatasetFixture::sample().unwrap();
    let provider = Arc::new(MockProvider::new().with_outcome(PunkId::new(4), MockOutcome::Miss));
    let resolver =
        resolver_for(&fixture, Arc::clone(&provider), RateLimiter::new(Duration::ZERO)).await;

    let first = resolver.resolve_detailed(PunkId::new(4)).await;
    let second = resolver.resolve_detailed(PunkId::new(4)).await;

    assert_eq!(first.source, ResolutionSource::Fallback);
    assert_eq!(second.source, ResolutionSource::Fallback);
    // Each resolution retried from scratch
    assert_eq!(provider.calls_for(PunkId::new(4)), 6);
    assert!(!resolver.store().contains(PunkId::new(4)).await);
}

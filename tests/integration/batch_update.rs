//! Bulk resolution over fixture datasets.

use punks_cli::cache::MappingStore;
use punks_cli::core::PunkId;
use punks_cli::resolver::{
    BatchDispatch, BatchOptions, BatchRunner, RateLimitMode, RateLimiter, Resolver, RetryPolicy,
};
use punks_cli::test_utils::{DatasetFixture, MockOutcome, MockProvider, init_test_logging};
use std::sync::Arc;
use std::time::Duration;

async fn runner_for(
    fixture: &DatasetFixture,
    provider: Arc<MockProvider>,
    options: BatchOptions,
    mode: RateLimitMode,
) -> BatchRunner {
    let store = MappingStore::load(fixture.mapping_path()).await.unwrap();
    let resolver = Resolver::new(
        Arc::new(store),
        Arc::new(RateLimiter::with_mode(Duration::from_millis(100), mode)),
        RetryPolicy::new(1, Duration::from_secs(10)),
        provider,
    );
    BatchRunner::new(Arc::new(resolver), options)
}

fn options(dispatch: BatchDispatch) -> BatchOptions {
    BatchOptions {
        batch_size: 4,
        batch_delay: Duration::from_secs(1),
        item_delay: Duration::from_millis(100),
        dispatch,
    }
}

#[tokio::test(start_paused = true)]
async fn test_update_fills_missing_entries_only() {
    init_test_logging(None);
    let fixture = DatasetFixture::sequential(10)
        .unwrap()
        .with_mapping(&[
            (0, "https://cdn.example/0"),
            (4, "https://cdn.example/4"),
            (9, "https://cdn.example/9"),
        ])
        .unwrap();
    let provider = Arc::new(
        MockProvider::new().with_default(MockOutcome::Found("https://cdn.example/new".into())),
    );
    let runner = runner_for(
        &fixture,
        Arc::clone(&provider),
        options(BatchDispatch::Sequential),
        RateLimitMode::Serialized,
    )
    .await;

    let report = runner.run_all((0..10).map(PunkId::new)).await;

    assert_eq!(report.total, 10);
    assert_eq!(report.skipped, 3);
    assert_eq!(report.fetched, 7);
    assert_eq!(report.fallback, 0);
    assert_eq!(report.batches, 2);
    assert_eq!(provider.calls(), 7);
    assert!(!provider.call_log().contains(&PunkId::new(4)));

    let mapping = fixture.read_mapping().unwrap();
    assert_eq!(mapping.as_object().unwrap().len(), 10);
    assert_eq!(mapping["4"], "https://cdn.example/4");
    assert_eq!(mapping["5"], "https://cdn.example/new");
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_burst_update() {
    init_test_logging(None);
    let fixture = DatasetFixture::sequential(6).unwrap();
    let provider = Arc::new(
        MockProvider::new().with_default(MockOutcome::Found("https://cdn.example/c".into())),
    );
    let runner = runner_for(
        &fixture,
        Arc::clone(&provider),
        options(BatchDispatch::Concurrent),
        RateLimitMode::Burst,
    )
    .await;

    let report = runner.run_all((0..6).map(PunkId::new)).await;

    assert_eq!(report.fetched, 6);
    assert_eq!(report.batches, 2);
    assert_eq!(provider.calls(), 6);
    assert_eq!(fixture.read_mapping().unwrap().as_object().unwrap().len(), 6);
}

#[tokio::test(start_paused = true)]
async fn test_failed_ids_are_left_for_the_next_run() {
    init_test_logging(None);
    let fixture = DatasetFixture::sequential(5)
        .unwrap()
        .with_mapping(&[(0, "https://cdn.example/0")])
        .unwrap();
    let provider = Arc::new(
        MockProvider::new()
            .with_default(MockOutcome::Status(500))
            .with_url(PunkId::new(2), "https://cdn.example/2"),
    );
    let runner = runner_for(
        &fixture,
        Arc::clone(&provider),
        options(BatchDispatch::Sequential),
        RateLimitMode::Serialized,
    )
    .await;

    let report = runner.run_all((0..5).map(PunkId::new)).await;

    assert_eq!(report.skipped, 1);
    assert_eq!(report.fetched, 1);
    assert_eq!(report.fallback, 3);

    let mapping = fixture.read_mapping().unwrap();
    let keys: Vec<&String> = mapping.as_object().unwrap().keys().collect();
    assert_eq!(keys, ["0", "2"]);
}

//! SVG to PNG conversion with HEAD checks against a stub.

use crate::common::{StubResponse, StubServer};
use punks_cli::core::PunkId;
use punks_cli::repair::{HttpHeadCheck, PngConverter};
use punks_cli::test_utils::DatasetFixture;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_convert_rewrites_reachable_pngs_only() {
    let stub = StubServer::start(vec![StubResponse::status(200), StubResponse::status(404)])
        .await
        .unwrap();
    let fixture = DatasetFixture::sample()
        .unwrap()
        .with_mapping(&[
            (1, "https://nft-cdn.alchemy.com/eth-mainnet/hash1"),
            (2, "https://nft-cdn.alchemy.com/eth-mainnet/hash2"),
            (3, "https://www.cryptopunks.app/images/cryptopunks/punk0003.png"),
        ])
        .unwrap();

    let prefix = format!("{}/png/", stub.base_url());
    let converter = PngConverter::new(Arc::new(HttpHeadCheck::new(Duration::from_secs(5)).unwrap()))
        .with_png_prefix(prefix.clone())
        .with_batch_size(2)
        .with_item_delay(Duration::ZERO);

    let (mapping, report) = converter.convert_file(&fixture.mapping_path()).await.unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.converted, 1);
    assert_eq!(report.kept, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(mapping[&PunkId::new(1)], format!("{prefix}hash1"));
    assert_eq!(mapping[&PunkId::new(2)], "https://nft-cdn.alchemy.com/eth-mainnet/hash2");

    let requests = stub.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests.iter().all(|r| r.method == "HEAD"));
    assert_eq!(requests[0].target, "/png/hash1");
    assert_eq!(requests[1].target, "/png/hash2");

    let saved = fixture.read_mapping().unwrap();
    assert_eq!(saved["1"], format!("{prefix}hash1"));
    assert_eq!(saved.as_object().unwrap().len(), 3);
}

//! The `punks` binary against fixture data directories.

use crate::common::punks_cmd;
use predicates::prelude::*;
use punks_cli::test_utils::DatasetFixture;
use std::fs;

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[test]
fn test_types_and_accessories() {
    let fixture = DatasetFixture::sample().unwrap();

    let output = punks_cmd(fixture.path()).arg("types").assert().success();
    let types = stdout_json(output.get_output());
    assert_eq!(types, serde_json::json!(["Female", "Male", "Zombie", "Alien"]));

    let output = punks_cmd(fixture.path()).arg("accessories").assert().success();
    let accessories = stdout_json(output.get_output());
    assert_eq!(accessories.as_array().unwrap().len(), 9);
    assert_eq!(accessories[0], "Green Eye Shadow");
}

#[test]
fn test_show_uses_template_source() {
    let fixture = DatasetFixture::sample().unwrap();
    fs::write(fixture.path().join("punks.toml"), "image_source = \"larvalabs\"\n").unwrap();

    let output = punks_cmd(fixture.path()).args(["show", "3"]).assert().success();
    let punk = stdout_json(output.get_output());
    assert_eq!(punk["id"], "3");
    assert_eq!(punk["type"], "Male");
    assert_eq!(punk["image"], "https://www.larvalabs.com/cryptopunks/cryptopunk3.png");
    assert_eq!(punk["accessories"], serde_json::json!(["Wild Hair", "Nerd Glasses", "Pipe"]));
}

#[test]
fn test_show_unknown_and_invalid_ids() {
    let fixture = DatasetFixture::sample().unwrap();

    punks_cmd(fixture.path())
        .args(["show", "9999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("9999"));

    punks_cmd(fixture.path())
        .args(["show", "abc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("abc"));
}

#[test]
fn test_filter_by_type_and_accessory() {
    let fixture = DatasetFixture::sample().unwrap();

    let output = punks_cmd(fixture.path())
        .args(["filter", "female", "wild"])
        .assert()
        .success();
    let punks = stdout_json(output.get_output());
    let ids: Vec<&str> =
        punks.as_array().unwrap().iter().map(|p| p["id"].as_str().unwrap()).collect();
    assert_eq!(ids, ["2"]);

    let output = punks_cmd(fixture.path())
        .args(["filter", "any", "earring", "--limit", "1"])
        .assert()
        .success();
    let punks = stdout_json(output.get_output());
    assert_eq!(punks.as_array().unwrap().len(), 1);
    let id = punks[0]["id"].as_str().unwrap();
    assert!(id == "0" || id == "5", "unexpected punk {id}");
}

#[test]
fn test_alchemy_source_requires_api_key() {
    let fixture = DatasetFixture::sample().unwrap();

    punks_cmd(fixture.path())
        .env("PUNKS_IMAGE_SOURCE", "alchemy")
        .args(["show", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ALCHEMY_API_KEY"));
}

#[test]
fn test_unknown_image_source_is_rejected() {
    let fixture = DatasetFixture::sample().unwrap();

    punks_cmd(fixture.path())
        .env("PUNKS_IMAGE_SOURCE", "ipfs")
        .arg("types")
        .assert()
        .failure()
        .stderr(predicate::str::contains("ipfs"));
}

#[test]
fn test_snapshot_merges_mapping() {
    let fixture = DatasetFixture::sample()
        .unwrap()
        .with_mapping(&[(0, "https://nft-cdn.alchemy.com/eth-mainnet/a0")])
        .unwrap();

    punks_cmd(fixture.path())
        .args(["snapshot", "--samples", "0,1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total entries: 6"))
        .stdout(predicate::str::contains("Punk 0: SVG"));

    let snapshot: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(fixture.snapshot_path()).unwrap()).unwrap();
    assert_eq!(snapshot["0"]["image"], "https://nft-cdn.alchemy.com/eth-mainnet/a0");
    assert_eq!(snapshot["0"]["type"], "Female");
    assert_eq!(
        snapshot["1"]["image"],
        "https://www.cryptopunks.app/images/cryptopunks/punk0001.png"
    );
}

#[test]
fn test_missing_dataset_reports_path() {
    let temp = tempfile::TempDir::new().unwrap();

    punks_cmd(temp.path())
        .arg("types")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cryptoPunkData.json"));
}

//! Loading configuration files from disk.

use harness_config::{ConfigError, HarnessConfig};
use harness_wallet::{Keypair, KeypairEntry};
use std::fs;
use std::path::PathBuf;

fn wallets_json(keys: &[Keypair]) -> String {
    let entries: Vec<KeypairEntry> = keys.iter().map(KeypairEntry::from_keypair).collect();
    serde_json::json!({ "defaultWallets": entries }).to_string()
}

fn write(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, body).unwrap();
    path
}

#[test]
fn loads_json_network_and_wallet_files() {
    let dir = tempfile::tempdir().unwrap();
    let owner = Keypair::from_seed(&[1u8; 32]);
    let other = Keypair::from_seed(&[2u8; 32]);

    let networks = write(
        &dir,
        "network.json",
        r#"{
            "local": { "nodeUrl": "http://localhost:3001/", "compilerUrl": "http://localhost:3080" },
            "testnet": {
                "nodeUrl": "https://testnet.example.org",
                "compilerUrl": "https://compiler.example.org",
                "networkId": "ae_uat",
                "pollIntervalMs": 1000
            }
        }"#,
    );
    let wallets = write(&dir, "wallets.json", &wallets_json(&[owner.clone(), other.clone()]));

    let cfg = HarnessConfig::load(&networks, &wallets).unwrap();
    assert_eq!(cfg.networks().len(), 2);

    let local = cfg.network("local").unwrap();
    assert_eq!(local.node_url.as_str(), "http://localhost:3001/");
    assert_eq!(local.network_id, "ae_devnet");

    let testnet = cfg.network("testnet").unwrap();
    assert_eq!(testnet.network_id, "ae_uat");
    assert_eq!(testnet.poll_interval_ms, 1000);

    assert_eq!(cfg.keypair(0).unwrap().address(), owner.address());
    assert_eq!(cfg.keypair(1).unwrap().address(), other.address());
    assert_eq!(cfg.keypairs().unwrap().len(), 2);
}

#[test]
fn loads_toml_network_file() {
    let dir = tempfile::tempdir().unwrap();
    let networks = write(
        &dir,
        "network.toml",
        r#"
[local]
nodeUrl = "http://127.0.0.1:3013"
compilerUrl = "http://127.0.0.1:3080"
maxPollAttempts = 5
"#,
    );
    let wallets = write(&dir, "wallets.json", &wallets_json(&[Keypair::generate()]));

    let cfg = HarnessConfig::load(&networks, &wallets).unwrap();
    assert_eq!(cfg.network("local").unwrap().max_poll_attempts, 5);
}

#[test]
fn invalid_network_entry_fails_validation() {
    let dir = tempfile::tempdir().unwrap();
    let networks = write(
        &dir,
        "network.json",
        r#"{ "local": { "nodeUrl": "ftp://node", "compilerUrl": "http://compiler" } }"#,
    );
    let wallets = write(&dir, "wallets.json", r#"{ "defaultWallets": [] }"#);

    let err = HarnessConfig::load(&networks, &wallets).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { .. }), "{err}");
}

#[test]
fn malformed_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let networks = write(&dir, "network.json", "{ not json");
    let wallets = write(&dir, "wallets.json", r#"{ "defaultWallets": [] }"#);

    match HarnessConfig::load(&networks, &wallets) {
        Err(ConfigError::Parse { path, .. }) => assert!(path.ends_with("network.json")),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let wallets = write(&dir, "wallets.json", r#"{ "defaultWallets": [] }"#);
    let err = HarnessConfig::load(&dir.path().join("absent.json"), &wallets).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

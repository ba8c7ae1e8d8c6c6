//! Wallet file loading from disk.

use harness_wallet::{Keypair, KeypairEntry, WalletError, WalletFile};
use std::io::Write;

#[test]
fn load_preserves_wallet_order() {
    let owner = Keypair::from_seed(&[1u8; 32]);
    let other = Keypair::from_seed(&[2u8; 32]);
    let file = WalletFile {
        default_wallets: vec![
            KeypairEntry::from_keypair(&owner),
            KeypairEntry::from_keypair(&other),
        ],
    };

    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    write!(tmp, "{}", serde_json::to_string_pretty(&file).unwrap()).unwrap();

    let loaded = WalletFile::load(tmp.path()).unwrap();
    let keys = loaded.keypairs().unwrap();
    assert_eq!(keys[0].address(), owner.address());
    assert_eq!(keys[1].address(), other.address());
}

#[test]
fn load_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("wallets.json");
    match WalletFile::load(&missing) {
        Err(WalletError::File { path, .. }) => assert!(path.ends_with("wallets.json")),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn signatures_from_loaded_keys_verify() {
    let kp = Keypair::generate();
    let restored = KeypairEntry::from_keypair(&kp).to_keypair().unwrap();
    let sig = restored.sign(b"payload");
    harness_wallet::verify(kp.address(), b"payload", &sig).unwrap();
}

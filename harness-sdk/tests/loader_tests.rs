//! Contract source loading from disk.

use harness_sdk::{ContractArtifact, SdkError};
use std::fs;
use std::path::Path;

fn write(dir: &Path, name: &str, text: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, text).unwrap();
}

#[test]
fn includes_are_keyed_as_written() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "Main.aes",
        "include \"List.aes\"\ninclude \"lib/Util.aes\"\ncontract Main =\n  entrypoint f() : int = 1\n",
    );
    write(dir.path(), "lib/Util.aes", "include \"Helpers.aes\"\nnamespace Util =\n");
    write(dir.path(), "lib/Helpers.aes", "namespace Helpers =\n");

    let artifact = ContractArtifact::load(dir.path().join("Main.aes")).unwrap();
    let keys: Vec<&str> = artifact.file_system().keys().map(String::as_str).collect();
    assert_eq!(keys, ["Helpers.aes", "lib/Util.aes"]);
    assert!(artifact.source().starts_with("include \"List.aes\""));
}

#[test]
fn local_copy_of_stdlib_name_is_shipped() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "Main.aes", "include \"Option.aes\"\ncontract Main =\n");
    write(dir.path(), "Option.aes", "namespace MyOption =\n");

    let artifact = ContractArtifact::load(dir.path().join("Main.aes")).unwrap();
    assert_eq!(
        artifact.file_system().get("Option.aes").map(String::as_str),
        Some("namespace MyOption =\n")
    );
}

#[test]
fn include_cycles_terminate() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "Main.aes", "include \"A.aes\"\ncontract Main =\n");
    write(dir.path(), "A.aes", "include \"B.aes\"\nnamespace A =\n");
    write(dir.path(), "B.aes", "include \"A.aes\"\nnamespace B =\n");

    let artifact = ContractArtifact::load(dir.path().join("Main.aes")).unwrap();
    assert_eq!(artifact.file_system().len(), 2);
}

#[test]
fn missing_include_names_its_includer() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "Main.aes", "include \"Missing.aes\"\ncontract Main =\n");

    match ContractArtifact::load(dir.path().join("Main.aes")) {
        Err(SdkError::Load { path, includer, .. }) => {
            assert!(path.ends_with("Missing.aes"));
            assert!(includer.unwrap().ends_with("Main.aes"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn missing_source_is_a_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ContractArtifact::load(dir.path().join("Nope.aes")).unwrap_err();
    assert!(matches!(err, SdkError::Load { includer: None, .. }));
    assert!(err.to_string().contains("Nope.aes"));
}

#[test]
fn shipped_nft_contract_loads_its_receiver_interface() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../contracts/NFT.aes");
    let artifact = ContractArtifact::load(path).unwrap();
    assert!(artifact
        .file_system()
        .contains_key("interfaces/NFTReceiver.aes"));
}

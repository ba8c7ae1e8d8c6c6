//! Sessions, instances and the NFT binding against the in-process devnet.

use harness_devnet::{Devnet, DevnetNode};
use harness_rpc::{codes, NodeApi};
use harness_sdk::{
    args, ClientSession, ContractArtifact, Nft, SdkError, SessionOptions, Value,
};
use harness_wallet::Keypair;
use std::path::Path;
use std::time::Duration;

fn contract(name: &str) -> ContractArtifact {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../contracts")
        .join(name);
    ContractArtifact::load(path).unwrap()
}

fn options(network_id: &str, max_poll_attempts: u32) -> SessionOptions {
    SessionOptions {
        network_id: network_id.to_string(),
        poll_interval: Duration::from_millis(1),
        max_poll_attempts,
        ..SessionOptions::default()
    }
}

fn session(devnet: &Devnet, seed: u8) -> ClientSession {
    ClientSession::new(
        Keypair::from_seed(&[seed; 32]),
        devnet.node_api(),
        devnet.compiler_api(),
        options(devnet.node().network_id(), 5),
    )
}

#[tokio::test]
async fn deploy_records_owner_and_address() {
    let devnet = Devnet::new("ae_devnet");
    let owner = session(&devnet, 1);
    let instance = owner
        .deploy(&contract("NFT.aes"), args!["Test NFT", "TST"])
        .await
        .unwrap();

    let info = instance.deploy_info().unwrap();
    assert_eq!(info.owner, *owner.address());
    assert_eq!(instance.address(), Some(info.address));
    assert_eq!(instance.name(), "NFT");
    assert_eq!(
        info.address,
        DevnetNode::contract_address(owner.address(), 1)
    );
}

#[tokio::test]
async fn second_deploy_of_same_instance_fails() {
    let devnet = Devnet::new("ae_devnet");
    let owner = session(&devnet, 1);
    let mut instance = owner
        .deploy(&contract("NFT.aes"), args!["Test NFT", "TST"])
        .await
        .unwrap();
    let err = instance.deploy(args!["Again", "AGN"]).await.unwrap_err();
    assert!(matches!(err, SdkError::Deploy { .. }));
}

// Declares `name : int` while the NFT emulation's init expects a string.
const MISTYPED_NFT: &str = "contract NFT =
  entrypoint init(name : int, symbol : string) = {}
";

#[tokio::test]
async fn constructor_revert_is_a_deploy_error() {
    let devnet = Devnet::new("ae_devnet");
    let owner = session(&devnet, 1);
    let artifact = ContractArtifact::from_source(MISTYPED_NFT, Default::default());
    let mut instance = owner.contract(&artifact).await.unwrap();

    let err = instance.deploy(args![1u64, "x"]).await.unwrap_err();
    match &err {
        SdkError::Deploy { message } => {
            assert_eq!(message, "argument 0 of init must be a string");
        }
        other => panic!("expected a deploy error, got {other:?}"),
    }
    assert_eq!(instance.address(), None);
    assert!(instance.deploy_info().is_none());

    let address = DevnetNode::contract_address(owner.address(), 1);
    assert!(devnet.node_api().contract(&address).await.unwrap().is_none());
    // the reverted create still used nonce 1
    assert_eq!(owner.next_nonce().await.unwrap(), 2);
}

#[tokio::test]
async fn nft_binding_reads_metadata_and_tracks_ownership() {
    let devnet = Devnet::new("ae_devnet");
    let owner = session(&devnet, 1);
    let other = session(&devnet, 2);
    let nft = Nft::deploy(&owner, &contract("NFT.aes"), "Test NFT", "TST")
        .await
        .unwrap();

    assert_eq!(nft.name().await.unwrap(), "Test NFT");
    assert_eq!(nft.symbol().await.unwrap(), "TST");

    let minted = nft.mint(owner.address(), 0).await.unwrap();
    assert!(minted.tx_hash.is_some());
    assert_eq!(nft.owner_of(0).await.unwrap(), *owner.address());
    assert_eq!(nft.balance_of(owner.address()).await.unwrap(), 1);
    assert_eq!(nft.get_approved(0).await.unwrap(), None);

    nft.approve(other.address(), 0).await.unwrap();
    assert_eq!(nft.get_approved(0).await.unwrap(), Some(*other.address()));

    let err = nft.mint(other.address(), 0).await.unwrap_err();
    assert!(err.is_revert_containing("Already minted"), "{err}");
}

#[tokio::test]
async fn second_session_binds_existing_contract() {
    let devnet = Devnet::new("ae_devnet");
    let owner = session(&devnet, 1);
    let other = session(&devnet, 2);
    let artifact = contract("NFT.aes");
    let nft = Nft::deploy(&owner, &artifact, "Test NFT", "TST").await.unwrap();
    nft.mint(other.address(), 4).await.unwrap();

    let as_other = Nft::at(&other, &artifact, nft.address().unwrap()).await.unwrap();
    as_other
        .transfer_from(other.address(), owner.address(), 4)
        .await
        .unwrap();
    assert_eq!(nft.owner_of(4).await.unwrap(), *owner.address());
}

#[tokio::test]
async fn binding_checks_address_and_bytecode() {
    let devnet = Devnet::new("ae_devnet");
    let owner = session(&devnet, 1);
    let nft = Nft::deploy(&owner, &contract("NFT.aes"), "Test NFT", "TST")
        .await
        .unwrap();
    let address = nft.address().unwrap();

    let err = owner
        .at(&contract("ExampleContract.aes"), address)
        .await
        .unwrap_err();
    assert!(matches!(err, SdkError::Bind { .. }), "{err}");

    let nowhere = DevnetNode::contract_address(owner.address(), 99);
    let err = owner.at(&contract("NFT.aes"), nowhere).await.unwrap_err();
    assert!(matches!(err, SdkError::Bind { address, .. } if address == nowhere));
}

#[tokio::test]
async fn receiver_is_not_an_nft() {
    let devnet = Devnet::new("ae_devnet");
    let owner = session(&devnet, 1);
    let instance = owner.contract(&contract("ExampleContract.aes")).await.unwrap();
    let err = Nft::bind(instance).unwrap_err();
    assert!(matches!(err, SdkError::Interface(_)));
    assert!(err.to_string().contains("mint/2"));
}

#[tokio::test]
async fn interface_mismatches_fail_before_any_transaction() {
    let devnet = Devnet::new("ae_devnet");
    let owner = session(&devnet, 1);
    let instance = owner
        .deploy(&contract("NFT.aes"), args!["Test NFT", "TST"])
        .await
        .unwrap();
    let height = devnet.node().height();

    let err = instance.call("no_such_entrypoint", args![]).await.unwrap_err();
    assert!(matches!(err, SdkError::Interface(_)));
    let err = instance.call("mint", args![owner.address()]).await.unwrap_err();
    assert!(matches!(err, SdkError::Interface(_)));
    let err = instance.call("mint", args![1u64, 2u64]).await.unwrap_err();
    assert!(matches!(err, SdkError::Interface(_)));

    assert_eq!(devnet.node().height(), height);
}

#[tokio::test]
async fn generic_call_returns_typed_values() {
    let devnet = Devnet::new("ae_devnet");
    let owner = session(&devnet, 1);
    let instance = owner
        .deploy(&contract("NFT.aes"), args!["Test NFT", "TST"])
        .await
        .unwrap();

    let result = instance.call_as::<String>("symbol", args![]).await.unwrap();
    assert_eq!(result.decoded_result, "TST");
    assert!(result.tx_hash.is_none());

    let result = instance
        .call("balance_of", args![owner.address()])
        .await
        .unwrap();
    assert_eq!(result.decoded_result, Value::int(0));
}

#[tokio::test]
async fn compile_errors_carry_compiler_messages() {
    let devnet = Devnet::new("ae_devnet");
    let owner = session(&devnet, 1);
    let artifact = ContractArtifact::from_source(
        "contract Broken =\n  entrypoint f() = 1\n",
        Default::default(),
    );
    match owner.compile(&artifact).await {
        Err(SdkError::Compile { messages }) => {
            assert_eq!(messages.len(), 1);
            assert_eq!(messages[0].kind, "type_error");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn wrong_network_id_is_a_node_rejection() {
    let devnet = Devnet::new("ae_devnet");
    let session = ClientSession::new(
        Keypair::from_seed(&[1u8; 32]),
        devnet.node_api(),
        devnet.compiler_api(),
        options("ae_mainnet", 5),
    );
    let err = session
        .deploy(&contract("NFT.aes"), args!["Test NFT", "TST"])
        .await
        .unwrap_err();
    assert!(
        matches!(err, SdkError::Node { code, .. } if code == codes::INVALID_SIGNATURE),
        "{err}"
    );
}

#[tokio::test]
async fn slow_inclusion_times_out() {
    let devnet = Devnet::with_node(DevnetNode::new("ae_devnet").with_inclusion_delay(10));
    let session = ClientSession::new(
        Keypair::from_seed(&[1u8; 32]),
        devnet.node_api(),
        devnet.compiler_api(),
        options("ae_devnet", 3),
    );
    let err = session
        .deploy(&contract("NFT.aes"), args!["Test NFT", "TST"])
        .await
        .unwrap_err();
    assert!(err.is_timeout(), "{err}");
}

#[tokio::test]
async fn short_inclusion_delay_is_waited_out() {
    let devnet = Devnet::with_node(DevnetNode::new("ae_devnet").with_inclusion_delay(2));
    let owner = session(&devnet, 1);
    let nft = Nft::deploy(&owner, &contract("NFT.aes"), "Test NFT", "TST")
        .await
        .unwrap();
    assert_eq!(nft.name().await.unwrap(), "Test NFT");
}

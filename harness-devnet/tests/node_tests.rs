use harness_aci::Value;
use harness_devnet::codec::decode_value;
use harness_devnet::native::{ALREADY_MINTED, RECEIVER_REJECTED};
use harness_devnet::{DevnetCompiler, DevnetNode};
use harness_primitives::{AccountAddress, ContractAddress, EncodedBytes, TxHash};
use harness_rpc::{
    codes, CompilerApi, ContractCallTx, ContractCreateTx, DryRunRequest, NodeApi, ReturnType,
    RpcError, SignedTx, SourceUnit, Tx, TxInfo, TxParams,
};
use harness_wallet::Keypair;
use std::collections::BTreeMap;

const NETWORK_ID: &str = "ae_devnet";
const NFT_SOURCE: &str = include_str!("../../contracts/NFT.aes");
const RECEIVER_SOURCE: &str = include_str!("../../contracts/ExampleContract.aes");
const NFT_RECEIVER_INTERFACE: &str = include_str!("../../contracts/interfaces/NFTReceiver.aes");
const OPAQUE_SOURCE: &str = "contract Opaque =\n  entrypoint ping() : int = 1\n";

struct Chain {
    node: DevnetNode,
    compiler: DevnetCompiler,
    fs: BTreeMap<String, String>,
}

impl Chain {
    fn new() -> Self {
        Self::with_node(DevnetNode::new(NETWORK_ID))
    }

    fn with_node(node: DevnetNode) -> Self {
        let mut fs = BTreeMap::new();
        fs.insert(
            "interfaces/NFTReceiver.aes".to_string(),
            NFT_RECEIVER_INTERFACE.to_string(),
        );
        Self {
            node,
            compiler: DevnetCompiler::new(),
            fs,
        }
    }

    fn unit<'a>(&'a self, code: &'a str) -> SourceUnit<'a> {
        SourceUnit {
            code,
            file_system: &self.fs,
        }
    }

    async fn calldata(&self, code: &str, function: &str, args: &[Value]) -> EncodedBytes {
        let literals: Vec<String> = args.iter().map(Value::to_literal).collect();
        self.compiler
            .encode_calldata(self.unit(code), function, &literals)
            .await
            .unwrap()
    }

    async fn next_nonce(&self, account: &AccountAddress) -> u64 {
        self.node
            .account(account)
            .await
            .unwrap()
            .map_or(1, |a| a.next_nonce())
    }

    async fn send(&self, keypair: &Keypair, tx: Tx) -> Result<TxHash, RpcError> {
        let signed = SignedTx::sign(tx, keypair, NETWORK_ID).unwrap();
        self.node.send_transaction(&signed.encode().unwrap()).await
    }

    async fn included(&self, hash: &TxHash) -> TxInfo {
        self.node.transaction_info(hash).await.unwrap().unwrap()
    }

    async fn deploy(&self, keypair: &Keypair, code: &str, args: &[Value]) -> ContractAddress {
        let bytecode = self.compiler.compile(self.unit(code)).await.unwrap().bytecode;
        let tx = ContractCreateTx::new(
            *keypair.address(),
            self.next_nonce(keypair.address()).await,
            bytecode,
            self.calldata(code, "init", args).await,
            &TxParams::default(),
        );
        let hash = self.send(keypair, Tx::ContractCreateTx(tx)).await.unwrap();
        let info = self.included(&hash).await;
        assert_eq!(info.call_info.return_type, ReturnType::Ok);
        info.call_info.contract_id
    }

    async fn call(
        &self,
        keypair: &Keypair,
        contract: ContractAddress,
        function: &str,
        args: &[Value],
    ) -> (ReturnType, Value) {
        let tx = ContractCallTx::new(
            *keypair.address(),
            self.next_nonce(keypair.address()).await,
            contract,
            self.calldata(NFT_SOURCE, function, args).await,
            &TxParams::default(),
        );
        let hash = self.send(keypair, Tx::ContractCallTx(tx)).await.unwrap();
        let call_info = self.included(&hash).await.call_info;
        (
            call_info.return_type,
            decode_value(&call_info.return_value).unwrap(),
        )
    }

    async fn read(
        &self,
        code: &str,
        contract: ContractAddress,
        function: &str,
        args: &[Value],
    ) -> Value {
        let request = DryRunRequest {
            caller_id: AccountAddress::from_bytes([0u8; 32]),
            contract_id: contract,
            call_data: self.calldata(code, function, args).await,
        };
        let result = self.node.dry_run(&request).await.unwrap();
        assert_eq!(result.return_type, ReturnType::Ok);
        decode_value(&result.return_value).unwrap()
    }
}

fn nft_args() -> Vec<Value> {
    vec![Value::String("Test NFT".into()), Value::String("TST".into())]
}

fn keypair(byte: u8) -> Keypair {
    Keypair::from_seed(&[byte; 32])
}

#[tokio::test]
async fn contract_address_follows_owner_and_nonce() {
    let chain = Chain::new();
    let owner = keypair(1);
    let address = chain.deploy(&owner, NFT_SOURCE, &nft_args()).await;
    assert_eq!(address, DevnetNode::contract_address(owner.address(), 1));
    assert_eq!(chain.node.height(), 1);

    let contract = chain.node.contract(&address).await.unwrap().unwrap();
    assert_eq!(contract.owner_id, *owner.address());
    assert!(contract.active);
}

#[tokio::test]
async fn signature_for_another_network_is_rejected() {
    let chain = Chain::new();
    let owner = keypair(1);
    let bytecode = chain.compiler.compile(chain.unit(NFT_SOURCE)).await.unwrap().bytecode;
    let tx = Tx::ContractCreateTx(ContractCreateTx::new(
        *owner.address(),
        1,
        bytecode,
        chain.calldata(NFT_SOURCE, "init", &nft_args()).await,
        &TxParams::default(),
    ));
    let signed = SignedTx::sign(tx, &owner, "ae_mainnet").unwrap();

    let err = chain
        .node
        .send_transaction(&signed.encode().unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(codes::INVALID_SIGNATURE));
    assert_eq!(chain.node.height(), 0);
    assert!(chain.node.account(owner.address()).await.unwrap().is_none());
}

#[tokio::test]
async fn nonces_must_be_consecutive() {
    let chain = Chain::new();
    let owner = keypair(1);
    let nft = chain.deploy(&owner, NFT_SOURCE, &nft_args()).await;
    let mint = chain
        .calldata(NFT_SOURCE, "mint", &[Value::Address(*owner.address()), Value::int(0)])
        .await;

    for nonce in [1, 3] {
        let params = TxParams::default();
        let tx = ContractCallTx::new(*owner.address(), nonce, nft, mint.clone(), &params);
        let err = chain.send(&owner, Tx::ContractCallTx(tx)).await.unwrap_err();
        assert_eq!(err.code(), Some(codes::INVALID_NONCE), "nonce {nonce}");
    }

    let tx = ContractCallTx::new(*owner.address(), 2, nft, mint, &TxParams::default());
    assert!(chain.send(&owner, Tx::ContractCallTx(tx)).await.is_ok());
}

#[tokio::test]
async fn replayed_transaction_is_rejected() {
    let chain = Chain::new();
    let owner = keypair(1);
    let nft = chain.deploy(&owner, NFT_SOURCE, &nft_args()).await;
    let tx = Tx::ContractCallTx(ContractCallTx::new(
        *owner.address(),
        2,
        nft,
        chain.calldata(NFT_SOURCE, "name", &[]).await,
        &TxParams::default(),
    ));
    let encoded = SignedTx::sign(tx, &owner, NETWORK_ID).unwrap().encode().unwrap();

    chain.node.send_transaction(&encoded).await.unwrap();
    let err = chain.node.send_transaction(&encoded).await.unwrap_err();
    assert!(err.is_rejection());
}

#[tokio::test]
async fn call_to_unknown_contract_is_rejected() {
    let chain = Chain::new();
    let owner = keypair(1);
    let nowhere = ContractAddress::from_bytes([9u8; 32]);
    let tx = ContractCallTx::new(
        *owner.address(),
        1,
        nowhere,
        chain.calldata(NFT_SOURCE, "name", &[]).await,
        &TxParams::default(),
    );
    let err = chain.send(&owner, Tx::ContractCallTx(tx)).await.unwrap_err();
    assert_eq!(err.code(), Some(codes::UNKNOWN_CONTRACT));
}

#[tokio::test]
async fn revert_bumps_nonce_but_keeps_state() {
    let chain = Chain::new();
    let owner = keypair(1);
    let other = keypair(2);
    let nft = chain.deploy(&owner, NFT_SOURCE, &nft_args()).await;

    let (ok, _) = chain
        .call(&owner, nft, "mint", &[Value::Address(*owner.address()), Value::int(0)])
        .await;
    assert_eq!(ok, ReturnType::Ok);

    let (kind, message) = chain
        .call(&owner, nft, "mint", &[Value::Address(*other.address()), Value::int(0)])
        .await;
    assert_eq!(kind, ReturnType::Revert);
    assert_eq!(message, Value::String(ALREADY_MINTED.into()));

    let account = chain.node.account(owner.address()).await.unwrap().unwrap();
    assert_eq!(account.nonce, 3);
    assert_eq!(
        chain.read(NFT_SOURCE, nft, "owner_of", &[Value::int(0)]).await,
        Value::Address(*owner.address())
    );
    assert_eq!(
        chain.read(NFT_SOURCE, nft, "balance_of", &[Value::Address(*other.address())]).await,
        Value::int(0)
    );
}

#[tokio::test]
async fn safe_transfer_reaches_accepting_receiver() {
    let chain = Chain::new();
    let owner = keypair(1);
    let nft = chain.deploy(&owner, NFT_SOURCE, &nft_args()).await;
    let receiver = chain.deploy(&owner, RECEIVER_SOURCE, &[]).await;
    chain
        .call(&owner, nft, "mint", &[Value::Address(*owner.address()), Value::int(7)])
        .await;

    let (kind, _) = chain
        .call(
            &owner,
            nft,
            "safe_transfer_from",
            &[
                Value::Address(*owner.address()),
                Value::Address(receiver.as_account()),
                Value::int(7),
                Value::String("hello".into()),
            ],
        )
        .await;
    assert_eq!(kind, ReturnType::Ok);
    assert_eq!(
        chain.read(NFT_SOURCE, nft, "owner_of", &[Value::int(7)]).await,
        Value::Address(receiver.as_account())
    );
    assert_eq!(
        chain.read(RECEIVER_SOURCE, receiver, "received_count", &[]).await,
        Value::int(1)
    );
}

#[tokio::test]
async fn safe_transfer_to_non_receiver_fails_atomically() {
    let chain = Chain::new();
    let owner = keypair(1);
    let nft = chain.deploy(&owner, NFT_SOURCE, &nft_args()).await;
    let opaque = chain.deploy(&owner, OPAQUE_SOURCE, &[]).await;
    chain
        .call(&owner, nft, "mint", &[Value::Address(*owner.address()), Value::int(1)])
        .await;

    let (kind, message) = chain
        .call(
            &owner,
            nft,
            "safe_transfer_from",
            &[
                Value::Address(*owner.address()),
                Value::Address(opaque.as_account()),
                Value::int(1),
                Value::String(String::new()),
            ],
        )
        .await;
    assert_eq!(kind, ReturnType::Revert);
    assert_eq!(message, Value::String(RECEIVER_REJECTED.into()));
    assert_eq!(
        chain.read(NFT_SOURCE, nft, "owner_of", &[Value::int(1)]).await,
        Value::Address(*owner.address())
    );
    assert_eq!(
        chain.read(NFT_SOURCE, nft, "balance_of", &[Value::Address(*owner.address())]).await,
        Value::int(1)
    );
}

#[tokio::test]
async fn inclusion_delay_reports_pending_first() {
    let chain = Chain::with_node(DevnetNode::new(NETWORK_ID).with_inclusion_delay(2));
    let owner = keypair(1);
    let bytecode = chain.compiler.compile(chain.unit(NFT_SOURCE)).await.unwrap().bytecode;
    let tx = ContractCreateTx::new(
        *owner.address(),
        1,
        bytecode,
        chain.calldata(NFT_SOURCE, "init", &nft_args()).await,
        &TxParams::default(),
    );
    let hash = chain.send(&owner, Tx::ContractCreateTx(tx)).await.unwrap();

    assert!(chain.node.transaction_info(&hash).await.unwrap().is_none());
    assert!(chain.node.transaction_info(&hash).await.unwrap().is_none());
    let info = chain.node.transaction_info(&hash).await.unwrap().unwrap();
    assert_eq!(info.block_height, 1);
}

#[tokio::test]
async fn unknown_transaction_hash_is_an_error() {
    let chain = Chain::new();
    let err = chain
        .node
        .transaction_info(&TxHash::from_bytes([3u8; 32]))
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(codes::UNKNOWN_TRANSACTION));
}

#[tokio::test]
async fn contract_without_emulation_reverts_on_call() {
    let chain = Chain::new();
    let owner = keypair(1);
    let opaque = chain.deploy(&owner, OPAQUE_SOURCE, &[]).await;
    let request = DryRunRequest {
        caller_id: *owner.address(),
        contract_id: opaque,
        call_data: chain.calldata(OPAQUE_SOURCE, "ping", &[]).await,
    };
    let result = chain.node.dry_run(&request).await.unwrap();
    assert_eq!(result.return_type, ReturnType::Revert);
}

//! Reading an ACI and decoding results against it.

use harness_aci::{args, AciError, ContractAci, FromValue, TypeDesc, Value};
use harness_primitives::AccountAddress;
use serde_json::json;

fn nft_aci() -> ContractAci {
    let fun = |name: &str, args: serde_json::Value, returns: serde_json::Value, stateful: bool| {
        json!({ "name": name, "arguments": args, "returns": returns, "stateful": stateful, "payable": false })
    };
    ContractAci::from_json(&json!([{ "contract": {
        "name": "NFT",
        "kind": "contract_main",
        "functions": [
            fun("owner_of", json!([{ "name": "token_id", "type": "int" }]), json!("address"), false),
            fun("get_approved", json!([{ "name": "token_id", "type": "int" }]), json!({ "option": ["address"] }), false),
            fun("balance_of", json!([{ "name": "owner", "type": "address" }]), json!("int"), false),
            fun("approve", json!([
                { "name": "approved", "type": "address" },
                { "name": "token_id", "type": "int" }
            ]), json!({ "tuple": [] }), true),
        ]
    } }]))
    .unwrap()
}

#[test]
fn arguments_built_with_macro_pass_validation() {
    let aci = nft_aci();
    let spender = AccountAddress::from_bytes([3u8; 32]);
    let approve = aci.require("approve").unwrap();
    approve.check_arguments(&args![spender, 0u64]).unwrap();

    let err = approve.check_arguments(&args![0u64, spender]).unwrap_err();
    assert!(err.to_string().contains("argument 'approved'"), "{err}");
}

#[test]
fn decode_declared_return_types() {
    let aci = nft_aci();
    let owner = AccountAddress::from_bytes([1u8; 32]);

    let ty = &aci.function("owner_of").unwrap().returns;
    let value = Value::from_json(ty, &json!(owner.to_string())).unwrap();
    assert_eq!(AccountAddress::from_value(value).unwrap(), owner);

    let ty = &aci.function("get_approved").unwrap().returns;
    let none = Value::from_json(ty, &json!("None")).unwrap();
    assert_eq!(Option::<AccountAddress>::from_value(none).unwrap(), None);

    let ty = &aci.function("balance_of").unwrap().returns;
    assert_eq!(ty, &TypeDesc::Int);
    let balance = Value::from_json(ty, &json!(2)).unwrap();
    assert_eq!(u64::from_value(balance).unwrap(), 2);
}

#[test]
fn decode_mismatch_is_reported() {
    let aci = nft_aci();
    let ty = &aci.function("owner_of").unwrap().returns;
    assert!(matches!(
        Value::from_json(ty, &json!(7)),
        Err(AciError::TypeMismatch { .. })
    ));
}

#[test]
fn malformed_aci_is_rejected() {
    assert!(ContractAci::from_json(&json!([])).is_err());
    assert!(ContractAci::from_json(&json!("NFT")).is_err());
    assert!(ContractAci::from_json(&json!([{ "contract": { "name": "X" } }])).is_err());
}

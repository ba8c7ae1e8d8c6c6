//! Contract transactions, signing and wire encoding.
//!
//! A transaction body is serialized as JSON. The signed message is the
//! network id followed by the SHA-256 of that body, so a transaction signed
//! for one network never verifies on another. The signed envelope travels as
//! `tx_` + base64check(JSON) and is identified by `th_` +
//! base58check(SHA-256(JSON)).

use crate::error::{RpcError, RpcResult};
use harness_primitives::{
    sha256, AccountAddress, ContractAddress, EncodedBytes, Prefix, Signature, TxHash,
};
use harness_wallet::{verify, Keypair};
use serde::{Deserialize, Serialize};

/// Gas limit used when the caller does not pick one.
pub const DEFAULT_GAS: u64 = 25_000;
/// Gas price used when the caller does not pick one.
pub const DEFAULT_GAS_PRICE: u64 = 1_000_000_000;
/// Flat fee used when the caller does not pick one.
pub const DEFAULT_FEE: u64 = 200_000_000_000_000;

/// Economic parameters shared by create and call transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxParams {
    pub gas: u64,
    pub gas_price: u64,
    pub fee: u64,
    /// Absolute expiry height; 0 means no expiry.
    pub ttl: u64,
    pub amount: u64,
    pub deposit: u64,
}

impl Default for TxParams {
    fn default() -> Self {
        Self {
            gas: DEFAULT_GAS,
            gas_price: DEFAULT_GAS_PRICE,
            fee: DEFAULT_FEE,
            ttl: 0,
            amount: 0,
            deposit: 0,
        }
    }
}

/// Deploys bytecode and runs its constructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractCreateTx {
    pub owner_id: AccountAddress,
    pub nonce: u64,
    pub code: EncodedBytes,
    pub call_data: EncodedBytes,
    pub deposit: u64,
    pub amount: u64,
    pub gas: u64,
    pub gas_price: u64,
    pub fee: u64,
    pub ttl: u64,
}

impl ContractCreateTx {
    #[must_use]
    pub fn new(
        owner_id: AccountAddress,
        nonce: u64,
        code: EncodedBytes,
        call_data: EncodedBytes,
        params: &TxParams,
    ) -> Self {
        Self {
            owner_id,
            nonce,
            code,
            call_data,
            deposit: params.deposit,
            amount: params.amount,
            gas: params.gas,
            gas_price: params.gas_price,
            fee: params.fee,
            ttl: params.ttl,
        }
    }
}

/// Calls an entry point of a deployed contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractCallTx {
    pub caller_id: AccountAddress,
    pub nonce: u64,
    pub contract_id: ContractAddress,
    pub call_data: EncodedBytes,
    pub amount: u64,
    pub gas: u64,
    pub gas_price: u64,
    pub fee: u64,
    pub ttl: u64,
}

impl ContractCallTx {
    #[must_use]
    pub fn new(
        caller_id: AccountAddress,
        nonce: u64,
        contract_id: ContractAddress,
        call_data: EncodedBytes,
        params: &TxParams,
    ) -> Self {
        Self {
            caller_id,
            nonce,
            contract_id,
            call_data,
            amount: params.amount,
            gas: params.gas,
            gas_price: params.gas_price,
            fee: params.fee,
            ttl: params.ttl,
        }
    }
}

/// Transaction body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Tx {
    ContractCreateTx(ContractCreateTx),
    ContractCallTx(ContractCallTx),
}

impl Tx {
    /// Account that must sign this transaction.
    #[must_use]
    pub const fn signer(&self) -> &AccountAddress {
        match self {
            Self::ContractCreateTx(tx) => &tx.owner_id,
            Self::ContractCallTx(tx) => &tx.caller_id,
        }
    }

    #[must_use]
    pub const fn nonce(&self) -> u64 {
        match self {
            Self::ContractCreateTx(tx) => tx.nonce,
            Self::ContractCallTx(tx) => tx.nonce,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ContractCreateTx(_) => "ContractCreateTx",
            Self::ContractCallTx(_) => "ContractCallTx",
        }
    }

    /// Bytes covered by the signature on `network_id`.
    ///
    /// # Errors
    ///
    /// Fails only if the body cannot be serialized.
    pub fn signing_message(&self, network_id: &str) -> RpcResult<Vec<u8>> {
        let body = serde_json::to_vec(self)?;
        let mut message = network_id.as_bytes().to_vec();
        message.extend_from_slice(&sha256(&body));
        Ok(message)
    }
}

/// A transaction with its signatures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTx {
    pub signatures: Vec<Signature>,
    pub tx: Tx,
}

impl SignedTx {
    /// Signs `tx` for `network_id`.
    ///
    /// # Errors
    ///
    /// `RpcError::InvalidParams` when the keypair is not the transaction's
    /// signer.
    pub fn sign(tx: Tx, keypair: &Keypair, network_id: &str) -> RpcResult<Self> {
        if tx.signer() != keypair.address() {
            return Err(RpcError::invalid_params(format!(
                "{} must be signed by {}, not {}",
                tx.kind(),
                tx.signer(),
                keypair.address()
            )));
        }
        let signature = keypair.sign(&tx.signing_message(network_id)?);
        Ok(Self {
            signatures: vec![signature],
            tx,
        })
    }

    /// Checks that exactly one signature is present and verifies for the
    /// signer on `network_id`.
    ///
    /// # Errors
    ///
    /// `RpcError::Wallet` when verification fails.
    pub fn verify(&self, network_id: &str) -> RpcResult<()> {
        let [signature] = self.signatures.as_slice() else {
            return Err(RpcError::invalid_params(format!(
                "expected one signature, found {}",
                self.signatures.len()
            )));
        };
        verify(self.tx.signer(), &self.tx.signing_message(network_id)?, signature)?;
        Ok(())
    }

    /// `tx_` wire form.
    ///
    /// # Errors
    ///
    /// Fails only if serialization fails.
    pub fn encode(&self) -> RpcResult<EncodedBytes> {
        Ok(EncodedBytes::new(Prefix::Transaction, serde_json::to_vec(self)?))
    }

    /// Reads the `tx_` wire form.
    ///
    /// # Errors
    ///
    /// `RpcError::InvalidParams` for a non-`tx_` payload, `Serialization`
    /// for a malformed body.
    pub fn decode(encoded: &EncodedBytes) -> RpcResult<Self> {
        if encoded.prefix() != Prefix::Transaction {
            return Err(RpcError::invalid_params(format!(
                "expected a tx_ payload, got {}_",
                encoded.prefix()
            )));
        }
        Ok(serde_json::from_slice(encoded.as_bytes())?)
    }

    /// Hash identifying this transaction on the node.
    ///
    /// # Errors
    ///
    /// Fails only if serialization fails.
    pub fn hash(&self) -> RpcResult<TxHash> {
        Ok(TxHash::from_bytes(sha256(&serde_json::to_vec(self)?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call_tx(keypair: &Keypair, nonce: u64) -> Tx {
        Tx::ContractCallTx(ContractCallTx::new(
            *keypair.address(),
            nonce,
            ContractAddress::from_bytes([5u8; 32]),
            EncodedBytes::bytearray(b"calldata".to_vec()),
            &TxParams::default(),
        ))
    }

    #[test]
    fn signed_tx_verifies_only_on_its_network() {
        let keypair = Keypair::from_seed(&[1u8; 32]);
        let signed = SignedTx::sign(call_tx(&keypair, 1), &keypair, "ae_devnet").unwrap();
        signed.verify("ae_devnet").unwrap();
        assert!(signed.verify("ae_mainnet").is_err());
    }

    #[test]
    fn tampered_body_fails_verification() {
        let keypair = Keypair::from_seed(&[1u8; 32]);
        let mut signed = SignedTx::sign(call_tx(&keypair, 1), &keypair, "ae_devnet").unwrap();
        if let Tx::ContractCallTx(tx) = &mut signed.tx {
            tx.nonce = 2;
        }
        assert!(signed.verify("ae_devnet").is_err());
    }

    #[test]
    fn foreign_keypair_cannot_sign() {
        let owner = Keypair::from_seed(&[1u8; 32]);
        let other = Keypair::from_seed(&[2u8; 32]);
        assert!(matches!(
            SignedTx::sign(call_tx(&owner, 1), &other, "ae_devnet"),
            Err(RpcError::InvalidParams { .. })
        ));
    }

    #[test]
    fn wire_form_decodes_to_same_hash() {
        let keypair = Keypair::from_seed(&[3u8; 32]);
        let signed = SignedTx::sign(call_tx(&keypair, 4), &keypair, "ae_devnet").unwrap();
        let wire = signed.encode().unwrap();
        assert!(wire.to_string().starts_with("tx_"));

        let decoded = SignedTx::decode(&wire).unwrap();
        assert_eq!(decoded, signed);
        assert_eq!(decoded.hash().unwrap(), signed.hash().unwrap());
        assert_eq!(decoded.tx.nonce(), 4);
    }

    #[test]
    fn body_carries_type_tag() {
        let keypair = Keypair::from_seed(&[3u8; 32]);
        let json = serde_json::to_value(call_tx(&keypair, 1)).unwrap();
        assert_eq!(json["type"], "ContractCallTx");
        assert_eq!(json["gas"], DEFAULT_GAS);
    }
}

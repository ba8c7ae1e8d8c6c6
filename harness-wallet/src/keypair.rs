//! ed25519 signing keypairs.

use crate::error::{WalletError, WalletResult};
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use harness_primitives::{AccountAddress, Signature};
use rand::rngs::OsRng;
use std::fmt;

/// Length of the hex-encoded 64-byte secret (seed followed by public key).
const FULL_SECRET_HEX_LEN: usize = 128;
/// Length of the hex-encoded 32-byte seed.
const SEED_HEX_LEN: usize = 64;

/// A signer identity. Immutable once created.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
    address: AccountAddress,
}

impl Keypair {
    /// Generates a fresh random keypair.
    #[must_use]
    pub fn generate() -> Self {
        Self::from_signing_key(SigningKey::generate(&mut OsRng))
    }

    /// Builds a keypair from a 32-byte seed.
    #[must_use]
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self::from_signing_key(SigningKey::from_bytes(seed))
    }

    /// Parses a hex secret key: either the 64-byte seed||public form used by
    /// wallet files or a bare 32-byte seed.
    ///
    /// # Errors
    ///
    /// Returns `WalletError::InvalidSecretKey` on bad hex, a bad length, or a
    /// 64-byte secret whose public half does not belong to its seed.
    pub fn from_secret_hex(secret: &str) -> WalletResult<Self> {
        let secret = secret.trim().trim_start_matches("0x");
        let bytes = hex::decode(secret).map_err(|e| WalletError::InvalidSecretKey(e.to_string()))?;
        match secret.len() {
            FULL_SECRET_HEX_LEN => {
                let mut full = [0u8; 64];
                full.copy_from_slice(&bytes);
                let signing_key = SigningKey::from_keypair_bytes(&full)
                    .map_err(|e| WalletError::InvalidSecretKey(e.to_string()))?;
                Ok(Self::from_signing_key(signing_key))
            }
            SEED_HEX_LEN => {
                let mut seed = [0u8; 32];
                seed.copy_from_slice(&bytes);
                Ok(Self::from_seed(&seed))
            }
            other => Err(WalletError::InvalidSecretKey(format!(
                "expected {SEED_HEX_LEN} or {FULL_SECRET_HEX_LEN} hex characters, got {other}"
            ))),
        }
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let address = AccountAddress::from_bytes(signing_key.verifying_key().to_bytes());
        Self {
            signing_key,
            address,
        }
    }

    /// The public identity (`ak_...`).
    #[must_use]
    pub const fn address(&self) -> &AccountAddress {
        &self.address
    }

    /// 64-byte secret as hex (seed followed by public key).
    #[must_use]
    pub fn secret_hex(&self) -> String {
        hex::encode(self.signing_key.to_keypair_bytes())
    }

    /// Signs `message`.
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature::from_bytes(self.signing_key.sign(message).to_bytes())
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Checks `signature` over `message` against the account's public key.
///
/// # Errors
///
/// Returns `WalletError::BadSignature` when the key is not a curve point or
/// verification fails.
pub fn verify(
    signer: &AccountAddress,
    message: &[u8],
    signature: &Signature,
) -> WalletResult<()> {
    let key = VerifyingKey::from_bytes(signer.as_bytes())
        .map_err(|_| WalletError::BadSignature)?;
    let sig = ed25519_dalek::Signature::from_bytes(signature.as_bytes());
    key.verify(message, &sig).map_err(|_| WalletError::BadSignature)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_and_full_secret_agree() {
        let kp = Keypair::from_seed(&[42u8; 32]);
        let again = Keypair::from_secret_hex(&kp.secret_hex()).unwrap();
        assert_eq!(kp.address(), again.address());

        let seed_only = Keypair::from_secret_hex(&hex::encode([42u8; 32])).unwrap();
        assert_eq!(kp.address(), seed_only.address());
    }

    #[test]
    fn rejects_inconsistent_full_secret() {
        let a = Keypair::from_seed(&[1u8; 32]).secret_hex();
        let b = Keypair::from_seed(&[2u8; 32]).secret_hex();
        let spliced = format!("{}{}", &a[..64], &b[64..]);
        assert!(Keypair::from_secret_hex(&spliced).is_err());
    }

    #[test]
    fn rejects_bad_length() {
        assert!(matches!(
            Keypair::from_secret_hex("abcd"),
            Err(WalletError::InvalidSecretKey(_))
        ));
    }

    #[test]
    fn sign_then_verify() {
        let kp = Keypair::generate();
        let sig = kp.sign(b"network||tx");
        verify(kp.address(), b"network||tx", &sig).unwrap();
        assert!(verify(kp.address(), b"other", &sig).is_err());
    }

    #[test]
    fn debug_hides_secret() {
        let kp = Keypair::from_seed(&[7u8; 32]);
        let rendered = format!("{kp:?}");
        assert!(!rendered.contains(&kp.secret_hex()));
        assert!(rendered.contains("ak_"));
    }
}

//! BIP-340 Schnorr signing capability.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::schnorr::{Signature, SigningKey, VerifyingKey};
use thiserror::Error;

/// Signing primitive errors.
#[derive(Debug, Error)]
pub enum SignerError {
    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),
}

/// Schnorr signer over secp256k1.
///
/// Implementations never expose the secret; only public keys and signatures
/// leave the trait.
pub trait SchnorrSigner: Send + Sync {
    /// SEC1 compressed public key (33 bytes).
    fn public_key(&self) -> [u8; 33];

    /// BIP-340 x-only public key (32 bytes).
    fn x_only_public_key(&self) -> [u8; 32];

    /// Sign a 32-byte hash with the given auxiliary randomness.
    fn sign_schnorr(&self, hash: &[u8; 32], aux_rand: &[u8; 32]) -> Result<[u8; 64], SignerError>;
}

/// [`SchnorrSigner`] backed by `k256`.
pub struct Secp256k1Signer {
    signing_key: SigningKey,
    public_key: [u8; 33],
}

impl Secp256k1Signer {
    /// Build from a 32-byte big-endian secret scalar.
    pub fn from_bytes(secret: &[u8]) -> Result<Self, SignerError> {
        if secret.len() != 32 {
            return Err(SignerError::InvalidKey(format!(
                "expected 32 bytes, got {}",
                secret.len()
            )));
        }
        let signing_key =
            SigningKey::from_bytes(secret).map_err(|e| SignerError::InvalidKey(e.to_string()))?;

        let secret_key =
            k256::SecretKey::from_slice(secret).map_err(|e| SignerError::InvalidKey(e.to_string()))?;
        let encoded = secret_key.public_key().to_encoded_point(true);
        let public_key: [u8; 33] = encoded
            .as_bytes()
            .try_into()
            .map_err(|_| SignerError::InvalidKey("unexpected public key length".to_string()))?;

        Ok(Self {
            signing_key,
            public_key,
        })
    }
}

impl std::fmt::Debug for Secp256k1Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secp256k1Signer")
            .field("public_key", &hex::encode(self.public_key))
            .finish_non_exhaustive()
    }
}

impl SchnorrSigner for Secp256k1Signer {
    fn public_key(&self) -> [u8; 33] {
        self.public_key
    }

    fn x_only_public_key(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes().into()
    }

    fn sign_schnorr(&self, hash: &[u8; 32], aux_rand: &[u8; 32]) -> Result<[u8; 64], SignerError> {
        let signature = self
            .signing_key
            .sign_raw(hash, aux_rand)
            .map_err(|e| SignerError::SigningFailed(e.to_string()))?;
        Ok(signature.to_bytes())
    }
}

/// Verify a BIP-340 signature over `msg` under an x-only public key.
pub fn verify_schnorr(
    x_only_public_key: &[u8; 32],
    msg: &[u8],
    signature: &[u8; 64],
) -> Result<(), SignerError> {
    let key = VerifyingKey::from_bytes(x_only_public_key)
        .map_err(|e| SignerError::InvalidPublicKey(e.to_string()))?;
    let signature = Signature::try_from(&signature[..])
        .map_err(|e| SignerError::InvalidSignature(e.to_string()))?;
    key.verify_raw(msg, &signature)
        .map_err(|e| SignerError::InvalidSignature(e.to_string()))
}

/// Mock signer for testing.
///
/// Returns a fixed signature and counts calls; can be switched to fail.
#[derive(Debug, Default)]
pub struct MockSigner {
    calls: AtomicUsize,
    should_fail: AtomicBool,
}

impl MockSigner {
    pub const SIGNATURE: [u8; 64] = [0xab; 64];
    pub const PUBLIC_KEY: [u8; 33] = [0x02; 33];

    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SchnorrSigner for MockSigner {
    fn public_key(&self) -> [u8; 33] {
        Self::PUBLIC_KEY
    }

    fn x_only_public_key(&self) -> [u8; 32] {
        [0x02; 32]
    }

    fn sign_schnorr(&self, _hash: &[u8; 32], _aux_rand: &[u8; 32]) -> Result<[u8; 64], SignerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(SignerError::SigningFailed("mock signer failure".to_string()));
        }
        Ok(Self::SIGNATURE)
    }
}

//! Attestation construction.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::debug;

use crate::encoding::AttestationMessage;
use crate::error::{AttestError, AttestResult};
use crate::signer::{verify_schnorr, SchnorrSigner, SignerError};

/// Auxiliary randomness used unless configured otherwise.
///
/// All zeros makes signing deterministic: identical inputs give identical
/// signatures.
pub const DEFAULT_AUX_RAND: [u8; 32] = [0u8; 32];

/// Signed `{timestamp, price, asset id}` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attestation {
    pub timestamp: u64,
    pub price: u64,
    pub message: Vec<u8>,
    pub message_hash: [u8; 32],
    pub signature: [u8; 64],
    /// SEC1 compressed public key of the signer.
    pub public_key: [u8; 33],
}

impl Attestation {
    pub fn message_hex(&self) -> String {
        hex::encode(&self.message)
    }

    pub fn message_hash_hex(&self) -> String {
        hex::encode(self.message_hash)
    }

    pub fn signature_hex(&self) -> String {
        hex::encode(self.signature)
    }
}

/// Encodes, hashes and signs attestations with a shared signer.
#[derive(Clone)]
pub struct AttestationBuilder {
    signer: Arc<dyn SchnorrSigner>,
    aux_rand: [u8; 32],
}

impl AttestationBuilder {
    pub fn new(signer: Arc<dyn SchnorrSigner>) -> Self {
        Self {
            signer,
            aux_rand: DEFAULT_AUX_RAND,
        }
    }

    #[must_use]
    pub fn with_aux_rand(mut self, aux_rand: [u8; 32]) -> Self {
        self.aux_rand = aux_rand;
        self
    }

    /// SEC1 compressed public key of the signer.
    pub fn public_key(&self) -> [u8; 33] {
        self.signer.public_key()
    }

    pub fn x_only_public_key(&self) -> [u8; 32] {
        self.signer.x_only_public_key()
    }

    /// Build a signed attestation.
    ///
    /// # Errors
    /// - [`AttestError::Encoding`] if `timestamp` or `price` is negative,
    ///   fractional or above `2^53 - 1`. Nothing is hashed or signed.
    /// - [`AttestError::Signing`] if the signer rejects the hash.
    pub fn build(
        &self,
        timestamp: Decimal,
        price: Decimal,
        asset_id: &[u8],
    ) -> AttestResult<Attestation> {
        let message = AttestationMessage::encode(timestamp, price, asset_id)?;
        let message_hash = message.hash();

        let signature = self
            .signer
            .sign_schnorr(&message_hash, &self.aux_rand)
            .map_err(|e| AttestError::Signing {
                stage: "sign",
                reason: e.to_string(),
            })?;

        debug!(
            timestamp = message.timestamp().get(),
            price = message.price().get(),
            hash = %hex::encode(message_hash),
            "Attestation signed"
        );

        Ok(Attestation {
            timestamp: message.timestamp().get(),
            price: message.price().get(),
            message: message.into_bytes(),
            message_hash,
            signature,
            public_key: self.signer.public_key(),
        })
    }
}

impl std::fmt::Debug for AttestationBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttestationBuilder")
            .field("public_key", &hex::encode(self.signer.public_key()))
            .finish_non_exhaustive()
    }
}

/// Verifier-side check of an attestation.
///
/// Recomputes the hash from the message, then checks the signature against
/// `x_only_public_key`.
pub fn verify_attestation(
    x_only_public_key: &[u8; 32],
    attestation: &Attestation,
) -> Result<(), SignerError> {
    let message = AttestationMessage::encode(
        Decimal::from(attestation.timestamp),
        Decimal::from(attestation.price),
        attestation.message.get(crate::encoding::PREFIX_LEN..).unwrap_or_default(),
    )
    .map_err(|e| SignerError::InvalidSignature(e.to_string()))?;

    if message.as_bytes() != attestation.message.as_slice() {
        return Err(SignerError::InvalidSignature(
            "message does not match timestamp and price".to_string(),
        ));
    }
    if message.hash() != attestation.message_hash {
        return Err(SignerError::InvalidSignature(
            "message hash mismatch".to_string(),
        ));
    }
    verify_schnorr(x_only_public_key, &attestation.message_hash, &attestation.signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::EncodingError;
    use crate::signer::{MockSigner, Secp256k1Signer};
    use rust_decimal_macros::dec;

    const TEST_PRIVATE_KEY: &str =
        "97abcd30d2cac1c96271711e567ee13ec27ce4360def5f58caea31eb7c926062";
    const ASSET_PAIR: &str = "25b251070e29ca19043cf33ccd7324e2ddab03ecc4ae0b5e77c4fc0e5cf6c95a184f95df51d642435c1c516b81b297c4db95785b81d54d2e8760eaa770b7e496";

    fn builder() -> AttestationBuilder {
        let signer = Secp256k1Signer::from_bytes(&hex::decode(TEST_PRIVATE_KEY).unwrap()).unwrap();
        AttestationBuilder::new(Arc::new(signer))
    }

    #[test]
    fn test_build_currency_code_vector() {
        let att = builder().build(dec!(1656508635), dec!(20095), b"USD").unwrap();

        assert_eq!(att.timestamp, 1_656_508_635);
        assert_eq!(att.price, 20_095);
        assert_eq!(att.message_hex(), "db50bc62000000007f4e000000000000555344");
        assert_eq!(
            att.message_hash_hex(),
            "8d276e5b86bcfa2b29834aae9aca8eb592fa67ce618528b800e4fa06414b1235"
        );
        assert_eq!(
            att.signature_hex(),
            "ebb5be1f747d8a257452124ef8b5802070337ab4d377e43aee47c8c29777bf74991304bf36ef0218fb2755167d1ff334c18c395e038d382d0d477049e8501c6d"
        );
        assert_eq!(
            hex::encode(att.public_key),
            "03f03225c0efa4da141b7ed4b1d2368732719c9430bd329ed8a757fa0022833d3f"
        );
    }

    #[test]
    fn test_build_asset_pair_vectors() {
        let asset = hex::decode(ASSET_PAIR).unwrap();
        let b = builder();

        let att = b.build(dec!(1656508635), dec!(20095), &asset).unwrap();
        assert_eq!(
            att.message_hash_hex(),
            "b7369aa5ce10c29c8199d4ee3229e7549183e98ebe0090e8ab513e66b934312f"
        );
        assert_eq!(
            att.signature_hex(),
            "18fa60c9a8d8827f5b6f52ac26fbf64e5b466e0ad00fdd06d8791243963198ef29cfcf937ee86d1c60ede7f92efed562f5d7f4c484856601628cb10baefa6b15"
        );

        let att = b.build(dec!(1640991600), dec!(47169), &asset).unwrap();
        assert_eq!(
            att.message_hash_hex(),
            "28cd27d8f653bb657d5701f2ee3529faeef153412d4b61a8448932de2be31c18"
        );
        assert_eq!(
            att.signature_hex(),
            "dfe09e5984212f41c2428cb46d84ddd7b6dc82d397d1cb2aa462520db4ea5d6d3a1505efbf339b4b6413e92d880c9a4bfbf230934e72cfde15343e2b5752a668"
        );
    }

    #[test]
    fn test_build_is_deterministic() {
        let b = builder();
        let first = b.build(dec!(1656508635), dec!(20095), b"USD").unwrap();
        let second = b.build(dec!(1656508635), dec!(20095), b"USD").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_custom_aux_rand_still_verifies() {
        let b = builder().with_aux_rand([0x5a; 32]);
        let att = b.build(dec!(1656508635), dec!(20095), b"USD").unwrap();
        assert_ne!(
            att.signature_hex(),
            builder().build(dec!(1656508635), dec!(20095), b"USD").unwrap().signature_hex()
        );
        verify_attestation(&b.x_only_public_key(), &att).unwrap();
    }

    #[test]
    fn test_verify_rejects_tampering() {
        let b = builder();
        let att = b.build(dec!(1656508635), dec!(20095), b"USD").unwrap();
        verify_attestation(&b.x_only_public_key(), &att).unwrap();

        let mut forged = att.clone();
        forged.price = 20_096;
        assert!(verify_attestation(&b.x_only_public_key(), &forged).is_err());

        let mut forged = att;
        forged.signature[0] ^= 1;
        assert!(verify_attestation(&b.x_only_public_key(), &forged).is_err());
    }

    #[test]
    fn test_encoding_error_skips_signer() {
        let signer = Arc::new(MockSigner::new());
        let b = AttestationBuilder::new(signer.clone());

        let err = b.build(dec!(1656508635), dec!(20095.56), b"USD").unwrap_err();
        assert!(matches!(
            err,
            AttestError::Encoding(EncodingError::Fractional { field: "price", .. })
        ));
        let err = b.build(dec!(-5), dec!(20095), b"USD").unwrap_err();
        assert!(matches!(err, AttestError::Encoding(EncodingError::Negative { .. })));
        assert_eq!(signer.calls(), 0);
    }

    #[test]
    fn test_signing_failure_names_stage() {
        let signer = Arc::new(MockSigner::new());
        signer.set_should_fail(true);
        let b = AttestationBuilder::new(signer);

        let err = b.build(dec!(1), dec!(1), b"USD").unwrap_err();
        assert!(matches!(err, AttestError::Signing { stage: "sign", .. }));
    }
}

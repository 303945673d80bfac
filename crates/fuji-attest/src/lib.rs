//! Deterministic price attestations.
//!
//! An attestation binds `{timestamp, price, asset id}` under the oracle's
//! BIP-340 Schnorr key:
//!
//! ```text
//! message = LE64(timestamp) || LE64(price) || asset_id
//! hash    = SHA-256(message)
//! sig     = Schnorr(hash, aux_rand)
//! ```
//!
//! # Key Components
//!
//! - [`AttestationMessage`]: checked canonical encoding
//! - [`AttestationBuilder`]: encode, hash, sign
//! - [`SchnorrSigner`]: signing capability, implemented by [`Secp256k1Signer`]
//! - [`KeyManager`]: private key loading from env var or file

pub mod builder;
pub mod encoding;
pub mod error;
pub mod key;
pub mod signer;

pub use builder::{verify_attestation, Attestation, AttestationBuilder, DEFAULT_AUX_RAND};
pub use encoding::{AttestationMessage, EncodingError, PREFIX_LEN};
pub use error::{AttestError, AttestResult};
pub use key::{KeyError, KeyManager, KeySource};
pub use signer::{verify_schnorr, MockSigner, SchnorrSigner, Secp256k1Signer, SignerError};

//! Oracle key loading.
//!
//! The private key is read once at startup from an environment variable or a
//! file, decoded from hex into zeroizing memory and handed to the signer.
//! Key material is never logged.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;
use zeroize::Zeroizing;

use crate::signer::{SchnorrSigner, Secp256k1Signer, SignerError};

/// Source of the private key.
#[derive(Debug, Clone)]
pub enum KeySource {
    /// Load from environment variable.
    EnvVar { var_name: String },
    /// Load from file (recommend 0600 permissions).
    File { path: PathBuf },
}

/// Key management errors.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Failed to decode hex: {0}")]
    HexDecode(#[from] hex::FromHexError),

    #[error("Invalid private key: {0}")]
    InvalidKey(#[from] SignerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Holds the oracle signing key.
pub struct KeyManager {
    signer: Arc<Secp256k1Signer>,
}

impl KeyManager {
    /// Load the key from `source`.
    ///
    /// # Errors
    /// Returns `KeyError` if:
    /// - Environment variable not found
    /// - File read fails
    /// - Hex decoding fails
    /// - Private key is invalid
    pub fn load(source: &KeySource) -> Result<Self, KeyError> {
        let secret_bytes = match source {
            KeySource::EnvVar { var_name } => {
                let hex = Zeroizing::new(
                    std::env::var(var_name).map_err(|_| KeyError::EnvVarNotFound(var_name.clone()))?,
                );
                parse_hex_key(&hex)?
            }
            KeySource::File { path } => {
                let content = Zeroizing::new(std::fs::read_to_string(path)?);
                parse_hex_key(&content)?
            }
        };

        let manager = Self::from_bytes(&secret_bytes)?;
        info!(
            public_key = %hex::encode(manager.signer.public_key()),
            "Oracle key loaded"
        );
        Ok(manager)
    }

    /// Build from raw secret bytes.
    pub fn from_bytes(secret_bytes: &[u8]) -> Result<Self, KeyError> {
        Ok(Self {
            signer: Arc::new(Secp256k1Signer::from_bytes(secret_bytes)?),
        })
    }

    /// Shared signer for the attestation builder.
    pub fn signer(&self) -> Arc<dyn SchnorrSigner> {
        self.signer.clone()
    }

    /// Compressed public key, hex encoded.
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.signer.public_key())
    }
}

/// Parse hex key from string (supports 0x prefix and whitespace trimming).
fn parse_hex_key(hex_str: &str) -> Result<Zeroizing<Vec<u8>>, KeyError> {
    let trimmed = hex_str.trim().trim_start_matches("0x");
    Ok(Zeroizing::new(hex::decode(trimmed)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TEST_PRIVATE_KEY: &str =
        "97abcd30d2cac1c96271711e567ee13ec27ce4360def5f58caea31eb7c926062";
    const TEST_PUBLIC_KEY: &str =
        "03f03225c0efa4da141b7ed4b1d2368732719c9430bd329ed8a757fa0022833d3f";

    #[test]
    fn test_parse_hex_key_trims() {
        let bytes = parse_hex_key(&format!("  0x{TEST_PRIVATE_KEY}\n")).unwrap();
        assert_eq!(hex::encode(&*bytes), TEST_PRIVATE_KEY);
    }

    #[test]
    fn test_load_from_env_var() {
        let var_name = "FUJI_TEST_KEY_LOAD_FROM_ENV";
        std::env::set_var(var_name, TEST_PRIVATE_KEY);

        let manager = KeyManager::load(&KeySource::EnvVar {
            var_name: var_name.to_string(),
        })
        .unwrap();
        assert_eq!(manager.public_key_hex(), TEST_PUBLIC_KEY);

        std::env::remove_var(var_name);
    }

    #[test]
    fn test_missing_env_var() {
        let result = KeyManager::load(&KeySource::EnvVar {
            var_name: "FUJI_TEST_KEY_DEFINITELY_UNSET".to_string(),
        });
        assert!(matches!(result, Err(KeyError::EnvVarNotFound(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0x{TEST_PRIVATE_KEY}").unwrap();

        let manager = KeyManager::load(&KeySource::File {
            path: file.path().to_path_buf(),
        })
        .unwrap();
        assert_eq!(hex::encode(manager.signer().public_key()), TEST_PUBLIC_KEY);
    }

    #[test]
    fn test_invalid_key_material() {
        assert!(matches!(
            KeyManager::from_bytes(&[0u8; 32]),
            Err(KeyError::InvalidKey(_))
        ));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not-hex").unwrap();
        let result = KeyManager::load(&KeySource::File {
            path: file.path().to_path_buf(),
        });
        assert!(matches!(result, Err(KeyError::HexDecode(_))));
    }
}

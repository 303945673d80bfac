//! HTTP response bodies.

use fuji_attest::Attestation;
use serde::{Deserialize, Serialize};

/// `GET /oracle` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleInfo {
    pub public_key: String,
    pub available_tickers: Vec<String>,
}

/// `GET /oracle/{ticker}` body.
///
/// Numbers are rendered as decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleAttestation {
    pub timestamp: String,
    pub last_price: String,
    pub attestation: AttestationProof,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestationProof {
    pub signature: String,
    pub message: String,
    pub message_hash: String,
}

impl From<&Attestation> for OracleAttestation {
    fn from(att: &Attestation) -> Self {
        Self {
            timestamp: att.timestamp.to_string(),
            last_price: att.price.to_string(),
            attestation: AttestationProof {
                signature: att.signature_hex(),
                message: att.message_hex(),
                message_hash: att.message_hash_hex(),
            },
        }
    }
}

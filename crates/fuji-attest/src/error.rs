//! Attestation error types.

use thiserror::Error;

use crate::encoding::EncodingError;

#[derive(Debug, Error)]
pub enum AttestError {
    #[error("Encoding failed: {0}")]
    Encoding(#[from] EncodingError),

    #[error("Signing failed at {stage}: {reason}")]
    Signing { stage: &'static str, reason: String },
}

pub type AttestResult<T> = Result<T, AttestError>;

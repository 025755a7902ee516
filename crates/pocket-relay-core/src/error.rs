//! Error types for the relay core.

use thiserror::Error;

/// Errors that can occur while encoding, hashing, or signing relay records.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A record could not be serialized into its canonical form.
    #[error("encoding error: {0}")]
    EncodingError(String),

    /// The key provider failed to produce a signature.
    #[error("signing error: {0}")]
    SigningError(String),

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid blockchain id: {0:?}")]
    InvalidBlockchain(String),

    #[error("decoding error: {0}")]
    DecodingError(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::EncodingError(e.to_string())
    }
}

impl From<hex::FromHexError> for CoreError {
    fn from(e: hex::FromHexError) -> Self {
        CoreError::DecodingError(e.to_string())
    }
}

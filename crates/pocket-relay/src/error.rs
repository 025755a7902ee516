//! Error types for relay submission.

use pocket_relay_core::{Address, CoreError};
use thiserror::Error;

/// Errors that can occur during a relay attempt.
#[derive(Debug, Error)]
pub enum RelayError {
    /// A record could not be canonically encoded.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// A key failed to sign. The key itself is suspect.
    #[error("signing error: {0}")]
    Signing(String),

    /// No service node is registered for the requesting address.
    #[error("no service node found for address {address}")]
    NodeNotFound { address: Address },

    /// Network or connection failure, or an unparseable response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The session height was stale. The session has been corrected and the
    /// relay can be resent.
    #[error("session height corrected to {new_height}: {message}")]
    RejectedWithCorrection { new_height: i64, message: String },

    /// The node rejected the relay for another reason.
    #[error("relay rejected: {message}")]
    RejectedOther { message: String },

    /// The node answered with a status outside the modeled classes.
    #[error("unexpected response status {status}: {body}")]
    UnexpectedResponse { status: u16, body: String },

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl RelayError {
    /// Whether the caller can reasonably try the relay again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RelayError::NodeNotFound { .. }
                | RelayError::Transport(_)
                | RelayError::RejectedWithCorrection { .. }
        )
    }
}

impl From<CoreError> for RelayError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::EncodingError(msg) | CoreError::DecodingError(msg) => {
                RelayError::Encoding(msg)
            }
            CoreError::InvalidBlockchain(code) => {
                RelayError::Encoding(format!("invalid blockchain id: {code:?}"))
            }
            CoreError::SigningError(msg) => RelayError::Signing(msg),
            key_error @ (CoreError::InvalidPublicKey | CoreError::InvalidSignature) => {
                RelayError::Signing(key_error.to_string())
            }
        }
    }
}

impl From<reqwest::Error> for RelayError {
    fn from(e: reqwest::Error) -> Self {
        RelayError::Transport(e.to_string())
    }
}

/// Result type for relay operations.
pub type Result<T> = std::result::Result<T, RelayError>;

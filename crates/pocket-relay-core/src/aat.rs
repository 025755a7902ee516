//! Application Authentication Tokens.
//!
//! An AAT delegates relay authority from an application key to a client key.
//! The application signs the digest of the token's transport form with an
//! empty `signature` field; that same digest is the `token` a proof commits
//! to.

use serde::{Deserialize, Serialize};

use crate::canonical::aat_token_bytes;
use crate::crypto::{PublicKey, RelayKey, Sha3Hash, Signature};
use crate::error::Result;

/// The current AAT version.
pub const AAT_VERSION: &str = "0.0.1";

/// A signed Application Authentication Token.
///
/// Field order is the transport order and must not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aat {
    pub version: String,
    pub app_pub_key: String,
    pub client_pub_key: String,
    /// Lowercase hex Ed25519 signature by the application key.
    pub signature: String,
}

impl Aat {
    /// Digest of the unsigned transport form.
    pub fn token(&self) -> Result<Sha3Hash> {
        Ok(Sha3Hash::hash(&aat_token_bytes(self)?))
    }

    /// Verify the application signature.
    pub fn verify(&self) -> Result<()> {
        let app_key = PublicKey::from_hex(&self.app_pub_key)?;
        let signature = Signature::from_hex(&self.signature)?;
        app_key.verify(&self.token()?, &signature)
    }
}

/// Builder for signed AATs.
pub struct AatBuilder {
    client_pub_key: String,
    version: String,
}

impl AatBuilder {
    /// Start building a token delegating to `client_pub_key`.
    pub fn new(client_pub_key: &PublicKey) -> Self {
        Self {
            client_pub_key: client_pub_key.to_hex(),
            version: AAT_VERSION.to_string(),
        }
    }

    /// Set the version.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Sign with the application key.
    pub fn sign<K: RelayKey + ?Sized>(self, app_key: &K) -> Result<Aat> {
        let mut aat = Aat {
            version: self.version,
            app_pub_key: app_key.public_key().to_hex(),
            client_pub_key: self.client_pub_key,
            signature: String::new(),
        };
        let signature = app_key.sign(&aat.token()?)?;
        aat.signature = signature.to_hex();
        Ok(aat)
    }
}

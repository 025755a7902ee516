//! Relay request records: the opaque payload, its metadata, and the full
//! relay body submitted to a serving node.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::canonical::request_bytes;
use crate::crypto::Sha3Hash;
use crate::error::Result;
use crate::proof::RelayProof;

/// Default HTTP method carried in the payload.
pub const DEFAULT_METHOD: &str = "POST";

/// Default HTTP path carried in the payload.
pub const DEFAULT_PATH: &str = "";

const ETH_BLOCK_NUMBER: &str =
    r#"{"jsonrpc":"2.0", "method":"eth_blockNumber", "params":[], "id":1}"#;
const HMY_BLOCK_NUMBER: &str =
    r#"{"jsonrpc":"2.0", "method":"hmyv2_blockNumber", "params":[], "id":1}"#;

/// The request to execute on the target chain.
///
/// `data` is carried verbatim. Headers are kept sorted so they always encode
/// the same way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayPayload {
    pub data: String,
    pub method: String,
    pub path: String,
    pub headers: BTreeMap<String, String>,
}

impl RelayPayload {
    /// A payload with the default method and path and no headers.
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            method: DEFAULT_METHOD.to_string(),
            path: DEFAULT_PATH.to_string(),
            headers: BTreeMap::new(),
        }
    }

    /// Override the method.
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Override the path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Add a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// `eth_blockNumber` JSON-RPC call.
    pub fn eth_block_number() -> Self {
        Self::new(ETH_BLOCK_NUMBER)
    }

    /// `hmyv2_blockNumber` JSON-RPC call.
    pub fn hmy_block_number() -> Self {
        Self::new(HMY_BLOCK_NUMBER)
    }
}

/// Binds a payload to a session height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayMetadata {
    pub block_height: i64,
}

impl RelayMetadata {
    pub fn new(block_height: i64) -> Self {
        Self { block_height }
    }
}

/// Digest of the transport encoding of `{payload, meta}`.
pub fn request_hash(payload: &RelayPayload, meta: &RelayMetadata) -> Result<Sha3Hash> {
    Ok(Sha3Hash::hash(&request_bytes(payload, meta)?))
}

/// A fully composed relay, ready for submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relay {
    pub payload: RelayPayload,
    pub meta: RelayMetadata,
    pub proof: RelayProof,
}

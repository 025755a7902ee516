//! Transport abstraction for relay submission and node lookup.
//!
//! The transport delivers composed relays to a serving node and reports the
//! raw outcome. Interpreting that outcome belongs to the
//! [`Relayer`](crate::Relayer). Implementations may use HTTP or anything else.

use async_trait::async_trait;
use pocket_relay_core::{Address, Relay};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::Result;

/// A node able to serve relays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceNode {
    /// Lowercase hex Ed25519 public key.
    pub public_key: String,
}

/// Coarse classification of a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    ClientError,
    Other,
}

/// What a serving node answered to a relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayResponse {
    pub status: u16,
    pub body: String,
    /// Error message reported by the node, if any.
    pub error_message: Option<String>,
    /// Session height reported by the node when it rejects a stale relay.
    pub corrected_height: Option<i64>,
}

impl RelayResponse {
    /// A 200 response carrying `body`.
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            error_message: None,
            corrected_height: None,
        }
    }

    /// A 400 response with an error message and optional corrected height.
    pub fn bad_request(message: impl Into<String>, corrected_height: Option<i64>) -> Self {
        let message = message.into();
        Self {
            status: 400,
            body: message.clone(),
            error_message: Some(message),
            corrected_height,
        }
    }

    pub fn status_class(&self) -> StatusClass {
        match self.status {
            200..=299 => StatusClass::Success,
            400..=499 => StatusClass::ClientError,
            _ => StatusClass::Other,
        }
    }
}

/// Delivers relays to the network.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Submit a composed relay.
    ///
    /// Returns `Err` only when no usable response was obtained.
    async fn submit_relay(&self, relay: &Relay) -> Result<RelayResponse>;

    /// Query the network's current block height.
    async fn query_height(&self) -> Result<i64>;
}

/// Resolves the service node for a client address.
#[async_trait]
pub trait NodeDirectory: Send + Sync {
    /// Look up the node registered for `address`; `None` if there is none.
    async fn lookup_service_node(&self, address: &Address) -> Result<Option<ServiceNode>>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn submit_relay(&self, relay: &Relay) -> Result<RelayResponse> {
        (**self).submit_relay(relay).await
    }

    async fn query_height(&self) -> Result<i64> {
        (**self).query_height().await
    }
}

#[async_trait]
impl<D: NodeDirectory + ?Sized> NodeDirectory for Arc<D> {
    async fn lookup_service_node(&self, address: &Address) -> Result<Option<ServiceNode>> {
        (**self).lookup_service_node(address).await
    }
}

/// An in-memory node for tests and dry runs.
///
/// Scripted responses are returned first, in order. Once the script is
/// exhausted the transport behaves like a serving node: it verifies the
/// proof, checks the request hash, and rejects relays stamped with a stale
/// session height, reporting the current one.
pub mod memory {
    use super::*;
    use parking_lot::Mutex;
    use pocket_relay_core::request_hash;
    use std::collections::{HashMap, VecDeque};

    use crate::error::RelayError;

    /// Body returned for relays the simulated node accepts.
    pub const DEFAULT_RESPONSE_BODY: &str = r#"{"jsonrpc":"2.0","id":1,"result":"0x0"}"#;

    #[derive(Debug)]
    enum Scripted {
        Response(RelayResponse),
        Failure(String),
    }

    #[derive(Debug)]
    struct NodeState {
        session_height: i64,
        block_height: i64,
        nodes: HashMap<Address, ServiceNode>,
        script: VecDeque<Scripted>,
        submitted: Vec<Relay>,
        lookups: usize,
    }

    /// In-memory transport and node directory.
    #[derive(Debug)]
    pub struct MemoryTransport {
        state: Mutex<NodeState>,
    }

    impl MemoryTransport {
        /// A node currently at `session_height`.
        pub fn new(session_height: i64) -> Self {
            Self {
                state: Mutex::new(NodeState {
                    session_height,
                    block_height: session_height,
                    nodes: HashMap::new(),
                    script: VecDeque::new(),
                    submitted: Vec::new(),
                    lookups: 0,
                }),
            }
        }

        /// Register the node serving `address`.
        pub fn register_node(&self, address: Address, node: ServiceNode) {
            self.state.lock().nodes.insert(address, node);
        }

        /// Move the network to a new session height.
        pub fn set_session_height(&self, height: i64) {
            self.state.lock().session_height = height;
        }

        /// Set the height reported by `query_height`.
        pub fn set_block_height(&self, height: i64) {
            self.state.lock().block_height = height;
        }

        /// Queue a response for the next submission.
        pub fn push_response(&self, response: RelayResponse) {
            self.state.lock().script.push_back(Scripted::Response(response));
        }

        /// Make the next submission fail at the transport level.
        pub fn push_failure(&self, message: impl Into<String>) {
            self.state
                .lock()
                .script
                .push_back(Scripted::Failure(message.into()));
        }

        /// Every relay submitted so far.
        pub fn submitted(&self) -> Vec<Relay> {
            self.state.lock().submitted.clone()
        }

        /// Number of node lookups performed.
        pub fn lookup_count(&self) -> usize {
            self.state.lock().lookups
        }

        fn judge(relay: &Relay, session_height: i64) -> RelayResponse {
            let proof = &relay.proof;
            if proof.verify().is_err() {
                return RelayResponse::bad_request("invalid relay proof signature", None);
            }
            match request_hash(&relay.payload, &relay.meta) {
                Ok(hash) if hash.to_hex() == proof.request_hash => {}
                _ => return RelayResponse::bad_request("request hash mismatch", None),
            }
            if proof.session_block_height != session_height
                || relay.meta.block_height != session_height
            {
                return RelayResponse::bad_request(
                    "the block height passed is invalid for the session",
                    Some(session_height),
                );
            }
            RelayResponse::ok(DEFAULT_RESPONSE_BODY)
        }
    }

    impl Default for MemoryTransport {
        fn default() -> Self {
            Self::new(0)
        }
    }

    #[async_trait]
    impl Transport for MemoryTransport {
        async fn submit_relay(&self, relay: &Relay) -> Result<RelayResponse> {
            let mut state = self.state.lock();
            state.submitted.push(relay.clone());
            match state.script.pop_front() {
                Some(Scripted::Response(response)) => Ok(response),
                Some(Scripted::Failure(message)) => Err(RelayError::Transport(message)),
                None => Ok(Self::judge(relay, state.session_height)),
            }
        }

        async fn query_height(&self) -> Result<i64> {
            Ok(self.state.lock().block_height)
        }
    }

    #[async_trait]
    impl NodeDirectory for MemoryTransport {
        async fn lookup_service_node(&self, address: &Address) -> Result<Option<ServiceNode>> {
            let mut state = self.state.lock();
            state.lookups += 1;
            Ok(state.nodes.get(address).cloned())
        }
    }
}

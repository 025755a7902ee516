//! The Relayer: composes, signs, submits and interprets one relay.
//!
//! ```text
//! Building ──► Signed ──► Submitted ──┬─► Accepted              Ok(body)
//!                                     ├─► RejectedWithCorrection session corrected, caller retries
//!                                     ├─► RejectedOther
//!                                     └─► TransportFailed
//! ```
//!
//! The Relayer never retries on its own; retry policy belongs to the caller.

use std::sync::Arc;

use pocket_relay_core::{
    request_hash, AatBuilder, BlockchainId, ProofBuilder, Relay, RelayKey, RelayMetadata,
    RelayPayload,
};
use tracing::{debug, warn};

use crate::config::RelayConfig;
use crate::error::{RelayError, Result};
use crate::keys::KeyRing;
use crate::session::SessionState;
use crate::transport::{NodeDirectory, RelayResponse, ServiceNode, StatusClass, Transport};

/// Relay client bound to one servicer key and one session.
pub struct Relayer<K, T, D> {
    keys: KeyRing<K>,
    session: Arc<SessionState>,
    transport: T,
    directory: D,
    config: RelayConfig,
}

impl<K, T, D> Relayer<K, T, D>
where
    K: RelayKey,
    T: Transport,
    D: NodeDirectory,
{
    pub fn new(
        keys: KeyRing<K>,
        session: Arc<SessionState>,
        transport: T,
        directory: D,
        config: RelayConfig,
    ) -> Self {
        Self {
            keys,
            session,
            transport,
            directory,
            config,
        }
    }

    pub fn session(&self) -> &Arc<SessionState> {
        &self.session
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub fn keys(&self) -> &KeyRing<K> {
        &self.keys
    }

    /// Relay `data` to `blockchain` and return the node's response body.
    pub async fn relay(&self, blockchain: BlockchainId, data: impl Into<String>) -> Result<String> {
        let payload = RelayPayload::new(data)
            .with_method(self.config.request_method.clone())
            .with_path(self.config.request_path.clone());
        self.relay_payload(blockchain, payload).await
    }

    /// `eth_blockNumber` on Ethereum mainnet.
    pub async fn relay_eth(&self) -> Result<String> {
        self.relay(BlockchainId::ETHEREUM, RelayPayload::eth_block_number().data)
            .await
    }

    /// `hmyv2_blockNumber` on Harmony shard 0.
    pub async fn relay_hmy(&self) -> Result<String> {
        self.relay(BlockchainId::HARMONY, RelayPayload::hmy_block_number().data)
            .await
    }

    /// Relay a fully specified payload.
    pub async fn relay_payload(
        &self,
        blockchain: BlockchainId,
        payload: RelayPayload,
    ) -> Result<String> {
        let node = self.service_node().await?;
        let relay = self.build_relay(blockchain, payload, &node)?;
        self.submit(&relay).await
    }

    /// Query the network's current block height. The session is untouched.
    pub async fn query_height(&self) -> Result<i64> {
        self.transport.query_height().await
    }

    /// Resolve the service node for the servicer key.
    pub async fn service_node(&self) -> Result<ServiceNode> {
        let address = self.keys.servicer_key().public_key().address();
        match self.directory.lookup_service_node(&address).await? {
            Some(node) => Ok(node),
            None => {
                warn!(%address, "no service node for servicer key");
                Err(RelayError::NodeNotFound { address })
            }
        }
    }

    /// Build and sign a relay stamped with the current session height.
    pub fn build_relay(
        &self,
        blockchain: BlockchainId,
        payload: RelayPayload,
        node: &ServiceNode,
    ) -> Result<Relay> {
        let height = self.session.current();
        debug!(%blockchain, height, "building relay");

        let meta = RelayMetadata::new(height);
        let hash = request_hash(&payload, &meta)?;

        let servicer_key = self.keys.servicer_key();
        let aat = AatBuilder::new(&servicer_key.public_key())
            .version(self.config.aat_version.clone())
            .sign(self.keys.app_key())?;

        let proof = ProofBuilder::new(node.public_key.clone(), blockchain, hash, height)
            .sign(servicer_key, aat)?;
        debug!(%blockchain, height, entropy = proof.entropy, request_hash = %proof.request_hash, "relay signed");

        Ok(Relay {
            payload,
            meta,
            proof,
        })
    }

    /// Submit a signed relay and interpret the node's answer.
    pub async fn submit(&self, relay: &Relay) -> Result<String> {
        debug!(blockchain = %relay.proof.blockchain, "submitting relay");
        let response = match self.transport.submit_relay(relay).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "relay transport failed");
                return Err(e);
            }
        };
        self.interpret(response)
    }

    fn interpret(&self, response: RelayResponse) -> Result<String> {
        match response.status_class() {
            StatusClass::Success => {
                debug!(status = response.status, "relay accepted");
                Ok(response.body)
            }
            StatusClass::ClientError => {
                let message = response.error_message.unwrap_or(response.body);
                match response.corrected_height {
                    Some(new_height) => {
                        self.session.correct(new_height);
                        warn!(new_height, %message, "relay rejected for stale session, retry required");
                        Err(RelayError::RejectedWithCorrection {
                            new_height,
                            message,
                        })
                    }
                    None => {
                        warn!(status = response.status, %message, "relay rejected");
                        Err(RelayError::RejectedOther { message })
                    }
                }
            }
            StatusClass::Other => {
                warn!(status = response.status, "unexpected relay response");
                Err(RelayError::UnexpectedResponse {
                    status: response.status,
                    body: response.body,
                })
            }
        }
    }
}

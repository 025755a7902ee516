//! # Pocket Relay
//!
//! Client-side relay submission for the Pocket network: every relay carries
//! an Application Authentication Token and a signed proof that the serving
//! node verifies before executing the payload.
//!
//! ## Overview
//!
//! - **Relayer**: builds, signs, and submits one relay, then interprets the outcome
//! - **Session**: the shared session height, corrected from stale-session rejections
//! - **Transport**: how relays reach a node (HTTP, or in-memory for tests)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pocket_relay::{HttpTransport, KeyRing, RelayConfig, RelayError, Relayer, SessionState};
//! use pocket_relay::core::{BlockchainId, Keypair};
//!
//! async fn example(app: Keypair, servicer: Keypair) -> pocket_relay::Result<()> {
//!     let config = RelayConfig::from_env()?;
//!     let transport = Arc::new(HttpTransport::new(&config)?);
//!     let keys = KeyRing::new(vec![app], servicer)?;
//!     let relayer = Relayer::new(
//!         keys,
//!         Arc::new(SessionState::new()),
//!         Arc::clone(&transport),
//!         transport,
//!         config,
//!     );
//!
//!     let data = r#"{"jsonrpc":"2.0","method":"eth_blockNumber","params":[],"id":1}"#;
//!     match relayer.relay(BlockchainId::ETHEREUM, data).await {
//!         Ok(body) => println!("{body}"),
//!         // The session was corrected; sending again uses the new height.
//!         Err(RelayError::RejectedWithCorrection { .. }) => {
//!             relayer.relay(BlockchainId::ETHEREUM, data).await?;
//!         }
//!         Err(e) => return Err(e),
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod keys;
pub mod relayer;
pub mod session;
pub mod transport;

pub use pocket_relay_core as core;

pub use config::RelayConfig;
pub use error::{RelayError, Result};
pub use http::HttpTransport;
pub use keys::KeyRing;
pub use relayer::Relayer;
pub use session::SessionState;
pub use transport::{
    memory::MemoryTransport, NodeDirectory, RelayResponse, ServiceNode, StatusClass, Transport,
};

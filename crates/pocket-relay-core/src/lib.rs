//! # Pocket Relay Core
//!
//! Pure primitives for signed relays: canonical encoding, digests and
//! signatures, Application Authentication Tokens, and relay proofs.
//!
//! This crate contains no I/O, no storage, no networking.
//!
//! ## Key Types
//!
//! - [`Aat`] - Delegation from an application key to a client key
//! - [`RelayProof`] - The client's signed authorization for one relay
//! - [`RelayPayload`] / [`RelayMetadata`] - The request and its session height
//! - [`BlockchainId`] - Four-hex-digit target chain code
//! - [`RelayKey`] - Anything that can sign a digest
//!
//! ## Canonicalization
//!
//! Digests are SHA3-256 over Go-compatible compact JSON. A proof is signed
//! over a fixed-order record distinct from its transmitted form. See the
//! [`canonical`] module.

pub mod aat;
pub mod canonical;
pub mod crypto;
pub mod error;
pub mod payload;
pub mod proof;
pub mod types;

pub use aat::{Aat, AatBuilder, AAT_VERSION};
pub use canonical::{to_proof_signing_bytes, to_transport_bytes, ProofSigningForm};
pub use crypto::{Address, Keypair, PublicKey, RelayKey, Sha3Hash, Signature};
pub use error::{CoreError, Result};
pub use payload::{request_hash, Relay, RelayMetadata, RelayPayload};
pub use proof::{ProofBuilder, RelayProof};
pub use types::BlockchainId;

//! # Pocket Relay Testkit
//!
//! Testing utilities for signed relays.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known relays with expected bytes, digests and signatures
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Keys, an in-memory network, and a wired relayer
//!
//! ## Golden Vectors
//!
//! ```rust
//! use pocket_relay_testkit::vectors::{all_vectors, generate_relay_from_vector};
//!
//! for vector in all_vectors() {
//!     let relay = generate_relay_from_vector(&vector);
//!     assert_eq!(relay.proof.signature, vector.expected_proof_signature);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use pocket_relay_testkit::generators::{relay_from_params, RelayParams};
//!
//! proptest! {
//!     #[test]
//!     fn proofs_verify(params: RelayParams) {
//!         prop_assert!(relay_from_params(&params).proof.verify().is_ok());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use pocket_relay_testkit::fixtures::TestFixture;
//! use pocket_relay::core::BlockchainId;
//!
//! let fixture = TestFixture::with_seed(1);
//! let relay = fixture.make_relay(BlockchainId::ETHEREUM, "{}", 5);
//! assert!(relay.proof.verify().is_ok());
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{
    init_tracing, multi_party_fixtures, MemoryRelayer, TestFixture, MAX_PARTIES,
};
pub use generators::{relay_from_params, RelayParams};
pub use vectors::{all_vectors, generate_relay_from_vector, verify_all_vectors, GoldenVector};

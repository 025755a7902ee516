//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use pocket_relay::{KeyRing, MemoryTransport, RelayConfig, Relayer, ServiceNode, SessionState};
use pocket_relay_core::{
    request_hash, Aat, AatBuilder, BlockchainId, Keypair, ProofBuilder, PublicKey, Relay,
    RelayMetadata, RelayPayload,
};

/// Relayer wired to an in-memory node.
pub type MemoryRelayer = Relayer<Keypair, Arc<MemoryTransport>, Arc<MemoryTransport>>;

/// A test fixture: application, servicer and node keys plus an in-memory
/// network with the servicer's node registered.
pub struct TestFixture {
    pub app: Keypair,
    pub servicer: Keypair,
    pub node: Keypair,
    pub transport: Arc<MemoryTransport>,
    pub session: Arc<SessionState>,
}

impl TestFixture {
    /// Create a new test fixture with random keys, network at height 0.
    pub fn new() -> Self {
        Self::assemble(Keypair::generate(), Keypair::generate(), Keypair::generate(), 0)
    }

    /// Create with deterministic keys derived from `seed`.
    pub fn with_seed(seed: u8) -> Self {
        Self::assemble(
            Keypair::from_seed(&[seed; 32]),
            Keypair::from_seed(&[seed.wrapping_add(1); 32]),
            Keypair::from_seed(&[seed.wrapping_add(2); 32]),
            0,
        )
    }

    /// Move the simulated network to `height`. The client session is untouched.
    pub fn at_network_height(self, height: i64) -> Self {
        self.transport.set_session_height(height);
        self.transport.set_block_height(height);
        self
    }

    fn assemble(app: Keypair, servicer: Keypair, node: Keypair, height: i64) -> Self {
        let transport = Arc::new(MemoryTransport::new(height));
        transport.register_node(
            servicer.address(),
            ServiceNode {
                public_key: node.public_key().to_hex(),
            },
        );
        Self {
            app,
            servicer,
            node,
            transport,
            session: Arc::new(SessionState::new()),
        }
    }

    pub fn node_public_key(&self) -> PublicKey {
        self.node.public_key()
    }

    /// A relayer sharing this fixture's session and network.
    pub fn relayer(&self) -> MemoryRelayer {
        self.relayer_with_config(RelayConfig::default())
    }

    pub fn relayer_with_config(&self, config: RelayConfig) -> MemoryRelayer {
        let keys = KeyRing::new(vec![self.app.clone()], self.servicer.clone())
            .expect("fixture has an application key");
        Relayer::new(
            keys,
            Arc::clone(&self.session),
            Arc::clone(&self.transport),
            Arc::clone(&self.transport),
            config,
        )
    }

    /// An AAT delegating from the application key to the servicer key.
    pub fn make_aat(&self) -> Aat {
        AatBuilder::new(&self.servicer.public_key())
            .sign(&self.app)
            .expect("in-process keys sign")
    }

    /// A signed relay for `data` at `height`, addressed to the fixture's node.
    pub fn make_relay(&self, blockchain: BlockchainId, data: &str, height: i64) -> Relay {
        let payload = RelayPayload::new(data);
        let meta = RelayMetadata::new(height);
        let hash = request_hash(&payload, &meta).expect("payload encodes");
        let proof = ProofBuilder::new(self.node.public_key().to_hex(), blockchain, hash, height)
            .sign(&self.servicer, self.make_aat())
            .expect("in-process keys sign");
        Relay {
            payload,
            meta,
            proof,
        }
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create multiple test fixtures for multi-party tests.
///
/// Each fixture has its own network; seeds never overlap between fixtures.
///
/// # Panics
///
/// Panics if `count` exceeds [`MAX_PARTIES`].
pub fn multi_party_fixtures(count: usize) -> Vec<TestFixture> {
    assert!(count <= MAX_PARTIES, "at most {MAX_PARTIES} parties, got {count}");
    (0..count)
        .map(|i| {
            let seed = u8::try_from(i * 3).expect("bounded by MAX_PARTIES");
            TestFixture::with_seed(seed)
        })
        .collect()
}

/// Fixtures use three consecutive seed bytes each.
pub const MAX_PARTIES: usize = 85;

/// Install a test-friendly tracing subscriber honouring `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

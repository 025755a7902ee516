//! End-to-end relay flows against an in-memory verifying node.

use std::sync::Arc;

use pocket_relay::core::{BlockchainId, Keypair};
use pocket_relay::{
    KeyRing, MemoryTransport, RelayConfig, RelayError, RelayResponse, Relayer, SessionState,
};
use pocket_relay_testkit::{init_tracing, TestFixture};

#[tokio::test]
async fn stale_session_is_corrected_then_retried_by_caller() {
    init_tracing();
    let fixture = TestFixture::with_seed(0x01).at_network_height(9);
    fixture.session.correct(5);
    let relayer = fixture.relayer();

    let err = relayer.relay_eth().await.unwrap_err();
    match &err {
        RelayError::RejectedWithCorrection { new_height, message } => {
            assert_eq!(*new_height, 9);
            assert!(!message.is_empty());
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.is_retryable());
    assert_eq!(fixture.session.current(), 9);

    let body = relayer.relay_eth().await.unwrap();
    assert!(!body.is_empty());

    let submitted = fixture.transport.submitted();
    assert_eq!(submitted.len(), 2);
    assert_eq!(submitted[0].proof.session_block_height, 5);
    assert_eq!(submitted[1].proof.session_block_height, 9);
    assert_eq!(submitted[1].meta.block_height, 9);
    assert_ne!(submitted[0].proof.request_hash, submitted[1].proof.request_hash);
}

#[tokio::test]
async fn unknown_session_starts_at_zero() {
    let fixture = TestFixture::with_seed(0x10).at_network_height(42);
    let relayer = fixture.relayer();

    assert!(matches!(
        relayer.relay_hmy().await,
        Err(RelayError::RejectedWithCorrection { new_height: 42, .. })
    ));
    assert_eq!(fixture.transport.submitted()[0].proof.session_block_height, 0);
    assert_eq!(
        fixture.transport.submitted()[0].proof.blockchain,
        BlockchainId::HARMONY
    );
}

#[tokio::test]
async fn missing_service_node_fails_before_submission() {
    let transport = Arc::new(MemoryTransport::new(5));
    let servicer = Keypair::from_seed(&[0x22; 32]);
    let keys = KeyRing::new(vec![Keypair::from_seed(&[0x21; 32])], servicer.clone()).unwrap();
    let relayer = Relayer::new(
        keys,
        Arc::new(SessionState::new()),
        Arc::clone(&transport),
        Arc::clone(&transport),
        RelayConfig::default(),
    );

    let err = relayer.relay_eth().await.unwrap_err();
    assert!(matches!(err, RelayError::NodeNotFound { address } if address == servicer.address()));
    assert!(transport.submitted().is_empty());
}

#[tokio::test]
async fn consecutive_relays_draw_fresh_entropy() {
    let fixture = TestFixture::with_seed(0x30);
    let relayer = fixture.relayer();

    relayer.relay_eth().await.unwrap();
    relayer.relay_eth().await.unwrap();

    let submitted = fixture.transport.submitted();
    assert_eq!(submitted[0].proof.request_hash, submitted[1].proof.request_hash);
    assert_ne!(submitted[0].proof.entropy, submitted[1].proof.entropy);
    assert_ne!(submitted[0].proof.signature, submitted[1].proof.signature);
    assert!(submitted.iter().all(|r| r.proof.entropy >= 0));
}

#[tokio::test]
async fn relayers_sharing_a_session_see_one_correction() {
    let fixture = TestFixture::with_seed(0x40).at_network_height(7);
    let first = Arc::new(fixture.relayer());
    let second = Arc::new(fixture.relayer());

    let tasks: Vec<_> = [first.clone(), second.clone(), first, second]
        .into_iter()
        .map(|relayer| tokio::spawn(async move { relayer.relay_eth().await }))
        .collect();

    for task in tasks {
        match task.await.unwrap() {
            Ok(_) | Err(RelayError::RejectedWithCorrection { new_height: 7, .. }) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(fixture.session.current(), 7);
    for relay in fixture.transport.submitted() {
        assert!(relay.proof.session_block_height == 0 || relay.proof.session_block_height == 7);
        assert_eq!(relay.proof.session_block_height, relay.meta.block_height);
    }
}

#[tokio::test]
async fn rejection_without_height_is_terminal() {
    let fixture = TestFixture::with_seed(0x50);
    fixture
        .transport
        .push_response(RelayResponse::bad_request("application is jailed", None));
    let relayer = fixture.relayer();

    let err = relayer.relay_eth().await.unwrap_err();
    assert!(matches!(&err, RelayError::RejectedOther { message } if message == "application is jailed"));
    assert!(!err.is_retryable());
    assert_eq!(fixture.session.current(), 0);
}

#[tokio::test]
async fn custom_aat_version_is_signed() {
    let fixture = TestFixture::with_seed(0x60);
    let relayer = fixture.relayer_with_config(RelayConfig {
        aat_version: "0.0.2".into(),
        ..RelayConfig::default()
    });

    relayer.relay(BlockchainId::IPFS, "ls").await.unwrap();
    let relay = &fixture.transport.submitted()[0];
    assert_eq!(relay.proof.aat.version, "0.0.2");
    relay.proof.aat.verify().unwrap();
}

//! Proptest generators for property-based testing.

use std::collections::BTreeMap;

use proptest::prelude::*;

use pocket_relay_core::{
    request_hash, AatBuilder, BlockchainId, Keypair, ProofBuilder, PublicKey, Relay,
    RelayMetadata, RelayPayload,
};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a random public key.
pub fn public_key() -> impl Strategy<Value = PublicKey> {
    keypair().prop_map(|kp| kp.public_key())
}

/// Generate a valid chain code, mixed case included.
pub fn blockchain_id() -> impl Strategy<Value = BlockchainId> {
    "[0-9a-fA-F]{4}".prop_map(|code| {
        BlockchainId::new(&code).expect("pattern only yields hex chain codes")
    })
}

/// Generate a session height, including the unknown height 0.
pub fn height() -> impl Strategy<Value = i64> {
    prop_oneof![Just(0i64), 1i64..=10_000_000i64]
}

/// Generate entropy in the range the signer draws from.
pub fn entropy() -> impl Strategy<Value = i64> {
    0i64..=i64::MAX
}

/// Generate request data, including characters that need escaping.
pub fn payload_data() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(RelayPayload::eth_block_number().data),
        Just(RelayPayload::hmy_block_number().data),
        "[ -~]{0,64}".prop_map(String::from),
        any::<String>(),
    ]
}

/// Generate a header map.
pub fn headers() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map("[A-Za-z-]{1,16}", "[ -~]{0,32}", 0..4)
}

/// Parameters for generating a relay.
#[derive(Debug, Clone)]
pub struct RelayParams {
    pub app: Keypair,
    pub client: Keypair,
    pub servicer_pub_key: String,
    pub blockchain: BlockchainId,
    pub height: i64,
    pub entropy: i64,
    pub payload: RelayPayload,
}

impl Arbitrary for RelayParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            keypair(),
            keypair(),
            public_key(),
            blockchain_id(),
            height(),
            entropy(),
            payload_data(),
            headers(),
        )
            .prop_map(
                |(app, client, servicer, blockchain, height, entropy, data, headers)| {
                    RelayParams {
                        app,
                        client,
                        servicer_pub_key: servicer.to_hex(),
                        blockchain,
                        height,
                        entropy,
                        payload: RelayPayload {
                            headers,
                            ..RelayPayload::new(data)
                        },
                    }
                },
            )
            .boxed()
    }
}

/// Generate a relay from parameters.
pub fn relay_from_params(params: &RelayParams) -> Relay {
    let meta = RelayMetadata::new(params.height);
    let hash = request_hash(&params.payload, &meta).expect("payload encodes");
    let aat = AatBuilder::new(&params.client.public_key())
        .sign(&params.app)
        .expect("in-process keys sign");
    let proof = ProofBuilder::new(
        params.servicer_pub_key.clone(),
        params.blockchain,
        hash,
        params.height,
    )
    .entropy(params.entropy)
    .sign(&params.client, aat)
    .expect("in-process keys sign");

    Relay {
        payload: params.payload.clone(),
        meta,
        proof,
    }
}

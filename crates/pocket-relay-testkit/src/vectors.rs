//! Golden test vectors for cross-implementation verification.
//!
//! Every value below was produced independently of this workspace (SHA3-256
//! and RFC 8032 Ed25519 over the same JSON records), so a match means the
//! encodings are bit-exact rather than merely self-consistent.

use std::collections::BTreeMap;

use pocket_relay_core::{
    request_hash, AatBuilder, BlockchainId, Keypair, ProofBuilder, Relay, RelayMetadata,
    RelayPayload,
};

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Seed byte for the application key (repeated 32 times).
    pub app_seed: u8,
    /// Seed byte for the client (servicer) key.
    pub client_seed: u8,
    /// Servicer public key as carried in the proof.
    pub servicer_pub_key: &'static str,
    pub blockchain: &'static str,
    pub session_height: i64,
    pub entropy: i64,
    pub data: &'static str,
    pub headers: &'static [(&'static str, &'static str)],

    /// Expected transport bytes of `{payload, meta}`.
    pub expected_request_bytes: &'static str,
    pub expected_app_pub_key: &'static str,
    pub expected_client_pub_key: &'static str,
    pub expected_request_hash: &'static str,
    /// Expected AAT digest (the proof `token`).
    pub expected_token: &'static str,
    pub expected_aat_signature: &'static str,
    pub expected_signing_bytes: &'static str,
    pub expected_proof_signature: &'static str,
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "eth_block_number",
            app_seed: 0x01,
            client_seed: 0x02,
            servicer_pub_key: "ed4928c628d1c2c6eae90338905995612959273a5c63f93636c14614ac8737d1",
            blockchain: "0021",
            session_height: 5,
            entropy: 1,
            data: r#"{"jsonrpc":"2.0", "method":"eth_blockNumber", "params":[], "id":1}"#,
            headers: &[],
            expected_request_bytes: r#"{"payload":{"data":"{\"jsonrpc\":\"2.0\", \"method\":\"eth_blockNumber\", \"params\":[], \"id\":1}","method":"POST","path":"","headers":{}},"meta":{"block_height":5}}"#,
            expected_app_pub_key: "8a88e3dd7409f195fd52db2d3cba5d72ca6709bf1d94121bf3748801b40f6f5c",
            expected_client_pub_key: "8139770ea87d175f56a35466c34c7ecccb8d8a91b4ee37a25df60f5b8fc9b394",
            expected_request_hash: "454341f537fc715516eabc55dd96c70dd567e864c17d6e0da3a6893a313bc53b",
            expected_token: "29df6f52f5551efd6e8158f58e9981b76f990383b66f2cc3d211c284ae241564",
            expected_aat_signature: "29c69ff702fd362f82b38220960fbb110aacffc5299f47533a18fc6ea94789f83fbbf386504a65971b722ff5216909da0bb6cef5953c08ad98240f03bea22505",
            expected_signing_bytes: r#"{"entropy":1,"session_block_height":5,"servicer_pub_key":"ed4928c628d1c2c6eae90338905995612959273a5c63f93636c14614ac8737d1","blockchain":"0021","signature":"","token":"29df6f52f5551efd6e8158f58e9981b76f990383b66f2cc3d211c284ae241564","request_hash":"454341f537fc715516eabc55dd96c70dd567e864c17d6e0da3a6893a313bc53b"}"#,
            expected_proof_signature: "2bbbee79348c76db2b417946cddee4596b892c2ccd1cfa54257ae1163dfb9842fd0880f679b246eebd723a87030e9ccae56de5a57769ce14657aa94a8570e303",
        },
        GoldenVector {
            name: "harmony_unknown_session",
            app_seed: 0x04,
            client_seed: 0x05,
            servicer_pub_key: "8a875fff1eb38451577acd5afee405456568dd7c89e090863a0557bc7af49f17",
            blockchain: "0040",
            session_height: 0,
            entropy: 4294967295,
            data: r#"{"jsonrpc":"2.0", "method":"hmyv2_blockNumber", "params":[], "id":1}"#,
            headers: &[],
            expected_request_bytes: r#"{"payload":{"data":"{\"jsonrpc\":\"2.0\", \"method\":\"hmyv2_blockNumber\", \"params\":[], \"id\":1}","method":"POST","path":"","headers":{}},"meta":{"block_height":0}}"#,
            expected_app_pub_key: "ca93ac1705187071d67b83c7ff0efe8108e8ec4530575d7726879333dbdabe7c",
            expected_client_pub_key: "6e7a1cdd29b0b78fd13af4c5598feff4ef2a97166e3ca6f2e4fbfccd80505bf1",
            expected_request_hash: "0e84bb3c7793e0838326f612587fec4765af5f59b3bb1ad929012590042ee8e1",
            expected_token: "f850714a3bc4adea76b34342087f739490a4b03f397ea6a33d436de9db05771d",
            expected_aat_signature: "43859b342946427c6d59e84996583567dd5b92fc52b9d942362f69f73b762ca9ac8b98a6a5aec7206f0768b993976f81f6edb1a8862547fcbd61ffd9211dde0f",
            expected_signing_bytes: r#"{"entropy":4294967295,"session_block_height":0,"servicer_pub_key":"8a875fff1eb38451577acd5afee405456568dd7c89e090863a0557bc7af49f17","blockchain":"0040","signature":"","token":"f850714a3bc4adea76b34342087f739490a4b03f397ea6a33d436de9db05771d","request_hash":"0e84bb3c7793e0838326f612587fec4765af5f59b3bb1ad929012590042ee8e1"}"#,
            expected_proof_signature: "01d39d776695ae7fbff1851c43cb105f3db5773ef2264a920cc0b766c2fe2d1f4f4e00bca2f0dc51f417a2aa19e8376fa6d1239e8b79a643c0792a2b3b078c04",
        },
        GoldenVector {
            name: "escaped_payload_with_headers",
            app_seed: 0x07,
            client_seed: 0x08,
            servicer_pub_key: "S",
            blockchain: "1111",
            session_height: 97,
            entropy: 9007199254740993,
            data: r#"{"q":"<a&b>"}"#,
            headers: &[("Content-Type", "application/json")],
            expected_request_bytes: r#"{"payload":{"data":"{\"q\":\"\u003ca\u0026b\u003e\"}","method":"POST","path":"","headers":{"Content-Type":"application/json"}},"meta":{"block_height":97}}"#,
            expected_app_pub_key: "ea4a6c63e29c520abef5507b132ec5f9954776aebebe7b92421eea691446d22c",
            expected_client_pub_key: "1398f62c6d1a457c51ba6a4b5f3dbd2f69fca93216218dc8997e416bd17d93ca",
            expected_request_hash: "04580a6b2ded7c44e8fc68787bbe12361c8c4145a52c9d07c7c93d09170e28f2",
            expected_token: "2e6ec061a9c2a0d584eb4ff8b524545fdf5b11bbfca8ee8d3b3f20bc7b0faf55",
            expected_aat_signature: "6248d5e3581dd0ffa50815293da2eddd6df106455e9f4209192db575ed2ecc77109053044c85608009d2f5f55daa4ee180822afc4788d5b426faa7e999605b08",
            expected_signing_bytes: r#"{"entropy":9007199254740993,"session_block_height":97,"servicer_pub_key":"S","blockchain":"1111","signature":"","token":"2e6ec061a9c2a0d584eb4ff8b524545fdf5b11bbfca8ee8d3b3f20bc7b0faf55","request_hash":"04580a6b2ded7c44e8fc68787bbe12361c8c4145a52c9d07c7c93d09170e28f2"}"#,
            expected_proof_signature: "20e3f3a74b619bf249d20664259afc640c50fd8cb74ef1e967014a6e50d279ca71aecfb4e8bc494397f8c6bb22a985ad2c0ee13557003093ab3df6c637f73303",
        },
    ]
}

impl GoldenVector {
    pub fn app_keypair(&self) -> Keypair {
        Keypair::from_seed(&[self.app_seed; 32])
    }

    pub fn client_keypair(&self) -> Keypair {
        Keypair::from_seed(&[self.client_seed; 32])
    }

    pub fn payload(&self) -> RelayPayload {
        RelayPayload {
            headers: self
                .headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
            ..RelayPayload::new(self.data)
        }
    }
}

/// Build the relay a vector describes.
pub fn generate_relay_from_vector(vector: &GoldenVector) -> Relay {
    let app = vector.app_keypair();
    let client = vector.client_keypair();
    let blockchain = BlockchainId::new(vector.blockchain).expect("vector chain code is valid");

    let payload = vector.payload();
    let meta = RelayMetadata::new(vector.session_height);
    let hash = request_hash(&payload, &meta).expect("vector payload encodes");

    let aat = AatBuilder::new(&client.public_key())
        .sign(&app)
        .expect("in-process keys sign");
    let proof = ProofBuilder::new(vector.servicer_pub_key, blockchain, hash, vector.session_height)
        .entropy(vector.entropy)
        .sign(&client, aat)
        .expect("in-process keys sign");

    Relay {
        payload,
        meta,
        proof,
    }
}

/// Check every vector against the expected proof signature.
///
/// Returns `(name, matches, actual_signature_hex)` per vector.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| {
            let relay = generate_relay_from_vector(v);
            let matches = relay.proof.signature == v.expected_proof_signature;
            (v.name.to_string(), matches, relay.proof.signature)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pocket_relay_core::canonical::request_bytes;
    use pocket_relay_core::to_proof_signing_bytes;

    #[test]
    fn test_vectors_match_expected_bytes() {
        for v in all_vectors() {
            let relay = generate_relay_from_vector(&v);

            let req = request_bytes(&relay.payload, &relay.meta).unwrap();
            assert_eq!(
                String::from_utf8(req).unwrap(),
                v.expected_request_bytes,
                "request bytes mismatch for {}",
                v.name
            );

            let form = relay.proof.signing_form().unwrap();
            let signing = to_proof_signing_bytes(&form).unwrap();
            assert_eq!(
                String::from_utf8(signing).unwrap(),
                v.expected_signing_bytes,
                "signing bytes mismatch for {}",
                v.name
            );
        }
    }

    #[test]
    fn test_vectors_match_expected_digests_and_signatures() {
        for v in all_vectors() {
            let relay = generate_relay_from_vector(&v);
            let proof = &relay.proof;

            assert_eq!(proof.aat.app_pub_key, v.expected_app_pub_key, "{}", v.name);
            assert_eq!(proof.aat.client_pub_key, v.expected_client_pub_key, "{}", v.name);
            assert_eq!(proof.request_hash, v.expected_request_hash, "{}", v.name);
            assert_eq!(proof.aat.token().unwrap().to_hex(), v.expected_token, "{}", v.name);
            assert_eq!(proof.aat.signature, v.expected_aat_signature, "{}", v.name);
            assert_eq!(proof.signature, v.expected_proof_signature, "{}", v.name);
        }
    }

    #[test]
    fn test_verify_all_vectors_reports_matches() {
        for (name, matches, _) in verify_all_vectors() {
            assert!(matches, "vector {name} did not match");
        }
    }

    #[test]
    fn test_vectors_are_deterministic() {
        for v in all_vectors() {
            let r1 = generate_relay_from_vector(&v);
            let r2 = generate_relay_from_vector(&v);
            assert_eq!(r1, r2, "vector '{}' is not deterministic", v.name);
        }
    }
}

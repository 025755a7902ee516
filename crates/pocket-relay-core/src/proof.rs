//! Relay proofs: the client's signed authorization for exactly one relay.

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::aat::Aat;
use crate::canonical::ProofSigningForm;
use crate::crypto::{PublicKey, RelayKey, Sha3Hash, Signature};
use crate::error::{CoreError, Result};
use crate::types::BlockchainId;

/// A signed relay proof in transport form.
///
/// The transmitted proof embeds the full AAT, while the signature covers
/// [`ProofSigningForm`], which carries only the AAT digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayProof {
    pub entropy: i64,
    pub session_block_height: i64,
    pub servicer_pub_key: String,
    pub blockchain: BlockchainId,
    pub aat: Aat,
    /// Lowercase hex Ed25519 signature by the client key.
    pub signature: String,
    /// Lowercase hex request digest.
    pub request_hash: String,
}

impl RelayProof {
    /// Rebuild the record the client key signed.
    pub fn signing_form(&self) -> Result<ProofSigningForm<'_>> {
        Ok(ProofSigningForm::new(
            self.entropy,
            self.session_block_height,
            &self.servicer_pub_key,
            self.blockchain,
            &self.aat.token()?,
            &self.request_hash,
        ))
    }

    /// Verify the proof signature against a client key.
    pub fn verify_signature(&self, client_pub_key: &PublicKey) -> Result<()> {
        let signature = Signature::from_hex(&self.signature)?;
        client_pub_key.verify(&self.signing_form()?.digest()?, &signature)
    }

    /// Verify the embedded AAT and the proof signature by the client key the
    /// AAT delegates to.
    pub fn verify(&self) -> Result<()> {
        self.aat.verify()?;
        let client = PublicKey::from_hex(&self.aat.client_pub_key)?;
        self.verify_signature(&client)
    }
}

/// Builder for signed relay proofs.
///
/// The session height is supplied by the caller and never adjusted here.
pub struct ProofBuilder {
    servicer_pub_key: String,
    blockchain: BlockchainId,
    request_hash: Sha3Hash,
    session_block_height: i64,
    entropy: Option<i64>,
}

impl ProofBuilder {
    pub fn new(
        servicer_pub_key: impl Into<String>,
        blockchain: BlockchainId,
        request_hash: Sha3Hash,
        session_block_height: i64,
    ) -> Self {
        Self {
            servicer_pub_key: servicer_pub_key.into(),
            blockchain,
            request_hash,
            session_block_height,
            entropy: None,
        }
    }

    /// Use a fixed entropy value instead of drawing one.
    pub fn entropy(mut self, entropy: i64) -> Self {
        self.entropy = Some(entropy);
        self
    }

    /// Sign with the client key, drawing entropy from the OS.
    pub fn sign<K: RelayKey + ?Sized>(self, client_key: &K, aat: Aat) -> Result<RelayProof> {
        self.sign_with_rng(client_key, aat, &mut OsRng)
    }

    /// Sign with the client key, drawing entropy from `rng`.
    pub fn sign_with_rng<K, R>(self, client_key: &K, aat: Aat, rng: &mut R) -> Result<RelayProof>
    where
        K: RelayKey + ?Sized,
        R: RngCore + CryptoRng,
    {
        let entropy = match self.entropy {
            Some(entropy) => entropy,
            None => draw_entropy(rng),
        };
        let request_hash = self.request_hash.to_hex();

        let form = ProofSigningForm::new(
            entropy,
            self.session_block_height,
            &self.servicer_pub_key,
            self.blockchain,
            &aat.token()?,
            &request_hash,
        );
        let signature = client_key.sign(&form.digest()?)?;

        Ok(RelayProof {
            entropy,
            session_block_height: self.session_block_height,
            servicer_pub_key: self.servicer_pub_key,
            blockchain: self.blockchain,
            aat,
            signature: signature.to_hex(),
            request_hash,
        })
    }
}

/// A non-negative 63-bit value, so it survives int64 decoding on the wire.
fn draw_entropy<R: RngCore + CryptoRng>(rng: &mut R) -> i64 {
    (rng.next_u64() >> 1) as i64
}

impl TryFrom<&RelayProof> for Sha3Hash {
    type Error = CoreError;

    fn try_from(proof: &RelayProof) -> Result<Self> {
        proof.signing_form()?.digest()
    }
}

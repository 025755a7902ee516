//! Canonical JSON encoding for hashing and signing.
//!
//! Every digest in the relay protocol is taken over compact JSON produced the
//! way Go's `encoding/json` produces it:
//! - Object keys in declared field order (struct order, never re-sorted)
//! - Map keys sorted
//! - No insignificant whitespace
//! - `<`, `>`, `&`, U+2028 and U+2029 written as `\uXXXX` escapes
//!
//! A proof has two encodings. The transmitted form embeds the full AAT. The
//! signed form is a fixed record carrying the AAT digest as `token` and an
//! empty `signature`. Verifiers rebuild the signed form, so both must stay
//! exactly as they are.

use serde::Serialize;
use serde_json::ser::Formatter;
use std::io;

use crate::aat::Aat;
use crate::crypto::Sha3Hash;
use crate::error::Result;
use crate::payload::{RelayMetadata, RelayPayload};
use crate::types::BlockchainId;

/// Encode any record in transport form.
pub fn to_transport_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(128);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, GoJsonFormatter);
    value.serialize(&mut serializer)?;
    Ok(buf)
}

/// Encode the proof signing record.
pub fn to_proof_signing_bytes(form: &ProofSigningForm<'_>) -> Result<Vec<u8>> {
    to_transport_bytes(form)
}

/// Transport bytes of `{"payload": …, "meta": …}`, the request hash preimage.
pub fn request_bytes(payload: &RelayPayload, meta: &RelayMetadata) -> Result<Vec<u8>> {
    #[derive(Serialize)]
    struct RequestHashInput<'a> {
        payload: &'a RelayPayload,
        meta: &'a RelayMetadata,
    }

    to_transport_bytes(&RequestHashInput { payload, meta })
}

/// Transport bytes of an AAT with its signature cleared, the token preimage.
pub fn aat_token_bytes(aat: &Aat) -> Result<Vec<u8>> {
    let unsigned = Aat {
        signature: String::new(),
        ..aat.clone()
    };
    to_transport_bytes(&unsigned)
}

/// The record a client key signs to authorize one relay.
///
/// Field order is part of the protocol. `signature` is always empty and the
/// AAT appears only as the hex digest of its unsigned transport form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProofSigningForm<'a> {
    entropy: i64,
    session_block_height: i64,
    servicer_pub_key: &'a str,
    blockchain: BlockchainId,
    signature: &'static str,
    token: String,
    request_hash: &'a str,
}

impl<'a> ProofSigningForm<'a> {
    pub fn new(
        entropy: i64,
        session_block_height: i64,
        servicer_pub_key: &'a str,
        blockchain: BlockchainId,
        aat_token: &Sha3Hash,
        request_hash: &'a str,
    ) -> Self {
        Self {
            entropy,
            session_block_height,
            servicer_pub_key,
            blockchain,
            signature: "",
            token: aat_token.to_hex(),
            request_hash,
        }
    }

    /// The hex AAT digest carried in place of the token.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Digest of the signing bytes; this is what the client key signs.
    pub fn digest(&self) -> Result<Sha3Hash> {
        Ok(Sha3Hash::hash(&to_proof_signing_bytes(self)?))
    }
}

/// serde_json formatter that escapes strings the way Go's encoder does.
#[derive(Debug, Clone, Copy, Default)]
struct GoJsonFormatter;

impl Formatter for GoJsonFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            let escape = match ch {
                '<' => "\\u003c",
                '>' => "\\u003e",
                '&' => "\\u0026",
                '\u{2028}' => "\\u2028",
                '\u{2029}' => "\\u2029",
                _ => continue,
            };
            writer.write_all(fragment[start..i].as_bytes())?;
            writer.write_all(escape.as_bytes())?;
            start = i + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}

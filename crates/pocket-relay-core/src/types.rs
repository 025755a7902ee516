//! Strong type definitions for relay targets.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// A target chain code: exactly four ASCII hex digits, e.g. `0021`.
///
/// The code is kept byte-for-byte as given since it participates in the
/// signed proof.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockchainId([u8; 4]);

impl BlockchainId {
    /// Harmony mainnet shard 0.
    pub const HARMONY: Self = Self(*b"0040");
    /// Ethereum mainnet.
    pub const ETHEREUM: Self = Self(*b"0021");
    /// IPFS.
    pub const IPFS: Self = Self(*b"1111");

    /// Parse a chain code.
    pub fn new(code: &str) -> Result<Self, CoreError> {
        let bytes = code.as_bytes();
        if bytes.len() != 4 || !bytes.iter().all(u8::is_ascii_hexdigit) {
            return Err(CoreError::InvalidBlockchain(code.to_string()));
        }
        let mut arr = [0u8; 4];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    /// The chain code as a string slice.
    pub fn as_str(&self) -> &str {
        // Only ASCII hex digits are ever stored.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl FromStr for BlockchainId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Debug for BlockchainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockchainId({})", self.as_str())
    }
}

impl fmt::Display for BlockchainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for BlockchainId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BlockchainId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::new(&s).map_err(serde::de::Error::custom)
    }
}

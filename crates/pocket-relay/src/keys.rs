//! Keys used to authorize relays.

use pocket_relay_core::RelayKey;
use rand::seq::SliceRandom;

use crate::error::{RelayError, Result};

/// Application keys plus the servicer (client) key they delegate to.
///
/// Each relay is authorized by one application key, picked at random so load
/// spreads across applications.
#[derive(Debug, Clone)]
pub struct KeyRing<K> {
    app_keys: Vec<K>,
    servicer_key: K,
}

impl<K: RelayKey> KeyRing<K> {
    pub fn new(app_keys: Vec<K>, servicer_key: K) -> Result<Self> {
        if app_keys.is_empty() {
            return Err(RelayError::Config("at least one application key is required".into()));
        }
        Ok(Self {
            app_keys,
            servicer_key,
        })
    }

    /// Pick an application key for the next relay.
    pub fn app_key(&self) -> &K {
        self.app_keys
            .choose(&mut rand::thread_rng())
            .unwrap_or(&self.app_keys[0])
    }

    pub fn app_keys(&self) -> &[K] {
        &self.app_keys
    }

    pub fn servicer_key(&self) -> &K {
        &self.servicer_key
    }
}

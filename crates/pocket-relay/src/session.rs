//! Session height tracking.
//!
//! The serving network validates each relay against the session height it
//! was stamped with. The height starts unknown (0) and is only ever replaced
//! by a height the network reports back when it rejects a stale relay.

use parking_lot::RwLock;
use tracing::info;

/// The session height shared by every relay attempt of one client.
///
/// Share it as `Arc<SessionState>`. Reads and corrections are serialized by
/// the lock, so a proof is always stamped with a whole value.
#[derive(Debug, Default)]
pub struct SessionState {
    height: RwLock<i64>,
}

impl SessionState {
    /// A session with an unknown height.
    pub fn new() -> Self {
        Self::default()
    }

    /// A session starting from a known height.
    pub fn with_height(height: i64) -> Self {
        Self {
            height: RwLock::new(height),
        }
    }

    /// The current session height.
    pub fn current(&self) -> i64 {
        *self.height.read()
    }

    /// Replace the height with one reported by the network.
    pub fn correct(&self, new_height: i64) {
        let mut height = self.height.write();
        let previous = std::mem::replace(&mut *height, new_height);
        info!(previous, new_height, "session height corrected");
    }
}

//! Mount liveness tokens

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared flag marking one mount of a viewer as live.
///
/// Each mount gets a new generation. Background work holds a clone and
/// checks it before handing results back; unmount revokes it.
#[derive(Debug, Clone)]
pub struct Liveness {
    generation: u64,
    alive: Arc<AtomicBool>,
}

impl Liveness {
    pub fn new(generation: u64) -> Self {
        Self {
            generation,
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// True if this token is alive and belongs to `generation`.
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation && self.is_alive()
    }

    pub fn revoke(&self) {
        self.alive.store(false, Ordering::Release);
    }
}

/// Identifies one asset load request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket {
    /// Mount generation the load was started in
    pub generation: u64,
    /// Per-viewer load counter
    pub seq: u64,
}

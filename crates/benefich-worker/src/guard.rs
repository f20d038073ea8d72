//! Single-flight guard for dispatch pairs.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use benefich_entity::{Channel, ContentKind};

/// Pair key used by the guard.
pub type PairKey = (ContentKind, Channel);

/// Allows at most one in-flight run per (content kind, channel).
///
/// A caller that finds its pair busy gets `None` and is expected to skip
/// the run rather than wait for it.
#[derive(Debug, Default)]
pub struct SingleFlight {
    slots: Mutex<HashMap<PairKey, Arc<Semaphore>>>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `key`. The pair is released when the permit is dropped.
    pub fn try_acquire(&self, key: PairKey) -> Option<OwnedSemaphorePermit> {
        let slot = {
            let mut slots = self
                .slots
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            Arc::clone(
                slots
                    .entry(key)
                    .or_insert_with(|| Arc::new(Semaphore::new(1))),
            )
        };
        slot.try_acquire_owned().ok()
    }
}

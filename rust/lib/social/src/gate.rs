use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// One async gate per post id.
///
/// Transitions on the same post queue behind each other; different posts
/// never contend. Gates are dropped once nobody holds or waits on them.
#[derive(Default)]
pub struct PostGates {
    gates: Mutex<HashMap<String, Weak<AsyncMutex<()>>>>,
}

impl PostGates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `post_id`.
    pub async fn enter(&self, post_id: &str) -> OwnedMutexGuard<()> {
        let gate = {
            let mut gates = self.gates.lock().unwrap();
            gates.retain(|_, g| g.strong_count() > 0);
            match gates.get(post_id).and_then(Weak::upgrade) {
                Some(gate) => gate,
                None => {
                    let gate = Arc::new(AsyncMutex::new(()));
                    gates.insert(post_id.to_string(), Arc::downgrade(&gate));
                    gate
                }
            }
        };
        gate.lock_owned().await
    }

    /// Number of gates currently held or awaited.
    pub fn active(&self) -> usize {
        let gates = self.gates.lock().unwrap();
        gates.values().filter(|g| g.strong_count() > 0).count()
    }
}

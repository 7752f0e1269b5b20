//! Per-instance run locks.
//!
//! Overlapping triggers for one instance are serialized: the second run waits
//! for the first to reach its terminal state, then starts from its own
//! precondition check. Runs for different instances never wait on each other.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

/// Registry of async mutexes keyed by instance id.
#[derive(Debug, Clone, Default)]
pub struct InstanceLocks {
    inner: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl InstanceLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `instance_id`. The lock is held until the
    /// returned guard is dropped.
    pub async fn acquire(&self, instance_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.inner.lock().await;
            // Drop entries nobody holds or waits on
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(
                locks
                    .entry(instance_id.to_string())
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };

        if lock.try_lock().is_err() {
            debug!(instance_id, "Remediation already in progress, waiting");
        }
        lock.lock_owned().await
    }

    /// Number of instances with a held or awaited lock.
    pub async fn tracked(&self) -> usize {
        let locks = self.inner.lock().await;
        locks
            .values()
            .filter(|lock| Arc::strong_count(lock) > 1)
            .count()
    }
}

use std::{collections::HashMap, sync::Arc};
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per village. Writes to a village are serialized by
/// holding its guard for the whole unit of work; different villages never wait
/// on each other.
#[derive(Debug, Default)]
pub struct VillageLocks {
    locks: Mutex<HashMap<u32, Arc<Mutex<()>>>>,
}

impl VillageLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for the village lock. It is released when the guard is dropped.
    pub async fn acquire(&self, village_id: u32) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            // drop entries nobody is holding or waiting on
            locks.retain(|id, lock| *id == village_id || Arc::strong_count(lock) > 1);
            locks.entry(village_id).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Number of villages with a live lock entry.
    pub async fn tracked_villages(&self) -> usize {
        self.locks.lock().await.len()
    }
}

//! Per-user serialization of read-modify-write sequences.

use std::{
  collections::HashMap,
  sync::{Arc, Mutex},
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use weave_core::UserId;

/// Idle entries are pruned once the registry grows past this many users.
const PRUNE_THRESHOLD: usize = 1024;

/// One async mutex per user, created on demand.
#[derive(Default)]
pub struct UserLocks {
  entries: Mutex<HashMap<UserId, Arc<AsyncMutex<()>>>>,
}

impl UserLocks {
  pub fn new() -> Self { Self::default() }

  /// Wait for exclusive access to `user`'s state. Held until the guard drops.
  pub async fn lock(&self, user: UserId) -> OwnedMutexGuard<()> {
    let slot = {
      let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
      if entries.len() > PRUNE_THRESHOLD {
        // Only the map holds a reference: nobody is waiting or locked.
        entries.retain(|_, slot| Arc::strong_count(slot) > 1);
      }
      Arc::clone(entries.entry(user).or_default())
    };
    slot.lock_owned().await
  }

  /// Number of users currently tracked.
  pub fn len(&self) -> usize { self.entries.lock().unwrap_or_else(|e| e.into_inner()).len() }

  pub fn is_empty(&self) -> bool { self.len() == 0 }
}

//! Per-user write serialization.

use memdesk_memory::UserId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type LockMap = HashMap<UserId, Arc<AsyncMutex<()>>>;

/// One async lock per user id, created on first use and dropped once idle.
///
/// Holding a user's guard keeps that user's writes contiguous; different users
/// never wait on each other.
#[derive(Debug, Default)]
pub(crate) struct UserLocks {
    locks: Mutex<LockMap>,
}

/// Exclusive write access for one user. Dropping it releases the lock and
/// prunes the map entry when nobody else holds or waits on it.
pub(crate) struct UserWriteGuard<'a> {
    guard: Option<OwnedMutexGuard<()>>,
    locks: &'a UserLocks,
    user_id: UserId,
}

impl UserLocks {
    /// Wait for exclusive write access for `user_id`.
    pub(crate) async fn acquire(&self, user_id: &UserId) -> UserWriteGuard<'_> {
        let lock = {
            let mut locks = self.locks.lock();
            locks
                .entry(user_id.clone())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        UserWriteGuard {
            guard: Some(lock.lock_owned().await),
            locks: self,
            user_id: user_id.clone(),
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.lock().len()
    }
}

impl Drop for UserWriteGuard<'_> {
    fn drop(&mut self) {
        // Release first so the strong count below only sees the map and waiters.
        self.guard.take();
        let mut locks = self.locks.locks.lock();
        if locks
            .get(&self.user_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.user_id);
        }
    }
}

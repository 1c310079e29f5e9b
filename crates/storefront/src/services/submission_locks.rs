//! Per-session locks around the order submission guard.
//!
//! Loading the submission state, calling `begin`, and persisting `Pending`
//! must happen as one step per session, otherwise two simultaneous submits
//! on the same cookie can both observe `Idle`.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tower_sessions::session::Id;

/// Keyed mutexes, one per session id.
#[derive(Clone)]
pub struct SubmissionLocks {
    locks: Cache<Id, Arc<Mutex<()>>>,
}

impl SubmissionLocks {
    #[must_use]
    pub fn new() -> Self {
        let locks = Cache::builder()
            .max_capacity(10_000)
            .time_to_idle(Duration::from_secs(300)) // 5 minutes
            .build();

        Self { locks }
    }

    /// Wait for exclusive access to `session_id`'s submission state.
    pub async fn acquire(&self, session_id: Id) -> OwnedMutexGuard<()> {
        self.locks
            .get_with(session_id, async { Arc::new(Mutex::new(())) })
            .await
            .lock_owned()
            .await
    }
}

impl Default for SubmissionLocks {
    fn default() -> Self {
        Self::new()
    }
}

//! In-memory user store standing in for a remote service.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct User {
    pub id: u32,
    pub name: String,
}

/// Id the store refuses; any round trip that includes it fails as a whole.
pub const POISON_ID: u32 = 0;

#[derive(Debug, thiserror::Error)]
#[error("user store unavailable (refused id {POISON_ID})")]
pub struct StoreUnavailable;

/// Counts round trips so the demo can show how many calls were collapsed.
#[derive(Debug, Clone)]
pub struct UserStore {
    users: Arc<HashMap<u32, String>>,
    round_trips: Arc<AtomicUsize>,
    latency: Duration,
}

impl UserStore {
    pub fn seeded(latency: Duration) -> Self {
        let users = [
            (1, "ada"),
            (2, "grace"),
            (3, "linus"),
            (5, "barbara"),
            (8, "ken"),
            (13, "dennis"),
        ]
        .into_iter()
        .map(|(id, name)| (id, name.to_string()))
        .collect();

        Self {
            users: Arc::new(users),
            round_trips: Arc::new(AtomicUsize::new(0)),
            latency,
        }
    }

    /// One round trip for many ids. Unknown ids come back as `User::default()`.
    pub async fn fetch_many(&self, ids: Vec<(u32,)>) -> Result<Vec<User>, StoreUnavailable> {
        let trip = self.round_trips.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(trip, ids = ids.len(), "Fetching users");
        tokio::time::sleep(self.latency).await;

        if ids.iter().any(|&(id,)| id == POISON_ID) {
            tracing::warn!(trip, "Store refused the round trip");
            return Err(StoreUnavailable);
        }

        Ok(ids
            .into_iter()
            .map(|(id,)| {
                self.users
                    .get(&id)
                    .map(|name| User {
                        id,
                        name: name.clone(),
                    })
                    .unwrap_or_default()
            })
            .collect())
    }

    pub fn round_trips(&self) -> usize {
        self.round_trips.load(Ordering::SeqCst)
    }
}

//! Drawn pools waiting to be played, keyed by session id.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

use crate::tournament::Contestant;

/// Oldest sessions are evicted past this many.
pub const MAX_SESSIONS: usize = 256;

#[derive(Debug, Default)]
struct Sessions {
    pools: HashMap<Uuid, Vec<Contestant>>,
    order: VecDeque<Uuid>,
}

#[derive(Debug, Default)]
pub struct SessionStore {
    inner: Mutex<Sessions>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Sessions> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store `pool` under a fresh id.
    pub fn insert(&self, pool: Vec<Contestant>) -> Uuid {
        let id = Uuid::new_v4();
        let mut sessions = self.lock();
        while sessions.order.len() >= MAX_SESSIONS {
            if let Some(oldest) = sessions.order.pop_front() {
                sessions.pools.remove(&oldest);
                tracing::debug!(session = %oldest, "evicted session");
            }
        }
        sessions.pools.insert(id, pool);
        sessions.order.push_back(id);
        id
    }

    /// Remove and return the pool for `id`. A session is played at most once.
    pub fn take(&self, id: &Uuid) -> Option<Vec<Contestant>> {
        let mut sessions = self.lock();
        let pool = sessions.pools.remove(id)?;
        sessions.order.retain(|other| other != id);
        Some(pool)
    }

    pub fn len(&self) -> usize {
        self.lock().pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

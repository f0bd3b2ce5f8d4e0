//! In-memory chat session registry for the HTTP API.
//!
//! Sessions are ephemeral: nothing is persisted and a restart drops them.
//! Each session sits behind its own mutex so one turn runs at a time.
//! Sessions idle longer than the timeout are evicted, and the store never
//! holds more than `max_sessions`; the least recently used goes first.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::info;
use uuid::Uuid;

use crate::ai::ChatSession;

pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_MAX_SESSIONS: usize = 1_000;

pub type SharedSession = Arc<Mutex<Box<dyn ChatSession>>>;

struct Entry {
    session: SharedSession,
    last_used: Instant,
}

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Entry>>>,
    idle_timeout: Duration,
    max_sessions: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_limits(DEFAULT_IDLE_TIMEOUT, DEFAULT_MAX_SESSIONS)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(idle_timeout: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_timeout,
            max_sessions: max_sessions.max(1),
        }
    }

    pub async fn insert(&self, session: Box<dyn ChatSession>) -> Uuid {
        let id = Uuid::new_v4();
        let mut sessions = self.sessions.write().await;
        self.evict_idle_locked(&mut sessions);

        while sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(id, _)| *id);
            match oldest {
                Some(oldest) => {
                    sessions.remove(&oldest);
                    info!("Chat session {oldest} evicted (store full)");
                }
                None => break,
            }
        }

        sessions.insert(
            id,
            Entry {
                session: Arc::new(Mutex::new(session)),
                last_used: Instant::now(),
            },
        );
        id
    }

    /// Looks a session up and marks it as used.
    pub async fn get(&self, id: Uuid) -> Option<SharedSession> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&id)?;
        entry.last_used = Instant::now();
        Some(entry.session.clone())
    }

    /// Returns whether a session was removed.
    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drops every session idle longer than the timeout. Returns how many went.
    pub async fn evict_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        self.evict_idle_locked(&mut sessions)
    }

    fn evict_idle_locked(&self, sessions: &mut HashMap<Uuid, Entry>) -> usize {
        let before = sessions.len();
        let timeout = self.idle_timeout;
        sessions.retain(|_, entry| entry.last_used.elapsed() < timeout);
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!("Evicted {evicted} idle chat sessions");
        }
        evicted
    }

    /// Runs `evict_idle` on a fixed period for the life of the process.
    pub fn spawn_sweeper(&self, period: Duration) {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                store.evict_idle().await;
            }
        });
    }
}

use std::sync::Arc;

use crate::ai::{AiService, CredentialStore};
use crate::interview::sessions::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The one active adapter, chosen at startup by `ai::build_service`.
    pub ai: Arc<dyn AiService>,
    /// Same store the adapter reads from; updating it takes effect on the next call.
    pub credentials: CredentialStore,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(ai: Arc<dyn AiService>, credentials: CredentialStore, sessions: SessionStore) -> Self {
        Self {
            ai,
            credentials,
            sessions,
        }
    }
}

//! Provider credential holder.
//!
//! Passed explicitly to the service selector. Adapters read the key on every
//! request, and the chat-completions adapter clears it when upstream rejects it.
//! Interested parties subscribe to changes instead of polling.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

#[derive(Clone)]
pub struct CredentialStore {
    tx: Arc<watch::Sender<Option<String>>>,
}

impl CredentialStore {
    pub fn new(initial: Option<String>) -> Self {
        let initial = initial.filter(|key| !key.trim().is_empty());
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    pub fn empty() -> Self {
        Self::new(None)
    }

    pub fn get(&self) -> Option<String> {
        self.tx.borrow().clone()
    }

    pub fn is_configured(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// Replaces the key. Blank keys clear the store.
    pub fn set(&self, key: impl Into<String>) {
        let key = key.into();
        if key.trim().is_empty() {
            self.clear();
            return;
        }
        self.tx.send_replace(Some(key.trim().to_string()));
        info!("API key updated");
    }

    pub fn clear(&self) {
        if self.tx.send_replace(None).is_some() {
            info!("API key cleared");
        }
    }

    /// Receives every subsequent set/clear.
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.tx.subscribe()
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("configured", &self.is_configured())
            .finish()
    }
}

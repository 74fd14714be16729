use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::session::{SessionHandle, SessionState};

/// Live sessions keyed by login key (before first contact) or runtime key
/// (after).
///
/// Login files a session under a random login key; the first request from a
/// page presenting that key moves it under the page's runtime key. Thread-safe via interior `RwLock`;
/// designed to be wrapped in `Arc` and shared across the application.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// File `state` under `login_key`, replacing any session already there.
    pub async fn create(&self, login_key: &str, state: SessionState) -> SessionHandle {
        let handle = Arc::new(Mutex::new(state));
        let replaced = self
            .sessions
            .write()
            .await
            .insert(login_key.to_string(), Arc::clone(&handle))
            .is_some();
        tracing::debug!(login_key, replaced, "Session created");
        handle
    }

    /// Bind `runtime_key` to a session.
    ///
    /// Returns the session already under `runtime_key` if there is one.
    /// Otherwise moves the session filed under `login_key` to `runtime_key`
    /// so it is no longer reachable by the login key. `None` if neither key
    /// has a session.
    pub async fn attach(&self, runtime_key: &str, login_key: &str) -> Option<SessionHandle> {
        if let Some(handle) = self.lookup(runtime_key).await {
            return Some(handle);
        }

        let mut sessions = self.sessions.write().await;
        // Another request may have attached between the read and write locks.
        if let Some(handle) = sessions.get(runtime_key) {
            return Some(Arc::clone(handle));
        }

        let handle = sessions.remove(login_key)?;
        sessions.insert(runtime_key.to_string(), Arc::clone(&handle));
        tracing::info!(runtime_key, login_key, "Session attached");
        Some(handle)
    }

    pub async fn lookup(&self, key: &str) -> Option<SessionHandle> {
        self.sessions.read().await.get(key).cloned()
    }

    /// Remove the session under `key`. Returns whether one existed.
    pub async fn destroy(&self, key: &str) -> bool {
        let removed = self.sessions.write().await.remove(key).is_some();
        if removed {
            tracing::info!(key, "Session destroyed");
        }
        removed
    }

    /// Return the current number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

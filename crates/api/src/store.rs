//! File-backed credential store.
//!
//! A single JSON object mapping username to [`CredentialRecord`], rewritten in
//! full on every [`upsert`](CredentialStore::upsert). A missing file is created
//! empty. A file that cannot be read or parsed is logged and reset to an empty
//! mapping, losing its previous contents; callers never see that failure.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// One user's login record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub username: String,
    #[serde(default)]
    pub full_name: String,
    /// Argon2id PHC hash string.
    #[serde(rename = "hashed_password")]
    pub password_hash: String,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub admin: bool,
    /// Collections written into the user's access tokens.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub collections: Vec<String>,
}

/// Username → record.
pub type CredentialMap = BTreeMap<String, CredentialRecord>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("credential store {} is corrupt: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("credential store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("credential store serialization error: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Credential store rooted at one JSON file.
///
/// Writers are serialized by an internal mutex; readers do not take it.
#[derive(Debug)]
pub struct CredentialStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole mapping.
    ///
    /// Never fails: an unreadable or corrupt file is reset to `{}` and an
    /// empty mapping is returned.
    pub async fn load(&self) -> CredentialMap {
        match self.read_map().await {
            Ok(Some(map)) => map,
            _ => {
                let _guard = self.write_lock.lock().await;
                self.read_locked().await
            }
        }
    }

    /// Look up a single user.
    pub async fn get(&self, username: &str) -> Option<CredentialRecord> {
        self.load().await.remove(username)
    }

    /// Store `record` under `username`, replacing any existing entry, and
    /// persist the whole mapping.
    pub async fn upsert(&self, username: &str, record: CredentialRecord) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut map = self.read_locked().await;
        map.insert(username.to_string(), record);
        self.write_map(&map).await?;

        tracing::info!(username, path = %self.path.display(), "Credential record stored");
        Ok(())
    }

    /// Read, creating a missing file and resetting a corrupt one.
    ///
    /// Caller must hold `write_lock`.
    async fn read_locked(&self) -> CredentialMap {
        let cause = match self.read_map().await {
            Ok(Some(map)) => return map,
            Ok(None) => {
                let empty = CredentialMap::new();
                if let Err(e) = self.write_map(&empty).await {
                    tracing::error!(error = %e, path = %self.path.display(), "Failed to create credential store");
                }
                return empty;
            }
            Err(e) => e,
        };

        tracing::error!(
            error = %cause,
            path = %self.path.display(),
            "Credential store unreadable, resetting to empty"
        );
        let empty = CredentialMap::new();
        if let Err(e) = self.write_map(&empty).await {
            tracing::error!(error = %e, path = %self.path.display(), "Failed to reset credential store");
        }
        empty
    }

    /// `Ok(None)` when the backing file does not exist.
    async fn read_map(&self) -> Result<Option<CredentialMap>, StoreError> {
        if !tokio::fs::try_exists(&self.path).await? {
            return Ok(None);
        }

        let raw = tokio::fs::read(&self.path).await?;
        serde_json::from_slice(&raw)
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            })
    }

    /// Write to a sibling temp file, then rename over the original.
    async fn write_map(&self, map: &CredentialMap) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let body = serde_json::to_vec_pretty(map).map_err(StoreError::Serialize)?;
        let temp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, body).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn record(username: &str, admin: bool) -> CredentialRecord {
        CredentialRecord {
            username: username.to_string(),
            full_name: format!("{username} full"),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
            disabled: false,
            admin,
            collections: Vec::new(),
        }
    }

    #[tokio::test]
    async fn missing_file_is_created_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("users.json"));

        assert!(store.load().await.is_empty());
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw.trim(), "{}");
    }

    #[tokio::test]
    async fn corrupt_file_resets_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(&path, "{ this is not json").unwrap();
        let store = CredentialStore::new(&path);

        assert!(store.load().await.is_empty());
        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(raw.trim(), "{}", "corrupt contents are discarded");
    }

    #[tokio::test]
    async fn upsert_then_load_returns_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("users.json"));

        store.upsert("alice", record("alice", true)).await.unwrap();

        let map = store.load().await;
        assert_eq!(map.len(), 1);
        assert_eq!(map["alice"], record("alice", true));
    }

    #[tokio::test]
    async fn upsert_overwrites_whole_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("users.json"));

        store.upsert("alice", record("alice", true)).await.unwrap();
        let mut replacement = record("alice", false);
        replacement.full_name = "Alice Replaced".into();
        store.upsert("alice", replacement.clone()).await.unwrap();

        assert_eq!(store.get("alice").await, Some(replacement));
    }

    #[tokio::test]
    async fn upsert_into_corrupt_file_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(&path, "[1, 2").unwrap();
        let store = CredentialStore::new(&path);

        store.upsert("bob", record("bob", false)).await.unwrap();

        let map = store.load().await;
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["bob"]);
    }

    #[tokio::test]
    async fn concurrent_upserts_of_different_keys_both_persist() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(CredentialStore::new(dir.path().join("users.json")));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    let name = format!("user{i}");
                    store.upsert(&name, record(&name, false)).await.unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let map = store.load().await;
        assert_eq!(map.len(), 8);
        assert_eq!(map["user3"], record("user3", false));
    }

    #[tokio::test]
    async fn reads_legacy_record_without_optional_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(
            &path,
            r#"{"carol": {"username": "carol", "hashed_password": "x"}}"#,
        )
        .unwrap();

        let carol = CredentialStore::new(&path).get("carol").await.unwrap();
        assert!(!carol.admin);
        assert!(!carol.disabled);
        assert_eq!(carol.full_name, "");
    }
}

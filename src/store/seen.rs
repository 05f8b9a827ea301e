use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, error};

use super::{StoreError, write_atomic};
use crate::opendota::MatchId;

/// Player id -> id of the last match we notified about.
pub type SeenMatches = BTreeMap<String, String>;

/// A match id as found on disk. Hand edits sometimes drop the quotes.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredMatchId {
    Text(String),
    Number(u64),
}

impl From<StoredMatchId> for String {
    fn from(id: StoredMatchId) -> Self {
        match id {
            StoredMatchId::Text(s) => s,
            StoredMatchId::Number(n) => n.to_string(),
        }
    }
}

/// Dedup state of the watcher, persisted as a single JSON object. Every write
/// rewrites the whole snapshot; writers are serialized through the mutex.
#[derive(Debug)]
pub struct SeenMatchStore {
    path: PathBuf,
    snapshot: Mutex<SeenMatches>,
}

impl SeenMatchStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            snapshot: Mutex::new(SeenMatches::new()),
        }
    }

    /// Re-read the file, replacing the in-memory snapshot. A missing file is
    /// an empty store.
    pub async fn load(&self) -> Result<SeenMatches, StoreError> {
        let mut snapshot = self.snapshot.lock().await;

        let loaded = match tokio::fs::read(&self.path).await {
            Ok(bytes) => self.decode(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "🗃️ No seen-match file yet");
                SeenMatches::new()
            }
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        *snapshot = loaded;
        Ok(snapshot.clone())
    }

    fn decode(&self, bytes: &[u8]) -> Result<SeenMatches, StoreError> {
        match serde_json::from_slice::<BTreeMap<String, StoredMatchId>>(bytes) {
            Ok(raw) => Ok(raw.into_iter().map(|(k, v)| (k, v.into())).collect()),
            Err(source) => {
                error!(
                    path = %self.path.display(),
                    error = %source,
                    "🗃️ ❌ Seen-match file is unreadable, fix or remove it"
                );
                Err(StoreError::Corrupt {
                    path: self.path.display().to_string(),
                    source,
                })
            }
        }
    }

    pub async fn last_seen(&self, player_id: &str) -> Option<String> {
        self.snapshot.lock().await.get(player_id).cloned()
    }

    pub async fn is_seen(&self, player_id: &str, match_id: MatchId) -> bool {
        self.last_seen(player_id).await.as_deref() == Some(match_id.to_string().as_str())
    }

    /// Record `match_id` for `player_id` and persist the full snapshot. On
    /// failure the in-memory state is left untouched.
    pub async fn record_seen(&self, player_id: &str, match_id: MatchId) -> Result<(), StoreError> {
        let mut snapshot = self.snapshot.lock().await;

        let mut updated = snapshot.clone();
        updated.insert(player_id.to_string(), match_id.to_string());

        let bytes = serde_json::to_vec_pretty(&updated)?;
        write_atomic(&self.path, &bytes).await?;

        *snapshot = updated;
        debug!(player_id, match_id, "🗃️ Seen-match snapshot written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = SeenMatchStore::new(dir.path().join("last_matches.json"));

        assert!(store.load().await.unwrap().is_empty());
        assert_eq!(store.last_seen("1").await, None);
    }

    #[tokio::test]
    async fn record_persists_full_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("last_matches.json");
        let store = SeenMatchStore::new(&path);
        store.load().await.unwrap();

        store.record_seen("100", 42).await.unwrap();
        store.record_seen("200", 7).await.unwrap();
        store.record_seen("100", 43).await.unwrap();

        let on_disk: SeenMatches =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(on_disk.get("100").map(String::as_str), Some("43"));
        assert_eq!(on_disk.get("200").map(String::as_str), Some("7"));

        let reopened = SeenMatchStore::new(&path);
        reopened.load().await.unwrap();
        assert!(reopened.is_seen("100", 43).await);
        assert!(!reopened.is_seen("100", 42).await);
    }

    #[tokio::test]
    async fn load_honors_external_edits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("last_matches.json");
        let store = SeenMatchStore::new(&path);
        store.load().await.unwrap();
        store.record_seen("100", 42).await.unwrap();

        std::fs::write(&path, r#"{ "100": "41", "300": "9" }"#).unwrap();
        let seen = store.load().await.unwrap();

        assert_eq!(seen.len(), 2);
        assert_eq!(store.last_seen("100").await.as_deref(), Some("41"));
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("last_matches.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = SeenMatchStore::new(&path);

        assert!(matches!(
            store.load().await,
            Err(StoreError::Corrupt { ref path, .. }) if path.ends_with("last_matches.json")
        ));
    }

    #[tokio::test]
    async fn unquoted_match_ids_are_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("last_matches.json");
        std::fs::write(&path, r#"{ "100": 42, "200": "77" }"#).unwrap();

        let store = SeenMatchStore::new(&path);
        let seen = store.load().await.unwrap();

        assert_eq!(seen.get("100").map(String::as_str), Some("42"));
        assert!(store.is_seen("100", 42).await);
        assert!(store.is_seen("200", 77).await);

        store.record_seen("300", 5).await.unwrap();
        let on_disk: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(on_disk["100"], serde_json::json!("42"));
    }

    #[tokio::test]
    async fn failed_write_keeps_previous_state() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be makes the rename fail.
        let path = dir.path().join("last_matches.json");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("occupied"), "x").unwrap();

        let store = SeenMatchStore::new(&path);

        assert!(store.record_seen("100", 42).await.is_err());
        assert_eq!(store.last_seen("100").await, None);
    }
}

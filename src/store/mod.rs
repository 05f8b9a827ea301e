//! On-disk state: the seen-match snapshot and the per-player match archive.

use std::path::Path;

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::warn;

use crate::opendota::MatchId;

mod archive;
mod seen;

pub use archive::{ArchiveOutcome, MatchArchive};
pub use seen::{SeenMatchStore, SeenMatches};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Unreadable snapshot {path}: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Payload is match {found}, expected {expected}")]
    MatchMismatch { expected: MatchId, found: MatchId },

    #[error("Refusing to use {0:?} as a storage key")]
    InvalidKey(String),
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Write `bytes` next to `path`, flush it to disk, then rename over it, so
/// readers only ever see a complete file and the rename survives a power loss.
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let parent = path.parent().filter(|p| !p.as_os_str().is_empty());

    if let Some(parent) = parent {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| StoreError::io(parent, e))?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = Path::new(&tmp);

    let mut file = tokio::fs::File::create(tmp)
        .await
        .map_err(|e| StoreError::io(tmp, e))?;
    file.write_all(bytes)
        .await
        .map_err(|e| StoreError::io(tmp, e))?;
    file.sync_all().await.map_err(|e| StoreError::io(tmp, e))?;
    drop(file);

    tokio::fs::rename(tmp, path)
        .await
        .map_err(|e| StoreError::io(path, e))?;

    if let Some(parent) = parent {
        sync_dir(parent).await;
    }

    Ok(())
}

/// Persist the directory entry of a rename. Not every platform can open a
/// directory for syncing, so failures only warn.
async fn sync_dir(dir: &Path) {
    let res = match tokio::fs::File::open(dir).await {
        Ok(handle) => handle.sync_all().await,
        Err(e) => Err(e),
    };

    if let Err(e) = res {
        warn!(error = %e, dir = %dir.display(), "🗃️ ⚠️ Could not sync directory");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_atomic_replaces_content_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/state.json");

        write_atomic(&path, b"{\"a\":\"1\"}").await.unwrap();
        write_atomic(&path, b"{\"a\":\"2\"}").await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"{\"a\":\"2\"}");
        let entries: Vec<_> = std::fs::read_dir(dir.path().join("nested"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("state.json")]);
    }

    #[tokio::test]
    async fn write_atomic_reports_the_failing_path() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file, not a directory").unwrap();

        let err = write_atomic(&blocker.join("state.json"), b"{}")
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Io { ref path, .. } if path.contains("blocker")));
    }
}

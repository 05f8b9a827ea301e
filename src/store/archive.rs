use std::path::{Path, PathBuf};

use tracing::debug;

use super::{StoreError, write_atomic};
use crate::opendota::{MatchDetail, MatchId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveOutcome {
    Stored(PathBuf),
    AlreadyExists(PathBuf),
}

/// Write-once store of raw match payloads, laid out as
/// `<root>/<player_id>/<match_id>.json`.
#[derive(Debug, Clone)]
pub struct MatchArchive {
    root: PathBuf,
}

impl MatchArchive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, player_id: &str, match_id: MatchId) -> Result<PathBuf, StoreError> {
        let valid = !player_id.is_empty()
            && player_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidKey(player_id.to_string()));
        }

        Ok(self.root.join(player_id).join(format!("{match_id}.json")))
    }

    pub async fn contains(&self, player_id: &str, match_id: MatchId) -> Result<bool, StoreError> {
        let path = self.path_for(player_id, match_id)?;
        tokio::fs::try_exists(&path)
            .await
            .map_err(|e| StoreError::io(&path, e))
    }

    /// Store `detail` as `match_id` for `player_id` unless that match is
    /// already archived. A payload describing another match is refused.
    pub async fn archive(
        &self,
        player_id: &str,
        match_id: MatchId,
        detail: &MatchDetail,
    ) -> Result<ArchiveOutcome, StoreError> {
        if detail.match_id != match_id {
            return Err(StoreError::MatchMismatch {
                expected: match_id,
                found: detail.match_id,
            });
        }

        let path = self.path_for(player_id, match_id)?;

        if self.contains(player_id, match_id).await? {
            debug!(path = %path.display(), "🗄️ Match already archived");
            return Ok(ArchiveOutcome::AlreadyExists(path));
        }

        let bytes = serde_json::to_vec_pretty(detail.raw())?;
        write_atomic(&path, &bytes).await?;

        debug!(path = %path.display(), "🗄️ Match archived");
        Ok(ArchiveOutcome::Stored(path))
    }
}

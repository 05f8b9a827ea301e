//! The static list of tracked players.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("cannot read roster: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed roster: {0}")]
    Csv(#[from] csv::Error),
}

/// A Discord user paired with the OpenDota account whose matches we watch.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TrackedIdentity {
    /// Discord user id, mentioned in notifications.
    #[serde(rename = "discord_id")]
    pub user_id: String,
    /// OpenDota account id (steam32).
    #[serde(rename = "steam_id")]
    pub player_id: String,
}

pub struct Roster;

impl Roster {
    /// Read the roster file. Called at startup and again at the start of every
    /// cycle so edits apply without a restart.
    pub fn load(path: impl AsRef<Path>) -> Result<Vec<TrackedIdentity>, RosterError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Same as [`Roster::load`] without blocking the runtime.
    pub async fn load_async(path: impl AsRef<Path>) -> Result<Vec<TrackedIdentity>, RosterError> {
        let bytes = tokio::fs::read(path).await?;
        Self::from_reader(bytes.as_slice())
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Vec<TrackedIdentity>, RosterError> {
        let mut csv = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut seen = HashSet::new();
        let mut identities = Vec::new();

        for record in csv.deserialize::<TrackedIdentity>() {
            let identity = record?;

            if identity.user_id.is_empty() || identity.player_id.is_empty() {
                warn!(?identity, "📋 Skipping roster row with an empty id");
                continue;
            }

            if !seen.insert(identity.player_id.clone()) {
                warn!(
                    player_id = %identity.player_id,
                    user_id = %identity.user_id,
                    "📋 Duplicate player id in roster, keeping the first entry"
                );
                continue;
            }

            identities.push(identity);
        }

        Ok(identities)
    }
}

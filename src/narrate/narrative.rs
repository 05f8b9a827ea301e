use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{ChatBackend, MatchDigest, TextGenerator};
use crate::opendota::{GameConstants, MatchDetail};
use crate::roster::TrackedIdentity;

/// Sent whenever the backend cannot produce anything usable.
pub const FALLBACK_TEXT: &str = "In case you needed a reminder of your ACTUAL MMR.";

/// Summarizes the player's game and asks a language model to comment on it.
pub struct NarrativeGenerator<B> {
    constants: Arc<GameConstants>,
    backend: B,
}

impl<B: ChatBackend> NarrativeGenerator<B> {
    pub fn new(constants: Arc<GameConstants>, backend: B) -> Self {
        Self { constants, backend }
    }
}

#[async_trait]
impl<B: ChatBackend> TextGenerator for NarrativeGenerator<B> {
    async fn generate(&self, detail: &MatchDetail, identity: &TrackedIdentity) -> String {
        let Some(player) = detail.participant(&identity.player_id) else {
            warn!(
                player_id = %identity.player_id,
                match_id = detail.match_id,
                "✍️ Player not found among participants, sending fallback text"
            );
            return FALLBACK_TEXT.to_string();
        };

        let prompt = MatchDigest::from_player(player, &self.constants).to_prompt();
        debug!(match_id = detail.match_id, "✍️ Requesting narrative");

        match self.backend.complete(&prompt).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                warn!(match_id = detail.match_id, "✍️ ⚠️ Backend returned empty text");
                FALLBACK_TEXT.to_string()
            }
            Err(e) => {
                warn!(error = %e, match_id = detail.match_id, "✍️ ⚠️ Text backend unavailable");
                FALLBACK_TEXT.to_string()
            }
        }
    }
}

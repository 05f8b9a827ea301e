use async_trait::async_trait;

use super::client::OpenDotaClient;
use super::types::{MatchDetail, MatchId, MatchSummary, StatsResponse};

/// Read side of the statistics provider, as consumed by the watch loop.
#[async_trait]
pub trait StatsProvider: Send + Sync {
    /// Most recent match of `player_id`, `None` when the player has none.
    async fn latest_match(&self, player_id: &str) -> StatsResponse<Option<MatchSummary>>;

    async fn match_detail(&self, match_id: MatchId) -> StatsResponse<MatchDetail>;
}

#[async_trait]
impl StatsProvider for OpenDotaClient {
    async fn latest_match(&self, player_id: &str) -> StatsResponse<Option<MatchSummary>> {
        let matches = self.get_recent_matches(player_id).await?;
        Ok(matches.into_iter().next())
    }

    async fn match_detail(&self, match_id: MatchId) -> StatsResponse<MatchDetail> {
        self.get_match(match_id).await
    }
}

use crate::opendota::client::OpenDotaClient;
use crate::opendota::metrics::Endpoint;
use crate::opendota::types::{MatchSummary, StatsResponse};

impl OpenDotaClient {
    /// Recent matches of a player, most recent first.
    pub async fn get_recent_matches(&self, player_id: &str) -> StatsResponse<Vec<MatchSummary>> {
        let url = format!(
            "{}/players/{}/recentMatches",
            self.base_url(),
            urlencoding::encode(player_id)
        );

        self.get(Endpoint::RecentMatches, &url).await
    }
}

use serde_json::Value;

use crate::opendota::client::OpenDotaClient;
use crate::opendota::metrics::Endpoint;
use crate::opendota::types::{MatchDetail, MatchId, StatsResponse};

impl OpenDotaClient {
    /// Full match details by match id.
    pub async fn get_match(&self, match_id: MatchId) -> StatsResponse<MatchDetail> {
        let url = format!("{}/matches/{}", self.base_url(), match_id);

        let raw: Value = self.get(Endpoint::Match, &url).await?;
        Ok(MatchDetail::from_value(raw)?)
    }
}

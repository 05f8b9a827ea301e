use reqwest::StatusCode;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

/// Every failure here means "skip this player for the current cycle".
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("Reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("HTTP status error: {0}")]
    Status(StatusCode),

    #[error("Decoding raw response error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A call to OpenDota either succeeds with the requested type or fails with a [`StatsError`].
pub type StatsResponse<T> = Result<T, StatsError>;

pub type MatchId = u64;

/// Public OpenDota page of a match.
pub fn permalink(match_id: MatchId) -> String {
    format!("https://www.opendota.com/matches/{match_id}")
}

/// One entry of `/players/{id}/recentMatches`. Only the id is used.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchSummary {
    pub match_id: MatchId,
}

/// Full `/matches/{id}` payload: a typed view over the players plus the raw
/// document, which is what gets archived.
#[derive(Debug, Clone)]
pub struct MatchDetail {
    pub match_id: MatchId,
    pub players: Vec<MatchPlayer>,
    raw: Value,
}

#[derive(Deserialize)]
struct MatchShape {
    match_id: MatchId,
    #[serde(default, deserialize_with = "null_as_default")]
    players: Vec<MatchPlayer>,
}

impl MatchDetail {
    pub fn from_value(raw: Value) -> Result<Self, serde_json::Error> {
        let shape = MatchShape::deserialize(&raw)?;

        Ok(Self {
            match_id: shape.match_id,
            players: shape.players,
            raw,
        })
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// The participant record belonging to `player_id`, matched on account id.
    pub fn participant(&self, player_id: &str) -> Option<&MatchPlayer> {
        let account_id: u64 = player_id.trim().parse().ok()?;

        self.players
            .iter()
            .find(|p| p.account_id == Some(account_id))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchPlayer {
    /// Absent for anonymous profiles.
    #[serde(default)]
    pub account_id: Option<u64>,
    #[serde(default)]
    pub hero_id: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub kills: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub deaths: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub assists: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub gold_per_min: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub xp_per_min: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_hits: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub item_0: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub item_1: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub item_2: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub item_3: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub item_4: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub item_5: u32,
    /// Only present on parsed replays.
    #[serde(default, deserialize_with = "null_as_default")]
    pub purchase_log: Vec<PurchaseEntry>,
    /// Cumulative last hits per minute, only present on parsed replays.
    #[serde(default, deserialize_with = "null_as_default")]
    pub lh_t: Vec<u32>,
}

impl MatchPlayer {
    /// Inventory item ids (0 = empty slot).
    pub fn items(&self) -> [u32; 6] {
        [
            self.item_0,
            self.item_1,
            self.item_2,
            self.item_3,
            self.item_4,
            self.item_5,
        ]
    }

    pub fn scoreline(&self) -> String {
        format!("{}/{}/{}", self.kills, self.deaths, self.assists)
    }

    pub fn last_hits_at(&self, minute: usize) -> Option<u32> {
        self.lh_t.get(minute).copied()
    }

    /// Game time in seconds of the first purchase of `item_key`.
    pub fn purchase_time(&self, item_key: &str) -> Option<i64> {
        self.purchase_log
            .iter()
            .find(|entry| entry.key == item_key)
            .map(|entry| entry.time)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PurchaseEntry {
    #[serde(default)]
    pub time: i64,
    #[serde(default)]
    pub key: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

//! OpenDota REST client, match payload types and the dotaconstants lookup
//! tables.

mod client;
mod constants;
mod endpoints;
mod metrics;
mod traits;
mod types;

pub use client::OpenDotaClient;
pub use constants::GameConstants;
pub use metrics::{Endpoint, RequestMetrics};
pub use traits::StatsProvider;
pub use types::{
    MatchDetail, MatchId, MatchPlayer, MatchSummary, PurchaseEntry, StatsError, StatsResponse,
    permalink,
};

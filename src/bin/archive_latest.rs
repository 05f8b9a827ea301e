//! Fetch and archive the latest match of every roster entry, once. Matches
//! already in the archive are not fetched again. Nothing is announced and the
//! seen-match store is left alone.

use std::process::ExitCode;

use dotawatch::config::StatsConfig;
use dotawatch::logging;
use dotawatch::opendota::{OpenDotaClient, RequestMetrics, StatsProvider};
use dotawatch::poller::WatchError;
use dotawatch::roster::{Roster, TrackedIdentity};
use dotawatch::store::{ArchiveOutcome, MatchArchive};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    logging::init();

    let config = StatsConfig::from_env();

    let roster = match Roster::load(&config.roster_path) {
        Ok(roster) => roster,
        Err(e) => {
            error!(error = %e, path = %config.roster_path.display(), "❌ Cannot load roster");
            return ExitCode::FAILURE;
        }
    };

    let metrics = RequestMetrics::new("opendota");
    let client = match OpenDotaClient::new(
        &config.opendota_base_url,
        config.http_timeout,
        metrics.clone(),
    ) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "❌ Cannot build HTTP client");
            return ExitCode::FAILURE;
        }
    };
    let archive = MatchArchive::new(&config.archive_dir);

    let mut stored = 0;
    for identity in &roster {
        match archive_latest(&client, &archive, identity).await {
            Ok(true) => stored += 1,
            Ok(false) => {}
            Err(e) => warn!(error = %e, player_id = %identity.player_id, "⚠️ Skipping player"),
        }
    }

    info!(
        players = roster.len(),
        stored,
        requests = metrics.total(),
        endpoints = %metrics.breakdown(),
        "🗄️ Archive pass finished"
    );
    ExitCode::SUCCESS
}

/// Returns whether a new file was written.
async fn archive_latest(
    client: &OpenDotaClient,
    archive: &MatchArchive,
    identity: &TrackedIdentity,
) -> Result<bool, WatchError> {
    let Some(latest) = client.latest_match(&identity.player_id).await? else {
        info!(player_id = %identity.player_id, "No matches found");
        return Ok(false);
    };

    if archive.contains(&identity.player_id, latest.match_id).await? {
        info!(
            player_id = %identity.player_id,
            match_id = latest.match_id,
            "Match already archived"
        );
        return Ok(false);
    }

    let detail = client.match_detail(latest.match_id).await?;

    match archive.archive(&identity.player_id, latest.match_id, &detail).await? {
        ArchiveOutcome::Stored(path) => {
            info!(
                player_id = %identity.player_id,
                match_id = latest.match_id,
                path = %path.display(),
                "Saved match"
            );
            Ok(true)
        }
        ArchiveOutcome::AlreadyExists(_) => Ok(false),
    }
}

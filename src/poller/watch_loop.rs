use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{Span, debug, error, info, instrument, warn};

use crate::discord::{MessageSender, NotificationMessage, Notifier};
use crate::narrate::TextGenerator;
use crate::opendota::{MatchId, StatsError, StatsProvider, permalink};
use crate::roster::{Roster, RosterError, TrackedIdentity};
use crate::store::{ArchiveOutcome, MatchArchive, SeenMatchStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("Roster unavailable: {0}")]
    Roster(#[from] RosterError),

    #[error("OpenDota request failed: {0}")]
    Stats(#[from] StatsError),

    #[error("Persistence failure: {0}")]
    Persistence(#[from] StoreError),

    #[error("Pipeline panicked: {0}")]
    Panicked(String),
}

/// How far one roster entry got during a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOutcome {
    /// The provider has no match for this player.
    NotFound,
    /// Latest match was already announced.
    NoChange,
    /// New match archived, announced (or attempted when `delivered` is false)
    /// and recorded as seen.
    Notified { match_id: MatchId, delivered: bool },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub identities: usize,
    pub not_found: usize,
    pub unchanged: usize,
    pub notified: usize,
    pub undelivered: usize,
    pub failed: usize,
}

impl CycleReport {
    fn record(&mut self, outcome: EntryOutcome) {
        match outcome {
            EntryOutcome::NotFound => self.not_found += 1,
            EntryOutcome::NoChange => self.unchanged += 1,
            EntryOutcome::Notified { delivered, .. } => {
                self.notified += 1;
                if !delivered {
                    self.undelivered += 1;
                }
            }
        }
    }
}

/// Periodically checks every tracked player for a new match and announces it
/// once.
pub struct WatchLoop<P, S> {
    provider: P,
    generator: Arc<dyn TextGenerator>,
    notifier: Notifier<S>,
    seen: Arc<SeenMatchStore>,
    archive: MatchArchive,
    roster_path: PathBuf,
    poll_interval: Duration,
}

impl<P, S> WatchLoop<P, S>
where
    P: StatsProvider + 'static,
    S: MessageSender + 'static,
{
    pub fn new(
        provider: P,
        generator: Arc<dyn TextGenerator>,
        notifier: Notifier<S>,
        seen: Arc<SeenMatchStore>,
        archive: MatchArchive,
        roster_path: impl Into<PathBuf>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            provider,
            generator,
            notifier,
            seen,
            archive,
            roster_path: roster_path.into(),
            poll_interval,
        }
    }

    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    /// Run cycles forever. Entries are processed one after another; a cycle
    /// outliving the interval makes the next tick get skipped rather than
    /// queued.
    pub async fn run(&self) {
        let mut interval = interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            interval_secs = self.poll_interval.as_secs(),
            "🔄 Watch loop started"
        );

        loop {
            interval.tick().await;
            let started = Instant::now();

            match self.poll_once().await {
                Ok(report) => info!(
                    identities = report.identities,
                    notified = report.notified,
                    unchanged = report.unchanged,
                    not_found = report.not_found,
                    failed = report.failed,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "🔄 Cycle finished"
                ),
                Err(e) => error!(error = %e, "🔄 ❌ Cycle skipped"),
            }

            if started.elapsed() > self.poll_interval {
                warn!(
                    elapsed_secs = started.elapsed().as_secs(),
                    interval_secs = self.poll_interval.as_secs(),
                    "🔄 ⚠️ Cycle overran the interval, skipping the missed tick"
                );
            }
        }
    }

    /// One pass over the roster. Only roster or seen-store read failures abort
    /// the cycle; per-player failures are logged and counted.
    #[instrument(skip_all, fields(identities))]
    pub async fn poll_once(&self) -> Result<CycleReport, WatchError> {
        let seen = self.seen.load().await?;
        let roster = Roster::load_async(&self.roster_path).await?;

        Span::current().record("identities", roster.len());
        debug!(
            identities = roster.len(),
            seen = seen.len(),
            "🔄 Checking for new matches"
        );

        let mut report = CycleReport {
            identities: roster.len(),
            ..Default::default()
        };

        for identity in &roster {
            let result = AssertUnwindSafe(self.process_identity(identity))
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| Err(WatchError::Panicked(panic_message(panic))));

            match result {
                Ok(outcome) => report.record(outcome),
                Err(e) => {
                    report.failed += 1;
                    log_entry_failure(identity, &e);
                }
            }
        }

        Ok(report)
    }

    /// Per-player pipeline: latest match, dedup, detail, archive, notify,
    /// record. Returning early at any step leaves the seen store untouched.
    #[instrument(
        skip(self, identity),
        fields(player_id = %identity.player_id, user_id = %identity.user_id)
    )]
    pub async fn process_identity(
        &self,
        identity: &TrackedIdentity,
    ) -> Result<EntryOutcome, WatchError> {
        let Some(latest) = self.provider.latest_match(&identity.player_id).await? else {
            debug!("🔄 No matches found");
            return Ok(EntryOutcome::NotFound);
        };
        let match_id = latest.match_id;

        if self.seen.is_seen(&identity.player_id, match_id).await {
            debug!(match_id, "🔄 No new match");
            return Ok(EntryOutcome::NoChange);
        }

        info!(match_id, "🔄 ✅ New match detected");

        let detail = self.provider.match_detail(match_id).await?;

        // Archive presence is not a dedup signal, only the seen store is.
        match self.archive.archive(&identity.player_id, match_id, &detail).await? {
            ArchiveOutcome::Stored(path) => {
                debug!(match_id, path = %path.display(), "🗄️ Match stored")
            }
            ArchiveOutcome::AlreadyExists(path) => {
                debug!(match_id, path = %path.display(), "🗄️ Match was already archived")
            }
        }

        let message = NotificationMessage {
            target_user_id: identity.user_id.clone(),
            body_text: self.generator.generate(&detail, identity).await,
            permalink: permalink(match_id),
        };

        let delivered = match self.notifier.notify(&message).await {
            Ok(()) => {
                info!(match_id, "✉️ Notification sent");
                true
            }
            Err(e) => {
                error!(error = %e, match_id, "✉️ ❌ Failed to send notification");
                false
            }
        };

        self.seen.record_seen(&identity.player_id, match_id).await?;

        Ok(EntryOutcome::Notified {
            match_id,
            delivered,
        })
    }
}

fn log_entry_failure(identity: &TrackedIdentity, e: &WatchError) {
    match e {
        WatchError::Persistence(_) | WatchError::Panicked(_) => error!(
            error = %e,
            player_id = %identity.player_id,
            user_id = %identity.user_id,
            "🔄 ❌ Failed to process player"
        ),
        WatchError::Stats(_) | WatchError::Roster(_) => warn!(
            error = %e,
            player_id = %identity.player_id,
            user_id = %identity.user_id,
            "🔄 ⚠️ Skipping player this cycle"
        ),
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

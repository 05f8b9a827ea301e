use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::{Instrument, info, info_span};

/// OpenDota resources we call, used as metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Endpoint {
    RecentMatches,
    Match,
    Constants,
}

impl Endpoint {
    pub fn label(self) -> &'static str {
        match self {
            Endpoint::RecentMatches => "recentMatches",
            Endpoint::Match => "matches",
            Endpoint::Constants => "constants",
        }
    }
}

/// Outbound request counters, total and per endpoint. A summary is logged
/// once a minute by [`RequestMetrics::log_loop`].
#[derive(Debug)]
pub struct RequestMetrics {
    start: Instant,
    total: AtomicU64,
    per_endpoint: Mutex<BTreeMap<Endpoint, u64>>,
    name: &'static str,
}

impl RequestMetrics {
    pub fn new(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            start: Instant::now(),
            total: AtomicU64::new(0),
            per_endpoint: Mutex::new(BTreeMap::new()),
            name,
        })
    }

    pub fn inc(&self, endpoint: Endpoint) {
        self.total.fetch_add(1, Ordering::Relaxed);
        // Poisoning only means another thread panicked mid-increment.
        let mut counts = self
            .per_endpoint
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *counts.entry(endpoint).or_default() += 1;
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    pub fn count(&self, endpoint: Endpoint) -> u64 {
        self.snapshot().get(&endpoint).copied().unwrap_or(0)
    }

    fn snapshot(&self) -> BTreeMap<Endpoint, u64> {
        self.per_endpoint
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// `recentMatches=12 matches=3` style breakdown, in endpoint order.
    pub fn breakdown(&self) -> String {
        self.snapshot()
            .into_iter()
            .map(|(endpoint, n)| format!("{}={n}", endpoint.label()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub async fn log_loop(self: Arc<Self>) {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        interval.tick().await;

        loop {
            interval.tick().await;
            let total = self.total();
            let elapsed_min = self.start.elapsed().as_secs_f64() / 60.0;
            let per_min = if elapsed_min > 0.0 {
                total as f64 / elapsed_min
            } else {
                0.0
            };

            async {
                info!(
                    total,
                    per_min = %format!("{per_min:.2}"),
                    endpoints = %self.breakdown(),
                    "📊 OpenDota requests since start"
                );
            }
            .instrument(info_span!("📊", client = self.name))
            .await
        }
    }
}

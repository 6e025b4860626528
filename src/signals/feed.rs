//! Signal feed synchronizer: a poller over the feed that flags newly arrived ids.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::core::poller::{Applied, PollState, Poller};
use crate::core::tier::TierReader;
use crate::error::FetchError;
use crate::metrics::Metrics;
use crate::models::{SignalEntry, SignalId};
use crate::services::api::DashboardApi;

/// First id in `current` (in its given order) that is absent from `previous`.
///
/// Only one id is reported even when several arrived in the same refresh.
pub fn detect_newest(previous: &[SignalEntry], current: &[SignalEntry]) -> Option<SignalId> {
    let known: HashSet<SignalId> = previous.iter().map(|entry| entry.id).collect();
    current
        .iter()
        .map(|entry| entry.id)
        .find(|id| !known.contains(id))
}

pub struct FeedSynchronizer {
    poller: Poller<Vec<SignalEntry>>,
    newest: watch::Receiver<Option<SignalId>>,
    tier: TierReader,
}

impl FeedSynchronizer {
    /// Feed for the tier currently held by `tier`, re-read on every attempt
    pub fn new(
        api: Arc<dyn DashboardApi>,
        tier: TierReader,
        limit: usize,
        interval: Duration,
        metrics: Option<Arc<Metrics>>,
    ) -> Self {
        let fetch_tier = tier.clone();
        let (newest_tx, newest_rx) = watch::channel(None);

        let poller = Poller::builder("signals", interval, move || {
            let api = api.clone();
            let plan = fetch_tier.current();
            async move { api.fetch_signals(plan, limit).await }
        })
        .on_refresh(move |previous, current| {
            // The initial load has nothing to compare against
            let flagged = previous.and_then(|previous| detect_newest(previous, current));
            if let Some(id) = flagged {
                debug!(signal_id = %id, "FeedSynchronizer: new signal arrived");
            }
            // Superseded on every refresh, even when nothing new arrived
            newest_tx.send_replace(flagged);
        })
        .metrics(metrics)
        .build();

        Self {
            poller,
            newest: newest_rx,
            tier,
        }
    }

    pub async fn start(&self) {
        self.poller.start().await;
    }

    pub async fn stop(&self) {
        self.poller.stop().await;
    }

    pub async fn refresh_now(&self) -> Result<Applied, FetchError> {
        self.poller.refresh_now().await
    }

    /// Refresh immediately whenever the active tier changes, since the tier is
    /// part of the feed request.
    pub fn spawn_tier_watch(&self) -> tokio::task::JoinHandle<()> {
        let mut tier = self.tier.clone();
        let poller = self.poller.clone();
        tokio::spawn(async move {
            while let Some(current) = tier.changed().await {
                info!(tier = %current, "FeedSynchronizer: tier changed, refreshing feed");
                // Failures are already logged by the poller
                let _ = poller.refresh_now().await;
            }
        })
    }

    pub fn entries(&self) -> Vec<SignalEntry> {
        self.poller.data().unwrap_or_default()
    }

    pub fn snapshot(&self) -> PollState<Vec<SignalEntry>> {
        self.poller.snapshot()
    }

    pub fn is_loading(&self) -> bool {
        self.poller.is_loading()
    }

    /// Id flagged by the most recent refresh, if any
    pub fn newest(&self) -> Option<SignalId> {
        *self.newest.borrow()
    }

    pub fn subscribe_newest(&self) -> watch::Receiver<Option<SignalId>> {
        self.newest.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PollState<Vec<SignalEntry>>> {
        self.poller.subscribe()
    }

    pub fn tier(&self) -> &TierReader {
        &self.tier
    }
}

//! Top-level composition of the live data sources.
//!
//! Four independent pollers (signals, watchlist, market overview, chart) each
//! own their own timer. The tier reader drives feed parameters and gating.

use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use super::poller::{PollState, Poller};
use super::tier::TierReader;
use crate::config::DashboardConfig;
use crate::metrics::Metrics;
use crate::models::{ChartPoint, MarketOverview, SignalEntry, SignalId, Tier};
use crate::services::api::DashboardApi;
use crate::signals::{gate, FeedFilter, FeedStats, FeedSynchronizer, GatedSignal, HighlightTracker};
use crate::watchlist::WatchlistStore;

/// Render-ready snapshot of the signal feed
#[derive(Debug, Clone)]
pub struct FeedView {
    pub tier: Tier,
    pub loading: bool,
    /// Filtered entries in feed order
    pub entries: Vec<SignalEntry>,
    pub highlighted: Option<SignalId>,
    /// Over the full unfiltered feed
    pub stats: FeedStats,
}

impl FeedView {
    pub fn gated(&self) -> Vec<GatedSignal<'_>> {
        gate(&self.entries, self.tier)
    }

    pub fn is_highlighted(&self, id: SignalId) -> bool {
        self.highlighted == Some(id)
    }
}

pub struct Dashboard {
    feed: FeedSynchronizer,
    watchlist: WatchlistStore,
    markets: Poller<MarketOverview>,
    chart: Poller<Vec<ChartPoint>>,
    tier: TierReader,
    highlight: Arc<RwLock<HighlightTracker>>,
    tasks: Arc<RwLock<Vec<JoinHandle<()>>>>,
}

impl Dashboard {
    pub fn new(
        api: Arc<dyn DashboardApi>,
        tier: TierReader,
        config: &DashboardConfig,
        metrics: Option<Arc<Metrics>>,
    ) -> Self {
        let feed = FeedSynchronizer::new(
            api.clone(),
            tier.clone(),
            config.signal_limit,
            config.signals_interval,
            metrics.clone(),
        );
        let watchlist = WatchlistStore::new(api.clone(), config.watchlist_interval, metrics.clone());

        let markets_api = api.clone();
        let markets = Poller::builder("markets", config.markets_interval, move || {
            let api = markets_api.clone();
            async move { api.fetch_market_overview().await }
        })
        .metrics(metrics.clone())
        .build();

        let chart_api = api;
        let chart = Poller::builder("chart", config.chart_interval, move || {
            let api = chart_api.clone();
            async move { api.fetch_chart_data().await }
        })
        .metrics(metrics)
        .build();

        Self {
            feed,
            watchlist,
            markets,
            chart,
            tier,
            highlight: Arc::new(RwLock::new(HighlightTracker::new(config.highlight_duration))),
            tasks: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Start every poller plus the highlight and tier-watch tasks; a second call
    /// while running does nothing
    pub async fn start(&self) {
        let mut tasks = self.tasks.write().await;
        if !tasks.is_empty() {
            debug!("Dashboard: already running");
            return;
        }

        tokio::join!(
            self.feed.start(),
            self.watchlist.start(),
            self.markets.start(),
            self.chart.start(),
        );

        let mut newest = self.feed.subscribe_newest();
        let highlight = self.highlight.clone();
        let highlight_task = tokio::spawn(async move {
            while newest.changed().await.is_ok() {
                let flagged = *newest.borrow_and_update();
                highlight.write().await.observe(flagged, Instant::now());
            }
        });

        tasks.push(self.feed.spawn_tier_watch());
        tasks.push(highlight_task);

        info!(tier = %self.tier.current(), "Dashboard: started");
    }

    /// Stop every poller; nothing in flight is applied afterwards
    pub async fn stop(&self) {
        tokio::join!(
            self.feed.stop(),
            self.watchlist.stop(),
            self.markets.stop(),
            self.chart.stop(),
        );
        for task in self.tasks.write().await.drain(..) {
            task.abort();
        }
        info!("Dashboard: stopped");
    }

    pub async fn feed_view(&self, filter: FeedFilter) -> FeedView {
        let snapshot = self.feed.snapshot();
        let all = snapshot.data.unwrap_or_default();
        let stats = FeedStats::from_entries(&all);
        let entries = filter.apply(&all).into_iter().cloned().collect();
        let highlighted = self.highlight.read().await.active(Instant::now());

        FeedView {
            tier: self.tier.current(),
            loading: snapshot.loading,
            entries,
            highlighted,
            stats,
        }
    }

    pub fn feed(&self) -> &FeedSynchronizer {
        &self.feed
    }

    pub fn watchlist(&self) -> &WatchlistStore {
        &self.watchlist
    }

    pub fn market_overview(&self) -> PollState<MarketOverview> {
        self.markets.snapshot()
    }

    pub fn chart_data(&self) -> PollState<Vec<ChartPoint>> {
        self.chart.snapshot()
    }

    pub fn tier(&self) -> Tier {
        self.tier.current()
    }
}

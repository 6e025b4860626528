//! User watchlist backed entirely by the server.
//!
//! Mutations never patch local state: every successful create/delete is
//! followed by a full reload, so the held list is always the last successful
//! load.

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::core::poller::{Applied, PollState, Poller};
use crate::error::{ValidationError, WatchlistError};
use crate::metrics::Metrics;
use crate::models::WatchlistItem;
use crate::services::api::DashboardApi;

/// Trimmed, upper-cased ticker; empty input is rejected
pub fn normalize_ticker(raw: &str) -> Result<String, ValidationError> {
    let ticker = raw.trim().to_uppercase();
    if ticker.is_empty() {
        return Err(ValidationError::new("Ticker is required"));
    }
    Ok(ticker)
}

pub struct WatchlistStore {
    api: Arc<dyn DashboardApi>,
    poller: Poller<Vec<WatchlistItem>>,
}

impl WatchlistStore {
    pub fn new(api: Arc<dyn DashboardApi>, interval: Duration, metrics: Option<Arc<Metrics>>) -> Self {
        let fetch_api = api.clone();
        let poller = Poller::builder("watchlist", interval, move || {
            let api = fetch_api.clone();
            async move { api.fetch_watchlist().await }
        })
        .metrics(metrics)
        .build();

        Self { api, poller }
    }

    pub async fn start(&self) {
        self.poller.start().await;
    }

    pub async fn stop(&self) {
        self.poller.stop().await;
    }

    /// Replace held state with the server's list.
    ///
    /// After [`stop`](Self::stop) nothing is applied and this returns
    /// [`WatchlistError::Stopped`], including the reload that follows a
    /// mutation the server already accepted.
    pub async fn load(&self) -> Result<(), WatchlistError> {
        match self.poller.refresh_now().await? {
            Applied::TornDown => Err(WatchlistError::Stopped),
            // A newer reload already replaced the list
            Applied::Yes | Applied::Superseded => Ok(()),
        }
    }

    pub async fn add(&self, ticker: &str, name: &str) -> Result<(), WatchlistError> {
        let ticker = normalize_ticker(ticker)?;
        let name = match name.trim() {
            "" => ticker.clone(),
            trimmed => trimmed.to_string(),
        };

        if let Err(e) = self.api.add_to_watchlist(&ticker, &name).await {
            warn!(ticker = %ticker, error = %e, "Watchlist: add failed");
            return Err(e.into());
        }
        info!(ticker = %ticker, "Watchlist: added {}", ticker);

        self.load().await
    }

    pub async fn remove(&self, ticker: &str) -> Result<(), WatchlistError> {
        let ticker = normalize_ticker(ticker)?;

        if let Err(e) = self.api.remove_from_watchlist(&ticker).await {
            warn!(ticker = %ticker, error = %e, "Watchlist: remove failed");
            return Err(e.into());
        }
        info!(ticker = %ticker, "Watchlist: removed {}", ticker);

        self.load().await
    }

    pub fn items(&self) -> Vec<WatchlistItem> {
        self.poller.data().unwrap_or_default()
    }

    pub fn snapshot(&self) -> PollState<Vec<WatchlistItem>> {
        self.poller.snapshot()
    }

    pub fn is_loading(&self) -> bool {
        self.poller.is_loading()
    }

    pub fn contains(&self, ticker: &str) -> bool {
        let ticker = ticker.trim().to_uppercase();
        self.items().iter().any(|item| item.ticker == ticker)
    }
}

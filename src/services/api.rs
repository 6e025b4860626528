//! Backend interface consumed by the pollers, the watchlist and enrollment.

use async_trait::async_trait;

use crate::error::FetchError;
use crate::models::{
    ChartPoint, MarketOverview, SignalEntry, SignupRequest, SignupResponse, Tier, VerifyRequest,
    VerifyResponse, WatchlistItem,
};

#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// Newest-relevant-first feed for a plan, at most `limit` entries
    async fn fetch_signals(&self, plan: Tier, limit: usize)
        -> Result<Vec<SignalEntry>, FetchError>;

    async fn fetch_watchlist(&self) -> Result<Vec<WatchlistItem>, FetchError>;

    async fn add_to_watchlist(&self, ticker: &str, name: &str) -> Result<(), FetchError>;

    async fn remove_from_watchlist(&self, ticker: &str) -> Result<(), FetchError>;

    async fn fetch_market_overview(&self) -> Result<MarketOverview, FetchError>;

    async fn fetch_chart_data(&self) -> Result<Vec<ChartPoint>, FetchError>;

    async fn beta_signup(&self, request: &SignupRequest) -> Result<SignupResponse, FetchError>;

    async fn beta_verify(&self, request: &VerifyRequest) -> Result<VerifyResponse, FetchError>;
}

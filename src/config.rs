//! Environment-driven configuration

use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

use crate::models::Tier;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Deployment environment (`production`, `sandbox`, ...)
pub fn get_environment() -> String {
    env::var("APP_ENV")
        .or_else(|_| env::var("ENVIRONMENT"))
        .unwrap_or_else(|_| "sandbox".to_string())
        .to_lowercase()
}

pub fn get_api_base_url() -> String {
    env::var("FINSIGHT_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string())
}

/// Polling cadences and view settings for the dashboard
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub api_base_url: String,
    pub signals_interval: Duration,
    pub watchlist_interval: Duration,
    pub markets_interval: Duration,
    pub chart_interval: Duration,
    pub signal_limit: usize,
    pub highlight_duration: Duration,
    pub http_timeout: Duration,
    pub initial_tier: Tier,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            signals_interval: Duration::from_secs(60),
            watchlist_interval: Duration::from_secs(60),
            markets_interval: Duration::from_secs(60),
            chart_interval: Duration::from_secs(300),
            signal_limit: 50,
            highlight_duration: Duration::from_millis(3000),
            http_timeout: Duration::from_secs(15),
            initial_tier: Tier::Free,
        }
    }
}

impl DashboardConfig {
    /// Build from environment variables, falling back to defaults for anything
    /// missing, unparsable or zero.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_base_url: get_api_base_url(),
            signals_interval: Duration::from_secs(positive_var(
                "SIGNALS_POLL_SECONDS",
                defaults.signals_interval.as_secs(),
            )),
            watchlist_interval: Duration::from_secs(positive_var(
                "WATCHLIST_POLL_SECONDS",
                defaults.watchlist_interval.as_secs(),
            )),
            markets_interval: Duration::from_secs(positive_var(
                "MARKETS_POLL_SECONDS",
                defaults.markets_interval.as_secs(),
            )),
            chart_interval: Duration::from_secs(positive_var(
                "CHART_POLL_SECONDS",
                defaults.chart_interval.as_secs(),
            )),
            signal_limit: positive_var("SIGNAL_LIMIT", defaults.signal_limit as u64) as usize,
            highlight_duration: Duration::from_millis(positive_var(
                "HIGHLIGHT_MILLIS",
                defaults.highlight_duration.as_millis() as u64,
            )),
            http_timeout: Duration::from_secs(positive_var(
                "HTTP_TIMEOUT_SECONDS",
                defaults.http_timeout.as_secs(),
            )),
            initial_tier: parsed_var("FINSIGHT_PLAN", defaults.initial_tier),
        }
    }
}

fn positive_var(key: &str, default: u64) -> u64 {
    match parsed_var::<u64>(key, default) {
        0 => {
            warn!(key = key, default = default, "{} must be > 0, using default", key);
            default
        }
        value => value,
    }
}

fn parsed_var<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!(key = key, value = %raw, "Ignoring invalid value for {}", key);
                default
            }
        },
        Err(_) => default,
    }
}

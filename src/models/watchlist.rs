use serde::{Deserialize, Serialize};

/// Tracked instrument; price fields arrive asynchronously from the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistItem {
    pub ticker: String,
    pub name: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub change_pct: Option<f64>,
}

impl WatchlistItem {
    /// No quote yet for this ticker
    pub fn is_loading(&self) -> bool {
        self.price.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AddTickerRequest {
    pub ticker: String,
    pub name: String,
}

//! Market snapshot records (`/api/markets/overview`, `/api/chart-data`)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub price: f64,
    pub change_pct: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketOverview {
    #[serde(default)]
    pub indices: BTreeMap<String, Quote>,
    #[serde(default)]
    pub commodities: BTreeMap<String, Quote>,
    #[serde(default)]
    pub crypto: BTreeMap<String, Quote>,
}

impl MarketOverview {
    pub fn instrument_count(&self) -> usize {
        self.indices.len() + self.commodities.len() + self.crypto.len()
    }
}

/// Hourly signal activity bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub time: String,
    pub buy: u32,
    pub sell: u32,
    pub avoid: u32,
    pub watch: u32,
}

impl ChartPoint {
    pub fn total(&self) -> u32 {
        self.buy + self.sell + self.avoid + self.watch
    }
}

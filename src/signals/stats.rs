//! Feed filtering and aggregate statistics

use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{Market, SignalEntry, SignalKind};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedFilter {
    pub market: Option<Market>,
    pub signal: Option<SignalKind>,
}

impl FeedFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_market(mut self, market: Market) -> Self {
        self.market = Some(market);
        self
    }

    pub fn with_signal(mut self, signal: SignalKind) -> Self {
        self.signal = Some(signal);
        self
    }

    pub fn matches(&self, entry: &SignalEntry) -> bool {
        let market_ok = self.market.map_or(true, |m| entry.market == Some(m));
        let signal_ok = self.signal.map_or(true, |s| entry.signal == s);
        market_ok && signal_ok
    }

    /// Matching entries, feed order preserved
    pub fn apply<'a>(&self, entries: &'a [SignalEntry]) -> Vec<&'a SignalEntry> {
        entries.iter().filter(|entry| self.matches(entry)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedStats {
    pub total: usize,
    pub counts: BTreeMap<&'static str, usize>,
    pub avg_confidence: f64,
}

impl FeedStats {
    /// Computed over the whole feed, including entries the gate obscures
    pub fn from_entries(entries: &[SignalEntry]) -> Self {
        let mut counts: BTreeMap<&'static str, usize> =
            SignalKind::ALL.iter().map(|kind| (kind.as_str(), 0)).collect();
        let mut total_confidence = 0.0;

        for entry in entries {
            *counts.entry(entry.signal.as_str()).or_insert(0) += 1;
            total_confidence += entry.confidence;
        }

        let avg_confidence = if entries.is_empty() {
            0.0
        } else {
            (total_confidence / entries.len() as f64 * 100.0).round() / 100.0
        };

        Self {
            total: entries.len(),
            counts,
            avg_confidence,
        }
    }

    pub fn count(&self, kind: SignalKind) -> usize {
        self.counts.get(kind.as_str()).copied().unwrap_or(0)
    }
}

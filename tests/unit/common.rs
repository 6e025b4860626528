//! Shared fixtures for unit tests

use chrono::{TimeZone, Utc};
use finsight::models::{Market, SignalEntry, SignalId, SignalKind};

pub fn entry(id: i64, signal: SignalKind) -> SignalEntry {
    SignalEntry {
        id: SignalId(id),
        signal,
        tickers: vec!["BHP.AX".to_string()],
        confidence: 0.8,
        impact: 0.4,
        credibility: 0.9,
        published_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap(),
        title: format!("Signal number {}", id),
        summary: "Summary".to_string(),
        reasoning: "Reasoning".to_string(),
        signal_logic: None,
        pump_dump_risk: None,
        market: Some(Market::Asx),
        source: Some("Reuters".to_string()),
        ingested_at: None,
        is_twitter: false,
        twitter_handle: None,
    }
}

pub fn entries(ids: &[i64]) -> Vec<SignalEntry> {
    ids.iter().map(|id| entry(*id, SignalKind::Buy)).collect()
}

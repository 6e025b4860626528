//! Signal feed entries as served by `GET /api/signals`

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignalId(pub i64);

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for SignalId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalKind {
    Buy,
    Sell,
    Avoid,
    Watch,
}

impl SignalKind {
    pub const ALL: [SignalKind; 4] = [
        SignalKind::Buy,
        SignalKind::Sell,
        SignalKind::Avoid,
        SignalKind::Watch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::Buy => "BUY",
            SignalKind::Sell => "SELL",
            SignalKind::Avoid => "AVOID",
            SignalKind::Watch => "WATCH",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PumpDumpRisk {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Market {
    Asx,
    Us,
    Crypto,
    Commodity,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEntry {
    pub id: SignalId,
    pub signal: SignalKind,
    #[serde(default)]
    pub tickers: Vec<String>,
    pub confidence: f64,
    pub impact: f64,
    pub credibility: f64,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub published_at: DateTime<Utc>,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub signal_logic: Option<String>,
    #[serde(default)]
    pub pump_dump_risk: Option<PumpDumpRisk>,
    #[serde(default)]
    pub market: Option<Market>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub ingested_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_twitter: bool,
    #[serde(default)]
    pub twitter_handle: Option<String>,
}

impl SignalEntry {
    /// Range checks that the type system cannot express
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(format!(
                "signal {}: confidence {} outside [0, 1]",
                self.id, self.confidence
            ));
        }
        if !(0.0..=1.0).contains(&self.credibility) {
            return Err(format!(
                "signal {}: credibility {} outside [0, 1]",
                self.id, self.credibility
            ));
        }
        if !self.impact.is_finite() {
            return Err(format!("signal {}: impact is not finite", self.id));
        }
        Ok(())
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// The backend emits naive UTC timestamps (`2024-05-01T09:30:00`); RFC 3339 is
/// accepted as well.
pub(crate) mod timestamp {
    use super::*;
    use serde::de::Error;

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp '{}'", raw)))
    }

    pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => parse(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid timestamp '{}'", raw))),
            None => Ok(None),
        }
    }
}

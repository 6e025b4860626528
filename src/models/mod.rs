//! Typed records exchanged with the FinSight API.

pub mod enrollment;
pub mod market;
pub mod signal;
pub mod tier;
pub mod watchlist;

pub use enrollment::{SignupRequest, SignupResponse, VerifyRequest, VerifyResponse};
pub use market::{ChartPoint, MarketOverview, Quote};
pub use signal::{Market, PumpDumpRisk, SignalEntry, SignalId, SignalKind};
pub use tier::Tier;
pub use watchlist::{AddTickerRequest, WatchlistItem};

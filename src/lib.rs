//! FinSight dashboard client: live signal feed, watchlist and market snapshots
//! gated by subscription tier.

pub mod config;
pub mod core;
pub mod enrollment;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod signals;
pub mod watchlist;

pub use error::{FetchError, ValidationError, VerificationError};
pub use models::Tier;

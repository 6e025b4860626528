pub mod store;

pub use store::{normalize_ticker, WatchlistStore};

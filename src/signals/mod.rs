//! Live signal feed: synchronization, highlighting, gating and stats.

pub mod feed;
pub mod gate;
pub mod highlight;
pub mod stats;

pub use feed::{detect_newest, FeedSynchronizer};
pub use gate::{gate, is_obscured, GatedSignal, ObscuredSignal, SelectAction, FREE_VISIBLE_SIGNALS};
pub use highlight::HighlightTracker;
pub use stats::{FeedFilter, FeedStats};

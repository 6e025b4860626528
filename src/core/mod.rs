//! Core primitives: polling, tier state and dashboard composition

pub mod dashboard;
pub mod poller;
pub mod tier;

pub use dashboard::{Dashboard, FeedView};
pub use poller::{Applied, PollState, Poller};
pub use tier::{tier_cell, TierReader, TierWriter};

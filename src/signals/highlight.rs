use std::time::Duration;
use tokio::time::Instant;

use crate::models::SignalId;

/// Transient "just arrived" mark for one feed entry.
///
/// The mark expires after a fixed duration regardless of polling cadence.
#[derive(Debug, Clone)]
pub struct HighlightTracker {
    duration: Duration,
    current: Option<(SignalId, Instant)>,
}

impl HighlightTracker {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            current: None,
        }
    }

    /// Record the flag from the latest refresh; `None` leaves an active mark alone
    pub fn observe(&mut self, flagged: Option<SignalId>, now: Instant) {
        if let Some(id) = flagged {
            let already_marked = matches!(self.current, Some((current, _)) if current == id);
            if !already_marked {
                self.current = Some((id, now + self.duration));
            }
        }
    }

    pub fn active(&self, now: Instant) -> Option<SignalId> {
        match self.current {
            Some((id, until)) if now < until => Some(id),
            _ => None,
        }
    }

    pub fn is_highlighted(&self, id: SignalId, now: Instant) -> bool {
        self.active(now) == Some(id)
    }
}

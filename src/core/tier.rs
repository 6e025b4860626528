//! Single-writer cell holding the active subscription tier
//!
//! Readers are cheap clones injected wherever the tier is consulted (feed fetch
//! parameters, access gating). The only writer is handed to the enrollment flow.

use tokio::sync::watch;

use crate::models::Tier;

pub fn tier_cell(initial: Tier) -> (TierWriter, TierReader) {
    let (tx, rx) = watch::channel(initial);
    (TierWriter { tx }, TierReader { rx })
}

/// Exclusive write half. Deliberately not `Clone`.
#[derive(Debug)]
pub struct TierWriter {
    tx: watch::Sender<Tier>,
}

impl TierWriter {
    /// Returns true when the stored tier changed
    pub(crate) fn activate(&self, tier: Tier) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == tier {
                false
            } else {
                *current = tier;
                true
            }
        })
    }

    pub fn current(&self) -> Tier {
        *self.tx.borrow()
    }

    pub fn reader(&self) -> TierReader {
        TierReader {
            rx: self.tx.subscribe(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TierReader {
    rx: watch::Receiver<Tier>,
}

impl TierReader {
    pub fn current(&self) -> Tier {
        *self.rx.borrow()
    }

    /// Wait for the next tier change. `None` once the writer is gone.
    pub async fn changed(&mut self) -> Option<Tier> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }
}

//! Tier-based visibility of feed entries.
//!
//! Gating is a view policy: it runs over the filtered list being displayed and
//! never removes entries from the feed, so aggregate stats still count them.

use crate::models::{SignalEntry, SignalId, SignalKind, Tier};

/// Entries visible to FREE users at the top of any view
pub const FREE_VISIBLE_SIGNALS: usize = 3;

const TEASER_CHARS: usize = 24;

/// Whether the entry at zero-based `position` of the displayed list is obscured
pub fn is_obscured(tier: Tier, position: usize) -> bool {
    tier == Tier::Free && position >= FREE_VISIBLE_SIGNALS
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObscuredSignal {
    pub id: SignalId,
    pub position: usize,
    pub signal: SignalKind,
    /// Truncated title shown under the blur
    pub teaser: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GatedSignal<'a> {
    Visible(&'a SignalEntry),
    Obscured(ObscuredSignal),
}

/// What selecting an entry leads to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectAction {
    Open(SignalId),
    /// Route to the enrollment flow instead of exposing content
    Upgrade,
}

impl GatedSignal<'_> {
    pub fn id(&self) -> SignalId {
        match self {
            GatedSignal::Visible(entry) => entry.id,
            GatedSignal::Obscured(placeholder) => placeholder.id,
        }
    }

    pub fn is_obscured(&self) -> bool {
        matches!(self, GatedSignal::Obscured(_))
    }

    pub fn select(&self) -> SelectAction {
        match self {
            GatedSignal::Visible(entry) => SelectAction::Open(entry.id),
            GatedSignal::Obscured(_) => SelectAction::Upgrade,
        }
    }
}

pub fn gate<'a, I>(entries: I, tier: Tier) -> Vec<GatedSignal<'a>>
where
    I: IntoIterator<Item = &'a SignalEntry>,
{
    entries
        .into_iter()
        .enumerate()
        .map(|(position, entry)| {
            if is_obscured(tier, position) {
                GatedSignal::Obscured(ObscuredSignal {
                    id: entry.id,
                    position,
                    signal: entry.signal,
                    teaser: teaser(&entry.title),
                })
            } else {
                GatedSignal::Visible(entry)
            }
        })
        .collect()
}

fn teaser(title: &str) -> String {
    if title.chars().count() <= TEASER_CHARS {
        return title.to_string();
    }
    let mut truncated: String = title.chars().take(TEASER_CHARS).collect();
    truncated.push('…');
    truncated
}

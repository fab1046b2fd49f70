// ============================================
// Analytics Engine
// ============================================
//
// Pure report builders over the preference model and exposure ledger:
// - snapshot: short mid-session readout
// - summary:  full end-of-session readout
//
// Conventions: missing keys read as 0 and a zero denominator yields 0.
// Percentages are rounded per bucket and are not forced to sum to 100.

mod snapshot;
mod summary;

pub use snapshot::{snapshot, SnapshotInput};
pub use summary::{summary, SummaryInput};

use crate::utils::{clamp_percent, percentage};
use std::collections::BTreeSet;

/// Topics of the universe never shown, in universe order
pub(crate) fn hidden_topics(all_topics: &[String], shown_topics: &BTreeSet<String>) -> Vec<String> {
    all_topics
        .iter()
        .filter(|topic| !shown_topics.contains(*topic))
        .cloned()
        .collect()
}

/// Narrowing metrics shared by both reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Narrowing {
    pub narrowing: u32,
    pub diversity: u32,
    pub personalization: u32,
}

impl Narrowing {
    pub fn new(hidden: usize, universe: usize) -> Self {
        let narrowing = percentage(hidden as f64, universe as f64);
        Self {
            narrowing,
            diversity: clamp_percent(100 - narrowing as i64),
            personalization: clamp_percent(narrowing as i64),
        }
    }
}

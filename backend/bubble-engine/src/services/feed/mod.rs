// ============================================
// Feed Selector (推薦流選擇)
// ============================================
//
// Builds one round of the feed from the catalog:
// 1. Candidate pool: whole catalog (unrestricted) or unseen items only
// 2. Focused slice: highest relevance to the current preference model
// 3. Diversity slice: lowest-affinity topics/sentiments, calmer content first
// 4. Backfill from the pool in catalog order when the slices come up short
// 5. Random final order, softly re-biased by relevance after round 2
//
// The selector has no opinion about how the diversity ratio evolves; the
// session shrinks it round over round, which is what narrows the bubble.

use crate::models::{Item, ItemId};
use crate::services::preference::PreferenceModel;
use crate::utils::round_half_up;
use rand::Rng;
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::debug;

/// Upper bound (exclusive) of the tie-breaking jitter on relevance
pub const FOCUSED_JITTER: f64 = 0.3;
/// Upper bound (exclusive) of the jitter on exploration scores
pub const DIVERSITY_JITTER: f64 = 0.4;
/// Rounds strictly above this get relevance mixed into the final order
pub const ORDER_REBIAS_AFTER_ROUND: u32 = 2;
const ORDER_RELEVANCE_WEIGHT: f64 = 0.01;

/// Inputs for one feed generation
#[derive(Debug, Clone, Copy)]
pub struct FeedRequest<'a> {
    pub catalog: &'a [Item],
    pub model: &'a PreferenceModel,
    pub shown_ids: &'a HashSet<ItemId>,
    pub feed_size: usize,
    /// Fraction of the feed reserved for exploration, in [0, 1]
    pub diversity_ratio: f64,
    pub round: u32,
    /// Ignore prior exposure and draw from the whole catalog
    pub unrestricted: bool,
}

/// How a feed of `feed_size` splits between reinforcement and exploration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedPartition {
    pub focused: usize,
    pub diversified: usize,
}

impl FeedPartition {
    /// Both counts are clamped to [0, feed_size] independently; rounding can
    /// leave them one apart from `feed_size` in total.
    pub fn new(feed_size: usize, diversity_ratio: f64) -> Self {
        let size = feed_size as f64;
        let diversified = round_half_up(size * diversity_ratio).clamp(0.0, size);
        let focused = (size - diversified).clamp(0.0, size);
        Self {
            focused: focused as usize,
            diversified: diversified as usize,
        }
    }
}

/// Deterministic relevance of `item` for `model` (no jitter)
pub fn relevance_score(item: &Item, model: &PreferenceModel) -> f64 {
    let topic_score = model.topic_affinity(&item.topic);
    let sentiment_score = model.sentiment_affinity(item.sentiment);
    let intensity_drift = model.intensity_bias() * (item.intensity - 0.5) * 1.8;
    topic_score * 1.5 + sentiment_score * 1.2 + item.intensity * 0.9 + intensity_drift
}

/// Deterministic part of the exploration score (no jitter): favours what the
/// model scores low and, mildly, less polarizing content.
pub fn exploration_score(item: &Item, model: &PreferenceModel) -> f64 {
    let topic_score = model.topic_affinity(&item.topic);
    let sentiment_score = model.sentiment_affinity(item.sentiment);
    -(topic_score + sentiment_score) + (1.0 - item.intensity) * 0.4
}

/// Produce the ordered feed for one round.
///
/// An empty result means the eligible pool is exhausted; it is not an error.
/// The result never repeats an id, never exceeds `feed_size`, and in
/// restricted mode never contains an id from `shown_ids`.
pub fn generate_feed<'a, R: Rng>(request: &FeedRequest<'a>, rng: &mut R) -> Vec<&'a Item> {
    let model = request.model;
    if request.catalog.is_empty() || request.feed_size == 0 {
        return Vec::new();
    }

    let pool: Vec<&'a Item> = if request.unrestricted {
        request.catalog.iter().collect()
    } else {
        request
            .catalog
            .iter()
            .filter(|item| !request.shown_ids.contains(&item.id))
            .collect()
    };

    if pool.is_empty() {
        debug!(round = request.round, "Candidate pool exhausted");
        return Vec::new();
    }

    let partition = FeedPartition::new(request.feed_size, request.diversity_ratio);

    // Focused slice
    let mut scored: Vec<(&'a Item, f64)> = pool
        .iter()
        .map(|item| {
            let jitter = rng.gen::<f64>() * FOCUSED_JITTER;
            (*item, relevance_score(item, model) + jitter)
        })
        .collect();
    sort_descending(&mut scored);

    let focused: Vec<&'a Item> = scored
        .into_iter()
        .take(partition.focused)
        .map(|(item, _)| item)
        .collect();
    let focused_ids: HashSet<ItemId> = focused.iter().map(|item| item.id).collect();

    // Diversity slice over what focused left behind
    let mut exploratory: Vec<(&'a Item, f64)> = pool
        .iter()
        .filter(|item| !focused_ids.contains(&item.id))
        .map(|item| {
            let jitter = rng.gen::<f64>() * DIVERSITY_JITTER;
            (*item, exploration_score(item, model) + jitter)
        })
        .collect();
    sort_descending(&mut exploratory);

    let mut selected = focused;
    let mut selected_ids = focused_ids;
    for (item, _) in exploratory.into_iter().take(partition.diversified) {
        if selected_ids.insert(item.id) {
            selected.push(item);
        }
    }

    let before_backfill = selected.len();
    if selected.len() < request.feed_size {
        for item in &pool {
            if selected.len() >= request.feed_size {
                break;
            }
            if selected_ids.insert(item.id) {
                selected.push(*item);
            }
        }
    }

    // Final order
    let rebias = request.round > ORDER_REBIAS_AFTER_ROUND;
    let mut ordered: Vec<(&'a Item, f64)> = selected
        .into_iter()
        .map(|item| {
            let mut key = rng.gen::<f64>();
            if rebias {
                key += relevance_score(item, model) * ORDER_RELEVANCE_WEIGHT;
            }
            (item, key)
        })
        .collect();
    ordered.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
    ordered.truncate(request.feed_size);

    debug!(
        round = request.round,
        pool_size = pool.len(),
        focused = partition.focused,
        diversified = partition.diversified,
        backfilled = ordered.len().saturating_sub(before_backfill),
        feed_len = ordered.len(),
        unrestricted = request.unrestricted,
        "Feed generated"
    );

    ordered.into_iter().map(|(item, _)| item).collect()
}

fn sort_descending(scored: &mut [(&Item, f64)]) {
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
}

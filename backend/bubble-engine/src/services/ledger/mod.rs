// ============================================
// Exposure Ledger
// ============================================
//
// Cumulative view counters for one session. Record every emitted feed
// exactly once; analytics reads the counters as-is.

use crate::models::{Item, Sentiment};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ExposureLedger {
    by_topic: BTreeMap<String, u32>,
    by_sentiment: BTreeMap<Sentiment, u32>,
    shown_topics: BTreeSet<String>,
}

impl ExposureLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every item of an emitted feed
    pub fn record_feed<'a, I>(&mut self, feed: I)
    where
        I: IntoIterator<Item = &'a Item>,
    {
        let mut recorded = 0usize;
        for item in feed {
            *self.by_topic.entry(item.topic.clone()).or_insert(0) += 1;
            *self.by_sentiment.entry(item.sentiment).or_insert(0) += 1;
            self.shown_topics.insert(item.topic.clone());
            recorded += 1;
        }

        debug!(
            recorded = recorded,
            topics_shown = self.shown_topics.len(),
            "Exposure ledger updated"
        );
    }

    /// Views per topic; topics never shown are absent
    pub fn exposure_by_topic(&self) -> &BTreeMap<String, u32> {
        &self.by_topic
    }

    /// Views per sentiment; sentiments never shown are absent
    pub fn exposure_by_sentiment(&self) -> &BTreeMap<Sentiment, u32> {
        &self.by_sentiment
    }

    pub fn topic_views(&self, topic: &str) -> u32 {
        self.by_topic.get(topic).copied().unwrap_or(0)
    }

    pub fn sentiment_views(&self, sentiment: Sentiment) -> u32 {
        self.by_sentiment.get(&sentiment).copied().unwrap_or(0)
    }

    pub fn shown_topics(&self) -> &BTreeSet<String> {
        &self.shown_topics
    }

    pub fn total_views(&self) -> u32 {
        self.by_topic.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_topic.is_empty()
    }

    /// Back to empty, for a session restart
    pub fn reset(&mut self) {
        self.by_topic.clear();
        self.by_sentiment.clear();
        self.shown_topics.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_feed_counts_each_item() {
        let feed = vec![
            Item::new(1, "politics", Sentiment::Negative, 0.7),
            Item::new(2, "politics", Sentiment::Positive, 0.4),
            Item::new(3, "ecology", Sentiment::Negative, 0.5),
        ];
        let mut ledger = ExposureLedger::new();
        ledger.record_feed(&feed);

        assert_eq!(ledger.topic_views("politics"), 2);
        assert_eq!(ledger.topic_views("ecology"), 1);
        assert_eq!(ledger.topic_views("health"), 0);
        assert_eq!(ledger.sentiment_views(Sentiment::Negative), 2);
        assert_eq!(ledger.sentiment_views(Sentiment::Neutral), 0);
        assert_eq!(ledger.total_views(), 3);
        assert!(ledger.shown_topics().contains("ecology"));
    }

    #[test]
    fn test_counts_accumulate_across_feeds() {
        let item = Item::new(1, "culture", Sentiment::Neutral, 0.3);
        let mut ledger = ExposureLedger::new();
        ledger.record_feed([&item]);
        ledger.record_feed([&item]);

        assert_eq!(ledger.topic_views("culture"), 2);
        assert_eq!(ledger.shown_topics().len(), 1);
    }

    #[test]
    fn test_empty_feed_changes_nothing() {
        let mut ledger = ExposureLedger::new();
        ledger.record_feed(std::iter::empty::<&Item>());
        assert!(ledger.is_empty());
        assert_eq!(ledger, ExposureLedger::default());
    }

    #[test]
    fn test_reset() {
        let item = Item::new(1, "health", Sentiment::Positive, 0.6);
        let mut ledger = ExposureLedger::new();
        ledger.record_feed([&item]);
        ledger.reset();
        assert!(ledger.is_empty());
        assert!(ledger.shown_topics().is_empty());
        assert_eq!(ledger.sentiment_views(Sentiment::Positive), 0);
    }
}

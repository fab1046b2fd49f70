// ============================================
// Preference Model (偏好模型)
// ============================================
//
// Session-scoped affinity scores learned from viewer actions.
//
// Update rule (additive, then clamped):
//   topic[item.topic]         += w.topic          in [-8, 22]
//   sentiment[item.sentiment] += w.sentiment      in [-14, 18]
//   intensity_bias            += (intensity - 0.5) * w.intensity   in [-1.5, 1.5]
//
// The model is a value: `apply_interaction` returns a new model and leaves
// the input untouched so callers can keep earlier snapshots around.

use crate::models::{ActionKind, Item, Sentiment};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

pub const TOPIC_AFFINITY_RANGE: (f64, f64) = (-8.0, 22.0);
pub const SENTIMENT_AFFINITY_RANGE: (f64, f64) = (-14.0, 18.0);
pub const INTENSITY_BIAS_RANGE: (f64, f64) = (-1.5, 1.5);

/// Neutral intensity; items at this level never move the bias
const INTENSITY_CENTER: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SentimentAffinity {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

impl SentimentAffinity {
    pub fn get(&self, sentiment: Sentiment) -> f64 {
        match sentiment {
            Sentiment::Positive => self.positive,
            Sentiment::Neutral => self.neutral,
            Sentiment::Negative => self.negative,
        }
    }

    fn get_mut(&mut self, sentiment: Sentiment) -> &mut f64 {
        match sentiment {
            Sentiment::Positive => &mut self.positive,
            Sentiment::Neutral => &mut self.neutral,
            Sentiment::Negative => &mut self.negative,
        }
    }

    /// Sum of absolute affinities across all three sentiments
    pub fn total_magnitude(&self) -> f64 {
        Sentiment::ALL.iter().map(|s| self.get(*s).abs()).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActionCounts {
    pub like: u32,
    pub share: u32,
    pub comment: u32,
    pub skip: u32,
    pub scroll: u32,
}

impl ActionCounts {
    pub fn get(&self, action: ActionKind) -> u32 {
        match action {
            ActionKind::Like => self.like,
            ActionKind::Share => self.share,
            ActionKind::Comment => self.comment,
            ActionKind::Skip => self.skip,
            ActionKind::Scroll => self.scroll,
            ActionKind::Unrecognized => 0,
        }
    }

    /// Unrecognized actions are not counted
    fn record(&mut self, action: ActionKind) {
        let slot = match action {
            ActionKind::Like => &mut self.like,
            ActionKind::Share => &mut self.share,
            ActionKind::Comment => &mut self.comment,
            ActionKind::Skip => &mut self.skip,
            ActionKind::Scroll => &mut self.scroll,
            ActionKind::Unrecognized => return,
        };
        *slot += 1;
    }

    pub fn total(&self) -> u32 {
        self.like + self.share + self.comment + self.skip + self.scroll
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PreferenceModel {
    topic_affinity: BTreeMap<String, f64>,
    sentiment_affinity: SentimentAffinity,
    intensity_bias: f64,
    action_counts: ActionCounts,
}

impl PreferenceModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Affinity for `topic`, 0 when the topic was never scored
    pub fn topic_affinity(&self, topic: &str) -> f64 {
        self.topic_affinity.get(topic).copied().unwrap_or(0.0)
    }

    /// Every topic that has a recorded affinity
    pub fn topic_affinities(&self) -> &BTreeMap<String, f64> {
        &self.topic_affinity
    }

    pub fn sentiment_affinity(&self, sentiment: Sentiment) -> f64 {
        self.sentiment_affinity.get(sentiment)
    }

    pub fn sentiment_affinities(&self) -> &SentimentAffinity {
        &self.sentiment_affinity
    }

    pub fn intensity_bias(&self) -> f64 {
        self.intensity_bias
    }

    pub fn action_counts(&self) -> &ActionCounts {
        &self.action_counts
    }

    /// Seed a topic score directly, clamped like any update
    pub fn with_topic_affinity(mut self, topic: impl Into<String>, score: f64) -> Self {
        self.topic_affinity
            .insert(topic.into(), clamp(score, TOPIC_AFFINITY_RANGE));
        self
    }

    /// Seed a sentiment score directly, clamped like any update
    pub fn with_sentiment_affinity(mut self, sentiment: Sentiment, score: f64) -> Self {
        *self.sentiment_affinity.get_mut(sentiment) = clamp(score, SENTIMENT_AFFINITY_RANGE);
        self
    }

    /// Seed the intensity bias directly, clamped like any update
    pub fn with_intensity_bias(mut self, bias: f64) -> Self {
        self.intensity_bias = clamp(bias, INTENSITY_BIAS_RANGE);
        self
    }

    /// Fold one viewer action into a new model
    pub fn apply_interaction(&self, action: ActionKind, item: &Item) -> Self {
        let weights = action.weights();
        let mut next = self.clone();

        let topic_score = next.topic_affinity.entry(item.topic.clone()).or_insert(0.0);
        *topic_score = clamp(*topic_score + weights.topic, TOPIC_AFFINITY_RANGE);

        let sentiment_score = next.sentiment_affinity.get_mut(item.sentiment);
        *sentiment_score = clamp(*sentiment_score + weights.sentiment, SENTIMENT_AFFINITY_RANGE);

        next.intensity_bias = clamp(
            next.intensity_bias + (item.intensity - INTENSITY_CENTER) * weights.intensity,
            INTENSITY_BIAS_RANGE,
        );

        next.action_counts.record(action);

        debug!(
            item_id = item.id,
            action = %action,
            topic = %item.topic,
            topic_affinity = next.topic_affinity(&item.topic),
            intensity_bias = next.intensity_bias,
            "Preference model updated"
        );

        next
    }
}

/// Free-function form of [`PreferenceModel::apply_interaction`]
pub fn apply_interaction(model: &PreferenceModel, action: ActionKind, item: &Item) -> PreferenceModel {
    model.apply_interaction(action, item)
}

fn clamp(value: f64, (min, max): (f64, f64)) -> f64 {
    value.clamp(min, max)
}

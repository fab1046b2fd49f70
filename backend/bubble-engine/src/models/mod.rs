use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub type ItemId = u64;

/// Catalog entry shown to the viewer. Display fields are carried through
/// untouched; only `topic`, `sentiment` and `intensity` drive ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub topic: String,
    pub sentiment: Sentiment,
    /// How polarizing the content is, in [0, 1]
    pub intensity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Item {
    pub fn new(id: ItemId, topic: impl Into<String>, sentiment: Sentiment, intensity: f64) -> Self {
        Self {
            id,
            topic: topic.into(),
            sentiment,
            intensity,
            title: None,
            text: None,
            image: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }

    /// Label used when the sentiment dominates a session
    pub fn lean_label(&self) -> &'static str {
        match self {
            Sentiment::Positive => "optimistic",
            Sentiment::Neutral => "balanced",
            Sentiment::Negative => "critical",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Viewer action on an item.
///
/// Anything outside the five tracked kinds parses to `Unrecognized`, which
/// carries the skip weights but is never counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Like,
    Share,
    Comment,
    Skip,
    /// Item scrolled past without interaction
    Scroll,
    #[serde(other)]
    Unrecognized,
}

/// Additive weights an action applies to the preference model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionWeights {
    pub topic: f64,
    pub sentiment: f64,
    pub intensity: f64,
}

impl ActionKind {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "like" => ActionKind::Like,
            "share" => ActionKind::Share,
            "comment" => ActionKind::Comment,
            "skip" => ActionKind::Skip,
            "scroll" => ActionKind::Scroll,
            _ => ActionKind::Unrecognized,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Like => "like",
            ActionKind::Share => "share",
            ActionKind::Comment => "comment",
            ActionKind::Skip => "skip",
            ActionKind::Scroll => "scroll",
            ActionKind::Unrecognized => "unrecognized",
        }
    }

    pub fn weights(&self) -> ActionWeights {
        let (topic, sentiment, intensity) = match self {
            ActionKind::Like => (2.2, 1.8, 1.4),
            ActionKind::Share => (2.8, 2.1, 2.0),
            ActionKind::Comment => (1.6, 1.2, 0.9),
            ActionKind::Skip | ActionKind::Unrecognized => (-1.6, -1.3, -1.0),
            ActionKind::Scroll => (-0.6, -0.4, -0.3),
        };
        ActionWeights {
            topic,
            sentiment,
            intensity,
        }
    }

    pub fn is_tracked(&self) -> bool {
        !matches!(self, ActionKind::Unrecognized)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded viewer action; the log is append-only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionLogEntry {
    pub item_id: ItemId,
    pub action: ActionKind,
    pub topic: String,
    pub sentiment: Sentiment,
    pub intensity: f64,
    pub round: u32,
}

impl InteractionLogEntry {
    pub fn new(item: &Item, action: ActionKind, round: u32) -> Self {
        Self {
            item_id: item.id,
            action,
            topic: item.topic.clone(),
            sentiment: item.sentiment,
            intensity: item.intensity,
            round,
        }
    }
}

// ============================================
// Report records
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicScore {
    pub topic: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicCount {
    pub topic: String,
    pub count: u32,
}

/// Whole-number percentage per sentiment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SentimentMix {
    pub positive: u32,
    pub neutral: u32,
    pub negative: u32,
}

/// Mid-session report
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub round: u32,
    pub interaction_count: usize,
    pub topic_distribution: BTreeMap<String, u32>,
    pub hidden_topics: Vec<String>,
    pub narrowing: u32,
    pub diversity_percentage: u32,
    pub personalization_percentage: u32,
    pub preference_highlights: Vec<TopicScore>,
    pub sentiment_mix: SentimentMix,
    pub feed_preview: Vec<ItemId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentLean {
    pub sentiment: Sentiment,
    pub label: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AxisShare {
    pub count: u32,
    pub percentage: u32,
}

/// Positive/negative normalized against each other; neutral against all views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SentimentAxis {
    pub positive: AxisShare,
    pub negative: AxisShare,
    pub neutral: AxisShare,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentimentShare {
    pub sentiment: Sentiment,
    pub count: u32,
    pub percentage: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PreferenceRange {
    pub min: f64,
    pub max: f64,
}

/// End-of-session report
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub narrowing: u32,
    pub diversity_percentage: u32,
    pub personalization_percentage: u32,
    pub lost_topics: Vec<String>,
    pub preference_breakdown: Vec<TopicScore>,
    pub sentiment_lean: Option<SentimentLean>,
    pub total_interactions: usize,
    pub exposure_by_topic: BTreeMap<String, u32>,
    pub likes_by_topic: Vec<TopicCount>,
    pub sentiment_axis: SentimentAxis,
    pub sentiment_breakdown: Vec<SentimentShare>,
    pub preference_range: PreferenceRange,
}

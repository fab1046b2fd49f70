use super::{hidden_topics, Narrowing};
use crate::models::{
    ActionKind, AxisShare, InteractionLogEntry, PreferenceRange, Sentiment, SentimentAxis,
    SentimentLean, SentimentShare, Summary, TopicCount, TopicScore,
};
use crate::services::preference::PreferenceModel;
use crate::utils::{percentage, round_to_tenth};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Sentiment magnitude a lean must exceed to be reported
const LEAN_THRESHOLD: f64 = 0.4;

pub struct SummaryInput<'a> {
    pub model: &'a PreferenceModel,
    pub all_topics: &'a [String],
    pub shown_topics: &'a BTreeSet<String>,
    pub interaction_log: &'a [InteractionLogEntry],
    pub exposure_by_topic: &'a BTreeMap<String, u32>,
    pub exposure_by_sentiment: &'a BTreeMap<Sentiment, u32>,
}

/// Full-session readout
pub fn summary(input: &SummaryInput<'_>) -> Summary {
    let lost = hidden_topics(input.all_topics, input.shown_topics);
    let narrowing = Narrowing::new(lost.len(), input.all_topics.len());
    let views = |sentiment: Sentiment| {
        input
            .exposure_by_sentiment
            .get(&sentiment)
            .copied()
            .unwrap_or(0)
    };

    debug!(
        lost_topics = lost.len(),
        narrowing = narrowing.narrowing,
        interactions = input.interaction_log.len(),
        "Summary built"
    );

    Summary {
        narrowing: narrowing.narrowing,
        diversity_percentage: narrowing.diversity,
        personalization_percentage: narrowing.personalization,
        lost_topics: lost,
        preference_breakdown: preference_breakdown(input.model),
        sentiment_lean: sentiment_lean(input.model),
        total_interactions: input.interaction_log.len(),
        exposure_by_topic: input.exposure_by_topic.clone(),
        likes_by_topic: likes_by_topic(input.interaction_log),
        sentiment_axis: sentiment_axis(&views),
        sentiment_breakdown: sentiment_breakdown(&views),
        preference_range: preference_range(input.model),
    }
}

/// Dominant sentiment by absolute affinity; the first of positive, neutral,
/// negative wins a tie.
fn sentiment_lean(model: &PreferenceModel) -> Option<SentimentLean> {
    let (dominant, magnitude) = Sentiment::ALL.iter().fold(
        (Sentiment::Positive, f64::MIN),
        |(best, best_magnitude), sentiment| {
            let magnitude = model.sentiment_affinity(*sentiment).abs();
            if magnitude > best_magnitude {
                (*sentiment, magnitude)
            } else {
                (best, best_magnitude)
            }
        },
    );

    if magnitude > LEAN_THRESHOLD {
        Some(SentimentLean {
            sentiment: dominant,
            label: dominant.lean_label(),
        })
    } else {
        None
    }
}

fn preference_breakdown(model: &PreferenceModel) -> Vec<TopicScore> {
    let mut breakdown: Vec<TopicScore> = model
        .topic_affinities()
        .iter()
        .map(|(topic, score)| TopicScore {
            topic: topic.clone(),
            score: round_to_tenth(*score),
        })
        .collect();

    breakdown.sort_by(|a, b| {
        b.score
            .abs()
            .partial_cmp(&a.score.abs())
            .unwrap_or(Ordering::Equal)
    });
    breakdown
}

fn likes_by_topic(log: &[InteractionLogEntry]) -> Vec<TopicCount> {
    let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
    for entry in log.iter().filter(|e| e.action == ActionKind::Like) {
        *counts.entry(entry.topic.as_str()).or_insert(0) += 1;
    }

    let mut likes: Vec<TopicCount> = counts
        .into_iter()
        .map(|(topic, count)| TopicCount {
            topic: topic.to_string(),
            count,
        })
        .collect();
    // Stable sort, equal counts stay alphabetical
    likes.sort_by(|a, b| b.count.cmp(&a.count));
    likes
}

fn sentiment_axis(views: &impl Fn(Sentiment) -> u32) -> SentimentAxis {
    let positive = views(Sentiment::Positive);
    let negative = views(Sentiment::Negative);
    let neutral = views(Sentiment::Neutral);
    let polar_total = (positive + negative) as f64;
    let total = (positive + negative + neutral) as f64;

    SentimentAxis {
        positive: AxisShare {
            count: positive,
            percentage: percentage(positive as f64, polar_total),
        },
        negative: AxisShare {
            count: negative,
            percentage: percentage(negative as f64, polar_total),
        },
        neutral: AxisShare {
            count: neutral,
            percentage: percentage(neutral as f64, total),
        },
    }
}

fn sentiment_breakdown(views: &impl Fn(Sentiment) -> u32) -> Vec<SentimentShare> {
    let total: u32 = Sentiment::ALL.iter().map(|s| views(*s)).sum();
    Sentiment::ALL
        .iter()
        .map(|sentiment| {
            let count = views(*sentiment);
            SentimentShare {
                sentiment: *sentiment,
                count,
                percentage: percentage(count as f64, total as f64),
            }
        })
        .collect()
}

/// Raw min/max topic affinity, -1/+1 before any topic is scored
fn preference_range(model: &PreferenceModel) -> PreferenceRange {
    let scores = model.topic_affinities().values().copied();
    let (min, max) = scores.fold(None, |range: Option<(f64, f64)>, score| match range {
        None => Some((score, score)),
        Some((min, max)) => Some((min.min(score), max.max(score))),
    })
    .unwrap_or((-1.0, 1.0));

    PreferenceRange {
        min: round_to_tenth(min),
        max: round_to_tenth(max),
    }
}

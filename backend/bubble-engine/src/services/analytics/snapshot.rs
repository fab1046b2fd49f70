use super::{hidden_topics, Narrowing};
use crate::models::{Item, Sentiment, SentimentMix, Snapshot, TopicScore};
use crate::services::preference::PreferenceModel;
use crate::utils::{percentage, round_to_tenth};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

const HIGHLIGHT_MIN_MAGNITUDE: f64 = 0.2;
const HIGHLIGHT_LIMIT: usize = 5;

pub struct SnapshotInput<'a> {
    pub feed: &'a [Item],
    pub all_topics: &'a [String],
    pub shown_topics: &'a BTreeSet<String>,
    pub exposure_by_topic: &'a BTreeMap<String, u32>,
    pub round: u32,
    pub interaction_count: usize,
    pub model: &'a PreferenceModel,
}

/// Mid-session readout of how far the feed has narrowed
pub fn snapshot(input: &SnapshotInput<'_>) -> Snapshot {
    let hidden = hidden_topics(input.all_topics, input.shown_topics);
    let narrowing = Narrowing::new(hidden.len(), input.all_topics.len());

    debug!(
        round = input.round,
        hidden = hidden.len(),
        narrowing = narrowing.narrowing,
        "Snapshot built"
    );

    Snapshot {
        round: input.round,
        interaction_count: input.interaction_count,
        topic_distribution: topic_distribution(input.exposure_by_topic),
        hidden_topics: hidden,
        narrowing: narrowing.narrowing,
        diversity_percentage: narrowing.diversity,
        personalization_percentage: narrowing.personalization,
        preference_highlights: preference_highlights(input.model),
        sentiment_mix: sentiment_mix(input.model),
        feed_preview: input.feed.iter().map(|item| item.id).collect(),
    }
}

fn topic_distribution(exposure: &BTreeMap<String, u32>) -> BTreeMap<String, u32> {
    let total: u32 = exposure.values().sum();
    if total == 0 {
        return BTreeMap::new();
    }
    exposure
        .iter()
        .filter(|(_, views)| **views > 0)
        .map(|(topic, views)| (topic.clone(), percentage(*views as f64, total as f64)))
        .collect()
}

/// Strongest signed topic scores, magnitude above 0.2 after rounding
fn preference_highlights(model: &PreferenceModel) -> Vec<TopicScore> {
    let mut highlights: Vec<TopicScore> = model
        .topic_affinities()
        .iter()
        .map(|(topic, score)| TopicScore {
            topic: topic.clone(),
            score: round_to_tenth(*score),
        })
        .filter(|entry| entry.score.abs() > HIGHLIGHT_MIN_MAGNITUDE)
        .collect();

    highlights.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    highlights.truncate(HIGHLIGHT_LIMIT);
    highlights
}

fn sentiment_mix(model: &PreferenceModel) -> SentimentMix {
    let affinities = model.sentiment_affinities();
    let total = affinities.total_magnitude();
    let share = |sentiment: Sentiment| percentage(affinities.get(sentiment).abs(), total);

    SentimentMix {
        positive: share(Sentiment::Positive),
        neutral: share(Sentiment::Neutral),
        negative: share(Sentiment::Negative),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActionKind;

    fn universe() -> Vec<String> {
        vec![
            "politics".to_string(),
            "ecology".to_string(),
            "technology".to_string(),
        ]
    }

    fn build(
        shown: &BTreeSet<String>,
        exposure: &BTreeMap<String, u32>,
        model: &PreferenceModel,
    ) -> Snapshot {
        let all = universe();
        let feed = vec![Item::new(4, "politics", Sentiment::Negative, 0.8)];
        snapshot(&SnapshotInput {
            feed: &feed,
            all_topics: &all,
            shown_topics: shown,
            exposure_by_topic: exposure,
            round: 3,
            interaction_count: 5,
            model,
        })
    }

    #[test]
    fn test_two_of_three_topics_shown() {
        let shown: BTreeSet<String> = ["politics", "ecology"].iter().map(|s| s.to_string()).collect();
        let exposure: BTreeMap<String, u32> =
            [("politics".to_string(), 14), ("ecology".to_string(), 6)].into_iter().collect();
        let report = build(&shown, &exposure, &PreferenceModel::new());

        assert_eq!(report.hidden_topics, vec!["technology".to_string()]);
        assert_eq!(report.narrowing, 33);
        assert_eq!(report.diversity_percentage, 67);
        assert_eq!(report.personalization_percentage, 33);
        assert_eq!(report.topic_distribution.get("politics"), Some(&70));
        assert_eq!(report.topic_distribution.get("ecology"), Some(&30));
        assert_eq!(report.feed_preview, vec![4]);
        assert_eq!(report.round, 3);
        assert_eq!(report.interaction_count, 5);
    }

    #[test]
    fn test_nothing_shown_is_full_narrowing() {
        let report = build(&BTreeSet::new(), &BTreeMap::new(), &PreferenceModel::new());
        assert_eq!(report.narrowing, 100);
        assert_eq!(report.diversity_percentage, 0);
        assert!(report.topic_distribution.is_empty());
        assert_eq!(report.sentiment_mix, SentimentMix::default());
        assert!(report.preference_highlights.is_empty());
    }

    #[test]
    fn test_distribution_rounds_per_bucket() {
        let shown: BTreeSet<String> = universe().into_iter().collect();
        let exposure: BTreeMap<String, u32> = universe().into_iter().map(|t| (t, 1)).collect();
        let report = build(&shown, &exposure, &PreferenceModel::new());

        assert_eq!(report.narrowing, 0);
        // 33 + 33 + 33, left uncorrected
        assert_eq!(report.topic_distribution.values().sum::<u32>(), 99);
    }

    #[test]
    fn test_highlights_sorted_signed_and_filtered() {
        let model = PreferenceModel::new()
            .with_topic_affinity("politics", 6.64)
            .with_topic_affinity("ecology", -3.0)
            .with_topic_affinity("technology", 0.24)
            .with_topic_affinity("culture", 1.0)
            .with_topic_affinity("health", 2.0)
            .with_topic_affinity("society", 3.0)
            .with_topic_affinity("sport", 4.0);
        let report = build(&BTreeSet::new(), &BTreeMap::new(), &model);

        let topics: Vec<&str> = report
            .preference_highlights
            .iter()
            .map(|h| h.topic.as_str())
            .collect();
        assert_eq!(topics, vec!["politics", "sport", "society", "health", "culture"]);
        assert!((report.preference_highlights[0].score - 6.6).abs() < 1e-9);
    }

    #[test]
    fn test_sentiment_mix_uses_magnitudes() {
        let item = Item::new(1, "politics", Sentiment::Negative, 0.5);
        let model = PreferenceModel::new()
            .apply_interaction(ActionKind::Like, &item)
            .with_sentiment_affinity(Sentiment::Positive, -1.8);
        let report = build(&BTreeSet::new(), &BTreeMap::new(), &model);

        assert_eq!(report.sentiment_mix.positive, 50);
        assert_eq!(report.sentiment_mix.negative, 50);
        assert_eq!(report.sentiment_mix.neutral, 0);
    }

    #[test]
    fn test_snapshot_is_idempotent() {
        let shown: BTreeSet<String> = ["ecology".to_string()].into_iter().collect();
        let exposure: BTreeMap<String, u32> = [("ecology".to_string(), 3)].into_iter().collect();
        let model = PreferenceModel::new().with_topic_affinity("ecology", 4.4);
        assert_eq!(
            build(&shown, &exposure, &model),
            build(&shown, &exposure, &model)
        );
    }
}

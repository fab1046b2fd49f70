use bubble_engine::models::{ActionKind, Item, ItemId, Sentiment, TopicScore};
use bubble_engine::services::analytics::{snapshot, summary, SnapshotInput, SummaryInput};
use bubble_engine::{generate_feed, ExposureLedger, FeedRequest, PreferenceModel};
use bubble_engine::services::FeedPartition;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{BTreeMap, BTreeSet, HashSet};

fn universe() -> Vec<String> {
    ["politics", "ecology", "technology"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn catalog() -> Vec<Item> {
    let mut items = Vec::new();
    for (offset, topic) in universe().iter().enumerate() {
        for n in 0..10u64 {
            let id = offset as u64 * 100 + n;
            items.push(Item::new(
                id,
                topic.as_str(),
                Sentiment::ALL[(n % 3) as usize],
                0.3 + (n as f64) * 0.05,
            ));
        }
    }
    items
}

#[test]
fn test_two_rounds_hide_one_of_three_topics() {
    let items = catalog();
    let politics: Vec<&Item> = items.iter().filter(|i| i.topic == "politics").take(5).collect();
    let ecology: Vec<&Item> = items.iter().filter(|i| i.topic == "ecology").take(5).collect();

    let mut ledger = ExposureLedger::new();
    ledger.record_feed(politics.iter().copied());
    ledger.record_feed(ecology.iter().copied());

    let all = universe();
    let model = PreferenceModel::new();
    let report = snapshot(&SnapshotInput {
        feed: &[],
        all_topics: &all,
        shown_topics: ledger.shown_topics(),
        exposure_by_topic: ledger.exposure_by_topic(),
        round: 2,
        interaction_count: 0,
        model: &model,
    });

    assert_eq!(report.hidden_topics, vec!["technology".to_string()]);
    assert_eq!(report.narrowing, 33);
    assert_eq!(report.topic_distribution.get("politics"), Some(&50));
    assert_eq!(report.topic_distribution.get("ecology"), Some(&50));
}

#[test]
fn test_breakdown_sorted_by_magnitude() {
    let model = PreferenceModel::new()
        .with_topic_affinity("politics", 5.0)
        .with_topic_affinity("ecology", -3.0);
    let all = universe();
    let shown = BTreeSet::new();
    let report = summary(&SummaryInput {
        model: &model,
        all_topics: &all,
        shown_topics: &shown,
        interaction_log: &[],
        exposure_by_topic: &BTreeMap::new(),
        exposure_by_sentiment: &BTreeMap::new(),
    });

    assert_eq!(
        report.preference_breakdown,
        vec![
            TopicScore {
                topic: "politics".to_string(),
                score: 5.0
            },
            TopicScore {
                topic: "ecology".to_string(),
                score: -3.0
            },
        ]
    );
    assert!(report.likes_by_topic.is_empty());
    assert!(report.sentiment_lean.is_none());
}

#[test]
fn test_diversity_ratio_partition() {
    assert_eq!(
        FeedPartition::new(10, 0.3),
        FeedPartition {
            focused: 7,
            diversified: 3
        }
    );
}

#[test]
fn test_feeds_narrow_towards_liked_topic() {
    let items = catalog();
    let mut model = PreferenceModel::new();
    for item in items.iter().filter(|i| i.topic == "technology").take(4) {
        model = model.apply_interaction(ActionKind::Share, item);
    }
    let shown: HashSet<ItemId> = HashSet::new();

    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let feed = generate_feed(
            &FeedRequest {
                catalog: &items,
                model: &model,
                shown_ids: &shown,
                feed_size: 10,
                diversity_ratio: 0.2,
                round: 5,
                unrestricted: false,
            },
            &mut rng,
        );
        let technology = feed.iter().filter(|i| i.topic == "technology").count();
        // All eight focused slots go to the shared topic
        assert!(technology >= 8, "seed {} gave {} technology items", seed, technology);
    }
}

use bubble_engine::config::SessionConfig;
use bubble_engine::models::{ActionKind, Item, ItemId};
use bubble_engine::services::catalog::load_catalog;
use bubble_engine::utils::round_to_tenth;
use bubble_engine::Session;
use std::collections::HashSet;
use std::path::PathBuf;

fn sample_catalog() -> Vec<Item> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/posts.json");
    load_catalog(path).expect("sample catalog should load")
}

fn play(session: &mut Session, favorite: &str) {
    let feed: Vec<Item> = session.current_feed().to_vec();
    for item in feed.iter().filter(|item| item.topic == favorite) {
        if session.current_feed().len() == 1 {
            break;
        }
        session.interact(item.id, ActionKind::Like).unwrap();
    }
}

#[test]
fn test_restricted_session_never_repeats_items() {
    for seed in 0..10 {
        let mut session = Session::with_seed(sample_catalog(), SessionConfig::default(), seed);
        let mut seen: HashSet<ItemId> = HashSet::new();
        let mut total = 0usize;

        let mut report = session.start();
        for _ in 0..7 {
            for item in &report.feed {
                assert!(seen.insert(item.id), "item {} repeated (seed {})", item.id, seed);
            }
            total += report.feed.len();
            assert_eq!(session.ledger().total_views() as usize, total);

            play(&mut session, "ecology");
            report = session.advance_round().unwrap();
        }
    }
}

#[test]
fn test_liking_one_topic_shapes_the_summary() {
    let mut session = Session::with_seed(sample_catalog(), SessionConfig::default(), 42);
    let favorite = "ecology";
    let mut report = session.start();
    let mut summary = None;

    for _ in 0..7 {
        play(&mut session, favorite);
        report = session.advance_round().unwrap();
        if report.summary.is_some() {
            summary = report.summary.clone();
        }
    }

    assert_eq!(report.round, 8);
    let summary = summary.expect("summary is emitted once round 7 starts");
    assert!(summary.narrowing <= 100);
    assert_eq!(summary.diversity_percentage + summary.personalization_percentage, 100);
    assert!(summary
        .likes_by_topic
        .iter()
        .all(|entry| entry.topic == favorite));

    if !summary.likes_by_topic.is_empty() {
        // Only the favourite topic ever gains affinity
        let favourite_score = round_to_tenth(session.model().topic_affinity(favorite));
        assert!(favourite_score > 0.0);
        assert!(summary.preference_range.max <= favourite_score);
    }
}

#[test]
fn test_snapshot_reports_current_exposure() {
    let mut session = Session::with_seed(sample_catalog(), SessionConfig::default(), 5);
    session.start();
    session.advance_round().unwrap();
    let third = session.advance_round().unwrap();

    let snapshot = third.snapshot.expect("snapshot on round 3");
    assert_eq!(snapshot.round, 3);
    assert_eq!(snapshot.feed_preview.len(), third.feed.len());
    assert_eq!(
        snapshot.hidden_topics.len() + session.ledger().shown_topics().len(),
        session.all_topics().len()
    );
    let distributed: u32 = snapshot.topic_distribution.values().sum();
    assert!((97..=103).contains(&distributed));
}

#[test]
fn test_custom_cadence() {
    let config = SessionConfig {
        feed_size: 5,
        rounds_to_analysis: 2,
        rounds_to_summary: 3,
        ..SessionConfig::default()
    };
    let mut session = Session::with_seed(sample_catalog(), config, 11);
    let first = session.start();
    assert_eq!(first.feed.len(), 5);

    let second = session.advance_round().unwrap();
    assert!(second.snapshot.is_some());
    assert!(second.summary.is_none());

    let third = session.advance_round().unwrap();
    assert!(third.snapshot.is_none());
    assert!(third.summary.is_some());

    let fourth = session.advance_round().unwrap();
    assert!(fourth.snapshot.is_some());
    assert!(fourth.summary.is_none());
}

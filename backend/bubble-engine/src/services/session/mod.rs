// ============================================
// Session Orchestrator
// ============================================
//
// Owns all mutable state of one viewing session and drives the round loop:
// 1. start a round: pick diversity ratio, generate feed, record exposure
// 2. viewer acts on feed items (interact)
// 3. advance: untouched items count as scrolled past, next round starts
// 4. snapshot every N rounds, summary once past the summary round
//
// Every mutation goes through `&mut self`, so updates to one session are
// serialized by construction.

use crate::config::SessionConfig;
use crate::models::{ActionKind, InteractionLogEntry, Item, ItemId, Snapshot, Summary};
use crate::services::analytics::{self, SnapshotInput, SummaryInput};
use crate::services::catalog::topic_universe;
use crate::services::feed::{generate_feed, FeedRequest};
use crate::services::ledger::ExposureLedger;
use crate::services::preference::PreferenceModel;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Item {0} is not in the current feed")]
    ItemNotInFeed(ItemId),

    #[error("No active feed for round {0}")]
    NoActiveFeed(u32),
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// What one started round produced
#[derive(Debug, Clone)]
pub struct RoundReport {
    pub round: u32,
    pub diversity_ratio: f64,
    pub feed: Vec<Item>,
    pub snapshot: Option<Snapshot>,
    pub summary: Option<Summary>,
}

impl RoundReport {
    /// Catalog ran out of eligible items
    pub fn is_exhausted(&self) -> bool {
        self.feed.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// Unseen items only, shrinking diversity
    Restricted,
    /// Whole catalog, fixed high diversity
    Unrestricted,
}

pub struct Session {
    id: Uuid,
    started_at: DateTime<Utc>,
    config: SessionConfig,
    catalog: Vec<Item>,
    all_topics: Vec<String>,
    model: PreferenceModel,
    ledger: ExposureLedger,
    interaction_log: Vec<InteractionLogEntry>,
    shown_ids: HashSet<ItemId>,
    visible_feed: Vec<Item>,
    acted_this_round: usize,
    round: u32,
    mode: SessionMode,
    last_analysis_round: u32,
    summary_emitted: bool,
    rng: StdRng,
}

impl Session {
    pub fn new(catalog: Vec<Item>, config: SessionConfig) -> Self {
        Self::with_rng(catalog, config, StdRng::from_entropy())
    }

    /// Reproducible session for demos and tests
    pub fn with_seed(catalog: Vec<Item>, config: SessionConfig, seed: u64) -> Self {
        Self::with_rng(catalog, config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(catalog: Vec<Item>, config: SessionConfig, rng: StdRng) -> Self {
        let all_topics = topic_universe(&catalog);
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            config,
            catalog,
            all_topics,
            model: PreferenceModel::new(),
            ledger: ExposureLedger::new(),
            interaction_log: Vec::new(),
            shown_ids: HashSet::new(),
            visible_feed: Vec::new(),
            acted_this_round: 0,
            round: 1,
            mode: SessionMode::Restricted,
            last_analysis_round: 0,
            summary_emitted: false,
            rng,
        }
    }

    /// Play round 1 with a fresh model
    pub fn start(&mut self) -> RoundReport {
        self.reset(SessionMode::Restricted)
    }

    /// Record one viewer action on an item of the current feed
    pub fn interact(&mut self, item_id: ItemId, action: ActionKind) -> Result<()> {
        let position = self
            .visible_feed
            .iter()
            .position(|item| item.id == item_id)
            .ok_or(SessionError::ItemNotInFeed(item_id))?;

        let item = self.visible_feed.remove(position);
        self.model = self.model.apply_interaction(action, &item);
        self.interaction_log
            .push(InteractionLogEntry::new(&item, action, self.round));
        self.acted_this_round += 1;

        debug!(
            session_id = %self.id,
            round = self.round,
            item_id = item_id,
            action = %action,
            "Interaction recorded"
        );

        Ok(())
    }

    /// Close the current round and play the next one.
    ///
    /// Items still visible nobody acted on, so they are scrolled past. Fails
    /// once the visible feed is empty, either because the catalog ran dry or
    /// because every item of the round was acted on.
    pub fn advance_round(&mut self) -> Result<RoundReport> {
        if self.visible_feed.is_empty() {
            return Err(SessionError::NoActiveFeed(self.round));
        }

        let passive = std::mem::take(&mut self.visible_feed);
        for item in &passive {
            self.model = self.model.apply_interaction(ActionKind::Scroll, item);
        }

        self.round += 1;
        Ok(self.start_round(false))
    }

    /// Summary of the session so far, on demand
    pub fn summary_now(&self) -> Summary {
        self.build_summary()
    }

    /// Wipe the session and start over in restricted mode
    pub fn restart(&mut self) -> RoundReport {
        self.reset(SessionMode::Restricted)
    }

    /// Wipe the session and start over in unrestricted mode
    pub fn reset_unrestricted(&mut self) -> RoundReport {
        self.reset(SessionMode::Unrestricted)
    }

    fn reset(&mut self, mode: SessionMode) -> RoundReport {
        self.model = PreferenceModel::new();
        self.interaction_log.clear();
        self.ledger.reset();
        self.shown_ids.clear();
        self.round = 1;
        self.mode = mode;
        self.last_analysis_round = 0;
        self.summary_emitted = false;

        info!(session_id = %self.id, mode = ?mode, "Session reset");

        self.start_round(true)
    }

    fn start_round(&mut self, reset_exposure: bool) -> RoundReport {
        let unrestricted = self.mode == SessionMode::Unrestricted;
        let diversity_ratio = self.config.diversity_ratio(self.round, unrestricted);

        if reset_exposure || (unrestricted && self.round == 1) {
            self.shown_ids.clear();
            self.ledger.reset();
        }

        let feed: Vec<Item> = {
            let request = FeedRequest {
                catalog: &self.catalog,
                model: &self.model,
                shown_ids: &self.shown_ids,
                feed_size: self.config.feed_size,
                diversity_ratio,
                round: self.round,
                unrestricted,
            };
            generate_feed(&request, &mut self.rng)
                .into_iter()
                .cloned()
                .collect()
        };

        self.ledger.record_feed(&feed);
        self.shown_ids.extend(feed.iter().map(|item| item.id));
        self.visible_feed = feed.clone();
        self.acted_this_round = 0;

        if feed.is_empty() {
            warn!(
                session_id = %self.id,
                round = self.round,
                "Catalog exhausted, no items left to show"
            );
        } else {
            info!(
                session_id = %self.id,
                round = self.round,
                feed_len = feed.len(),
                diversity_ratio = diversity_ratio,
                unrestricted = unrestricted,
                "Round started"
            );
        }

        let mut report = RoundReport {
            round: self.round,
            diversity_ratio,
            feed,
            snapshot: None,
            summary: None,
        };

        if !unrestricted {
            if self.analysis_due() {
                report.snapshot = Some(self.build_snapshot(&report.feed));
                self.last_analysis_round = self.round;
            }
            if self.round >= self.config.rounds_to_summary && !self.summary_emitted {
                report.summary = Some(self.build_summary());
                self.summary_emitted = true;
            }
        }

        report
    }

    fn analysis_due(&self) -> bool {
        self.config.rounds_to_analysis > 0
            && self.round % self.config.rounds_to_analysis == 0
            && self.last_analysis_round != self.round
    }

    fn build_snapshot(&self, feed: &[Item]) -> Snapshot {
        analytics::snapshot(&SnapshotInput {
            feed,
            all_topics: &self.all_topics,
            shown_topics: self.ledger.shown_topics(),
            exposure_by_topic: self.ledger.exposure_by_topic(),
            round: self.round,
            interaction_count: self.interaction_log.len(),
            model: &self.model,
        })
    }

    fn build_summary(&self) -> Summary {
        analytics::summary(&SummaryInput {
            model: &self.model,
            all_topics: &self.all_topics,
            shown_topics: self.ledger.shown_topics(),
            interaction_log: &self.interaction_log,
            exposure_by_topic: self.ledger.exposure_by_topic(),
            exposure_by_sentiment: self.ledger.exposure_by_sentiment(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Items of the current round not yet acted on
    pub fn current_feed(&self) -> &[Item] {
        &self.visible_feed
    }

    pub fn model(&self) -> &PreferenceModel {
        &self.model
    }

    pub fn ledger(&self) -> &ExposureLedger {
        &self.ledger
    }

    pub fn interaction_log(&self) -> &[InteractionLogEntry] {
        &self.interaction_log
    }

    pub fn all_topics(&self) -> &[String] {
        &self.all_topics
    }

    /// Share of this round's feed the viewer acted on, capped at 100
    pub fn progress_percent(&self) -> f64 {
        if self.config.feed_size == 0 {
            return 0.0;
        }
        (self.acted_this_round as f64 / self.config.feed_size as f64 * 100.0).min(100.0)
    }
}

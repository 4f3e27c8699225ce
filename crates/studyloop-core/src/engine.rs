//! Review engine orchestrator.
//!
//! Drives one review session against a [`ReviewStore`]: adaptive selection
//! at the start, per-answer mastery and schedule updates, and a single
//! progress application at the end. The rules themselves live in the pure
//! `selector`, `mastery`, `scheduler`, and `progress` modules.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

use crate::badges::{newly_earned, Badge};
use crate::error::{EngineError, StoreError};
use crate::mastery::update_mastery;
use crate::model::{
    Card, ConceptMastery, DeckId, LearnerId, LearnerProgress, MasteryKey, MasteryMap, Outcome,
    ReviewEvent, Schedule, SessionId, SessionStats,
};
use crate::progress::{apply_session_outcome, xp_for};
use crate::report::SessionSummary;
use crate::scheduler::schedule_review;
use crate::selector::{
    select_session, select_unweighted, SelectionStrategy, SessionSelection, DEFAULT_SESSION_SIZE,
};
use crate::statistics::{accuracy_percent, suggest_difficulty_adjustment};
use crate::traits::ReviewStore;

/// Configuration for the review engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Cards per session.
    pub session_size: usize,
    /// Wall-clock budget for one session.
    pub review_window: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            session_size: DEFAULT_SESSION_SIZE,
            review_window: Duration::from_secs(90),
        }
    }
}

/// Session lifecycle hooks.
pub trait SessionObserver: Send + Sync {
    fn on_session_start(&self, session: &ReviewSession);
    fn on_answer(&self, record: &AnswerRecord);
    fn on_session_complete(&self, summary: &SessionSummary);
}

/// No-op session observer.
pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn on_session_start(&self, _: &ReviewSession) {}
    fn on_answer(&self, _: &AnswerRecord) {}
    fn on_session_complete(&self, _: &SessionSummary) {}
}

/// An in-progress review session.
#[derive(Debug, Clone)]
pub struct ReviewSession {
    id: SessionId,
    learner_id: LearnerId,
    deck_id: DeckId,
    cards: Vec<Card>,
    strategy: SelectionStrategy,
    started_at: DateTime<Utc>,
    last_answer_at: DateTime<Utc>,
    review_window: Duration,
    position: usize,
    stats: SessionStats,
    /// Mastery snapshot; `None` when it could not be fetched at start.
    mastery: Option<MasteryMap>,
    completed: bool,
}

impl ReviewSession {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn learner_id(&self) -> &LearnerId {
        &self.learner_id
    }

    pub fn deck_id(&self) -> &DeckId {
        &self.deck_id
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn strategy(&self) -> SelectionStrategy {
        self.strategy
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// The card awaiting an answer, if any.
    pub fn current_card(&self) -> Option<&Card> {
        self.cards.get(self.position)
    }

    /// Index of the current card (number of cards already answered).
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.cards.len().saturating_sub(self.position)
    }

    /// A deck with no cards yields an empty session; callers should not start it.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Every card has an outcome.
    pub fn is_finished(&self) -> bool {
        self.remaining() == 0
    }

    /// Progress for this session has been applied.
    pub fn is_complete(&self) -> bool {
        self.completed
    }

    /// Time left in the review window at `now`.
    pub fn time_remaining(&self, now: DateTime<Utc>) -> Duration {
        let elapsed = (now - self.started_at).to_std().unwrap_or(Duration::ZERO);
        self.review_window.saturating_sub(elapsed)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.time_remaining(now).is_zero()
    }

    fn advance(&mut self, outcome: Outcome, now: DateTime<Utc>, schedule: Option<&Schedule>) {
        if let (Some(card), Some(schedule)) = (self.cards.get_mut(self.position), schedule) {
            card.schedule = schedule.clone();
        }
        self.stats.record(outcome);
        self.position += 1;
        self.last_answer_at = now;
    }

    /// Count every unanswered card as skipped.
    fn skip_remaining(&mut self) {
        let remaining = self.remaining() as u32;
        self.stats.skipped += remaining;
        self.position = self.cards.len();
    }
}

/// What one answer changed.
#[derive(Debug, Clone)]
pub struct AnswerRecord {
    pub card: Card,
    pub event: ReviewEvent,
    /// Updated mastery, when the card carries a concept and was attempted.
    pub mastery: Option<ConceptMastery>,
    /// Updated schedule, when the card was attempted.
    pub schedule: Option<Schedule>,
}

/// The central review engine.
pub struct ReviewEngine {
    store: Arc<dyn ReviewStore>,
    config: EngineConfig,
    rng: Mutex<Box<dyn RngCore + Send>>,
    observer: Arc<dyn SessionObserver>,
}

impl ReviewEngine {
    /// Engine with an entropy-seeded random source.
    pub fn new(store: Arc<dyn ReviewStore>, config: EngineConfig) -> Self {
        Self::with_rng(store, config, StdRng::from_entropy())
    }

    /// Engine whose selections are reproducible for a given seed.
    pub fn with_seed(store: Arc<dyn ReviewStore>, config: EngineConfig, seed: u64) -> Self {
        Self::with_rng(store, config, ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn with_rng(
        store: Arc<dyn ReviewStore>,
        config: EngineConfig,
        rng: impl RngCore + Send + 'static,
    ) -> Self {
        Self {
            store,
            config,
            rng: Mutex::new(Box::new(rng)),
            observer: Arc::new(NoopObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Build a session for a learner and deck.
    ///
    /// Cards and mastery are fetched concurrently. Storage failures only
    /// degrade selection: without mastery the session is unweighted, and a
    /// failed card read is retried once for a plain pull, then yields an
    /// empty session. An unknown deck is still an error.
    pub async fn start_session(
        &self,
        learner_id: &LearnerId,
        deck_id: &DeckId,
        now: DateTime<Utc>,
    ) -> Result<ReviewSession, EngineError> {
        let (cards, mastery) = futures::join!(
            self.store.list_cards_for_deck(deck_id),
            self.store.get_mastery(learner_id, deck_id)
        );

        let selection = match cards {
            Ok(cards) => {
                let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
                select_session(
                    &cards,
                    mastery.as_ref(),
                    self.config.session_size,
                    &mut **rng,
                )
            }
            Err(e @ StoreError::DeckNotFound(_)) => return Err(e.into()),
            Err(e) => {
                tracing::warn!("card fetch failed, retrying for unweighted selection: {e}");
                let cards = match self.store.list_cards_for_deck(deck_id).await {
                    Ok(cards) => cards,
                    Err(e) => {
                        tracing::warn!("card fetch retry failed, session is empty: {e}");
                        Vec::new()
                    }
                };
                SessionSelection {
                    cards: select_unweighted(&cards, self.config.session_size),
                    strategy: SelectionStrategy::Unweighted,
                }
            }
        };

        let session = ReviewSession {
            id: Uuid::new_v4(),
            learner_id: learner_id.clone(),
            deck_id: deck_id.clone(),
            cards: selection.cards,
            strategy: selection.strategy,
            started_at: now,
            last_answer_at: now,
            review_window: self.config.review_window,
            position: 0,
            stats: SessionStats::default(),
            mastery: mastery.ok(),
            completed: false,
        };

        tracing::info!(
            session = %session.id,
            deck = %deck_id,
            cards = session.cards.len(),
            strategy = ?session.strategy,
            "review session started"
        );
        self.observer.on_session_start(&session);
        Ok(session)
    }

    /// Record the learner's answer to the current card.
    ///
    /// The mastery and schedule updates are persisted concurrently; the review
    /// event is appended only after both succeed, so a retried answer logs a
    /// single event. The session only advances once all three are stored.
    pub async fn record_answer(
        &self,
        session: &mut ReviewSession,
        outcome: Outcome,
        now: DateTime<Utc>,
    ) -> Result<AnswerRecord, EngineError> {
        if session.completed {
            return Err(EngineError::SessionAlreadyCompleted(session.id));
        }
        let card = session
            .current_card()
            .cloned()
            .ok_or(EngineError::SessionFinished(session.id))?;

        let event = ReviewEvent {
            learner_id: session.learner_id.clone(),
            card_id: card.id.clone(),
            deck_id: session.deck_id.clone(),
            session_id: session.id,
            outcome,
            time_spent_secs: (now - session.last_answer_at).num_seconds().max(0) as u64,
            reviewed_at: now,
            timer_remaining_secs: Some(session.time_remaining(now).as_secs()),
        };

        let schedule = schedule_review(&card.schedule, outcome, now);

        let mastery = match card.concept.as_deref() {
            Some(concept) if outcome.is_attempt() => {
                if session.mastery.is_none() {
                    session.mastery = Some(
                        self.store
                            .get_mastery(&session.learner_id, &session.deck_id)
                            .await?,
                    );
                }
                let key = MasteryKey {
                    learner_id: session.learner_id.clone(),
                    deck_id: session.deck_id.clone(),
                    concept: concept.to_string(),
                };
                let current = session.mastery.as_ref().and_then(|m| m.get(concept));
                update_mastery(current, &key, outcome, now)
            }
            _ => None,
        };

        let mastery_write = async {
            match &mastery {
                Some(record) => self.store.upsert_mastery(record).await,
                None => Ok(()),
            }
        };
        let schedule_write = async {
            match &schedule {
                Some(next) => self.store.update_card_schedule(&card.id, next).await,
                None => Ok(()),
            }
        };
        futures::try_join!(mastery_write, schedule_write)?;
        self.store.append_review_event(&event).await?;

        if let (Some(record), Some(snapshot)) = (&mastery, session.mastery.as_mut()) {
            snapshot.insert(record.concept.clone(), record.clone());
        }
        session.advance(outcome, now, schedule.as_ref());

        tracing::debug!(
            session = %session.id,
            card = %card.id,
            %outcome,
            interval_days = schedule.as_ref().map(|s| s.interval_days),
            mastery = mastery.as_ref().map(|m| m.mastery),
            "answer recorded"
        );

        let record = AnswerRecord {
            card,
            event,
            mastery,
            schedule,
        };
        self.observer.on_answer(&record);
        Ok(record)
    }

    /// Finish a session and apply its outcome to learner progress.
    ///
    /// Unanswered cards (time ran out) count as skips. The new progress is
    /// stored together with the session's claim in the completion ledger, so
    /// progress is applied at most once per session. If that write fails
    /// nothing is claimed and the call can be retried.
    pub async fn complete_session(
        &self,
        session: &mut ReviewSession,
        now: DateTime<Utc>,
    ) -> Result<SessionSummary, EngineError> {
        if session.completed {
            return Err(EngineError::SessionAlreadyCompleted(session.id));
        }
        session.skip_remaining();

        let prior = self
            .store
            .get_progress(&session.learner_id)
            .await?
            .unwrap_or_else(|| LearnerProgress::new(session.learner_id.clone()));

        let stats = session.stats;
        let update = apply_session_outcome(&prior, &stats, now.date_naive());
        let applied = self
            .store
            .apply_session_progress(session.id, &update.progress)
            .await?;
        session.completed = true;
        if !applied {
            return Err(EngineError::SessionAlreadyCompleted(session.id));
        }

        let badges_awarded = self.award_badges(&update.progress).await;

        tracing::info!(
            session = %session.id,
            correct = stats.correct,
            incorrect = stats.incorrect,
            skipped = stats.skipped,
            xp = update.progress.xp,
            level = update.progress.level,
            "review session completed"
        );

        let summary = SessionSummary {
            session_id: session.id,
            learner_id: session.learner_id.clone(),
            deck_id: session.deck_id.clone(),
            started_at: session.started_at,
            completed_at: now,
            strategy: session.strategy,
            stats,
            accuracy_percent: accuracy_percent(&stats),
            xp_earned: xp_for(&stats),
            difficulty: suggest_difficulty_adjustment(stats.correct, stats.attempted()),
            progress: update.progress,
            events: update.events,
            badges_awarded,
        };
        self.observer.on_session_complete(&summary);
        Ok(summary)
    }

    /// Award every badge the learner newly qualifies for.
    ///
    /// Badge failures never fail the session; they are logged and skipped.
    async fn award_badges(&self, progress: &LearnerProgress) -> Vec<Badge> {
        let (catalog, earned) = futures::join!(
            self.store.list_badges(),
            self.store.earned_badges(&progress.learner_id)
        );
        let (catalog, earned) = match (catalog, earned) {
            (Ok(catalog), Ok(earned)) => (catalog, earned),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!("skipping badge check: {e}");
                return Vec::new();
            }
        };

        let mut awarded = Vec::new();
        for badge in newly_earned(progress, &catalog, &earned) {
            match self.store.award_badge(&progress.learner_id, &badge.id).await {
                Ok(()) => awarded.push(badge.clone()),
                Err(e) => tracing::warn!("failed to award badge '{}': {e}", badge.id),
            }
        }
        awarded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CardKind;
    use chrono::Duration as ChronoDuration;

    fn session_with(cards: usize) -> ReviewSession {
        let now = Utc::now();
        ReviewSession {
            id: Uuid::new_v4(),
            learner_id: "learner".into(),
            deck_id: "deck".into(),
            cards: (0..cards)
                .map(|i| Card {
                    id: format!("c{i}"),
                    deck_id: "deck".into(),
                    question: "Q".into(),
                    answer: "A".into(),
                    kind: CardKind::Flashcard,
                    options: vec![],
                    concept: None,
                    schedule: Schedule::default(),
                })
                .collect(),
            strategy: SelectionStrategy::Weighted,
            started_at: now,
            last_answer_at: now,
            review_window: Duration::from_secs(90),
            position: 0,
            stats: SessionStats::default(),
            mastery: Some(MasteryMap::new()),
            completed: false,
        }
    }

    #[test]
    fn review_window_expiry() {
        let session = session_with(3);
        let start = session.started_at();
        assert_eq!(session.time_remaining(start), Duration::from_secs(90));
        assert!(!session.is_expired(start + ChronoDuration::seconds(89)));
        assert!(session.is_expired(start + ChronoDuration::seconds(90)));
        assert_eq!(
            session.time_remaining(start + ChronoDuration::seconds(500)),
            Duration::ZERO
        );
    }

    #[test]
    fn skip_remaining_counts_unanswered() {
        let mut session = session_with(5);
        let now = session.started_at();
        session.advance(Outcome::Correct, now, None);
        session.advance(Outcome::Incorrect, now, None);
        session.skip_remaining();
        assert_eq!(session.stats(), SessionStats::new(1, 1, 3));
        assert!(session.is_finished());
        assert!(session.current_card().is_none());
    }

    #[test]
    fn advance_applies_schedule_to_session_copy() {
        let mut session = session_with(2);
        let now = session.started_at();
        let next = schedule_review(&Schedule::default(), Outcome::Correct, now).unwrap();
        session.advance(Outcome::Correct, now, Some(&next));
        assert_eq!(session.cards()[0].schedule, next);
        assert_eq!(session.position(), 1);
        assert_eq!(session.remaining(), 1);
    }
}

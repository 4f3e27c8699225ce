//! Failure-injecting store for testing.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use studyloop_core::badges::Badge;
use studyloop_core::error::StoreError;
use studyloop_core::model::{
    Card, CardId, ConceptMastery, Deck, DeckId, DeckInfo, LearnerId, LearnerProgress, MasteryMap,
    ReviewEvent, Schedule, SessionId,
};
use studyloop_core::traits::ReviewStore;

use crate::memory::MemoryStore;

/// A [`MemoryStore`] whose calls can be made to fail on demand.
///
/// Lets tests exercise the engine's degradation paths without a real
/// backend outage.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_card_reads: AtomicBool,
    fail_mastery_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_schedule_writes: AtomicBool,
    fail_badges: AtomicBool,
    /// Number of `get_mastery` calls made.
    mastery_reads: AtomicU32,
    /// Number of write calls made, failed or not.
    writes: AtomicU32,
    /// Last schedule written.
    last_schedule: Mutex<Option<(CardId, Schedule)>>,
}

impl FlakyStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    pub fn set_fail_card_reads(&self, fail: bool) {
        self.fail_card_reads.store(fail, Ordering::Relaxed);
    }

    pub fn set_fail_mastery_reads(&self, fail: bool) {
        self.fail_mastery_reads.store(fail, Ordering::Relaxed);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    /// Fail only `update_card_schedule`, leaving other writes working.
    pub fn set_fail_schedule_writes(&self, fail: bool) {
        self.fail_schedule_writes.store(fail, Ordering::Relaxed);
    }

    pub fn set_fail_badges(&self, fail: bool) {
        self.fail_badges.store(fail, Ordering::Relaxed);
    }

    pub fn mastery_reads(&self) -> u32 {
        self.mastery_reads.load(Ordering::Relaxed)
    }

    pub fn writes(&self) -> u32 {
        self.writes.load(Ordering::Relaxed)
    }

    pub fn last_schedule(&self) -> Option<(CardId, Schedule)> {
        self.last_schedule
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn check(flag: &AtomicBool, what: &str) -> Result<(), StoreError> {
        if flag.load(Ordering::Relaxed) {
            Err(StoreError::Unavailable(format!("injected {what} failure")))
        } else {
            Ok(())
        }
    }

    fn check_write(&self) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::Relaxed);
        Self::check(&self.fail_writes, "write")
    }
}

#[async_trait]
impl ReviewStore for FlakyStore {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn list_cards_for_deck(&self, deck_id: &DeckId) -> Result<Vec<Card>, StoreError> {
        Self::check(&self.fail_card_reads, "card read")?;
        self.inner.list_cards_for_deck(deck_id).await
    }

    async fn get_mastery(
        &self,
        learner_id: &LearnerId,
        deck_id: &DeckId,
    ) -> Result<MasteryMap, StoreError> {
        self.mastery_reads.fetch_add(1, Ordering::Relaxed);
        Self::check(&self.fail_mastery_reads, "mastery read")?;
        self.inner.get_mastery(learner_id, deck_id).await
    }

    async fn upsert_mastery(&self, record: &ConceptMastery) -> Result<(), StoreError> {
        self.check_write()?;
        self.inner.upsert_mastery(record).await
    }

    async fn update_card_schedule(
        &self,
        card_id: &CardId,
        schedule: &Schedule,
    ) -> Result<(), StoreError> {
        self.check_write()?;
        Self::check(&self.fail_schedule_writes, "schedule write")?;
        self.inner.update_card_schedule(card_id, schedule).await?;
        *self
            .last_schedule
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some((card_id.clone(), schedule.clone()));
        Ok(())
    }

    async fn get_progress(
        &self,
        learner_id: &LearnerId,
    ) -> Result<Option<LearnerProgress>, StoreError> {
        self.inner.get_progress(learner_id).await
    }

    async fn update_progress(&self, progress: &LearnerProgress) -> Result<(), StoreError> {
        self.check_write()?;
        self.inner.update_progress(progress).await
    }

    async fn append_review_event(&self, event: &ReviewEvent) -> Result<(), StoreError> {
        self.check_write()?;
        self.inner.append_review_event(event).await
    }

    async fn save_deck(&self, deck: &Deck) -> Result<(), StoreError> {
        self.check_write()?;
        self.inner.save_deck(deck).await
    }

    async fn list_decks(&self) -> Result<Vec<DeckInfo>, StoreError> {
        self.inner.list_decks().await
    }

    async fn apply_session_progress(
        &self,
        session_id: SessionId,
        progress: &LearnerProgress,
    ) -> Result<bool, StoreError> {
        self.check_write()?;
        self.inner.apply_session_progress(session_id, progress).await
    }

    async fn list_badges(&self) -> Result<Vec<Badge>, StoreError> {
        Self::check(&self.fail_badges, "badge read")?;
        self.inner.list_badges().await
    }

    async fn earned_badges(&self, learner_id: &LearnerId) -> Result<HashSet<String>, StoreError> {
        Self::check(&self.fail_badges, "badge read")?;
        self.inner.earned_badges(learner_id).await
    }

    async fn award_badge(&self, learner_id: &LearnerId, badge_id: &str) -> Result<(), StoreError> {
        Self::check(&self.fail_badges, "badge write")?;
        self.inner.award_badge(learner_id, badge_id).await
    }
}

//! In-memory review store.

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::RwLock;

use studyloop_core::badges::Badge;
use studyloop_core::error::StoreError;
use studyloop_core::model::{
    Card, CardId, ConceptMastery, Deck, DeckId, DeckInfo, LearnerId, LearnerProgress, MasteryMap,
    ReviewEvent, Schedule, SessionId,
};
use studyloop_core::traits::ReviewStore;

use crate::state::StoreState;

/// A store that lives only as long as the process.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Review events recorded so far.
    pub async fn events(&self) -> Vec<ReviewEvent> {
        self.state.read().await.events.clone()
    }
}

#[async_trait]
impl ReviewStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn list_cards_for_deck(&self, deck_id: &DeckId) -> Result<Vec<Card>, StoreError> {
        self.state.read().await.cards_for_deck(deck_id)
    }

    async fn get_mastery(
        &self,
        learner_id: &LearnerId,
        deck_id: &DeckId,
    ) -> Result<MasteryMap, StoreError> {
        Ok(self.state.read().await.mastery_for(learner_id, deck_id))
    }

    async fn upsert_mastery(&self, record: &ConceptMastery) -> Result<(), StoreError> {
        self.state.write().await.upsert_mastery(record);
        Ok(())
    }

    async fn update_card_schedule(
        &self,
        card_id: &CardId,
        schedule: &Schedule,
    ) -> Result<(), StoreError> {
        self.state
            .write()
            .await
            .update_card_schedule(card_id, schedule)
    }

    async fn get_progress(
        &self,
        learner_id: &LearnerId,
    ) -> Result<Option<LearnerProgress>, StoreError> {
        Ok(self.state.read().await.progress.get(learner_id).cloned())
    }

    async fn update_progress(&self, progress: &LearnerProgress) -> Result<(), StoreError> {
        self.state
            .write()
            .await
            .progress
            .insert(progress.learner_id.clone(), progress.clone());
        Ok(())
    }

    async fn append_review_event(&self, event: &ReviewEvent) -> Result<(), StoreError> {
        self.state.write().await.events.push(event.clone());
        Ok(())
    }

    async fn save_deck(&self, deck: &Deck) -> Result<(), StoreError> {
        self.state.write().await.save_deck(deck);
        Ok(())
    }

    async fn list_decks(&self) -> Result<Vec<DeckInfo>, StoreError> {
        Ok(self.state.read().await.deck_infos())
    }

    async fn apply_session_progress(
        &self,
        session_id: SessionId,
        progress: &LearnerProgress,
    ) -> Result<bool, StoreError> {
        Ok(self
            .state
            .write()
            .await
            .apply_session_progress(session_id, progress))
    }

    async fn list_badges(&self) -> Result<Vec<Badge>, StoreError> {
        Ok(self.state.read().await.badges.clone())
    }

    async fn earned_badges(&self, learner_id: &LearnerId) -> Result<HashSet<String>, StoreError> {
        Ok(self.state.read().await.earned_badges(learner_id))
    }

    async fn award_badge(&self, learner_id: &LearnerId, badge_id: &str) -> Result<(), StoreError> {
        self.state.write().await.award_badge(learner_id, badge_id);
        Ok(())
    }
}

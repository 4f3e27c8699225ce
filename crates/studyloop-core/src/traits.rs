//! Core trait definitions for the storage collaborator.
//!
//! The review engine reads and writes everything through [`ReviewStore`].
//! Implementations live in the `studyloop-store` crate.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::badges::Badge;
use crate::error::StoreError;
use crate::model::{
    Card, CardId, ConceptMastery, Deck, DeckId, DeckInfo, LearnerId, LearnerProgress, MasteryMap,
    ReviewEvent, Schedule, SessionId,
};

// ---------------------------------------------------------------------------
// Storage collaborator trait
// ---------------------------------------------------------------------------

/// Persistence for cards, mastery, progress, and review history.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Human-readable store name (e.g. "memory").
    fn name(&self) -> &str;

    /// All cards in a deck. An unknown deck yields `DeckNotFound`.
    async fn list_cards_for_deck(&self, deck_id: &DeckId) -> Result<Vec<Card>, StoreError>;

    /// The learner's concept mastery for one deck, keyed by concept name.
    async fn get_mastery(
        &self,
        learner_id: &LearnerId,
        deck_id: &DeckId,
    ) -> Result<MasteryMap, StoreError>;

    /// Insert or replace a mastery record.
    async fn upsert_mastery(&self, record: &ConceptMastery) -> Result<(), StoreError>;

    /// Replace a card's scheduling state.
    async fn update_card_schedule(
        &self,
        card_id: &CardId,
        schedule: &Schedule,
    ) -> Result<(), StoreError>;

    /// Learner progress, or `None` for a learner who never studied.
    async fn get_progress(
        &self,
        learner_id: &LearnerId,
    ) -> Result<Option<LearnerProgress>, StoreError>;

    /// Insert or replace learner progress.
    async fn update_progress(&self, progress: &LearnerProgress) -> Result<(), StoreError>;

    /// Append an immutable review event.
    async fn append_review_event(&self, event: &ReviewEvent) -> Result<(), StoreError>;

    /// Store a generated deck and its cards, replacing any deck with the same id.
    async fn save_deck(&self, deck: &Deck) -> Result<(), StoreError>;

    /// All stored decks.
    async fn list_decks(&self) -> Result<Vec<DeckInfo>, StoreError>;

    /// Claim a session in the completion ledger and store the learner's
    /// progress, as one atomic write.
    ///
    /// Returns `false`, without touching progress, if the session was
    /// already claimed. A failed call claims nothing.
    async fn apply_session_progress(
        &self,
        session_id: SessionId,
        progress: &LearnerProgress,
    ) -> Result<bool, StoreError>;

    /// The badge catalog.
    async fn list_badges(&self) -> Result<Vec<Badge>, StoreError>;

    /// Ids of the badges a learner already holds.
    async fn earned_badges(&self, learner_id: &LearnerId) -> Result<HashSet<String>, StoreError>;

    /// Record that a learner earned a badge.
    async fn award_badge(&self, learner_id: &LearnerId, badge_id: &str) -> Result<(), StoreError>;
}

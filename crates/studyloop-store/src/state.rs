//! The plain data behind every store, and the rules for mutating it.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use studyloop_core::badges::{default_catalog, Badge};
use studyloop_core::error::StoreError;
use studyloop_core::model::{
    Card, CardId, ConceptMastery, Deck, DeckId, DeckInfo, LearnerId, LearnerProgress, MasteryMap,
    ReviewEvent, Schedule, SessionId,
};

/// Everything a store holds. Serializes to the JSON snapshot format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreState {
    #[serde(default)]
    pub decks: BTreeMap<DeckId, Deck>,
    /// learner → deck → concept → mastery.
    #[serde(default)]
    pub mastery: BTreeMap<LearnerId, BTreeMap<DeckId, MasteryMap>>,
    #[serde(default)]
    pub progress: BTreeMap<LearnerId, LearnerProgress>,
    #[serde(default)]
    pub events: Vec<ReviewEvent>,
    #[serde(default)]
    pub completed_sessions: BTreeSet<SessionId>,
    #[serde(default = "default_catalog")]
    pub badges: Vec<Badge>,
    #[serde(default)]
    pub earned_badges: BTreeMap<LearnerId, BTreeSet<String>>,
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            decks: BTreeMap::new(),
            mastery: BTreeMap::new(),
            progress: BTreeMap::new(),
            events: Vec::new(),
            completed_sessions: BTreeSet::new(),
            badges: default_catalog(),
            earned_badges: BTreeMap::new(),
        }
    }
}

impl StoreState {
    pub fn cards_for_deck(&self, deck_id: &DeckId) -> Result<Vec<Card>, StoreError> {
        self.decks
            .get(deck_id)
            .map(|deck| deck.cards.clone())
            .ok_or_else(|| StoreError::DeckNotFound(deck_id.clone()))
    }

    pub fn mastery_for(&self, learner_id: &LearnerId, deck_id: &DeckId) -> MasteryMap {
        self.mastery
            .get(learner_id)
            .and_then(|decks| decks.get(deck_id))
            .cloned()
            .unwrap_or_default()
    }

    pub fn upsert_mastery(&mut self, record: &ConceptMastery) {
        self.mastery
            .entry(record.learner_id.clone())
            .or_default()
            .entry(record.deck_id.clone())
            .or_default()
            .insert(record.concept.clone(), record.clone());
    }

    /// Card ids are unique across decks; the first match is updated.
    pub fn update_card_schedule(
        &mut self,
        card_id: &CardId,
        schedule: &Schedule,
    ) -> Result<(), StoreError> {
        let card = self
            .decks
            .values_mut()
            .flat_map(|deck| deck.cards.iter_mut())
            .find(|card| &card.id == card_id)
            .ok_or_else(|| StoreError::CardNotFound(card_id.clone()))?;
        card.schedule = schedule.clone();
        Ok(())
    }

    /// Replace a deck. Cards that survive a re-import keep their schedules.
    pub fn save_deck(&mut self, deck: &Deck) {
        let mut deck = deck.clone();
        if let Some(existing) = self.decks.get(&deck.id) {
            for card in &mut deck.cards {
                if let Some(old) = existing.cards.iter().find(|c| c.id == card.id) {
                    card.schedule = old.schedule.clone();
                }
            }
        }
        self.decks.insert(deck.id.clone(), deck);
    }

    pub fn deck_infos(&self) -> Vec<DeckInfo> {
        self.decks
            .values()
            .map(|deck| DeckInfo {
                id: deck.id.clone(),
                title: deck.title.clone(),
                card_count: deck.cards.len(),
            })
            .collect()
    }

    /// Claim `session_id` in the ledger and store `progress` with it.
    ///
    /// Returns `false`, and changes nothing, if the session was already claimed.
    pub fn apply_session_progress(
        &mut self,
        session_id: SessionId,
        progress: &LearnerProgress,
    ) -> bool {
        if !self.completed_sessions.insert(session_id) {
            return false;
        }
        self.progress
            .insert(progress.learner_id.clone(), progress.clone());
        true
    }

    pub fn earned_badges(&self, learner_id: &LearnerId) -> HashSet<String> {
        self.earned_badges
            .get(learner_id)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn award_badge(&mut self, learner_id: &LearnerId, badge_id: &str) {
        self.earned_badges
            .entry(learner_id.clone())
            .or_default()
            .insert(badge_id.to_string());
    }
}

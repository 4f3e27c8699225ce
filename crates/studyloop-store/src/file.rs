//! JSON-file review store.
//!
//! Keeps the whole state in memory and rewrites a pretty-printed snapshot
//! after every mutation. The snapshot is written to a temporary sibling file
//! and renamed over the original, so a crash never leaves half a file.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use studyloop_core::badges::Badge;
use studyloop_core::error::StoreError;
use studyloop_core::model::{
    Card, CardId, ConceptMastery, Deck, DeckId, DeckInfo, LearnerId, LearnerProgress, MasteryMap,
    ReviewEvent, Schedule, SessionId,
};
use studyloop_core::traits::ReviewStore;

use crate::state::StoreState;

pub struct JsonFileStore {
    path: PathBuf,
    state: Mutex<StoreState>,
}

impl JsonFileStore {
    /// Open a store at `path`. A missing file starts an empty store.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let state = match tokio::fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("no data file at {}, starting empty", path.display());
                StoreState::default()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply a mutation and persist the result.
    ///
    /// The in-memory state is only replaced once the snapshot is on disk.
    async fn mutate<T>(
        &self,
        f: impl FnOnce(&mut StoreState) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self.state.lock().await;
        let mut next = guard.clone();
        let value = f(&mut next)?;
        persist(&self.path, &next).await?;
        *guard = next;
        Ok(value)
    }
}

async fn persist(path: &Path, state: &StoreState) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(state)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, json).await?;
    tokio::fs::rename(&tmp, path).await?;
    tracing::trace!("wrote store snapshot to {}", path.display());
    Ok(())
}

#[async_trait]
impl ReviewStore for JsonFileStore {
    fn name(&self) -> &str {
        "json"
    }

    async fn list_cards_for_deck(&self, deck_id: &DeckId) -> Result<Vec<Card>, StoreError> {
        self.state.lock().await.cards_for_deck(deck_id)
    }

    async fn get_mastery(
        &self,
        learner_id: &LearnerId,
        deck_id: &DeckId,
    ) -> Result<MasteryMap, StoreError> {
        Ok(self.state.lock().await.mastery_for(learner_id, deck_id))
    }

    async fn upsert_mastery(&self, record: &ConceptMastery) -> Result<(), StoreError> {
        self.mutate(|state| {
            state.upsert_mastery(record);
            Ok(())
        })
        .await
    }

    async fn update_card_schedule(
        &self,
        card_id: &CardId,
        schedule: &Schedule,
    ) -> Result<(), StoreError> {
        self.mutate(|state| state.update_card_schedule(card_id, schedule))
            .await
    }

    async fn get_progress(
        &self,
        learner_id: &LearnerId,
    ) -> Result<Option<LearnerProgress>, StoreError> {
        Ok(self.state.lock().await.progress.get(learner_id).cloned())
    }

    async fn update_progress(&self, progress: &LearnerProgress) -> Result<(), StoreError> {
        self.mutate(|state| {
            state
                .progress
                .insert(progress.learner_id.clone(), progress.clone());
            Ok(())
        })
        .await
    }

    async fn append_review_event(&self, event: &ReviewEvent) -> Result<(), StoreError> {
        self.mutate(|state| {
            state.events.push(event.clone());
            Ok(())
        })
        .await
    }

    async fn save_deck(&self, deck: &Deck) -> Result<(), StoreError> {
        self.mutate(|state| {
            state.save_deck(deck);
            Ok(())
        })
        .await
    }

    async fn list_decks(&self) -> Result<Vec<DeckInfo>, StoreError> {
        Ok(self.state.lock().await.deck_infos())
    }

    async fn apply_session_progress(
        &self,
        session_id: SessionId,
        progress: &LearnerProgress,
    ) -> Result<bool, StoreError> {
        self.mutate(|state| Ok(state.apply_session_progress(session_id, progress)))
            .await
    }

    async fn list_badges(&self) -> Result<Vec<Badge>, StoreError> {
        Ok(self.state.lock().await.badges.clone())
    }

    async fn earned_badges(&self, learner_id: &LearnerId) -> Result<HashSet<String>, StoreError> {
        Ok(self.state.lock().await.earned_badges(learner_id))
    }

    async fn award_badge(&self, learner_id: &LearnerId, badge_id: &str) -> Result<(), StoreError> {
        self.mutate(|state| {
            state.award_badge(learner_id, badge_id);
            Ok(())
        })
        .await
    }
}

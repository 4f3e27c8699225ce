//! Core data model types for studyloop.
//!
//! Cards, decks, concept mastery records, review events, and learner
//! progress. The review engine owns the rules that transform these; a
//! [`ReviewStore`](crate::traits::ReviewStore) owns their persistence.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type LearnerId = String;
pub type DeckId = String;
pub type CardId = String;
pub type SessionId = Uuid;

/// Easiness factor assigned to a freshly generated card.
pub const DEFAULT_EASINESS: f64 = 2.5;

/// Concept name → mastery record, for one learner and one deck.
pub type MasteryMap = HashMap<String, ConceptMastery>;

/// The kind of card produced by deck generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardKind {
    Flashcard,
    Mcq,
}

impl fmt::Display for CardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardKind::Flashcard => write!(f, "flashcard"),
            CardKind::Mcq => write!(f, "mcq"),
        }
    }
}

impl FromStr for CardKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "flashcard" | "card" => Ok(CardKind::Flashcard),
            "mcq" | "multiple-choice" | "multiple_choice" => Ok(CardKind::Mcq),
            other => Err(format!("unknown card kind: {other}")),
        }
    }
}

/// Spaced-repetition state carried by every card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// SM-2 easiness factor, never below 1.3.
    pub easiness: f64,
    /// Current interval in days.
    pub interval_days: u32,
    /// Consecutive successful repetitions.
    pub review_count: u32,
    /// When the card was last answered.
    #[serde(default)]
    pub last_reviewed_at: Option<DateTime<Utc>>,
    /// When the card becomes eligible again. `None` means never reviewed.
    #[serde(default)]
    pub next_review_at: Option<DateTime<Utc>>,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            easiness: DEFAULT_EASINESS,
            interval_days: 1,
            review_count: 0,
            last_reviewed_at: None,
            next_review_at: None,
        }
    }
}

impl Schedule {
    /// A card is due when it has never been scheduled or its date has passed.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review_at.map_or(true, |at| at <= now)
    }
}

/// A single flashcard or multiple-choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub deck_id: DeckId,
    pub question: String,
    pub answer: String,
    pub kind: CardKind,
    /// Answer options; only populated for multiple-choice cards.
    #[serde(default)]
    pub options: Vec<String>,
    /// Concept label used for mastery tracking.
    #[serde(default)]
    pub concept: Option<String>,
    #[serde(default)]
    pub schedule: Schedule,
}

/// A deck of cards generated from one piece of content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    pub id: DeckId,
    pub title: String,
    /// Where the content came from (URL, file name, video id).
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub cards: Vec<Card>,
}

/// Lightweight deck listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckInfo {
    pub id: DeckId,
    pub title: String,
    pub card_count: usize,
}

/// How the learner answered a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Correct,
    Incorrect,
    Skip,
}

impl Outcome {
    /// Skips are not attempts: they earn nothing and touch no scheduling state.
    pub fn is_attempt(self) -> bool {
        !matches!(self, Outcome::Skip)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Correct => write!(f, "correct"),
            Outcome::Incorrect => write!(f, "incorrect"),
            Outcome::Skip => write!(f, "skip"),
        }
    }
}

impl FromStr for Outcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "c" | "correct" | "y" => Ok(Outcome::Correct),
            "i" | "incorrect" | "n" => Ok(Outcome::Incorrect),
            "s" | "skip" => Ok(Outcome::Skip),
            other => Err(format!("unknown outcome: {other}")),
        }
    }
}

/// Identifies a concept mastery record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MasteryKey {
    pub learner_id: LearnerId,
    pub deck_id: DeckId,
    pub concept: String,
}

/// Per-(learner, deck, concept) proficiency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptMastery {
    pub learner_id: LearnerId,
    pub deck_id: DeckId,
    pub concept: String,
    /// Always within 0..=100.
    pub mastery: u8,
    pub seen_count: u32,
    pub correct_count: u32,
    pub last_seen_at: DateTime<Utc>,
}

impl ConceptMastery {
    pub fn key(&self) -> MasteryKey {
        MasteryKey {
            learner_id: self.learner_id.clone(),
            deck_id: self.deck_id.clone(),
            concept: self.concept.clone(),
        }
    }
}

/// An append-only record of one answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewEvent {
    pub learner_id: LearnerId,
    pub card_id: CardId,
    pub deck_id: DeckId,
    pub session_id: SessionId,
    pub outcome: Outcome,
    /// Seconds spent on this card.
    pub time_spent_secs: u64,
    pub reviewed_at: DateTime<Utc>,
    /// Seconds left on the session timer when the answer was given.
    #[serde(default)]
    pub timer_remaining_secs: Option<u64>,
}

/// Learner-level gamified progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnerProgress {
    pub learner_id: LearnerId,
    pub xp: u64,
    pub level: u32,
    /// Cosmetic growth stage; advances every 50 XP.
    pub growth_level: u32,
    pub streak_days: u32,
    #[serde(default)]
    pub last_study_date: Option<NaiveDate>,
    pub total_cards_reviewed: u64,
    #[serde(default)]
    pub total_decks_completed: u32,
    /// Banked streak-protection credits.
    #[serde(default)]
    pub streak_credits: u32,
}

impl LearnerProgress {
    /// Cold-start progress for a learner with no history.
    pub fn new(learner_id: impl Into<LearnerId>) -> Self {
        Self {
            learner_id: learner_id.into(),
            xp: 0,
            level: 1,
            growth_level: 1,
            streak_days: 0,
            last_study_date: None,
            total_cards_reviewed: 0,
            total_decks_completed: 0,
            streak_credits: 0,
        }
    }
}

/// Outcome counters for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub correct: u32,
    pub incorrect: u32,
    pub skipped: u32,
}

impl SessionStats {
    pub fn new(correct: u32, incorrect: u32, skipped: u32) -> Self {
        Self {
            correct,
            incorrect,
            skipped,
        }
    }

    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Correct => self.correct += 1,
            Outcome::Incorrect => self.incorrect += 1,
            Outcome::Skip => self.skipped += 1,
        }
    }

    /// Answers that were actually attempted (skips excluded).
    pub fn attempted(&self) -> u32 {
        self.correct + self.incorrect
    }

    pub fn total(&self) -> u32 {
        self.attempted() + self.skipped
    }
}

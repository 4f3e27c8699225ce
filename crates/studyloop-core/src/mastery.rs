//! Per-concept mastery tracking.
//!
//! Mastery moves +9 on a correct answer and -7 on an incorrect one, clamped
//! to 0..=100. Skips leave everything untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{ConceptMastery, MasteryKey, Outcome};

pub const MAX_MASTERY: u8 = 100;
pub const CORRECT_DELTA: i32 = 9;
pub const INCORRECT_DELTA: i32 = -7;

/// Upper bound (exclusive) of the weak band.
pub const WEAK_BELOW: u8 = 40;
/// Upper bound (inclusive) of the medium band.
pub const MEDIUM_UP_TO: u8 = 70;

/// Mastery band used by session selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MasteryBand {
    Weak,
    Medium,
    Strong,
}

impl MasteryBand {
    pub fn of(mastery: u8) -> Self {
        if mastery < WEAK_BELOW {
            MasteryBand::Weak
        } else if mastery <= MEDIUM_UP_TO {
            MasteryBand::Medium
        } else {
            MasteryBand::Strong
        }
    }
}

/// Apply one answer to a concept's mastery record.
///
/// Returns `None` only for a skip on a concept that has no record yet.
pub fn update_mastery(
    current: Option<&ConceptMastery>,
    key: &MasteryKey,
    outcome: Outcome,
    now: DateTime<Utc>,
) -> Option<ConceptMastery> {
    let delta = match outcome {
        Outcome::Skip => return current.cloned(),
        Outcome::Correct => CORRECT_DELTA,
        Outcome::Incorrect => INCORRECT_DELTA,
    };

    let (mastery, seen_count, correct_count) = current
        .map(|m| (m.mastery, m.seen_count, m.correct_count))
        .unwrap_or((0, 0, 0));

    let mastery = (i32::from(mastery) + delta).clamp(0, i32::from(MAX_MASTERY)) as u8;
    let correct_count = if outcome == Outcome::Correct {
        correct_count + 1
    } else {
        correct_count
    };

    Some(ConceptMastery {
        learner_id: key.learner_id.clone(),
        deck_id: key.deck_id.clone(),
        concept: key.concept.clone(),
        mastery,
        seen_count: seen_count + 1,
        correct_count,
        last_seen_at: now,
    })
}

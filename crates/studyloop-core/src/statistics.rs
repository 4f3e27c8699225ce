//! Session-level statistics: accuracy and difficulty advice.

use serde::{Deserialize, Serialize};

use crate::model::SessionStats;

/// Below this many attempts there is not enough signal to adjust difficulty.
pub const MIN_ATTEMPTS_FOR_ADJUSTMENT: u32 = 5;
pub const INCREASE_AT_ACCURACY: f64 = 0.85;
pub const DECREASE_AT_ACCURACY: f64 = 0.60;

/// Whether the next deck should be generated harder or easier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyAdjustment {
    Increase,
    Decrease,
    Maintain,
}

/// Suggest a difficulty change from a learner's recent accuracy.
pub fn suggest_difficulty_adjustment(correct: u32, total: u32) -> DifficultyAdjustment {
    if total < MIN_ATTEMPTS_FOR_ADJUSTMENT {
        return DifficultyAdjustment::Maintain;
    }
    let accuracy = f64::from(correct) / f64::from(total);
    if accuracy >= INCREASE_AT_ACCURACY {
        DifficultyAdjustment::Increase
    } else if accuracy <= DECREASE_AT_ACCURACY {
        DifficultyAdjustment::Decrease
    } else {
        DifficultyAdjustment::Maintain
    }
}

/// Rounded percentage of attempted cards answered correctly; 0 with no attempts.
pub fn accuracy_percent(stats: &SessionStats) -> u32 {
    let attempted = stats.attempted();
    if attempted == 0 {
        return 0;
    }
    (f64::from(stats.correct) * 100.0 / f64::from(attempted)).round() as u32
}

//! SM-2 spaced repetition scheduling.
//!
//! Quality ratings (0-5):
//! - 0: Complete blackout, no recall
//! - 1: Incorrect, but upon seeing answer, remembered
//! - 2: Incorrect, but answer seemed easy to recall
//! - 3: Correct response with serious difficulty
//! - 4: Correct response after hesitation
//! - 5: Perfect response with no hesitation
//!
//! Review outcomes map onto this scale as correct → 4 and incorrect → 1.
//! Skips never reach the scheduler.

use chrono::{DateTime, Duration, Utc};

use crate::model::{Outcome, Schedule};

/// Minimum easiness factor allowed.
pub const MIN_EASINESS: f64 = 1.3;

/// Quality assigned to a correct answer ("good recall").
pub const QUALITY_CORRECT: u8 = 4;
/// Quality assigned to an incorrect answer ("hard/incorrect").
pub const QUALITY_INCORRECT: u8 = 1;

/// Map a review outcome to an SM-2 quality, or `None` for a skip.
pub fn quality_for(outcome: Outcome) -> Option<u8> {
    match outcome {
        Outcome::Correct => Some(QUALITY_CORRECT),
        Outcome::Incorrect => Some(QUALITY_INCORRECT),
        Outcome::Skip => None,
    }
}

/// Compute the next schedule for a review outcome.
///
/// Returns `None` for a skip: the card's state is left as it was.
pub fn schedule_review(
    schedule: &Schedule,
    outcome: Outcome,
    now: DateTime<Utc>,
) -> Option<Schedule> {
    quality_for(outcome).map(|quality| apply_quality(schedule, quality, now))
}

/// Apply one SM-2 step for the given quality (clamped to 0..=5).
pub fn apply_quality(schedule: &Schedule, quality: u8, now: DateTime<Utc>) -> Schedule {
    let quality = quality.min(5);
    let lapse = f64::from(5 - quality);

    // EF' = EF + (0.1 - (5-q) * (0.08 + (5-q) * 0.02))
    let easiness = (schedule.easiness + (0.1 - lapse * (0.08 + lapse * 0.02))).max(MIN_EASINESS);

    let (interval_days, review_count) = if quality < 3 {
        (1, 0)
    } else {
        let repetitions = schedule.review_count + 1;
        let interval = match repetitions {
            1 => 1,
            2 => 6,
            _ => (f64::from(schedule.interval_days) * easiness).round() as u32,
        };
        (interval, repetitions)
    };

    Schedule {
        easiness,
        interval_days,
        review_count,
        last_reviewed_at: Some(now),
        next_review_at: Some(now + Duration::days(i64::from(interval_days))),
    }
}

/// Intervals each answer would produce: `[incorrect, correct]`.
///
/// Used to show learners what is at stake before they answer.
pub fn preview_intervals(schedule: &Schedule, now: DateTime<Utc>) -> [u32; 2] {
    let incorrect = apply_quality(schedule, QUALITY_INCORRECT, now).interval_days;
    let correct = apply_quality(schedule, QUALITY_CORRECT, now).interval_days;
    [incorrect, correct]
}

/// Format an interval in days to a short human-readable string.
pub fn format_interval(days: u32) -> String {
    match days {
        0 => "now".to_string(),
        1..=6 => format!("{days}d"),
        7..=29 => format!("{}w", days / 7),
        30..=364 => format!("{}mo", days / 30),
        _ => format!("{}y", days / 365),
    }
}

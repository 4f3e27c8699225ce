//! Learner progress aggregation: XP, levels, growth stage, and streaks.
//!
//! Applied once per completed session, never per card. Applying the same
//! session twice double-counts XP, so callers must guarantee exactly-once
//! application (see [`ReviewEngine::complete_session`](crate::engine::ReviewEngine::complete_session)).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{LearnerProgress, SessionStats};

pub const XP_PER_CORRECT: u64 = 10;
pub const XP_PER_INCORRECT: u64 = 2;
pub const XP_PER_LEVEL: u64 = 100;
pub const XP_PER_GROWTH_STAGE: u64 = 50;
/// Every level that is a multiple of this banks a streak-protection credit.
pub const STREAK_CREDIT_LEVEL_INTERVAL: u32 = 5;

/// Milestones reached while applying a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    LevelUp { from: u32, to: u32 },
    StreakCreditEarned { level: u32 },
}

/// New progress plus the milestones it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub progress: LearnerProgress,
    pub events: Vec<ProgressEvent>,
}

impl ProgressUpdate {
    pub fn leveled_up(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, ProgressEvent::LevelUp { .. }))
    }
}

/// XP earned by a session: effort-based, skips earn nothing.
pub fn xp_for(stats: &SessionStats) -> u64 {
    u64::from(stats.correct) * XP_PER_CORRECT + u64::from(stats.incorrect) * XP_PER_INCORRECT
}

pub fn level_for_xp(xp: u64) -> u32 {
    (xp / XP_PER_LEVEL + 1) as u32
}

/// Growth stage advances twice as fast as level.
pub fn growth_level_for_xp(xp: u64) -> u32 {
    (xp / XP_PER_GROWTH_STAGE + 1) as u32
}

/// Streak after studying on `today`.
///
/// Banked streak credits are not spent here; a missed day always resets the
/// streak. Spending a credit to bridge one missed day would hook in at the
/// `_` arm below.
pub fn next_streak(streak_days: u32, last_study_date: Option<NaiveDate>, today: NaiveDate) -> u32 {
    let Some(last) = last_study_date else {
        return 1;
    };
    match today.signed_duration_since(last).num_days() {
        0 => streak_days.max(1),
        1 => streak_days + 1,
        _ => 1,
    }
}

/// A session counts toward completed decks when it had cards and none were skipped.
fn finished_every_card(stats: &SessionStats) -> bool {
    stats.total() > 0 && stats.skipped == 0
}

/// Fold one completed session into a learner's progress.
pub fn apply_session_outcome(
    prior: &LearnerProgress,
    stats: &SessionStats,
    today: NaiveDate,
) -> ProgressUpdate {
    let xp = prior.xp + xp_for(stats);
    let level = level_for_xp(xp);

    let mut events = Vec::new();
    let mut streak_credits = prior.streak_credits;
    if level > prior.level {
        events.push(ProgressEvent::LevelUp {
            from: prior.level,
            to: level,
        });
        if level % STREAK_CREDIT_LEVEL_INTERVAL == 0 {
            events.push(ProgressEvent::StreakCreditEarned { level });
            streak_credits += 1;
        }
    }

    let streak_days = next_streak(prior.streak_days, prior.last_study_date, today);

    let progress = LearnerProgress {
        learner_id: prior.learner_id.clone(),
        xp,
        level,
        growth_level: growth_level_for_xp(xp),
        streak_days,
        last_study_date: Some(today),
        total_cards_reviewed: prior.total_cards_reviewed + u64::from(stats.attempted()),
        total_decks_completed: prior.total_decks_completed + u32::from(finished_every_card(stats)),
        streak_credits,
    };

    ProgressUpdate { progress, events }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
    }

    fn with_xp(xp: u64) -> LearnerProgress {
        LearnerProgress {
            xp,
            level: level_for_xp(xp),
            growth_level: growth_level_for_xp(xp),
            ..LearnerProgress::new("learner")
        }
    }

    #[test]
    fn xp_is_effort_based() {
        assert_eq!(xp_for(&SessionStats::new(3, 1, 1)), 32);
        assert_eq!(xp_for(&SessionStats::new(0, 0, 10)), 0);
        assert_eq!(xp_for(&SessionStats::new(0, 5, 0)), 10);
    }

    #[test]
    fn level_and_growth_formulas() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(99), 1);
        assert_eq!(level_for_xp(100), 2);
        assert_eq!(growth_level_for_xp(49), 1);
        assert_eq!(growth_level_for_xp(50), 2);
        assert_eq!(growth_level_for_xp(127), 3);
    }

    #[test]
    fn streak_first_study_is_one() {
        assert_eq!(next_streak(0, None, today()), 1);
    }

    #[test]
    fn streak_yesterday_increments() {
        let yesterday = today() - Duration::days(1);
        assert_eq!(next_streak(4, Some(yesterday), today()), 5);
    }

    #[test]
    fn streak_same_day_unchanged() {
        assert_eq!(next_streak(4, Some(today()), today()), 4);
        assert_eq!(next_streak(0, Some(today()), today()), 1);
    }

    #[test]
    fn streak_gap_resets() {
        let three_days_ago = today() - Duration::days(3);
        assert_eq!(next_streak(9, Some(three_days_ago), today()), 1);
        let two_days_ago = today() - Duration::days(2);
        assert_eq!(next_streak(9, Some(two_days_ago), today()), 1);
    }

    #[test]
    fn scenario_95_xp_levels_up_without_credit() {
        let prior = with_xp(95);
        assert_eq!(prior.level, 1);

        let update = apply_session_outcome(&prior, &SessionStats::new(3, 1, 1), today());
        assert_eq!(update.progress.xp, 127);
        assert_eq!(update.progress.level, 2);
        assert_eq!(update.progress.growth_level, 3);
        assert_eq!(update.progress.total_cards_reviewed, 4);
        assert_eq!(update.progress.last_study_date, Some(today()));
        assert_eq!(update.progress.streak_days, 1);
        assert_eq!(update.events, vec![ProgressEvent::LevelUp { from: 1, to: 2 }]);
        assert_eq!(update.progress.streak_credits, 0);
        assert_eq!(update.progress.total_decks_completed, 0);
    }

    #[test]
    fn fully_answered_session_completes_a_deck() {
        let prior = with_xp(0);
        let full = apply_session_outcome(&prior, &SessionStats::new(2, 3, 0), today());
        assert_eq!(full.progress.total_decks_completed, 1);
        let empty = apply_session_outcome(&prior, &SessionStats::default(), today());
        assert_eq!(empty.progress.total_decks_completed, 0);
    }

    #[test]
    fn reaching_level_five_banks_a_credit() {
        let prior = with_xp(395);
        let update = apply_session_outcome(&prior, &SessionStats::new(1, 0, 0), today());
        assert_eq!(update.progress.level, 5);
        assert_eq!(
            update.events,
            vec![
                ProgressEvent::LevelUp { from: 4, to: 5 },
                ProgressEvent::StreakCreditEarned { level: 5 },
            ]
        );
        assert_eq!(update.progress.streak_credits, 1);
    }

    #[test]
    fn no_level_change_no_events() {
        let update = apply_session_outcome(&with_xp(10), &SessionStats::new(1, 1, 0), today());
        assert!(update.events.is_empty());
        assert!(!update.leveled_up());
    }

    #[test]
    fn double_application_is_detectable() {
        let prior = with_xp(40);
        let stats = SessionStats::new(3, 2, 0);
        let once = apply_session_outcome(&prior, &stats, today());
        let twice = apply_session_outcome(&once.progress, &stats, today());
        assert_ne!(once.progress, twice.progress);
        assert_eq!(twice.progress.xp, once.progress.xp + xp_for(&stats));
        assert_eq!(
            twice.progress.total_cards_reviewed,
            once.progress.total_cards_reviewed * 2
        );
    }

    #[test]
    fn levels_never_decrease() {
        let mut progress = LearnerProgress::new("learner");
        let mut day = today();
        for i in 0..30u32 {
            let stats = SessionStats::new(i % 4, i % 3, i % 2);
            let update = apply_session_outcome(&progress, &stats, day);
            assert!(update.progress.level >= progress.level);
            assert!(update.progress.growth_level >= progress.growth_level);
            progress = update.progress;
            day += Duration::days(1);
        }
        assert_eq!(progress.streak_days, 30);
    }
}

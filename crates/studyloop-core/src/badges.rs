//! Achievement badges awarded from learner progress.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::model::LearnerProgress;

/// What a learner has to reach to earn a badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum BadgeRequirement {
    DecksCreated(u32),
    StreakDays(u32),
    Xp(u64),
    /// Recognised in catalogs but not tracked yet; never earned.
    HardCorrect(u32),
    /// Recognised in catalogs but not tracked yet; never earned.
    DeckAccuracy(u32),
}

impl BadgeRequirement {
    pub fn is_met(&self, progress: &LearnerProgress) -> bool {
        match self {
            BadgeRequirement::DecksCreated(n) => progress.total_decks_completed >= *n,
            BadgeRequirement::StreakDays(n) => progress.streak_days >= *n,
            BadgeRequirement::Xp(n) => progress.xp >= *n,
            BadgeRequirement::HardCorrect(_) | BadgeRequirement::DeckAccuracy(_) => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: Option<String>,
    pub requirement: BadgeRequirement,
}

/// Badges from `catalog` the learner now qualifies for and does not hold yet.
pub fn newly_earned<'a>(
    progress: &LearnerProgress,
    catalog: &'a [Badge],
    earned: &HashSet<String>,
) -> Vec<&'a Badge> {
    catalog
        .iter()
        .filter(|b| !earned.contains(&b.id))
        .filter(|b| b.requirement.is_met(progress))
        .collect()
}

/// The catalog new stores are seeded with.
pub fn default_catalog() -> Vec<Badge> {
    let badge = |id: &str, name: &str, description: &str, icon: &str, requirement| Badge {
        id: id.into(),
        name: name.into(),
        description: description.into(),
        icon: Some(icon.into()),
        requirement,
    };
    vec![
        badge(
            "first-steps",
            "First Steps",
            "Earn your first 10 XP",
            "🌱",
            BadgeRequirement::Xp(10),
        ),
        badge(
            "on-fire",
            "On Fire",
            "Study three days in a row",
            "🔥",
            BadgeRequirement::StreakDays(3),
        ),
        badge(
            "week-warrior",
            "Week Warrior",
            "Study seven days in a row",
            "🗓️",
            BadgeRequirement::StreakDays(7),
        ),
        badge(
            "scholar",
            "Scholar",
            "Reach 500 XP",
            "🎓",
            BadgeRequirement::Xp(500),
        ),
        badge(
            "deck-builder",
            "Deck Builder",
            "Complete five decks",
            "📚",
            BadgeRequirement::DecksCreated(5),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(xp: u64, streak_days: u32) -> LearnerProgress {
        LearnerProgress {
            xp,
            streak_days,
            ..LearnerProgress::new("learner")
        }
    }

    #[test]
    fn requirement_thresholds() {
        let p = progress(120, 3);
        assert!(BadgeRequirement::Xp(120).is_met(&p));
        assert!(!BadgeRequirement::Xp(121).is_met(&p));
        assert!(BadgeRequirement::StreakDays(3).is_met(&p));
        assert!(!BadgeRequirement::DecksCreated(1).is_met(&p));
        assert!(!BadgeRequirement::HardCorrect(0).is_met(&p));
        assert!(!BadgeRequirement::DeckAccuracy(0).is_met(&p));
    }

    #[test]
    fn already_earned_badges_are_skipped() {
        let catalog = default_catalog();
        let p = progress(20, 3);

        let fresh = newly_earned(&p, &catalog, &HashSet::new());
        let ids: Vec<_> = fresh.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["first-steps", "on-fire"]);

        let earned: HashSet<String> = ["first-steps".to_string()].into_iter().collect();
        let again = newly_earned(&p, &catalog, &earned);
        assert_eq!(again.len(), 1);
        assert_eq!(again[0].id, "on-fire");
    }

    #[test]
    fn requirement_serde_shape() {
        let json = r#"{"type":"streak_days","value":7}"#;
        let req: BadgeRequirement = serde_json::from_str(json).unwrap();
        assert_eq!(req, BadgeRequirement::StreakDays(7));
        assert_eq!(serde_json::to_string(&req).unwrap(), json);
    }
}

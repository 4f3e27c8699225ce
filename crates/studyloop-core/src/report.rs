//! Session summaries with JSON persistence and Markdown rendering.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::badges::Badge;
use crate::model::{DeckId, LearnerId, LearnerProgress, SessionId, SessionStats};
use crate::progress::ProgressEvent;
use crate::selector::SelectionStrategy;
use crate::statistics::DifficultyAdjustment;

/// Everything a learner sees when a session finishes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub learner_id: LearnerId,
    pub deck_id: DeckId,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub strategy: SelectionStrategy,
    pub stats: SessionStats,
    pub accuracy_percent: u32,
    pub xp_earned: u64,
    pub difficulty: DifficultyAdjustment,
    /// Progress after this session was applied.
    pub progress: LearnerProgress,
    pub events: Vec<ProgressEvent>,
    #[serde(default)]
    pub badges_awarded: Vec<Badge>,
}

impl SessionSummary {
    /// Save the summary as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize summary")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write summary to {}", path.display()))?;
        Ok(())
    }

    /// Load a summary from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read summary from {}", path.display()))?;
        let summary: SessionSummary =
            serde_json::from_str(&content).context("failed to parse summary JSON")?;
        Ok(summary)
    }

    /// Render as Markdown (for sharing or pasting into notes).
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();
        md.push_str("## Mini-review complete\n\n");
        md.push_str("| Correct | Incorrect | Skipped | Accuracy | XP |\n");
        md.push_str("|---------|-----------|---------|----------|----|\n");
        md.push_str(&format!(
            "| {} | {} | {} | {}% | +{} |\n\n",
            self.stats.correct,
            self.stats.incorrect,
            self.stats.skipped,
            self.accuracy_percent,
            self.xp_earned
        ));

        md.push_str(&format!(
            "Level {} · {} XP · {} day streak\n",
            self.progress.level, self.progress.xp, self.progress.streak_days
        ));

        for event in &self.events {
            match event {
                ProgressEvent::LevelUp { to, .. } => {
                    md.push_str(&format!("\n**Level up!** You reached level {to}.\n"));
                }
                ProgressEvent::StreakCreditEarned { .. } => {
                    md.push_str("**Streak vault:** one missed day is now covered.\n");
                }
            }
        }

        if !self.badges_awarded.is_empty() {
            md.push_str("\n### New badges\n\n");
            for badge in &self.badges_awarded {
                let icon = badge.icon.as_deref().unwrap_or("*");
                md.push_str(&format!("- {icon} {}\n", badge.name));
            }
        }

        md
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn make_summary(events: Vec<ProgressEvent>) -> SessionSummary {
        let now = Utc::now();
        SessionSummary {
            session_id: Uuid::new_v4(),
            learner_id: "learner".into(),
            deck_id: "deck".into(),
            started_at: now,
            completed_at: now,
            strategy: SelectionStrategy::Weighted,
            stats: SessionStats::new(3, 1, 1),
            accuracy_percent: 75,
            xp_earned: 32,
            difficulty: DifficultyAdjustment::Maintain,
            progress: LearnerProgress {
                xp: 127,
                level: 2,
                growth_level: 3,
                streak_days: 1,
                ..LearnerProgress::new("learner")
            },
            events,
            badges_awarded: vec![],
        }
    }

    #[test]
    fn json_roundtrip() {
        let summary = make_summary(vec![ProgressEvent::LevelUp { from: 1, to: 2 }]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions").join("summary.json");
        summary.save_json(&path).unwrap();
        let loaded = SessionSummary::load_json(&path).unwrap();
        assert_eq!(loaded.session_id, summary.session_id);
        assert_eq!(loaded.events, summary.events);
        assert_eq!(loaded.progress, summary.progress);
    }

    #[test]
    fn markdown_output() {
        let md = make_summary(vec![ProgressEvent::LevelUp { from: 1, to: 2 }]).to_markdown();
        assert!(md.contains("| 3 | 1 | 1 | 75% | +32 |"));
        assert!(md.contains("Level up!"));
        assert!(!md.contains("Streak vault"));
    }
}

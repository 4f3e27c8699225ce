//! The `studyloop progress` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use studyloop_core::model::LearnerProgress;
use studyloop_core::progress::XP_PER_LEVEL;

use super::open_store;

pub async fn execute(learner: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let (config, store) = open_store(config_path.as_deref()).await?;
    let learner = learner.unwrap_or(config.default_learner);

    let progress = store
        .get_progress(&learner)
        .await?
        .unwrap_or_else(|| LearnerProgress::new(learner.clone()));
    let to_next_level = XP_PER_LEVEL - progress.xp % XP_PER_LEVEL;

    let mut table = Table::new();
    table.set_header(vec!["Learner", "XP", "Level", "Growth", "Streak", "Credits", "Reviewed"]);
    table.add_row(vec![
        Cell::new(&progress.learner_id),
        Cell::new(progress.xp),
        Cell::new(progress.level),
        Cell::new(progress.growth_level),
        Cell::new(format!("{} day(s)", progress.streak_days)),
        Cell::new(progress.streak_credits),
        Cell::new(progress.total_cards_reviewed),
    ]);
    println!("{table}");
    println!("{to_next_level} XP to level {}", progress.level + 1);

    let earned = store.earned_badges(&learner).await?;
    if !earned.is_empty() {
        let catalog = store.list_badges().await?;
        println!("\nBadges:");
        for badge in catalog.iter().filter(|b| earned.contains(&b.id)) {
            let icon = badge.icon.as_deref().unwrap_or("*");
            println!("  {icon} {} — {}", badge.name, badge.description);
        }
    }

    Ok(())
}

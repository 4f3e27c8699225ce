//! The `studyloop due` command.

use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use comfy_table::{Cell, Table};

use studyloop_core::scheduler::{format_interval, preview_intervals};
use studyloop_core::selector::due_cards;

use super::open_store;

pub async fn execute(deck_id: String, config_path: Option<PathBuf>) -> Result<()> {
    let (_, store) = open_store(config_path.as_deref()).await?;
    let cards = store.list_cards_for_deck(&deck_id).await?;
    let now = Utc::now();

    let due = due_cards(&cards, now);
    println!("{} of {} cards due in {deck_id}", due.len(), cards.len());
    if due.is_empty() {
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Card", "Question", "Reviews", "Ease", "Miss / Hit"]);
    for card in &due {
        let [miss, hit] = preview_intervals(&card.schedule, now);
        table.add_row(vec![
            Cell::new(&card.id),
            Cell::new(&card.question),
            Cell::new(card.schedule.review_count),
            Cell::new(format!("{:.2}", card.schedule.easiness)),
            Cell::new(format!("{} / {}", format_interval(miss), format_interval(hit))),
        ]);
    }
    println!("{table}");

    Ok(())
}

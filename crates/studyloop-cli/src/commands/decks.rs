//! The `studyloop decks` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use super::open_store;

pub async fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let (_, store) = open_store(config_path.as_deref()).await?;
    let decks = store.list_decks().await?;

    if decks.is_empty() {
        println!("No decks yet. Run `studyloop import --deck <path>` to add one.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Deck", "Title", "Cards"]);
    for deck in &decks {
        table.add_row(vec![
            Cell::new(&deck.id),
            Cell::new(&deck.title),
            Cell::new(deck.card_count),
        ]);
    }
    println!("{table}");

    Ok(())
}

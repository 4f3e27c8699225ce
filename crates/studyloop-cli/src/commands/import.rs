//! The `studyloop import` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use studyloop_core::parser::{load_decks, validate_deck};

use super::open_store;

pub async fn execute(deck_path: PathBuf, config_path: Option<PathBuf>) -> Result<()> {
    let decks = load_decks(&deck_path)?;
    anyhow::ensure!(!decks.is_empty(), "no decks found in {}", deck_path.display());

    let (_, store) = open_store(config_path.as_deref()).await?;

    for deck in &decks {
        let warnings = validate_deck(deck);
        if !warnings.is_empty() {
            eprintln!(
                "Warning: deck '{}' has {} validation warning(s); run `studyloop validate` for details",
                deck.id,
                warnings.len()
            );
        }
        store
            .save_deck(deck)
            .await
            .with_context(|| format!("failed to import deck '{}'", deck.id))?;
        println!("Imported {} ({} cards)", deck.id, deck.cards.len());
    }

    Ok(())
}

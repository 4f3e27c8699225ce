//! TOML deck file parser.
//!
//! Loads generated decks from TOML files and directories, and validates them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{Card, CardKind, Deck, Schedule};

/// Intermediate TOML structure for parsing deck files.
#[derive(Debug, Deserialize)]
struct TomlDeckFile {
    deck: TomlDeckHeader,
    #[serde(default)]
    cards: Vec<TomlCard>,
}

#[derive(Debug, Deserialize)]
struct TomlDeckHeader {
    id: String,
    title: String,
    #[serde(default)]
    source: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TomlCard {
    #[serde(default)]
    id: Option<String>,
    question: String,
    answer: String,
    #[serde(default = "default_kind")]
    kind: String,
    #[serde(default)]
    options: Vec<String>,
    #[serde(default, alias = "topic")]
    concept: Option<String>,
}

fn default_kind() -> String {
    "flashcard".to_string()
}

/// Parse a single TOML file into a `Deck`.
pub fn parse_deck(path: &Path) -> Result<Deck> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read deck file: {}", path.display()))?;

    parse_deck_str(&content, path)
}

/// Parse a TOML string into a `Deck` (useful for testing).
pub fn parse_deck_str(content: &str, source_path: &Path) -> Result<Deck> {
    let parsed: TomlDeckFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let deck_id = parsed.deck.id;
    let cards = parsed
        .cards
        .into_iter()
        .enumerate()
        .map(|(i, c)| {
            let kind: CardKind = c.kind.parse().map_err(|e: String| anyhow::anyhow!("{}", e))?;
            let concept = c
                .concept
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty());

            Ok(Card {
                id: c.id.unwrap_or_else(|| format!("{deck_id}-{}", i + 1)),
                deck_id: deck_id.clone(),
                question: c.question,
                answer: c.answer,
                kind,
                options: c.options,
                concept,
                schedule: Schedule::default(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Deck {
        id: deck_id,
        title: parsed.deck.title,
        source: parsed.deck.source,
        cards,
    })
}

/// Recursively load all `.toml` deck files from a directory.
pub fn load_deck_directory(dir: &Path) -> Result<Vec<Deck>> {
    let mut decks = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            decks.extend(load_deck_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_deck(&path) {
                Ok(deck) => decks.push(deck),
                Err(e) => {
                    tracing::warn!("skipping {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(decks)
}

/// Load a deck file, or every deck in a directory.
pub fn load_decks(path: &Path) -> Result<Vec<Deck>> {
    if path.is_dir() {
        load_deck_directory(path)
    } else {
        Ok(vec![parse_deck(path)?])
    }
}

/// A warning from deck validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The card ID (if applicable).
    pub card_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a deck for problems deck generation should not have produced.
pub fn validate_deck(deck: &Deck) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if deck.cards.is_empty() {
        warnings.push(ValidationWarning {
            card_id: None,
            message: "deck has no cards".into(),
        });
    }

    let mut seen_ids = HashSet::new();
    for card in &deck.cards {
        let warn = |message: String| ValidationWarning {
            card_id: Some(card.id.clone()),
            message,
        };

        if !seen_ids.insert(&card.id) {
            warnings.push(warn(format!("duplicate card ID: {}", card.id)));
        }
        if card.question.trim().is_empty() {
            warnings.push(warn("question is empty".into()));
        }
        if card.answer.trim().is_empty() {
            warnings.push(warn("answer is empty".into()));
        }

        match card.kind {
            CardKind::Mcq => {
                if card.options.len() < 2 {
                    warnings.push(warn(format!(
                        "multiple-choice card needs at least 2 options, has {}",
                        card.options.len()
                    )));
                } else if !card.options.iter().any(|o| o.trim() == card.answer.trim()) {
                    warnings.push(warn("answer is not one of the options".into()));
                }
            }
            CardKind::Flashcard => {
                if !card.options.is_empty() {
                    warnings.push(warn("flashcard has options that will be ignored".into()));
                }
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_TOML: &str = r#"
[deck]
id = "cells"
title = "Cell Biology"
source = "https://example.org/cells"

[[cards]]
id = "mito"
question = "Which organelle produces most of the cell's ATP?"
answer = "Mitochondria"
kind = "mcq"
options = ["Nucleus", "Mitochondria", "Ribosome", "Golgi apparatus"]
concept = "organelles"

[[cards]]
question = "What pigment absorbs light in photosynthesis?"
answer = "Chlorophyll"
topic = "photosynthesis"
"#;

    #[test]
    fn parse_valid_toml() {
        let deck = parse_deck_str(VALID_TOML, &PathBuf::from("cells.toml")).unwrap();
        assert_eq!(deck.id, "cells");
        assert_eq!(deck.title, "Cell Biology");
        assert_eq!(deck.cards.len(), 2);
        assert_eq!(deck.cards[0].id, "mito");
        assert_eq!(deck.cards[0].kind, CardKind::Mcq);
        assert_eq!(deck.cards[1].id, "cells-2");
        assert_eq!(deck.cards[1].kind, CardKind::Flashcard);
        assert_eq!(deck.cards[1].concept.as_deref(), Some("photosynthesis"));
        assert_eq!(deck.cards[1].schedule, Schedule::default());
        assert!(validate_deck(&deck).is_empty());
    }

    #[test]
    fn blank_concept_is_untagged() {
        let toml = r#"
[deck]
id = "d"
title = "D"

[[cards]]
question = "Q"
answer = "A"
concept = "   "
"#;
        let deck = parse_deck_str(toml, &PathBuf::from("d.toml")).unwrap();
        assert!(deck.cards[0].concept.is_none());
    }

    #[test]
    fn unknown_kind_is_an_error() {
        let toml = r#"
[deck]
id = "d"
title = "D"

[[cards]]
question = "Q"
answer = "A"
kind = "essay"
"#;
        let err = parse_deck_str(toml, &PathBuf::from("d.toml")).unwrap_err();
        assert!(err.to_string().contains("unknown card kind"));
    }

    #[test]
    fn validate_flags_bad_cards() {
        let toml = r#"
[deck]
id = "bad"
title = "Bad"

[[cards]]
id = "same"
question = "Q1"
answer = "A"
kind = "mcq"
options = ["B", "C"]

[[cards]]
id = "same"
question = " "
answer = "A"
kind = "mcq"
options = ["A"]

[[cards]]
id = "extra"
question = "Q3"
answer = ""
options = ["x"]
"#;
        let deck = parse_deck_str(toml, &PathBuf::from("bad.toml")).unwrap();
        let messages: Vec<_> = validate_deck(&deck).into_iter().map(|w| w.message).collect();
        assert!(messages.iter().any(|m| m.contains("duplicate")));
        assert!(messages.iter().any(|m| m.contains("not one of the options")));
        assert!(messages.iter().any(|m| m.contains("at least 2 options")));
        assert!(messages.iter().any(|m| m == "question is empty"));
        assert!(messages.iter().any(|m| m == "answer is empty"));
        assert!(messages.iter().any(|m| m.contains("will be ignored")));
    }

    #[test]
    fn validate_empty_deck() {
        let deck = parse_deck_str("[deck]\nid = \"e\"\ntitle = \"E\"\n", &PathBuf::from("e.toml"))
            .unwrap();
        let warnings = validate_deck(&deck);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].card_id.is_none());
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        assert!(parse_deck_str(bad, &PathBuf::from("bad.toml")).is_err());
    }

    #[test]
    fn load_directory_skips_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cells.toml"), VALID_TOML).unwrap();
        std::fs::write(dir.path().join("broken.toml"), "not toml [").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let decks = load_deck_directory(dir.path()).unwrap();
        assert_eq!(decks.len(), 1);
        assert_eq!(decks[0].id, "cells");

        let via_load = load_decks(&dir.path().join("cells.toml")).unwrap();
        assert_eq!(via_load.len(), 1);
    }
}

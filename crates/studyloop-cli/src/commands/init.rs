//! The `studyloop init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    if Path::new("studyloop.toml").exists() {
        println!("studyloop.toml already exists, skipping.");
    } else {
        std::fs::write("studyloop.toml", SAMPLE_CONFIG)?;
        println!("Created studyloop.toml");
    }

    std::fs::create_dir_all("decks")?;
    let example_path = Path::new("decks/example.toml");
    if example_path.exists() {
        println!("decks/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_DECK)?;
        println!("Created decks/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Run: studyloop validate --deck decks/example.toml");
    println!("  2. Run: studyloop import --deck decks/example.toml");
    println!("  3. Run: studyloop study --deck example");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# studyloop configuration

session_size = 10
review_window_secs = 90
default_learner = "local"
output_dir = "./studyloop-sessions"
# seed = 42

[store]
type = "json"
path = "./studyloop-data/studyloop.json"
"#;

const EXAMPLE_DECK: &str = r#"[deck]
id = "example"
title = "Example Deck"

[[cards]]
question = "What is the capital of France?"
answer = "Paris"
concept = "geography"

[[cards]]
question = "Which planet is known as the Red Planet?"
answer = "Mars"
kind = "mcq"
options = ["Venus", "Mars", "Jupiter"]
concept = "astronomy"

[[cards]]
question = "What is the chemical symbol for gold?"
answer = "Au"
concept = "chemistry"
"#;

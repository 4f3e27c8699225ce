//! studyloop CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "studyloop", version, about = "Adaptive spaced-repetition review")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create starter config and an example deck
    Init,

    /// Validate deck TOML files
    Validate {
        /// Path to a deck file or directory
        #[arg(long)]
        deck: PathBuf,
    },

    /// Import deck TOML files into the store
    Import {
        /// Path to a deck file or directory
        #[arg(long)]
        deck: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List stored decks
    Decks {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Run a review session
    Study {
        /// Deck id to study
        #[arg(long)]
        deck: String,

        /// Learner id (defaults to the configured learner)
        #[arg(long)]
        learner: Option<String>,

        /// Scripted outcomes instead of prompting (e.g. "c,i,s")
        #[arg(long)]
        answers: Option<String>,

        /// Seed for reproducible card selection
        #[arg(long)]
        seed: Option<u64>,

        /// Cards in the session
        #[arg(long)]
        size: Option<usize>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show cards due for review
    Due {
        /// Deck id
        #[arg(long)]
        deck: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show learner XP, level, and streak
    Progress {
        /// Learner id (defaults to the configured learner)
        #[arg(long)]
        learner: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    let filter = match "studyloop=info".parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Validate { deck } => commands::validate::execute(deck),
        Commands::Import { deck, config } => commands::import::execute(deck, config).await,
        Commands::Decks { config } => commands::decks::execute(config).await,
        Commands::Study {
            deck,
            learner,
            answers,
            seed,
            size,
            config,
        } => commands::study::execute(deck, learner, answers, seed, size, config).await,
        Commands::Due { deck, config } => commands::due::execute(deck, config).await,
        Commands::Progress { learner, config } => {
            commands::progress::execute(learner, config).await
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

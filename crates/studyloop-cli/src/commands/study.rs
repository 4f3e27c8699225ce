//! The `studyloop study` command.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use comfy_table::{Cell, Table};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};

use studyloop_core::engine::{AnswerRecord, ReviewEngine, ReviewSession, SessionObserver};
use studyloop_core::model::{Card, CardKind, Outcome};
use studyloop_core::progress::ProgressEvent;
use studyloop_core::report::SessionSummary;
use studyloop_core::scheduler::format_interval;
use studyloop_core::statistics::DifficultyAdjustment;

use super::open_store;

const TIME_UP: &str = "\nTime's up! Unanswered cards count as skipped.";

/// Console session observer.
struct ConsoleObserver;

impl SessionObserver for ConsoleObserver {
    fn on_session_start(&self, session: &ReviewSession) {
        eprintln!(
            "Mini-review: {} cards from {} ({:?} selection)\n",
            session.cards().len(),
            session.deck_id(),
            session.strategy(),
        );
    }

    fn on_answer(&self, record: &AnswerRecord) {
        let mark = match record.event.outcome {
            Outcome::Correct => "✓",
            Outcome::Incorrect => "✗",
            Outcome::Skip => "-",
        };
        let next = record
            .schedule
            .as_ref()
            .map(|s| format!(", next review in {}", format_interval(s.interval_days)))
            .unwrap_or_default();
        let mastery = record
            .mastery
            .as_ref()
            .map(|m| format!(", {} mastery {}", m.concept, m.mastery))
            .unwrap_or_default();
        eprintln!("  {mark} {}{next}{mastery}", record.event.outcome);
    }

    fn on_session_complete(&self, summary: &SessionSummary) {
        tracing::debug!(session = %summary.session_id, "summary ready");
    }
}

/// Where outcomes come from.
enum AnswerSource {
    Scripted(std::vec::IntoIter<Outcome>),
    Interactive(Lines<BufReader<Stdin>>),
}

impl AnswerSource {
    fn scripted(answers: &str) -> Result<Self> {
        let outcomes = answers
            .split(',')
            .map(|s| s.parse::<Outcome>().map_err(anyhow::Error::msg))
            .collect::<Result<Vec<_>>>()?;
        Ok(AnswerSource::Scripted(outcomes.into_iter()))
    }

    fn interactive() -> Self {
        AnswerSource::Interactive(BufReader::new(tokio::io::stdin()).lines())
    }

    /// The outcome for `card`, or `None` when no more answers are coming.
    async fn next(&mut self, card: &Card) -> Result<Option<Outcome>> {
        match self {
            AnswerSource::Scripted(outcomes) => Ok(outcomes.next()),
            AnswerSource::Interactive(lines) => ask(lines, card).await,
        }
    }
}

async fn prompt(lines: &mut Lines<BufReader<Stdin>>, text: &str) -> Result<Option<String>> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(text.as_bytes()).await?;
    stdout.flush().await?;
    lines.next_line().await.context("failed to read answer")
}

async fn ask(lines: &mut Lines<BufReader<Stdin>>, card: &Card) -> Result<Option<Outcome>> {
    if card.kind == CardKind::Mcq {
        for (i, option) in card.options.iter().enumerate() {
            println!("    {}. {option}", i + 1);
        }
    }
    let Some(input) = prompt(lines, "  answer (enter to reveal, s to skip) > ").await? else {
        return Ok(None);
    };
    let input = input.trim();

    if input.eq_ignore_ascii_case("s") {
        return Ok(Some(Outcome::Skip));
    }
    if !input.is_empty() {
        let guess = match input.parse::<usize>() {
            Ok(n) if card.kind == CardKind::Mcq && (1..=card.options.len()).contains(&n) => {
                card.options[n - 1].as_str()
            }
            _ => input,
        };
        let outcome = if guess.trim().eq_ignore_ascii_case(card.answer.trim()) {
            Outcome::Correct
        } else {
            Outcome::Incorrect
        };
        println!("  answer: {}", card.answer);
        return Ok(Some(outcome));
    }

    println!("  answer: {}", card.answer);
    loop {
        let Some(line) = prompt(lines, "  did you know it? [y/n/s] > ").await? else {
            return Ok(None);
        };
        match line.parse::<Outcome>() {
            Ok(outcome) => return Ok(Some(outcome)),
            Err(e) => println!("  {e}"),
        }
    }
}

/// What came back while waiting on the learner.
#[derive(Debug, PartialEq)]
enum Answer {
    Given(Outcome),
    NoMore,
    TimedOut,
}

/// Wait for an answer, giving up once the review window closes.
async fn await_answer(
    left: Duration,
    answer: impl Future<Output = Result<Option<Outcome>>>,
) -> Result<Answer> {
    match tokio::time::timeout(left, answer).await {
        Ok(answer) => Ok(answer?.map_or(Answer::NoMore, Answer::Given)),
        Err(_) => Ok(Answer::TimedOut),
    }
}

pub async fn execute(
    deck_id: String,
    learner: Option<String>,
    answers: Option<String>,
    seed: Option<u64>,
    size: Option<usize>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let (config, store) = open_store(config_path.as_deref()).await?;

    let mut engine_config = config.engine_config();
    if let Some(size) = size {
        anyhow::ensure!(size >= 1, "session size must be at least 1");
        engine_config.session_size = size;
    }
    let learner = learner.unwrap_or_else(|| config.default_learner.clone());

    let engine = match seed.or(config.seed) {
        Some(seed) => ReviewEngine::with_seed(store, engine_config, seed),
        None => ReviewEngine::new(store, engine_config),
    }
    .with_observer(Arc::new(ConsoleObserver));

    let mut session = engine.start_session(&learner, &deck_id, Utc::now()).await?;
    if session.is_empty() {
        println!("Deck '{deck_id}' has no cards to review.");
        return Ok(());
    }

    let mut source = match answers {
        Some(answers) => AnswerSource::scripted(&answers)?,
        None => AnswerSource::interactive(),
    };

    let total = session.cards().len();
    while let Some(card) = session.current_card().cloned() {
        let now = Utc::now();
        if session.is_expired(now) {
            eprintln!("{TIME_UP}");
            break;
        }
        let left = session.time_remaining(now);
        println!(
            "[{}/{total}] {} ({}s left)",
            session.position() + 1,
            card.question,
            left.as_secs()
        );
        let outcome = match await_answer(left, source.next(&card)).await? {
            Answer::Given(outcome) => outcome,
            Answer::NoMore => break,
            Answer::TimedOut => {
                eprintln!("{TIME_UP}");
                break;
            }
        };
        let answered_at = Utc::now();
        if session.is_expired(answered_at) {
            eprintln!("{TIME_UP}");
            break;
        }
        engine.record_answer(&mut session, outcome, answered_at).await?;
    }

    let summary = engine.complete_session(&mut session, Utc::now()).await?;
    print_summary(&summary);

    let path = config
        .output_dir
        .join(format!("session-{}.json", summary.session_id));
    summary.save_json(&path)?;
    eprintln!("Summary saved to: {}", path.display());

    Ok(())
}

fn print_summary(summary: &SessionSummary) {
    let mut table = Table::new();
    table.set_header(vec!["Correct", "Incorrect", "Skipped", "Accuracy", "XP"]);
    table.add_row(vec![
        Cell::new(summary.stats.correct),
        Cell::new(summary.stats.incorrect),
        Cell::new(summary.stats.skipped),
        Cell::new(format!("{}%", summary.accuracy_percent)),
        Cell::new(format!("+{}", summary.xp_earned)),
    ]);
    println!("\n{table}");

    let progress = &summary.progress;
    println!(
        "Level {} · {} XP · {} day streak",
        progress.level, progress.xp, progress.streak_days
    );

    for event in &summary.events {
        match event {
            ProgressEvent::LevelUp { to, .. } => println!("Level up! You reached level {to}."),
            ProgressEvent::StreakCreditEarned { .. } => {
                println!("Streak credit earned: one missed day is now covered.")
            }
        }
    }
    for badge in &summary.badges_awarded {
        let icon = badge.icon.as_deref().unwrap_or("*");
        println!("New badge: {icon} {}", badge.name);
    }

    match summary.difficulty {
        DifficultyAdjustment::Increase => println!("Doing great. Try a harder deck next."),
        DifficultyAdjustment::Decrease => println!("Tough one. An easier deck may help."),
        DifficultyAdjustment::Maintain => {}
    }
}

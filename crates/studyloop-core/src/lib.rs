//! studyloop-core: Adaptive selection, spaced repetition, and progress rules.
//!
//! This crate defines the data model, the storage trait, and the pure rules
//! (selection, mastery, SM-2 scheduling, XP and streaks) that the review
//! engine composes into sessions.

pub mod badges;
pub mod engine;
pub mod error;
pub mod mastery;
pub mod model;
pub mod parser;
pub mod progress;
pub mod report;
pub mod scheduler;
pub mod selector;
pub mod statistics;
pub mod traits;

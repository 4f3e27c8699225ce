//! studyloop-store: Review store implementations.
//!
//! Implements the `ReviewStore` trait over an in-memory state (optionally
//! snapshotted to a JSON file), plus a failure-injecting wrapper for tests.

pub mod config;
pub mod file;
pub mod memory;
pub mod mock;
pub mod state;

pub use config::{create_store, load_config, StoreConfig, StudyloopConfig};
pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use mock::FlakyStore;
pub use state::StoreState;

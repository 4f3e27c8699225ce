pub mod decks;
pub mod due;
pub mod import;
pub mod init;
pub mod progress;
pub mod study;
pub mod validate;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use studyloop_core::traits::ReviewStore;
use studyloop_store::config::{create_store, load_config_from, StudyloopConfig};

/// Load config and open the configured store.
pub async fn open_store(
    config_path: Option<&Path>,
) -> Result<(StudyloopConfig, Arc<dyn ReviewStore>)> {
    let config = load_config_from(config_path)?;
    let store = create_store(&config.store).await?;
    tracing::debug!(store = store.name(), "opened store");
    Ok((config, store))
}

//! Studyloop configuration and store factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use studyloop_core::engine::EngineConfig;
use studyloop_core::selector::DEFAULT_SESSION_SIZE;
use studyloop_core::traits::ReviewStore;

use crate::file::JsonFileStore;
use crate::memory::MemoryStore;

/// Where review data lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoreConfig {
    Memory,
    Json { path: PathBuf },
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Json {
            path: PathBuf::from("./studyloop-data/studyloop.json"),
        }
    }
}

/// Top-level studyloop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyloopConfig {
    #[serde(default)]
    pub store: StoreConfig,
    /// Cards per review session.
    #[serde(default = "default_session_size")]
    pub session_size: usize,
    /// Seconds a learner has to finish a session.
    #[serde(default = "default_review_window")]
    pub review_window_secs: u64,
    /// Fixed selection seed, for reproducible sessions.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_learner")]
    pub default_learner: String,
    /// Where session summaries are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_session_size() -> usize {
    DEFAULT_SESSION_SIZE
}
fn default_review_window() -> u64 {
    90
}
fn default_learner() -> String {
    "local".to_string()
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./studyloop-sessions")
}

impl Default for StudyloopConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            session_size: default_session_size(),
            review_window_secs: default_review_window(),
            seed: None,
            default_learner: default_learner(),
            output_dir: default_output_dir(),
        }
    }
}

impl StudyloopConfig {
    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.session_size == 0 {
            anyhow::bail!("session_size must be at least 1");
        }
        if self.review_window_secs == 0 {
            anyhow::bail!("review_window_secs must be at least 1");
        }
        Ok(())
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            session_size: self.session_size,
            review_window: Duration::from_secs(self.review_window_secs),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are not expanded again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(&rest[start + 2..start + len]).unwrap_or_default());
        rest = &rest[start + len + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `studyloop.toml` in the current directory
/// 2. `~/.config/studyloop/config.toml`
///
/// Environment variable overrides: `STUDYLOOP_DATA_FILE`, `STUDYLOOP_SEED`.
pub fn load_config() -> Result<StudyloopConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<StudyloopConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("studyloop.toml");
            if local.exists() {
                Some(local)
            } else {
                config_dir()
                    .map(|dir| dir.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<StudyloopConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => StudyloopConfig::default(),
    };

    if let Ok(file) = std::env::var("STUDYLOOP_DATA_FILE") {
        config.store = StoreConfig::Json {
            path: PathBuf::from(file),
        };
    }
    if let Ok(seed) = std::env::var("STUDYLOOP_SEED") {
        config.seed = Some(
            seed.parse()
                .with_context(|| format!("STUDYLOOP_SEED is not a number: {seed}"))?,
        );
    }

    if let StoreConfig::Json { path } = &config.store {
        config.store = StoreConfig::Json {
            path: resolve_path(path),
        };
    }
    config.output_dir = resolve_path(&config.output_dir);
    config.default_learner = resolve_env_vars(&config.default_learner);

    config.validate()?;
    Ok(config)
}

fn config_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("studyloop"))
}

/// Create a store instance from its configuration.
pub async fn create_store(config: &StoreConfig) -> Result<Arc<dyn ReviewStore>> {
    match config {
        StoreConfig::Memory => Ok(Arc::new(MemoryStore::new())),
        StoreConfig::Json { path } => {
            let store = JsonFileStore::open(path)
                .await
                .with_context(|| format!("failed to open data file: {}", path.display()))?;
            Ok(Arc::new(store))
        }
    }
}

//! Configuration file support.
//!
//! Every field has a default, so an empty file (or no file) is valid.
//! Command-line flags are applied on top of whatever is loaded here.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::executors::{ChunkOptions, TableFormat};
use crate::ocr::OcrSettings;
use crate::strategy::Thresholds;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Classification thresholds.
    pub thresholds: Thresholds,
    /// Default chunk size and overlap.
    pub chunk: ChunkOptions,
    pub ocr: OcrSettings,
    pub table_format: TableFormat,

    /// Path the configuration was loaded from.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file. TOML for `.toml`, JSON otherwise.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let path = expand_path(path);
        let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let mut config: Config = match ext {
            "toml" => toml::from_str(&contents)?,
            _ => serde_json::from_str(&contents)?,
        };

        tracing::debug!("loaded config from {}", path.display());
        config.source_path = Some(path);
        Ok(config)
    }

    /// Load from `path` when given, otherwise use defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Ok(Self::default()),
        }
    }
}

/// Expand a leading `~` in a user-supplied path.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(raw.as_ref()).as_ref())
}

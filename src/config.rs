//! YAML configuration file support.
//!
//! A deployment describes where its generated shards live and how the
//! engine should behave in a single YAML file:
//!
//! ```yaml
//! # symsearch configuration
//! version: "1.0"
//!
//! index:
//!   dir: "doc/html/search"
//!   stem: "all"
//!   format: "doxygen"     # or "json"
//!
//! match:
//!   max_results: 20
//!
//! session:
//!   debounce_ms: 200
//! ```
//!
//! Every section is optional and serde defaults fill the gaps, so the
//! minimal useful file is just `version` plus `index.dir`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use sym_index::{FsShardSource, ShardFormat, ShardStore};
use sym_match::MatchConfig;

use crate::session::SessionConfig;

/// Errors that can occur when loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level configuration for a symsearch deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SymsearchConfig {
    /// Configuration format version.
    #[serde(default = "default_version")]
    pub version: String,

    /// Optional configuration name/description.
    #[serde(default)]
    pub name: Option<String>,

    /// Shard location and on-disk format.
    #[serde(default)]
    pub index: IndexSection,

    /// Match-time behavior.
    #[serde(default, rename = "match")]
    pub match_: MatchConfig,

    /// Session behavior.
    #[serde(default)]
    pub session: SessionConfig,
}

impl Default for SymsearchConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            name: None,
            index: IndexSection::default(),
            match_: MatchConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

fn default_version() -> String {
    "1.0".to_string()
}

/// Where the generated shard files live.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexSection {
    /// Directory the documentation generator wrote the shards into.
    #[serde(default = "IndexSection::default_dir")]
    pub dir: PathBuf,

    /// File-name stem: shard `m` lives at `<dir>/<stem>_m.<ext>`.
    #[serde(default = "IndexSection::default_stem")]
    pub stem: String,

    /// On-disk encoding: `doxygen` or `json`.
    #[serde(default)]
    pub format: FileFormat,
}

impl IndexSection {
    fn default_dir() -> PathBuf {
        PathBuf::from("doc/html/search")
    }

    fn default_stem() -> String {
        "all".to_string()
    }
}

impl Default for IndexSection {
    fn default() -> Self {
        Self {
            dir: Self::default_dir(),
            stem: Self::default_stem(),
            format: FileFormat::default(),
        }
    }
}

/// Serde-facing mirror of [`ShardFormat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    #[default]
    Doxygen,
    Json,
}

impl From<FileFormat> for ShardFormat {
    fn from(value: FileFormat) -> Self {
        match value {
            FileFormat::Doxygen => ShardFormat::Doxygen,
            FileFormat::Json => ShardFormat::Json,
        }
    }
}

impl SymsearchConfig {
    /// Load and validate a configuration from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parse and validate a configuration from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: SymsearchConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all sections.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.version != "1.0" {
            return Err(ConfigLoadError::UnsupportedVersion(self.version.clone()));
        }
        if self.index.stem.is_empty() {
            return Err(ConfigLoadError::Validation(
                "index.stem must not be empty".to_string(),
            ));
        }
        self.match_
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        if self.session.debounce_ms == 0 {
            return Err(ConfigLoadError::Validation(
                "session.debounce_ms must be >= 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the shard store this configuration describes.
    pub fn build_store(&self) -> Arc<ShardStore> {
        let source = FsShardSource::new(self.index.dir.clone())
            .with_stem(self.index.stem.clone())
            .with_format(self.index.format.into());
        Arc::new(ShardStore::new(Box::new(source)))
    }
}

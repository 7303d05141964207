//! Configuration file parsing.
//!
//! Parses individual `bookgram.toml` files into `RawConfig` values whose
//! fields stay optional until merging.

use std::{fs, path::Path};

use serde::Deserialize;
use serde_with::{OneOrMany, serde_as};

use crate::ConfigError;

/// Configuration as written in one TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawConfig {
    /// When true, stop discovery here.
    pub root: Option<bool>,
    /// `[store]` section.
    pub store: Option<RawStore>,
    /// `[bulk]` section.
    pub bulk: Option<RawBulk>,
    /// `[search]` section.
    pub search: Option<RawSearch>,
    /// `[metadata]` section.
    pub metadata: Option<RawMetadata>,
    /// `[tokenizer]` section.
    pub tokenizer: Option<RawTokenizer>,
}

/// Raw `[store]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawStore {
    /// Index root directory.
    pub path: Option<String>,
    /// Index name.
    pub index: Option<String>,
    /// Recreate the index on init.
    pub reset: Option<bool>,
    /// Writer memory budget.
    pub writer_heap: Option<usize>,
}

/// Raw `[bulk]` section.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawBulk {
    /// One directory or a list of directories.
    #[serde_as(as = "Option<OneOrMany<_>>")]
    pub source_dir: Option<Vec<String>>,
    /// Resolve ids through a prefix subdirectory.
    pub subdir: Option<bool>,
    /// Worker count.
    pub workers: Option<usize>,
    /// Queue capacity.
    pub queue: Option<usize>,
    /// Flush size trigger.
    pub flush_bytes: Option<usize>,
    /// Flush time trigger.
    pub flush_interval_secs: Option<u64>,
}

/// Raw `[search]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawSearch {
    /// Hits fetched per search.
    pub max_hits: Option<usize>,
    /// Fragment size in characters.
    pub fragment_size: Option<usize>,
    /// Fragments per hit.
    pub max_fragments: Option<usize>,
    /// Matches per page.
    pub per_page: Option<usize>,
    /// Cached result sets.
    pub cache_capacity: Option<usize>,
}

/// Raw `[metadata]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawMetadata {
    /// Manifest URL template.
    pub manifest_url: Option<String>,
    /// Local manifest directory.
    pub manifest_dir: Option<String>,
    /// HTTP timeout.
    pub timeout_secs: Option<u64>,
}

/// Raw `[tokenizer]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawTokenizer {
    /// Tokenizer executable.
    pub program: Option<String>,
    /// Dictionary root.
    pub dic_root: Option<String>,
}

/// Parses a configuration file from disk.
pub fn parse_config_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config_str(&contents, path)
}

/// Parses configuration from a TOML string; `path` is used for errors.
pub fn parse_config_str(contents: &str, path: &Path) -> Result<RawConfig, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}

/// Checks if a config file sets `root = true`; unreadable files do not.
pub fn is_root_config(path: &Path) -> bool {
    parse_config_file(path).is_ok_and(|config| config.root == Some(true))
}

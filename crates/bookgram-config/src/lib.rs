//! Configuration system for bookgram.
//!
//! bookgram reads TOML files named `bookgram.toml`, found by walking up the
//! directory tree from the working directory, with `~/.bookgram.toml` as the
//! lowest-precedence fallback. Every setting has a default, so running with
//! no configuration at all is valid.

#![warn(missing_docs)]

mod discovery;
mod error;
mod merge;
mod parse;
mod resolve;
mod templates;
#[cfg(test)]
mod test_support;
mod validate;

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

pub use discovery::{
    CONFIG_FILENAME, GLOBAL_CONFIG_FILENAME, discover_config_files, global_config_path,
    is_global_config,
};
pub use error::ConfigError;
pub use merge::{ParsedConfig, merge_configs};
pub use parse::{RawConfig, parse_config_file, parse_config_str};
pub use resolve::resolve_path;
use serde::Serialize;
pub use templates::local_template;
pub use validate::ConfigWarning;

/// Fully merged configuration.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Config {
    /// Index location and writer settings.
    pub store: StoreSettings,
    /// Bulk ingestion settings.
    pub bulk: BulkSettings,
    /// Search settings.
    pub search: SearchSettings,
    /// Bibliographic metadata source.
    pub metadata: MetadataSettings,
    /// Morphological tokenizer.
    pub tokenizer: TokenizerSettings,
    /// Directory of the highest-precedence config file.
    #[serde(skip)]
    pub config_root: Option<PathBuf>,
}

impl Config {
    /// Discovers and merges every configuration file relevant to `cwd`.
    pub fn load(cwd: &Path) -> Result<Self, ConfigError> {
        Self::load_from_files(&discover_config_files(cwd))
    }

    /// Merges the given files, highest precedence first.
    pub fn load_from_files(files: &[PathBuf]) -> Result<Self, ConfigError> {
        let parsed = files
            .iter()
            .map(|path| {
                Ok(ParsedConfig {
                    path: path.clone(),
                    config: parse_config_file(path)?,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        merge_configs(&parsed)
    }

    /// Returns warnings about settings that will not work as intended.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        validate::validate_config(self)
    }

    /// Renders the effective settings as TOML.
    pub fn settings_to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// `[store]` settings.
#[derive(Debug, Clone, Serialize)]
pub struct StoreSettings {
    /// Directory holding one index per index name.
    pub path: PathBuf,
    /// Index used by every command.
    pub index: String,
    /// Recreate the index on init.
    pub reset: bool,
    /// Index writer memory budget in bytes.
    pub writer_heap: usize,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from(".bookgram/index"),
            index: "books".into(),
            reset: false,
            writer_heap: 50_000_000,
        }
    }
}

/// `[bulk]` settings.
#[derive(Debug, Clone, Serialize)]
pub struct BulkSettings {
    /// Directories that list ids resolve against, searched in order.
    #[serde(rename = "source_dir")]
    pub source_dirs: Vec<PathBuf>,
    /// Resolve an id `A-B` as `A/A-B`.
    pub subdir: bool,
    /// Worker threads per pipeline stage.
    pub workers: usize,
    /// Capacity of the queue between stages.
    pub queue: usize,
    /// Submit buffered documents at this many bytes.
    pub flush_bytes: usize,
    /// Submit buffered documents after this many seconds.
    pub flush_interval_secs: u64,
}

impl BulkSettings {
    /// Flush interval as a duration.
    pub fn flush_interval(&self) -> Duration {
        Duration::from_secs(self.flush_interval_secs)
    }
}

impl Default for BulkSettings {
    fn default() -> Self {
        Self {
            source_dirs: vec![PathBuf::from("ocr")],
            subdir: false,
            workers: 4,
            queue: 64,
            flush_bytes: 5_000_000,
            flush_interval_secs: 30,
        }
    }
}

/// `[search]` settings.
#[derive(Debug, Clone, Serialize)]
pub struct SearchSettings {
    /// Hits fetched from the index per search.
    pub max_hits: usize,
    /// Highlight fragment size in characters.
    pub fragment_size: usize,
    /// Fragments returned per hit.
    pub max_fragments: usize,
    /// Matches per result page.
    pub per_page: usize,
    /// Result sets kept in memory.
    pub cache_capacity: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_hits: 1000,
            fragment_size: 50,
            max_fragments: 32_767,
            per_page: 20,
            cache_capacity: 128,
        }
    }
}

/// `[metadata]` settings.
#[derive(Debug, Clone, Serialize)]
pub struct MetadataSettings {
    /// Manifest URL; `{bid}` is replaced by the book id.
    pub manifest_url: String,
    /// Read manifests from this directory instead of over HTTP.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest_dir: Option<PathBuf>,
    /// HTTP timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for MetadataSettings {
    fn default() -> Self {
        Self {
            manifest_url: "https://kokusho.nijl.ac.jp/biblio/{bid}/manifest".into(),
            manifest_dir: None,
            timeout_secs: 30,
        }
    }
}

/// `[tokenizer]` settings.
#[derive(Debug, Clone, Serialize)]
pub struct TokenizerSettings {
    /// Tokenizer executable.
    pub program: String,
    /// Directory holding `unidic-{profile}` dictionaries.
    pub dic_root: PathBuf,
}

impl Default for TokenizerSettings {
    fn default() -> Self {
        Self {
            program: "mecab".into(),
            dic_root: PathBuf::from("/usr/local/lib/mecab/dic"),
        }
    }
}

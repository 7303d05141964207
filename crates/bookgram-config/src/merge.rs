//! Configuration merging.
//!
//! Folds parsed files into one `Config`. Files are given highest precedence
//! first; for every field the highest-precedence file that sets it wins.
//! Paths are resolved against the directory of the file that set them, and
//! default paths against the directory of the highest-precedence file.

use std::path::{Path, PathBuf};

use crate::{
    Config, ConfigError,
    parse::{RawBulk, RawConfig, RawMetadata, RawSearch, RawStore, RawTokenizer},
    resolve::resolve_path,
};

/// A parsed config file with its source path.
pub struct ParsedConfig {
    /// Path to the config file.
    pub path: PathBuf,
    /// Parsed raw configuration.
    pub config: RawConfig,
}

impl ParsedConfig {
    /// Directory holding the file.
    fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }
}

/// Merges parsed files, highest precedence first.
pub fn merge_configs(configs: &[ParsedConfig]) -> Result<Config, ConfigError> {
    let mut config = Config::default();
    let Some(first) = configs.first() else {
        return Ok(config);
    };
    let root = first.dir().to_path_buf();
    config.store.path = root.join(&config.store.path);
    config.bulk.source_dirs = config
        .bulk
        .source_dirs
        .iter()
        .map(|dir| root.join(dir))
        .collect();

    // Lowest precedence first so later files overwrite.
    for parsed in configs.iter().rev() {
        let dir = parsed.dir();
        let raw = &parsed.config;
        if let Some(store) = &raw.store {
            apply_store(&mut config, store, dir)?;
        }
        if let Some(bulk) = &raw.bulk {
            apply_bulk(&mut config, bulk, dir)?;
        }
        if let Some(search) = &raw.search {
            apply_search(&mut config, search);
        }
        if let Some(metadata) = &raw.metadata {
            apply_metadata(&mut config, metadata, dir)?;
        }
        if let Some(tokenizer) = &raw.tokenizer {
            apply_tokenizer(&mut config, tokenizer, dir)?;
        }
    }

    config.config_root = Some(root);
    Ok(config)
}

/// Applies a `[store]` section.
fn apply_store(config: &mut Config, raw: &RawStore, dir: &Path) -> Result<(), ConfigError> {
    let store = &mut config.store;
    if let Some(path) = &raw.path {
        store.path = resolve_path(path, dir)?;
    }
    if let Some(index) = &raw.index {
        store.index.clone_from(index);
    }
    if let Some(reset) = raw.reset {
        store.reset = reset;
    }
    if let Some(heap) = raw.writer_heap {
        store.writer_heap = heap;
    }
    Ok(())
}

/// Applies a `[bulk]` section.
fn apply_bulk(config: &mut Config, raw: &RawBulk, dir: &Path) -> Result<(), ConfigError> {
    let bulk = &mut config.bulk;
    if let Some(dirs) = &raw.source_dir {
        bulk.source_dirs = dirs
            .iter()
            .map(|d| resolve_path(d, dir))
            .collect::<Result<_, _>>()?;
    }
    if let Some(subdir) = raw.subdir {
        bulk.subdir = subdir;
    }
    if let Some(workers) = raw.workers {
        bulk.workers = workers;
    }
    if let Some(queue) = raw.queue {
        bulk.queue = queue;
    }
    if let Some(bytes) = raw.flush_bytes {
        bulk.flush_bytes = bytes;
    }
    if let Some(secs) = raw.flush_interval_secs {
        bulk.flush_interval_secs = secs;
    }
    Ok(())
}

/// Applies a `[search]` section.
fn apply_search(config: &mut Config, raw: &RawSearch) {
    let search = &mut config.search;
    if let Some(v) = raw.max_hits {
        search.max_hits = v;
    }
    if let Some(v) = raw.fragment_size {
        search.fragment_size = v;
    }
    if let Some(v) = raw.max_fragments {
        search.max_fragments = v;
    }
    if let Some(v) = raw.per_page {
        search.per_page = v;
    }
    if let Some(v) = raw.cache_capacity {
        search.cache_capacity = v;
    }
}

/// Applies a `[metadata]` section.
fn apply_metadata(config: &mut Config, raw: &RawMetadata, dir: &Path) -> Result<(), ConfigError> {
    let metadata = &mut config.metadata;
    if let Some(url) = &raw.manifest_url {
        metadata.manifest_url.clone_from(url);
    }
    if let Some(manifests) = &raw.manifest_dir {
        metadata.manifest_dir = Some(resolve_path(manifests, dir)?);
    }
    if let Some(secs) = raw.timeout_secs {
        metadata.timeout_secs = secs;
    }
    Ok(())
}

/// Applies a `[tokenizer]` section.
fn apply_tokenizer(
    config: &mut Config,
    raw: &RawTokenizer,
    dir: &Path,
) -> Result<(), ConfigError> {
    let tokenizer = &mut config.tokenizer;
    if let Some(program) = &raw.program {
        tokenizer.program.clone_from(program);
    }
    if let Some(dic_root) = &raw.dic_root {
        tokenizer.dic_root = resolve_path(dic_root, dir)?;
    }
    Ok(())
}

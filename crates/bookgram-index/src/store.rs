//! The document store capability used by ingestion and search.
//!
//! Pipelines only talk to a [`DocumentStore`]; the tantivy-backed
//! [`TantivyStore`](crate::TantivyStore) is the one shipped implementation,
//! and tests are free to substitute their own.

use std::{collections::BTreeMap, time::Duration};

use bookgram_config::{BulkSettings, SearchSettings};
use bookgram_document::{BookText, ReadingLevel};
use bookgram_query::SearchQuery;
use serde::{Deserialize, Serialize};

use crate::IndexError;

/// Settings recorded when an index is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSettings {
    /// Index writer memory budget in bytes.
    pub writer_heap: usize,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            writer_heap: 50_000_000,
        }
    }
}

/// What a store search must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreQuery {
    /// Words that must all occur as contiguous text.
    pub words: Vec<String>,
    /// Reading levels to keep; empty keeps all.
    pub levels: Vec<ReadingLevel>,
    /// Tags to keep; empty keeps all.
    pub tags: Vec<String>,
    /// Book ids to keep; empty keeps all.
    pub bids: Vec<String>,
    /// Maximum number of hits.
    pub limit: usize,
}

impl StoreQuery {
    /// Builds the store query for a search request.
    pub fn from_search(query: &SearchQuery, limit: usize) -> Self {
        Self {
            words: query.words.clone(),
            levels: query.levels.clone(),
            tags: query.tags.clone(),
            bids: query.bids.clone(),
            limit,
        }
    }
}

/// How matched text is cut into highlighted fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightSpec {
    /// Target fragment length in code points.
    pub fragment_size: usize,
    /// Maximum fragments per hit.
    pub max_fragments: usize,
}

impl From<&SearchSettings> for HighlightSpec {
    fn from(settings: &SearchSettings) -> Self {
        Self {
            fragment_size: settings.fragment_size.max(1),
            max_fragments: settings.max_fragments,
        }
    }
}

/// Order of returned hits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HitOrder {
    /// Book id ascending, then document id.
    #[default]
    BookIdAsc,
    /// Book id descending, then document id.
    BookIdDesc,
}

/// One matching document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    /// Document id.
    pub id: String,
    /// Stored document as JSON.
    pub source: String,
    /// Highlighted fragments of the document text.
    pub highlights: Vec<String>,
}

/// Flush triggers for a bulk submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkOptions {
    /// Flush once this many serialized bytes are buffered.
    pub flush_bytes: usize,
    /// Flush once this long has passed since the last flush.
    pub flush_interval: Duration,
}

impl From<&BulkSettings> for BulkOptions {
    fn from(settings: &BulkSettings) -> Self {
        Self {
            flush_bytes: settings.flush_bytes.max(1),
            flush_interval: settings.flush_interval(),
        }
    }
}

impl Default for BulkOptions {
    fn default() -> Self {
        Self::from(&BulkSettings::default())
    }
}

/// Outcome of a bulk submit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkStats {
    /// Documents written.
    pub flushed: u64,
    /// Documents that could not be written.
    pub failed: u64,
    /// One message per failure.
    pub errors: Vec<String>,
}

/// A store holding book texts in named indexes.
pub trait DocumentStore: Send + Sync {
    /// Whether index `index` exists.
    fn exists(&self, index: &str) -> Result<bool, IndexError>;

    /// Creates index `index`.
    fn create(&self, index: &str, settings: &IndexSettings) -> Result<(), IndexError>;

    /// Deletes index `index` and everything in it.
    fn delete(&self, index: &str) -> Result<(), IndexError>;

    /// Stores `doc` under `id`, replacing any document with that id.
    fn index(&self, index: &str, id: &str, doc: &BookText) -> Result<(), IndexError>;

    /// Fetches the document stored under `id`.
    fn get(&self, index: &str, id: &str) -> Result<BookText, IndexError>;

    /// Finds documents matching `query`.
    fn search(
        &self,
        index: &str,
        query: &StoreQuery,
        highlight: &HighlightSpec,
        order: HitOrder,
    ) -> Result<Vec<Hit>, IndexError>;

    /// Stores every `(id, doc)` pair, flushing as `options` dictate.
    ///
    /// Per-document failures are counted in the returned stats; an error is
    /// returned only when the store itself is unusable.
    fn bulk_submit(
        &self,
        index: &str,
        docs: &mut dyn Iterator<Item = (String, BookText)>,
        options: &BulkOptions,
    ) -> Result<BulkStats, IndexError>;

    /// Number of documents per reading level, every level present.
    fn count_by_level(&self, index: &str) -> Result<BTreeMap<ReadingLevel, u64>, IndexError>;
}

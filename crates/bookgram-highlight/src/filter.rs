//! Keyword facet counts collected across search matches.

use std::collections::BTreeMap;

use bookgram_document::ReadingLevel;
use serde::Serialize;

use crate::Marker;

/// Occurrences per document id.
pub type DocCounts = BTreeMap<String, u32>;

/// Occurrence counts keyed by marker key, word, reading level and document id.
///
/// Serializes as the nested object
/// `{ key: { word: { level: { doc_id: count } } } }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct KeywordFilter {
    /// Nested counts.
    counts: BTreeMap<String, BTreeMap<String, BTreeMap<ReadingLevel, DocCounts>>>,
}

impl KeywordFilter {
    /// Creates an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one occurrence of `word` under `key` in document `doc_id`.
    pub fn record(&mut self, key: &str, word: &str, level: ReadingLevel, doc_id: &str) {
        *self
            .counts
            .entry(key.to_string())
            .or_default()
            .entry(word.to_string())
            .or_default()
            .entry(level)
            .or_default()
            .entry(doc_id.to_string())
            .or_default() += 1;
    }

    /// Counts every marker of one fragment.
    pub fn record_all(&mut self, markers: &[Marker<'_>], level: ReadingLevel, doc_id: &str) {
        for marker in markers {
            self.record(marker.key, marker.word, level, doc_id);
        }
    }

    /// Returns the count for one cell, zero if never recorded.
    pub fn count(&self, key: &str, word: &str, level: ReadingLevel, doc_id: &str) -> u32 {
        self.counts
            .get(key)
            .and_then(|words| words.get(word))
            .and_then(|levels| levels.get(&level))
            .and_then(|docs| docs.get(doc_id))
            .copied()
            .unwrap_or(0)
    }

    /// Total occurrences of `word` under `key`, across levels and documents.
    pub fn total(&self, key: &str, word: &str) -> u32 {
        self.counts
            .get(key)
            .and_then(|words| words.get(word))
            .map_or(0, |levels| levels.values().flat_map(|docs| docs.values()).sum())
    }

    /// Iterates over `(key, word)` pairs in sorted order.
    pub fn words(&self) -> impl Iterator<Item = (&str, &str)> {
        self.counts.iter().flat_map(|(key, words)| {
            words
                .keys()
                .map(move |word| (key.as_str(), word.as_str()))
        })
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

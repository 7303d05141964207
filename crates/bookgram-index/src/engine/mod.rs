//! Tantivy implementation of [`DocumentStore`].
//!
//! Each index id is a directory under the store root holding one tantivy
//! index plus a `bookgram.json` settings file. Opened indexes are cached for
//! the life of the store; the writer is opened on first write, so a store
//! used only for reading never takes the index lock.

mod fragments;
mod query;

use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::Instant,
};

use bookgram_document::{BookText, ReadingLevel};
use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};
use serde::Deserialize;
use tantivy::{
    Index, IndexReader, IndexWriter, ReloadPolicy, Searcher, TantivyDocument, Term,
    collector::{Count, DocSetCollector, TopDocs},
    directory::MmapDirectory,
    query::TermQuery,
    schema::{Field, IndexRecordOption, Value},
    tokenizer::TextAnalyzer,
};
use tracing::{debug, info};

pub use self::fragments::fragments;
use crate::{
    BulkOptions, BulkStats, DocumentStore, HighlightSpec, Hit, HitOrder, IndexError,
    IndexSettings, StoreQuery, analyzer, schema::IndexSchema,
};

/// Settings file written next to each index.
const SETTINGS_FILE: &str = "bookgram.json";

/// File tantivy writes once an index exists.
const META_FILE: &str = "meta.json";

/// Book store keeping one tantivy index per index id under a root directory.
pub struct TantivyStore {
    /// Directory holding one subdirectory per index.
    root: PathBuf,
    /// Indexes opened so far.
    open: Mutex<HashMap<String, Arc<OpenIndex>>>,
}

impl TantivyStore {
    /// Creates a store rooted at `root`. Nothing is opened yet.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            open: Mutex::new(HashMap::new()),
        }
    }

    /// Directory holding the indexes.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of index `index`.
    fn dir(&self, index: &str) -> PathBuf {
        self.root.join(index)
    }

    /// Returns the open handle for `index`, opening it if needed.
    fn handle(&self, index: &str) -> Result<Arc<OpenIndex>, IndexError> {
        let mut open = self.open.lock();
        if let Some(handle) = open.get(index) {
            return Ok(Arc::clone(handle));
        }
        let dir = self.dir(index);
        if !dir.join(META_FILE).is_file() {
            return Err(IndexError::IndexMissing {
                index: index.to_string(),
            });
        }
        let handle = Arc::new(OpenIndex::open(&dir)?);
        open.insert(index.to_string(), Arc::clone(&handle));
        Ok(handle)
    }
}

impl DocumentStore for TantivyStore {
    fn exists(&self, index: &str) -> Result<bool, IndexError> {
        Ok(self.dir(index).join(META_FILE).is_file())
    }

    fn create(&self, index: &str, settings: &IndexSettings) -> Result<(), IndexError> {
        if self.exists(index)? {
            return Err(IndexError::IndexExists {
                index: index.to_string(),
            });
        }
        let dir = self.dir(index);
        fs::create_dir_all(&dir)?;
        let json = serde_json::to_string_pretty(settings).map_err(|source| IndexError::Encode {
            id: SETTINGS_FILE.to_string(),
            source,
        })?;
        fs::write(dir.join(SETTINGS_FILE), json)?;

        let schema = IndexSchema::new();
        let directory = MmapDirectory::open(&dir).map_err(|e| {
            let err: tantivy::TantivyError = e.into();
            IndexError::open_index(dir.clone(), &err)
        })?;
        Index::open_or_create(directory, schema.schema().clone())
            .map_err(|e| IndexError::open_index(dir.clone(), &e))?;
        info!(index, path = %dir.display(), "index created");
        Ok(())
    }

    fn delete(&self, index: &str) -> Result<(), IndexError> {
        if let Some(handle) = self.open.lock().remove(index) {
            *handle.writer.lock() = None;
        }
        let dir = self.dir(index);
        if !dir.is_dir() {
            return Err(IndexError::IndexMissing {
                index: index.to_string(),
            });
        }
        fs::remove_dir_all(&dir)?;
        info!(index, "index deleted");
        Ok(())
    }

    fn index(&self, index: &str, id: &str, doc: &BookText) -> Result<(), IndexError> {
        let handle = self.handle(index)?;
        let source = serde_json::to_string(doc).map_err(|source| IndexError::Encode {
            id: id.to_string(),
            source,
        })?;
        {
            let mut writer = handle.writer()?;
            writer.delete_term(Term::from_field_text(handle.schema.id, id));
            writer
                .add_document(handle.schema.document(id, doc, source))
                .map_err(|e| IndexError::write(&e))?;
            writer.commit().map_err(|e| IndexError::commit(&e))?;
        }
        handle.reload()?;
        debug!(index, id, "document indexed");
        Ok(())
    }

    fn get(&self, index: &str, id: &str) -> Result<BookText, IndexError> {
        let handle = self.handle(index)?;
        let searcher = handle.reader.searcher();
        let query = TermQuery::new(
            Term::from_field_text(handle.schema.id, id),
            IndexRecordOption::Basic,
        );
        let top = searcher
            .search(&query, &TopDocs::with_limit(1))
            .map_err(|e| IndexError::search(&e))?;
        let Some((_, address)) = top.first() else {
            return Err(IndexError::DocumentMissing { id: id.to_string() });
        };
        let doc: TantivyDocument = searcher
            .doc(*address)
            .map_err(|e| IndexError::search(&e))?;
        let source = text_value(&doc, handle.schema.source);
        serde_json::from_str(&source).map_err(|source| IndexError::Decode {
            id: id.to_string(),
            source,
        })
    }

    fn search(
        &self,
        index: &str,
        query: &StoreQuery,
        highlight: &HighlightSpec,
        order: HitOrder,
    ) -> Result<Vec<Hit>, IndexError> {
        let handle = self.handle(index)?;
        let compiled = query::compile(&handle.schema, &mut handle.analyzer.clone(), query)?;
        let searcher = handle.reader.searcher();
        let matched = searcher
            .search(&*compiled, &DocSetCollector)
            .map_err(|e| IndexError::search(&e))?;

        let mut found = Vec::with_capacity(matched.len());
        for address in matched {
            let doc: TantivyDocument = searcher
                .doc(address)
                .map_err(|e| IndexError::search(&e))?;
            found.push((
                text_value(&doc, handle.schema.bid),
                text_value(&doc, handle.schema.id),
                text_value(&doc, handle.schema.source),
            ));
        }
        found.sort_unstable_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
        if order == HitOrder::BookIdDesc {
            found.reverse();
        }
        found.truncate(query.limit);

        let hits = found
            .into_iter()
            .map(|(_, id, source)| {
                let stored: StoredText =
                    serde_json::from_str(&source).map_err(|e| IndexError::Decode {
                        id: id.clone(),
                        source: e,
                    })?;
                let highlights = fragments(&stored.text, &query.words, highlight);
                Ok(Hit {
                    id,
                    source,
                    highlights,
                })
            })
            .collect::<Result<Vec<_>, IndexError>>()?;
        debug!(index, hits = hits.len(), "store search");
        Ok(hits)
    }

    fn bulk_submit(
        &self,
        index: &str,
        docs: &mut dyn Iterator<Item = (String, BookText)>,
        options: &BulkOptions,
    ) -> Result<BulkStats, IndexError> {
        let handle = self.handle(index)?;
        let mut stats = BulkStats::default();
        let mut batch = Batch::default();
        {
            let mut writer = handle.writer()?;
            for (id, doc) in docs {
                let source = match serde_json::to_string(&doc) {
                    Ok(source) => source,
                    Err(source) => {
                        stats.failed += 1;
                        stats.errors.push(IndexError::Encode { id, source }.to_string());
                        continue;
                    }
                };
                batch.bytes += source.len();
                writer.delete_term(Term::from_field_text(handle.schema.id, &id));
                match writer.add_document(handle.schema.document(&id, &doc, source)) {
                    Ok(_) => batch.docs += 1,
                    Err(e) => {
                        stats.failed += 1;
                        stats.errors.push(IndexError::write(&e).to_string());
                    }
                }
                if batch.bytes >= options.flush_bytes
                    || batch.started.elapsed() >= options.flush_interval
                {
                    batch.flush(&mut writer, &mut stats);
                }
            }
            batch.flush(&mut writer, &mut stats);
        }
        handle.reload()?;
        info!(
            index,
            flushed = stats.flushed,
            failed = stats.failed,
            "bulk submit finished"
        );
        Ok(stats)
    }

    fn count_by_level(&self, index: &str) -> Result<BTreeMap<ReadingLevel, u64>, IndexError> {
        let handle = self.handle(index)?;
        let searcher = handle.reader.searcher();
        let mut counts = BTreeMap::new();
        for level in ReadingLevel::ALL {
            counts.insert(
                level,
                count_term(&searcher, handle.schema.elevel, level.as_str())?,
            );
        }
        Ok(counts)
    }
}

/// An index opened for reading, with its writer opened on demand.
struct OpenIndex {
    /// Index directory.
    path: PathBuf,
    /// The tantivy index.
    index: Index,
    /// Reader, reloaded after every commit.
    reader: IndexReader,
    /// Writer, opened on first write.
    writer: Mutex<Option<IndexWriter>>,
    /// Field handles.
    schema: IndexSchema,
    /// Bigram analyzer for query words.
    analyzer: TextAnalyzer,
    /// Settings recorded at creation.
    settings: IndexSettings,
}

impl OpenIndex {
    /// Opens the index in `dir`.
    fn open(dir: &Path) -> Result<Self, IndexError> {
        let settings = read_settings(dir)?;
        let directory = MmapDirectory::open(dir).map_err(|e| {
            let err: tantivy::TantivyError = e.into();
            IndexError::open_index(dir.to_path_buf(), &err)
        })?;
        let index =
            Index::open(directory).map_err(|e| IndexError::open_index(dir.to_path_buf(), &e))?;
        analyzer::register(&index)?;
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| IndexError::open_index(dir.to_path_buf(), &e))?;
        debug!(path = %dir.display(), "index opened");
        Ok(Self {
            path: dir.to_path_buf(),
            index,
            reader,
            writer: Mutex::new(None),
            schema: IndexSchema::new(),
            analyzer: analyzer::build_analyzer()?,
            settings,
        })
    }

    /// Locks the writer, opening it first if needed.
    fn writer(&self) -> Result<MappedMutexGuard<'_, IndexWriter>, IndexError> {
        let mut slot = self.writer.lock();
        if slot.is_none() {
            let writer = self
                .index
                .writer(self.settings.writer_heap)
                .map_err(|e| IndexError::open_index(self.path.clone(), &e))?;
            *slot = Some(writer);
        }
        MutexGuard::try_map(slot, Option::as_mut)
            .map_err(|_| IndexError::Write("index writer unavailable".into()))
    }

    /// Makes committed changes visible to searches.
    fn reload(&self) -> Result<(), IndexError> {
        self.reader.reload().map_err(|e| IndexError::commit(&e))
    }
}

/// Documents added since the last commit.
struct Batch {
    /// Documents waiting for a commit.
    docs: u64,
    /// Serialized size of those documents.
    bytes: usize,
    /// When the batch started.
    started: Instant,
}

impl Default for Batch {
    fn default() -> Self {
        Self {
            docs: 0,
            bytes: 0,
            started: Instant::now(),
        }
    }
}

impl Batch {
    /// Commits the batch and counts its documents as flushed or failed.
    fn flush(&mut self, writer: &mut IndexWriter, stats: &mut BulkStats) {
        if self.docs == 0 {
            *self = Self::default();
            return;
        }
        match writer.commit() {
            Ok(_) => stats.flushed += self.docs,
            Err(e) => {
                stats.failed += self.docs;
                stats.errors.push(IndexError::commit(&e).to_string());
                if let Err(e) = writer.rollback() {
                    stats.errors.push(IndexError::write(&e).to_string());
                }
            }
        }
        debug!(docs = self.docs, bytes = self.bytes, "batch flushed");
        *self = Self::default();
    }
}

/// The only part of a stored document needed for highlighting.
#[derive(Deserialize)]
struct StoredText {
    /// Full transcription.
    text: String,
}

/// Reads the settings file of the index in `dir`, defaulting when absent.
fn read_settings(dir: &Path) -> Result<IndexSettings, IndexError> {
    let path = dir.join(SETTINGS_FILE);
    if !path.is_file() {
        return Ok(IndexSettings::default());
    }
    let raw = fs::read_to_string(&path)?;
    serde_json::from_str(&raw).map_err(|e| IndexError::OpenIndex {
        path,
        message: e.to_string(),
    })
}

/// First string value of `field`, or empty.
fn text_value(doc: &TantivyDocument, field: Field) -> String {
    doc.get_first(field)
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}

/// Number of documents whose `field` is exactly `value`.
fn count_term(searcher: &Searcher, field: Field, value: &str) -> Result<u64, IndexError> {
    let query = TermQuery::new(
        Term::from_field_text(field, value),
        IndexRecordOption::Basic,
    );
    let count = searcher
        .search(&query, &Count)
        .map_err(|e| IndexError::search(&e))?;
    Ok(count as u64)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bookgram_document::{BookMetadata, BoundingBox};

    use super::*;

    fn book(bid: &str, text: &str) -> BookText {
        BookText {
            metadata: BookMetadata {
                bid: bid.into(),
                cid: format!("c{bid}"),
                tags: vec!["ndlocrv2".into()],
                ..Default::default()
            },
            text: text.into(),
            pbs: vec![0],
            lbs: vec![0],
            bbs: vec![BoundingBox::default()],
            images: vec!["p1.tif".into()],
            ..Default::default()
        }
    }

    fn store_with(books: &[BookText]) -> (tempfile::TempDir, TantivyStore) {
        let tmp = tempfile::tempdir().unwrap();
        let store = TantivyStore::new(tmp.path());
        store.create("books", &IndexSettings::default()).unwrap();
        for doc in books {
            store.index("books", &doc.identity_key(), doc).unwrap();
        }
        (tmp, store)
    }

    fn search(store: &TantivyStore, words: &[&str]) -> Vec<Hit> {
        let query = StoreQuery {
            words: words.iter().map(ToString::to_string).collect(),
            limit: 100,
            ..Default::default()
        };
        let spec = HighlightSpec {
            fragment_size: 50,
            max_fragments: 10,
        };
        store
            .search("books", &query, &spec, HitOrder::BookIdAsc)
            .unwrap()
    }

    #[test]
    fn create_delete_lifecycle() {
        let tmp = tempfile::tempdir().unwrap();
        let store = TantivyStore::new(tmp.path());
        assert!(!store.exists("books").unwrap());
        store.create("books", &IndexSettings::default()).unwrap();
        assert!(store.exists("books").unwrap());
        assert!(matches!(
            store.create("books", &IndexSettings::default()),
            Err(IndexError::IndexExists { .. })
        ));
        store.delete("books").unwrap();
        assert!(!store.exists("books").unwrap());
        assert!(matches!(
            store.delete("books"),
            Err(IndexError::IndexMissing { .. })
        ));
    }

    #[test]
    fn missing_index_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let store = TantivyStore::new(tmp.path());
        assert!(matches!(
            store.get("nope", "x"),
            Err(IndexError::IndexMissing { index }) if index == "nope"
        ));
    }

    #[test]
    fn get_round_trips_document() {
        let doc = book("100000001", "春はあけぼの");
        let (_tmp, store) = store_with(&[doc.clone()]);
        assert_eq!(store.get("books", &doc.identity_key()).unwrap(), doc);
        assert!(matches!(
            store.get("books", "missing"),
            Err(IndexError::DocumentMissing { .. })
        ));
    }

    #[test]
    fn reindexing_replaces_document() {
        let first = book("100000001", "春はあけぼの");
        let second = book("100000001", "夏は夜");
        let (_tmp, store) = store_with(&[first, second.clone()]);
        assert!(search(&store, &["あけぼの"]).is_empty());
        let hits = search(&store, &["夏は"]);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, second.identity_key());
    }

    #[test]
    fn phrase_requires_contiguous_text() {
        let (_tmp, store) = store_with(&[
            book("100000001", "春の雨が降る"),
            book("100000002", "春の夜の雨"),
        ]);
        let hits = search(&store, &["春の雨"]);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "100000001_OCR_ndlocrv2");
        assert_eq!(
            hits[0].highlights,
            vec![format!("{}が降る", bookgram_highlight::wrap("1", "春の雨"))]
        );
    }

    #[test]
    fn hits_sorted_by_book_id() {
        let (_tmp, store) = store_with(&[
            book("300000000", "月夜の晩"),
            book("100000000", "月夜の海"),
            book("200000000", "月夜の山"),
        ]);
        let ids: Vec<String> = search(&store, &["月夜"])
            .into_iter()
            .map(|hit| hit.id)
            .collect();
        assert_eq!(
            ids,
            vec![
                "100000000_OCR_ndlocrv2",
                "200000000_OCR_ndlocrv2",
                "300000000_OCR_ndlocrv2"
            ]
        );
    }

    #[test]
    fn filters_restrict_hits() {
        let mut proofread = book("200000000", "月夜の山");
        proofread.metadata.elevel = ReadingLevel::ProofRead;
        let (_tmp, store) = store_with(&[book("100000000", "月夜の海"), proofread]);
        let query = StoreQuery {
            words: vec!["月夜".into()],
            levels: vec![ReadingLevel::ProofRead],
            limit: 10,
            ..Default::default()
        };
        let spec = HighlightSpec {
            fragment_size: 10,
            max_fragments: 1,
        };
        let hits = store
            .search("books", &query, &spec, HitOrder::BookIdAsc)
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "200000000_PROOF_READ_ndlocrv2");
    }

    #[test]
    fn bulk_submit_counts_and_commits() {
        let (_tmp, store) = store_with(&[]);
        let books = [book("1", "一の巻"), book("2", "二の巻"), book("3", "三の巻")];
        let mut docs = books.iter().map(|b| (b.identity_key(), b.clone()));
        let options = BulkOptions {
            flush_bytes: 1,
            flush_interval: Duration::from_secs(60),
        };
        let stats = store.bulk_submit("books", &mut docs, &options).unwrap();
        assert_eq!(stats.flushed, 3);
        assert_eq!(stats.failed, 0);
        assert_eq!(search(&store, &["の巻"]).len(), 3);
    }

    #[test]
    fn counts_every_level() {
        let mut proofread = book("2", "校正済み");
        proofread.metadata.elevel = ReadingLevel::ProofRead;
        let (_tmp, store) = store_with(&[book("1", "一"), book("3", "三"), proofread]);
        let counts = store.count_by_level("books").unwrap();
        assert_eq!(counts[&ReadingLevel::Ocr], 2);
        assert_eq!(counts[&ReadingLevel::ProofRead], 1);
    }
}

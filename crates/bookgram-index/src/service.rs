//! The operations exposed to callers, wired to configuration.

use std::{collections::BTreeMap, path::Path, sync::Arc};

use bookgram_config::Config;
use bookgram_context::PartialMatchContext;
use bookgram_document::{BookMetadata, BookText, LabelValue, OcrFormat};
use bookgram_highlight::KeywordFilter;
use bookgram_query::{SearchQuery, paginate};
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    BulkReport, BulkRun, Collaborators, DocumentStore, HighlightSpec, HitOrder, IndexError,
    IndexSettings, ListLayout, MecabCommand, MetadataSource, MorphTokenizer, RegisterRequest,
    ResultCache, SearchOutcome, StoreQuery, TantivyStore, build_book, collect_matches,
    metadata_source, open_bulk_list, run_bulk,
};

/// What `init` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// The index did not exist and was created.
    Created,
    /// The index already existed and was left alone.
    Kept,
    /// The index existed and was dropped and created again.
    Recreated,
}

/// Facets reported with every result page.
#[derive(Debug, Clone, Serialize)]
pub struct Filters {
    /// Keyword occurrence counts.
    pub keyword: KeywordFilter,
    /// Matched documents per tag.
    pub tag: Vec<LabelValue>,
}

/// One page of search results.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    /// Facets over the whole result set.
    pub filters: Filters,
    /// Bibliographic metadata per hit id.
    pub bibl: BTreeMap<String, BookMetadata>,
    /// Matches on this page.
    #[serde(rename = "match")]
    pub matches: Vec<PartialMatchContext>,
    /// Page number, 1-based.
    pub page: usize,
    /// Page size.
    pub per_page: usize,
    /// Matches in the whole result set.
    pub total: usize,
}

/// Indexed documents per reading level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordCount {
    /// Count keyed by level name.
    pub record_count: BTreeMap<String, u64>,
}

/// A configured book library: one index plus its collaborators.
pub struct Library {
    /// Effective configuration.
    config: Config,
    /// Where documents live.
    store: Box<dyn DocumentStore>,
    /// Manifest source.
    metadata: Box<dyn MetadataSource>,
    /// Tokenizer for profiled documents.
    tokenizer: Box<dyn MorphTokenizer>,
    /// Search outcomes by query key.
    cache: ResultCache,
}

impl Library {
    /// Opens the library `config` describes, with its default collaborators.
    pub fn open(config: Config) -> Result<Self, IndexError> {
        let store = Box::new(TantivyStore::new(config.store.path.clone()));
        let metadata = metadata_source(&config.metadata)?;
        let tokenizer = Box::new(MecabCommand::from_settings(&config.tokenizer));
        Ok(Self::with_parts(config, store, metadata, tokenizer))
    }

    /// Assembles a library from explicit parts.
    pub fn with_parts(
        config: Config,
        store: Box<dyn DocumentStore>,
        metadata: Box<dyn MetadataSource>,
        tokenizer: Box<dyn MorphTokenizer>,
    ) -> Self {
        let cache = ResultCache::new(config.search.cache_capacity);
        Self {
            config,
            store,
            metadata,
            tokenizer,
            cache,
        }
    }

    /// The effective configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Index every operation works on.
    fn index(&self) -> &str {
        &self.config.store.index
    }

    /// Collaborators for building documents.
    fn collaborators(&self) -> Collaborators<'_> {
        Collaborators {
            metadata: self.metadata.as_ref(),
            tokenizer: self.tokenizer.as_ref(),
        }
    }

    /// Creates the index. An existing index is kept unless `reset` is set,
    /// in which case it is deleted and created again.
    pub fn init(&self, reset: bool) -> Result<InitOutcome, IndexError> {
        let index = self.index();
        let settings = IndexSettings {
            writer_heap: self.config.store.writer_heap,
        };
        let outcome = if !self.store.exists(index)? {
            self.store.create(index, &settings)?;
            InitOutcome::Created
        } else if reset {
            self.store.delete(index)?;
            self.store.create(index, &settings)?;
            InitOutcome::Recreated
        } else {
            InitOutcome::Kept
        };
        self.cache.clear();
        info!(index, ?outcome, "init");
        Ok(outcome)
    }

    /// Builds and stores one document, returning its id.
    pub fn register(&self, request: &RegisterRequest) -> Result<String, IndexError> {
        let book = build_book(request, self.collaborators())?;
        let id = book.identity_key();
        self.store.index(self.index(), &id, &book)?;
        self.cache.clear();
        info!(id, "registered");
        Ok(id)
    }

    /// Registers every book listed in the CSV file at `list`.
    ///
    /// Fails only when the list cannot be used at all; per-book failures are
    /// in the report.
    pub fn bulk_register(&self, list: &Path, format: OcrFormat) -> Result<BulkReport, IndexError> {
        let layout = ListLayout::from_settings(&self.config.bulk);
        let requests = open_bulk_list(list, layout, format)?;
        let run = BulkRun::from(&self.config.bulk);
        let report = run_bulk(
            requests,
            self.store.as_ref(),
            self.index(),
            self.collaborators(),
            &run,
        );
        self.cache.clear();
        Ok(report)
    }

    /// Runs `query` and returns the page it asks for.
    pub fn search(&self, query: &SearchQuery) -> Result<SearchPage, IndexError> {
        query.validate()?;
        let outcome = self.outcome(query)?;
        let page = query.page_or_default();
        let per_page = query.per_page_or(self.config.search.per_page).max(1);
        let matches = paginate(&outcome.matches, page, per_page)?.to_vec();
        Ok(SearchPage {
            filters: Filters {
                keyword: outcome.keyword.clone(),
                tag: outcome.tags.clone(),
            },
            bibl: outcome.bibl.clone(),
            matches,
            page,
            per_page,
            total: outcome.matches.len(),
        })
    }

    /// The full outcome of `query`, from the cache when possible.
    fn outcome(&self, query: &SearchQuery) -> Result<Arc<SearchOutcome>, IndexError> {
        let key = query.cache_key();
        if let Some(outcome) = self.cache.get(&key) {
            debug!(key, "search cache hit");
            return Ok(outcome);
        }
        let settings = &self.config.search;
        let hits = self.store.search(
            self.index(),
            &StoreQuery::from_search(query, settings.max_hits),
            &HighlightSpec::from(settings),
            HitOrder::BookIdAsc,
        )?;
        let outcome = Arc::new(collect_matches(hits, self.config.bulk.workers)?);
        self.cache.put(key, Arc::clone(&outcome));
        Ok(outcome)
    }

    /// Fetches the stored document `id`.
    pub fn get(&self, id: &str) -> Result<BookText, IndexError> {
        self.store.get(self.index(), id)
    }

    /// Counts indexed documents per reading level.
    pub fn count(&self) -> Result<RecordCount, IndexError> {
        let record_count = self
            .store
            .count_by_level(self.index())?
            .into_iter()
            .map(|(level, count)| (level.as_str().to_string(), count))
            .collect();
        Ok(RecordCount { record_count })
    }
}

//! Book store, ingestion and search for bookgram.
//!
//! This crate ties the document model to storage and to the outside world:
//! - A [`DocumentStore`] capability and its tantivy implementation, which
//!   indexes text as character bigrams so any contiguous run of two or more
//!   characters can be found
//! - Manifest and tokenizer collaborators used while building documents
//! - The two-stage bulk registration and search result pipelines
//! - [`Library`], which wires all of it to a [`Config`](bookgram_config::Config)
//!
//! # Example
//!
//! ```no_run
//! use bookgram_config::Config;
//! use bookgram_index::Library;
//! use bookgram_query::SearchQuery;
//!
//! let library = Library::open(Config::default()).unwrap();
//! library.init(false).unwrap();
//! let page = library.search(&SearchQuery::new(["月日"])).unwrap();
//! println!("{} matches", page.total);
//! ```

#![warn(missing_docs)]

mod analyzer;
mod bulk;
mod cache;
mod engine;
mod error;
mod metadata;
mod register;
mod schema;
mod search;
mod service;
mod store;
#[cfg(test)]
mod test_support;
mod tokenizer;

pub use analyzer::{BIGRAM_TOKENIZER, bigrams, build_analyzer};
pub use bulk::{BulkList, BulkReport, BulkRun, ListLayout, open_bulk_list, run_bulk};
pub use cache::ResultCache;
pub use engine::{TantivyStore, fragments};
pub use error::{ErrorKind, IndexError, ItemError};
pub use metadata::{HttpManifests, Manifest, ManifestDir, MetadataSource, image_id, metadata_source};
pub use register::{Collaborators, RegisterRequest, build_book};
pub use schema::IndexSchema;
pub use search::{SearchOutcome, collect_matches};
pub use service::{Filters, InitOutcome, Library, RecordCount, SearchPage};
pub use store::{
    BulkOptions, BulkStats, DocumentStore, HighlightSpec, Hit, HitOrder, IndexSettings, StoreQuery,
};
pub use tokenizer::{MecabCommand, MorphTokenizer, PROFILES, check_profile, parse_output, token_key};

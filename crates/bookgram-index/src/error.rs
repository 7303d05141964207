//! Error types for the bookgram-index crate.

use std::{fmt, io, path::PathBuf};

use bookgram_context::ContextError;
use bookgram_document::DocumentError;
use bookgram_highlight::HighlightError;
use bookgram_query::QueryError;
use serde::Serialize;
use thiserror::Error;

/// Broad class of a failure, used to decide how it is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Bad request parameters; rejected before any work starts.
    Validation,
    /// Undecodable or empty source data.
    Format,
    /// A document, snippet or index that does not exist.
    NotFound,
    /// A store or collaborator call failed.
    Upstream,
    /// Unsupported profile, format or setting.
    Config,
}

impl ErrorKind {
    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Format => "format",
            Self::NotFound => "not found",
            Self::Upstream => "upstream",
            Self::Config => "config",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One failed item of a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemError {
    /// Hit id or book id of the item.
    pub id: String,
    /// Failure class.
    pub kind: ErrorKind,
    /// Human-readable description.
    pub message: String,
}

impl ItemError {
    /// Records `err` against `id`.
    pub fn new(id: impl Into<String>, err: &IndexError) -> Self {
        Self {
            id: id.into(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for ItemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.message)
    }
}

/// Errors that can occur when working with the book store.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Failed to open or create an index.
    #[error("failed to open index at {path}: {message}")]
    OpenIndex {
        /// Path to the index directory.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// The named index has not been created.
    #[error("index not found: {index}")]
    IndexMissing {
        /// Index id.
        index: String,
    },

    /// The named index already exists.
    #[error("index already exists: {index}")]
    IndexExists {
        /// Index id.
        index: String,
    },

    /// No stored document has the given id.
    #[error("document not found: {id}")]
    DocumentMissing {
        /// Requested document id.
        id: String,
    },

    /// The text analyzer could not be built.
    #[error("failed to build analyzer: {0}")]
    Analyzer(String),

    /// Failed to write to an index.
    #[error("failed to write to index: {0}")]
    Write(String),

    /// Failed to commit changes to an index.
    #[error("failed to commit index: {0}")]
    Commit(String),

    /// Failed to execute a search.
    #[error("search failed: {0}")]
    Search(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A document could not be serialized for storage.
    #[error("cannot encode document {id}: {source}")]
    Encode {
        /// Document id.
        id: String,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// A stored document could not be decoded.
    #[error("cannot decode document {id}: {source}")]
    Decode {
        /// Document id.
        id: String,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// A search word yields no bigram.
    #[error("search word {word:?} is too short to index")]
    EmptyPhrase {
        /// The rejected word.
        word: String,
    },

    /// A hit's id does not match the identity of its stored document.
    #[error("q1:id:{id}; bid:{bid}")]
    IdMismatch {
        /// Hit id.
        id: String,
        /// Book id found in the stored document.
        bid: String,
    },

    /// The HTTP client could not be built.
    #[error("cannot construct HTTP client: {0}")]
    Client(String),

    /// Fetching or parsing a manifest failed.
    #[error("metadata for {bid}: {message}")]
    Metadata {
        /// Book id.
        bid: String,
        /// What went wrong, including the manifest location.
        message: String,
    },

    /// A kept page has no canvas in the manifest.
    #[error("manifest for {bid} has no canvas {canvas} ({available} canvases)")]
    MissingCanvas {
        /// Book id.
        bid: String,
        /// 1-based canvas requested.
        canvas: usize,
        /// Canvases in the manifest.
        available: usize,
    },

    /// The tokenizer profile is not supported.
    #[error("unexpected mecab type: \"{profile}\"")]
    UnknownProfile {
        /// The rejected profile name.
        profile: String,
    },

    /// Running the tokenizer failed.
    #[error("mecab {profile}: {message}")]
    Tokenizer {
        /// Profile in use.
        profile: String,
        /// What went wrong.
        message: String,
    },

    /// The bulk list is not a `.csv` file.
    #[error("{path}: must be '.csv'")]
    NotCsv {
        /// Offending list path.
        path: PathBuf,
    },

    /// The bulk list does not start with a `bid` header.
    #[error("{path}: first line must be header")]
    MissingHeader {
        /// Offending list path.
        path: PathBuf,
    },

    /// The bulk list could not be read.
    #[error("{path}: cannot open file: {source}")]
    ReadList {
        /// List path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// A bulk list row could not be used.
    #[error("line {line}: {reason}")]
    BadRow {
        /// 1-based line number.
        line: usize,
        /// What is wrong with it.
        reason: String,
    },

    /// Building or checking a document failed.
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// A fragment could not be placed in its document.
    #[error(transparent)]
    Context(#[from] ContextError),

    /// A fragment carried malformed markup.
    #[error(transparent)]
    Highlight(#[from] HighlightError),

    /// The search request is invalid.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// One or more hits failed during result processing.
    #[error("{}", join_lines(.errors))]
    SearchFailed {
        /// Every failed item, sorted by id.
        errors: Vec<ItemError>,
    },
}

impl IndexError {
    /// Creates an `OpenIndex` error from a path and Tantivy error.
    pub(crate) fn open_index(path: PathBuf, source: &tantivy::TantivyError) -> Self {
        Self::OpenIndex {
            path,
            message: source.to_string(),
        }
    }

    /// Creates a `Write` error from a Tantivy error.
    pub(crate) fn write(source: &tantivy::TantivyError) -> Self {
        Self::Write(source.to_string())
    }

    /// Creates a `Commit` error from a Tantivy error.
    pub(crate) fn commit(source: &tantivy::TantivyError) -> Self {
        Self::Commit(source.to_string())
    }

    /// Creates a `Search` error from a Tantivy error.
    pub(crate) fn search(source: &tantivy::TantivyError) -> Self {
        Self::Search(source.to_string())
    }

    /// Failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Query(_)
            | Self::EmptyPhrase { .. }
            | Self::NotCsv { .. }
            | Self::MissingHeader { .. }
            | Self::BadRow { .. }
            | Self::IndexExists { .. } => ErrorKind::Validation,
            Self::Decode { .. }
            | Self::Encode { .. }
            | Self::IdMismatch { .. }
            | Self::MissingCanvas { .. }
            | Self::Highlight(_) => ErrorKind::Format,
            Self::IndexMissing { .. } | Self::DocumentMissing { .. } => ErrorKind::NotFound,
            Self::UnknownProfile { .. } | Self::Analyzer(_) => ErrorKind::Config,
            Self::Document(err) => match err {
                DocumentError::UnsupportedFormat { .. } => ErrorKind::Config,
                DocumentError::UnknownLevel { .. } => ErrorKind::Validation,
                _ => ErrorKind::Format,
            },
            Self::Context(err) => match err {
                ContextError::NotFound { .. } | ContextError::EmptyFragment { .. } => {
                    ErrorKind::NotFound
                }
                ContextError::Unresolvable { .. } => ErrorKind::Format,
            },
            Self::SearchFailed { errors } => errors
                .first()
                .map_or(ErrorKind::Upstream, |item| item.kind),
            Self::OpenIndex { .. }
            | Self::Write(_)
            | Self::Commit(_)
            | Self::Search(_)
            | Self::Io(_)
            | Self::Client(_)
            | Self::Metadata { .. }
            | Self::Tokenizer { .. }
            | Self::ReadList { .. } => ErrorKind::Upstream,
        }
    }
}

/// Displays item errors one per line.
fn join_lines(errors: &[ItemError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

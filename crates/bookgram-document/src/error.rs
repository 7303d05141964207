//! Error types for document construction and normalization.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors that can occur when building or checking a canonical document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// A source directory produced no page files.
    #[error("no files found under {path}")]
    NoPageFiles {
        /// Directory that was searched.
        path: PathBuf,
    },

    /// The requested page window does not fit the files found in a directory.
    #[error("page range {start}-{end} is outside the {available} files under {path}")]
    PageRange {
        /// Directory the range was applied to.
        path: PathBuf,
        /// Requested 1-based first page.
        start: usize,
        /// Requested 1-based last page (0 for open end).
        end: usize,
        /// Number of page files found.
        available: usize,
    },

    /// Failed to read a page file.
    #[error("failed to read file {path}: {source}")]
    ReadFile {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to walk a source directory.
    #[error("failed to scan {path}: {source}")]
    Scan {
        /// Directory being scanned.
        path: PathBuf,
        /// Underlying walk error.
        source: walkdir::Error,
    },

    /// The page-file pattern failed to compile.
    #[error("invalid glob pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The invalid pattern.
        pattern: String,
        /// Underlying glob error.
        source: globset::Error,
    },

    /// A page file is not valid JSON for its schema.
    #[error("failed to decode {path}: {source}")]
    Decode {
        /// Path to the offending file.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// The ingestion type string names no known OCR format.
    #[error("wrong type: {name}")]
    UnsupportedFormat {
        /// The rejected type string.
        name: String,
    },

    /// The reading level string names no known level.
    #[error("unknown reading level: {name}")]
    UnknownLevel {
        /// The rejected level string.
        name: String,
    },

    /// A structural invariant of the document does not hold.
    #[error("invalid document {id}: {reason}")]
    Invariant {
        /// Identity key of the document.
        id: String,
        /// Which invariant failed.
        reason: String,
    },
}

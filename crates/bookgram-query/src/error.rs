//! Error types for search parameters.

use thiserror::Error;

/// Errors raised while binding or validating search parameters.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// No search words were given.
    #[error("query missing")]
    MissingWords,

    /// A word is too short to form a bigram.
    #[error("query word too short: {word}")]
    ShortWord {
        /// The rejected word.
        word: String,
    },

    /// A reading level value is not a known level.
    #[error("unknown reading level: {value}")]
    UnknownLevel {
        /// The rejected value.
        value: String,
    },

    /// A numeric parameter is not a positive integer.
    #[error("{field} must be a positive integer, got {value}")]
    InvalidNumber {
        /// Parameter name.
        field: &'static str,
        /// The rejected value.
        value: String,
    },

    /// A parameter is not valid percent-encoded UTF-8.
    #[error("cannot decode parameter {value}")]
    Decode {
        /// The raw value.
        value: String,
    },

    /// The requested page lies past the last page.
    #[error("page should be: 1 <= page={page} <= {last}")]
    PageOutOfRange {
        /// Requested page.
        page: usize,
        /// Last valid page.
        last: usize,
    },
}

//! Error types for highlight markup parsing.

use thiserror::Error;

/// Errors raised while stripping match markers from a fragment.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HighlightError {
    /// A marker was opened but its key or word was never closed.
    #[error("unterminated highlight marker at byte {offset}: {fragment}")]
    Unterminated {
        /// Byte offset of the marker opening.
        offset: usize,
        /// The fragment being parsed.
        fragment: String,
    },
}

//! Error types for match location.

use thiserror::Error;

/// Errors raised while placing a fragment inside its document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContextError {
    /// The cleaned fragment does not occur in the document text.
    #[error("partial text not found: id:{id}; sourceid:{bid}; searched:{preview}")]
    NotFound {
        /// Hit id the fragment belongs to.
        id: String,
        /// Book id of the document.
        bid: String,
        /// Opening characters of the document text.
        preview: String,
    },

    /// The fragment is empty after markup removal.
    #[error("empty fragment for {id}")]
    EmptyFragment {
        /// Hit id the fragment belongs to.
        id: String,
    },

    /// The document's break arrays cannot place the match.
    #[error("cannot resolve match in {id}: {reason}")]
    Unresolvable {
        /// Hit id the fragment belongs to.
        id: String,
        /// What was missing.
        reason: String,
    },
}

//! Highlight handling for bookgram search results.
//!
//! The search backend wraps every matched term in an inline marker. This
//! crate strips those markers back out ([`parse`]), tallies what they matched
//! ([`KeywordFilter`]), and renders them for a terminal ([`emphasize`]).

#![warn(missing_docs)]

mod error;
mod filter;
mod markup;
mod terminal;

pub use error::HighlightError;
pub use filter::{DocCounts, KeywordFilter};
pub use markup::{Highlighted, Marker, parse, wrap};
pub use terminal::{Highlighter, colors, dim, emphasize, header, success, warning};

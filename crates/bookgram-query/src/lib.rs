//! Search parameters for bookgram.
//!
//! A [`SearchQuery`] holds the words to find and the facets to filter on.
//! It can be bound from request parameters, checked before a search starts,
//! and reduced to an order-independent cache key:
//!
//! ```
//! use bookgram_query::SearchQuery;
//!
//! let a = SearchQuery::from_query_string("q=月,花&tag=b,a").unwrap();
//! let b = SearchQuery::from_query_string("q=花&q=月&tag=a,b").unwrap();
//! assert_eq!(a.cache_key(), b.cache_key());
//! assert_eq!(a.cache_key(), "q=月+花&tag=a,b");
//! ```

#![warn(missing_docs)]

mod error;
mod page;
mod params;

use bookgram_document::ReadingLevel;
use serde::{Deserialize, Serialize};

pub use error::QueryError;
pub use page::paginate;

/// Default page size when a query gives none.
pub const DEFAULT_PER_PAGE: usize = 20;

/// Words and filters for one search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    /// Words that must all occur, each matched as a phrase.
    pub words: Vec<String>,
    /// Reading levels to keep; empty keeps all.
    pub levels: Vec<ReadingLevel>,
    /// Tags to keep; empty keeps all.
    pub tags: Vec<String>,
    /// Book ids to keep; empty keeps all.
    pub bids: Vec<String>,
    /// Requested page, 1-based.
    pub page: Option<usize>,
    /// Requested page size.
    pub per_page: Option<usize>,
}

impl SearchQuery {
    /// Creates a query for `words` with no filters.
    pub fn new<S: Into<String>>(words: impl IntoIterator<Item = S>) -> Self {
        Self {
            words: words.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Binds `(name, value)` request parameters.
    ///
    /// Recognized names are `q`, `el`, `tag`, `bid` (each also with a `[]`
    /// suffix, values comma-separated), `page` and `perPage`.
    pub fn from_params<'a, I>(params: I) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        params::bind(params)
    }

    /// Binds a raw URL query string.
    pub fn from_query_string(raw: &str) -> Result<Self, QueryError> {
        params::bind_query_string(raw)
    }

    /// Checks the query can be run.
    pub fn validate(&self) -> Result<(), QueryError> {
        if self.words.is_empty() {
            return Err(QueryError::MissingWords);
        }
        if let Some(word) = self.words.iter().find(|w| w.chars().count() < 2) {
            return Err(QueryError::ShortWord { word: word.clone() });
        }
        Ok(())
    }

    /// Canonical key identifying this query's result set.
    ///
    /// Each field is sorted and deduplicated; empty filters are left out.
    /// Paging does not take part.
    pub fn cache_key(&self) -> String {
        let mut key = format!("q={}", canonical(&self.words).join("+"));
        let levels: Vec<&str> = self.levels.iter().map(|l| l.as_str()).collect();
        for (name, values) in [
            ("el", canonical(&levels)),
            ("tag", canonical(&self.tags)),
            ("bid", canonical(&self.bids)),
        ] {
            if !values.is_empty() {
                key.push_str(&format!("&{name}={}", values.join(",")));
            }
        }
        key
    }

    /// Requested page, defaulting to 1.
    pub fn page_or_default(&self) -> usize {
        self.page.unwrap_or(1)
    }

    /// Requested page size, defaulting to `fallback`.
    pub fn per_page_or(&self, fallback: usize) -> usize {
        self.per_page.unwrap_or(fallback)
    }
}

/// Sorted, deduplicated view of a list.
fn canonical<S: AsRef<str>>(values: &[S]) -> Vec<&str> {
    let mut out: Vec<&str> = values.iter().map(AsRef::as_ref).collect();
    out.sort_unstable();
    out.dedup();
    out
}

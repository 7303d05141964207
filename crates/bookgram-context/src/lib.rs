//! Placing search matches inside their source document.
//!
//! A search hit carries fragments of text with the matched words marked up.
//! Once the markup is stripped, [`PartialMatchContext::locate`] finds the
//! fragment in the document and reports which pages, lines, line boxes and
//! page images it spans, along with a key that orders matches by document
//! and position.

#![warn(missing_docs)]

mod error;

use std::cmp::Ordering;

use bookgram_document::{BookText, BoundingBox, char_offset};
use serde::{Deserialize, Serialize};

pub use error::ContextError;

/// Characters of document text shown when a fragment cannot be found.
pub const PREVIEW_CHARS: usize = 48;

/// One located occurrence of a search fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialMatchContext {
    /// Hit id.
    pub id: String,
    /// First and last page, 0-based.
    pub pages: [usize; 2],
    /// First and last line within their pages, 0-based.
    pub lines: [usize; 2],
    /// Fragment with markup removed.
    pub text: String,
    /// Fragment as returned by the search backend, markers included.
    pub highlight: String,
    /// Boxes of every line the match spans.
    pub bbs: Vec<BoundingBox>,
    /// Image id of every line the match spans.
    #[serde(rename = "imageIDs")]
    pub image_ids: Vec<String>,
    /// `{id}_{page:04}_{line:04}`, 1-based, where `line` counts from the
    /// start of the document.
    #[serde(skip)]
    pub key: String,
}

impl PartialMatchContext {
    /// Locates the first occurrence of `cleaned` in `doc`.
    ///
    /// `highlight` is the original marked-up fragment, kept for display.
    pub fn locate(
        id: &str,
        doc: &BookText,
        highlight: &str,
        cleaned: &str,
    ) -> Result<Self, ContextError> {
        let unresolvable = |reason: String| ContextError::Unresolvable {
            id: id.to_string(),
            reason,
        };
        let span = cleaned.chars().count();
        if span == 0 {
            return Err(ContextError::EmptyFragment { id: id.to_string() });
        }
        let byte = doc
            .text
            .find(cleaned)
            .ok_or_else(|| ContextError::NotFound {
                id: id.to_string(),
                bid: doc.metadata.bid.clone(),
                preview: doc.text.chars().take(PREVIEW_CHARS).collect(),
            })?;
        let start = char_offset(&doc.text, byte);
        let end = start + span - 1;

        let layout = doc.layout();
        let place = |offset: usize| {
            Some((
                layout.page_of(offset)?,
                layout.line_of(offset)?,
                layout.line_in_page(offset)?,
            ))
        };
        let (first_page, first_line, first_in_page) =
            place(start).ok_or_else(|| unresolvable(format!("offset {start} precedes page 1")))?;
        let (last_page, last_line, last_in_page) =
            place(end).ok_or_else(|| unresolvable(format!("offset {end} has no line")))?;

        let bbs = doc
            .bbs
            .get(first_line..=last_line)
            .ok_or_else(|| unresolvable(format!("no boxes for lines {first_line}-{last_line}")))?
            .to_vec();

        let mut image_ids = Vec::with_capacity(last_line - first_line + 1);
        let mut page = first_page;
        for line in first_line..=last_line {
            page = layout
                .page_of_line(line, page)
                .ok_or_else(|| unresolvable(format!("line {line} missing")))?;
            let image = doc
                .images
                .get(page)
                .ok_or_else(|| unresolvable(format!("no image for page {page}")))?;
            image_ids.push(image.clone());
        }

        Ok(Self {
            id: id.to_string(),
            pages: [first_page, last_page],
            lines: [first_in_page, last_in_page],
            text: cleaned.to_string(),
            highlight: highlight.to_string(),
            bbs,
            image_ids,
            key: sort_key(id, first_page, first_line),
        })
    }

    /// Orders by key, then by text for matches starting on the same line.
    pub fn cmp_position(&self, other: &Self) -> Ordering {
        self.key
            .cmp(&other.key)
            .then_with(|| self.text.cmp(&other.text))
    }
}

/// Builds the `{id}_{page:04}_{line:04}` ordering key from 0-based indices.
pub fn sort_key(id: &str, page: usize, line: usize) -> String {
    format!("{id}_{:04}_{:04}", page + 1, line + 1)
}

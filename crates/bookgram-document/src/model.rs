//! The canonical book-text representation and its wire shape.

use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnNull, serde_as};

use crate::{DocumentError, Layout, ReadingLevel, position::char_slice};

/// A label/value pair from a bibliographic record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelValue {
    /// Field label.
    pub label: String,
    /// Field value.
    pub value: String,
}

/// Axis-aligned rectangle of one transcribed line on its page image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge.
    pub x: i64,
    /// Top edge.
    pub y: i64,
    /// Width.
    #[serde(rename = "w")]
    pub width: i64,
    /// Height.
    #[serde(rename = "h")]
    pub height: i64,
}

impl BoundingBox {
    /// Builds a box from its top-left and bottom-right corners.
    pub fn from_corners(left: i64, top: i64, right: i64, bottom: i64) -> Self {
        Self {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        }
    }
}

/// Identity and provenance of a book-text unit.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookMetadata {
    /// Book id.
    pub bid: String,
    /// Content id.
    pub cid: String,
    /// Reading accuracy level.
    pub elevel: ReadingLevel,
    /// Free-form tags; the first tag records the OCR format for ingested text.
    #[serde_as(as = "DefaultOnNull")]
    pub tags: Vec<String>,
    /// Structured bibliographic fields.
    #[serde_as(as = "DefaultOnNull")]
    pub metadata: Vec<LabelValue>,
    /// Title.
    pub label: String,
    /// Holding institution.
    pub attribution: String,
    /// License statement or URL.
    pub license: String,
}

/// One indexed unit of text with its page and line structure.
///
/// Offsets in `pbs` and `lbs` count Unicode scalar values, not bytes.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookText {
    /// Identity and bibliographic metadata.
    #[serde_as(as = "DefaultOnNull")]
    pub metadata: BookMetadata,
    /// Full concatenated transcription.
    pub text: String,
    /// Offset where each page begins.
    #[serde_as(as = "DefaultOnNull")]
    pub pbs: Vec<usize>,
    /// Offset where each line begins.
    #[serde_as(as = "DefaultOnNull")]
    pub lbs: Vec<usize>,
    /// One box per line.
    #[serde_as(as = "DefaultOnNull")]
    pub bbs: Vec<BoundingBox>,
    /// One source image id per page.
    #[serde_as(as = "DefaultOnNull")]
    pub images: Vec<String>,
    /// Tokenizer profile used for `mecabed`, empty when untokenized.
    #[serde(rename = "mecabType")]
    pub mecab_type: String,
    /// Token features produced by the tokenizer profile.
    #[serde_as(as = "DefaultOnNull")]
    pub mecabed: Vec<String>,
}

impl BookText {
    /// Returns the identity key `{bid}_{level}_{tags joined by _}`.
    pub fn identity_key(&self) -> String {
        format!(
            "{}_{}_{}",
            self.metadata.bid,
            self.metadata.elevel,
            self.metadata.tags.join("_")
        )
    }

    /// Returns a resolver over this document's break arrays.
    pub fn layout(&self) -> Layout<'_> {
        Layout::new(&self.pbs, &self.lbs)
    }

    /// Number of code points in the text.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Records tokenizer output under its profile name.
    pub fn set_tokens(&mut self, profile: &str, tokens: Vec<String>) {
        self.mecab_type = profile.to_string();
        self.mecabed = tokens;
    }

    /// Returns the tokenizer profile and its tokens, if the text was tokenized.
    pub fn tokens(&self) -> Option<(&str, &[String])> {
        if self.mecab_type.is_empty() {
            None
        } else {
            Some((&self.mecab_type, &self.mecabed))
        }
    }

    /// Returns the text of `line` on `page`, both 1-based.
    ///
    /// A line number past the end of its page continues into the following
    /// pages. Out-of-range coordinates yield an empty string.
    pub fn get_text(&self, page: usize, line: usize) -> &str {
        if page == 0 || line == 0 || page > self.pbs.len() {
            return "";
        }
        let Some(first) = self.layout().first_line_of_page(page - 1) else {
            return "";
        };
        let Some(index) = first.checked_add(line - 1) else {
            return "";
        };
        let Some(&start) = self.lbs.get(index) else {
            return "";
        };
        char_slice(&self.text, start, self.lbs.get(index + 1).copied())
    }

    /// Checks the structural invariants every stored document must satisfy.
    pub fn validate(&self) -> Result<(), DocumentError> {
        let fail = |reason: String| DocumentError::Invariant {
            id: self.identity_key(),
            reason,
        };
        if self.bbs.len() != self.lbs.len() {
            return Err(fail(format!(
                "{} boxes for {} lines",
                self.bbs.len(),
                self.lbs.len()
            )));
        }
        if self.images.len() != self.pbs.len() {
            return Err(fail(format!(
                "{} images for {} pages",
                self.images.len(),
                self.pbs.len()
            )));
        }
        let len = self.char_len();
        for (name, breaks) in [("page", &self.pbs), ("line", &self.lbs)] {
            if let Some(w) = breaks.windows(2).find(|w| w[0] >= w[1]) {
                return Err(fail(format!(
                    "{name} breaks not increasing at {} then {}",
                    w[0], w[1]
                )));
            }
            if let Some(&last) = breaks.last()
                && last >= len
            {
                return Err(fail(format!(
                    "{name} break {last} beyond text length {len}"
                )));
            }
        }
        if let Some(orphan) = self
            .pbs
            .iter()
            .find(|p| self.lbs.binary_search(p).is_err())
        {
            return Err(fail(format!("page break {orphan} is not a line break")));
        }
        Ok(())
    }
}

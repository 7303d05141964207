//! Page-file schemas produced by the supported OCR engines.
//!
//! Every schema decodes to the same thing: a list of pages, each a list of
//! lines carrying text and a bounding box. Individual lines that do not fit
//! the schema are dropped; a file that is not JSON of the expected outer
//! shape is an error.

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::{BoundingBox, DocumentError};

/// One transcribed line, reduced to its text and box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrLine {
    /// Line text.
    pub text: String,
    /// Axis-aligned box around the line.
    pub bbox: BoundingBox,
}

/// Page layout of a single OCR page file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSchema {
    /// Array of pages; each line is an object with a four-corner polygon.
    Structured,
    /// Array of pages; each line is `[x1, y1, x2, y2, text]`.
    Positional,
    /// One page wrapped as `{"contents": [...], "imginfo": {...}}`.
    Detail,
}

/// Line object written by the structured schema.
#[derive(Debug, Deserialize)]
struct StructuredLine {
    /// Corners in order: top-left, top-right, bottom-left, bottom-right.
    #[serde(rename = "boundingBox")]
    bounding_box: [[i64; 2]; 4],
    /// Line text.
    text: String,
}

/// Wrapper written by the detail schema.
#[derive(Debug, Deserialize)]
struct DetailPage {
    /// Lines of the single page, in positional form.
    contents: Vec<Value>,
}

impl PageSchema {
    /// Decodes one page file into pages of lines.
    pub fn decode(self, path: &Path, raw: &[u8]) -> Result<Vec<Vec<OcrLine>>, DocumentError> {
        let decode_err = |source| DocumentError::Decode {
            path: path.to_path_buf(),
            source,
        };
        let pages: Vec<Vec<Value>> = match self {
            Self::Structured | Self::Positional => {
                serde_json::from_slice(raw).map_err(decode_err)?
            }
            Self::Detail => {
                let page: DetailPage = serde_json::from_slice(raw).map_err(decode_err)?;
                vec![page.contents]
            }
        };
        let read_line: fn(Value) -> Option<OcrLine> = match self {
            Self::Structured => structured_line,
            Self::Positional | Self::Detail => positional_line,
        };
        Ok(pages
            .into_iter()
            .map(|lines| lines.into_iter().filter_map(read_line).collect())
            .collect())
    }
}

/// Reads a structured line object, or `None` if it is incomplete.
fn structured_line(value: Value) -> Option<OcrLine> {
    let line: StructuredLine = serde_json::from_value(value).ok()?;
    let [top_left, _, _, bottom_right] = line.bounding_box;
    Some(OcrLine {
        text: line.text,
        bbox: BoundingBox::from_corners(top_left[0], top_left[1], bottom_right[0], bottom_right[1]),
    })
}

/// Reads a `[x1, y1, x2, y2, text]` line, or `None` if it has another shape.
fn positional_line(value: Value) -> Option<OcrLine> {
    let Value::Array(items) = value else {
        return None;
    };
    let [x1, y1, x2, y2, Value::String(text)] = <[Value; 5]>::try_from(items).ok()? else {
        return None;
    };
    // Coordinates may be written as floats; truncate toward zero.
    let coord = |v: &Value| v.as_f64().map(|f| f as i64);
    Some(OcrLine {
        text,
        bbox: BoundingBox::from_corners(coord(&x1)?, coord(&y1)?, coord(&x2)?, coord(&y2)?),
    })
}

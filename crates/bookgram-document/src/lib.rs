//! Canonical book-text model for bookgram.
//!
//! This crate owns the single representation every other part of bookgram
//! works on:
//! - [`BookText`]: the full transcription with parallel page, line, box and
//!   image arrays, addressed by code-point offset
//! - [`Layout`]: offset to page/line resolution over the break arrays
//! - [`ocr`]: normalizers turning OCR engine page files into a [`BookText`]

#![warn(missing_docs)]

mod error;
mod level;
mod model;
pub mod ocr;
mod position;

pub use error::DocumentError;
pub use level::ReadingLevel;
pub use model::{BookMetadata, BookText, BoundingBox, LabelValue};
pub use ocr::{Normalized, OcrFormat, PageOrigin, SourceDescriptor, normalize};
pub use position::{Layout, char_offset};

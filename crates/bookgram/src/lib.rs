//! bookgram: full-text search over OCR transcriptions of pre-modern books.
//!
//! The binary indexes OCR output as character bigrams, so any run of two or
//! more characters can be found, and reports every match with the page, line,
//! bounding boxes and page image it came from.

#![warn(missing_docs)]

pub mod cli;

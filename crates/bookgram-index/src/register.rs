//! Building one stored document from OCR output and its collaborators.

use bookgram_document::{BookText, OcrFormat, ReadingLevel, SourceDescriptor, normalize};
use tracing::debug;

use crate::{IndexError, MetadataSource, MorphTokenizer, tokenizer::check_profile};

/// Everything needed to build one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterRequest {
    /// OCR output format of every source.
    pub format: OcrFormat,
    /// Book id.
    pub bid: String,
    /// Content id.
    pub cid: String,
    /// OCR directories and page windows, in reading order.
    pub sources: Vec<SourceDescriptor>,
    /// Tokenizer profile; `None` skips tokenization.
    pub profile: Option<String>,
}

impl RegisterRequest {
    /// Creates a request with no sources and no tokenizer profile.
    pub fn new(format: OcrFormat, bid: impl Into<String>, cid: impl Into<String>) -> Self {
        Self {
            format,
            bid: bid.into(),
            cid: cid.into(),
            sources: Vec::new(),
            profile: None,
        }
    }
}

/// External services a document build calls out to.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    /// Bibliographic metadata.
    pub metadata: &'a dyn MetadataSource,
    /// Morphological tokenizer.
    pub tokenizer: &'a dyn MorphTokenizer,
}

/// Normalizes, tokenizes and annotates the document `request` describes.
///
/// The profile is checked before any file is read.
pub fn build_book(
    request: &RegisterRequest,
    collaborators: Collaborators<'_>,
) -> Result<BookText, IndexError> {
    let profile = request.profile.as_deref().filter(|p| !p.is_empty());
    if let Some(profile) = profile {
        check_profile(profile)?;
    }
    let normalized = normalize(request.format, &request.sources)?;
    let mut book = normalized.book;
    book.metadata.bid.clone_from(&request.bid);
    book.metadata.cid.clone_from(&request.cid);
    book.metadata.elevel = ReadingLevel::Ocr;
    book.metadata.tags = vec![request.format.as_str().to_string()];

    if let Some(profile) = profile {
        let tokens = collaborators.tokenizer.tokenize(profile, &book.text)?;
        book.set_tokens(profile, tokens);
    }

    let manifest = collaborators.metadata.fetch(&request.bid)?;
    manifest.apply(&mut book, &normalized.origins)?;
    book.validate()?;
    debug!(
        bid = %request.bid,
        pages = book.pbs.len(),
        lines = book.lbs.len(),
        "document built"
    );
    Ok(book)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::test_support::{Canvases, Characters, write_book};

    fn request(dir: &Path) -> RegisterRequest {
        let mut request = RegisterRequest::new(OcrFormat::NdlOcrV2, "200000001", "c1");
        request.sources.push(SourceDescriptor::new(dir, 0, 0));
        request
    }

    fn collaborators(canvases: &Canvases) -> Collaborators<'_> {
        Collaborators {
            metadata: canvases,
            tokenizer: &Characters,
        }
    }

    #[test]
    fn builds_a_complete_document() {
        let dir = tempfile::tempdir().unwrap();
        write_book(dir.path(), &[&["春はあけぼの"], &["夏は夜", "秋は夕暮れ"]]);
        let book = build_book(&request(dir.path()), collaborators(&Canvases(2))).unwrap();
        assert_eq!(book.identity_key(), "200000001_OCR_ndlocrv2");
        assert_eq!(book.metadata.cid, "c1");
        assert_eq!(book.metadata.label, "label 200000001");
        assert_eq!(
            book.images,
            vec!["200000001/0001.tif", "200000001/0002.tif"]
        );
        assert_eq!(book.pbs, vec![0, 6]);
        assert_eq!(book.lbs, vec![0, 6, 9]);
        assert!(book.tokens().is_none());
    }

    #[test]
    fn tokenizes_with_a_profile() {
        let dir = tempfile::tempdir().unwrap();
        write_book(dir.path(), &[&["花"]]);
        let mut request = request(dir.path());
        request.profile = Some("waka".into());
        let book = build_book(&request, collaborators(&Canvases(1))).unwrap();
        assert_eq!(book.tokens(), Some(("waka", &["花".to_string()][..])));
    }

    #[test]
    fn unknown_profile_fails_before_reading() {
        let mut request = request(Path::new("/nonexistent"));
        request.profile = Some("modern".into());
        assert!(matches!(
            build_book(&request, collaborators(&Canvases(1))),
            Err(IndexError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn second_volume_takes_the_following_canvases() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        write_book(first.path(), &[&["上巻一"], &["上巻二"]]);
        write_book(second.path(), &[&["下巻一"], &["下巻二"]]);
        let mut request = request(first.path());
        request.sources.push(SourceDescriptor::new(second.path(), 0, 0));
        let book = build_book(&request, collaborators(&Canvases(4))).unwrap();
        assert_eq!(
            book.images,
            vec![
                "200000001/0001.tif",
                "200000001/0002.tif",
                "200000001/0003.tif",
                "200000001/0004.tif",
            ]
        );
        assert_eq!(book.get_text(3, 1), "下巻一");
    }

    #[test]
    fn too_few_canvases_fail() {
        let dir = tempfile::tempdir().unwrap();
        write_book(dir.path(), &[&["一"], &["二"]]);
        assert!(matches!(
            build_book(&request(dir.path()), collaborators(&Canvases(1))),
            Err(IndexError::MissingCanvas { canvas: 2, .. })
        ));
    }
}

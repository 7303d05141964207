//! Normalizers folding OCR page files into one continuous text stream.
//!
//! A [`SourceDescriptor`] names a directory of per-page JSON files and an
//! inclusive page window. [`normalize`] walks each descriptor in order,
//! appending every line's text to a shared buffer while recording where each
//! page and line begins, in code points.

mod schema;

use std::{
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use globset::{GlobBuilder, GlobMatcher};
use tracing::debug;
use walkdir::WalkDir;

pub use self::schema::{OcrLine, PageSchema};
use crate::{BookText, BoundingBox, DocumentError};

/// Pattern matching page files below a source directory.
pub const PAGE_FILE_GLOB: &str = "**/json/*.json";

/// OCR engine output formats accepted for ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OcrFormat {
    /// First-generation output with object lines.
    NdlOcrV1,
    /// Second-generation output with positional-array lines.
    NdlOcrV2,
    /// Second-generation per-page detail files.
    NdlOcrV2Detail,
    /// Third-generation output; same layout as the second.
    NdlOcrV3,
    /// Third-generation per-page detail files.
    NdlOcrV3Detail,
}

impl OcrFormat {
    /// Every supported format.
    pub const ALL: [Self; 5] = [
        Self::NdlOcrV1,
        Self::NdlOcrV2,
        Self::NdlOcrV2Detail,
        Self::NdlOcrV3,
        Self::NdlOcrV3Detail,
    ];

    /// Returns the ingestion type string for this format.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NdlOcrV1 => "ndlocrv1",
            Self::NdlOcrV2 => "ndlocrv2",
            Self::NdlOcrV2Detail => "ndlocrv2detail",
            Self::NdlOcrV3 => "ndlocrv3",
            Self::NdlOcrV3Detail => "ndlocrv3detail",
        }
    }

    /// Page-file schema used by this format.
    pub fn schema(self) -> PageSchema {
        match self {
            Self::NdlOcrV1 => PageSchema::Structured,
            Self::NdlOcrV2 | Self::NdlOcrV3 => PageSchema::Positional,
            Self::NdlOcrV2Detail | Self::NdlOcrV3Detail => PageSchema::Detail,
        }
    }
}

impl fmt::Display for OcrFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OcrFormat {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == s)
            .ok_or_else(|| DocumentError::UnsupportedFormat {
                name: s.to_string(),
            })
    }
}

/// One OCR output directory and the inclusive 1-based page window to take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDescriptor {
    /// Directory holding `json/` page files.
    pub dir: PathBuf,
    /// First page; 0 or 1 means the first file.
    pub start: usize,
    /// Last page; 0 means the last file.
    pub end: usize,
}

impl SourceDescriptor {
    /// Creates a descriptor for `dir` covering `start..=end`.
    pub fn new(dir: impl Into<PathBuf>, start: usize, end: usize) -> Self {
        Self {
            dir: dir.into(),
            start,
            end,
        }
    }
}

/// Where a kept page came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageOrigin {
    /// Index of the descriptor that produced the page.
    pub source: usize,
    /// 1-based canvas number within the whole book.
    ///
    /// Canvases run on across descriptors: the pages of the second
    /// directory follow every page of the first, kept or not.
    pub canvas: usize,
}

/// Result of normalizing one or more descriptors.
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    /// Document with text, breaks and boxes filled; metadata and images empty.
    pub book: BookText,
    /// Origin of each page, parallel to `book.pbs`.
    pub origins: Vec<PageOrigin>,
}

/// Normalizes the given descriptors, in order, into one document.
pub fn normalize(
    format: OcrFormat,
    sources: &[SourceDescriptor],
) -> Result<Normalized, DocumentError> {
    let schema = format.schema();
    let mut out = TextBuilder::default();
    let mut base = 0;
    for (index, source) in sources.iter().enumerate() {
        let files = page_files(&source.dir)?;
        let (first, window) = select_window(&files, source)?;
        debug!(
            dir = %source.dir.display(),
            format = %format,
            files = window.len(),
            "normalizing"
        );
        let mut canvas = base + first;
        for path in window {
            let raw = fs::read(path).map_err(|e| DocumentError::ReadFile {
                path: path.clone(),
                source: e,
            })?;
            for lines in schema.decode(path, &raw)? {
                out.push_page(
                    PageOrigin {
                        source: index,
                        canvas,
                    },
                    lines,
                );
                canvas += 1;
            }
        }
        // Files outside the window still occupy one canvas each.
        let unread = files.len() - (first - 1 + window.len());
        base = canvas - 1 + unread;
    }
    Ok(out.finish())
}

/// Lists page files under `dir`, sorted by path.
pub fn page_files(dir: &Path) -> Result<Vec<PathBuf>, DocumentError> {
    let matcher = page_file_matcher()?;
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry.map_err(|source| DocumentError::Scan {
            path: dir.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(dir) else {
            continue;
        };
        if matcher.is_match(rel) {
            files.push(entry.into_path());
        }
    }
    if files.is_empty() {
        return Err(DocumentError::NoPageFiles {
            path: dir.to_path_buf(),
        });
    }
    files.sort();
    Ok(files)
}

/// Compiles [`PAGE_FILE_GLOB`].
fn page_file_matcher() -> Result<GlobMatcher, DocumentError> {
    GlobBuilder::new(PAGE_FILE_GLOB)
        .literal_separator(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|source| DocumentError::InvalidPattern {
            pattern: PAGE_FILE_GLOB.to_string(),
            source,
        })
}

/// Applies a descriptor's page window; returns the 1-based first page kept.
fn select_window<'a>(
    files: &'a [PathBuf],
    source: &SourceDescriptor,
) -> Result<(usize, &'a [PathBuf]), DocumentError> {
    let first = source.start.max(1);
    let last = if source.end == 0 {
        files.len()
    } else {
        source.end.min(files.len())
    };
    if first > files.len() || first > last {
        return Err(DocumentError::PageRange {
            path: source.dir.clone(),
            start: source.start,
            end: source.end,
            available: files.len(),
        });
    }
    Ok((first, &files[first - 1..last]))
}

/// Running state while folding pages into one text.
#[derive(Debug, Default)]
struct TextBuilder {
    /// Concatenated text.
    text: String,
    /// Length of `text` in code points.
    pos: usize,
    /// Page breaks.
    pbs: Vec<usize>,
    /// Line breaks.
    lbs: Vec<usize>,
    /// Line boxes.
    bbs: Vec<BoundingBox>,
    /// Page origins.
    origins: Vec<PageOrigin>,
}

impl TextBuilder {
    /// Appends one page; pages with no non-empty line are dropped.
    fn push_page(&mut self, origin: PageOrigin, lines: Vec<OcrLine>) {
        let mut lines = lines.into_iter().filter(|l| !l.text.is_empty()).peekable();
        if lines.peek().is_none() {
            debug!(canvas = origin.canvas, "dropping page without text");
            return;
        }
        self.pbs.push(self.pos);
        self.origins.push(origin);
        for line in lines {
            self.lbs.push(self.pos);
            self.bbs.push(line.bbox);
            self.pos += line.text.chars().count();
            self.text.push_str(&line.text);
        }
    }

    /// Produces the normalized document.
    fn finish(self) -> Normalized {
        Normalized {
            book: BookText {
                text: self.text,
                pbs: self.pbs,
                lbs: self.lbs,
                bbs: self.bbs,
                ..BookText::default()
            },
            origins: self.origins,
        }
    }
}

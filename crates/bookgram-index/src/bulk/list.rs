//! Reading a bulk registration list.
//!
//! The list is a CSV file with the header `bid,cid,iid,vol,start,end` and an
//! optional seventh `mecabType` column. Consecutive rows of one book become
//! one request with one source per row.

use std::{
    fs::File,
    io::{BufRead, BufReader, Lines},
    path::{Path, PathBuf},
};

use bookgram_config::BulkSettings;
use bookgram_document::{OcrFormat, SourceDescriptor};

use crate::{IndexError, RegisterRequest};

/// Columns every row must have.
const REQUIRED_COLUMNS: usize = 6;

/// Column positions.
mod column {
    /// Book id.
    pub(super) const BID: usize = 0;
    /// Content id.
    pub(super) const CID: usize = 1;
    /// OCR output directory name.
    pub(super) const IID: usize = 2;
    /// First page.
    pub(super) const START: usize = 4;
    /// Last page.
    pub(super) const END: usize = 5;
    /// Tokenizer profile.
    pub(super) const PROFILE: usize = 6;
}

/// Where list `iid` values are looked up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListLayout {
    /// Directories searched in order.
    pub source_dirs: Vec<PathBuf>,
    /// Resolve `A-B` as `A/A-B`.
    pub subdir: bool,
}

impl ListLayout {
    /// Layout from bulk configuration.
    pub fn from_settings(settings: &BulkSettings) -> Self {
        Self {
            source_dirs: settings.source_dirs.clone(),
            subdir: settings.subdir,
        }
    }

    /// Directory of `iid`: the first source dir holding it, else under the
    /// first source dir.
    pub fn resolve(&self, iid: &str) -> PathBuf {
        let relative = match iid.split_once('-') {
            Some((prefix, _)) if self.subdir => Path::new(prefix).join(iid),
            _ => PathBuf::from(iid),
        };
        let mut candidates = self.source_dirs.iter().map(|dir| dir.join(&relative));
        let Some(first) = candidates.next() else {
            return relative;
        };
        if first.is_dir() {
            return first;
        }
        candidates.find(|path| path.is_dir()).unwrap_or(first)
    }
}

/// Opens the list at `path` and checks its header.
pub fn open_bulk_list(
    path: &Path,
    layout: ListLayout,
    format: OcrFormat,
) -> Result<BulkList<BufReader<File>>, IndexError> {
    if path.extension().is_none_or(|ext| ext != "csv") {
        return Err(IndexError::NotCsv {
            path: path.to_path_buf(),
        });
    }
    let file = File::open(path).map_err(|source| IndexError::ReadList {
        path: path.to_path_buf(),
        source,
    })?;
    BulkList::new(BufReader::new(file), path, layout, format)
}

/// Registration requests read from a list, one per book.
pub struct BulkList<R> {
    /// Remaining lines.
    lines: Lines<R>,
    /// Line number of the last line read, 1-based.
    line: usize,
    /// Directory lookup.
    layout: ListLayout,
    /// Format of every request.
    format: OcrFormat,
    /// Request still collecting rows.
    pending: Option<RegisterRequest>,
    /// Input exhausted.
    done: bool,
}

impl<R: BufRead> BulkList<R> {
    /// Reads the header from `reader`; `path` names the list in errors.
    pub fn new(
        reader: R,
        path: &Path,
        layout: ListLayout,
        format: OcrFormat,
    ) -> Result<Self, IndexError> {
        let mut lines = reader.lines();
        let header = lines
            .next()
            .transpose()
            .map_err(|source| IndexError::ReadList {
                path: path.to_path_buf(),
                source,
            })?;
        let is_header = header
            .as_deref()
            .and_then(|line| split_row(line).into_iter().next())
            .is_some_and(|first| first == "bid");
        if !is_header {
            return Err(IndexError::MissingHeader {
                path: path.to_path_buf(),
            });
        }
        Ok(Self {
            lines,
            line: 1,
            layout,
            format,
            pending: None,
            done: false,
        })
    }

    /// Reads the next row; `None` at end of input.
    fn next_row(&mut self) -> Option<Result<Row, IndexError>> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => {
                    self.line += 1;
                    return Some(Err(self.bad_row(e.to_string())));
                }
            };
            self.line += 1;
            if line.trim().is_empty() {
                continue;
            }
            return Some(self.parse_row(&line));
        }
    }

    /// Parses one data line.
    fn parse_row(&self, line: &str) -> Result<Row, IndexError> {
        let fields = split_row(line);
        if fields.len() < REQUIRED_COLUMNS {
            return Err(self.bad_row(format!(
                "expected at least {REQUIRED_COLUMNS} columns, found {}",
                fields.len()
            )));
        }
        let page = |at: usize, name: &str| -> Result<usize, IndexError> {
            let value = fields[at];
            if value.is_empty() {
                return Ok(0);
            }
            value
                .parse()
                .map_err(|_| self.bad_row(format!("{name} is not a page number: {value:?}")))
        };
        let start = page(column::START, "start")?;
        let end = page(column::END, "end")?;
        Ok(Row {
            bid: fields[column::BID].to_string(),
            cid: fields[column::CID].to_string(),
            source: SourceDescriptor::new(self.layout.resolve(fields[column::IID]), start, end),
            profile: fields
                .get(column::PROFILE)
                .filter(|p| !p.is_empty())
                .map(ToString::to_string),
        })
    }

    /// Error for the current line.
    fn bad_row(&self, reason: String) -> IndexError {
        IndexError::BadRow {
            line: self.line,
            reason,
        }
    }
}

impl<R: BufRead> Iterator for BulkList<R> {
    type Item = Result<RegisterRequest, IndexError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let row = match self.next_row() {
                Some(Ok(row)) => row,
                Some(Err(e)) => return Some(Err(e)),
                None => {
                    self.done = true;
                    break;
                }
            };
            match &mut self.pending {
                Some(pending) if pending.bid == row.bid => pending.sources.push(row.source),
                slot => {
                    let started = RegisterRequest {
                        format: self.format,
                        bid: row.bid,
                        cid: row.cid,
                        sources: vec![row.source],
                        profile: row.profile,
                    };
                    if let Some(finished) = slot.replace(started) {
                        return Some(Ok(finished));
                    }
                }
            }
        }
        self.pending.take().map(Ok)
    }
}

/// One parsed data row.
struct Row {
    /// Book id.
    bid: String,
    /// Content id.
    cid: String,
    /// Resolved directory and page window.
    source: SourceDescriptor,
    /// Tokenizer profile, if given.
    profile: Option<String>,
}

/// Splits a CSV line into trimmed fields, dropping surrounding quotes.
fn split_row(line: &str) -> Vec<&str> {
    line.split(',')
        .map(|field| {
            let field = field.trim();
            field
                .strip_prefix('"')
                .and_then(|f| f.strip_suffix('"'))
                .unwrap_or(field)
        })
        .collect()
}

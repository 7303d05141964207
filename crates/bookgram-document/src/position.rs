//! Mapping code-point offsets to page and line coordinates.
//!
//! All lookups are binary searches over strictly increasing break arrays:
//! the owner of an offset is the last break at or before it.

/// Read-only view of a document's page and line breaks.
#[derive(Debug, Clone, Copy)]
pub struct Layout<'a> {
    /// Offset where each page begins.
    pages: &'a [usize],
    /// Offset where each line begins.
    lines: &'a [usize],
}

impl<'a> Layout<'a> {
    /// Wraps a pair of break arrays.
    pub fn new(pages: &'a [usize], lines: &'a [usize]) -> Self {
        Self { pages, lines }
    }

    /// Index of the page holding `offset`, or `None` before the first page.
    pub fn page_of(&self, offset: usize) -> Option<usize> {
        owner(self.pages, offset)
    }

    /// Index of the line holding `offset`, or `None` before the first line.
    pub fn line_of(&self, offset: usize) -> Option<usize> {
        owner(self.lines, offset)
    }

    /// Index of the first line on `page`.
    pub fn first_line_of_page(&self, page: usize) -> Option<usize> {
        let start = self.pages.get(page)?;
        self.lines.binary_search(start).ok()
    }

    /// Position of the line holding `offset` within its page, 0-based.
    pub fn line_in_page(&self, offset: usize) -> Option<usize> {
        let line = self.line_of(offset)?;
        let first = self.first_line_of_page(self.page_of(offset)?)?;
        line.checked_sub(first)
    }

    /// Page that owns `line`, walking forward from `from_page`.
    ///
    /// The walk advances past every page whose first line is at or before
    /// `line`, so consecutive calls along a match stay linear.
    pub fn page_of_line(&self, line: usize, from_page: usize) -> Option<usize> {
        let offset = *self.lines.get(line)?;
        let mut page = from_page;
        while self.pages.get(page + 1).is_some_and(|&next| next <= offset) {
            page += 1;
        }
        Some(page)
    }
}

/// Last index whose break is at or before `offset`.
fn owner(breaks: &[usize], offset: usize) -> Option<usize> {
    breaks.partition_point(|&b| b <= offset).checked_sub(1)
}

/// Slices `text` by code-point offsets; `end` of `None` runs to the end.
pub(crate) fn char_slice(text: &str, start: usize, end: Option<usize>) -> &str {
    let byte_at = |n: usize| {
        text.char_indices()
            .nth(n)
            .map_or(text.len(), |(byte, _)| byte)
    };
    let from = byte_at(start);
    let to = end.map_or(text.len(), byte_at).max(from);
    &text[from..to]
}

/// Converts a byte index on a char boundary into a code-point offset.
pub fn char_offset(text: &str, byte: usize) -> usize {
    text.get(..byte).map_or(0, |prefix| prefix.chars().count())
}

//! Inline match markers of the form `<em class="hlt{KEY}">{WORD}</em>`.
//!
//! [`parse`] makes one left-to-right pass: text between markers is copied
//! verbatim, each marker is replaced by its word, and every marker is
//! reported as a [`Marker`] event in order of appearance.

use crate::HighlightError;

/// Opening literal of a marker, up to the key.
const MARKER_OPEN: &str = "<em class=\"hlt";
/// Literal ending the key.
const KEY_CLOSE: &str = "\">";
/// Closing tag of a marker.
const MARKER_CLOSE: &str = "</em>";

/// One highlighted word and the key of the term it matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker<'a> {
    /// Opaque per-fragment term key.
    pub key: &'a str,
    /// Matched text.
    pub word: &'a str,
}

/// A fragment with markers removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Highlighted<'a> {
    /// Plain text with each marker replaced by its word.
    pub text: String,
    /// Markers in order of appearance.
    pub markers: Vec<Marker<'a>>,
}

/// A run of a fragment: either plain text or one marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Text outside any marker.
    Plain(&'a str),
    /// A complete marker.
    Marked(Marker<'a>),
}

/// Splits a fragment into segments, left to right.
///
/// An unterminated marker yields one error and ends the iteration; the
/// plain text before it is still yielded first.
pub struct Segments<'a> {
    /// Whole fragment, for error offsets.
    fragment: &'a str,
    /// Unscanned tail.
    rest: &'a str,
    /// Item to yield after the plain text preceding it.
    pending: Option<Result<Segment<'a>, HighlightError>>,
}

impl<'a> Segments<'a> {
    /// Starts scanning `fragment`.
    pub fn new(fragment: &'a str) -> Self {
        Self {
            fragment,
            rest: fragment,
            pending: None,
        }
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = Result<Segment<'a>, HighlightError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(pending) = self.pending.take() {
            return Some(pending);
        }
        let rest = self.rest;
        if rest.is_empty() {
            return None;
        }
        let Some(open) = rest.find(MARKER_OPEN) else {
            self.rest = "";
            return Some(Ok(Segment::Plain(rest)));
        };
        let plain = &rest[..open];
        let marker = rest[open + MARKER_OPEN.len()..]
            .split_once(KEY_CLOSE)
            .and_then(|(key, after_key)| {
                let (word, after_word) = after_key.split_once(MARKER_CLOSE)?;
                Some((Marker { key, word }, after_word))
            });
        let next = match marker {
            Some((marker, after)) => {
                self.rest = after;
                Ok(Segment::Marked(marker))
            }
            None => {
                let offset = self.fragment.len() - rest.len() + open;
                self.rest = "";
                Err(HighlightError::Unterminated {
                    offset,
                    fragment: self.fragment.to_string(),
                })
            }
        };
        if plain.is_empty() {
            Some(next)
        } else {
            self.pending = Some(next);
            Some(Ok(Segment::Plain(plain)))
        }
    }
}

/// Strips markers from `fragment`.
///
/// A marker whose key or word is never closed fails the whole fragment.
pub fn parse(fragment: &str) -> Result<Highlighted<'_>, HighlightError> {
    let mut out = Highlighted {
        text: String::with_capacity(fragment.len()),
        markers: Vec::new(),
    };
    for segment in Segments::new(fragment) {
        match segment? {
            Segment::Plain(text) => out.text.push_str(text),
            Segment::Marked(marker) => {
                out.text.push_str(marker.word);
                out.markers.push(marker);
            }
        }
    }
    Ok(out)
}

/// Wraps `word` in a marker carrying `key`.
pub fn wrap(key: &str, word: &str) -> String {
    format!("{MARKER_OPEN}{key}{KEY_CLOSE}{word}{MARKER_CLOSE}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_single_marker() {
        let out = parse("abc<em class=\"hlt1\">def</em>ghi").unwrap();
        assert_eq!(out.text, "abcdefghi");
        assert_eq!(
            out.markers,
            vec![Marker {
                key: "1",
                word: "def"
            }]
        );
    }

    #[test]
    fn keeps_marker_order_and_keys() {
        let fragment = format!("{}と{}の{}", wrap("1", "花"), wrap("2", "月"), wrap("1", "花"));
        let out = parse(&fragment).unwrap();
        assert_eq!(out.text, "花と月の花");
        let keys: Vec<_> = out.markers.iter().map(|m| (m.key, m.word)).collect();
        assert_eq!(keys, vec![("1", "花"), ("2", "月"), ("1", "花")]);
    }

    #[test]
    fn plain_text_is_unchanged() {
        let out = parse("ただの文").unwrap();
        assert_eq!(out.text, "ただの文");
        assert!(out.markers.is_empty());
    }

    #[test]
    fn parsing_is_idempotent() {
        let once = parse("前<em class=\"hlt3\">中</em>後").unwrap();
        let twice = parse(&once.text).unwrap();
        assert_eq!(twice.text, once.text);
        assert!(twice.markers.is_empty());
    }

    #[test]
    fn adjacent_markers() {
        let joined = format!("{}{}", wrap("1", "春"), wrap("2", "雨"));
        let out = parse(&joined).unwrap();
        assert_eq!(out.text, "春雨");
        assert_eq!(out.markers.len(), 2);
    }

    #[test]
    fn unterminated_word_fails_closed() {
        let err = parse("ab<em class=\"hlt1\">cd").unwrap_err();
        assert_eq!(
            err,
            HighlightError::Unterminated {
                offset: 2,
                fragment: "ab<em class=\"hlt1\">cd".into()
            }
        );
    }

    #[test]
    fn unterminated_key_fails_closed() {
        assert!(parse("x<em class=\"hlt1").is_err());
    }

    #[test]
    fn segments_keep_text_before_a_broken_marker() {
        let fragment = "前<em class=\"hlt1\">中</em>後<em class=\"hlt2\">";
        let segments: Vec<_> = Segments::new(fragment).collect();
        assert_eq!(segments.len(), 4);
        assert_eq!(segments[0], Ok(Segment::Plain("前")));
        assert_eq!(
            segments[1],
            Ok(Segment::Marked(Marker {
                key: "1",
                word: "中"
            }))
        );
        assert_eq!(segments[2], Ok(Segment::Plain("後")));
        assert!(matches!(
            segments[3],
            Err(HighlightError::Unterminated { offset, .. }) if offset == "前<em class=\"hlt1\">中</em>後".len()
        ));
    }
}

//! Highlighted fragments cut from a document's text.
//!
//! Every occurrence of a query word is wrapped in a marker keyed by the
//! word's 1-based position in the query. Fragments are about
//! `fragment_size` code points, centered on their first occurrence, grown to
//! cover any occurrence that starts inside them, and never overlap.

use std::{cmp::Reverse, iter};

use bookgram_highlight::wrap;

use crate::HighlightSpec;

/// One occurrence of a query word, in code points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Occurrence {
    /// First code point.
    start: usize,
    /// One past the last code point.
    end: usize,
    /// 1-based query word index.
    key: usize,
}

/// Cuts highlighted fragments for `words` out of `text`, in text order.
pub fn fragments(text: &str, words: &[String], spec: &HighlightSpec) -> Vec<String> {
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(byte, _)| byte)
        .chain(iter::once(text.len()))
        .collect();
    let char_len = bounds.len() - 1;
    let found = occurrences(text, words, &bounds);

    let mut out = Vec::new();
    let mut floor = 0;
    let mut i = 0;
    while i < found.len() && out.len() < spec.max_fragments {
        let first = found[i];
        let pad = spec.fragment_size.saturating_sub(first.end - first.start) / 2;
        let start = first.start.saturating_sub(pad).max(floor);
        let mut end = (start + spec.fragment_size).min(char_len).max(first.end);
        let mut j = i + 1;
        while j < found.len() && found[j].start < end {
            end = end.max(found[j].end);
            j += 1;
        }
        out.push(render(text, &bounds, start, end, &found[i..j]));
        floor = end;
        i = j;
    }
    out
}

/// Non-overlapping occurrences of every word, by start.
///
/// Where two occurrences overlap the earlier one wins, and the longer one
/// when both start at the same place.
fn occurrences(text: &str, words: &[String], bounds: &[usize]) -> Vec<Occurrence> {
    let to_char = |byte: usize| bounds.binary_search(&byte).unwrap_or_else(|at| at);
    let mut all: Vec<Occurrence> = words
        .iter()
        .enumerate()
        .filter(|(_, word)| !word.is_empty())
        .flat_map(|(index, word)| {
            let span = word.chars().count();
            text.match_indices(word.as_str()).map(move |(byte, _)| (index, byte, span))
        })
        .map(|(index, byte, span)| {
            let start = to_char(byte);
            Occurrence {
                start,
                end: start + span,
                key: index + 1,
            }
        })
        .collect();
    all.sort_by_key(|o| (o.start, Reverse(o.end)));

    let mut kept: Vec<Occurrence> = Vec::with_capacity(all.len());
    for occurrence in all {
        if kept.last().is_none_or(|last| occurrence.start >= last.end) {
            kept.push(occurrence);
        }
    }
    kept
}

/// Renders code points `start..end` with `marked` wrapped.
fn render(text: &str, bounds: &[usize], start: usize, end: usize, marked: &[Occurrence]) -> String {
    let mut out = String::with_capacity(bounds[end] - bounds[start] + marked.len() * 24);
    let mut at = start;
    for occurrence in marked {
        out.push_str(&text[bounds[at]..bounds[occurrence.start]]);
        out.push_str(&wrap(
            &occurrence.key.to_string(),
            &text[bounds[occurrence.start]..bounds[occurrence.end]],
        ));
        at = occurrence.end;
    }
    out.push_str(&text[bounds[at]..bounds[end]]);
    out
}

#[cfg(test)]
mod tests {
    use bookgram_highlight::parse;

    use super::*;

    fn spec(fragment_size: usize) -> HighlightSpec {
        HighlightSpec {
            fragment_size,
            max_fragments: 100,
        }
    }

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn centers_fragment_on_match() {
        let text = "あいうえおかきくけこさしすせそ";
        let out = fragments(text, &words(&["かき"]), &spec(6));
        assert_eq!(out, vec![format!("えお{}くけ", wrap("1", "かき"))]);
    }

    #[test]
    fn nearby_matches_share_a_fragment() {
        let text = "春はあけぼの夏は夜秋は夕暮れ";
        let out = fragments(text, &words(&["春は", "夏は"]), &spec(10));
        assert_eq!(out.len(), 1);
        assert_eq!(
            out[0],
            format!("{}あけぼの{}夜秋", wrap("1", "春は"), wrap("2", "夏は"))
        );
    }

    #[test]
    fn distant_matches_get_separate_fragments() {
        let text = format!("月{}月", "。".repeat(40));
        let out = fragments(&text, &words(&["月。"]), &spec(4));
        assert_eq!(out.len(), 1);
        let out = fragments(&text, &words(&["月"]), &spec(4));
        assert_eq!(out.len(), 2);
        assert!(out[0].starts_with(&wrap("1", "月")));
        assert!(out[1].ends_with(&wrap("1", "月")));
    }

    #[test]
    fn fragments_are_substrings_once_cleaned() {
        let text = "いろはにほへとちりぬるをわかよたれそつねならむ";
        let out = fragments(text, &words(&["ほへ", "よた", "なら"]), &spec(5));
        assert!(!out.is_empty());
        for fragment in &out {
            let cleaned = parse(fragment).unwrap().text;
            assert!(text.contains(&cleaned), "{cleaned} not in text");
        }
    }

    #[test]
    fn overlapping_occurrences_keep_the_first() {
        let out = fragments("ああああ", &words(&["ああ"]), &spec(10));
        assert_eq!(out, vec![format!("{}{}", wrap("1", "ああ"), wrap("1", "ああ"))]);
    }

    #[test]
    fn respects_max_fragments() {
        let text = format!("雪{}雪{}雪", "。".repeat(30), "。".repeat(30));
        let limited = HighlightSpec {
            fragment_size: 3,
            max_fragments: 2,
        };
        assert_eq!(fragments(&text, &words(&["雪"]), &limited).len(), 2);
    }

    #[test]
    fn no_match_no_fragment() {
        assert!(fragments("なにもない", &words(&["ある"]), &spec(10)).is_empty());
    }
}

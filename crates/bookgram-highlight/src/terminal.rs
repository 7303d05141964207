//! Styled terminal output.

use syntect::{
    easy::HighlightLines,
    highlighting::Style,
    parsing::SyntaxSet,
    util::{LinesWithEndings, as_24_bit_terminal_escaped},
};
use two_face::{
    syntax::extra_newlines as extra_syntaxes,
    theme::{EmbeddedLazyThemeSet, EmbeddedThemeName, extra as extra_themes},
};

use crate::{
    HighlightError,
    markup::{Segment, Segments},
};

/// Syntax highlighter for configuration documents.
pub struct Highlighter {
    /// Language definitions.
    syntax_set: SyntaxSet,
    /// Color themes.
    theme_set: EmbeddedLazyThemeSet,
    /// Active theme.
    theme: EmbeddedThemeName,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter {
    /// Creates a highlighter using the Dracula theme.
    pub fn new() -> Self {
        Self {
            syntax_set: extra_syntaxes(),
            theme_set: extra_themes(),
            theme: EmbeddedThemeName::Dracula,
        }
    }

    /// Highlights TOML.
    pub fn highlight_toml(&self, content: &str) -> String {
        self.highlight(content, "toml")
    }

    /// Highlights `content` as `syntax_name`, falling back to plain text.
    pub fn highlight(&self, content: &str, syntax_name: &str) -> String {
        let syntax = self
            .syntax_set
            .find_syntax_by_extension(syntax_name)
            .or_else(|| self.syntax_set.find_syntax_by_name(syntax_name))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());
        let mut lines = HighlightLines::new(syntax, self.theme_set.get(self.theme));

        let mut output = String::new();
        for line in LinesWithEndings::from(content) {
            let ranges: Vec<(Style, &str)> = lines
                .highlight_line(line, &self.syntax_set)
                .unwrap_or_else(|_| vec![(Style::default(), line)]);
            output.push_str(&as_24_bit_terminal_escaped(&ranges[..], false));
        }
        output.push_str(colors::RESET);
        output
    }
}

/// ANSI escape codes.
pub mod colors {
    /// Bold.
    pub const BOLD: &str = "\x1b[1m";
    /// Cyan.
    pub const CYAN: &str = "\x1b[36m";
    /// Green.
    pub const GREEN: &str = "\x1b[32m";
    /// Yellow.
    pub const YELLOW: &str = "\x1b[33m";
    /// Dim.
    pub const DIM: &str = "\x1b[2m";
    /// Reset all formatting.
    pub const RESET: &str = "\x1b[0m";
}

/// Bold cyan heading.
pub fn header(text: &str) -> String {
    format!("{}{}{}{}", colors::BOLD, colors::CYAN, text, colors::RESET)
}

/// Dimmed text.
pub fn dim(text: &str) -> String {
    format!("{}{}{}", colors::DIM, text, colors::RESET)
}

/// Green text.
pub fn success(text: &str) -> String {
    format!("{}{}{}", colors::GREEN, text, colors::RESET)
}

/// Yellow text.
pub fn warning(text: &str) -> String {
    format!("{}{}{}", colors::YELLOW, text, colors::RESET)
}

/// Renders match markers in `fragment` as bold yellow words.
///
/// Anything from an unterminated marker on is printed as-is.
pub fn emphasize(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len());
    for segment in Segments::new(fragment) {
        match segment {
            Ok(Segment::Plain(text)) => out.push_str(text),
            Ok(Segment::Marked(marker)) => {
                out.push_str(colors::BOLD);
                out.push_str(colors::YELLOW);
                out.push_str(marker.word);
                out.push_str(colors::RESET);
            }
            Err(HighlightError::Unterminated { offset, .. }) => {
                out.push_str(&fragment[offset..]);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wrap;

    #[test]
    fn highlights_toml_with_escapes() {
        let out = Highlighter::new().highlight_toml("[store]\nindex = \"books\"\n");
        assert!(out.contains("\x1b["));
        assert!(out.ends_with(colors::RESET));
    }

    #[test]
    fn emphasize_replaces_markers() {
        let out = emphasize(&format!("春{}秋", wrap("1", "夏")));
        assert_eq!(
            out,
            format!("春{}{}夏{}秋", colors::BOLD, colors::YELLOW, colors::RESET)
        );
    }

    #[test]
    fn emphasize_keeps_broken_markup() {
        let broken = "a<em class=\"hlt1\">b";
        assert_eq!(emphasize(broken), broken);
    }

    #[test]
    fn emphasize_styles_markers_before_broken_markup() {
        let fragment = format!("{}と<em class=\"hlt2\">雨", wrap("1", "風"));
        assert_eq!(
            emphasize(&fragment),
            format!(
                "{}{}風{}と<em class=\"hlt2\">雨",
                colors::BOLD,
                colors::YELLOW,
                colors::RESET
            )
        );
    }

    #[test]
    fn header_is_bold_cyan() {
        let h = header("Matches");
        assert!(h.starts_with(colors::BOLD));
        assert!(h.contains(colors::CYAN));
        assert!(h.contains("Matches"));
    }
}

//! Rendering and JSON serialization for CLI output.

use std::process::ExitCode;

pub use bookgram_highlight::{dim, header, success, warning};
use bookgram_context::PartialMatchContext;
use bookgram_highlight::emphasize;
use bookgram_index::{BulkReport, RecordCount, SearchPage};
use comfy_table::{Cell, CellAlignment, Table, presets::UTF8_FULL_CONDENSED};
use serde::Serialize;

/// Prints `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to serialize JSON: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Prints one page of search results.
pub fn print_search_page(page: &SearchPage) {
    if page.total == 0 {
        println!("{}", dim("No matches found."));
        return;
    }
    for found in &page.matches {
        print!("{}", format_match(found));
        println!();
    }
    let pages = page.total.div_ceil(page.per_page.max(1));
    println!(
        "{}",
        dim(&format!(
            "─── {} matches in {} books, page {} of {} ───",
            page.total,
            page.bibl.len(),
            page.page,
            pages
        ))
    );
}

/// One match: its location heading, image ids and the emphasized fragment.
pub fn format_match(found: &PartialMatchContext) -> String {
    let [first_page, last_page] = found.pages;
    let [first_line, last_line] = found.lines;
    let span = if first_page == last_page && first_line == last_line {
        format!("p.{} l.{}", first_page + 1, first_line + 1)
    } else {
        format!(
            "p.{} l.{} - p.{} l.{}",
            first_page + 1,
            first_line + 1,
            last_page + 1,
            last_line + 1
        )
    };
    let mut out = format!("{} {}\n", header(&found.id), dim(&span));
    let mut images = found.image_ids.clone();
    images.dedup();
    for image in images {
        out.push_str(&format!("  {}\n", dim(&image)));
    }
    out.push_str(&format!("  {}\n", emphasize(&found.highlight)));
    out
}

/// Prints a bulk report: messages on stdout, failures on stderr.
pub fn print_report(report: &BulkReport) {
    for message in &report.message {
        println!("{}", success(message));
    }
    for error in &report.error {
        eprintln!("{}", warning(error));
    }
}

/// Table of document counts per reading level.
pub fn count_table(count: &RecordCount) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Level", "Documents"]);
    for (level, n) in &count.record_count {
        table.add_row(vec![
            Cell::new(level),
            Cell::new(n.to_string()).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn located(pages: [usize; 2], lines: [usize; 2]) -> PartialMatchContext {
        PartialMatchContext {
            id: "100000001_OCR_ndlocrv2".into(),
            pages,
            lines,
            text: "月日は百代".into(),
            highlight: "月日は百代".into(),
            bbs: Vec::new(),
            image_ids: vec!["a/0002.tif".into(), "a/0002.tif".into()],
            key: String::new(),
        }
    }

    #[test]
    fn single_line_match_names_one_position() {
        let out = format_match(&located([1, 1], [0, 0]));
        assert!(out.contains("p.2 l.1"));
        assert!(!out.contains(" - "));
        assert_eq!(out.matches("a/0002.tif").count(), 1);
    }

    #[test]
    fn spanning_match_names_both_ends() {
        let out = format_match(&located([1, 2], [3, 0]));
        assert!(out.contains("p.2 l.4 - p.3 l.1"));
    }

    #[test]
    fn count_table_lists_levels() {
        let count = RecordCount {
            record_count: BTreeMap::from([("OCR".to_string(), 3), ("PROOF_READ".to_string(), 0)]),
        };
        let rendered = count_table(&count).to_string();
        assert!(rendered.contains("OCR"));
        assert!(rendered.contains("PROOF_READ"));
        assert!(rendered.contains('3'));
    }
}

//! Bulk registration: list rows in, stored documents out.
//!
//! The run has two stages joined by bounded queues. Stage one is a pool of
//! workers building documents from requests; stage two is a single routine
//! handing finished documents to the store's bulk submit. A failing request
//! is reported and skipped, never stopping its siblings.

mod list;

use std::{
    sync::mpsc::{Receiver, sync_channel},
    thread,
    time::{Duration, Instant},
};

use bookgram_config::BulkSettings;
use bookgram_document::BookText;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{info, warn};

pub use self::list::{BulkList, ListLayout, open_bulk_list};
use crate::{
    BulkOptions, BulkStats, Collaborators, DocumentStore, IndexError, RegisterRequest,
    register::build_book,
};

/// Messages and errors collected during a bulk run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkReport {
    /// Progress and summary lines.
    pub message: Vec<String>,
    /// One line per failure.
    pub error: Vec<String>,
}

/// Sizing of a bulk run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkRun {
    /// Document-building workers.
    pub workers: usize,
    /// Capacity of the queue into the submit stage.
    pub queue: usize,
    /// Submit flush triggers.
    pub options: BulkOptions,
}

impl From<&BulkSettings> for BulkRun {
    fn from(settings: &BulkSettings) -> Self {
        Self {
            workers: settings.workers.max(1),
            queue: settings.queue,
            options: BulkOptions::from(settings),
        }
    }
}

impl Default for BulkRun {
    fn default() -> Self {
        Self::from(&BulkSettings::default())
    }
}

/// Builds and stores every request, returning what happened.
///
/// Returns once every request has been built or failed and the submit
/// stage has finished.
pub fn run_bulk<I>(
    requests: I,
    store: &dyn DocumentStore,
    index: &str,
    collaborators: Collaborators<'_>,
    run: &BulkRun,
) -> BulkReport
where
    I: Iterator<Item = Result<RegisterRequest, IndexError>>,
{
    let report = Mutex::new(BulkReport::default());
    let workers = run.workers.max(1);
    info!(index, workers, queue = run.queue, "bulk registration started");

    let (request_tx, request_rx) = sync_channel::<RegisterRequest>(workers);
    let (book_tx, book_rx) = sync_channel::<BookText>(run.queue);
    let request_rx = Mutex::new(request_rx);

    thread::scope(|scope| {
        for _ in 0..workers {
            let book_tx = book_tx.clone();
            let request_rx = &request_rx;
            let report = &report;
            scope.spawn(move || {
                loop {
                    let Ok(request) = request_rx.lock().recv() else {
                        break;
                    };
                    match build_book(&request, collaborators) {
                        Ok(book) => {
                            if book_tx.send(book).is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!(bid = %request.bid, error = %e, "document skipped");
                            report.lock().error.push(format!("new {}: {e}", request.bid));
                        }
                    }
                }
            });
        }
        drop(book_tx);

        let report = &report;
        scope.spawn(move || submit(store, index, &book_rx, &run.options, report));

        for request in requests {
            match request {
                Ok(request) => {
                    if request_tx.send(request).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "list row skipped");
                    report.lock().error.push(e.to_string());
                }
            }
        }
        drop(request_tx);
    });

    let report = report.into_inner();
    info!(
        index,
        errors = report.error.len(),
        "bulk registration finished"
    );
    report
}

/// Second stage: submits documents until every builder has finished.
fn submit(
    store: &dyn DocumentStore,
    index: &str,
    books: &Receiver<BookText>,
    options: &BulkOptions,
    report: &Mutex<BulkReport>,
) {
    let started = Instant::now();
    let mut docs = books.iter().map(|book| (book.identity_key(), book));
    match store.bulk_submit(index, &mut docs, options) {
        Ok(stats) => {
            let summary = summarize(&stats, started.elapsed());
            let mut report = report.lock();
            report
                .error
                .extend(stats.errors.iter().map(|e| format!("ERROR: {e}")));
            report.message.push(summary);
        }
        Err(e) => {
            report.lock().error.push(format!("bulk submit: {e}"));
            // Keep builders from blocking on a full queue.
            books.iter().for_each(drop);
        }
    }
}

/// Summary line for a finished submit.
fn summarize(stats: &BulkStats, elapsed: Duration) -> String {
    let elapsed = Duration::from_millis(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX));
    let millis = elapsed.as_millis().max(1);
    let rate = u64::try_from(u128::from(stats.flushed) * 1000 / millis).unwrap_or(u64::MAX);
    if stats.failed > 0 {
        format!(
            "Indexed [{}] documents with [{}] errors in {elapsed:?} ({} docs/sec)",
            with_commas(stats.flushed),
            with_commas(stats.failed),
            with_commas(rate)
        )
    } else {
        format!(
            "Successfully indexed [{}] documents in {elapsed:?} ({} docs/sec)",
            with_commas(stats.flushed),
            with_commas(rate)
        )
    }
}

/// Formats `n` with comma thousands separators.
fn with_commas(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(digit);
    }
    out
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use bookgram_document::{OcrFormat, ReadingLevel, SourceDescriptor};

    use super::*;
    use crate::{
        IndexSettings, TantivyStore,
        test_support::{Canvases, Characters, write_book},
    };

    fn request(bid: &str, dir: &Path) -> RegisterRequest {
        let mut request = RegisterRequest::new(OcrFormat::NdlOcrV2, bid, "c");
        request.sources.push(SourceDescriptor::new(dir, 0, 0));
        request
    }

    #[test]
    fn commas_group_thousands() {
        assert_eq!(with_commas(0), "0");
        assert_eq!(with_commas(999), "999");
        assert_eq!(with_commas(1000), "1,000");
        assert_eq!(with_commas(1_234_567), "1,234,567");
    }

    #[test]
    fn summary_reports_failures() {
        let stats = BulkStats {
            flushed: 1200,
            failed: 3,
            errors: Vec::new(),
        };
        assert_eq!(
            summarize(&stats, Duration::from_millis(2000)),
            "Indexed [1,200] documents with [3] errors in 2s (600 docs/sec)"
        );
        let clean = BulkStats {
            flushed: 5,
            ..Default::default()
        };
        assert_eq!(
            summarize(&clean, Duration::from_micros(1_500_900)),
            "Successfully indexed [5] documents in 1.5s (3 docs/sec)"
        );
    }

    #[test]
    fn stores_good_requests_and_reports_bad_ones() {
        let ocr = tempfile::tempdir().unwrap();
        let index_root = tempfile::tempdir().unwrap();
        for bid in ["100", "200", "300"] {
            write_book(&ocr.path().join(bid), &[&["月日は百代の過客"], &["行きかふ年も又旅人"]]);
        }
        let store = TantivyStore::new(index_root.path());
        store.create("books", &IndexSettings::default()).unwrap();

        let requests = vec![
            Ok(request("100", &ocr.path().join("100"))),
            Ok(request("200", &ocr.path().join("200"))),
            Ok(request("404", &PathBuf::from("/nonexistent/404"))),
            Err(IndexError::BadRow {
                line: 5,
                reason: "broken".into(),
            }),
            Ok(request("300", &ocr.path().join("300"))),
        ];
        let collaborators = Collaborators {
            metadata: &Canvases(2),
            tokenizer: &Characters,
        };
        let run = BulkRun {
            workers: 2,
            queue: 1,
            options: BulkOptions::default(),
        };
        let report = run_bulk(requests.into_iter(), &store, "books", collaborators, &run);

        assert_eq!(report.error.len(), 2, "{:?}", report.error);
        assert!(report.error.iter().any(|e| e.starts_with("new 404: ")));
        assert!(report.error.contains(&"line 5: broken".to_string()));
        assert_eq!(report.message.len(), 1);
        assert!(
            report.message[0].starts_with("Successfully indexed [3] documents in "),
            "{}",
            report.message[0]
        );
        let counts = store.count_by_level("books").unwrap();
        assert_eq!(counts[&ReadingLevel::Ocr], 3);
        let stored = store.get("books", "200_OCR_ndlocrv2").unwrap();
        assert_eq!(stored.images, vec!["200/0001.tif", "200/0002.tif"]);
    }

    #[test]
    fn missing_index_is_reported_without_hanging() {
        let ocr = tempfile::tempdir().unwrap();
        let index_root = tempfile::tempdir().unwrap();
        for bid in ["1", "2", "3", "4"] {
            write_book(&ocr.path().join(bid), &[&["古池や"]]);
        }
        let store = TantivyStore::new(index_root.path());
        let requests = ["1", "2", "3", "4"]
            .into_iter()
            .map(|bid| Ok(request(bid, &ocr.path().join(bid))));
        let collaborators = Collaborators {
            metadata: &Canvases(1),
            tokenizer: &Characters,
        };
        let run = BulkRun {
            workers: 1,
            queue: 0,
            options: BulkOptions::default(),
        };
        let report = run_bulk(requests, &store, "missing", collaborators, &run);
        assert!(report.message.is_empty());
        assert_eq!(report.error, vec!["bulk submit: index not found: missing"]);
    }
}

//! Turning store hits into located matches.
//!
//! Stage one decodes each hit's stored document, records its bibliography
//! and fans its highlighted fragments out to stage two. Stage two strips the
//! markup, counts keywords and locates each fragment in its document. Any
//! failed item fails the whole search.

use std::{
    collections::{BTreeMap, btree_map::Entry},
    sync::{
        Arc,
        mpsc::{Receiver, SyncSender, sync_channel},
    },
    thread,
};

use bookgram_context::PartialMatchContext;
use bookgram_document::{BookMetadata, BookText, LabelValue};
use bookgram_highlight::{KeywordFilter, parse};
use parking_lot::Mutex;
use tracing::debug;

use crate::{Hit, IndexError, ItemError};

/// Capacity of the queue of fragments waiting to be located.
const FRAGMENT_QUEUE: usize = 256;

/// Everything a search produced, before paging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOutcome {
    /// Keyword occurrence counts.
    pub keyword: KeywordFilter,
    /// Number of matched documents per tag.
    pub tags: Vec<LabelValue>,
    /// Bibliographic metadata per hit id.
    pub bibl: BTreeMap<String, BookMetadata>,
    /// Located matches in position order.
    pub matches: Vec<PartialMatchContext>,
}

/// One fragment waiting to be located.
struct Task {
    /// Hit id.
    id: String,
    /// The hit's document, shared by all its fragments.
    book: Arc<BookText>,
    /// Highlighted fragment.
    fragment: String,
}

/// State shared by every worker of one run.
#[derive(Default)]
struct RunState {
    /// Keyword counts.
    keyword: KeywordFilter,
    /// First metadata seen per hit id.
    bibl: BTreeMap<String, BookMetadata>,
    /// Located matches, unordered.
    matches: Vec<PartialMatchContext>,
    /// Failed items.
    errors: Vec<ItemError>,
}

/// Locates every highlighted fragment of `hits` using `workers` threads per
/// stage.
pub fn collect_matches(hits: Vec<Hit>, workers: usize) -> Result<SearchOutcome, IndexError> {
    let workers = workers.max(1);
    let state = Mutex::new(RunState::default());
    let hit_count = hits.len();

    let (hit_tx, hit_rx) = sync_channel::<Hit>(workers);
    let (task_tx, task_rx) = sync_channel::<Task>(FRAGMENT_QUEUE);
    let hit_rx = Mutex::new(hit_rx);
    let task_rx = Mutex::new(task_rx);

    thread::scope(|scope| {
        for _ in 0..workers {
            let task_tx = task_tx.clone();
            let (hit_rx, task_rx, state) = (&hit_rx, &task_rx, &state);
            scope.spawn(move || decode_hits(hit_rx, &task_tx, state));
            scope.spawn(move || locate_fragments(task_rx, state));
        }
        drop(task_tx);

        for hit in hits {
            if hit_tx.send(hit).is_err() {
                break;
            }
        }
        drop(hit_tx);
    });

    let RunState {
        keyword,
        bibl,
        mut matches,
        mut errors,
    } = state.into_inner();
    if !errors.is_empty() {
        errors.sort_by(|a, b| a.id.cmp(&b.id));
        return Err(IndexError::SearchFailed { errors });
    }
    matches.sort_by(PartialMatchContext::cmp_position);
    debug!(hits = hit_count, matches = matches.len(), "matches located");
    Ok(SearchOutcome {
        keyword,
        tags: tag_counts(&bibl),
        bibl,
        matches,
    })
}

/// Stage one worker.
fn decode_hits(hits: &Mutex<Receiver<Hit>>, tasks: &SyncSender<Task>, state: &Mutex<RunState>) {
    loop {
        let Ok(hit) = hits.lock().recv() else {
            break;
        };
        let book: BookText = match serde_json::from_str(&hit.source) {
            Ok(book) => book,
            Err(source) => {
                let err = IndexError::Decode {
                    id: hit.id.clone(),
                    source,
                };
                state.lock().errors.push(ItemError::new(hit.id, &err));
                continue;
            }
        };
        let mismatch = book.identity_key() != hit.id;
        {
            let mut state = state.lock();
            if let Entry::Vacant(slot) = state.bibl.entry(hit.id.clone()) {
                slot.insert(book.metadata.clone());
            }
            if mismatch {
                let err = IndexError::IdMismatch {
                    id: hit.id.clone(),
                    bid: book.metadata.bid.clone(),
                };
                state.errors.push(ItemError::new(hit.id.clone(), &err));
            }
        }
        if mismatch {
            continue;
        }
        let book = Arc::new(book);
        for fragment in hit.highlights {
            let task = Task {
                id: hit.id.clone(),
                book: Arc::clone(&book),
                fragment,
            };
            if tasks.send(task).is_err() {
                return;
            }
        }
    }
}

/// Stage two worker.
fn locate_fragments(tasks: &Mutex<Receiver<Task>>, state: &Mutex<RunState>) {
    loop {
        let Ok(task) = tasks.lock().recv() else {
            break;
        };
        let located = parse(&task.fragment)
            .map_err(IndexError::from)
            .and_then(|highlighted| {
                state.lock().keyword.record_all(
                    &highlighted.markers,
                    task.book.metadata.elevel,
                    &task.id,
                );
                PartialMatchContext::locate(&task.id, &task.book, &task.fragment, &highlighted.text)
                    .map_err(IndexError::from)
            });
        let mut state = state.lock();
        match located {
            Ok(context) => state.matches.push(context),
            Err(err) => state.errors.push(ItemError::new(task.id, &err)),
        }
    }
}

/// Matched documents per tag, as label/value pairs in tag order.
fn tag_counts(bibl: &BTreeMap<String, BookMetadata>) -> Vec<LabelValue> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for metadata in bibl.values() {
        for tag in &metadata.tags {
            *counts.entry(tag).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .map(|(tag, count)| LabelValue {
            label: tag.to_string(),
            value: count.to_string(),
        })
        .collect()
}

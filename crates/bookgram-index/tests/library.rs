//! End-to-end tests over a real on-disk index, OCR tree and manifest directory.

#![allow(clippy::tests_outside_test_module)]

use std::{
    fs,
    path::{Path, PathBuf},
};

use bookgram_config::Config;
use bookgram_document::{OcrFormat, ReadingLevel, SourceDescriptor};
use bookgram_index::{ErrorKind, IndexError, InitOutcome, Library, RegisterRequest};
use bookgram_query::SearchQuery;
use serde_json::json;
use tempfile::TempDir;

/// Workspace with `ocr/`, `manifests/` and `index/` directories.
struct Fixture {
    /// Root of the workspace.
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("ocr")).unwrap();
        fs::create_dir_all(dir.path().join("manifests")).unwrap();
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Writes an OCR directory `iid` with one page file per entry of `pages`.
    fn ocr(&self, iid: &str, pages: &[&[&str]]) {
        let json_dir = self.path().join("ocr").join(iid).join("json");
        fs::create_dir_all(&json_dir).unwrap();
        for (n, lines) in pages.iter().enumerate() {
            let page: Vec<_> = lines
                .iter()
                .enumerate()
                .map(|(i, text)| json!([i * 40, 0, i * 40 + 30, 500, text]))
                .collect();
            fs::write(
                json_dir.join(format!("{:04}.json", n + 1)),
                serde_json::to_vec(&[page]).unwrap(),
            )
            .unwrap();
        }
    }

    /// Writes a manifest for `bid` with `canvases` canvases.
    fn manifest(&self, bid: &str, canvases: usize) {
        let canvases: Vec<_> = (1..=canvases)
            .map(|n| {
                json!({"images": [{"resource": {
                    "@id": format!("https://img.example/{bid}/{n:04}.tif/full/full/0/default.jpg")
                }}]})
            })
            .collect();
        let manifest = json!({
            "label": format!("book {bid}"),
            "attribution": "archive",
            "license": "cc-by",
            "metadata": [{"label": "id", "value": bid}],
            "sequences": [{"canvases": canvases}],
        });
        fs::write(
            self.path().join("manifests").join(format!("{bid}.json")),
            serde_json::to_vec(&manifest).unwrap(),
        )
        .unwrap();
    }

    fn config(&self) -> Config {
        let mut config = Config::default();
        config.store.path = self.path().join("index");
        config.bulk.source_dirs = vec![self.path().join("ocr")];
        config.bulk.workers = 2;
        config.metadata.manifest_dir = Some(self.path().join("manifests"));
        config
    }

    fn library(&self) -> Library {
        let library = Library::open(self.config()).unwrap();
        library.init(false).unwrap();
        library
    }

    fn write_list(&self, rows: &str) -> PathBuf {
        let path = self.path().join("list.csv");
        fs::write(&path, format!("bid,cid,iid,vol,start,end\n{rows}")).unwrap();
        path
    }
}

#[test]
fn bulk_list_coalesces_rows_and_indexes_each_book() {
    let fx = Fixture::new();
    fx.ocr("100000001-1", &[&["いづれの御時にか"], &["女御更衣あまた"]]);
    fx.ocr("100000001-2", &[&["さぶらひ給ひける中に"]]);
    fx.ocr("100000002-1", &[&["春はあけぼの"]]);
    fx.manifest("100000001", 3);
    fx.manifest("100000002", 1);
    let library = fx.library();

    let list = fx.write_list(
        "100000001,c1,100000001-1,1,1,2\n\
         100000001,c1,100000001-2,2,1,1\n\
         100000002,c2,100000002-1,1,0,0\n",
    );
    let report = library.bulk_register(&list, OcrFormat::NdlOcrV2).unwrap();
    assert!(report.error.is_empty(), "{:?}", report.error);
    assert!(
        report.message[0].starts_with("Successfully indexed [2] documents"),
        "{:?}",
        report.message
    );

    let count = library.count().unwrap();
    assert_eq!(count.record_count["OCR"], 2);
    assert_eq!(count.record_count["PROOF_READ"], 0);

    let book = library.get("100000001_OCR_ndlocrv2").unwrap();
    assert_eq!(book.pbs.len(), 3);
    assert_eq!(book.get_text(3, 1), "さぶらひ給ひける中に");
    assert_eq!(book.images[2], "https://img.example/100000001/0003.tif");
    assert_eq!(book.metadata.label, "book 100000001");
    assert_eq!(book.metadata.elevel, ReadingLevel::Ocr);
}

#[test]
fn search_locates_match_on_second_page() {
    let fx = Fixture::new();
    fx.ocr("200000001", &[&["AB page1 line1"], &["CD page2 line1"]]);
    fx.manifest("200000001", 2);
    let mut config = fx.config();
    config.search.fragment_size = 5;
    let library = Library::open(config).unwrap();
    library.init(false).unwrap();
    let mut request = RegisterRequest::new(OcrFormat::NdlOcrV2, "200000001", "c1");
    request
        .sources
        .push(SourceDescriptor::new(fx.path().join("ocr/200000001"), 0, 0));
    let id = library.register(&request).unwrap();
    assert_eq!(id, "200000001_OCR_ndlocrv2");

    let page = library.search(&SearchQuery::new(["page2"])).unwrap();
    assert_eq!(page.total, 1);
    let found = &page.matches[0];
    assert_eq!(found.pages, [1, 1]);
    assert_eq!(found.lines, [0, 0]);
    assert_eq!(
        found.image_ids,
        vec!["https://img.example/200000001/0002.tif"]
    );
    assert_eq!(page.bibl[&id].label, "book 200000001");

    let json = serde_json::to_value(&page).unwrap();
    assert_eq!(json["perPage"], 20);
    assert_eq!(json["page"], 1);
    assert_eq!(json["match"][0]["imageIDs"][0], "https://img.example/200000001/0002.tif");
    assert_eq!(json["filters"]["keyword"]["1"]["page2"]["OCR"][&id], 1);
    assert_eq!(json["filters"]["tag"][0]["label"], "ndlocrv2");
}

#[test]
fn search_pages_through_matches() {
    let fx = Fixture::new();
    let lines: Vec<String> = (1..=5)
        .map(|n| format!("第{n}行の月夜{}", "。".repeat(60)))
        .collect();
    let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
    fx.ocr("300000001", &[&lines]);
    fx.manifest("300000001", 1);
    let library = fx.library();
    let mut request = RegisterRequest::new(OcrFormat::NdlOcrV2, "300000001", "c1");
    request
        .sources
        .push(SourceDescriptor::new(fx.path().join("ocr/300000001"), 0, 0));
    library.register(&request).unwrap();

    let mut query = SearchQuery::new(["月夜"]);
    query.per_page = Some(2);
    query.page = Some(3);
    let page = library.search(&query).unwrap();
    assert_eq!(page.total, 5);
    assert_eq!(page.matches.len(), 1);

    query.page = Some(4);
    let err = library.search(&query).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.to_string(), "page should be: 1 <= page=4 <= 3");
}

#[test]
fn invalid_queries_are_rejected_before_searching() {
    let fx = Fixture::new();
    let library = fx.library();
    let err = library.search(&SearchQuery::new(["月"])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    let err = library.search(&SearchQuery::default()).unwrap_err();
    assert_eq!(err.to_string(), "query missing");
}

#[test]
fn bulk_list_must_be_csv_with_header() {
    let fx = Fixture::new();
    let library = fx.library();
    let txt = fx.path().join("list.txt");
    fs::write(&txt, "bid,cid,iid,vol,start,end\n").unwrap();
    assert!(matches!(
        library.bulk_register(&txt, OcrFormat::NdlOcrV2),
        Err(IndexError::NotCsv { .. })
    ));
    let headless = fx.path().join("headless.csv");
    fs::write(&headless, "1,2,3,4,5,6\n").unwrap();
    let err = library
        .bulk_register(&headless, OcrFormat::NdlOcrV2)
        .unwrap_err();
    assert!(err.to_string().ends_with("first line must be header"));
}

#[test]
fn bulk_failures_are_reported_per_book() {
    let fx = Fixture::new();
    fx.ocr("400000001", &[&["古池や"]]);
    fx.manifest("400000001", 1);
    let library = fx.library();
    let list = fx.write_list(
        "400000001,c1,400000001,1,0,0\n\
         400000002,c2,missing,1,0,0\n",
    );
    let report = library.bulk_register(&list, OcrFormat::NdlOcrV2).unwrap();
    assert_eq!(report.error.len(), 1);
    assert!(report.error[0].starts_with("new 400000002: "), "{:?}", report.error);
    assert!(report.message[0].starts_with("Successfully indexed [1] documents"));
}

#[test]
fn init_keeps_or_resets_the_index() {
    let fx = Fixture::new();
    fx.ocr("500000001", &[&["閑さや岩にしみ入る"]]);
    fx.manifest("500000001", 1);
    let library = Library::open(fx.config()).unwrap();
    assert_eq!(library.init(false).unwrap(), InitOutcome::Created);

    let mut request = RegisterRequest::new(OcrFormat::NdlOcrV2, "500000001", "c1");
    request
        .sources
        .push(SourceDescriptor::new(fx.path().join("ocr/500000001"), 0, 0));
    let id = library.register(&request).unwrap();

    assert_eq!(library.init(false).unwrap(), InitOutcome::Kept);
    assert!(library.get(&id).is_ok());

    assert_eq!(library.init(true).unwrap(), InitOutcome::Recreated);
    assert_eq!(library.get(&id).unwrap_err().kind(), ErrorKind::NotFound);
}

#[test]
fn registration_cannot_reach_beyond_the_manifest() {
    let fx = Fixture::new();
    fx.ocr("600000001", &[&["一"], &["二"], &["三"]]);
    fx.manifest("600000001", 2);
    let library = fx.library();
    let mut request = RegisterRequest::new(OcrFormat::NdlOcrV2, "600000001", "c1");
    request
        .sources
        .push(SourceDescriptor::new(fx.path().join("ocr/600000001"), 0, 0));
    let err = library.register(&request).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
    assert_eq!(library.count().unwrap().record_count["OCR"], 0);
}

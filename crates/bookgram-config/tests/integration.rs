//! Loading configuration from a directory tree.

use std::fs;

use bookgram_config::{CONFIG_FILENAME, Config, local_template};

#[test]
fn load_merges_nested_configs() {
    let tmp = tempfile::tempdir().unwrap();
    let project = tmp.path().join("project");
    let work = project.join("volumes");
    fs::create_dir_all(&work).unwrap();
    fs::write(
        tmp.path().join(CONFIG_FILENAME),
        "root = true\n[bulk]\nworkers = 8\nsource_dir = \"scans\"\n",
    )
    .unwrap();
    fs::write(
        project.join(CONFIG_FILENAME),
        "[store]\nindex = \"kokusho\"\n[bulk]\nsubdir = true\n",
    )
    .unwrap();

    let config = Config::load(&work).unwrap();
    assert_eq!(config.store.index, "kokusho");
    assert_eq!(config.store.path, project.join(".bookgram/index"));
    assert_eq!(config.bulk.workers, 8);
    assert!(config.bulk.subdir);
    assert_eq!(config.bulk.source_dirs, vec![tmp.path().join("scans")]);
    assert_eq!(config.config_root.as_deref(), Some(project.as_path()));
}

#[test]
fn init_template_loads_as_defaults() {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(tmp.path().join(CONFIG_FILENAME), local_template()).unwrap();

    let config = Config::load(tmp.path()).unwrap();
    assert_eq!(config.store.index, "books");
    assert_eq!(config.search.max_hits, 1000);
    assert_eq!(config.bulk.source_dirs, vec![tmp.path().join("ocr")]);
}

#[test]
fn broken_config_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(tmp.path().join(CONFIG_FILENAME), "root = true\n[store\n").unwrap();
    let err = Config::load(tmp.path()).unwrap_err();
    assert!(err.to_string().contains(CONFIG_FILENAME));
}

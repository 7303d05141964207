//! Fixtures shared by unit tests.

use std::{fs, path::Path};

use serde_json::json;

use crate::{IndexError, Manifest, MetadataSource, MorphTokenizer};

/// Writes one positional-format page file holding `lines`.
pub fn write_page(dir: &Path, name: &str, lines: &[&str]) {
    let json_dir = dir.join("json");
    fs::create_dir_all(&json_dir).unwrap();
    let page: Vec<_> = lines
        .iter()
        .enumerate()
        .map(|(n, text)| json!([n * 10, 0, n * 10 + 10, 100, text]))
        .collect();
    fs::write(json_dir.join(name), serde_json::to_vec(&[page]).unwrap()).unwrap();
}

/// Writes `pages` as `0001.json`, `0002.json`, ... under `dir`.
pub fn write_book(dir: &Path, pages: &[&[&str]]) {
    for (n, lines) in pages.iter().enumerate() {
        write_page(dir, &format!("{:04}.json", n + 1), lines);
    }
}

/// Manifest source with a fixed number of canvases per book.
pub struct Canvases(pub usize);

impl MetadataSource for Canvases {
    fn fetch(&self, bid: &str) -> Result<Manifest, IndexError> {
        Ok(Manifest {
            label: format!("label {bid}"),
            images: (1..=self.0).map(|n| format!("{bid}/{n:04}.tif")).collect(),
            ..Default::default()
        })
    }
}

/// Tokenizer emitting one token per character.
pub struct Characters;

impl MorphTokenizer for Characters {
    fn tokenize(&self, _profile: &str, text: &str) -> Result<Vec<String>, IndexError> {
        Ok(text.chars().map(String::from).collect())
    }
}

//! Test helpers shared across bookgram-config unit tests.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::TempDir;

use crate::discovery::CONFIG_FILENAME;

/// Temporary directory tree for config tests.
pub struct TestDir {
    /// Root of the tree.
    root: TempDir,
}

impl TestDir {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self {
            root: tempfile::tempdir().unwrap(),
        }
    }

    /// Root of the tree.
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Creates a directory relative to the root.
    pub fn create_dir(&self, rel_path: &str) -> PathBuf {
        let path = self.root.path().join(rel_path);
        fs::create_dir_all(&path).unwrap();
        path
    }

    /// Writes `bookgram.toml` with `content` into `rel_dir`.
    pub fn create_config(&self, rel_dir: &str, content: &str) -> PathBuf {
        let path = self.create_dir(rel_dir).join(CONFIG_FILENAME);
        fs::write(&path, content).unwrap();
        path
    }
}

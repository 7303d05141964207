//! Configuration file discovery.
//!
//! Walks up from a starting directory collecting `bookgram.toml` files, then
//! appends the global `~/.bookgram.toml` if present.

use std::path::{Path, PathBuf};

use directories::BaseDirs;

use crate::parse::is_root_config;

/// The configuration filename.
pub const CONFIG_FILENAME: &str = "bookgram.toml";

/// Name of the global configuration file in the home directory.
pub const GLOBAL_CONFIG_FILENAME: &str = ".bookgram.toml";

/// Discovers all configuration files relevant to `cwd`.
///
/// Returns paths closest-first; the global file, when used, comes last.
/// Discovery stops at a file that sets `root = true`, which also excludes
/// the global file.
pub fn discover_config_files(cwd: &Path) -> Vec<PathBuf> {
    let mut configs = Vec::new();

    for dir in cwd.ancestors() {
        let candidate = dir.join(CONFIG_FILENAME);
        if !candidate.is_file() {
            continue;
        }
        let is_root = is_root_config(&candidate);
        configs.push(candidate);
        if is_root {
            return configs;
        }
    }

    if let Some(global) = global_config_path()
        && global.is_file()
        && !configs.contains(&global)
    {
        configs.push(global);
    }
    configs
}

/// Returns the path of the global configuration file.
pub fn global_config_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().join(GLOBAL_CONFIG_FILENAME))
}

/// Checks if a path is the global configuration file.
pub fn is_global_config(path: &Path) -> bool {
    global_config_path().is_some_and(|global| path == global)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestDir;

    /// Drops the global config, which depends on the machine running the tests.
    fn local(configs: Vec<PathBuf>) -> Vec<PathBuf> {
        configs.into_iter().filter(|p| !is_global_config(p)).collect()
    }

    #[test]
    fn finds_nothing_in_empty_tree() {
        let dir = TestDir::new();
        let cwd = dir.create_dir("a/b");
        assert!(local(discover_config_files(&cwd)).is_empty());
    }

    #[test]
    fn closest_config_comes_first() {
        let dir = TestDir::new();
        let outer = dir.create_config("", "");
        let inner = dir.create_config("a/b", "");
        let cwd = dir.create_dir("a/b/c");
        assert_eq!(local(discover_config_files(&cwd)), vec![inner, outer]);
    }

    #[test]
    fn root_config_stops_discovery() {
        let dir = TestDir::new();
        dir.create_config("", "");
        let project = dir.create_config("project", "root = true\n");
        let cwd = dir.create_dir("project/src");
        assert_eq!(discover_config_files(&cwd), vec![project]);
    }

    #[test]
    fn directory_named_like_config_is_skipped() {
        let dir = TestDir::new();
        dir.create_dir(CONFIG_FILENAME);
        assert!(local(discover_config_files(dir.path())).is_empty());
    }

    #[test]
    fn global_path_uses_dotted_name() {
        let Some(path) = global_config_path() else {
            return;
        };
        assert!(path.ends_with(GLOBAL_CONFIG_FILENAME));
        assert!(is_global_config(&path));
        assert!(!is_global_config(Path::new("/tmp/bookgram.toml")));
    }
}

//! Path resolution for configured directories.

use std::path::{Path, PathBuf};

use directories::BaseDirs;

use crate::ConfigError;

/// Resolves a configured path against the directory of the file defining it.
///
/// `~` and `~/...` expand to the home directory; other relative paths are
/// joined onto `config_dir`. The path does not need to exist.
pub fn resolve_path(path: &str, config_dir: &Path) -> Result<PathBuf, ConfigError> {
    let expanded = expand_tilde(path)?;
    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        Ok(config_dir.join(expanded))
    }
}

/// Expands a leading `~`.
fn expand_tilde(path: &str) -> Result<PathBuf, ConfigError> {
    if path == "~" {
        return home_dir();
    }
    if let Some(rest) = path.strip_prefix("~/") {
        return Ok(home_dir()?.join(rest));
    }
    Ok(PathBuf::from(path))
}

/// Returns the home directory.
fn home_dir() -> Result<PathBuf, ConfigError> {
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .ok_or(ConfigError::NoHomeDirectory)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_join_config_dir() {
        let resolved = resolve_path("ocr/books", Path::new("/srv/bookgram")).unwrap();
        assert_eq!(resolved, PathBuf::from("/srv/bookgram/ocr/books"));
    }

    #[test]
    fn absolute_paths_are_kept() {
        let resolved = resolve_path("/data/ocr", Path::new("/srv")).unwrap();
        assert_eq!(resolved, PathBuf::from("/data/ocr"));
    }

    #[test]
    fn tilde_expands_to_home() {
        let Some(dirs) = BaseDirs::new() else {
            return;
        };
        let resolved = resolve_path("~/dic", Path::new("/srv")).unwrap();
        assert_eq!(resolved, dirs.home_dir().join("dic"));
    }
}

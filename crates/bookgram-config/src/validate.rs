//! Configuration validation.

use std::fmt;

use crate::Config;

/// A non-fatal problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// A bulk source directory does not exist.
    SourceDirMissing {
        /// The missing directory.
        path: String,
    },
    /// The manifest directory does not exist.
    ManifestDirMissing {
        /// The missing directory.
        path: String,
    },
    /// The manifest URL has no `{bid}` placeholder.
    ManifestUrlWithoutBid {
        /// The configured URL.
        url: String,
    },
    /// A size or count setting is zero and will be raised to one.
    ZeroSetting {
        /// Dotted setting name.
        name: &'static str,
    },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceDirMissing { path } => {
                write!(f, "bulk source directory does not exist: {path}")
            }
            Self::ManifestDirMissing { path } => {
                write!(f, "manifest directory does not exist: {path}")
            }
            Self::ManifestUrlWithoutBid { url } => {
                write!(f, "manifest_url has no {{bid}} placeholder: {url}")
            }
            Self::ZeroSetting { name } => write!(f, "{name} is 0; using 1"),
        }
    }
}

/// Collects warnings for `config`.
pub fn validate_config(config: &Config) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();

    for dir in &config.bulk.source_dirs {
        if !dir.is_dir() {
            warnings.push(ConfigWarning::SourceDirMissing {
                path: dir.display().to_string(),
            });
        }
    }
    match &config.metadata.manifest_dir {
        Some(dir) if !dir.is_dir() => warnings.push(ConfigWarning::ManifestDirMissing {
            path: dir.display().to_string(),
        }),
        Some(_) => {}
        None if !config.metadata.manifest_url.contains("{bid}") => {
            warnings.push(ConfigWarning::ManifestUrlWithoutBid {
                url: config.metadata.manifest_url.clone(),
            });
        }
        None => {}
    }
    for (name, value) in [
        ("bulk.workers", config.bulk.workers),
        ("bulk.queue", config.bulk.queue),
        ("search.fragment_size", config.search.fragment_size),
        ("search.per_page", config.search.per_page),
        ("search.cache_capacity", config.search.cache_capacity),
    ] {
        if value == 0 {
            warnings.push(ConfigWarning::ZeroSetting { name });
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestDir;

    #[test]
    fn existing_dirs_produce_no_warnings() {
        let dir = TestDir::new();
        let mut config = Config::default();
        config.bulk.source_dirs = vec![dir.create_dir("ocr")];
        assert!(validate_config(&config).is_empty());
    }

    #[test]
    fn reports_missing_dirs() {
        let dir = TestDir::new();
        let mut config = Config::default();
        config.bulk.source_dirs = vec![dir.path().join("nope")];
        config.metadata.manifest_dir = Some(dir.path().join("iiif"));
        let warnings = validate_config(&config);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].to_string().contains("nope"));
        assert!(matches!(warnings[1], ConfigWarning::ManifestDirMissing { .. }));
    }

    #[test]
    fn reports_url_without_placeholder() {
        let dir = TestDir::new();
        let mut config = Config::default();
        config.bulk.source_dirs = vec![dir.create_dir("ocr")];
        config.metadata.manifest_url = "https://example.org/manifest".into();
        assert_eq!(
            validate_config(&config)[0].to_string(),
            "manifest_url has no {bid} placeholder: https://example.org/manifest"
        );
    }

    #[test]
    fn reports_zero_settings() {
        let dir = TestDir::new();
        let mut config = Config::default();
        config.bulk.source_dirs = vec![dir.create_dir("ocr")];
        config.bulk.workers = 0;
        config.search.per_page = 0;
        let warnings = validate_config(&config);
        assert_eq!(
            warnings,
            vec![
                ConfigWarning::ZeroSetting {
                    name: "bulk.workers"
                },
                ConfigWarning::ZeroSetting {
                    name: "search.per_page"
                },
            ]
        );
    }
}

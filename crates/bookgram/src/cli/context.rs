//! Shared context for running CLI commands.

use std::{
    env,
    path::{Path, PathBuf},
    process::ExitCode,
};

use bookgram_config::Config;
use bookgram_index::{IndexError, Library};

/// Exit codes by failure kind.
pub mod exit_codes {
    use std::process::ExitCode;

    use bookgram_index::ErrorKind;

    /// Request parameters were rejected.
    pub const VALIDATION: u8 = 2;
    /// Source data could not be decoded.
    pub const FORMAT: u8 = 3;
    /// The document or index does not exist.
    pub const NOT_FOUND: u8 = 4;
    /// The store or a collaborator failed.
    pub const UPSTREAM: u8 = 5;
    /// Configuration is unusable.
    pub const CONFIG: u8 = 6;

    /// Exit code reported for a failure of `kind`.
    pub fn for_kind(kind: ErrorKind) -> ExitCode {
        ExitCode::from(match kind {
            ErrorKind::Validation => VALIDATION,
            ErrorKind::Format => FORMAT,
            ErrorKind::NotFound => NOT_FOUND,
            ErrorKind::Upstream => UPSTREAM,
            ErrorKind::Config => CONFIG,
        })
    }
}

/// Command execution context built once per CLI invocation.
pub struct CommandContext {
    /// Current working directory.
    pub cwd: PathBuf,
    /// Loaded configuration (default when no config file was found).
    pub config: Config,
    /// Library opened for this invocation.
    library: Option<Library>,
}

impl CommandContext {
    /// Loads the working directory and, when `with_config` is set, the
    /// configuration from `explicit` or from discovered files.
    pub fn load(explicit: Option<&Path>, with_config: bool) -> Result<Self, ExitCode> {
        let cwd = current_dir_or_failure()?;
        let config = if with_config {
            load_config_or_failure(&cwd, explicit)?
        } else {
            Config::default()
        };
        Ok(Self {
            cwd,
            config,
            library: None,
        })
    }

    /// Returns the library, opening it on first use.
    pub fn library(&mut self) -> Result<&Library, ExitCode> {
        let library = match self.library.take() {
            Some(library) => library,
            None => Library::open(self.config.clone()).map_err(|e| fail(&e))?,
        };
        Ok(self.library.insert(library))
    }
}

/// Reports `err` on stderr and returns the exit code for its kind.
pub fn fail(err: &IndexError) -> ExitCode {
    eprintln!("error: {err}");
    if matches!(err, IndexError::IndexMissing { .. }) {
        eprintln!("Run 'bookgram init' to create the index.");
    }
    exit_codes::for_kind(err.kind())
}

/// Returns the current working directory or exits with a consistent error.
fn current_dir_or_failure() -> Result<PathBuf, ExitCode> {
    env::current_dir().map_err(|e| {
        eprintln!("error: could not determine current directory: {e}");
        ExitCode::FAILURE
    })
}

/// Loads configuration from `explicit` or by discovery from `cwd`.
fn load_config_or_failure(cwd: &Path, explicit: Option<&Path>) -> Result<Config, ExitCode> {
    let loaded = match explicit {
        Some(path) => Config::load_from_files(&[cwd.join(path)]),
        None => Config::load(cwd),
    };
    loaded.map_err(|e| {
        eprintln!("error: failed to load configuration: {e}");
        ExitCode::from(exit_codes::CONFIG)
    })
}

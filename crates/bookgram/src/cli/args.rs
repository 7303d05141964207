//! Clap argument definitions for the `bookgram` CLI.

use std::path::PathBuf;

use bookgram_document::{OcrFormat, ReadingLevel, SourceDescriptor};
use clap::{Args, Parser, Subcommand};

/// Parses an OCR format name.
fn parse_format(s: &str) -> Result<OcrFormat, String> {
    s.parse().map_err(|e| format!("{e}"))
}

/// Parses a reading level name.
fn parse_level(s: &str) -> Result<ReadingLevel, String> {
    s.parse().map_err(|e| format!("{e}"))
}

/// Parses `DIR`, `DIR:START` or `DIR:START:END` into a source descriptor.
///
/// Page numbers are peeled off the right so directories may contain colons.
/// A missing or zero bound means "from the first page" or "to the last".
pub fn parse_source(s: &str) -> Result<SourceDescriptor, String> {
    let mut dir = s;
    let mut bounds = Vec::new();
    while bounds.len() < 2 {
        let Some((head, tail)) = dir.rsplit_once(':') else {
            break;
        };
        let Ok(n) = tail.parse::<usize>() else {
            break;
        };
        bounds.push(n);
        dir = head;
    }
    if dir.is_empty() {
        return Err(format!("missing directory in source: {s}"));
    }
    bounds.reverse();
    let (start, end) = match bounds.as_slice() {
        [] => (0, 0),
        [start] => (*start, 0),
        [start, end, ..] => (*start, *end),
    };
    Ok(SourceDescriptor::new(dir, start, end))
}

/// Top-level CLI options.
#[derive(Parser)]
#[command(name = "bookgram")]
#[command(about = "Full-text search over OCR transcriptions of books")]
pub struct Cli {
    /// Read settings from this file instead of discovering bookgram.toml
    #[arg(long = "config", id = "config_file", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Log debug events (overridden by BOOKGRAM_LOG)
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Arguments for `bookgram init`.
#[derive(Args, Debug, Clone, Default)]
pub struct InitCommand {
    /// Delete an existing index and create it again
    #[arg(long)]
    pub reset: bool,
}

/// Arguments for `bookgram register`.
#[derive(Args, Debug, Clone)]
pub struct RegisterCommand {
    /// OCR format: ndlocrv1, ndlocrv2, ndlocrv2detail, ndlocrv3, ndlocrv3detail
    #[arg(value_parser = parse_format)]
    pub format: OcrFormat,

    /// Book id
    pub bid: String,

    /// Collection id
    pub cid: String,

    /// OCR output directories, in reading order, as DIR[:START[:END]]
    #[arg(required = true, value_parser = parse_source)]
    pub sources: Vec<SourceDescriptor>,

    /// Tokenizer dictionary profile to store morphological tokens for
    #[arg(short = 'p', long)]
    pub profile: Option<String>,
}

/// Arguments for `bookgram bulk-register`.
#[derive(Args, Debug, Clone)]
pub struct BulkRegisterCommand {
    /// CSV list with header bid,cid,iid,vol,start,end
    pub list: PathBuf,

    /// OCR format of every listed book
    #[arg(long = "type", default_value = "ndlocrv2", value_parser = parse_format)]
    pub format: OcrFormat,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `bookgram search`.
#[derive(Args, Debug, Clone)]
pub struct SearchCommand {
    /// Words that must all appear, each at least two characters
    #[arg(required = true)]
    pub words: Vec<String>,

    /// Only books at this reading level: OCR or PROOF_READ (repeatable)
    #[arg(long = "el", value_parser = parse_level)]
    pub levels: Vec<ReadingLevel>,

    /// Only books carrying this tag (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Only these book ids (repeatable)
    #[arg(long = "bid")]
    pub bids: Vec<String>,

    /// Result page, starting at 1
    #[arg(long)]
    pub page: Option<usize>,

    /// Matches per page [default: search.per_page]
    #[arg(long)]
    pub per_page: Option<usize>,

    /// Print the result page as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `bookgram get`.
#[derive(Args, Debug, Clone)]
pub struct GetCommand {
    /// Document id, e.g. 100000001_OCR_ndlocrv2
    pub id: String,

    /// Print only the text of this page (1-based)
    #[arg(long, requires = "line")]
    pub page: Option<usize>,

    /// Line within --page (1-based)
    #[arg(long, requires = "page")]
    pub line: Option<usize>,
}

/// Arguments for `bookgram count`.
#[derive(Args, Debug, Clone, Default)]
pub struct CountCommand {
    /// Print counts as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `bookgram config`.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigCommand {
    /// What to do with the configuration [default: show]
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Configuration actions.
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Print the effective settings
    Show,
    /// Report settings that will not work as intended
    Check,
    /// Write an annotated bookgram.toml to the current directory
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Supported `bookgram` subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Create the search index
    Init(InitCommand),

    /// Index one book from explicit OCR directories
    #[command(after_help = "\
EXAMPLES:
  bookgram register ndlocrv2 100000001 c1 ocr/100000001-1 ocr/100000001-2:1:40
  bookgram register ndlocrv1 200000001 c2 ocr/200000001 --profile kinsei-edo")]
    Register(RegisterCommand),

    /// Index every book in a CSV list
    #[command(name = "bulk-register")]
    BulkRegister(BulkRegisterCommand),

    /// Search for passages containing every word
    Search(SearchCommand),

    /// Print a stored document or one of its lines
    Get(GetCommand),

    /// Count indexed documents per reading level
    Count(CountCommand),

    /// Show, check or create configuration
    Config(ConfigCommand),
}

impl Commands {
    /// Whether the command reads the merged configuration.
    ///
    /// `config init` must work while an existing file is broken.
    pub fn needs_config(&self) -> bool {
        !matches!(
            self,
            Self::Config(ConfigCommand {
                action: Some(ConfigAction::Init { .. })
            })
        )
    }
}

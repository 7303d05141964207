//! Implementation of `bookgram config`.

use std::{fs, process::ExitCode};

use bookgram_config::{CONFIG_FILENAME, ConfigWarning, local_template};
use bookgram_highlight::Highlighter;

use crate::cli::{
    args::{ConfigAction, ConfigCommand},
    context::{CommandContext, exit_codes},
    output::{dim, header, warning},
};

/// Dispatches a configuration action.
pub fn run(ctx: &CommandContext, cmd: ConfigCommand) -> ExitCode {
    match cmd.action.unwrap_or(ConfigAction::Show) {
        ConfigAction::Show => show(ctx),
        ConfigAction::Check => check(ctx),
        ConfigAction::Init { force } => init(ctx, force),
    }
}

/// Prints the effective settings as highlighted TOML.
fn show(ctx: &CommandContext) -> ExitCode {
    let toml = match ctx.config.settings_to_toml() {
        Ok(toml) => toml,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(exit_codes::CONFIG);
        }
    };
    if let Some(root) = &ctx.config.config_root {
        println!("{}", dim(&format!("# from {}", root.display())));
    }
    print!("{}", Highlighter::new().highlight_toml(&toml));
    ExitCode::SUCCESS
}

/// Reports configuration warnings; exits with failure when there are any.
fn check(ctx: &CommandContext) -> ExitCode {
    let warnings = ctx.config.validate();
    if warnings.is_empty() {
        println!("No issues found.");
        return ExitCode::SUCCESS;
    }
    println!("{}", header(&format!("Warnings ({}):", warnings.len())));
    for w in &warnings {
        println!("  - {}", warning(&w.to_string()));
    }
    let hints = hints(&warnings);
    if !hints.is_empty() {
        println!("Hints:");
        for hint in hints {
            println!("  - {hint}");
        }
    }
    ExitCode::FAILURE
}

/// Deduplicated hints for resolving `warnings`.
fn hints(warnings: &[ConfigWarning]) -> Vec<&'static str> {
    let mut hints: Vec<&str> = warnings
        .iter()
        .map(|w| match w {
            ConfigWarning::SourceDirMissing { .. } => {
                "Create the OCR source directory or fix bulk.source_dir."
            }
            ConfigWarning::ManifestDirMissing { .. } => {
                "Create the manifest directory or unset metadata.manifest_dir."
            }
            ConfigWarning::ManifestUrlWithoutBid { .. } => {
                "Put {bid} where the book id belongs in metadata.manifest_url."
            }
            ConfigWarning::ZeroSetting { .. } => "Use a value greater than zero.",
        })
        .collect();
    hints.sort_unstable();
    hints.dedup();
    hints
}

/// Writes the annotated template to `bookgram.toml` in the working directory.
fn init(ctx: &CommandContext, force: bool) -> ExitCode {
    let path = ctx.cwd.join(CONFIG_FILENAME);
    if path.exists() && !force {
        eprintln!("error: configuration file already exists: {}", path.display());
        eprintln!("use --force to overwrite");
        return ExitCode::FAILURE;
    }
    if let Err(e) = fs::write(&path, local_template()) {
        eprintln!("error: failed to write {}: {e}", path.display());
        return ExitCode::FAILURE;
    }
    println!("Created {}", path.display());
    ExitCode::SUCCESS
}

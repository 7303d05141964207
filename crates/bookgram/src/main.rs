//! Command-line interface for the `bookgram` tool.

use std::process::ExitCode;

use bookgram::cli::{CommandContext, args::Cli, commands, logging};
use clap::Parser;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut ctx = match CommandContext::load(cli.config.as_deref(), cli.command.needs_config()) {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };
    commands::run(cli.command, &mut ctx)
}

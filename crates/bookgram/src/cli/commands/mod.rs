//! Command implementations and dispatch.

pub mod bulk;
pub mod config;
pub mod count;
pub mod get;
pub mod init;
pub mod register;
pub mod search;

use std::process::ExitCode;

use super::{args::Commands, context::CommandContext};

/// Dispatches to the selected subcommand.
pub fn run(command: Commands, ctx: &mut CommandContext) -> ExitCode {
    match command {
        Commands::Init(cmd) => init::run(ctx, &cmd),
        Commands::Register(cmd) => register::run(ctx, cmd),
        Commands::BulkRegister(cmd) => bulk::run(ctx, &cmd),
        Commands::Search(cmd) => search::run(ctx, cmd),
        Commands::Get(cmd) => get::run(ctx, &cmd),
        Commands::Count(cmd) => count::run(ctx, &cmd),
        Commands::Config(cmd) => config::run(ctx, cmd),
    }
}

//! Implementation of `bookgram init`.

use std::process::ExitCode;

use bookgram_index::InitOutcome;

use crate::cli::{
    args::InitCommand,
    context::{CommandContext, fail},
};

/// Creates the index, dropping it first when a reset is requested.
pub fn run(ctx: &mut CommandContext, cmd: &InitCommand) -> ExitCode {
    let reset = cmd.reset || ctx.config.store.reset;
    let index = ctx.config.store.index.clone();
    let path = ctx.config.store.path.clone();
    let library = match ctx.library() {
        Ok(library) => library,
        Err(code) => return code,
    };
    match library.init(reset) {
        Ok(outcome) => {
            let verb = match outcome {
                InitOutcome::Created => "Created",
                InitOutcome::Kept => "Kept existing",
                InitOutcome::Recreated => "Recreated",
            };
            println!("{verb} index {index} in {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

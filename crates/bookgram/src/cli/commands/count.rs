//! Implementation of `bookgram count`.

use std::process::ExitCode;

use crate::cli::{
    args::CountCommand,
    context::{CommandContext, fail},
    output::{count_table, print_json},
};

/// Prints indexed document counts per reading level.
pub fn run(ctx: &mut CommandContext, cmd: &CountCommand) -> ExitCode {
    let library = match ctx.library() {
        Ok(library) => library,
        Err(code) => return code,
    };
    match library.count() {
        Ok(count) if cmd.json => print_json(&count),
        Ok(count) => {
            println!("{}", count_table(&count));
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

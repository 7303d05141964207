//! Implementation of `bookgram get`.

use std::process::ExitCode;

use crate::cli::{
    args::GetCommand,
    context::{CommandContext, fail},
    output::print_json,
};

/// Prints a stored document as JSON, or one line of it.
pub fn run(ctx: &mut CommandContext, cmd: &GetCommand) -> ExitCode {
    let library = match ctx.library() {
        Ok(library) => library,
        Err(code) => return code,
    };
    let book = match library.get(&cmd.id) {
        Ok(book) => book,
        Err(e) => return fail(&e),
    };
    match (cmd.page, cmd.line) {
        (Some(page), Some(line)) => {
            println!("{}", book.get_text(page, line));
            ExitCode::SUCCESS
        }
        _ => print_json(&book),
    }
}

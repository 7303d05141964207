//! Implementation of `bookgram register`.

use std::process::ExitCode;

use bookgram_index::RegisterRequest;

use crate::cli::{
    args::RegisterCommand,
    context::{CommandContext, fail},
};

/// Builds one book from its OCR directories and indexes it.
pub fn run(ctx: &mut CommandContext, cmd: RegisterCommand) -> ExitCode {
    let mut request = RegisterRequest::new(cmd.format, cmd.bid, cmd.cid);
    request.sources = cmd
        .sources
        .into_iter()
        .map(|mut source| {
            source.dir = ctx.cwd.join(&source.dir);
            source
        })
        .collect();
    request.profile = cmd.profile;

    let library = match ctx.library() {
        Ok(library) => library,
        Err(code) => return code,
    };
    match library.register(&request) {
        Ok(id) => {
            println!("{id}");
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

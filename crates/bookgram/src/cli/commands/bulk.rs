//! Implementation of `bookgram bulk-register`.

use std::process::ExitCode;

use crate::cli::{
    args::BulkRegisterCommand,
    context::{CommandContext, fail},
    output::{print_json, print_report},
};

/// Registers every book in a CSV list.
///
/// Exits with failure when any book failed, after the others were indexed.
pub fn run(ctx: &mut CommandContext, cmd: &BulkRegisterCommand) -> ExitCode {
    let list = ctx.cwd.join(&cmd.list);
    let library = match ctx.library() {
        Ok(library) => library,
        Err(code) => return code,
    };
    let report = match library.bulk_register(&list, cmd.format) {
        Ok(report) => report,
        Err(e) => return fail(&e),
    };

    let code = if cmd.json {
        print_json(&report)
    } else {
        print_report(&report);
        ExitCode::SUCCESS
    };
    if report.error.is_empty() {
        code
    } else {
        ExitCode::FAILURE
    }
}

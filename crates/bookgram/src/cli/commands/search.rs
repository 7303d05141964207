//! Implementation of `bookgram search`.

use std::process::ExitCode;

use bookgram_query::SearchQuery;
use tracing::debug;

use crate::cli::{
    args::SearchCommand,
    context::{CommandContext, fail},
    output::{print_json, print_search_page},
};

/// Runs a search and prints the requested page.
pub fn run(ctx: &mut CommandContext, cmd: SearchCommand) -> ExitCode {
    let json = cmd.json;
    let query = SearchQuery {
        words: cmd.words,
        levels: cmd.levels,
        tags: cmd.tags,
        bids: cmd.bids,
        page: cmd.page,
        per_page: cmd.per_page,
    };
    debug!(key = %query.cache_key(), "search");

    let library = match ctx.library() {
        Ok(library) => library,
        Err(code) => return code,
    };
    let page = match library.search(&query) {
        Ok(page) => page,
        Err(e) => return fail(&e),
    };
    if json {
        return print_json(&page);
    }
    print_search_page(&page);
    ExitCode::SUCCESS
}

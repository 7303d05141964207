//! Compiling a [`StoreQuery`] into a tantivy query.
//!
//! Each word becomes a phrase over its bigrams, so the whole word must
//! appear as contiguous text. Level, tag and book id lists become
//! any-of term filters.

use tantivy::{
    Term,
    query::{AllQuery, BooleanQuery, Occur, PhraseQuery, Query, TermQuery},
    schema::{Field, IndexRecordOption},
    tokenizer::TextAnalyzer,
};

use crate::{IndexError, StoreQuery, analyzer::bigrams, schema::IndexSchema};

/// Builds the query matching every word and every non-empty filter.
pub fn compile(
    schema: &IndexSchema,
    analyzer: &mut TextAnalyzer,
    query: &StoreQuery,
) -> Result<Box<dyn Query>, IndexError> {
    let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::new();
    for word in &query.words {
        clauses.push((Occur::Must, phrase(schema.text, analyzer, word)?));
    }
    let levels = query.levels.iter().map(|level| level.as_str());
    let filters = [
        any_of(schema.elevel, levels),
        any_of(schema.tags, query.tags.iter().map(String::as_str)),
        any_of(schema.bid, query.bids.iter().map(String::as_str)),
    ];
    clauses.extend(filters.into_iter().flatten().map(|q| (Occur::Must, q)));

    if clauses.is_empty() {
        return Ok(Box::new(AllQuery));
    }
    Ok(Box::new(BooleanQuery::new(clauses)))
}

/// Phrase query over the bigrams of `word`.
fn phrase(
    field: Field,
    analyzer: &mut TextAnalyzer,
    word: &str,
) -> Result<Box<dyn Query>, IndexError> {
    let mut terms: Vec<Term> = bigrams(analyzer, word)
        .iter()
        .map(|gram| Term::from_field_text(field, gram))
        .collect();
    match terms.len() {
        0 => Err(IndexError::EmptyPhrase {
            word: word.to_string(),
        }),
        1 => Ok(Box::new(TermQuery::new(
            terms.remove(0),
            IndexRecordOption::WithFreqs,
        ))),
        _ => Ok(Box::new(PhraseQuery::new(terms))),
    }
}

/// Matches documents whose `field` holds any of `values`; `None` when empty.
fn any_of<'a>(
    field: Field,
    values: impl Iterator<Item = &'a str>,
) -> Option<Box<dyn Query>> {
    let should: Vec<(Occur, Box<dyn Query>)> = values
        .map(|value| {
            let term = Term::from_field_text(field, value);
            let query: Box<dyn Query> = Box::new(TermQuery::new(term, IndexRecordOption::Basic));
            (Occur::Should, query)
        })
        .collect();
    if should.is_empty() {
        return None;
    }
    Some(Box::new(BooleanQuery::new(should)))
}

//! Bigram text analysis for the book index.
//!
//! Book text is split into overlapping two-character grams. Tantivy's
//! `NgramTokenizer` gives every gram position 0, so a filter renumbers them
//! in order; without it a phrase query could not require the grams of a
//! search word to be adjacent.

use tantivy::{
    Index,
    tokenizer::{NgramTokenizer, TextAnalyzer, Token, TokenFilter, TokenStream, Tokenizer},
};

use crate::IndexError;

/// Name of the bigram analyzer registered with Tantivy.
pub const BIGRAM_TOKENIZER: &str = "bookgram_bigram";

/// Builds the bigram analyzer.
pub fn build_analyzer() -> Result<TextAnalyzer, IndexError> {
    let grams =
        NgramTokenizer::new(2, 2, false).map_err(|e| IndexError::Analyzer(e.to_string()))?;
    Ok(TextAnalyzer::builder(grams)
        .filter(IncrementPositionFilter)
        .build())
}

/// Registers the bigram analyzer with `index`.
pub fn register(index: &Index) -> Result<(), IndexError> {
    index.tokenizers().register(BIGRAM_TOKENIZER, build_analyzer()?);
    Ok(())
}

/// Splits `text` into its bigrams, in order.
pub fn bigrams(analyzer: &mut TextAnalyzer, text: &str) -> Vec<String> {
    let mut stream = analyzer.token_stream(text);
    let mut grams = Vec::new();
    while let Some(token) = stream.next() {
        grams.push(token.text.clone());
    }
    grams
}

/// Token filter numbering tokens 0, 1, 2, ... in stream order.
#[derive(Clone)]
struct IncrementPositionFilter;

impl TokenFilter for IncrementPositionFilter {
    type Tokenizer<T: Tokenizer> = IncrementPosition<T>;

    fn transform<T: Tokenizer>(self, tokenizer: T) -> Self::Tokenizer<T> {
        IncrementPosition(tokenizer)
    }
}

/// Tokenizer wrapped by [`IncrementPositionFilter`].
#[derive(Clone)]
struct IncrementPosition<T>(T);

impl<T: Tokenizer> Tokenizer for IncrementPosition<T> {
    type TokenStream<'a> = IncrementPositionStream<T::TokenStream<'a>>;

    fn token_stream<'a>(&'a mut self, text: &'a str) -> Self::TokenStream<'a> {
        IncrementPositionStream {
            inner: self.0.token_stream(text),
            position: 0,
        }
    }
}

/// Token stream that overwrites positions.
struct IncrementPositionStream<T> {
    /// Wrapped stream.
    inner: T,
    /// Position given to the next token.
    position: usize,
}

impl<T: TokenStream> TokenStream for IncrementPositionStream<T> {
    fn advance(&mut self) -> bool {
        if !self.inner.advance() {
            return false;
        }
        self.inner.token_mut().position = self.position;
        self.position += 1;
        true
    }

    fn token(&self) -> &Token {
        self.inner.token()
    }

    fn token_mut(&mut self) -> &mut Token {
        self.inner.token_mut()
    }
}

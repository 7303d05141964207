//! Index schema for book texts.
//!
//! One tantivy document per [`BookText`](bookgram_document::BookText):
//! - `id`: identity key (string, stored)
//! - `bid`, `cid`, `elevel`, `tags`: filter facets (string, stored, fast)
//! - `text`: transcription as bigrams with positions (not stored)
//! - `source`: the full document as JSON (stored only)

use bookgram_document::BookText;
use tantivy::{
    TantivyDocument,
    schema::{
        FAST, Field, IndexRecordOption, STORED, STRING, Schema, TextFieldIndexing, TextOptions,
    },
};

use crate::analyzer::BIGRAM_TOKENIZER;

/// Handles to all fields in the index schema.
#[derive(Debug, Clone)]
pub struct IndexSchema {
    /// The underlying Tantivy schema.
    schema: Schema,
    /// Identity key `{bid}_{elevel}_{tags}`.
    pub id: Field,
    /// Book id.
    pub bid: Field,
    /// Content id.
    pub cid: Field,
    /// Reading level name.
    pub elevel: Field,
    /// One value per tag.
    pub tags: Field,
    /// Bigram-indexed transcription.
    pub text: Field,
    /// Serialized document.
    pub source: Field,
}

impl IndexSchema {
    /// Creates the schema with all fields configured.
    pub fn new() -> Self {
        let mut builder = Schema::builder();

        let id = builder.add_text_field("id", STRING | STORED);
        let bid = builder.add_text_field("bid", STRING | STORED | FAST);
        let cid = builder.add_text_field("cid", STRING | STORED);
        let elevel = builder.add_text_field("elevel", STRING | STORED | FAST);
        let tags = builder.add_text_field("tags", STRING | STORED | FAST);

        // Positions let a word's bigrams be matched as a phrase.
        let text_options = TextOptions::default().set_indexing_options(
            TextFieldIndexing::default()
                .set_tokenizer(BIGRAM_TOKENIZER)
                .set_index_option(IndexRecordOption::WithFreqsAndPositions),
        );
        let text = builder.add_text_field("text", text_options);

        let source = builder.add_text_field("source", STORED);

        Self {
            schema: builder.build(),
            id,
            bid,
            cid,
            elevel,
            tags,
            text,
            source,
        }
    }

    /// Returns a reference to the underlying Tantivy schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Builds the tantivy document for `doc` stored under `id`.
    ///
    /// `source` is `doc` already serialized as JSON.
    pub fn document(&self, id: &str, doc: &BookText, source: String) -> TantivyDocument {
        let mut out = TantivyDocument::new();
        out.add_text(self.id, id);
        out.add_text(self.bid, &doc.metadata.bid);
        out.add_text(self.cid, &doc.metadata.cid);
        out.add_text(self.elevel, doc.metadata.elevel.as_str());
        for tag in &doc.metadata.tags {
            out.add_text(self.tags, tag);
        }
        out.add_text(self.text, &doc.text);
        out.add_text(self.source, source);
        out
    }
}

impl Default for IndexSchema {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use tantivy::schema::FieldType;

    use super::*;

    #[test]
    fn facets_are_raw_strings() {
        let schema = IndexSchema::new();
        for (name, field) in [
            ("id", schema.id),
            ("bid", schema.bid),
            ("elevel", schema.elevel),
            ("tags", schema.tags),
        ] {
            let entry = schema.schema().get_field_entry(field);
            assert!(entry.is_indexed(), "{name} should be indexed");
            assert!(entry.is_stored(), "{name} should be stored");
            let FieldType::Str(opts) = entry.field_type() else {
                panic!("{name} should be a text field");
            };
            assert_eq!(opts.get_indexing_options().unwrap().tokenizer(), "raw");
        }
    }

    #[test]
    fn text_is_bigram_indexed_but_not_stored() {
        let schema = IndexSchema::new();
        let entry = schema.schema().get_field_entry(schema.text);
        assert!(entry.is_indexed());
        assert!(!entry.is_stored());
        let FieldType::Str(opts) = entry.field_type() else {
            panic!("text should be a text field");
        };
        let indexing = opts.get_indexing_options().unwrap();
        assert_eq!(indexing.tokenizer(), BIGRAM_TOKENIZER);
        assert_eq!(
            indexing.index_option(),
            IndexRecordOption::WithFreqsAndPositions
        );
    }

    #[test]
    fn source_is_stored_only() {
        let schema = IndexSchema::new();
        let entry = schema.schema().get_field_entry(schema.source);
        assert!(entry.is_stored());
        assert!(!entry.is_indexed());
    }
}

//! In-memory inversion of pre-tokenized documents.
//!
//! Tokenization happens upstream: a document arrives as one token list per field.
//! Token positions run across the fields of a document in field order. The builder
//! accumulates postings per term in memory and, in [`IndexBuilder::build`], assigns
//! term ids in term order, encodes the inverted and direct posting files and derives
//! the lexicon and collection statistics.

use std::sync::Arc;

use ahash::AHashMap;
use quarry_common::{DocId, Result, error::Error};
use quarry_io::memory::shared_buffer;
use serde::{Deserialize, Serialize};

use crate::{
    config::{CompressionConfig, Structure},
    document_index::DocumentIndex,
    index::{FORMAT_VERSION, Index, IndexProperties},
    layout::PostingLayout,
    lexicon::{Lexicon, LexiconEntry},
    posting::Posting,
    statistics::{CollectionStatistics, EntryStatistics},
    write::posting_writer::PostingListWriter,
};

/// A tokenized document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDocument {
    pub docno: String,
    /// Token lists, one per field.
    pub fields: Vec<Vec<String>>,
}

impl IndexDocument {
    /// A document with a single unnamed field.
    pub fn new(docno: impl Into<String>, tokens: &[&str]) -> IndexDocument {
        IndexDocument {
            docno: docno.into(),
            fields: vec![tokens.iter().map(|t| t.to_string()).collect()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexBuilderConfig {
    pub compression: CompressionConfig,
    /// Record token positions.
    pub blocks: bool,
    /// Names of the fields postings count frequencies for; empty disables field
    /// postings and treats all token lists of a document as one text.
    pub field_names: Vec<String>,
    /// Build the document-to-terms (direct) index.
    pub direct: bool,
}

impl Default for IndexBuilderConfig {
    fn default() -> Self {
        IndexBuilderConfig {
            compression: CompressionConfig::default(),
            blocks: true,
            field_names: Vec::new(),
            direct: true,
        }
    }
}

pub struct IndexBuilder {
    config: IndexBuilderConfig,
    layout: PostingLayout,
    documents: DocumentIndex,
    postings: AHashMap<String, Vec<Posting>>,
    tokens: u64,
    field_tokens: Vec<u64>,
}

impl IndexBuilder {
    pub fn new(config: IndexBuilderConfig) -> Result<IndexBuilder> {
        config.compression.validate()?;
        let field_count = config.field_names.len();
        Ok(IndexBuilder {
            layout: PostingLayout::new(config.blocks, field_count),
            documents: DocumentIndex::new(field_count),
            postings: AHashMap::new(),
            tokens: 0,
            field_tokens: vec![0; field_count],
            config,
        })
    }

    pub fn layout(&self) -> PostingLayout {
        self.layout
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Adds the next document and returns its id. Empty tokens are ignored.
    pub fn add_document(&mut self, document: &IndexDocument) -> Result<DocId> {
        let field_count = self.layout.field_count;
        if field_count > 0 && document.fields.len() != field_count {
            return Err(Error::invalid_arg(
                "document",
                format!(
                    "'{}' has {} fields, the index declares {field_count}",
                    document.docno,
                    document.fields.len()
                ),
            ));
        }
        let id = self.documents.len() as DocId;
        if id >= crate::read::END_OF_LIST - 1 {
            return Err(Error::invalid_operation("document id space exhausted"));
        }

        let mut local: AHashMap<&str, Posting> = AHashMap::new();
        let mut field_lengths = vec![0u32; field_count];
        let mut position = 0u32;
        for (field, tokens) in document.fields.iter().enumerate() {
            for token in tokens.iter().filter(|t| !t.is_empty()) {
                let posting = local.entry(token.as_str()).or_insert_with(|| Posting {
                    id,
                    field_frequencies: vec![0; field_count],
                    ..Default::default()
                });
                posting.frequency += 1;
                if self.layout.blocks {
                    posting.positions.push(position);
                }
                if field_count > 0 {
                    posting.field_frequencies[field] += 1;
                    field_lengths[field] += 1;
                }
                position += 1;
            }
        }

        self.tokens += position as u64;
        for (sum, length) in self.field_tokens.iter_mut().zip(&field_lengths) {
            *sum += *length as u64;
        }
        self.documents
            .push(document.docno.clone(), position, &field_lengths);
        for (term, posting) in local {
            match self.postings.get_mut(term) {
                Some(list) => list.push(posting),
                None => {
                    self.postings.insert(term.to_string(), vec![posting]);
                }
            }
        }
        Ok(id)
    }

    /// Encodes the posting files and returns the in-memory index.
    pub fn build(self) -> Result<Index> {
        let IndexBuilder {
            config,
            layout,
            mut documents,
            postings,
            tokens,
            field_tokens,
        } = self;

        let mut terms = postings.into_iter().collect::<Vec<_>>();
        terms.sort_unstable_by(|a, b| a.0.cmp(&b.0));

        let mut inverted = PostingListWriter::new(
            layout,
            config.compression.encoding(Structure::Inverted),
        );
        let mut direct_lists: Vec<Vec<Posting>> = if config.direct {
            vec![Vec::new(); documents.len()]
        } else {
            Vec::new()
        };
        let mut entries = Vec::with_capacity(terms.len());
        let mut number_of_postings = 0u64;

        for (term_id, (term, list)) in terms.into_iter().enumerate() {
            let pointer = inverted.write_list(&list)?;
            let mut statistics = EntryStatistics {
                document_frequency: list.len() as u32,
                field_frequencies: vec![0; layout.field_count],
                ..Default::default()
            };
            for posting in &list {
                statistics.collection_frequency += posting.frequency as u64;
                statistics.max_tf = statistics.max_tf.max(posting.frequency);
                for (sum, tf) in statistics
                    .field_frequencies
                    .iter_mut()
                    .zip(&posting.field_frequencies)
                {
                    *sum += *tf as u64;
                }
            }
            number_of_postings += list.len() as u64;
            if config.direct {
                for posting in list {
                    let doc = posting.id as usize;
                    direct_lists[doc].push(Posting {
                        id: term_id as u32,
                        ..posting
                    });
                }
            }
            entries.push((
                term,
                LexiconEntry {
                    term_id: term_id as u32,
                    statistics,
                    pointer,
                },
            ));
        }

        let direct_bytes = if config.direct {
            let mut direct =
                PostingListWriter::new(layout, config.compression.encoding(Structure::Direct));
            let pointers = direct_lists
                .iter()
                .map(|list| direct.write_list(list))
                .collect::<Result<Vec<_>>>()?;
            documents.set_direct_pointers(pointers);
            Some(direct.finish())
        } else {
            None
        };

        let lexicon = Lexicon::from_entries(entries);
        let statistics = CollectionStatistics {
            number_of_documents: documents.len() as u32,
            number_of_tokens: tokens,
            number_of_unique_terms: lexicon.len() as u32,
            number_of_postings,
            field_names: config.field_names.clone(),
            field_tokens,
        };
        log::info!(
            "built index: {} documents, {} terms, {} postings, {} tokens",
            statistics.number_of_documents,
            statistics.number_of_unique_terms,
            statistics.number_of_postings,
            statistics.number_of_tokens
        );

        let properties = IndexProperties {
            format_version: FORMAT_VERSION,
            layout,
            compression: config.compression,
            statistics,
            has_direct: direct_bytes.is_some(),
        };
        Index::from_parts(
            properties,
            lexicon,
            Arc::new(documents),
            shared_buffer(inverted.finish()),
            direct_bytes.map(shared_buffer),
        )
    }
}

//! Inspect command implementation

use std::path::PathBuf;

use anyhow::{Context, Result};
use quarry_postings::{
    CollectionStatistics, CompressionConfig, END_OF_LIST, Index, PostingIterator, PostingLayout,
};
use serde::Serialize;

use crate::commands::open_index;

#[derive(Serialize)]
struct InspectSummary<'a> {
    format_version: u32,
    layout: PostingLayout,
    has_direct: bool,
    compression: &'a CompressionConfig,
    statistics: &'a CollectionStatistics,
    average_document_length: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    vocabulary: Vec<TermInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    terms: Vec<TermPostings>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    documents: Vec<DocumentTerms>,
}

#[derive(Serialize)]
struct TermInfo {
    term: String,
    document_frequency: u32,
    collection_frequency: u64,
    max_tf: u32,
}

#[derive(Serialize)]
struct TermPostings {
    term: String,
    postings: Vec<PostingInfo>,
}

#[derive(Serialize)]
struct PostingInfo {
    docno: String,
    frequency: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    positions: Vec<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    field_frequencies: Vec<u32>,
}

#[derive(Serialize)]
struct DocumentTerms {
    docno: String,
    length: u32,
    terms: Vec<(String, u32)>,
}

pub fn run(terms: Vec<String>, docs: Vec<String>, verbose: u8, index_path: PathBuf) -> Result<()> {
    let index = open_index(&index_path)?;
    let properties = index.properties();

    let vocabulary = if verbose > 0 {
        index
            .lexicon()
            .iter()
            .map(|(term, entry)| TermInfo {
                term: term.to_string(),
                document_frequency: entry.document_frequency(),
                collection_frequency: entry.collection_frequency(),
                max_tf: entry.statistics.max_tf,
            })
            .collect()
    } else {
        Vec::new()
    };

    let summary = InspectSummary {
        format_version: properties.format_version,
        layout: properties.layout,
        has_direct: properties.has_direct,
        compression: &properties.compression,
        statistics: &properties.statistics,
        average_document_length: properties.statistics.average_document_length(),
        vocabulary,
        terms: terms
            .iter()
            .map(|term| term_postings(&index, term, verbose > 1))
            .collect::<Result<_>>()?,
        documents: docs
            .iter()
            .map(|docno| document_terms(&index, docno))
            .collect::<Result<_>>()?,
    };

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn term_postings(index: &Index, term: &str, with_positions: bool) -> Result<TermPostings> {
    let mut postings = Vec::new();
    if index.lexicon().get(term).is_some() {
        let mut iter = index.term_postings(term)?;
        let documents = index.documents();
        while iter.next()? != END_OF_LIST {
            postings.push(PostingInfo {
                docno: documents.docno(iter.id()).unwrap_or_default().to_string(),
                frequency: iter.frequency(),
                positions: if with_positions {
                    iter.positions().to_vec()
                } else {
                    Vec::new()
                },
                field_frequencies: iter.field_frequencies().to_vec(),
            });
        }
        iter.close();
    }
    Ok(TermPostings {
        term: term.to_string(),
        postings,
    })
}

fn document_terms(index: &Index, docno: &str) -> Result<DocumentTerms> {
    let id = index
        .documents()
        .find_docno(docno)
        .with_context(|| format!("Unknown document '{docno}'"))?;
    let mut iter: Box<dyn PostingIterator> = index.document_terms(id)?;
    let mut terms = Vec::new();
    while iter.next()? != END_OF_LIST {
        let term = index
            .lexicon()
            .by_id(iter.id())
            .map(|(term, _)| term.to_string())
            .with_context(|| format!("Unknown term id {}", iter.id()))?;
        terms.push((term, iter.frequency()));
    }
    Ok(DocumentTerms {
        docno: docno.to_string(),
        length: index.documents().document_length(id),
        terms,
    })
}

//! The per-query set of scored posting lists.

use std::sync::Arc;

use quarry_common::{Result, error::Error};
use quarry_postings::{CollectionStatistics, EntryStatistics, Index, PostingIterator};

use crate::{
    config::MatchingConfig,
    diagnostic::Diagnostic,
    models::{ModelStatistics, WeightingModel, create_model},
    ops::TermResolver,
    query::{MatchingQueryTerms, Requirement},
};

/// Number of terms whose occurrence is tracked per document. Required terms are
/// given bits first, so this also bounds the number of required terms.
pub const MAX_OCCURRENCE_TERMS: usize = 16;

/// One resolved query term with its postings and prepared models.
pub struct ManagedTerm {
    /// Display form of the query term.
    pub label: String,
    pub key_frequency: f64,
    pub requirement: Requirement,
    pub tag: Option<String>,
    pub statistics: EntryStatistics,
    pub postings: Box<dyn PostingIterator>,
    pub models: Vec<Box<dyn WeightingModel>>,
    /// Bit recorded for documents this term matches; zero when untracked.
    pub occurrence: u16,
}

impl ManagedTerm {
    /// Sum of every model's contribution for the current posting. A model yielding
    /// NaN contributes nothing; only negative infinity removes a document.
    pub fn score(&self) -> f64 {
        self.models
            .iter()
            .map(|model| model.score_posting(self.postings.as_ref()))
            .filter(|score| !score.is_nan())
            .sum()
    }
}

/// Opens one posting iterator per effective query term and attaches its models.
///
/// Terms that resolve to nothing are dropped with a diagnostic. The surviving terms
/// keep their query order, which is also the order scores are summed in.
pub struct PostingListManager {
    query_id: String,
    terms: Vec<ManagedTerm>,
    collection: Arc<CollectionStatistics>,
    diagnostics: Vec<Diagnostic>,
    /// A required term resolved to nothing, so no document can match.
    unsatisfiable: bool,
}

impl PostingListManager {
    pub fn new(
        index: &Index,
        query: &MatchingQueryTerms,
        config: &MatchingConfig,
    ) -> Result<PostingListManager> {
        let collection = Arc::new(index.collection_statistics().clone());
        let default_model = create_model(&config.model)?;
        let mut resolver = TermResolver::new(index, config);
        let mut terms = Vec::with_capacity(query.len());
        let mut unsatisfiable = false;
        let mut required_terms = 0;

        for term in query.iter() {
            let Some(resolved) = resolver.resolve(&term.term)? else {
                if term.requirement == Requirement::Required {
                    resolver.record(Diagnostic::RequiredTermMissing {
                        term: term.term.to_string(),
                    });
                    unsatisfiable = true;
                }
                continue;
            };
            if term.requirement == Requirement::Required {
                if required_terms == MAX_OCCURRENCE_TERMS {
                    return Err(Error::unsupported_query(format!(
                        "required term '{}': at most {MAX_OCCURRENCE_TERMS} required terms",
                        term.term
                    )));
                }
                required_terms += 1;
            }
            let number_of_documents = collection.number_of_documents;
            if resolved.statistics.document_frequency > number_of_documents {
                resolver.record(Diagnostic::DocumentFrequencyCapped {
                    term: term.term.to_string(),
                    document_frequency: resolved.statistics.document_frequency,
                    number_of_documents,
                });
            }

            let mut models = if term.models.is_empty() {
                vec![default_model.clone()]
            } else {
                term.models.clone()
            };
            let statistics = ModelStatistics::new(
                term.key_frequency,
                &resolved.statistics,
                collection.clone(),
            );
            for model in models.iter_mut() {
                model.prepare(&statistics)?;
            }
            terms.push(ManagedTerm {
                label: term.term.to_string(),
                key_frequency: term.key_frequency,
                requirement: term.requirement,
                tag: term.tag.clone(),
                statistics: resolved.statistics,
                postings: resolved.postings,
                models,
                occurrence: 0,
            });
        }
        assign_occurrence_bits(&mut terms);

        log::debug!(
            "query {}: {} of {} terms resolved",
            query.query_id,
            terms.len(),
            query.len()
        );
        Ok(PostingListManager {
            query_id: query.query_id.clone(),
            terms,
            collection,
            diagnostics: resolver.into_diagnostics(),
            unsatisfiable,
        })
    }

    pub fn query_id(&self) -> &str {
        &self.query_id
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn is_unsatisfiable(&self) -> bool {
        self.unsatisfiable
    }

    pub fn terms(&self) -> &[ManagedTerm] {
        &self.terms
    }

    pub fn terms_mut(&mut self) -> &mut [ManagedTerm] {
        &mut self.terms
    }

    pub fn term(&self, i: usize) -> &ManagedTerm {
        &self.terms[i]
    }

    pub fn score(&self, i: usize) -> f64 {
        self.terms[i].score()
    }

    pub fn collection(&self) -> &CollectionStatistics {
        &self.collection
    }

    pub fn number_of_documents(&self) -> u32 {
        self.collection.number_of_documents
    }

    /// Occurrence bits of the required terms.
    pub fn required_mask(&self) -> u16 {
        self.terms
            .iter()
            .filter(|term| term.requirement == Requirement::Required)
            .fold(0, |mask, term| mask | term.occurrence)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Closes every posting iterator and returns the collected diagnostics.
    pub fn close(mut self) -> Vec<Diagnostic> {
        for term in self.terms.iter_mut() {
            term.postings.close();
        }
        self.diagnostics
    }
}

/// Required terms take the low bits in query order, optional terms the remaining
/// ones. Excluded terms and optional terms past the tracked count get none.
fn assign_occurrence_bits(terms: &mut [ManagedTerm]) {
    let mut next = 0;
    for requirement in [Requirement::Required, Requirement::Optional] {
        for term in terms.iter_mut().filter(|t| t.requirement == requirement) {
            if next < MAX_OCCURRENCE_TERMS {
                term.occurrence = 1 << next;
                next += 1;
            }
        }
    }
}

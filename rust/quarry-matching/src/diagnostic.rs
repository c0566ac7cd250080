use std::fmt;

use serde::Serialize;

/// A recoverable condition met while resolving or matching one query.
///
/// Diagnostics never fail a query; they are logged when raised and kept on the
/// result set so callers can report them per query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A term absent from the vocabulary was dropped.
    TermNotFound { term: String },
    /// A field restriction names a field the index does not have.
    FieldNotFound { term: String, field: String },
    /// A term's document frequency exceeds the guard threshold; it was dropped.
    DocumentFrequencyGuard {
        term: String,
        document_frequency: u32,
        number_of_documents: u32,
    },
    /// Summed synonym statistics claim more documents than the collection holds;
    /// models score the term as if it occurred in every document.
    DocumentFrequencyCapped {
        term: String,
        document_frequency: u32,
        number_of_documents: u32,
    },
    /// Every child of an operator was dropped.
    OperatorDropped { term: String },
    /// A required term resolved to nothing, so no document can match.
    RequiredTermMissing { term: String },
    /// Term-at-a-time matching ran on a collection above the configured limit.
    LargeCollection {
        number_of_documents: u32,
        limit: u32,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::TermNotFound { term } => write!(f, "term '{term}' not found"),
            Diagnostic::FieldNotFound { term, field } => {
                write!(f, "term '{term}': index has no field '{field}'")
            }
            Diagnostic::DocumentFrequencyGuard {
                term,
                document_frequency,
                number_of_documents,
            } => write!(
                f,
                "term '{term}' dropped: document frequency {document_frequency} \
                 exceeds collection of {number_of_documents} documents"
            ),
            Diagnostic::DocumentFrequencyCapped {
                term,
                document_frequency,
                number_of_documents,
            } => write!(
                f,
                "term '{term}': document frequency {document_frequency} \
                 capped at {number_of_documents} documents"
            ),
            Diagnostic::OperatorDropped { term } => {
                write!(f, "operator '{term}' dropped: no child term found")
            }
            Diagnostic::RequiredTermMissing { term } => {
                write!(f, "required term '{term}' not found; no document can match")
            }
            Diagnostic::LargeCollection {
                number_of_documents,
                limit,
            } => write!(
                f,
                "term-at-a-time matching over {number_of_documents} documents \
                 (limit {limit})"
            ),
        }
    }
}

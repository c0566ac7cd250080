//! Resolution of query term trees to merged statistics and posting iterators.

use quarry_common::{Result, error::Error};
use quarry_postings::{
    END_OF_LIST, EntryStatistics, Index, LexiconEntry, PostingIterator,
    read::FieldOnlyPostingIterator,
};

use super::{AndIterator, OrIterator, PositionFilter};
use crate::{
    config::MatchingConfig,
    diagnostic::Diagnostic,
    query::{Operator, QueryTerm, SingleTerm},
};

/// Statistics and postings of a query term, ready to be scored like a single term.
pub struct ResolvedTerm {
    pub statistics: EntryStatistics,
    pub postings: Box<dyn PostingIterator>,
}

/// A vocabulary term that passed lookup and the document frequency guard.
struct Leaf {
    entry: LexiconEntry,
    field: Option<usize>,
    statistics: EntryStatistics,
}

/// Resolves the terms of one query against an index, collecting diagnostics.
pub struct TermResolver<'a> {
    index: &'a Index,
    config: &'a MatchingConfig,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> TermResolver<'a> {
    pub fn new(index: &'a Index, config: &'a MatchingConfig) -> TermResolver<'a> {
        TermResolver {
            index,
            config,
            diagnostics: Vec::new(),
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub(crate) fn record(&mut self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::TermNotFound { .. } | Diagnostic::OperatorDropped { .. } => {
                log::debug!("{diagnostic}")
            }
            _ => log::warn!("{diagnostic}"),
        }
        self.diagnostics.push(diagnostic);
    }

    /// Resolves `term`, or returns `None` when nothing of it is in the index.
    ///
    /// Missing leaves of an operator are dropped; an operator left with one child
    /// resolves to that child alone. Nested operators and positional operators on
    /// an index without positions are errors.
    pub fn resolve(&mut self, term: &QueryTerm) -> Result<Option<ResolvedTerm>> {
        match term {
            QueryTerm::Single(single) => match self.leaf(single) {
                Some(leaf) => Ok(Some(ResolvedTerm {
                    postings: self.open(&leaf)?,
                    statistics: leaf.statistics,
                })),
                None => Ok(None),
            },
            QueryTerm::Compound { operator, children } => {
                self.resolve_compound(term, *operator, children)
            }
        }
    }

    fn resolve_compound(
        &mut self,
        term: &QueryTerm,
        operator: Operator,
        children: &[QueryTerm],
    ) -> Result<Option<ResolvedTerm>> {
        if operator.needs_positions() && !self.index.layout().blocks {
            return Err(Error::unsupported_query(format!(
                "'{term}' needs an index with positions"
            )));
        }
        let mut leaves = Vec::with_capacity(children.len());
        for child in children {
            let QueryTerm::Single(single) = child else {
                return Err(Error::unsupported_query(format!(
                    "nested operator '{child}' in '{term}'"
                )));
            };
            leaves.extend(self.leaf(single));
        }

        match leaves.len() {
            0 => {
                self.record(Diagnostic::OperatorDropped {
                    term: term.to_string(),
                });
                return Ok(None);
            }
            1 => {
                let leaf = leaves.remove(0);
                return Ok(Some(ResolvedTerm {
                    postings: self.open(&leaf)?,
                    statistics: leaf.statistics,
                }));
            }
            _ => {}
        }

        let filter = match operator {
            Operator::Synonym => {
                let mut statistics = EntryStatistics::default();
                for leaf in &leaves {
                    statistics.add(&leaf.statistics);
                }
                let postings = OrIterator::new(self.open_all(&leaves)?);
                return Ok(Some(ResolvedTerm {
                    statistics,
                    postings: Box::new(postings),
                }));
            }
            Operator::And => PositionFilter::None,
            Operator::Phrase { gap } => PositionFilter::Phrase { gap },
            Operator::Window { distance } => PositionFilter::Window { distance },
        };

        // Operator statistics are those of the matching documents, which are only
        // known after one pass over the intersection.
        let mut counting = AndIterator::new(self.open_all(&leaves)?, filter, None);
        let mut statistics = EntryStatistics::default();
        while counting.next()? != END_OF_LIST {
            let tf = counting.frequency();
            statistics.document_frequency += 1;
            statistics.collection_frequency += tf as u64;
            statistics.max_tf = statistics.max_tf.max(tf);
        }
        counting.close();
        log::debug!(
            "{term}: {} documents, {} occurrences",
            statistics.document_frequency,
            statistics.collection_frequency
        );

        let postings = AndIterator::new(
            self.open_all(&leaves)?,
            filter,
            Some(statistics.document_frequency),
        );
        Ok(Some(ResolvedTerm {
            statistics,
            postings: Box::new(postings),
        }))
    }

    fn leaf(&mut self, term: &SingleTerm) -> Option<Leaf> {
        let index = self.index;
        let Some(entry) = index.lexicon().get(&term.term) else {
            self.record(Diagnostic::TermNotFound {
                term: term.to_string(),
            });
            return None;
        };
        let collection = index.collection_statistics();
        let mut statistics = entry.statistics.clone();

        let field = match &term.field {
            Some(name) => match collection.field_index(name) {
                Some(field) => {
                    statistics.collection_frequency = statistics.field_frequency(field);
                    Some(field)
                }
                None => {
                    self.record(Diagnostic::FieldNotFound {
                        term: term.to_string(),
                        field: name.clone(),
                    });
                    return None;
                }
            },
            None => None,
        };

        let number_of_documents = collection.number_of_documents;
        if statistics.document_frequency as f64
            > self.config.document_frequency_limit(number_of_documents)
        {
            self.record(Diagnostic::DocumentFrequencyGuard {
                term: term.to_string(),
                document_frequency: statistics.document_frequency,
                number_of_documents,
            });
            return None;
        }

        Some(Leaf {
            entry: entry.clone(),
            field,
            statistics,
        })
    }

    fn open(&self, leaf: &Leaf) -> Result<Box<dyn PostingIterator>> {
        let postings = self.index.postings(&leaf.entry)?;
        Ok(match leaf.field {
            Some(field) => Box::new(FieldOnlyPostingIterator::new(postings, field)),
            None => postings,
        })
    }

    fn open_all(&self, leaves: &[Leaf]) -> Result<Vec<Box<dyn PostingIterator>>> {
        leaves.iter().map(|leaf| self.open(leaf)).collect()
    }
}

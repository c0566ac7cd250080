use quarry_common::Result;
use quarry_postings::END_OF_LIST;

use super::{Matching, trivial_result};
use crate::{
    config::MatchingConfig,
    diagnostic::Diagnostic,
    manager::PostingListManager,
    query::Requirement,
    result::{Accumulator, ResultSet},
};

/// Term-at-a-time matching.
///
/// Each term's list is walked to the end, adding its contributions to a per-query
/// [`Accumulator`]. Required terms are then enforced through the occurrence bits and
/// excluded terms set the documents they contain to negative infinity. Memory grows
/// with the number of matching documents.
pub struct TaatMatching {
    config: MatchingConfig,
}

impl TaatMatching {
    pub fn new(config: MatchingConfig) -> TaatMatching {
        TaatMatching { config }
    }
}

impl Matching for TaatMatching {
    fn name(&self) -> &'static str {
        "taat"
    }

    fn match_terms(&self, manager: PostingListManager) -> Result<ResultSet> {
        let mut manager = match trivial_result(manager, &self.config) {
            Ok(result) => return Ok(result),
            Err(manager) => manager,
        };
        let number_of_documents = manager.number_of_documents();
        let limit = self.config.taat_document_limit;
        if number_of_documents > limit {
            let diagnostic = Diagnostic::LargeCollection {
                number_of_documents,
                limit,
            };
            log::warn!("query {}: {diagnostic}", manager.query_id());
            manager.push_diagnostic(diagnostic);
        }

        let required = manager.required_mask();
        let mut accumulator = Accumulator::new();
        for term in manager.terms_mut().iter_mut() {
            if term.requirement == Requirement::Excluded {
                continue;
            }
            while term.postings.next()? != END_OF_LIST {
                accumulator.add_score(term.postings.id(), term.score(), term.occurrence);
            }
        }
        accumulator.require(required);
        for term in manager.terms_mut().iter_mut() {
            if term.requirement != Requirement::Excluded {
                continue;
            }
            while term.postings.next()? != END_OF_LIST {
                accumulator.exclude(term.postings.id());
            }
        }

        log::trace!(
            "query {}: {} accumulators, {} retrieved",
            manager.query_id(),
            accumulator.len(),
            accumulator.retrieved()
        );
        let query_id = manager.query_id().to_string();
        let diagnostics = manager.close();
        Ok(accumulator
            .finalize(query_id, self.config.result_set_size)
            .with_diagnostics(diagnostics))
    }
}

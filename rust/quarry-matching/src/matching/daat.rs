use std::{cmp::Reverse, collections::BinaryHeap};

use ordered_float::OrderedFloat;
use quarry_common::{DocId, Result};
use quarry_postings::END_OF_LIST;

use super::{Matching, trivial_result};
use crate::{
    config::MatchingConfig, manager::PostingListManager, query::Requirement, result::ResultSet,
};

/// Heap entry ordered from worst to best: lower score first, then higher document id.
type Candidate = Reverse<(OrderedFloat<f64>, Reverse<DocId>, u16)>;

/// Document-at-a-time matching.
///
/// All term iterators advance together; each document is scored completely as soon
/// as it is the smallest current id, then offered to a bounded top-k heap. Memory is
/// bounded by the result set size.
pub struct DaatMatching {
    config: MatchingConfig,
}

impl DaatMatching {
    pub fn new(config: MatchingConfig) -> DaatMatching {
        DaatMatching { config }
    }
}

impl Matching for DaatMatching {
    fn name(&self) -> &'static str {
        "daat"
    }

    fn match_terms(&self, manager: PostingListManager) -> Result<ResultSet> {
        let mut manager = match trivial_result(manager, &self.config) {
            Ok(result) => return Ok(result),
            Err(manager) => manager,
        };
        let required = manager.required_mask();
        let (excluded, candidates): (Vec<usize>, Vec<usize>) = (0..manager.len())
            .partition(|&i| manager.term(i).requirement == Requirement::Excluded);

        for &i in &candidates {
            manager.terms_mut()[i].postings.next()?;
        }

        let limit = self.config.result_set_size;
        let mut heap: BinaryHeap<Candidate> = BinaryHeap::new();
        let mut exact_result_size = 0;
        loop {
            let doc = candidates
                .iter()
                .map(|&i| manager.term(i).postings.id())
                .min()
                .unwrap_or(END_OF_LIST);
            if doc == END_OF_LIST {
                break;
            }

            let mut score = 0.0;
            let mut occurrence = 0u16;
            for &i in &candidates {
                let term = manager.term(i);
                if term.postings.id() == doc {
                    score += term.score();
                    occurrence |= term.occurrence;
                }
            }

            let mut accepted = occurrence & required == required;
            if accepted {
                for &i in &excluded {
                    if manager.terms_mut()[i].postings.next_target(doc)? == doc {
                        accepted = false;
                        break;
                    }
                }
            }
            if accepted && score.is_finite() {
                exact_result_size += 1;
                heap.push(Reverse((OrderedFloat(score), Reverse(doc), occurrence)));
                if limit > 0 && heap.len() > limit {
                    heap.pop();
                }
            }

            for &i in &candidates {
                let postings = &mut manager.terms_mut()[i].postings;
                if postings.id() == doc {
                    postings.next()?;
                }
            }
        }

        let query_id = manager.query_id().to_string();
        let diagnostics = manager.close();
        let matches = heap
            .into_iter()
            .map(|Reverse((score, Reverse(doc), occurrence))| (doc, score.0, occurrence))
            .collect();
        Ok(ResultSet::from_matches(query_id, matches, exact_result_size, limit)
            .with_diagnostics(diagnostics))
    }
}

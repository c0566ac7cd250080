//! Matching engines: traverse the posting lists of a [`PostingListManager`] and
//! produce a [`ResultSet`].

use quarry_common::Result;

use crate::{
    config::{MatchingConfig, Strategy},
    manager::PostingListManager,
    result::ResultSet,
};

pub mod daat;
pub mod taat;

pub use daat::DaatMatching;
pub use taat::TaatMatching;

/// A traversal strategy over the terms of one query.
pub trait Matching: Send + Sync {
    fn name(&self) -> &'static str;

    /// Matches the query, consuming the manager and its iterators.
    fn match_terms(&self, manager: PostingListManager) -> Result<ResultSet>;
}

pub fn create_matching(config: &MatchingConfig) -> Box<dyn Matching> {
    match config.strategy {
        Strategy::Daat => Box::new(DaatMatching::new(config.clone())),
        Strategy::Taat => Box::new(TaatMatching::new(config.clone())),
    }
}

/// Result of a query that has nothing to traverse, if that is the case.
///
/// A query with an unresolvable required term matches nothing. A query left with no
/// terms matches the whole collection under `match_empty_query`, nothing otherwise.
fn trivial_result(
    manager: PostingListManager,
    config: &MatchingConfig,
) -> std::result::Result<ResultSet, PostingListManager> {
    if !manager.is_unsatisfiable() && !manager.is_empty() {
        return Err(manager);
    }
    let query_id = manager.query_id().to_string();
    let number_of_documents = manager.number_of_documents();
    let empty_query = manager.is_empty() && !manager.is_unsatisfiable();
    let diagnostics = manager.close();
    let result = if empty_query && config.match_empty_query {
        log::debug!("query {query_id}: empty query matches all {number_of_documents} documents");
        ResultSet::all_documents(query_id, number_of_documents)
    } else {
        ResultSet::empty(query_id)
    };
    Ok(result.with_diagnostics(diagnostics))
}

use std::sync::Arc;

use quarry_common::Result;
use quarry_postings::Index;

use crate::{
    config::MatchingConfig,
    manager::PostingListManager,
    matching::{Matching, create_matching},
    query::{MatchingQueryTerms, parse_query},
    result::ResultSet,
};

/// Runs queries against one index: parse, resolve, match.
///
/// A searcher is shared by every query of an index; each call builds its own
/// posting list manager, so calls may run concurrently.
pub struct Searcher {
    index: Arc<Index>,
    config: MatchingConfig,
    matching: Box<dyn Matching>,
}

impl Searcher {
    pub fn new(index: Arc<Index>, config: MatchingConfig) -> Result<Searcher> {
        config.validate()?;
        let matching = create_matching(&config);
        Ok(Searcher {
            index,
            config,
            matching,
        })
    }

    pub fn index(&self) -> &Arc<Index> {
        &self.index
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Parses `text` and matches it.
    pub fn search(&self, query_id: &str, text: &str) -> Result<ResultSet> {
        let query = parse_query(query_id, text)?;
        self.search_terms(&query)
    }

    pub fn search_terms(&self, query: &MatchingQueryTerms) -> Result<ResultSet> {
        let manager = PostingListManager::new(&self.index, query, &self.config)?;
        let result = self.matching.match_terms(manager)?;
        log::debug!(
            "query {} ({}): {} of {} documents returned",
            query.query_id,
            self.matching.name(),
            result.len(),
            result.exact_result_size
        );
        Ok(result)
    }
}

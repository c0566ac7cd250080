//! Query matching: query term trees, merge operators, weighting models and the
//! term-at-a-time and document-at-a-time matching engines.
//!
//! ```
//! use std::sync::Arc;
//!
//! use quarry_matching::{MatchingConfig, Searcher};
//! use quarry_postings::{IndexBuilder, IndexBuilderConfig, IndexDocument};
//!
//! let mut builder = IndexBuilder::new(IndexBuilderConfig::default()).unwrap();
//! builder.add_document(&IndexDocument::new("d0", &["quick", "brown", "fox"])).unwrap();
//! builder.add_document(&IndexDocument::new("d1", &["lazy", "dog"])).unwrap();
//! let index = Arc::new(builder.build().unwrap());
//!
//! let searcher = Searcher::new(index, MatchingConfig::default()).unwrap();
//! let result = searcher.search("q1", "fox").unwrap();
//! assert_eq!(result.doc_ids, vec![0]);
//! ```

pub mod config;
pub mod diagnostic;
pub mod manager;
pub mod matching;
pub mod models;
pub mod ops;
pub mod query;
pub mod result;
pub mod searcher;

pub use config::{MatchingConfig, Strategy};
pub use diagnostic::Diagnostic;
pub use manager::PostingListManager;
pub use matching::{DaatMatching, Matching, TaatMatching};
pub use models::{WeightingModel, create_model};
pub use query::{MatchingQueryTerms, MatchingTerm, QueryTerm, Requirement, parse_query};
pub use result::{Accumulator, ResultSet};
pub use searcher::Searcher;

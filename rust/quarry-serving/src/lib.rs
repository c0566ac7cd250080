//! Parallel query serving.
//!
//! A [`QueryPool`] runs each query of a batch as its own task on a bounded worker
//! pool. A [`BatchRunner`] drives a whole batch through the pool, streaming finished
//! result sets into a shared [`ResultSink`] and reporting failures per query.

pub mod batch;
pub mod config;
pub mod pool;
pub mod sink;

pub use batch::{BatchReport, BatchRunner, QueryFailure};
pub use config::ServingConfig;
pub use pool::QueryPool;
pub use sink::{ResultSink, TrecSink};

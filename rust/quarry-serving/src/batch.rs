use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use quarry_common::Result;
use quarry_matching::Searcher;

use crate::{config::ServingConfig, pool::QueryPool, sink::ResultSink};

/// A query of a batch that produced no output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryFailure {
    pub query_id: String,
    pub message: String,
}

/// Outcome of [`BatchRunner::run`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub submitted: usize,
    pub completed: usize,
    /// Result lines written to the sink over all completed queries.
    pub documents_returned: usize,
    pub failures: Vec<QueryFailure>,
    /// Queries still running when the shutdown timeout expired.
    pub timed_out: Vec<String>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.timed_out.is_empty()
    }
}

/// Runs batches of queries through a [`QueryPool`] into one [`ResultSink`].
///
/// Each worker writes its own result set to the sink as soon as the query finishes.
/// Once every query is submitted the runner waits, up to the shutdown timeout, for
/// the queries still in flight, then flushes the sink.
pub struct BatchRunner {
    pool: QueryPool,
    sink: Arc<dyn ResultSink>,
    shutdown_timeout: Duration,
}

impl BatchRunner {
    pub fn new(
        searcher: Arc<Searcher>,
        sink: Arc<dyn ResultSink>,
        config: &ServingConfig,
    ) -> Result<BatchRunner> {
        Ok(BatchRunner {
            pool: QueryPool::new(searcher, config)?,
            sink,
            shutdown_timeout: config.shutdown_timeout(),
        })
    }

    pub fn pool(&self) -> &QueryPool {
        &self.pool
    }

    pub fn run<I, Q, T>(&self, queries: I) -> Result<BatchReport>
    where
        I: IntoIterator<Item = (Q, T)>,
        Q: Into<String>,
        T: Into<String>,
    {
        let started = Instant::now();
        let handles = queries
            .into_iter()
            .map(|(query_id, text)| {
                let sink = self.sink.clone();
                self.pool.execute(query_id, text, move |searcher, result| {
                    sink.write(searcher.index().documents(), &result)?;
                    Ok(result.len())
                })
            })
            .collect::<Vec<_>>();
        log::info!(
            "batch of {} queries submitted to {} workers",
            handles.len(),
            self.pool.workers()
        );

        let mut report = BatchReport {
            submitted: handles.len(),
            ..Default::default()
        };
        let deadline = Instant::now() + self.shutdown_timeout;
        for handle in handles {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match handle.join_timeout(remaining) {
                Some(Ok(returned)) => {
                    report.completed += 1;
                    report.documents_returned += returned;
                }
                Some(Err(e)) => {
                    log::warn!("query {} failed: {e}", handle.query_id());
                    report.failures.push(QueryFailure {
                        query_id: handle.query_id().to_string(),
                        message: e.to_string(),
                    });
                }
                None => {
                    log::warn!(
                        "query {} still running after the shutdown timeout",
                        handle.query_id()
                    );
                    report.timed_out.push(handle.query_id().to_string());
                }
            }
        }
        self.sink.flush()?;

        log::info!(
            "batch finished in {:?}: {} completed, {} failed, {} timed out",
            started.elapsed(),
            report.completed,
            report.failures.len(),
            report.timed_out.len()
        );
        Ok(report)
    }
}

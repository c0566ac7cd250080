use std::{sync::Arc, time::Duration};

use quarry_common::{Result, error::Error};
use quarry_matching::{ResultSet, Searcher};
use quarry_workflow::{JoinError, JoinHandle, WorkerPool};

use crate::config::ServingConfig;

/// Evaluates queries concurrently against one searcher.
pub struct QueryPool {
    searcher: Arc<Searcher>,
    workers: WorkerPool,
}

impl QueryPool {
    pub fn new(searcher: Arc<Searcher>, config: &ServingConfig) -> Result<QueryPool> {
        config.validate()?;
        let workers = WorkerPool::new(config.workers, "quarry-query")
            .map_err(|e| Error::io("query worker pool", e))?;
        Ok(QueryPool { searcher, workers })
    }

    pub fn searcher(&self) -> &Arc<Searcher> {
        &self.searcher
    }

    pub fn workers(&self) -> usize {
        self.workers.workers()
    }

    /// Queues one query. The handle resolves to its result set or to the error that
    /// stopped it, including a panic inside the query.
    pub fn submit(&self, query_id: impl Into<String>, text: impl Into<String>) -> QueryHandle<ResultSet> {
        self.execute(query_id, text, |_, result| Ok(result))
    }

    /// Queues one query and runs `then` on its result set on the same worker.
    pub fn execute<F, R>(
        &self,
        query_id: impl Into<String>,
        text: impl Into<String>,
        then: F,
    ) -> QueryHandle<R>
    where
        F: FnOnce(&Searcher, ResultSet) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let query_id = query_id.into();
        let text = text.into();
        let searcher = self.searcher.clone();
        let id = query_id.clone();
        let inner = self.workers.spawn(move || {
            let result = searcher.search(&id, &text)?;
            then(&searcher, result)
        });
        QueryHandle { query_id, inner }
    }
}

/// Pending outcome of one submitted query.
pub struct QueryHandle<R> {
    query_id: String,
    inner: JoinHandle<Result<R>>,
}

impl<R> QueryHandle<R> {
    pub fn query_id(&self) -> &str {
        &self.query_id
    }

    pub fn is_ready(&self) -> bool {
        self.inner.is_ready()
    }

    pub fn join(self) -> Result<R> {
        let res = self.inner.join();
        flatten(&self.query_id, res)
    }

    /// Waits at most `timeout`; `None` means the query is still running.
    pub fn join_timeout(&self, timeout: Duration) -> Option<Result<R>> {
        self.inner
            .join_timeout(timeout)
            .map(|res| flatten(&self.query_id, res))
    }
}

fn flatten<R>(query_id: &str, res: std::result::Result<Result<R>, JoinError>) -> Result<R> {
    res.map_err(|e| Error::invalid_operation(format!("query {query_id}: {e}")))?
}

#[cfg(test)]
mod tests {
    use quarry_matching::MatchingConfig;
    use quarry_postings::{IndexBuilder, IndexBuilderConfig, IndexDocument};

    use super::*;

    fn pool(workers: usize) -> QueryPool {
        let mut builder = IndexBuilder::new(IndexBuilderConfig::default()).unwrap();
        builder
            .add_document(&IndexDocument::new("d0", &["apple", "pear"]))
            .unwrap();
        builder
            .add_document(&IndexDocument::new("d1", &["pear", "plum"]))
            .unwrap();
        let searcher = Searcher::new(Arc::new(builder.build().unwrap()), MatchingConfig::default())
            .unwrap();
        QueryPool::new(Arc::new(searcher), &ServingConfig::default().with_workers(workers)).unwrap()
    }

    #[test]
    fn test_submit() {
        let pool = pool(3);
        assert_eq!(pool.workers(), 3);
        let handles = ["apple", "pear", "plum", "kiwi"]
            .iter()
            .enumerate()
            .map(|(i, text)| pool.submit(format!("q{i}"), *text))
            .collect::<Vec<_>>();
        let sizes = handles
            .into_iter()
            .map(|h| h.join().unwrap().len())
            .collect::<Vec<_>>();
        assert_eq!(sizes, [1, 2, 1, 0]);
    }

    #[test]
    fn test_errors_stay_per_query() {
        let pool = pool(2);
        let bad = pool.submit("bad", "#syn(apple");
        let panicking = pool.execute("boom", "apple", |_, _| -> Result<()> { panic!("sink exploded") });
        let good = pool.submit("good", "pear");
        assert_eq!(bad.query_id(), "bad");
        assert!(bad.join().unwrap_err().is_unsupported_query());
        let err = panicking.join().unwrap_err();
        assert!(err.to_string().contains("sink exploded"), "{err}");
        assert_eq!(good.join().unwrap().len(), 2);
    }
}

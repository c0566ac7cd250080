//! Fixed-size pool of named worker threads.

use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
};

use crate::{
    join_handle::{JoinError, JoinHandle},
    oneshot,
};

/// Runs submitted closures on a fixed number of threads.
///
/// Tasks are isolated from each other: a panic inside one task is caught and reported
/// through that task's [`JoinHandle`] while the remaining tasks keep running.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    workers: usize,
}

impl WorkerPool {
    /// Creates a pool of `workers` threads named `{name}-{index}`.
    pub fn new(workers: usize, name: &str) -> std::io::Result<WorkerPool> {
        if workers == 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "worker pool needs at least one thread",
            ));
        }
        let prefix = name.to_string();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(move |i| format!("{prefix}-{i}"))
            .build()
            .map_err(std::io::Error::other)?;
        log::debug!("started worker pool '{name}' with {workers} threads");
        Ok(WorkerPool { pool, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Queues `f` and returns a handle to its result.
    pub fn spawn<F, R>(&self, f: F) -> JoinHandle<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        self.pool.spawn(move || {
            let res = panic::catch_unwind(AssertUnwindSafe(f))
                .map_err(|payload| JoinError::Panicked(panic_message(payload.as_ref())));
            if let Err(JoinError::Panicked(message)) = &res {
                log::warn!("task panicked: {message}");
            }
            // The receiver may already be gone; nothing to report then.
            let _ = tx.send(res);
        });
        JoinHandle::new(rx)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

//! Handles for waiting on the outcome of a spawned task.

use std::time::Duration;

use thiserror::Error;

use crate::oneshot::{self, OneshotReceiver};

/// Why a task produced no value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinError {
    #[error("task panicked: {0}")]
    Panicked(String),
    #[error("task was dropped before completing")]
    Disconnected,
}

/// Receives the result of one task submitted to a [`WorkerPool`](crate::WorkerPool).
///
/// The handle starts out pending, becomes ready once the task finishes (or panics),
/// and is consumed by [`join`](Self::join).
pub struct JoinHandle<R>(OneshotReceiver<Result<R, JoinError>>);

impl<R> JoinHandle<R> {
    pub(crate) fn new(rx: OneshotReceiver<Result<R, JoinError>>) -> JoinHandle<R> {
        JoinHandle(rx)
    }

    /// A handle that is already resolved with `value`.
    pub fn ready(value: R) -> Self {
        JoinHandle(oneshot::ready(Ok(value)))
    }

    pub fn is_ready(&self) -> bool {
        !self.0.is_pending()
    }

    /// Blocks until the task finishes.
    pub fn join(self) -> Result<R, JoinError> {
        self.0.recv().unwrap_or(Err(JoinError::Disconnected))
    }

    /// Blocks for at most `timeout`. Returns `None` if the task is still running; the
    /// handle stays usable in that case.
    pub fn join_timeout(&self, timeout: Duration) -> Option<Result<R, JoinError>> {
        match self.0.recv_timeout(timeout) {
            Ok(Some(res)) => Some(res),
            Ok(None) => Some(Err(JoinError::Disconnected)),
            Err(()) => None,
        }
    }

    /// Joins every handle in submission order.
    pub fn join_all(handles: impl IntoIterator<Item = JoinHandle<R>>) -> Vec<Result<R, JoinError>> {
        handles.into_iter().map(JoinHandle::join).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_handle() {
        let handle = JoinHandle::ready(5);
        assert!(handle.is_ready());
        assert_eq!(handle.join(), Ok(5));
    }

    #[test]
    fn test_dropped_task() {
        let (tx, rx) = oneshot::channel::<Result<u32, JoinError>>();
        let handle = JoinHandle::new(rx);
        assert!(!handle.is_ready());
        assert_eq!(handle.join_timeout(Duration::from_millis(1)), None);
        drop(tx);
        assert_eq!(
            handle.join_timeout(Duration::from_millis(1)),
            Some(Err(JoinError::Disconnected))
        );
    }
}

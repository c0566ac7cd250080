//! Task execution primitives for running independent queries concurrently.
//!
//! A [`WorkerPool`] runs closures on a fixed set of named threads and hands back a
//! [`JoinHandle`] per task. A task that panics resolves its handle with
//! [`JoinError::Panicked`] instead of tearing down the pool or the caller.

pub mod join_handle;
pub mod oneshot;
pub mod worker_pool;

pub use join_handle::{JoinError, JoinHandle};
pub use worker_pool::WorkerPool;

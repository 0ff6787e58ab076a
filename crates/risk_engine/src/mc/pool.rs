//! Bounded worker pool for CPU-bound simulation work.
//!
//! Jobs run on a long-lived `rayon` pool; the async caller awaits a
//! `tokio` oneshot reply under a single timeout. A timed-out job keeps
//! running on its worker and its reply is discarded.

use crate::error::RiskError;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;
use tokio::sync::oneshot;

/// Fixed-size pool of simulation workers.
pub struct WorkerPool {
    pool: ThreadPool,
}

impl WorkerPool {
    /// Builds a pool with `threads` workers.
    ///
    /// # Errors
    ///
    /// `RiskError::Internal` if the threads cannot be spawned.
    pub fn new(threads: usize) -> Result<Self, RiskError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("risk-worker-{}", i))
            .build()
            .map_err(|e| RiskError::internal(format!("failed to build worker pool: {}", e)))?;
        Ok(Self { pool })
    }

    /// Number of workers.
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Runs `job` on the pool and waits at most `timeout` for its result.
    ///
    /// Parallel iterators inside `job` stay on this pool.
    ///
    /// # Errors
    ///
    /// - `RiskError::Timeout` when no reply arrives within `timeout`.
    /// - `RiskError::Internal` when the job panics.
    /// - Any error returned by `job` itself.
    pub async fn run<F, T>(&self, scenario: &str, timeout: Duration, job: F) -> Result<T, RiskError>
    where
        F: FnOnce() -> Result<T, RiskError> + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        self.pool.spawn(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(job));
            // The receiver is gone once the caller has timed out.
            let _ = tx.send(outcome);
        });

        match tokio::time::timeout(timeout, rx).await {
            Err(_) => Err(RiskError::Timeout {
                scenario: scenario.to_string(),
                timeout,
            }),
            Ok(Err(_)) => Err(RiskError::internal("worker dropped the reply channel")),
            Ok(Ok(Err(payload))) => Err(RiskError::internal(format!(
                "simulation worker panicked: {}",
                panic_message(payload.as_ref())
            ))),
            Ok(Ok(Ok(result))) => result,
        }
    }
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("threads", &self.threads())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        *msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "unknown panic payload"
    }
}

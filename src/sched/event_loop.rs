//! Single-threaded ordered job queue.
//!
//! The host requires some work to run on its own turn, strictly ordered with
//! respect to other such work. This module models that as a dedicated
//! consumer task draining an unbounded FIFO queue: jobs submitted to the
//! loop execute one at a time, in submission order. Ordering relative to the
//! background pool is not defined.
//!
//! Jobs must be short; a long-running job stalls everything behind it.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{PlatformError, Result};

/// A unit of work executed on the loop.
pub type LoopJob = Box<dyn FnOnce() + Send + 'static>;

/// Handle to the loop's submission queue. Cheap to clone.
#[derive(Clone)]
pub struct EventLoop {
    tx: mpsc::UnboundedSender<LoopJob>,
    shutdown: CancellationToken,
}

impl EventLoop {
    /// Spawn the consumer task on the current runtime and return its handle.
    pub fn spawn() -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<LoopJob>();
        let shutdown = CancellationToken::new();
        let token = shutdown.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    // Drain in submission order until told to stop.
                    biased;
                    _ = token.cancelled() => break,
                    job = rx.recv() => match job {
                        Some(job) => job(),
                        None => break,
                    },
                }
            }
            debug!("event loop stopped");
        });

        Self { tx, shutdown }
    }

    /// Enqueue a job. Fails once the loop has been shut down.
    pub fn submit(&self, job: LoopJob) -> Result<()> {
        if self.shutdown.is_cancelled() {
            return Err(PlatformError::Scheduler("event loop stopped".to_string()));
        }
        self.tx
            .send(job)
            .map_err(|_| PlatformError::Scheduler("event loop stopped".to_string()))
    }

    /// Stop the consumer. Jobs already dequeued finish; queued jobs are dropped.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

//! Cancellable handles for scheduled tasks.
//!
//! Every scheduling call returns a [`TaskHandle`]: a unique identifier plus a
//! cancellation token and a completion channel. Cancellation is cooperative;
//! a task that is already on a thread keeps running until it observes the
//! token.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Unique identifier of a scheduled task, used for cancellation tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(Uuid);

impl TaskId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Terminal state of a scheduled task.
///
/// `Failed` carries the rendered error so callers can react programmatically
/// instead of only finding a log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The task ran to completion.
    Completed,
    /// The task returned an error or panicked. Logged exactly once.
    Failed(String),
    /// The task was cancelled before or during execution. Never an error.
    Cancelled,
}

impl TaskOutcome {
    /// Whether this outcome represents a failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, TaskOutcome::Failed(_))
    }
}

/// Caller-side handle to a scheduled task.
pub struct TaskHandle {
    id: TaskId,
    token: CancellationToken,
    outcome: watch::Receiver<Option<TaskOutcome>>,
}

impl TaskHandle {
    pub(crate) fn new(
        id: TaskId,
        token: CancellationToken,
        outcome: watch::Receiver<Option<TaskOutcome>>,
    ) -> Self {
        Self { id, token, outcome }
    }

    /// Identifier of the underlying task.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Request cancellation. In-flight work observes this cooperatively.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Whether the task has reached a terminal state.
    pub fn is_finished(&self) -> bool {
        self.outcome.borrow().is_some()
    }

    /// Terminal state if the task has already finished.
    pub fn try_outcome(&self) -> Option<TaskOutcome> {
        self.outcome.borrow().clone()
    }

    /// Wait for the task to reach a terminal state.
    ///
    /// Resolves `Cancelled` if the scheduler shut down before the task ran.
    pub async fn outcome(&mut self) -> TaskOutcome {
        loop {
            if let Some(outcome) = self.outcome.borrow().clone() {
                return outcome;
            }
            if self.outcome.changed().await.is_err() {
                return TaskOutcome::Cancelled;
            }
        }
    }
}

impl fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("id", &self.id)
            .field("cancelled", &self.is_cancelled())
            .field("finished", &self.is_finished())
            .finish()
    }
}

/// Shared completion slot, writer side held by the scheduler.
pub(crate) fn outcome_channel() -> (
    Arc<watch::Sender<Option<TaskOutcome>>>,
    watch::Receiver<Option<TaskOutcome>>,
) {
    let (tx, rx) = watch::channel(None);
    (Arc::new(tx), rx)
}

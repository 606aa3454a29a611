//! Task scheduling over the host's two execution contexts.
//!
//! The adapter schedules work onto either the background pool (the tokio
//! blocking pool, a host-wide resource) or the host event loop (a dedicated
//! FIFO queue task, see [`event_loop`]). Intervals are given in host ticks
//! and converted to real time by a [`TickClock`].
//!
//! Failure semantics: a task that returns an error or panics never unwinds
//! into the submitter. A one-shot task's failure is logged exactly once and
//! the returned handle resolves with [`TaskOutcome::Failed`], so callers can
//! still react programmatically. A repeating task logs each failing run and
//! keeps repeating; its handle resolves on cancellation. Cancellation is a
//! distinct outcome and is never logged as an error. There is no retry.

pub mod event_loop;
pub mod handle;
pub mod tick;

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use dashmap::DashMap;
use futures::FutureExt;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

pub use event_loop::EventLoop;
pub use handle::{TaskHandle, TaskId, TaskOutcome};
pub use tick::TickClock;

/// Result type for scheduled task bodies.
pub type TaskResult = std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Boxed one-shot task, the shape accepted through the platform contract.
pub type TaskFn = Box<dyn FnOnce() -> TaskResult + Send + 'static>;

/// Boxed repeating task.
pub type RepeatingTaskFn = Box<dyn Fn() -> TaskResult + Send + Sync + 'static>;

/// Scheduler over the background pool and the host event loop.
///
/// Must be created within a tokio runtime; the event loop consumer is
/// spawned at construction.
pub struct Scheduler {
    event_loop: EventLoop,
    clock: TickClock,
    tasks: Arc<DashMap<TaskId, CancellationToken>>,
}

/// Writer-side state for one scheduled task.
#[derive(Clone)]
struct TaskCtx {
    id: TaskId,
    token: CancellationToken,
    outcome: Arc<watch::Sender<Option<TaskOutcome>>>,
    tasks: Arc<DashMap<TaskId, CancellationToken>>,
}

impl TaskCtx {
    /// Record the terminal state. Idempotent: only the first call wins, so a
    /// failure is logged exactly once even when driver and job race.
    fn finish(&self, outcome: TaskOutcome) {
        let mut first = false;
        self.outcome.send_if_modified(|slot| {
            if slot.is_none() {
                *slot = Some(outcome.clone());
                first = true;
                true
            } else {
                false
            }
        });
        if !first {
            return;
        }

        match &outcome {
            TaskOutcome::Failed(err) => error!(task = %self.id, "scheduled task failed: {err}"),
            TaskOutcome::Cancelled => debug!(task = %self.id, "scheduled task cancelled"),
            TaskOutcome::Completed => {}
        }
        self.tasks.remove(&self.id);
    }
}

/// Run a task body, converting errors and panics into an outcome.
fn run_guarded(task: impl FnOnce() -> TaskResult) -> TaskOutcome {
    match std::panic::catch_unwind(AssertUnwindSafe(task)) {
        Ok(Ok(())) => TaskOutcome::Completed,
        Ok(Err(e)) => TaskOutcome::Failed(e.to_string()),
        Err(panic) => TaskOutcome::Failed(panic_message(&panic)),
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("task panicked: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("task panicked: {s}")
    } else {
        "task panicked".to_string()
    }
}

impl Scheduler {
    /// Scheduler with the standard 50 ms tick.
    pub fn new() -> Self {
        Self::with_clock(TickClock::standard())
    }

    /// Scheduler with a custom tick duration.
    pub fn with_clock(clock: TickClock) -> Self {
        Self {
            event_loop: EventLoop::spawn(),
            clock,
            tasks: Arc::new(DashMap::new()),
        }
    }

    /// Tick clock used for interval conversion.
    pub fn tick_clock(&self) -> TickClock {
        self.clock
    }

    /// Number of tasks that have been scheduled and not yet finished.
    pub fn active_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Cancel a task by id. Returns false when the id is unknown or already
    /// finished.
    pub fn cancel(&self, id: TaskId) -> bool {
        match self.tasks.get(&id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancel all tracked tasks and stop the event loop.
    pub fn shutdown(&self) {
        for entry in self.tasks.iter() {
            entry.value().cancel();
        }
        self.event_loop.shutdown();
    }

    fn register(&self) -> (TaskHandle, TaskCtx) {
        let id = TaskId::new();
        let token = CancellationToken::new();
        let (outcome_tx, outcome_rx) = handle::outcome_channel();
        self.tasks.insert(id, token.clone());

        let handle = TaskHandle::new(id, token.clone(), outcome_rx);
        let ctx = TaskCtx {
            id,
            token,
            outcome: outcome_tx,
            tasks: Arc::clone(&self.tasks),
        };
        (handle, ctx)
    }

    /// Submit a task to the background pool.
    pub fn run_async<F>(&self, task: F) -> TaskHandle
    where
        F: FnOnce() -> TaskResult + Send + 'static,
    {
        let (handle, ctx) = self.register();
        tokio::task::spawn_blocking(move || {
            if ctx.token.is_cancelled() {
                ctx.finish(TaskOutcome::Cancelled);
                return;
            }
            let outcome = run_guarded(task);
            ctx.finish(outcome);
        });
        handle
    }

    /// Run a future on the runtime, with the same failure semantics as
    /// [`run_async`](Self::run_async).
    pub fn spawn_async<F>(&self, future: F) -> TaskHandle
    where
        F: Future<Output = TaskResult> + Send + 'static,
    {
        let (handle, ctx) = self.register();
        tokio::spawn(async move {
            tokio::select! {
                _ = ctx.token.cancelled() => ctx.finish(TaskOutcome::Cancelled),
                result = AssertUnwindSafe(future).catch_unwind() => {
                    let outcome = match result {
                        Ok(Ok(())) => TaskOutcome::Completed,
                        Ok(Err(e)) => TaskOutcome::Failed(e.to_string()),
                        Err(panic) => TaskOutcome::Failed(panic_message(&panic)),
                    };
                    ctx.finish(outcome);
                }
            }
        });
        handle
    }

    /// Run a task on the event loop after a tick-based delay.
    pub fn run_delayed_on_loop<F>(&self, task: F, delay_ticks: u64) -> TaskHandle
    where
        F: FnOnce() -> TaskResult + Send + 'static,
    {
        let delay = self.clock.delay(delay_ticks);
        let (handle, ctx) = self.register();
        let event_loop = self.event_loop.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = ctx.token.cancelled() => {
                    ctx.finish(TaskOutcome::Cancelled);
                    return;
                }
                _ = tokio::time::sleep(delay) => {}
            }

            let job_ctx = ctx.clone();
            let submitted = event_loop.submit(Box::new(move || {
                if job_ctx.token.is_cancelled() {
                    job_ctx.finish(TaskOutcome::Cancelled);
                    return;
                }
                let outcome = run_guarded(task);
                job_ctx.finish(outcome);
            }));
            if submitted.is_err() {
                ctx.finish(TaskOutcome::Failed(
                    "event loop stopped before execution".to_string(),
                ));
            }
        });
        handle
    }

    /// Run a task on the event loop at a fixed tick interval.
    ///
    /// Each run is wrapped individually: a failing run is logged and the
    /// repetition continues. The handle resolves on cancellation.
    pub fn run_repeating_on_loop<F>(&self, task: F, interval_ticks: u64) -> TaskHandle
    where
        F: Fn() -> TaskResult + Send + Sync + 'static,
    {
        let period = self.clock.period(interval_ticks);
        let (handle, ctx) = self.register();
        let event_loop = self.event_loop.clone();
        let task = Arc::new(task);

        tokio::spawn(async move {
            let mut timer = tokio::time::interval(period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ctx.token.cancelled() => {
                        ctx.finish(TaskOutcome::Cancelled);
                        return;
                    }
                    _ = timer.tick() => {}
                }

                let task = Arc::clone(&task);
                let id = ctx.id;
                let token = ctx.token.clone();
                let submitted = event_loop.submit(Box::new(move || {
                    if token.is_cancelled() {
                        return;
                    }
                    if let TaskOutcome::Failed(err) = run_guarded(&*task) {
                        error!(task = %id, "repeating task failed: {err}");
                    }
                }));
                if submitted.is_err() {
                    ctx.finish(TaskOutcome::Failed("event loop stopped".to_string()));
                    return;
                }
            }
        });
        handle
    }

    /// Run a task on the background pool at a fixed tick interval.
    ///
    /// Each execution is re-submitted from the event loop into the pool at
    /// the tick boundary, so the trigger is ordered with other loop work but
    /// the task body runs off the loop. A failing run is logged and does not
    /// stop the repetition; the handle resolves on cancellation.
    pub fn run_repeating_async<F>(&self, task: F, interval_ticks: u64) -> TaskHandle
    where
        F: Fn() -> TaskResult + Send + Sync + 'static,
    {
        let period = self.clock.period(interval_ticks);
        let (handle, ctx) = self.register();
        let event_loop = self.event_loop.clone();
        let task = Arc::new(task);

        tokio::spawn(async move {
            let mut timer = tokio::time::interval(period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ctx.token.cancelled() => {
                        ctx.finish(TaskOutcome::Cancelled);
                        return;
                    }
                    _ = timer.tick() => {}
                }

                let task = Arc::clone(&task);
                let id = ctx.id;
                let token = ctx.token.clone();
                let submitted = event_loop.submit(Box::new(move || {
                    if token.is_cancelled() {
                        return;
                    }
                    // Hop from the loop onto the background pool.
                    tokio::task::spawn_blocking(move || {
                        if token.is_cancelled() {
                            return;
                        }
                        if let TaskOutcome::Failed(err) = run_guarded(&*task) {
                            error!(task = %id, "repeating task failed: {err}");
                        }
                    });
                }));
                if submitted.is_err() {
                    ctx.finish(TaskOutcome::Failed("event loop stopped".to_string()));
                    return;
                }
            }
        });
        handle
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::timeout;

    const SHORT_TICK: TickClock = TickClock::new(Duration::from_millis(1));

    async fn wait_until(check: impl Fn() -> bool) {
        timeout(Duration::from_secs(5), async {
            while !check() {
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
        })
        .await
        .expect("condition not reached in time");
    }

    #[tokio::test]
    async fn test_run_async_completes() {
        let scheduler = Scheduler::new();
        let ran = Arc::new(AtomicUsize::new(0));
        let ran_clone = Arc::clone(&ran);

        let mut handle = scheduler.run_async(move || {
            ran_clone.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        assert_eq!(handle.outcome().await, TaskOutcome::Completed);
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failing_task_resolves_failed_without_unwinding() {
        let scheduler = Scheduler::new();
        let mut handle = scheduler.run_async(|| Err("mapping table missing".into()));

        let outcome = handle.outcome().await;
        assert_eq!(outcome, TaskOutcome::Failed("mapping table missing".to_string()));
    }

    #[tokio::test]
    async fn test_panicking_task_resolves_failed() {
        let scheduler = Scheduler::new();
        let mut handle = scheduler.run_async(|| panic!("boom"));

        let outcome = handle.outcome().await;
        assert!(outcome.is_failure());
    }

    #[tokio::test]
    async fn test_spawn_async_future_failure() {
        let scheduler = Scheduler::new();
        let mut handle = scheduler.spawn_async(async { Err("async failure".into()) });

        assert_eq!(handle.outcome().await, TaskOutcome::Failed("async failure".to_string()));
    }

    #[tokio::test]
    async fn test_cancel_before_run_prevents_execution() {
        let scheduler = Scheduler::new();
        let ran = Arc::new(AtomicUsize::new(0));
        let ran_clone = Arc::clone(&ran);

        // Delay far beyond the test's lifetime; cancellation must win.
        let mut handle = scheduler.run_delayed_on_loop(
            move || {
                ran_clone.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
            20 * 60 * 60,
        );
        handle.cancel();

        assert_eq!(handle.outcome().await, TaskOutcome::Cancelled);
        assert_eq!(ran.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_delayed_task_runs_once() {
        let scheduler = Scheduler::with_clock(SHORT_TICK);
        let ran = Arc::new(AtomicUsize::new(0));
        let ran_clone = Arc::clone(&ran);

        let mut handle = scheduler.run_delayed_on_loop(
            move || {
                ran_clone.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
            5,
        );

        assert_eq!(handle.outcome().await, TaskOutcome::Completed);
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_repeating_async_runs_until_cancelled() {
        let scheduler = Scheduler::with_clock(SHORT_TICK);
        let runs = Arc::new(AtomicUsize::new(0));
        let runs_clone = Arc::clone(&runs);

        let mut handle = scheduler.run_repeating_async(
            move || {
                runs_clone.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
            1,
        );

        let runs_check = Arc::clone(&runs);
        wait_until(move || runs_check.load(Ordering::SeqCst) >= 3).await;

        handle.cancel();
        assert_eq!(handle.outcome().await, TaskOutcome::Cancelled);
    }

    #[tokio::test]
    async fn test_repeating_async_continues_after_failure() {
        let scheduler = Scheduler::with_clock(SHORT_TICK);
        let runs = Arc::new(AtomicUsize::new(0));
        let runs_clone = Arc::clone(&runs);

        let handle = scheduler.run_repeating_async(
            move || {
                let n = runs_clone.fetch_add(1, Ordering::SeqCst);
                if n == 0 {
                    Err("first run fails".into())
                } else {
                    Ok(())
                }
            },
            1,
        );

        let runs_check = Arc::clone(&runs);
        wait_until(move || runs_check.load(Ordering::SeqCst) >= 3).await;
        assert!(!handle.is_finished());
        handle.cancel();
    }

    #[tokio::test]
    async fn test_repeating_on_loop_continues_after_failure() {
        let scheduler = Scheduler::with_clock(SHORT_TICK);
        let runs = Arc::new(AtomicUsize::new(0));
        let runs_clone = Arc::clone(&runs);

        // Every run fails; failures are logged and swallowed, so the
        // repetition must keep going until cancelled.
        let mut handle = scheduler.run_repeating_on_loop(
            move || {
                runs_clone.fetch_add(1, Ordering::SeqCst);
                Err("loop task failure".into())
            },
            1,
        );

        let runs_check = Arc::clone(&runs);
        wait_until(move || runs_check.load(Ordering::SeqCst) >= 3).await;
        assert!(!handle.is_finished());

        handle.cancel();
        assert_eq!(handle.outcome().await, TaskOutcome::Cancelled);
    }

    #[tokio::test]
    async fn test_cancel_by_id() {
        let scheduler = Scheduler::new();
        let mut handle = scheduler.run_delayed_on_loop(|| Ok(()), 20 * 60 * 60);

        assert!(scheduler.cancel(handle.id()));
        assert_eq!(handle.outcome().await, TaskOutcome::Cancelled);
        // Finished tasks drop out of the tracking map.
        assert!(!scheduler.cancel(handle.id()));
    }

    #[tokio::test]
    async fn test_task_tracking_drains() {
        let scheduler = Scheduler::new();
        let mut handle = scheduler.run_async(|| Ok(()));
        handle.outcome().await;
        assert_eq!(scheduler.active_tasks(), 0);
    }
}

//! Background task runner with cooperative cancellation.
//!
//! Work runs on tokio's blocking pool and talks back through a
//! [`TaskContext`]: progress ticks go over a channel, cancellation is a
//! shared flag the work polls. The caller keeps the [`TaskHandle`] and its
//! listener; [`TaskHandle::finish`] delivers the ticks, then exactly one
//! terminal outcome.
//!
//! ```ignore
//! let runner = TaskRunner::new();
//! let handle = runner.spawn("export", |ctx| export(&conn, ctx), LogListener);
//! let canceller = handle.canceller();
//! // ... canceller.cancel() from elsewhere ...
//! match handle.finish().await {
//!     TaskOutcome::Finished(r) => {}
//!     TaskOutcome::Cancelled(partial) => {}
//!     TaskOutcome::Failed(e) => {}
//! }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use thiserror::Error;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinHandle;

use crate::async_util::run_with_events;
use crate::progress::{ProgressEvent, ProgressListener};

/// Identity of a spawned task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInfo {
    pub id: u64,
    pub name: String,
}

/// How a task ended.
#[derive(Debug)]
pub enum TaskOutcome<R, E> {
    Finished(R),
    Failed(TaskError<E>),
    /// The work was cancelled. It may still have produced a partial result.
    Cancelled(Option<R>),
}

impl<R, E> TaskOutcome<R, E> {
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

#[derive(Debug, Error)]
pub enum TaskError<E> {
    #[error(transparent)]
    Work(E),
    #[error("Task aborted: {0}")]
    Aborted(String),
}

/// Receives a task's progress and its single terminal outcome.
pub trait TaskListener<R, E>: Send {
    fn on_progress(&mut self, _task: &TaskInfo, _event: &ProgressEvent) {}
    fn on_finished(&mut self, _task: &TaskInfo, _outcome: &TaskOutcome<R, E>) {}
}

impl<R, E> TaskListener<R, E> for () {}

/// Listener that reports through the `log` crate.
pub struct LogListener;

impl<R, E: std::fmt::Display> TaskListener<R, E> for LogListener {
    fn on_progress(&mut self, task: &TaskInfo, event: &ProgressEvent) {
        if let ProgressEvent::Step {
            message: Some(msg), ..
        } = event
        {
            log::info!("[{}] {}", task.name, msg);
        }
    }

    fn on_finished(&mut self, task: &TaskInfo, outcome: &TaskOutcome<R, E>) {
        match outcome {
            TaskOutcome::Finished(_) => log::info!("[{}] finished", task.name),
            TaskOutcome::Failed(e) => log::warn!("[{}] failed: {}", task.name, e),
            TaskOutcome::Cancelled(_) => log::info!("[{}] cancelled", task.name),
        }
    }
}

// ── Cancellation ────────────────────────────────────────────────────────────

/// Cloneable handle that can cancel a task from anywhere.
#[derive(Debug, Clone, Default)]
pub struct Canceller(Arc<AtomicBool>);

impl Canceller {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Cancels the task when the handle is dropped without being finished.
struct CancelOnDrop(Option<Canceller>);

impl CancelOnDrop {
    fn disarm(&mut self) {
        self.0 = None;
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if let Some(c) = self.0.take() {
            c.cancel();
        }
    }
}

// ── Context ─────────────────────────────────────────────────────────────────

/// What the running work sees: a progress sink plus the cancellation flag.
pub struct TaskContext {
    info: TaskInfo,
    cancel: Canceller,
    events: mpsc::UnboundedSender<ProgressEvent>,
}

impl TaskContext {
    pub fn info(&self) -> &TaskInfo {
        &self.info
    }
}

impl ProgressListener for TaskContext {
    fn set_max_pos(&self, max: usize) {
        // A closed channel means nobody is listening any more.
        let _ = self.events.send(ProgressEvent::MaxPos(max));
    }

    fn publish_progress(&self, delta: usize, message: Option<&str>) {
        let _ = self.events.send(ProgressEvent::Step {
            delta,
            message: message.map(str::to_string),
        });
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

// ── Runner ──────────────────────────────────────────────────────────────────

enum Joined<R, E> {
    Done(Result<R, E>),
    /// Cancelled while waiting for the exclusive lane.
    NotStarted,
    Aborted(String),
}

/// Spawns background work. Must be used from within a tokio runtime.
pub struct TaskRunner {
    next_id: AtomicU64,
    exclusive: Arc<Semaphore>,
}

impl Default for TaskRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskRunner {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            exclusive: Arc::new(Semaphore::new(1)),
        }
    }

    /// Run `work` on the blocking pool.
    pub fn spawn<R, E, F, L>(&self, name: &str, work: F, listener: L) -> TaskHandle<R, E>
    where
        R: Send + 'static,
        E: Send + 'static,
        F: FnOnce(&TaskContext) -> Result<R, E> + Send + 'static,
        L: TaskListener<R, E> + 'static,
    {
        self.start(name, work, Box::new(listener), None)
    }

    /// Like [`spawn`](Self::spawn), but waits until no other exclusive task
    /// of this runner is running. Archive imports and exports use this.
    pub fn spawn_exclusive<R, E, F, L>(
        &self,
        name: &str,
        work: F,
        listener: L,
    ) -> TaskHandle<R, E>
    where
        R: Send + 'static,
        E: Send + 'static,
        F: FnOnce(&TaskContext) -> Result<R, E> + Send + 'static,
        L: TaskListener<R, E> + 'static,
    {
        self.start(name, work, Box::new(listener), Some(self.exclusive.clone()))
    }

    /// Whether an exclusive task is currently running. Tasks still waiting
    /// for the lane hold no permit and are not counted.
    pub fn is_busy(&self) -> bool {
        self.exclusive.available_permits() == 0
    }

    fn start<R, E, F>(
        &self,
        name: &str,
        work: F,
        listener: Box<dyn TaskListener<R, E>>,
        lane: Option<Arc<Semaphore>>,
    ) -> TaskHandle<R, E>
    where
        R: Send + 'static,
        E: Send + 'static,
        F: FnOnce(&TaskContext) -> Result<R, E> + Send + 'static,
    {
        let info = TaskInfo {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            name: name.to_string(),
        };
        let cancel = Canceller::default();
        let (tx, rx) = mpsc::unbounded_channel();
        let ctx = TaskContext {
            info: info.clone(),
            cancel: cancel.clone(),
            events: tx,
        };
        log::debug!("Spawning task {} '{}'", info.id, info.name);

        let join = tokio::spawn(async move {
            let _permit = match lane {
                Some(sem) => match sem.acquire_owned().await {
                    Ok(permit) => Some(permit),
                    Err(e) => return Joined::Aborted(e.to_string()),
                },
                None => None,
            };
            if ctx.is_cancelled() {
                return Joined::NotStarted;
            }
            match tokio::task::spawn_blocking(move || work(&ctx)).await {
                Ok(result) => Joined::Done(result),
                Err(e) => Joined::Aborted(e.to_string()),
            }
        });

        TaskHandle {
            info,
            guard: CancelOnDrop(Some(cancel.clone())),
            cancel,
            join,
            events: rx,
            listener,
        }
    }
}

// ── Handle ──────────────────────────────────────────────────────────────────

/// Owner's view of a spawned task.
///
/// Dropping the handle without calling [`finish`](Self::finish) cancels the
/// work and discards its outcome.
pub struct TaskHandle<R, E> {
    info: TaskInfo,
    guard: CancelOnDrop,
    cancel: Canceller,
    join: JoinHandle<Joined<R, E>>,
    events: mpsc::UnboundedReceiver<ProgressEvent>,
    listener: Box<dyn TaskListener<R, E>>,
}

impl<R, E> TaskHandle<R, E> {
    pub fn info(&self) -> &TaskInfo {
        &self.info
    }

    /// Ask the work to stop at its next cancellation check.
    pub fn cancel(&self) {
        log::debug!("Cancelling task {} '{}'", self.info.id, self.info.name);
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// A detached canceller, usable while [`finish`](Self::finish) is pending.
    pub fn canceller(&self) -> Canceller {
        self.cancel.clone()
    }

    /// Deliver progress to the listener until the work ends, then report and
    /// return the outcome.
    pub async fn finish(self) -> TaskOutcome<R, E> {
        let TaskHandle {
            info,
            mut guard,
            cancel,
            join,
            events,
            mut listener,
        } = self;
        guard.disarm();

        let joined = run_with_events(join, events, |event| {
            listener.on_progress(&info, &event);
        })
        .await;

        let cancelled = cancel.is_cancelled();
        let outcome = match joined {
            Ok(Joined::Done(Ok(r))) if cancelled => TaskOutcome::Cancelled(Some(r)),
            Ok(Joined::Done(Ok(r))) => TaskOutcome::Finished(r),
            Ok(Joined::Done(Err(_))) if cancelled => TaskOutcome::Cancelled(None),
            Ok(Joined::Done(Err(e))) => TaskOutcome::Failed(TaskError::Work(e)),
            Ok(Joined::NotStarted) => TaskOutcome::Cancelled(None),
            Ok(Joined::Aborted(msg)) => TaskOutcome::Failed(TaskError::Aborted(msg)),
            Err(e) => TaskOutcome::Failed(TaskError::Aborted(e.to_string())),
        };

        listener.on_finished(&info, &outcome);
        outcome
    }
}

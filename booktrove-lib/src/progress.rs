//! Progress reporting for long-running catalogue operations.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// One progress update emitted by a running operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// The total number of steps is now known (or has changed).
    MaxPos(usize),
    /// `delta` more steps are done, optionally with a status message.
    Step {
        delta: usize,
        message: Option<String>,
    },
}

/// Sink for progress updates; the work also polls it for cancellation.
///
/// Archive readers and writers call this between rows and cover files.
pub trait ProgressListener: Send + Sync {
    /// Set the total number of steps.
    fn set_max_pos(&self, max: usize);

    /// Report `delta` completed steps.
    fn publish_progress(&self, delta: usize, message: Option<&str>);

    /// Whether the user asked the work to stop. Polled cooperatively.
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// A no-op progress reporter that discards all updates.
pub struct SilentProgress;

impl ProgressListener for SilentProgress {
    fn set_max_pos(&self, _max: usize) {}
    fn publish_progress(&self, _delta: usize, _message: Option<&str>) {}
}

/// A progress reporter that logs to the `log` crate.
///
/// Messages are logged as they arrive; bare ticks only every `every` steps.
pub struct LogProgress {
    every: usize,
    pos: AtomicUsize,
    max: AtomicUsize,
    cancelled: AtomicBool,
}

impl LogProgress {
    pub fn new(every: usize) -> Self {
        Self {
            every: every.max(1),
            pos: AtomicUsize::new(0),
            max: AtomicUsize::new(0),
            cancelled: AtomicBool::new(false),
        }
    }

    /// Request that the observed work stop at its next check.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn position(&self) -> usize {
        self.pos.load(Ordering::Relaxed)
    }
}

impl Default for LogProgress {
    fn default() -> Self {
        Self::new(100)
    }
}

impl ProgressListener for LogProgress {
    fn set_max_pos(&self, max: usize) {
        self.max.store(max, Ordering::Relaxed);
    }

    fn publish_progress(&self, delta: usize, message: Option<&str>) {
        let before = self.pos.fetch_add(delta, Ordering::Relaxed);
        let pos = before + delta;
        let max = self.max.load(Ordering::Relaxed);
        match message {
            Some(msg) => log::info!("  [{}/{}] {}", pos, max, msg),
            None if before / self.every != pos / self.every || pos == max => {
                log::info!("  [{}/{}]", pos, max)
            }
            None => {}
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

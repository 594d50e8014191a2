//! Shared runtime services for the booktrove frontends: the background task
//! runner, progress reporting, a worker pool, the preferences store, and
//! settings/file locations.

pub mod async_util;
pub mod error;
pub mod prefs;
pub mod progress;
pub mod settings;
pub mod task;
pub mod util;
pub mod worker_pool;

pub use error::ConfigError;
pub use prefs::{PrefValue, Preferences};
pub use progress::{LogProgress, ProgressEvent, ProgressListener, SilentProgress};
pub use settings::Settings;
pub use task::{
    Canceller, LogListener, TaskContext, TaskError, TaskHandle, TaskInfo, TaskListener,
    TaskOutcome, TaskRunner,
};
pub use worker_pool::WorkerPool;

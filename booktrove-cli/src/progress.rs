//! Terminal progress for background tasks.

use booktrove_lib::{ProgressEvent, TaskInfo, TaskListener, TaskOutcome};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Draws a task's progress as an indicatif bar.
pub(crate) struct BarListener {
    bar: ProgressBar,
}

impl BarListener {
    /// When `quiet` is true the bar is hidden.
    pub(crate) fn new(quiet: bool) -> Self {
        let bar = ProgressBar::new(0);
        if quiet {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        let style = ProgressStyle::with_template(
            "  {spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
        bar.set_style(style);
        Self { bar }
    }
}

impl<R, E> TaskListener<R, E> for BarListener {
    fn on_progress(&mut self, task: &TaskInfo, event: &ProgressEvent) {
        match event {
            ProgressEvent::MaxPos(max) => {
                self.bar.set_length(*max as u64);
                self.bar.set_message(task.name.clone());
            }
            ProgressEvent::Step { delta, message } => {
                self.bar.inc(*delta as u64);
                if let Some(msg) = message {
                    self.bar.set_message(msg.clone());
                }
            }
        }
    }

    fn on_finished(&mut self, _task: &TaskInfo, _outcome: &TaskOutcome<R, E>) {
        self.bar.finish_and_clear();
    }
}

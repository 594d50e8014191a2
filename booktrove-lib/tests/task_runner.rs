use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use booktrove_lib::{
    LogListener, ProgressEvent, ProgressListener, TaskError, TaskInfo, TaskListener, TaskOutcome,
    TaskRunner,
};

#[derive(Debug, Clone, PartialEq)]
enum Seen {
    Progress(ProgressEvent),
    Finished,
    Failed,
    Cancelled,
}

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Vec<Seen>>>);

impl Recorder {
    fn seen(&self) -> Vec<Seen> {
        self.0.lock().unwrap().clone()
    }
}

impl<R, E> TaskListener<R, E> for Recorder {
    fn on_progress(&mut self, _task: &TaskInfo, event: &ProgressEvent) {
        self.0.lock().unwrap().push(Seen::Progress(event.clone()));
    }

    fn on_finished(&mut self, _task: &TaskInfo, outcome: &TaskOutcome<R, E>) {
        let seen = match outcome {
            TaskOutcome::Finished(_) => Seen::Finished,
            TaskOutcome::Failed(_) => Seen::Failed,
            TaskOutcome::Cancelled(_) => Seen::Cancelled,
        };
        self.0.lock().unwrap().push(seen);
    }
}

#[tokio::test]
async fn progress_is_delivered_before_single_terminal_event() {
    let runner = TaskRunner::new();
    let recorder = Recorder::default();

    let handle = runner.spawn(
        "count",
        |ctx| {
            ctx.set_max_pos(3);
            for i in 0..3 {
                ctx.publish_progress(1, Some(&format!("step {i}")));
            }
            Ok::<_, String>(42)
        },
        recorder.clone(),
    );

    let outcome = handle.finish().await;
    assert!(matches!(outcome, TaskOutcome::Finished(42)));

    let seen = recorder.seen();
    assert_eq!(seen.len(), 5);
    assert_eq!(seen[0], Seen::Progress(ProgressEvent::MaxPos(3)));
    assert_eq!(
        seen[3],
        Seen::Progress(ProgressEvent::Step {
            delta: 1,
            message: Some("step 2".into())
        })
    );
    assert_eq!(seen[4], Seen::Finished);
}

#[tokio::test]
async fn work_error_is_reported_as_failure() {
    let runner = TaskRunner::new();
    let recorder = Recorder::default();

    let handle = runner.spawn("fail", |_ctx| Err::<(), _>("boom"), recorder.clone());
    match handle.finish().await {
        TaskOutcome::Failed(TaskError::Work(e)) => assert_eq!(e, "boom"),
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(recorder.seen(), vec![Seen::Failed]);
}

#[tokio::test]
async fn panicking_work_is_aborted_not_hung() {
    let runner = TaskRunner::new();
    let handle = runner.spawn(
        "panic",
        |_ctx| -> Result<(), String> { panic!("work exploded") },
        (),
    );
    assert!(matches!(
        handle.finish().await,
        TaskOutcome::Failed(TaskError::Aborted(_))
    ));
}

#[tokio::test]
async fn cancellation_yields_cancelled_outcome() {
    let runner = TaskRunner::new();
    let recorder = Recorder::default();

    let handle = runner.spawn(
        "loop",
        |ctx| {
            let mut rows = 0usize;
            while !ctx.is_cancelled() {
                rows += 1;
                if rows > 5_000 {
                    return Err("never cancelled".to_string());
                }
                std::thread::sleep(Duration::from_millis(1));
            }
            Ok(rows)
        },
        recorder.clone(),
    );
    handle.cancel();
    assert!(handle.is_cancelled());

    let outcome = handle.finish().await;
    assert!(outcome.is_cancelled(), "got {outcome:?}");
    assert_eq!(recorder.seen().last(), Some(&Seen::Cancelled));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn exclusive_tasks_never_overlap() {
    let runner = TaskRunner::new();
    let active = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..3)
        .map(|i| {
            let active = active.clone();
            let peak = peak.clone();
            runner.spawn_exclusive(
                &format!("archive-{i}"),
                move |_ctx| {
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    std::thread::sleep(Duration::from_millis(20));
                    active.fetch_sub(1, Ordering::SeqCst);
                    Ok::<_, String>(i)
                },
                (),
            )
        })
        .collect();

    for handle in handles {
        assert!(handle.finish().await.is_finished());
    }
    assert_eq!(peak.load(Ordering::SeqCst), 1);
    assert!(!runner.is_busy());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn dropping_the_handle_cancels_the_work() {
    let runner = TaskRunner::new();
    let (tx, rx) = std::sync::mpsc::channel();

    let handle = runner.spawn(
        "orphan",
        move |ctx| {
            for _ in 0..5_000 {
                if ctx.is_cancelled() {
                    let _ = tx.send(true);
                    return Ok(());
                }
                std::thread::sleep(Duration::from_millis(1));
            }
            let _ = tx.send(false);
            Err("never cancelled")
        },
        (),
    );
    drop(handle);

    let observed = tokio::task::spawn_blocking(move || rx.recv_timeout(Duration::from_secs(10)))
        .await
        .unwrap();
    // Either the work saw the flag, or it was cancelled before it started.
    assert!(matches!(
        observed,
        Ok(true) | Err(std::sync::mpsc::RecvTimeoutError::Disconnected)
    ));
}

#[tokio::test]
async fn canceller_works_while_finish_is_pending() {
    let runner = TaskRunner::new();
    let handle = runner.spawn(
        "wait",
        |ctx| {
            for _ in 0..5_000 {
                if ctx.is_cancelled() {
                    return Ok(());
                }
                std::thread::sleep(Duration::from_millis(1));
            }
            Err("never cancelled")
        },
        (),
    );
    let canceller = handle.canceller();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        canceller.cancel();
    });

    assert!(handle.finish().await.is_cancelled());
}

#[tokio::test]
async fn log_listener_accepts_every_outcome() {
    let runner = TaskRunner::new();
    let ok = runner.spawn("ok", |_ctx| Ok::<_, String>(1), LogListener);
    assert!(matches!(ok.finish().await, TaskOutcome::Finished(1)));

    let failed = runner.spawn("failed", |_ctx| Err::<(), _>("bad".to_string()), LogListener);
    assert!(matches!(failed.finish().await, TaskOutcome::Failed(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn busy_only_while_an_exclusive_task_holds_the_lane() {
    let runner = TaskRunner::new();
    assert!(!runner.is_busy());

    let (started_tx, started_rx) = std::sync::mpsc::channel();
    let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
    let first = runner.spawn_exclusive(
        "first",
        move |_ctx| {
            started_tx.send(()).unwrap();
            release_rx.recv_timeout(Duration::from_secs(5)).ok();
            Ok::<_, String>(1)
        },
        (),
    );
    let second = runner.spawn_exclusive("second", |_ctx| Ok::<_, String>(2), ());

    started_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(runner.is_busy());

    release_tx.send(()).unwrap();
    assert!(matches!(first.finish().await, TaskOutcome::Finished(1)));
    assert!(matches!(second.finish().await, TaskOutcome::Finished(2)));
    assert!(!runner.is_busy());
}

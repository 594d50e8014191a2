//! Driving a background future while forwarding its events.
//!
//! The task runner uses this to deliver progress from work running on the
//! blocking pool to a listener owned by the awaiting task.

use std::future::Future;

use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};

/// Upper bound on how long events are drained after the work completes.
/// Reached only if some clone of the sender outlives the work.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Common interface over bounded and unbounded mpsc receivers.
#[allow(async_fn_in_trait)]
pub trait EventReceiver<E> {
    /// Next event, or `None` once every sender is gone.
    async fn recv(&mut self) -> Option<E>;
}

impl<E> EventReceiver<E> for mpsc::Receiver<E> {
    async fn recv(&mut self) -> Option<E> {
        mpsc::Receiver::recv(self).await
    }
}

impl<E> EventReceiver<E> for mpsc::UnboundedReceiver<E> {
    async fn recv(&mut self) -> Option<E> {
        mpsc::UnboundedReceiver::recv(self).await
    }
}

/// Await `task`, calling `on_event` for every event received meanwhile.
///
/// Events still queued when `task` completes are delivered before this
/// returns, so the caller sees every event before the result.
pub async fn run_with_events<F, E, R, Rx>(
    task: F,
    mut events: Rx,
    mut on_event: impl FnMut(E),
) -> R
where
    F: Future<Output = R>,
    Rx: EventReceiver<E> + Unpin,
{
    tokio::pin!(task);
    let mut delivered: u64 = 0;

    let result = loop {
        tokio::select! {
            // Prefer queued events so ordering matches emission order.
            biased;
            event = events.recv() => match event {
                Some(e) => {
                    delivered += 1;
                    on_event(e);
                }
                None => {
                    log::debug!("run_with_events: channel closed after {delivered} events");
                    break (&mut task).await;
                }
            },
            r = &mut task => {
                drain(&mut events, &mut on_event, &mut delivered).await;
                break r;
            }
        }
    };

    log::debug!("run_with_events: done, {delivered} events delivered");
    result
}

async fn drain<E, Rx: EventReceiver<E>>(
    events: &mut Rx,
    on_event: &mut impl FnMut(E),
    delivered: &mut u64,
) {
    let deadline = Instant::now() + DRAIN_TIMEOUT;
    loop {
        match tokio::time::timeout_at(deadline, events.recv()).await {
            Ok(Some(e)) => {
                *delivered += 1;
                on_event(e);
            }
            Ok(None) => break,
            Err(_) => {
                log::warn!(
                    "run_with_events: drain timed out after {}s, sender still alive",
                    DRAIN_TIMEOUT.as_secs()
                );
                break;
            }
        }
    }
}

//! Fixed-size pool of async workers with a bounded work queue.
//!
//! Workers share one `async_channel` receiver (it is `Clone`, so no lock),
//! and push results to an unbounded channel the caller drains. The search
//! coordinator uses this to query several engines at once.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Duration;

/// Default per-item timeout. Engines apply their own shorter HTTP timeouts;
/// this only catches a future that never resolves.
pub const DEFAULT_ITEM_TIMEOUT: Duration = Duration::from_secs(90);

/// A pool of worker tasks that process items concurrently.
///
/// ```ignore
/// let mut pool = WorkerPool::start(4, engines, |engine| async move {
///     engine.search_by_isbn(&isbn).await
/// });
/// while let Some(result) = pool.recv().await {
///     accumulate(result);
/// }
/// ```
pub struct WorkerPool<R: Send + 'static> {
    result_rx: mpsc::UnboundedReceiver<R>,
    handles: Vec<JoinHandle<()>>,
}

impl<R: Send + 'static> WorkerPool<R> {
    /// Spawn `n` workers over `items` with the default per-item timeout.
    pub fn start<W, F, Fut>(n: usize, items: Vec<W>, process_fn: F) -> Self
    where
        W: Send + 'static,
        F: Fn(W) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
    {
        Self::start_with_timeout(n, items, DEFAULT_ITEM_TIMEOUT, process_fn)
    }

    /// Spawn `n` workers over `items`.
    ///
    /// An item whose future runs past `timeout` is dropped and yields no
    /// result; the worker moves on to the next item.
    pub fn start_with_timeout<W, F, Fut>(
        n: usize,
        items: Vec<W>,
        timeout: Duration,
        process_fn: F,
    ) -> Self
    where
        W: Send + 'static,
        F: Fn(W) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
    {
        let n = n.max(1);
        let (work_tx, work_rx) = async_channel::bounded::<W>(n);
        let (result_tx, result_rx) = mpsc::unbounded_channel::<R>();
        let process_fn = Arc::new(process_fn);

        let handles = (0..n)
            .map(|worker| {
                let work_rx = work_rx.clone();
                let result_tx = result_tx.clone();
                let process_fn = process_fn.clone();
                tokio::spawn(async move {
                    while let Ok(item) = work_rx.recv().await {
                        match tokio::time::timeout(timeout, process_fn(item)).await {
                            Ok(r) => {
                                if result_tx.send(r).is_err() {
                                    break;
                                }
                            }
                            Err(_) => log::warn!(
                                "Worker {worker}: item timed out after {}s, skipping",
                                timeout.as_secs()
                            ),
                        }
                    }
                })
            })
            .collect();

        // Result channel closes once every worker has exited.
        drop(result_tx);

        tokio::spawn(async move {
            for item in items {
                if work_tx.send(item).await.is_err() {
                    break;
                }
            }
        });

        Self { result_rx, handles }
    }

    /// Next result, or `None` once every item is processed.
    pub async fn recv(&mut self) -> Option<R> {
        self.result_rx.recv().await
    }

    /// Collect every remaining result.
    pub async fn collect(mut self) -> Vec<R> {
        let mut out = Vec::new();
        while let Some(r) = self.recv().await {
            out.push(r);
        }
        out
    }

    /// Stop all workers. Items not yet picked up are discarded.
    pub fn abort(&self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}

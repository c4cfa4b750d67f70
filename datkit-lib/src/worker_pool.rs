//! Worker pool for running per-bucket work concurrently with backpressure.
//!
//! Spawns N persistent tokio tasks that pull work items from a bounded
//! async-channel. Results are sent to an unbounded channel for consumption
//! by the caller.
//!
//! `async-channel`'s `Receiver` is `Clone`, so each worker gets its own
//! handle and no worker can starve the others while waiting on `recv()`.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Duration;

/// Hard safety-net timeout per work item. Set above the pipeline's own
/// per-bucket timeout so it only fires as a last resort.
pub const SAFETY_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// A pool of worker tasks that process items concurrently.
///
/// Workers pull from a bounded work channel, which gives natural
/// backpressure when all of them are busy. Dropping the work sender shuts
/// the pool down once the queue drains.
///
/// # Example
///
/// ```ignore
/// let mut pool = WorkerPool::start(4, buckets, |(key, items)| async move {
///     (key, merge(items))
/// });
///
/// while let Some((key, merged)) = pool.recv().await {
///     index.insert_bucket(key, merged);
/// }
/// ```
pub struct WorkerPool<R: Send + 'static> {
    result_rx: mpsc::UnboundedReceiver<R>,
    _handles: Vec<JoinHandle<()>>,
}

impl<R: Send + 'static> WorkerPool<R> {
    /// Spawn `n` workers (at least one), submit all items, and return a
    /// pool for receiving results.
    ///
    /// An item whose `process_fn` exceeds [`SAFETY_TIMEOUT`] is dropped
    /// without a result; the worker moves on to the next item.
    pub fn start<W, F, Fut>(n: usize, items: Vec<W>, process_fn: F) -> Self
    where
        W: Send + 'static,
        F: Fn(W) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
    {
        Self::start_with_timeout(n, items, SAFETY_TIMEOUT, process_fn)
    }

    /// [`start`](Self::start) with an explicit per-item timeout.
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

        let handles: Vec<JoinHandle<()>> = (0..n)
            .map(|_| {
                let work_rx = work_rx.clone();
                let result_tx = result_tx.clone();
                let process_fn = process_fn.clone();
                tokio::spawn(async move {
                    while let Ok(item) = work_rx.recv().await {
                        match tokio::time::timeout(timeout, process_fn(item)).await {
                            Ok(r) => {
                                if result_tx.send(r).is_err() {
                                    break; // Receiver dropped
                                }
                            }
                            Err(_) => {
                                log::warn!(
                                    "Worker pool: item timed out after {}s, skipping",
                                    timeout.as_secs()
                                );
                            }
                        }
                    }
                })
            })
            .collect();

        // Drop our copy so the channel closes when all workers finish
        drop(result_tx);

        tokio::spawn(async move {
            for item in items {
                if work_tx.send(item).await.is_err() {
                    break;
                }
            }
            // work_tx dropped here; workers drain the queue and stop
        });

        Self {
            result_rx,
            _handles: handles,
        }
    }

    /// Receive the next result. Returns `None` when all items have been
    /// processed and all workers have shut down.
    pub async fn recv(&mut self) -> Option<R> {
        self.result_rx.recv().await
    }

    /// Drain every remaining result, in completion order.
    pub async fn collect(mut self) -> Vec<R> {
        let mut results = Vec::new();
        while let Some(r) = self.recv().await {
            results.push(r);
        }
        results
    }
}

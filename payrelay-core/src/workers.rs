//! Queue-draining worker pool.
//!
//! The pool is responsible for:
//! - Spawning N independent dequeue loops over the shared work queue
//! - Capping concurrent routing calls with one process-wide semaphore,
//!   sized independently of the worker count
//! - Writing exactly one accounting record per dequeued payment
//! - Surviving malformed items and store failures without dying
//!
//! Shutdown follows the watch-channel pattern: once the flag flips no new
//! dequeue starts, the in-flight routing call finishes or hits its timeout,
//! and whatever is still queued stays in the store for the next process.

use crate::entities::payment::PaymentRecord;
use crate::gateway::ProcessorApi;
use crate::router::FallbackRouter;
use crate::store::{PaymentStore, StoreError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Semaphore, watch};
use tokio::task::JoinHandle;

/// Pause after finding the queue empty; bounds polling without adding
/// noticeable dequeue latency.
const IDLE_SLEEP: Duration = Duration::from_millis(10);
/// Longer pause after a per-item failure.
const ERROR_SLEEP: Duration = Duration::from_millis(100);

/// N concurrent dequeue loops sharing one admission-control semaphore.
pub struct WorkerPool<S, G> {
    store: S,
    router: Arc<FallbackRouter<G>>,
    limiter: Arc<Semaphore>,
    worker_count: usize,
    shutdown_rx: watch::Receiver<bool>,
}

impl<S, G> WorkerPool<S, G>
where
    S: PaymentStore + Clone + 'static,
    G: ProcessorApi + 'static,
{
    /// # Arguments
    ///
    /// * `worker_count` - number of independent dequeue loops
    /// * `max_concurrent_calls` - cap on routing calls in flight across the
    ///   whole process, regardless of how many workers are idle
    /// * `shutdown_rx` - flips to `true` when the process is going down
    pub fn new(
        store: S,
        router: FallbackRouter<G>,
        worker_count: usize,
        max_concurrent_calls: usize,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            store,
            router: Arc::new(router),
            limiter: Arc::new(Semaphore::new(max_concurrent_calls)),
            worker_count,
            shutdown_rx,
        }
    }

    /// Spawn the worker loops. The handles resolve only after shutdown.
    pub fn spawn(self) -> Vec<JoinHandle<()>> {
        (0..self.worker_count)
            .map(|id| {
                let worker = Worker {
                    id,
                    store: self.store.clone(),
                    router: Arc::clone(&self.router),
                    limiter: Arc::clone(&self.limiter),
                    shutdown_rx: self.shutdown_rx.clone(),
                };
                tokio::spawn(worker.run())
            })
            .collect()
    }
}

struct Worker<S, G> {
    id: usize,
    store: S,
    router: Arc<FallbackRouter<G>>,
    limiter: Arc<Semaphore>,
    shutdown_rx: watch::Receiver<bool>,
}

impl<S: PaymentStore, G: ProcessorApi> Worker<S, G> {
    async fn run(mut self) {
        tracing::info!(worker = self.id, "worker started");

        loop {
            if self.shutdown_requested() {
                break;
            }

            match self.drain_one().await {
                Ok(true) => {}
                Ok(false) => self.pause(IDLE_SLEEP).await,
                Err(e) => {
                    tracing::warn!(worker = self.id, error = %e, "payment processing failed");
                    self.pause(ERROR_SLEEP).await;
                }
            }
        }

        tracing::info!(worker = self.id, "worker stopped");
    }

    /// One dequeue attempt. `Ok(false)` means the queue was empty.
    async fn drain_one(&self) -> Result<bool, StoreError> {
        let Some(payment) = self.store.dequeue().await? else {
            return Ok(false);
        };

        // Admission control: one unit per routing call, held through the
        // record write, released on every path by the permit guard.
        let Ok(_permit) = self.limiter.acquire().await else {
            return Ok(false);
        };

        let label = self.router.route(&payment).await;
        let record = PaymentRecord::new(&payment, label);
        self.store.record(&record).await?;

        tracing::debug!(
            worker = self.id,
            correlation_id = %record.correlation_id,
            processor = %record.processor,
            "payment recorded"
        );
        Ok(true)
    }

    fn shutdown_requested(&self) -> bool {
        // A closed channel means the sender is gone; treat it as shutdown.
        *self.shutdown_rx.borrow() || self.shutdown_rx.has_changed().is_err()
    }

    async fn pause(&mut self, duration: Duration) {
        tokio::select! {
            biased;

            _ = self.shutdown_rx.changed() => {}
            _ = tokio::time::sleep(duration) => {}
        }
    }
}

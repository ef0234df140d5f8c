//! In-process worker pool on top of tokio.
//!
//! Each submission is spawned as its own task, gated by a semaphore for
//! configurable concurrency. Completions flow through an internal channel;
//! `next_completion` is the receiving end, so items submitted while the loop
//! is already waiting join the wait set naturally.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tokio::sync::{Mutex, Semaphore, mpsc};
use tokio::task::AbortHandle;
use tracing::debug;

use crate::domain::{PoolError, StepFailure, TaskId, WorkItem};
use crate::ports::{Completion, WorkerPool};

/// Step function executed by the pool.
///
/// Must be a pure function of its input (no hidden shared mutable state), so
/// out-of-order concurrent execution is safe. Retry, if wanted, is a
/// decoration applied inside the step, not pool behavior.
#[async_trait]
pub trait StepFn<P>: Send + Sync {
    async fn step(&self, item: WorkItem<P>) -> Result<P, StepFailure>;
}

/// Plain async functions and closures are step functions.
#[async_trait]
impl<P, F, Fut> StepFn<P> for F
where
    P: Send + 'static,
    F: Fn(WorkItem<P>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<P, StepFailure>> + Send,
{
    async fn step(&self, item: WorkItem<P>) -> Result<P, StepFailure> {
        self(item).await
    }
}

/// Tokio-backed `WorkerPool` for in-process execution.
///
/// A panicking step is captured and reported as `StepFailure::Panicked` for
/// that submission; it never takes down the pool or the loop.
pub struct SpawnPool<P> {
    step: Arc<dyn StepFn<P>>,
    permits: Arc<Semaphore>,
    completions_tx: mpsc::UnboundedSender<Completion<P>>,
    completions_rx: Mutex<mpsc::UnboundedReceiver<Completion<P>>>,
    /// Abort handles of outstanding submissions, keyed by task identity.
    /// At most one step per task is ever in flight, so the key is unique.
    in_flight: Arc<Mutex<HashMap<TaskId, AbortHandle>>>,
}

impl<P: Send + 'static> SpawnPool<P> {
    /// Pool executing at most `concurrency` steps at once (floored at 1).
    pub fn new(concurrency: usize, step: impl StepFn<P> + 'static) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            step: Arc::new(step),
            permits: Arc::new(Semaphore::new(concurrency.max(1))),
            completions_tx,
            completions_rx: Mutex::new(completions_rx),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl<P: Send + 'static> WorkerPool<P> for SpawnPool<P> {
    async fn submit(&self, item: WorkItem<P>) -> Result<(), PoolError> {
        if self.permits.is_closed() {
            return Err(PoolError::SubmitRejected("pool cancelled".to_string()));
        }

        let task_id = item.task_id();
        let step_no = item.step();
        let step = Arc::clone(&self.step);
        let permits = Arc::clone(&self.permits);
        let tx = self.completions_tx.clone();
        let in_flight = Arc::clone(&self.in_flight);

        let handle = tokio::spawn(async move {
            // Concurrency gate. A closed semaphore means the pool was
            // cancelled while this submission was still queued.
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return,
            };
            let result = match AssertUnwindSafe(step.step(item)).catch_unwind().await {
                Ok(result) => result,
                Err(payload) => Err(StepFailure::Panicked(panic_text(payload.as_ref()))),
            };
            in_flight.lock().await.remove(&task_id);
            // ignore send error: the receiving side may already be gone
            let _ = tx.send(Completion {
                task_id,
                step: step_no,
                result,
            });
        });
        self.in_flight
            .lock()
            .await
            .insert(task_id, handle.abort_handle());
        Ok(())
    }

    async fn next_completion(&self) -> Result<Completion<P>, PoolError> {
        let mut rx = self.completions_rx.lock().await;
        rx.recv().await.ok_or(PoolError::Disconnected)
    }

    async fn cancel_all(&self) {
        // Closing the semaphore rejects new submissions and wakes queued
        // waiters; aborting kills the steps already running.
        self.permits.close();
        let handles: Vec<AbortHandle> = self
            .in_flight
            .lock()
            .await
            .drain()
            .map(|(_, handle)| handle)
            .collect();
        debug!(cancelled = handles.len(), "cancelling outstanding submissions");
        for handle in handles {
            handle.abort();
        }
    }
}

fn panic_text(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    async fn times_ten(item: WorkItem<u32>) -> Result<u32, StepFailure> {
        Ok(item.into_payload() * 10)
    }

    async fn always_fails(_item: WorkItem<u32>) -> Result<u32, StepFailure> {
        Err(StepFailure::Failed("bad input".to_string()))
    }

    async fn panicking_step(_item: WorkItem<u32>) -> Result<u32, StepFailure> {
        panic!("kaboom")
    }

    #[tokio::test]
    async fn executes_submissions_and_reports_completions() {
        let pool = SpawnPool::new(2, times_ten);
        pool.submit(WorkItem::seed(TaskId::new(1), 4)).await.unwrap();

        let completion = pool.next_completion().await.unwrap();
        assert_eq!(completion.task_id, TaskId::new(1));
        assert_eq!(completion.step, 0);
        assert_eq!(completion.result.unwrap(), 40);
    }

    #[tokio::test]
    async fn step_errors_surface_in_the_completion() {
        let pool = SpawnPool::new(1, always_fails);
        pool.submit(WorkItem::seed(TaskId::new(0), 1)).await.unwrap();

        let completion = pool.next_completion().await.unwrap();
        assert_eq!(
            completion.result,
            Err(StepFailure::Failed("bad input".to_string()))
        );
    }

    #[tokio::test]
    async fn panics_are_captured_as_failures() {
        let pool = SpawnPool::new(1, panicking_step);
        pool.submit(WorkItem::seed(TaskId::new(0), 1)).await.unwrap();

        let completion = pool.next_completion().await.unwrap();
        match completion.result {
            Err(StepFailure::Panicked(message)) => assert!(message.contains("kaboom")),
            other => panic!("expected a captured panic, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn concurrency_is_capped_by_the_semaphore() {
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let step = {
            let active = Arc::clone(&active);
            let peak = Arc::clone(&peak);
            move |item: WorkItem<u32>| {
                let active = Arc::clone(&active);
                let peak = Arc::clone(&peak);
                async move {
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    active.fetch_sub(1, Ordering::SeqCst);
                    Ok::<_, StepFailure>(item.into_payload())
                }
            }
        };
        let pool = SpawnPool::new(2, step);

        for i in 0..6u64 {
            pool.submit(WorkItem::seed(TaskId::new(i), i as u32))
                .await
                .unwrap();
        }
        for _ in 0..6 {
            pool.next_completion().await.unwrap();
        }
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    async fn sleepy_step(item: WorkItem<u32>) -> Result<u32, StepFailure> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(item.into_payload())
    }

    #[tokio::test]
    async fn cancel_all_stops_outstanding_work() {
        let pool = SpawnPool::new(1, sleepy_step);
        pool.submit(WorkItem::seed(TaskId::new(0), 1)).await.unwrap();
        pool.submit(WorkItem::seed(TaskId::new(1), 2)).await.unwrap();

        pool.cancel_all().await;

        // Nothing completes any more, and new submissions are rejected.
        let wait = tokio::time::timeout(Duration::from_millis(100), pool.next_completion()).await;
        assert!(wait.is_err());
        assert!(matches!(
            pool.submit(WorkItem::seed(TaskId::new(2), 3)).await,
            Err(PoolError::SubmitRejected(_))
        ));
    }
}

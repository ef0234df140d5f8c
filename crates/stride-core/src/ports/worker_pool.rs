//! WorkerPool port - the loop's only external collaborator.
//!
//! The loop consumes exactly this surface: submit work, wait for the next
//! completion out of the dynamic in-flight set, cancel everything. Pool
//! lifecycle (creation/shutdown) stays with the caller; the pool is handed
//! to the loop at construction.

use async_trait::async_trait;

use crate::domain::{PoolError, StepFailure, TaskId, WorkItem};

/// One completed submission, reported by the pool.
#[derive(Debug)]
pub struct Completion<P> {
    pub task_id: TaskId,

    /// Step index the completed submission carried.
    pub step: u32,

    /// The step's result, or the failure that ended it.
    pub result: Result<P, StepFailure>,
}

/// Executor of step functions, abstracted behind submit/wait/cancel.
///
/// Design intent:
/// - The loop never assumes a FIFO relationship between submission order and
///   completion order.
/// - `next_completion` must support items submitted after the wait began
///   joining the wait set (the in-flight set grows and shrinks while waiting).
/// - `cancel_all` cancels outstanding submissions without affecting results
///   already reported.
#[async_trait]
pub trait WorkerPool<P: Send + 'static>: Send + Sync {
    /// Hand one work item to the pool for execution.
    ///
    /// Must not block on worker availability; queueing is the pool's problem.
    /// An error here means the pool is unusable, not that the item failed.
    async fn submit(&self, item: WorkItem<P>) -> Result<(), PoolError>;

    /// Wait until some outstanding submission completes.
    ///
    /// Callers must only wait while at least one submission is outstanding;
    /// with nothing in flight the pool may wait forever or return
    /// `PoolError::Disconnected`.
    async fn next_completion(&self) -> Result<Completion<P>, PoolError>;

    /// Cancel all outstanding submissions and release worker resources.
    async fn cancel_all(&self);
}

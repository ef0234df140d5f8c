//! WorkLoopBuilder - construction and configuration of a loop.
//!
//! The builder wires the loop to its collaborators (pool, clock) and fixes
//! run policy up front, so `run()` itself can stay infallible apart from the
//! seed-batch precondition.

use std::sync::Arc;

use crate::ports::{Clock, SystemClock, WorkerPool};

/// Default per-task step cap.
///
/// A predicate that never says stop keeps its chain alive forever; the cap
/// turns that documented hazard into a distinguished `StepLimit` outcome.
/// Opt out with [`WorkLoopBuilder::no_step_cap`].
pub const DEFAULT_STEP_CAP: u32 = 100_000;

const DEFAULT_OUTCOME_BUFFER: usize = 64;

/// Completion-driven work loop over a worker pool.
///
/// Holds no per-run state; each call to `run()` spawns an independent driver
/// with its own pending set and outcome channel.
pub struct WorkLoop<P> {
    pub(crate) pool: Arc<dyn WorkerPool<P>>,
    pub(crate) max_steps_per_task: Option<u32>,
    pub(crate) outcome_buffer: usize,
    pub(crate) clock: Arc<dyn Clock>,
}

impl<P: Send + 'static> WorkLoop<P> {
    /// Loop with default configuration.
    pub fn new(pool: Arc<dyn WorkerPool<P>>) -> Self {
        Self::builder(pool).build()
    }

    pub fn builder(pool: Arc<dyn WorkerPool<P>>) -> WorkLoopBuilder<P> {
        WorkLoopBuilder::new(pool)
    }
}

/// Builder for [`WorkLoop`].
pub struct WorkLoopBuilder<P> {
    pool: Arc<dyn WorkerPool<P>>,
    max_steps_per_task: Option<u32>,
    outcome_buffer: usize,
    clock: Arc<dyn Clock>,
}

impl<P: Send + 'static> WorkLoopBuilder<P> {
    pub fn new(pool: Arc<dyn WorkerPool<P>>) -> Self {
        Self {
            pool,
            max_steps_per_task: Some(DEFAULT_STEP_CAP),
            outcome_buffer: DEFAULT_OUTCOME_BUFFER,
            clock: Arc::new(SystemClock),
        }
    }

    /// Retire any chain that is still alive after `cap` step invocations.
    pub fn max_steps_per_task(mut self, cap: u32) -> Self {
        self.max_steps_per_task = Some(cap.max(1));
        self
    }

    /// Remove the step cap entirely. With a predicate that never says stop,
    /// the run will then never terminate.
    pub fn no_step_cap(mut self) -> Self {
        self.max_steps_per_task = None;
        self
    }

    /// Capacity of the outcome channel. A slow consumer backpressures the
    /// driver once this many terminal outcomes are buffered.
    pub fn outcome_buffer(mut self, capacity: usize) -> Self {
        self.outcome_buffer = capacity.max(1);
        self
    }

    /// Swap the clock used to stamp outcomes (tests use `FixedClock`).
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn build(self) -> WorkLoop<P> {
        WorkLoop {
            pool: self.pool,
            max_steps_per_task: self.max_steps_per_task,
            outcome_buffer: self.outcome_buffer,
            clock: self.clock,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PoolError, WorkItem};
    use crate::ports::Completion;
    use async_trait::async_trait;

    struct NoopPool;

    #[async_trait]
    impl WorkerPool<u32> for NoopPool {
        async fn submit(&self, _item: WorkItem<u32>) -> Result<(), PoolError> {
            Ok(())
        }

        async fn next_completion(&self) -> Result<Completion<u32>, PoolError> {
            Err(PoolError::Disconnected)
        }

        async fn cancel_all(&self) {}
    }

    #[test]
    fn defaults_include_the_step_cap() {
        let work_loop = WorkLoop::new(Arc::new(NoopPool));
        assert_eq!(work_loop.max_steps_per_task, Some(DEFAULT_STEP_CAP));
        assert_eq!(work_loop.outcome_buffer, DEFAULT_OUTCOME_BUFFER);
    }

    #[test]
    fn cap_can_be_tuned_or_removed() {
        let capped = WorkLoop::builder(Arc::new(NoopPool))
            .max_steps_per_task(5)
            .build();
        assert_eq!(capped.max_steps_per_task, Some(5));

        let uncapped = WorkLoop::builder(Arc::new(NoopPool)).no_step_cap().build();
        assert_eq!(uncapped.max_steps_per_task, None);
    }

    #[test]
    fn buffer_capacity_has_a_floor_of_one() {
        let work_loop = WorkLoop::builder(Arc::new(NoopPool)).outcome_buffer(0).build();
        assert_eq!(work_loop.outcome_buffer, 1);
    }
}

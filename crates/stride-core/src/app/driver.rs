//! Driver - the completion-driven loop itself.
//!
//! # Flow
//! 1. Submit every seed item to the pool; record each in the pending set.
//! 2. While the pending set is non-empty, wait for the next completion
//!    (the only blocking point) and remove it from the pending set.
//! 3. Evaluate the termination predicate on the result:
//!    - Continue: submit the successor item (same identity, new payload).
//!    - Finish / failure / step cap: emit a terminal outcome.
//! 4. When the pending set drains, the outcome sequence is exhausted.
//!
//! The driver's control logic is single-threaded: exactly one completion is
//! processed at a time, so the pending set needs no locks. No task ever has
//! two outstanding steps at once.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::domain::{LoopError, RunId, StepFailure, TaskId, TaskOutcome, WorkItem};
use crate::domain::outcome::OutcomeKind;
use crate::ports::{Clock, Completion, Decider, Verdict, WorkerPool};

use super::builder::WorkLoop;
use super::status::LoopCounts;

impl<P: Send + 'static> WorkLoop<P> {
    /// Start a run over `seeds`.
    ///
    /// Task identities are assigned in seed order (`task-0`, `task-1`, ...)
    /// and stay stable across resubmission. Returns a handle immediately; the
    /// driver runs as a spawned task and streams terminal outcomes through
    /// the handle in completion order, which is unrelated to seed order.
    ///
    /// The only precondition checked here is a non-empty seed batch.
    pub fn run(
        &self,
        seeds: Vec<P>,
        decider: impl Decider<P> + 'static,
    ) -> Result<RunHandle<P>, LoopError> {
        if seeds.is_empty() {
            return Err(LoopError::EmptySeeds);
        }

        let run_id = RunId::generate();
        let (out_tx, out_rx) = mpsc::channel(self.outcome_buffer);
        let (counts_tx, counts_rx) = watch::channel(LoopCounts::default());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let driver = Driver {
            run_id,
            pool: Arc::clone(&self.pool),
            decider: Arc::new(decider) as Arc<dyn Decider<P>>,
            max_steps: self.max_steps_per_task,
            clock: Arc::clone(&self.clock),
            out_tx,
            counts_tx,
            counts: LoopCounts::default(),
            pending: HashSet::new(),
        };
        let join = tokio::spawn(driver.drive(seeds, shutdown_rx));

        Ok(RunHandle {
            run_id,
            outcomes: out_rx,
            counts_rx,
            shutdown_tx,
            join,
        })
    }
}

/// Handle to one running loop: the lazy outcome sequence plus control.
///
/// Dropping the handle counts as consumer early-exit; the driver notices the
/// closed channel and cancels all outstanding submissions.
pub struct RunHandle<P> {
    run_id: RunId,
    outcomes: mpsc::Receiver<Result<TaskOutcome<P>, LoopError>>,
    counts_rx: watch::Receiver<LoopCounts>,
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl<P> RunHandle<P> {
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Next terminal outcome, in completion order.
    ///
    /// On a clean run this yields exactly one `Ok` per seed item and then
    /// `None`. A run-level failure or abort yields a single `Err` and then
    /// `None`; per-task outcomes already delivered stay valid.
    pub async fn next(&mut self) -> Option<Result<TaskOutcome<P>, LoopError>> {
        self.outcomes.recv().await
    }

    /// Live counters snapshot.
    pub fn counts(&self) -> LoopCounts {
        *self.counts_rx.borrow()
    }

    /// Request cancellation. The driver cancels all outstanding pool
    /// submissions and ends the outcome sequence with `LoopError::Aborted`.
    pub fn abort(&self) {
        // ignore send error: the driver may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    /// Abort and wait for the driver to finish cleaning up.
    pub async fn abort_and_join(mut self) {
        self.abort();
        // Drain so the driver is never stuck on a full outcome channel.
        while self.outcomes.recv().await.is_some() {}
        let _ = self.join.await;
    }

    /// Collect the whole run. Fails on the first run-level error; use
    /// [`RunHandle::next`] to consume mixed per-task outcomes around an
    /// abort instead.
    pub async fn collect(mut self) -> Result<Vec<TaskOutcome<P>>, LoopError> {
        let mut outcomes = Vec::new();
        while let Some(item) = self.outcomes.recv().await {
            outcomes.push(item?);
        }
        Ok(outcomes)
    }
}

struct Driver<P> {
    run_id: RunId,
    pool: Arc<dyn WorkerPool<P>>,
    decider: Arc<dyn Decider<P>>,
    max_steps: Option<u32>,
    clock: Arc<dyn Clock>,
    out_tx: mpsc::Sender<Result<TaskOutcome<P>, LoopError>>,
    counts_tx: watch::Sender<LoopCounts>,
    counts: LoopCounts,
    /// The pending set: submitted but not yet completed. Owned exclusively
    /// by the driver.
    pending: HashSet<TaskId>,
}

impl<P: Send + 'static> Driver<P> {
    async fn drive(mut self, seeds: Vec<P>, mut shutdown_rx: watch::Receiver<bool>) {
        if let Err(error) = self.seed(seeds).await {
            self.fatal(error).await;
            return;
        }

        while !self.pending.is_empty() {
            let completion = tokio::select! {
                changed = shutdown_rx.changed() => {
                    // A dropped sender means the handle is gone; treat both
                    // cases as an abort request.
                    if changed.is_err() || *shutdown_rx.borrow() {
                        debug!(run_id = %self.run_id, outstanding = self.pending.len(), "abort requested");
                        self.pool.cancel_all().await;
                        let _ = self.out_tx.send(Err(LoopError::Aborted)).await;
                        return;
                    }
                    continue;
                }
                completion = self.pool.next_completion() => completion,
            };

            let completion = match completion {
                Ok(completion) => completion,
                Err(error) => {
                    self.fatal(LoopError::Pool(error)).await;
                    return;
                }
            };

            if !self.handle_completion(completion).await {
                return;
            }
        }

        debug!(run_id = %self.run_id, terminal = self.counts.terminal(), "run complete");
    }

    async fn seed(&mut self, seeds: Vec<P>) -> Result<(), LoopError> {
        for (index, payload) in seeds.into_iter().enumerate() {
            let task_id = TaskId::new(index as u64);
            self.pool.submit(WorkItem::seed(task_id, payload)).await?;
            self.pending.insert(task_id);
        }
        self.counts.in_flight = self.pending.len();
        self.publish_counts();
        debug!(run_id = %self.run_id, seeded = self.pending.len(), "seed batch submitted");
        Ok(())
    }

    /// Process one completion. Returns false when the run is over early
    /// (run-level failure or consumer gone).
    async fn handle_completion(&mut self, completion: Completion<P>) -> bool {
        let Completion {
            task_id,
            step,
            result,
        } = completion;

        if !self.pending.remove(&task_id) {
            warn!(run_id = %self.run_id, %task_id, "completion for unknown task, ignoring");
            return true;
        }
        let steps = step + 1;
        self.counts.steps_total += 1;
        self.counts.in_flight = self.pending.len();

        let outcome = match result {
            Err(failure) => TaskOutcome::failed(task_id, steps, self.clock.now(), failure),
            Ok(payload) => match self.decider.decide(&payload) {
                Err(error) => TaskOutcome::failed(
                    task_id,
                    steps,
                    self.clock.now(),
                    StepFailure::Decide(error.to_string()),
                ),
                Ok(Verdict::Finish) => {
                    TaskOutcome::finished(task_id, steps, self.clock.now(), payload)
                }
                Ok(Verdict::Continue) => {
                    if self.max_steps.is_some_and(|cap| steps >= cap) {
                        warn!(run_id = %self.run_id, %task_id, steps, "step cap reached, retiring chain");
                        TaskOutcome::step_limit(task_id, steps, self.clock.now(), payload)
                    } else {
                        // Strict causal chaining: the successor is submitted
                        // only after this step's result has been observed.
                        let item = WorkItem::successor(task_id, steps, payload);
                        if let Err(error) = self.pool.submit(item).await {
                            self.fatal(LoopError::Pool(error)).await;
                            return false;
                        }
                        self.pending.insert(task_id);
                        self.counts.in_flight = self.pending.len();
                        self.publish_counts();
                        return true;
                    }
                }
            },
        };

        match &outcome.kind {
            OutcomeKind::Finished(_) => self.counts.finished += 1,
            OutcomeKind::Failed(_) => self.counts.failed += 1,
            OutcomeKind::StepLimit(_) => self.counts.step_limited += 1,
        }
        self.publish_counts();

        if self.out_tx.send(Ok(outcome)).await.is_err() {
            debug!(run_id = %self.run_id, "consumer gone, cancelling outstanding work");
            self.pool.cancel_all().await;
            return false;
        }
        true
    }

    /// Run-level failure: cancel outstanding work, surface one `Err`, stop.
    async fn fatal(&mut self, error: LoopError) {
        warn!(run_id = %self.run_id, %error, "run failed");
        self.pool.cancel_all().await;
        let _ = self.out_tx.send(Err(error)).await;
    }

    fn publish_counts(&self) {
        // ignore send error: counts are advisory and the handle may be gone
        let _ = self.counts_tx.send(self.counts);
    }
}

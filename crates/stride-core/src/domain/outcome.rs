//! Outcome model: the terminal result of one logical task.
//!
//! This module is architecture-agnostic: it does not assume a particular pool
//! or loop. It only defines the "shape" of results the loop can emit and a
//! consumer can record or explain later.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{StepFailure, TaskId};

/// How a task's chain ended.
///
/// Serialized with SCREAMING_SNAKE_CASE tags: FINISHED / FAILED / STEP_LIMIT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeKind<P> {
    /// The termination predicate said stop; payload is the terminal result.
    Finished(P),

    /// The step or the predicate faulted; the chain ended in error.
    Failed(StepFailure),

    /// The per-task step cap was hit; payload is the last observed result.
    StepLimit(P),
}

/// Terminal outcome of one logical task. Exactly one is emitted per seed item
/// on a clean run, in completion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskOutcome<P> {
    pub task_id: TaskId,

    /// Number of step invocations the chain consumed.
    pub steps: u32,

    pub finished_at: DateTime<Utc>,

    pub kind: OutcomeKind<P>,
}

impl<P> TaskOutcome<P> {
    pub fn finished(task_id: TaskId, steps: u32, finished_at: DateTime<Utc>, payload: P) -> Self {
        Self {
            task_id,
            steps,
            finished_at,
            kind: OutcomeKind::Finished(payload),
        }
    }

    pub fn failed(
        task_id: TaskId,
        steps: u32,
        finished_at: DateTime<Utc>,
        failure: StepFailure,
    ) -> Self {
        Self {
            task_id,
            steps,
            finished_at,
            kind: OutcomeKind::Failed(failure),
        }
    }

    pub fn step_limit(task_id: TaskId, steps: u32, finished_at: DateTime<Utc>, payload: P) -> Self {
        Self {
            task_id,
            steps,
            finished_at,
            kind: OutcomeKind::StepLimit(payload),
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.kind, OutcomeKind::Finished(_))
    }

    /// Terminal payload, if the chain produced one (`Finished` or `StepLimit`).
    pub fn payload(&self) -> Option<&P> {
        match &self.kind {
            OutcomeKind::Finished(p) | OutcomeKind::StepLimit(p) => Some(p),
            OutcomeKind::Failed(_) => None,
        }
    }

    /// Failure, if the chain ended in one.
    pub fn failure(&self) -> Option<&StepFailure> {
        match &self.kind {
            OutcomeKind::Failed(f) => Some(f),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_kind_serializes_as_required_names() {
        let v = serde_json::to_value(OutcomeKind::Finished(1u32)).unwrap();
        assert_eq!(v["kind"], "FINISHED");
        assert_eq!(v["value"], 1);

        let v = serde_json::to_value(OutcomeKind::<u32>::Failed(StepFailure::Failed(
            "oops".to_string(),
        )))
        .unwrap();
        assert_eq!(v["kind"], "FAILED");

        let v = serde_json::to_value(OutcomeKind::StepLimit(2u32)).unwrap();
        assert_eq!(v["kind"], "STEP_LIMIT");
    }

    #[test]
    fn outcome_roundtrip_json() {
        let o = TaskOutcome::finished(TaskId::new(4), 7, Utc::now(), vec![1.0, 2.0]);
        let s = serde_json::to_string(&o).unwrap();
        let back: TaskOutcome<Vec<f64>> = serde_json::from_str(&s).unwrap();
        assert_eq!(back, o);
    }

    #[test]
    fn payload_accessor_matches_kind() {
        let now = Utc::now();
        let ok = TaskOutcome::finished(TaskId::new(0), 1, now, 10u32);
        assert!(ok.is_finished());
        assert_eq!(ok.payload(), Some(&10));
        assert!(ok.failure().is_none());

        let capped = TaskOutcome::step_limit(TaskId::new(1), 5, now, 20u32);
        assert!(!capped.is_finished());
        assert_eq!(capped.payload(), Some(&20));

        let failed = TaskOutcome::<u32>::failed(
            TaskId::new(2),
            3,
            now,
            StepFailure::Failed("e".to_string()),
        );
        assert!(failed.payload().is_none());
        assert!(failed.failure().is_some());
    }
}

//! Error types, split by blast radius.
//!
//! - `StepFailure`: ends one task's chain. Recovered locally; the run keeps
//!   going and other tasks are unaffected.
//! - `PoolError`: the worker pool itself is unusable (cannot submit, cannot
//!   wait). Fatal for the whole run.
//! - `LoopError`: what the consumer of a run can observe as a run-level
//!   terminal condition.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of a single step or of the termination predicate.
///
/// Surfaced as a tagged terminal outcome for that task's identity, never
/// re-raised into another task's results.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepFailure {
    #[error("step failed: {0}")]
    Failed(String),

    #[error("step panicked: {0}")]
    Panicked(String),

    #[error("termination predicate failed: {0}")]
    Decide(String),
}

/// Error a fallible `Decider` may return.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct DecideError(pub String);

impl DecideError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Worker-pool collaborator errors. These abort the whole run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("worker pool rejected submission: {0}")]
    SubmitRejected(String),

    #[error("worker pool completion channel closed")]
    Disconnected,
}

/// Run-level terminal conditions, surfaced to the consumer of a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoopError {
    #[error("seed batch is empty")]
    EmptySeeds,

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error("run aborted before all tasks finished")]
    Aborted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_failure_serializes_tagged() {
        let f = StepFailure::Panicked("boom".to_string());
        let v: serde_json::Value = serde_json::to_value(&f).unwrap();
        assert_eq!(v["kind"], "PANICKED");
        assert_eq!(v["message"], "boom");
    }

    #[test]
    fn pool_error_converts_into_loop_error() {
        let e: LoopError = PoolError::Disconnected.into();
        assert!(matches!(e, LoopError::Pool(PoolError::Disconnected)));
        assert_eq!(e.to_string(), "worker pool completion channel closed");
    }
}

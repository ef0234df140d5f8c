//! Domain identifiers (strongly-typed IDs).
//!
//! Two kinds of identity exist here:
//! - `TaskId`: identity of one logical task. Assigned in seed order when a run
//!   starts and kept stable across resubmission, so observers can attribute
//!   results to the same chain over many rounds.
//! - `RunId`: identity of one `run()` invocation. ULID-based so ids sort by
//!   creation time and can be generated without coordination.

use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

/// Identity of a logical task within a run.
///
/// Stable across resubmission: step N and step N+1 of the same chain carry the
/// same `TaskId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(u64);

impl TaskId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

/// Identity of one loop run, for log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(Ulid);

impl RunId {
    /// Generate a fresh id. ULIDs need no coordination between generators.
    pub fn generate() -> Self {
        Self(Ulid::new())
    }

    pub fn as_ulid(self) -> Ulid {
        self.0
    }
}

impl From<Ulid> for RunId {
    fn from(ulid: Ulid) -> Self {
        Self(ulid)
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_ids_display_with_prefix() {
        assert_eq!(TaskId::new(0).to_string(), "task-0");
        assert_eq!(TaskId::new(42).to_string(), "task-42");
        assert!(RunId::generate().to_string().starts_with("run-"));
    }

    #[test]
    fn task_ids_order_by_value() {
        assert!(TaskId::new(1) < TaskId::new(2));
        assert_eq!(TaskId::new(7), TaskId::new(7));
    }

    #[test]
    fn run_ids_are_sortable_by_creation() {
        let id1 = RunId::generate();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let id2 = RunId::generate();
        assert!(id1 < id2);
    }

    #[test]
    fn ids_roundtrip_through_json() {
        let task = TaskId::new(3);
        let s = serde_json::to_string(&task).unwrap();
        assert_eq!(s, "3"); // transparent: plain number on the wire
        let back: TaskId = serde_json::from_str(&s).unwrap();
        assert_eq!(back, task);

        let run = RunId::generate();
        let s = serde_json::to_string(&run).unwrap();
        let back: RunId = serde_json::from_str(&s).unwrap();
        assert_eq!(back, run);
    }
}

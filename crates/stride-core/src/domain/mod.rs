//! Domain model (ids, work items, outcomes, errors).

pub mod errors;
pub mod ids;
pub mod item;
pub mod outcome;

pub use errors::{DecideError, LoopError, PoolError, StepFailure};
pub use ids::{RunId, TaskId};
pub use item::WorkItem;
pub use outcome::{OutcomeKind, TaskOutcome};

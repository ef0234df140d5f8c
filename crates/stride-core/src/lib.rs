//! stride-core
//!
//! A dynamic completion-driven work loop: submit a seed batch of
//! identity-tagged work items to a worker pool, consume results as they
//! complete (not in submission order), and for each result either reseed the
//! chain or retire it, as decided by a termination predicate. The run ends
//! when no work is outstanding.
//!
//! # Module layout
//! - **domain**: ids, work items, outcomes, errors
//! - **ports**: abstraction layer (WorkerPool, Decider, Clock)
//! - **app**: the loop itself (builder, driver, status)
//! - **impls**: in-process implementations (SpawnPool)
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use stride_core::{SpawnPool, StepFailure, Verdict, WorkItem, WorkLoop};
//!
//! async fn bump(item: WorkItem<u32>) -> Result<u32, StepFailure> {
//!     Ok(item.into_payload() + 1)
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let pool = Arc::new(SpawnPool::new(4, bump));
//! let work_loop = WorkLoop::new(pool);
//! let handle = work_loop
//!     .run(vec![0, 0], |n: &u32| {
//!         if *n < 3 { Verdict::Continue } else { Verdict::Finish }
//!     })
//!     .unwrap();
//! let outcomes = handle.collect().await.unwrap();
//! assert_eq!(outcomes.len(), 2);
//! # }
//! ```

pub mod app;
pub mod domain;
pub mod impls;
pub mod ports;

pub use app::{DEFAULT_STEP_CAP, LoopCounts, RunHandle, WorkLoop, WorkLoopBuilder};
pub use domain::{
    DecideError, LoopError, OutcomeKind, PoolError, RunId, StepFailure, TaskId, TaskOutcome,
    WorkItem,
};
pub use impls::{SpawnPool, StepFn};
pub use ports::{Clock, Completion, Decider, FixedClock, SystemClock, Verdict, WorkerPool};

//! Ports - abstraction layer.
//!
//! Each trait here is a seam between the loop and a collaborator it does not
//! own: the worker pool executing steps, the termination predicate, the clock.
//! Implementations live in `impls` (development/in-process) or with the
//! caller.

pub mod clock;
pub mod decider;
pub mod worker_pool;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::decider::{Decider, Verdict};
pub use self::worker_pool::{Completion, WorkerPool};

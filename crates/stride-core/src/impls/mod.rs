//! Impls - in-process implementations of the ports.
//!
//! `SpawnPool` covers in-process execution and tests. Deployments with
//! out-of-process or remote workers implement `WorkerPool` against their own
//! executor and hand it to the loop; the loop consumes nothing beyond the
//! port surface.

pub mod spawn_pool;

pub use self::spawn_pool::{SpawnPool, StepFn};

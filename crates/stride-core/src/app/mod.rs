//! App - application layer.
//!
//! Combines the ports into the completion-driven loop:
//! - **builder**: construction and run policy (step cap, buffering, clock)
//! - **driver**: seed → wait-one-completion → decide → resubmit-or-emit
//! - **status**: per-run counters

pub mod builder;
pub mod driver;
pub mod status;

pub use self::builder::{DEFAULT_STEP_CAP, WorkLoop, WorkLoopBuilder};
pub use self::driver::RunHandle;
pub use self::status::LoopCounts;

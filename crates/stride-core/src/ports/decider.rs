//! Decider port - the termination predicate.
//!
//! The decider is designed as a pure function (no side effects): it looks at
//! one observed result and says whether that task's chain continues or ends.
//! Execution is left to the pool; bookkeeping is left to the loop.

use crate::domain::DecideError;

/// Continue/stop decision for one observed result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The chain is still alive; reseed the result as the next work item.
    Continue,

    /// The chain is done; emit the result as a terminal outcome.
    Finish,
}

/// Termination predicate over one task's step result.
///
/// Must be pure (no shared mutable state) and total over reachable results.
/// A returned error ends that task's chain with a tagged failure outcome,
/// exactly like a step failure; it never aborts the run.
///
/// Note: a predicate that never returns `Finish` keeps its chain alive
/// forever. The loop's per-task step cap exists as a safeguard for that case.
pub trait Decider<P>: Send + Sync {
    fn decide(&self, result: &P) -> Result<Verdict, DecideError>;
}

/// Infallible predicates can be plain closures.
impl<P, F> Decider<P> for F
where
    F: Fn(&P) -> Verdict + Send + Sync,
{
    fn decide(&self, result: &P) -> Result<Verdict, DecideError> {
        Ok(self(result))
    }
}

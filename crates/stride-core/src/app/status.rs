//! Per-run observability counters.

use serde::{Deserialize, Serialize};

/// Counters for one run, updated by the driver as completions are observed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopCounts {
    /// Submissions currently outstanding on the pool.
    pub in_flight: usize,

    /// Chains retired by the termination predicate.
    pub finished: usize,

    /// Chains retired by a step or predicate failure.
    pub failed: usize,

    /// Chains retired by the per-task step cap.
    pub step_limited: usize,

    /// Step invocations observed across all chains.
    pub steps_total: u64,
}

impl LoopCounts {
    /// Chains that have reached a terminal outcome.
    pub fn terminal(&self) -> usize {
        self.finished + self.failed + self.step_limited
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_sums_all_retired_chains() {
        let counts = LoopCounts {
            in_flight: 2,
            finished: 3,
            failed: 1,
            step_limited: 1,
            steps_total: 40,
        };
        assert_eq!(counts.terminal(), 5);
    }
}

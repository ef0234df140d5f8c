//! WorkItem - one step's input, identity-tagged.

use serde::{Deserialize, Serialize};

use super::TaskId;

/// Carrier for one step of a logical task.
///
/// A `WorkItem` is created either at loop start (the seed batch, step 0) or by
/// the loop itself as the successor of a completed step (same id, step + 1,
/// payload taken from the previous result). The payload is opaque to the loop;
/// only the pool's step function interprets it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem<P> {
    task_id: TaskId,
    step: u32,
    payload: P,
}

impl<P> WorkItem<P> {
    /// First step of a chain.
    pub fn seed(task_id: TaskId, payload: P) -> Self {
        Self {
            task_id,
            step: 0,
            payload,
        }
    }

    /// Next step of an existing chain. `step` is the 0-based index of the new
    /// step, i.e. the number of steps already completed.
    pub fn successor(task_id: TaskId, step: u32, payload: P) -> Self {
        Self {
            task_id,
            step,
            payload,
        }
    }

    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    pub fn step(&self) -> u32 {
        self.step
    }

    pub fn payload(&self) -> &P {
        &self.payload
    }

    pub fn into_payload(self) -> P {
        self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_starts_at_step_zero() {
        let item = WorkItem::seed(TaskId::new(1), "pos");
        assert_eq!(item.task_id(), TaskId::new(1));
        assert_eq!(item.step(), 0);
        assert_eq!(*item.payload(), "pos");
    }

    #[test]
    fn successor_keeps_identity() {
        let item = WorkItem::seed(TaskId::new(5), 10u32);
        let next = WorkItem::successor(item.task_id(), item.step() + 1, 20u32);
        assert_eq!(next.task_id(), TaskId::new(5));
        assert_eq!(next.step(), 1);
        assert_eq!(next.into_payload(), 20);
    }
}

use super::{SchedulingPolicy, pick_ready_by, switch_to};
use crate::core::ProcessQueue;

/// Non-preemptive: when the CPU is free, run the READY process with the
/// smallest total runtime.
pub struct ShortestProcessNext;

impl SchedulingPolicy for ShortestProcessNext {
    const NAME: &'static str = "Shortest Process Next";

    fn init() -> Self {
        Self
    }

    fn select(&mut self, queue: &mut ProcessQueue) {
        if queue.running().is_some() {
            return;
        }
        if let Some(next) = pick_ready_by(queue, |r| r.cycles_done() + r.cycles_todo()) {
            switch_to(queue, None, next);
        }
    }
}

use super::{SchedulingPolicy, pick_ready_by, switch_to};
use crate::core::ProcessQueue;

/// Preemptive shortest-job-first on remaining time. A READY process takes the
/// CPU only with strictly less work left than the RUNNING one.
pub struct ShortestRemainingTime;

impl SchedulingPolicy for ShortestRemainingTime {
    const NAME: &'static str = "Shortest Remaining Time Next";

    fn init() -> Self {
        Self
    }

    fn select(&mut self, queue: &mut ProcessQueue) {
        let Some(candidate) = pick_ready_by(queue, |r| r.cycles_todo()) else {
            return;
        };

        let running = queue.running();
        if let Some(current) = running {
            if queue[current].cycles_todo() <= queue[candidate].cycles_todo() {
                return;
            }
        }
        switch_to(queue, running, candidate);
    }
}

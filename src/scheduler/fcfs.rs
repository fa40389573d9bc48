use super::{SchedulingPolicy, pick_ready_by, switch_to};
use crate::core::ProcessQueue;

/// Non-preemptive: the RUNNING process keeps the CPU until it completes, then
/// the earliest arrival goes next.
pub struct FirstComeFirstServed;

impl SchedulingPolicy for FirstComeFirstServed {
    const NAME: &'static str = "First Come First Serve";

    fn init() -> Self {
        Self
    }

    fn select(&mut self, queue: &mut ProcessQueue) {
        if queue.running().is_some() {
            return;
        }
        if let Some(next) = pick_ready_by(queue, |r| r.arrival_tick()) {
            switch_to(queue, None, next);
        }
    }
}

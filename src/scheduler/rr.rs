use std::collections::VecDeque;

use super::{SchedulingPolicy, switch_to};
use crate::core::{ProcessQueue, ProcessState, RecordRef};

/// Round Robin with a one-tick slice.
///
/// READY processes wait in FIFO order. New arrivals join the back of the line
/// first, then the process whose slice just ended, so the front is always the
/// one that has waited longest since it last ran.
pub struct RoundRobin {
    line: VecDeque<RecordRef>,
    // Records of the queue already placed in line
    seen: usize,
}

impl RoundRobin {
    fn enqueue_arrivals(&mut self, queue: &ProcessQueue) {
        if queue.len() < self.seen {
            self.line.clear();
            self.seen = 0;
        }
        for index in self.seen..queue.len() {
            if let Some(h) = queue.handle_at(index).filter(|&h| queue[h].is_ready()) {
                self.line.push_back(h);
            }
        }
        self.seen = queue.len();
    }
}

impl SchedulingPolicy for RoundRobin {
    const NAME: &'static str = "Round Robin";

    fn init() -> Self {
        Self {
            line: VecDeque::new(),
            seen: 0,
        }
    }

    fn select(&mut self, queue: &mut ProcessQueue) {
        self.enqueue_arrivals(queue);

        let running = queue.running();
        if let Some(current) = running.filter(|&h| queue[h].cycles_todo() > 0) {
            self.line.push_back(current);
        }

        while let Some(next) = self.line.pop_front() {
            let eligible = Some(next) == running
                || queue.get(next).is_some_and(|r| r.state() == ProcessState::Ready);
            if eligible {
                switch_to(queue, running, next);
                return;
            }
        }
    }
}

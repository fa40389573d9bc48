use std::cmp::Ordering;

use super::{SchedulingPolicy, switch_to};
use crate::core::{ProcessQueue, ProcessRecord};

/// Non-preemptive: when the CPU is free, run the READY process with the
/// highest response ratio `(waited + total) / total`.
pub struct HighestResponseRatioNext;

/// Exact ratio comparison by cross-multiplication.
pub fn cmp_response_ratio(a: &ProcessRecord, b: &ProcessRecord) -> Ordering {
    let lhs = u128::from(a.cycles_waited() + a.total_runtime()) * u128::from(b.total_runtime());
    let rhs = u128::from(b.cycles_waited() + b.total_runtime()) * u128::from(a.total_runtime());
    lhs.cmp(&rhs)
}

impl SchedulingPolicy for HighestResponseRatioNext {
    const NAME: &'static str = "Highest Response Ratio Next";

    fn init() -> Self {
        Self
    }

    fn select(&mut self, queue: &mut ProcessQueue) {
        if queue.running().is_some() {
            return;
        }

        // Highest ratio first, then lowest pid
        let next = queue
            .iter()
            .filter(|(_, r)| r.is_ready())
            .min_by(|(_, a), (_, b)| cmp_response_ratio(b, a).then(a.pid().cmp(&b.pid())))
            .map(|(h, _)| h);

        if let Some(next) = next {
            switch_to(queue, None, next);
        }
    }
}

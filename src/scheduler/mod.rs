pub mod fcfs;
pub mod hrrn;
pub mod rr;
pub mod spn;
pub mod srt;

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use crate::core::{ProcessQueue, ProcessRecord, ProcessState, RecordRef};
pub use fcfs::FirstComeFirstServed;
pub use hrrn::HighestResponseRatioNext;
pub use rr::RoundRobin;
pub use spn::ShortestProcessNext;
pub use srt::ShortestRemainingTime;

/// A CPU scheduling policy.
///
/// `select` runs once per tick, after arrivals and before execution. It may
/// only change record states, and at most two of them: the process that was
/// RUNNING and the one chosen to run next. Anything else is reported by the
/// observer as an invariant violation.
pub trait SchedulingPolicy {
    const NAME: &'static str;

    fn init() -> Self;

    fn select(&mut self, queue: &mut ProcessQueue);
}

/// The READY record with the smallest `key`, ties going to the lowest pid.
pub fn pick_ready_by<K: Ord>(
    queue: &ProcessQueue,
    mut key: impl FnMut(&ProcessRecord) -> K,
) -> Option<RecordRef> {
    queue
        .iter()
        .filter(|(_, r)| r.is_ready())
        .min_by_key(|&(_, r)| (key(r), r.pid()))
        .map(|(h, _)| h)
}

/// Put `next` on the CPU, demoting `prev` if it still has work.
pub fn switch_to(queue: &mut ProcessQueue, prev: Option<RecordRef>, next: RecordRef) {
    if let Some(prev) = prev.filter(|&p| p != next) {
        if queue.get(prev).is_some_and(|r| r.cycles_todo() > 0) {
            queue.set_state(prev, ProcessState::Ready);
        }
    }
    queue.set_state(next, ProcessState::Running);
}

/// The closed set of built-in policies, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Policy {
    #[serde(rename = "rr")]
    RoundRobin,
    #[serde(rename = "fcfs")]
    FirstComeFirstServed,
    #[serde(rename = "spn")]
    ShortestProcessNext,
    #[serde(rename = "srt")]
    ShortestRemainingTime,
    #[serde(rename = "hrrn")]
    HighestResponseRatioNext,
}

impl Policy {
    pub const ALL: [Policy; 5] = [
        Policy::RoundRobin,
        Policy::FirstComeFirstServed,
        Policy::ShortestProcessNext,
        Policy::ShortestRemainingTime,
        Policy::HighestResponseRatioNext,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::RoundRobin => RoundRobin::NAME,
            Self::FirstComeFirstServed => FirstComeFirstServed::NAME,
            Self::ShortestProcessNext => ShortestProcessNext::NAME,
            Self::ShortestRemainingTime => ShortestRemainingTime::NAME,
            Self::HighestResponseRatioNext => HighestResponseRatioNext::NAME,
        }
    }

    pub fn short_name(self) -> &'static str {
        match self {
            Self::RoundRobin => "rr",
            Self::FirstComeFirstServed => "fcfs",
            Self::ShortestProcessNext => "spn",
            Self::ShortestRemainingTime => "srt",
            Self::HighestResponseRatioNext => "hrrn",
        }
    }

    pub fn is_preemptive(self) -> bool {
        matches!(self, Self::RoundRobin | Self::ShortestRemainingTime)
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
#[error("unknown policy {0:?} (expected one of rr, fcfs, spn, srt, hrrn)")]
pub struct ParsePolicyError(String);

impl FromStr for Policy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Policy::ALL
            .into_iter()
            .find(|p| p.short_name() == wanted)
            .ok_or_else(|| ParsePolicyError(s.to_owned()))
    }
}

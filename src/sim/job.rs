use serde::Deserialize;

use crate::core::{Pid, Ticks};

// Position in the caller's workload
pub type JobId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Job {
    pub arrival: Ticks,
    pub runtime: Ticks,
}

impl Job {
    pub const fn new(arrival: Ticks, runtime: Ticks) -> Self {
        Self { arrival, runtime }
    }
}

/// A job as it went through one policy run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobInstance {
    pub id: JobId,
    pub pid: Pid,
    pub job: Job,
    pub first_run: Option<Ticks>,
    // Tick during which the last cycle executed
    pub completion_time: Option<Ticks>,
    pub cycles_waited: Ticks,
}

impl JobInstance {
    pub fn turnaround(&self) -> Option<Ticks> {
        self.completion_time.map(|t| t + 1 - self.job.arrival)
    }

    pub fn response(&self) -> Option<Ticks> {
        self.first_run.map(|t| t - self.job.arrival)
    }
}

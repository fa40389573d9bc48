use average::{Estimate, Mean};

use super::JobInstance;
use crate::core::{TickReport, Ticks};

/// Receives the per-tick process table. Formatting is entirely up to the sink.
pub trait ReportSink {
    fn begin_run(&mut self, _policy: &str) {}

    fn tick(&mut self, report: &TickReport);

    fn end_run(&mut self, _summary: &RunSummary) {}
}

impl ReportSink for () {
    fn tick(&mut self, _report: &TickReport) {}
}

impl ReportSink for Vec<TickReport> {
    fn tick(&mut self, report: &TickReport) {
        self.push(report.clone());
    }
}

/// Outcome of one policy run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub policy: &'static str,
    pub ticks: Ticks,
    pub stalled_ticks: Ticks,
    pub jobs: Vec<JobInstance>,
}

impl RunSummary {
    pub fn mean_turnaround(&self) -> f64 {
        avg(self.jobs.iter().filter_map(JobInstance::turnaround))
    }

    pub fn mean_waiting(&self) -> f64 {
        avg(self.jobs.iter().map(|j| j.cycles_waited))
    }

    /// Mean time from arrival to first execution.
    pub fn mean_response(&self) -> f64 {
        avg(self.jobs.iter().filter_map(JobInstance::response))
    }

    pub fn all_completed(&self) -> bool {
        self.jobs.iter().all(|j| j.completion_time.is_some())
    }
}

fn avg(iter: impl Iterator<Item = Ticks>) -> f64 {
    iter.map(|t| t as f64).collect::<Mean>().estimate()
}

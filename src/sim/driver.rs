use tracing::info;

use super::job::{Job, JobInstance};
use super::report::{ReportSink, RunSummary};
use super::workload::SimConfig;
use crate::{
    core::{SchedCore, SchedEvent, TickReport, Ticks},
    error::SimError,
    scheduler::{
        FirstComeFirstServed, HighestResponseRatioNext, Policy, RoundRobin, SchedulingPolicy,
        ShortestProcessNext, ShortestRemainingTime,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    // No live process yet, more jobs still to arrive
    AwaitingArrivals,
    Ticking,
    Finished,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Abort the run if the workload has not drained after this many ticks.
    pub max_ticks: Option<Ticks>,
}

/// One run of policy `P` over a workload.
pub struct Sim<P: SchedulingPolicy> {
    pub core: SchedCore<P>,
    // Sorted by arrival; index == pid
    pub jobs: Vec<JobInstance>,
    job_cursor: usize,
    options: RunOptions,
}

impl<P: SchedulingPolicy> Sim<P> {
    pub fn new(jobs: &[Job], options: RunOptions) -> Self {
        let mut order: Vec<_> = jobs.iter().copied().enumerate().collect();
        order.sort_by_key(|&(id, job)| (job.arrival, id));

        let jobs = order
            .into_iter()
            .enumerate()
            .map(|(pid, (id, job))| JobInstance {
                id,
                pid,
                job,
                first_run: None,
                completion_time: None,
                cycles_waited: 0,
            })
            .collect();

        Self {
            core: SchedCore::new(),
            jobs,
            job_cursor: 0,
            options,
        }
    }

    pub fn state(&self) -> RunState {
        if !self.core.queue().is_empty_of_work() {
            RunState::Ticking
        } else if self.job_cursor < self.jobs.len() {
            RunState::AwaitingArrivals
        } else {
            RunState::Finished
        }
    }

    /// Admit this tick's arrivals and run one tick.
    pub fn step(&mut self) -> Result<TickReport, SimError> {
        self.handle_arrivals()?;
        let report = self.core.tick()?;
        self.record(&report);
        Ok(report)
    }

    fn handle_arrivals(&mut self) -> Result<(), SimError> {
        let now = self.core.now();
        // Contiguous, since jobs are sorted
        while let Some(instance) = self.jobs.get(self.job_cursor) {
            if instance.job.arrival != now {
                break;
            }
            self.core.admit(instance.pid, instance.job.runtime)?;
            self.job_cursor += 1;
        }
        Ok(())
    }

    fn record(&mut self, report: &TickReport) {
        if let Some(pid) = report.running {
            self.jobs[pid].first_run.get_or_insert(report.tick);
        }
        for event in &report.events {
            if let SchedEvent::Completed { pid } = *event {
                self.jobs[pid].completion_time = Some(report.tick);
            }
        }
        for process in &report.processes {
            self.jobs[process.pid].cycles_waited = process.cycles_waited;
        }
    }

    /// Tick until every job has completed, reporting each tick to `sink`.
    pub fn run<R: ReportSink + ?Sized>(&mut self, sink: &mut R) -> Result<RunSummary, SimError> {
        info!(policy = P::NAME, jobs = self.jobs.len(), "starting run");
        sink.begin_run(P::NAME);

        while self.state() != RunState::Finished {
            if let Some(limit) = self.options.max_ticks {
                if self.core.now() >= limit {
                    return Err(SimError::TickLimitExceeded {
                        policy: P::NAME,
                        limit,
                    });
                }
            }
            let report = self.step()?;
            sink.tick(&report);
        }

        let summary = RunSummary {
            policy: P::NAME,
            ticks: self.core.now(),
            stalled_ticks: self.core.observer().stalled_ticks(),
            jobs: self.jobs.clone(),
        };
        self.core.finish();

        info!(
            policy = P::NAME,
            ticks = summary.ticks,
            stalled_ticks = summary.stalled_ticks,
            "run finished"
        );
        sink.end_run(&summary);
        Ok(summary)
    }
}

impl Policy {
    /// Run this policy once over a fresh copy of `jobs`.
    pub fn run<R: ReportSink + ?Sized>(
        self,
        jobs: &[Job],
        options: RunOptions,
        sink: &mut R,
    ) -> Result<RunSummary, SimError> {
        match self {
            Self::RoundRobin => Sim::<RoundRobin>::new(jobs, options).run(sink),
            Self::FirstComeFirstServed => Sim::<FirstComeFirstServed>::new(jobs, options).run(sink),
            Self::ShortestProcessNext => Sim::<ShortestProcessNext>::new(jobs, options).run(sink),
            Self::ShortestRemainingTime => {
                Sim::<ShortestRemainingTime>::new(jobs, options).run(sink)
            }
            Self::HighestResponseRatioNext => {
                Sim::<HighestResponseRatioNext>::new(jobs, options).run(sink)
            }
        }
    }
}

/// Run every configured policy back to back. The first error aborts the
/// remaining runs.
pub fn run_all<R: ReportSink + ?Sized>(
    config: &SimConfig,
    sink: &mut R,
) -> Result<Vec<RunSummary>, SimError> {
    config
        .policies
        .iter()
        .map(|policy| policy.run(&config.jobs, config.options(), sink))
        .collect()
}

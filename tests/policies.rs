//! Scenario tests for the five policies.
//!
//! Each test runs a full simulation and checks which process held the CPU on
//! every tick, plus the invariants that must hold for any policy.

use sched_model::core::{
    ProcessQueue, ProcessState, SchedCore, SchedEvent, TickReport, check_queue,
};
use sched_model::scheduler::{
    FirstComeFirstServed, HighestResponseRatioNext, RoundRobin, ShortestProcessNext,
    ShortestRemainingTime,
};
use sched_model::sim::CLASSIC_JOBS;
use sched_model::{
    InvariantViolation, Job, Policy, RunOptions, SchedulingPolicy, Sim, SimError,
};

fn trace(policy: Policy, jobs: &[Job]) -> Vec<TickReport> {
    let mut ticks = Vec::new();
    policy
        .run(jobs, RunOptions::default(), &mut ticks)
        .expect("run failed");
    ticks
}

/// pid on the CPU for each tick; `None` for idle ticks.
fn timeline(ticks: &[TickReport]) -> Vec<Option<usize>> {
    ticks.iter().map(|t| t.running).collect()
}

fn expand(runs: &[(usize, usize)]) -> Vec<Option<usize>> {
    runs.iter()
        .flat_map(|&(pid, n)| std::iter::repeat_n(Some(pid), n))
        .collect()
}

#[test]
fn test_fcfs_classic_workload() {
    let ticks = trace(Policy::FirstComeFirstServed, &CLASSIC_JOBS);
    assert_eq!(timeline(&ticks), expand(&[(0, 3), (1, 7), (2, 1), (3, 5)]));
}

#[test]
fn test_spn_classic_workload() {
    let ticks = trace(Policy::ShortestProcessNext, &CLASSIC_JOBS);
    assert_eq!(timeline(&ticks), expand(&[(0, 3), (1, 7), (2, 1), (3, 5)]));
}

#[test]
fn test_hrrn_classic_workload() {
    let ticks = trace(Policy::HighestResponseRatioNext, &CLASSIC_JOBS);
    assert_eq!(timeline(&ticks), expand(&[(0, 3), (1, 7), (2, 1), (3, 5)]));
}

#[test]
fn test_srt_short_arrival_preempts() {
    let ticks = trace(Policy::ShortestRemainingTime, &CLASSIC_JOBS);
    assert_eq!(
        timeline(&ticks),
        expand(&[(0, 3), (1, 1), (2, 1), (1, 6), (3, 5)])
    );

    let preempted = &ticks[4];
    assert_eq!(preempted.running, Some(2));
    assert_eq!(preempted.process(1).unwrap().state, ProcessState::Ready);
    assert!(preempted.events.contains(&SchedEvent::StateChange {
        pid: 1,
        from: ProcessState::Running,
        to: ProcessState::Ready,
    }));
}

#[test]
fn test_rr_classic_workload() {
    let ticks = trace(Policy::RoundRobin, &CLASSIC_JOBS);
    let expected: Vec<_> = [0, 0, 1, 0, 1, 2, 1, 3, 1, 3, 1, 3, 1, 3, 1, 3]
        .into_iter()
        .map(Some)
        .collect();
    assert_eq!(timeline(&ticks), expected);

    // pid 1 last ran at tick 4; pid 3 only arrives at tick 6
    assert_eq!(ticks[6].running, Some(1));
}

#[test]
fn test_rr_waiting_process_runs_before_later_arrival() {
    let jobs = [Job::new(0, 5), Job::new(0, 5), Job::new(0, 5), Job::new(2, 5)];
    let ticks = trace(Policy::RoundRobin, &jobs);
    let running = timeline(&ticks);

    assert_eq!(
        running[..8],
        [0, 1, 2, 0, 3, 1, 2, 0].map(Some)
    );
    assert_eq!(ticks.len(), 20);
}

#[test]
fn test_rr_alternates_two_jobs() {
    let ticks = trace(Policy::RoundRobin, &[Job::new(0, 3), Job::new(1, 3)]);
    let running = timeline(&ticks);

    assert!(ticks.len() <= 6);
    assert_eq!(running, vec![Some(0), Some(1), Some(0), Some(1), Some(0), Some(1)]);
    for pair in running[1..].windows(2) {
        assert_ne!(pair[0], pair[1]);
    }
}

#[test]
fn test_single_job_drains_in_runtime_ticks() {
    for policy in Policy::ALL {
        let ticks = trace(policy, &[Job::new(0, 4)]);
        assert_eq!(ticks.len(), 4, "{policy}");
        assert!(ticks.iter().all(|t| t.running == Some(0)), "{policy}");
        let stalled = ticks
            .iter()
            .flat_map(|t| &t.events)
            .any(|e| matches!(e, SchedEvent::Stalled { .. }));
        assert!(!stalled, "{policy}");
    }
}

#[test]
fn test_invariants_hold_on_every_tick() {
    for policy in Policy::ALL {
        for report in trace(policy, &CLASSIC_JOBS) {
            check_queue(&report.processes).unwrap();
            assert!(report.count_in(ProcessState::Running) <= 1);
            for p in &report.processes {
                assert_eq!(p.cycles_done + p.cycles_todo, p.total_runtime);
                if p.state == ProcessState::Dead {
                    assert_eq!(p.cycles_todo, 0);
                }
            }
        }
    }
}

#[test]
fn test_non_preemptive_policies_never_demote() {
    for policy in Policy::ALL.into_iter().filter(|p| !p.is_preemptive()) {
        let demoted = trace(policy, &CLASSIC_JOBS).iter().any(|t| {
            t.events.iter().any(|e| {
                matches!(
                    e,
                    SchedEvent::StateChange {
                        from: ProcessState::Running,
                        to: ProcessState::Ready,
                        ..
                    }
                )
            })
        });
        assert!(!demoted, "{policy}");
    }
}

fn assert_terminal_tick_is_noop<P: SchedulingPolicy>() {
    let mut core = SchedCore::<P>::new();
    core.admit(0, 2).unwrap();
    core.admit(1, 1).unwrap();
    while !core.queue().is_empty_of_work() {
        core.tick().unwrap();
    }

    let before = core.queue().snapshot();
    for _ in 0..2 {
        let report = core.tick().unwrap();
        assert_eq!(report.running, None);
        assert!(report.events.is_empty());
        assert_eq!(report.processes, before);
    }
}

#[test]
fn test_terminal_queue_is_idempotent() {
    assert_terminal_tick_is_noop::<RoundRobin>();
    assert_terminal_tick_is_noop::<FirstComeFirstServed>();
    assert_terminal_tick_is_noop::<ShortestProcessNext>();
    assert_terminal_tick_is_noop::<ShortestRemainingTime>();
    assert_terminal_tick_is_noop::<HighestResponseRatioNext>();
}

/// Marks the first READY process DEAD, which is forbidden: it still has work.
struct Reaper;

impl SchedulingPolicy for Reaper {
    const NAME: &'static str = "Reaper";

    fn init() -> Self {
        Self
    }

    fn select(&mut self, queue: &mut ProcessQueue) {
        let found = queue.iter().find(|(_, r)| r.is_ready()).map(|(h, _)| h);
        if let Some(h) = found {
            queue.set_state(h, ProcessState::Dead);
        }
    }
}

#[test]
fn test_policy_killing_live_process_is_fatal() {
    let err = Sim::<Reaper>::new(&CLASSIC_JOBS, RunOptions::default())
        .run(&mut ())
        .unwrap_err();
    assert!(matches!(
        err,
        SimError::Invariant {
            tick: 0,
            violation: InvariantViolation::UnexpectedTransition {
                pid: 0,
                from: "READY",
                to: "DEAD",
            }
        }
    ));
}

/// Does nothing, ever.
struct Idle;

impl SchedulingPolicy for Idle {
    const NAME: &'static str = "Idle";

    fn init() -> Self {
        Self
    }

    fn select(&mut self, _queue: &mut ProcessQueue) {}
}

#[test]
fn test_tick_limit_stops_a_stuck_policy() {
    let options = RunOptions {
        max_ticks: Some(10),
    };
    let mut ticks = Vec::new();
    let err = Sim::<Idle>::new(&[Job::new(0, 1)], options)
        .run(&mut ticks)
        .unwrap_err();

    assert!(matches!(
        err,
        SimError::TickLimitExceeded {
            policy: "Idle",
            limit: 10
        }
    ));
    assert_eq!(ticks.len(), 10);
    assert_eq!(ticks[9].process(0).unwrap().cycles_waited, 10);
}

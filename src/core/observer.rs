//! Invariant checks for the process table.
//!
//! The free functions work on snapshots so the same checks can run inside the
//! driver and in tests. [`Observer`] wires them into the tick loop.

use super::event::ProcessSnapshot;
use super::state::{Pid, ProcessState, Ticks};
use crate::error::InvariantViolation;

/// Transitions a policy may make in one `select` call: demote the old
/// RUNNING process and promote the new one.
pub const MAX_TRANSITIONS_PER_SELECT: usize = 2;

pub fn check_record(p: &ProcessSnapshot) -> Result<(), InvariantViolation> {
    if p.cycles_done + p.cycles_todo != p.total_runtime {
        return Err(InvariantViolation::CounterMismatch {
            pid: p.pid,
            done: p.cycles_done,
            todo: p.cycles_todo,
            total: p.total_runtime,
        });
    }

    match p.state {
        ProcessState::Dead if p.cycles_todo != 0 => Err(InvariantViolation::DeadWithWork {
            pid: p.pid,
            todo: p.cycles_todo,
        }),
        ProcessState::Ready | ProcessState::Running if p.cycles_todo == 0 => {
            Err(InvariantViolation::IdleWithoutWork {
                pid: p.pid,
                state: p.state.name(),
            })
        }
        _ => Ok(()),
    }
}

/// Every record is consistent and at most one is RUNNING.
pub fn check_queue(processes: &[ProcessSnapshot]) -> Result<(), InvariantViolation> {
    processes.iter().try_for_each(check_record)?;

    let running: Vec<Pid> = processes
        .iter()
        .filter(|p| p.state == ProcessState::Running)
        .map(|p| p.pid)
        .collect();
    if running.len() > 1 {
        return Err(InvariantViolation::MultipleRunning { pids: running });
    }

    Ok(())
}

/// Compare the table before and after a policy's `select`. Returns the state
/// transitions the policy made as `(pid, from, to)`.
///
/// Only READY -> RUNNING and RUNNING -> READY are policy moves; marking a
/// record DEAD is left to the execution pass.
pub fn check_selection(
    before: &[ProcessSnapshot],
    after: &[ProcessSnapshot],
) -> Result<Vec<(Pid, ProcessState, ProcessState)>, InvariantViolation> {
    if before.len() != after.len() || before.iter().zip(after).any(|(b, a)| b.pid != a.pid) {
        return Err(InvariantViolation::ProcessSetChanged {
            before: before.len(),
            after: after.len(),
        });
    }

    let mut transitions = Vec::new();
    for (b, a) in before.iter().zip(after) {
        if (b.cycles_done, b.cycles_todo, b.cycles_waited, b.total_runtime)
            != (a.cycles_done, a.cycles_todo, a.cycles_waited, a.total_runtime)
        {
            return Err(InvariantViolation::ForbiddenMutation { pid: a.pid });
        }
        if b.state == a.state {
            continue;
        }
        if b.state == ProcessState::Dead {
            return Err(InvariantViolation::Revived { pid: a.pid });
        }
        if a.state == ProcessState::Dead {
            return Err(InvariantViolation::UnexpectedTransition {
                pid: a.pid,
                from: b.state.name(),
                to: a.state.name(),
            });
        }
        transitions.push((a.pid, b.state, a.state));
    }

    if transitions.len() > MAX_TRANSITIONS_PER_SELECT {
        return Err(InvariantViolation::TooManyTransitions {
            pids: transitions.iter().map(|t| t.0).collect(),
        });
    }

    check_queue(after)?;
    Ok(transitions)
}

#[derive(Debug, Default)]
pub struct Observer {
    stalled: Ticks,
}

impl Observer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe_selection(
        &mut self,
        before: &[ProcessSnapshot],
        after: &[ProcessSnapshot],
    ) -> Result<Vec<(Pid, ProcessState, ProcessState)>, InvariantViolation> {
        let transitions = check_selection(before, after)?;

        let ready = after.iter().filter(|p| p.state == ProcessState::Ready).count();
        let running = after.iter().any(|p| p.state == ProcessState::Running);
        if ready > 0 && !running {
            self.stalled += 1;
        }

        Ok(transitions)
    }

    pub fn observe_tick(&self, after: &[ProcessSnapshot]) -> Result<(), InvariantViolation> {
        check_queue(after)
    }

    /// Ticks in which READY work existed but nothing was RUNNING.
    pub fn stalled_ticks(&self) -> Ticks {
        self.stalled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(pid: Pid, done: Ticks, todo: Ticks, state: ProcessState) -> ProcessSnapshot {
        ProcessSnapshot {
            pid,
            cycles_done: done,
            cycles_todo: todo,
            total_runtime: done + todo,
            cycles_waited: 0,
            state,
        }
    }

    #[test]
    fn consistent_table_passes() {
        let table = [
            snap(0, 3, 0, ProcessState::Dead),
            snap(1, 1, 6, ProcessState::Running),
            snap(2, 0, 1, ProcessState::Ready),
        ];
        assert_eq!(check_queue(&table), Ok(()));
    }

    #[test]
    fn two_running_is_rejected() {
        let table = [
            snap(0, 0, 3, ProcessState::Running),
            snap(1, 0, 2, ProcessState::Running),
        ];
        assert_eq!(
            check_queue(&table),
            Err(InvariantViolation::MultipleRunning { pids: vec![0, 1] })
        );
    }

    #[test]
    fn broken_counters_are_rejected() {
        let mut p = snap(0, 1, 1, ProcessState::Ready);
        p.total_runtime = 5;
        assert!(matches!(
            check_record(&p),
            Err(InvariantViolation::CounterMismatch { pid: 0, .. })
        ));

        let dead = snap(1, 0, 2, ProcessState::Dead);
        assert_eq!(
            check_record(&dead),
            Err(InvariantViolation::DeadWithWork { pid: 1, todo: 2 })
        );

        let ready = snap(2, 2, 0, ProcessState::Ready);
        assert!(matches!(
            check_record(&ready),
            Err(InvariantViolation::IdleWithoutWork { pid: 2, .. })
        ));
    }

    #[test]
    fn selection_reports_transitions() {
        let before = [
            snap(0, 1, 2, ProcessState::Running),
            snap(1, 0, 4, ProcessState::Ready),
        ];
        let after = [
            snap(0, 1, 2, ProcessState::Ready),
            snap(1, 0, 4, ProcessState::Running),
        ];
        let transitions = check_selection(&before, &after).unwrap();
        assert_eq!(
            transitions,
            vec![
                (0, ProcessState::Running, ProcessState::Ready),
                (1, ProcessState::Ready, ProcessState::Running),
            ]
        );
    }

    #[test]
    fn selection_rejects_counter_edits_and_revivals() {
        let before = [snap(0, 0, 2, ProcessState::Ready)];
        let mut edited = before;
        edited[0].cycles_waited = 9;
        assert_eq!(
            check_selection(&before, &edited),
            Err(InvariantViolation::ForbiddenMutation { pid: 0 })
        );

        let dead = [snap(0, 2, 0, ProcessState::Dead)];
        let revived = [snap(0, 2, 0, ProcessState::Ready)];
        assert_eq!(
            check_selection(&dead, &revived),
            Err(InvariantViolation::Revived { pid: 0 })
        );
    }

    #[test]
    fn selection_rejects_more_than_two_transitions() {
        let before = [
            snap(0, 0, 1, ProcessState::Ready),
            snap(1, 0, 1, ProcessState::Ready),
            snap(2, 0, 1, ProcessState::Running),
        ];
        let after = [
            snap(0, 0, 1, ProcessState::Running),
            snap(1, 0, 1, ProcessState::Ready),
            snap(2, 0, 1, ProcessState::Ready),
        ];
        assert!(check_selection(&before, &after).is_ok());

        // Each move is legal on its own, there are just too many of them
        let before = [
            snap(0, 0, 1, ProcessState::Ready),
            snap(1, 0, 1, ProcessState::Running),
            snap(2, 0, 1, ProcessState::Running),
        ];
        assert_eq!(
            check_selection(&before, &after),
            Err(InvariantViolation::TooManyTransitions { pids: vec![0, 1, 2] })
        );
    }

    #[test]
    fn selection_rejects_killing_a_process() {
        let before = [
            snap(0, 0, 1, ProcessState::Running),
            snap(1, 0, 1, ProcessState::Ready),
        ];
        let killed_ready = [
            snap(0, 0, 1, ProcessState::Running),
            snap(1, 0, 1, ProcessState::Dead),
        ];
        assert_eq!(
            check_selection(&before, &killed_ready),
            Err(InvariantViolation::UnexpectedTransition {
                pid: 1,
                from: "READY",
                to: "DEAD",
            })
        );

        let killed_runner = [
            snap(0, 0, 1, ProcessState::Dead),
            snap(1, 0, 1, ProcessState::Running),
        ];
        assert_eq!(
            check_selection(&before, &killed_runner),
            Err(InvariantViolation::UnexpectedTransition {
                pid: 0,
                from: "RUNNING",
                to: "DEAD",
            })
        );
    }

    #[test]
    fn observer_counts_stalls() {
        let mut observer = Observer::new();
        let table = [snap(0, 0, 2, ProcessState::Ready)];
        observer.observe_selection(&table, &table).unwrap();
        observer.observe_tick(&table).unwrap();
        assert_eq!(observer.stalled_ticks(), 1);
    }
}

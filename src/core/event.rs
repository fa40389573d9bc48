use crate::core::{Pid, ProcessRecord, ProcessState, Ticks};

/// One row of the per-tick status table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessSnapshot {
    pub pid: Pid,
    pub cycles_done: Ticks,
    pub cycles_todo: Ticks,
    pub total_runtime: Ticks,
    pub cycles_waited: Ticks,
    pub state: ProcessState,
}

impl From<&ProcessRecord> for ProcessSnapshot {
    fn from(record: &ProcessRecord) -> Self {
        Self {
            pid: record.pid(),
            cycles_done: record.cycles_done(),
            cycles_todo: record.cycles_todo(),
            total_runtime: record.total_runtime(),
            cycles_waited: record.cycles_waited(),
            state: record.state(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedEvent {
    Admitted {
        pid: Pid,
    },
    // Made by the policy during select()
    StateChange {
        pid: Pid,
        from: ProcessState,
        to: ProcessState,
    },
    Completed {
        pid: Pid,
    },
    // READY processes exist but the policy picked none
    Stalled {
        ready: usize,
    },
}

/// Everything that happened in one tick, handed to the reporting sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub tick: Ticks,
    /// The process that executed during this tick, if any.
    pub running: Option<Pid>,
    /// Process table after the execution pass, in admission order.
    pub processes: Vec<ProcessSnapshot>,
    pub events: Vec<SchedEvent>,
}

impl TickReport {
    pub fn process(&self, pid: Pid) -> Option<&ProcessSnapshot> {
        self.processes.iter().find(|p| p.pid == pid)
    }

    pub fn count_in(&self, state: ProcessState) -> usize {
        self.processes.iter().filter(|p| p.state == state).count()
    }
}

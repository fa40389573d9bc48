use std::collections::TryReserveError;
use std::path::PathBuf;

use thiserror::Error;

use crate::core::{Pid, Ticks};

/// A broken state-machine invariant. Always a policy or driver bug, never a
/// property of the workload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("more than one RUNNING process: {pids:?}")]
    MultipleRunning { pids: Vec<Pid> },

    #[error("process {pid}: done ({done}) + todo ({todo}) != total runtime ({total})")]
    CounterMismatch {
        pid: Pid,
        done: Ticks,
        todo: Ticks,
        total: Ticks,
    },

    #[error("process {pid} is DEAD with {todo} cycles left")]
    DeadWithWork { pid: Pid, todo: Ticks },

    #[error("process {pid} is {state} with no cycles left")]
    IdleWithoutWork { pid: Pid, state: &'static str },

    #[error("policy modified counters of process {pid}")]
    ForbiddenMutation { pid: Pid },

    #[error("policy changed the state of {} processes: {pids:?}", .pids.len())]
    TooManyTransitions { pids: Vec<Pid> },

    #[error("policy revived DEAD process {pid}")]
    Revived { pid: Pid },

    #[error("policy moved process {pid} from {from} to {to}")]
    UnexpectedTransition {
        pid: Pid,
        from: &'static str,
        to: &'static str,
    },

    #[error("policy changed the process set ({before} records before, {after} after)")]
    ProcessSetChanged { before: usize, after: usize },
}

#[derive(Debug, Error)]
pub enum SimError {
    #[error("failed to admit process {pid}: {source}")]
    Allocation {
        pid: Pid,
        #[source]
        source: TryReserveError,
    },

    #[error("invariant violated at tick {tick}: {violation}")]
    Invariant {
        tick: Ticks,
        #[source]
        violation: InvariantViolation,
    },

    #[error("{policy} did not drain the workload within {limit} ticks")]
    TickLimitExceeded { policy: &'static str, limit: Ticks },
}

#[derive(Debug, Error)]
pub enum WorkloadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed workload: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("job {index} has a runtime of zero")]
    ZeroRuntime { index: usize },
}

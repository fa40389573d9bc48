pub mod core;
pub mod error;
pub mod scheduler;
pub mod sim;

pub use error::{InvariantViolation, SimError, WorkloadError};
pub use scheduler::{Policy, SchedulingPolicy};
pub use sim::{Job, ReportSink, RunOptions, RunSummary, Sim, SimConfig};

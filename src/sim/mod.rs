pub mod driver;
pub mod job;
pub mod report;
pub mod workload;

pub use driver::{RunOptions, RunState, Sim, run_all};
pub use job::{Job, JobId, JobInstance};
pub use report::{ReportSink, RunSummary};
pub use workload::{CLASSIC_JOBS, SimConfig, bernoulli_jobs};

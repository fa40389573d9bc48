//! Workload configuration: the job table, which policies to run, and limits.

use std::fs;
use std::path::Path;

use rand::prelude::*;
use serde::Deserialize;

use super::{Job, RunOptions};
use crate::core::Ticks;
use crate::error::WorkloadError;
use crate::scheduler::Policy;

/// The classic four-job exercise workload.
pub const CLASSIC_JOBS: [Job; 4] = [
    Job::new(0, 3),
    Job::new(2, 7),
    Job::new(4, 1),
    Job::new(6, 5),
];

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimConfig {
    #[serde(default = "classic_jobs")]
    pub jobs: Vec<Job>,
    #[serde(default = "all_policies")]
    pub policies: Vec<Policy>,
    #[serde(default)]
    pub max_ticks: Option<Ticks>,
}

fn classic_jobs() -> Vec<Job> {
    CLASSIC_JOBS.to_vec()
}

fn all_policies() -> Vec<Policy> {
    Policy::ALL.to_vec()
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            jobs: classic_jobs(),
            policies: all_policies(),
            max_ticks: None,
        }
    }
}

impl SimConfig {
    pub fn load(path: &Path) -> Result<Self, WorkloadError> {
        let text = fs::read_to_string(path).map_err(|source| WorkloadError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, WorkloadError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), WorkloadError> {
        match self.jobs.iter().position(|j| j.runtime == 0) {
            Some(index) => Err(WorkloadError::ZeroRuntime { index }),
            None => Ok(()),
        }
    }

    pub fn options(&self) -> RunOptions {
        RunOptions {
            max_ticks: self.max_ticks,
        }
    }
}

/// Each tick, a job arrives with probability `p_arrival`; it is short with
/// probability `p_short`. Same seed, same workload.
pub fn bernoulli_jobs(
    ticks: Ticks,
    p_arrival: f64,
    p_short: f64,
    short_ticks: Ticks,
    long_ticks: Ticks,
    seed: u64,
) -> Vec<Job> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut jobs = Vec::new();

    for t in 0..ticks {
        if rng.random::<f64>() < p_arrival {
            let runtime = if rng.random::<f64>() < p_short {
                short_ticks
            } else {
                long_ticks
            };
            jobs.push(Job::new(t, runtime.max(1)));
        }
    }

    jobs
}

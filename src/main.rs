//! Step through each scheduling policy over a workload and print the process
//! table tick by tick.
//!
//! ```bash
//! # Classic four-job workload, all policies
//! sched_model
//!
//! # Random workload, only SRT and HRRN, summaries only
//! sched_model --random 200 --seed 7 -p srt -p hrrn --summary-only
//! ```

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use sched_model::{
    Policy, ReportSink, RunSummary, SimConfig, SimError, WorkloadError,
    core::{ProcessState, TickReport},
    sim::bernoulli_jobs,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sched_model")]
#[command(version, about, long_about = None)]
struct Args {
    /// TOML workload file with `jobs`, `policies` and `max_ticks`
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Policy to simulate (rr, fcfs, spn, srt, hrrn). Repeat for several.
    #[arg(short = 'p', long = "policy")]
    policies: Vec<Policy>,

    /// Replace the job table with a random one spanning this many ticks
    #[arg(long)]
    random: Option<u64>,

    /// Seed for --random. When omitted, a random seed is used.
    #[arg(long)]
    seed: Option<u64>,

    /// Abort a run that has not drained after this many ticks
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Print only the per-policy summary
    #[arg(long)]
    summary_only: bool,

    /// Wait for Enter between policies
    #[arg(long)]
    pause: bool,
}

struct Console {
    summary_only: bool,
}

fn state_label(state: ProcessState) -> &'static str {
    match state {
        ProcessState::Dead => "-",
        ProcessState::Running => "RUNNING",
        ProcessState::Ready => "ready",
    }
}

impl ReportSink for Console {
    fn begin_run(&mut self, policy: &str) {
        println!("Simulation for {policy}:");
    }

    fn tick(&mut self, report: &TickReport) {
        if self.summary_only {
            return;
        }
        print!("Tick {:2}: ", report.tick);
        for p in &report.processes {
            print!(
                "{} (R: {}/{}, W: {}): {:>8}\t",
                p.pid,
                p.cycles_done,
                p.total_runtime,
                p.cycles_waited,
                state_label(p.state)
            );
        }
        println!();
    }

    fn end_run(&mut self, summary: &RunSummary) {
        println!(
            "{} ticks, turnaround {:.2}, waiting {:.2}, response {:.2}",
            summary.ticks,
            summary.mean_turnaround(),
            summary.mean_waiting(),
            summary.mean_response()
        );
        if summary.stalled_ticks > 0 {
            println!("{} ticks with READY processes left idle", summary.stalled_ticks);
        }
    }
}

fn build_config(args: &Args) -> Result<SimConfig, WorkloadError> {
    let mut config = match &args.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };

    if let Some(ticks) = args.random {
        let seed = args.seed.unwrap_or_else(rand::random);
        info!(ticks, seed, "generating random workload");
        config.jobs = bernoulli_jobs(ticks, 0.3, 0.3, 2, 6, seed);
    }
    if !args.policies.is_empty() {
        config.policies = args.policies.clone();
    }
    if args.max_ticks.is_some() {
        config.max_ticks = args.max_ticks;
    }

    config.validate()?;
    Ok(config)
}

fn simulate(config: &SimConfig, args: &Args) -> Result<(), SimError> {
    let mut console = Console {
        summary_only: args.summary_only,
    };

    println!("PID (R: done/(done+todo), W: waited): STATE\n");
    for (i, policy) in config.policies.iter().enumerate() {
        policy.run(&config.jobs, config.options(), &mut console)?;

        if i + 1 != config.policies.len() {
            if args.pause {
                println!("\nPress Enter for next algorithm.\n");
                let _ = io::stdin().lock().read_line(&mut String::new());
            } else {
                println!();
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,sched_model=info")),
        )
        .init();

    let args = Args::parse();

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(err) => {
            error!(%err, "invalid workload");
            return ExitCode::FAILURE;
        }
    };

    match simulate(&config, &args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "fatal error, bailing");
            ExitCode::FAILURE
        }
    }
}

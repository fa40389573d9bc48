use std::mem;

use tracing::{debug, trace, warn};

use super::{
    event::{ProcessSnapshot, SchedEvent, TickReport},
    observer::{self, Observer},
    state::{Pid, ProcessQueue, ProcessState, RecordRef, Ticks},
};
use crate::error::{InvariantViolation, SimError};
use crate::scheduler::SchedulingPolicy;

/// One policy driving one process queue, a tick at a time.
pub struct SchedCore<P: SchedulingPolicy> {
    queue: ProcessQueue,
    policy: P,
    observer: Observer,
    now: Ticks,
    // Admissions since the last tick, reported with it
    pending: Vec<SchedEvent>,
}

impl<P: SchedulingPolicy> SchedCore<P> {
    pub fn new() -> Self {
        Self {
            queue: ProcessQueue::new(),
            policy: P::init(),
            observer: Observer::new(),
            now: 0,
            pending: Vec::new(),
        }
    }

    /// Admit a job at the current tick.
    pub fn admit(&mut self, pid: Pid, total_runtime: Ticks) -> Result<RecordRef, SimError> {
        let handle = self
            .queue
            .admit(pid, self.now, total_runtime)
            .map_err(|source| SimError::Allocation { pid, source })?;
        debug!(tick = self.now, pid, total_runtime, "admitted");
        self.pending.push(SchedEvent::Admitted { pid });
        Ok(handle)
    }

    /// Select, execute and account one tick.
    pub fn tick(&mut self) -> Result<TickReport, SimError> {
        let tick = self.now;
        let invariant = |violation: InvariantViolation| SimError::Invariant { tick, violation };
        let mut events = mem::take(&mut self.pending);

        let before = self.queue.snapshot();
        self.policy.select(&mut self.queue);
        let after = self.queue.snapshot();

        let transitions = self
            .observer
            .observe_selection(&before, &after)
            .map_err(invariant)?;
        for (pid, from, to) in transitions {
            debug!(tick, pid, %from, %to, "state change");
            events.push(SchedEvent::StateChange { pid, from, to });
        }

        let ready = after.iter().filter(|p| p.state == ProcessState::Ready).count();
        if ready > 0 && self.queue.running().is_none() {
            warn!(
                policy = P::NAME,
                tick, ready, "no RUNNING process selected despite READY processes being available"
            );
            events.push(SchedEvent::Stalled { ready });
        }

        let running = self.execute(&mut events).map_err(invariant)?;

        let processes = self.queue.snapshot();
        self.observer.observe_tick(&processes).map_err(invariant)?;

        trace!(tick, ?running, "tick complete");
        self.now += 1;

        Ok(TickReport {
            tick,
            running,
            processes,
            events,
        })
    }

    // Credit one cycle of execution or waiting to every live record
    fn execute(
        &mut self,
        events: &mut Vec<SchedEvent>,
    ) -> Result<Option<Pid>, InvariantViolation> {
        let mut running: Option<Pid> = None;

        for index in 0..self.queue.len() {
            let Some(record) = self
                .queue
                .handle_at(index)
                .and_then(|h| self.queue.get_mut(h))
            else {
                continue;
            };

            match record.state() {
                ProcessState::Running => {
                    if let Some(other) = running {
                        return Err(InvariantViolation::MultipleRunning {
                            pids: vec![other, record.pid()],
                        });
                    }
                    observer::check_record(&ProcessSnapshot::from(&*record))?;

                    record.run_one();
                    running = Some(record.pid());
                    if record.is_dead() {
                        debug!(pid = record.pid(), "completed");
                        events.push(SchedEvent::Completed { pid: record.pid() });
                    }
                }
                ProcessState::Ready => record.wait_one(),
                ProcessState::Dead => {}
            }
        }

        Ok(running)
    }

    /// Release all records at the end of a run.
    pub fn finish(&mut self) {
        self.queue.clear();
    }

    pub fn now(&self) -> Ticks {
        self.now
    }

    pub fn queue(&self) -> &ProcessQueue {
        &self.queue
    }

    pub fn observer(&self) -> &Observer {
        &self.observer
    }
}

impl<P: SchedulingPolicy> Default for SchedCore<P> {
    fn default() -> Self {
        Self::new()
    }
}

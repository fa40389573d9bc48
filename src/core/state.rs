use std::collections::TryReserveError;
use std::fmt;
use std::ops::Index;

use slotmap::{SlotMap, new_key_type};

use super::event::ProcessSnapshot;

// Assigned in admission order, starting at 0
pub type Pid = usize;
pub type Ticks = u64;

new_key_type! {
    /// Stable handle to a record in a [`ProcessQueue`]. Handles from a
    /// cleared queue are stale and resolve to nothing.
    pub struct RecordRef;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessState {
    Dead,
    Running,
    Ready,
}

impl ProcessState {
    pub fn name(self) -> &'static str {
        match self {
            Self::Dead => "DEAD",
            Self::Running => "RUNNING",
            Self::Ready => "READY",
        }
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-job accounting. Counters are only advanced by the execution pass;
/// policies see them read-only and may change nothing but the state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRecord {
    pid: Pid,
    arrival_tick: Ticks,
    total_runtime: Ticks,
    cycles_done: Ticks,
    cycles_waited: Ticks,
    cycles_todo: Ticks,
    state: ProcessState,
}

impl ProcessRecord {
    fn new(pid: Pid, arrival_tick: Ticks, total_runtime: Ticks) -> Self {
        Self {
            pid,
            arrival_tick,
            total_runtime,
            cycles_done: 0,
            cycles_waited: 0,
            cycles_todo: total_runtime,
            state: ProcessState::Ready,
        }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn arrival_tick(&self) -> Ticks {
        self.arrival_tick
    }

    pub fn total_runtime(&self) -> Ticks {
        self.total_runtime
    }

    pub fn cycles_done(&self) -> Ticks {
        self.cycles_done
    }

    pub fn cycles_waited(&self) -> Ticks {
        self.cycles_waited
    }

    pub fn cycles_todo(&self) -> Ticks {
        self.cycles_todo
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == ProcessState::Ready
    }

    pub fn is_running(&self) -> bool {
        self.state == ProcessState::Running
    }

    pub fn is_dead(&self) -> bool {
        self.state == ProcessState::Dead
    }

    // Caller guarantees cycles_todo > 0
    pub(crate) fn run_one(&mut self) {
        debug_assert!(self.cycles_todo > 0, "process {} has nothing to run", self.pid);
        self.cycles_done += 1;
        self.cycles_todo -= 1;
        if self.cycles_todo == 0 {
            self.state = ProcessState::Dead;
        }
    }

    pub(crate) fn wait_one(&mut self) {
        self.cycles_waited += 1;
    }
}

/// Insertion-ordered arena of process records.
///
/// Records live in a [`SlotMap`] and are addressed by [`RecordRef`]; `order`
/// keeps admission order, which never changes for the lifetime of a run.
#[derive(Debug, Default)]
pub struct ProcessQueue {
    records: SlotMap<RecordRef, ProcessRecord>,
    order: Vec<RecordRef>,
}

impl ProcessQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new READY record at the tail.
    pub fn admit(
        &mut self,
        pid: Pid,
        arrival_tick: Ticks,
        total_runtime: Ticks,
    ) -> Result<RecordRef, TryReserveError> {
        debug_assert!(
            self.records().all(|r| r.pid != pid),
            "pid {pid} admitted twice"
        );

        self.try_reserve(1)?;
        let handle = self
            .records
            .insert(ProcessRecord::new(pid, arrival_tick, total_runtime));
        self.order.push(handle);
        Ok(handle)
    }

    /// Reserve room for `additional` records in both the arena and the
    /// admission order, so the next inserts cannot fail on allocation.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.records.try_reserve(additional)?;
        self.order.try_reserve(additional)
    }

    /// Traverse records in admission order. Every call starts from the head.
    pub fn iter(&self) -> impl Iterator<Item = (RecordRef, &ProcessRecord)> + '_ {
        self.order.iter().map(|&h| (h, &self.records[h]))
    }

    pub fn records(&self) -> impl Iterator<Item = &ProcessRecord> + '_ {
        self.order.iter().map(|&h| &self.records[h])
    }

    pub fn get(&self, handle: RecordRef) -> Option<&ProcessRecord> {
        self.records.get(handle)
    }

    pub(crate) fn get_mut(&mut self, handle: RecordRef) -> Option<&mut ProcessRecord> {
        self.records.get_mut(handle)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn handle_at(&self, index: usize) -> Option<RecordRef> {
        self.order.get(index).copied()
    }

    pub fn running(&self) -> Option<RecordRef> {
        self.iter().find(|(_, r)| r.is_running()).map(|(h, _)| h)
    }

    /// True iff no record is READY or RUNNING.
    pub fn is_empty_of_work(&self) -> bool {
        self.records().all(ProcessRecord::is_dead)
    }

    /// The one mutation policies are allowed. Returns the previous state, or
    /// `None` for a stale handle.
    pub fn set_state(&mut self, handle: RecordRef, state: ProcessState) -> Option<ProcessState> {
        let record = self.records.get_mut(handle)?;
        let prev = record.state;
        record.state = state;
        Some(prev)
    }

    /// Release every record. Outstanding handles become stale.
    pub fn clear(&mut self) {
        self.records.clear();
        self.order.clear();
    }

    pub fn snapshot(&self) -> Vec<ProcessSnapshot> {
        self.records().map(ProcessSnapshot::from).collect()
    }
}

impl Index<RecordRef> for ProcessQueue {
    type Output = ProcessRecord;

    fn index(&self, handle: RecordRef) -> &ProcessRecord {
        self.records
            .get(handle)
            .expect("RecordRef does not belong to this queue")
    }
}

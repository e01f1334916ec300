/*!
 * Process Records
 * Script descriptors, live process state, and the process table
 */

use crate::core::types::{Pid, Priority, ResourceId, Tick};
use crate::sim::types::{ProcessState, QueueLink, SimError, SimResult};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// One scripted resource acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AcquireSpec {
    /// Resource to acquire
    pub resource: ResourceId,
    /// Age (ticks of consumed CPU) at which the request is issued
    pub at: Tick,
    /// Ticks of CPU time the resource is held once granted
    pub duration: Tick,
}

/// Process descriptor as produced by the script parser
///
/// This is the core's input format; tests and embedders can construct
/// descriptors directly without going through the text parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProcessScript {
    pub pid: Pid,
    pub lifespan: Tick,
    pub priority: Priority,
    pub start: Tick,
    pub acquires: Vec<AcquireSpec>,
}

impl ProcessScript {
    #[must_use]
    pub fn new(pid: Pid, lifespan: Tick, priority: Priority, start: Tick) -> Self {
        Self {
            pid,
            lifespan,
            priority,
            start,
            acquires: vec![],
        }
    }

    #[must_use]
    pub fn with_acquire(mut self, resource: ResourceId, at: Tick, duration: Tick) -> Self {
        self.acquires.push(AcquireSpec {
            resource,
            at,
            duration,
        });
        self
    }
}

/// A pending scripted acquisition, not yet issued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ResourceRequest {
    pub resource: ResourceId,
    pub at: Tick,
    pub duration: Tick,
}

/// A granted resource with its remaining hold time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ResourceHold {
    pub resource: ResourceId,
    pub remaining: Tick,
}

/// A live process record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Process {
    pub pid: Pid,
    pub lifespan: Tick,
    /// Ticks of CPU time consumed so far; never exceeds `lifespan`
    pub age: Tick,
    pub starts_at: Tick,
    pub state: ProcessState,
    /// Current, possibly boosted or aged priority
    pub priority: Priority,
    /// Immutable baseline the current priority is restored to
    pub base_priority: Priority,
    pub link: QueueLink,
    /// Scripted acquisitions not yet issued, ordered by `at`
    pub pending: VecDeque<ResourceRequest>,
    /// Resources currently held, in acquisition order
    pub holding: Vec<ResourceHold>,
}

impl Process {
    pub(crate) fn from_script(script: &ProcessScript) -> Self {
        let mut requests: Vec<ResourceRequest> = script
            .acquires
            .iter()
            .map(|a| ResourceRequest {
                resource: a.resource,
                at: a.at,
                duration: a.duration,
            })
            .collect();
        // Requests are scripted in ascending age order; normalize so the
        // engine only ever has to look at the front of the queue.
        requests.sort_by_key(|r| r.at);

        Self {
            pid: script.pid,
            lifespan: script.lifespan,
            age: 0,
            starts_at: script.start,
            state: ProcessState::Created,
            priority: script.priority,
            base_priority: script.priority,
            link: QueueLink::Detached,
            pending: VecDeque::from(requests),
            holding: vec![],
        }
    }

    /// Ticks of CPU time still needed
    #[inline]
    #[must_use]
    pub const fn remaining(&self) -> Tick {
        self.lifespan.saturating_sub(self.age)
    }

    /// Check if the lifespan has been fully consumed
    #[inline]
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.age >= self.lifespan
    }

    /// Check if any resource is currently held
    #[inline]
    #[must_use]
    pub fn holds_any(&self) -> bool {
        !self.holding.is_empty()
    }
}

/// All live process records, keyed by pid
///
/// Pure bookkeeping: lookups fail loudly on unknown pids and insertion
/// rejects duplicates, everything else is up to the callers.
#[derive(Debug, Default)]
pub struct ProcessTable {
    procs: HashMap<Pid, Process>,
}

impl ProcessTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, process: Process) -> SimResult<()> {
        let pid = process.pid;
        if self.procs.contains_key(&pid) {
            return Err(SimError::DuplicatePid(pid));
        }
        self.procs.insert(pid, process);
        Ok(())
    }

    pub fn get(&self, pid: Pid) -> SimResult<&Process> {
        self.procs.get(&pid).ok_or(SimError::ProcessNotFound(pid))
    }

    pub fn get_mut(&mut self, pid: Pid) -> SimResult<&mut Process> {
        self.procs
            .get_mut(&pid)
            .ok_or(SimError::ProcessNotFound(pid))
    }

    pub fn remove(&mut self, pid: Pid) -> SimResult<Process> {
        self.procs.remove(&pid).ok_or(SimError::ProcessNotFound(pid))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.procs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.procs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Process> {
        self.procs.values()
    }
}

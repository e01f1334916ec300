/*!
 * Simulation State
 * The one explicit context object: clock, process table, queues, resources
 */

use crate::core::limits::MAX_PRIORITY;
use crate::core::types::{Pid, Priority, ResourceId, Tick};
use crate::sim::event::{Event, EventKind, EventLog};
use crate::sim::process::{Process, ProcessScript, ProcessTable};
use crate::sim::resource::{Resource, ResourceTable};
use crate::sim::types::{ProcessState, QueueLink, SimError, SimResult};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Complete state of one simulation run
///
/// All queue membership goes through the linkage-checked helpers below, so a
/// process can never sit in two queues at once. There are no globals; every
/// component receives this context explicitly and independent runs can
/// coexist in one program.
#[derive(Debug)]
pub struct SimState {
    tick: Tick,
    current: Option<Pid>,
    procs: ProcessTable,
    /// Parsed but not yet forked processes, in script order
    fork_queue: VecDeque<Pid>,
    /// Runnable processes, in the order the active policy maintains
    ready: VecDeque<Pid>,
    resources: ResourceTable,
    events: EventLog,
    retired: Vec<Pid>,
}

impl SimState {
    /// Build the initial state from parsed process descriptors
    pub(crate) fn load(scripts: &[ProcessScript]) -> SimResult<Self> {
        let mut procs = ProcessTable::new();
        let mut fork_queue = VecDeque::with_capacity(scripts.len());
        let resources = ResourceTable::new();

        for script in scripts {
            if script.priority > MAX_PRIORITY {
                return Err(SimError::PriorityOutOfRange {
                    pid: script.pid,
                    priority: script.priority,
                    max: MAX_PRIORITY,
                });
            }
            for acquire in &script.acquires {
                // Fail on bad resource ids before the run starts
                resources.get(acquire.resource)?;
            }
            procs.insert(Process::from_script(script))?;
            fork_queue.push_back(script.pid);
        }

        Ok(Self {
            tick: 0,
            current: None,
            procs,
            fork_queue,
            ready: VecDeque::new(),
            resources,
            events: EventLog::new(),
            retired: vec![],
        })
    }

    #[must_use]
    pub fn tick(&self) -> Tick {
        self.tick
    }

    /// The process running this tick, if any
    #[must_use]
    pub fn current(&self) -> Option<Pid> {
        self.current
    }

    pub fn process(&self, pid: Pid) -> SimResult<&Process> {
        self.procs.get(pid)
    }

    pub fn process_mut(&mut self, pid: Pid) -> SimResult<&mut Process> {
        self.procs.get_mut(pid)
    }

    pub fn processes(&self) -> impl Iterator<Item = &Process> {
        self.procs.iter()
    }

    pub fn resource(&self, resource: ResourceId) -> SimResult<&Resource> {
        self.resources.get(resource)
    }

    pub fn resources(&self) -> impl Iterator<Item = (ResourceId, &Resource)> {
        self.resources.iter()
    }

    /// Pids completed and removed from the system, in completion order
    #[must_use]
    pub fn retired(&self) -> &[Pid] {
        &self.retired
    }

    /// Everything the engine has done so far
    #[must_use]
    pub fn events(&self) -> &[Event] {
        self.events.events()
    }

    // ------------------------------------------------------------------
    // Ready queue

    #[must_use]
    pub fn ready(&self) -> &VecDeque<Pid> {
        &self.ready
    }

    #[must_use]
    pub fn ready_is_empty(&self) -> bool {
        self.ready.is_empty()
    }

    pub fn ready_push_back(&mut self, pid: Pid) -> SimResult<()> {
        self.link(pid, QueueLink::Ready)?;
        self.ready.push_back(pid);
        Ok(())
    }

    pub fn ready_push_front(&mut self, pid: Pid) -> SimResult<()> {
        self.link(pid, QueueLink::Ready)?;
        self.ready.push_front(pid);
        Ok(())
    }

    pub fn ready_pop_front(&mut self) -> SimResult<Option<Pid>> {
        match self.ready.pop_front() {
            Some(pid) => {
                self.unlink(pid)?;
                Ok(Some(pid))
            }
            None => Ok(None),
        }
    }

    /// Detach a specific process from the ready queue
    pub fn ready_remove(&mut self, pid: Pid) -> SimResult<()> {
        let pos = self
            .ready
            .iter()
            .position(|&p| p == pid)
            .ok_or(SimError::MissingFromQueue {
                pid,
                queue: QueueLink::Ready,
            })?;
        self.ready.remove(pos);
        self.unlink(pid)
    }

    // ------------------------------------------------------------------
    // Resource wait queues

    pub fn wait_push_back(&mut self, resource: ResourceId, pid: Pid) -> SimResult<()> {
        self.resources.get(resource)?;
        self.link(pid, QueueLink::Waiting(resource))?;
        self.resources.get_mut(resource)?.waiters.push_back(pid);
        Ok(())
    }

    pub fn wait_pop_front(&mut self, resource: ResourceId) -> SimResult<Option<Pid>> {
        match self.resources.get_mut(resource)?.waiters.pop_front() {
            Some(pid) => {
                self.unlink(pid)?;
                Ok(Some(pid))
            }
            None => Ok(None),
        }
    }

    /// Detach a specific process from a resource's wait queue
    pub fn wait_remove(&mut self, resource: ResourceId, pid: Pid) -> SimResult<()> {
        let slot = self.resources.get_mut(resource)?;
        let pos = slot
            .waiters
            .iter()
            .position(|&p| p == pid)
            .ok_or(SimError::MissingFromQueue {
                pid,
                queue: QueueLink::Waiting(resource),
            })?;
        slot.waiters.remove(pos);
        self.unlink(pid)
    }

    /// Hand ownership of a resource to a process
    pub fn grant(&mut self, resource: ResourceId, pid: Pid) -> SimResult<()> {
        self.procs.get(pid)?;
        self.resources.get_mut(resource)?.owner = Some(pid);
        Ok(())
    }

    /// Clear ownership, verifying the releasing process actually owns it
    pub fn revoke(&mut self, resource: ResourceId, pid: Pid) -> SimResult<()> {
        let slot = self.resources.get_mut(resource)?;
        if slot.owner != Some(pid) {
            return Err(SimError::ReleaseNotOwner {
                pid,
                resource,
                owner: slot.owner,
            });
        }
        slot.owner = None;
        Ok(())
    }

    fn link(&mut self, pid: Pid, target: QueueLink) -> SimResult<()> {
        let p = self.procs.get_mut(pid)?;
        if p.link != QueueLink::Detached {
            return Err(SimError::AlreadyLinked {
                pid,
                target,
                existing: p.link,
            });
        }
        p.link = target;
        Ok(())
    }

    fn unlink(&mut self, pid: Pid) -> SimResult<()> {
        self.procs.get_mut(pid)?.link = QueueLink::Detached;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Engine internals

    pub(crate) fn set_current(&mut self, pid: Option<Pid>) {
        self.current = pid;
    }

    pub(crate) fn advance_clock(&mut self) {
        self.tick += 1;
    }

    pub(crate) fn record(&mut self, kind: EventKind) {
        self.events.record(self.tick, kind);
    }

    #[must_use]
    pub(crate) fn pending_forks(&self) -> bool {
        !self.fork_queue.is_empty()
    }

    /// Fork every process whose start tick has arrived
    pub(crate) fn fork_due(&mut self) -> SimResult<usize> {
        let mut due = Vec::new();
        let pending: Vec<Pid> = self.fork_queue.drain(..).collect();
        for pid in pending {
            if self.procs.get(pid)?.starts_at <= self.tick {
                due.push(pid);
            } else {
                self.fork_queue.push_back(pid);
            }
        }

        let forked = due.len();
        for pid in due {
            self.procs.get_mut(pid)?.state = ProcessState::Ready;
            self.ready_push_back(pid)?;
            self.record(EventKind::Forked { pid });
            debug!("tick {}: forked process {}", self.tick, pid);
        }
        Ok(forked)
    }

    /// Remove a completed process from the system
    pub(crate) fn retire(&mut self, pid: Pid) -> SimResult<()> {
        self.procs.get_mut(pid)?.state = ProcessState::Exited;
        self.procs.remove(pid)?;
        self.retired.push(pid);
        debug!("tick {}: process {} exited", self.tick, pid);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Introspection

    /// Point-in-time view of the whole simulation
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let current = self
            .current
            .and_then(|pid| self.procs.get(pid).ok())
            .map(ProcessSnapshot::from);

        let ready = self
            .ready
            .iter()
            .filter_map(|&pid| self.procs.get(pid).ok())
            .map(ProcessSnapshot::from)
            .collect();

        let resources = self
            .resources
            .iter()
            .filter(|(_, slot)| slot.is_active())
            .map(|(resource, slot)| ResourceSnapshot {
                resource,
                owner: slot.owner,
                waiters: slot.waiters.iter().copied().collect(),
            })
            .collect();

        Snapshot {
            tick: self.tick,
            current,
            ready,
            resources,
        }
    }
}

/// Serializable view of one process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProcessSnapshot {
    pub pid: Pid,
    pub state: ProcessState,
    pub starts_at: Tick,
    pub age: Tick,
    pub lifespan: Tick,
    pub priority: Priority,
}

impl From<&Process> for ProcessSnapshot {
    fn from(p: &Process) -> Self {
        Self {
            pid: p.pid,
            state: p.state,
            starts_at: p.starts_at,
            age: p.age,
            lifespan: p.lifespan,
            priority: p.priority,
        }
    }
}

/// Serializable view of one resource slot with activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ResourceSnapshot {
    pub resource: ResourceId,
    pub owner: Option<Pid>,
    pub waiters: Vec<Pid>,
}

/// Full-state dump: current process, ready queue, active resources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Snapshot {
    pub tick: Tick,
    pub current: Option<ProcessSnapshot>,
    pub ready: Vec<ProcessSnapshot>,
    pub resources: Vec<ResourceSnapshot>,
}

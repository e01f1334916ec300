/*!
 * Simulation Types
 * Process lifecycle states, queue linkage, and error taxonomy
 */

use crate::core::types::{Pid, ResourceId, Tick};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Simulation operation result
///
/// Every error here is an invariant breach: the run must stop rather than
/// continue with corrupted state.
pub type SimResult<T> = Result<T, SimError>;

/// Fatal simulation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    #[error("process {0} not found")]
    ProcessNotFound(Pid),

    #[error("duplicate process id {0}")]
    DuplicatePid(Pid),

    #[error("resource {0} out of range (table holds {1} slots)")]
    ResourceOutOfRange(ResourceId, usize),

    #[error("priority {priority} of process {pid} exceeds the maximum {max}")]
    PriorityOutOfRange { pid: Pid, priority: u32, max: u32 },

    #[error("process {pid} released resource {resource} owned by {owner:?}")]
    ReleaseNotOwner {
        pid: Pid,
        resource: ResourceId,
        owner: Option<Pid>,
    },

    #[error("process {pid} scheduled while still linked to {link:?}")]
    ScheduledWhileLinked { pid: Pid, link: QueueLink },

    #[error("process {pid} linked to {target:?} while already on {existing:?}")]
    AlreadyLinked {
        pid: Pid,
        target: QueueLink,
        existing: QueueLink,
    },

    #[error("process {pid} missing from {queue:?} queue")]
    MissingFromQueue { pid: Pid, queue: QueueLink },

    #[error("process {pid} woken from state {state:?}")]
    BadWakeup { pid: Pid, state: ProcessState },

    #[error("finished process {0} scheduled again")]
    ScheduledFinished(Pid),

    #[error("process {pid} exited in an inconsistent state: {reason}")]
    DirtyExit { pid: Pid, reason: &'static str },

    #[error("no process is running to {0}")]
    NoCurrent(&'static str),
}

/// Process lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    /// Parsed from the script but not yet forked into the system
    Created,
    /// Runnable, sitting in the ready queue or just selected
    Ready,
    /// The one process consuming CPU this tick
    Running,
    /// Blocked on a resource wait queue
    Waiting,
    /// Lifespan spent, removed from the system
    Exited,
}

impl ProcessState {
    /// Short status code used by the state dump
    pub const fn code(&self) -> &'static str {
        match self {
            ProcessState::Created => "NEW",
            ProcessState::Ready => "RDY",
            ProcessState::Running => "RUN",
            ProcessState::Waiting => "WAT",
            ProcessState::Exited => "EXT",
        }
    }
}

/// Where a process is currently queued
///
/// A process belongs to at most one queue at a time; the ready and wait
/// queues only accept detached processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueLink {
    Detached,
    Ready,
    Waiting(ResourceId),
}

/// Outcome of a completed run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RunSummary {
    /// Value of the clock when the simulation stopped
    pub ticks: Tick,
    /// Processes that ran to completion
    pub completed: usize,
}

/*!
 * Event Stream
 * Per-tick record of everything observable the engine did
 */

use crate::core::types::{Pid, ResourceId, Tick};
use log::trace;
use serde::{Deserialize, Serialize};

/// What happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    /// Process entered the system at its scripted start tick
    Forked { pid: Pid },
    /// Process ran to completion and was removed
    Finished { pid: Pid },
    /// Process consumed one tick of CPU
    Ran { pid: Pid },
    /// Process failed an acquisition and blocked
    Blocked { pid: Pid },
    Acquired { pid: Pid, resource: ResourceId },
    Released { pid: Pid, resource: ResourceId },
    /// Nothing was runnable this tick
    Idle,
}

/// An event stamped with the tick it occurred on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Event {
    pub tick: Tick,
    #[serde(flatten)]
    pub kind: EventKind,
}

/// Append-only log of simulation events
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, tick: Tick, kind: EventKind) {
        trace!("tick {tick}: {kind:?}");
        self.events.push(Event { tick, kind });
    }

    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

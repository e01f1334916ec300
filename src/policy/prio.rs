/*!
 * Priority Scheduler
 * Non-preemptive highest-priority selection, priority-wakeup protocol
 */

use crate::core::types::{Pid, ResourceId};
use crate::policy::{protocol, runnable_current, Policy};
use crate::sim::{SimResult, SimState};

pub struct Priority;

/// Remove and return the highest-priority ready process, first match in
/// queue order on ties
pub(super) fn pop_highest(state: &mut SimState) -> SimResult<Option<Pid>> {
    let mut best: Option<(Pid, crate::core::types::Priority)> = None;
    for &pid in state.ready() {
        let priority = state.process(pid)?.priority;
        if best.map_or(true, |(_, bp)| priority > bp) {
            best = Some((pid, priority));
        }
    }
    match best {
        Some((pid, _)) => {
            state.ready_remove(pid)?;
            Ok(Some(pid))
        }
        None => Ok(None),
    }
}

impl Policy for Priority {
    fn name(&self) -> &'static str {
        "Priority"
    }

    fn acquire(&mut self, state: &mut SimState, resource: ResourceId) -> SimResult<bool> {
        protocol::fcfs_acquire(state, resource)
    }

    fn release(&mut self, state: &mut SimState, resource: ResourceId) -> SimResult<()> {
        protocol::priority_release(state, resource)
    }

    fn schedule(&mut self, state: &mut SimState) -> SimResult<Option<Pid>> {
        if let Some(current) = runnable_current(state)? {
            return Ok(Some(current));
        }
        pop_highest(state)
    }
}

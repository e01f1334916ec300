/*!
 * Priority-Ceiling Scheduler
 * Preemptive highest-priority selection over the priority-ceiling protocol
 */

use crate::core::types::{Pid, ResourceId};
use crate::policy::{protocol, runnable_current, Policy};
use crate::sim::{SimResult, SimState};

pub struct PriorityCeiling;

/// Preemptive priority schedule shared by the ceiling and inheritance
/// policies: the current process is preempted as soon as a ready candidate's
/// priority is not lower, selection takes the highest-priority candidate,
/// and no aging happens anywhere.
///
/// Priority boosts belong to the protocol, not the scheduler: a selected
/// candidate is only reset to its base priority when it holds nothing, and a
/// continuing current keeps whatever the protocol gave it. Holders are
/// restored exclusively by `release`.
pub(super) fn preemptive_priority_schedule(state: &mut SimState) -> SimResult<Option<Pid>> {
    if let Some(current) = runnable_current(state)? {
        if !state.ready_is_empty() {
            let mut highest = 0;
            for &pid in state.ready() {
                highest = highest.max(state.process(pid)?.priority);
            }
            if state.process(current)?.priority <= highest {
                state.ready_push_back(current)?;
                return pop_highest_restoring(state);
            }
        }
        return Ok(Some(current));
    }
    pop_highest_restoring(state)
}

fn pop_highest_restoring(state: &mut SimState) -> SimResult<Option<Pid>> {
    let mut best: Option<(Pid, crate::core::types::Priority)> = None;
    for &pid in state.ready() {
        let priority = state.process(pid)?.priority;
        if best.map_or(true, |(_, bp)| priority > bp) {
            best = Some((pid, priority));
        }
    }
    let Some((pid, _)) = best else {
        return Ok(None);
    };

    state.ready_remove(pid)?;
    let p = state.process_mut(pid)?;
    if !p.holds_any() {
        p.priority = p.base_priority;
    }
    Ok(Some(pid))
}

impl Policy for PriorityCeiling {
    fn name(&self) -> &'static str {
        "Priority + PCP Protocol"
    }

    fn acquire(&mut self, state: &mut SimState, resource: ResourceId) -> SimResult<bool> {
        protocol::ceiling_acquire(state, resource)
    }

    fn release(&mut self, state: &mut SimState, resource: ResourceId) -> SimResult<()> {
        protocol::ceiling_release(state, resource)
    }

    fn schedule(&mut self, state: &mut SimState) -> SimResult<Option<Pid>> {
        preemptive_priority_schedule(state)
    }
}

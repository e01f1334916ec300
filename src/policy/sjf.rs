/*!
 * Shortest-Job-First Scheduler
 * Non-preemptive minimum-lifespan selection, FCFS resource protocol
 */

use crate::core::types::{Pid, ResourceId, Tick};
use crate::policy::{protocol, runnable_current, Policy};
use crate::sim::{SimResult, SimState};

pub struct ShortestJobFirst;

/// Find the ready process with the smallest lifespan without removing it;
/// queue order breaks ties
pub(super) fn shortest_ready(state: &SimState) -> SimResult<Option<(Pid, Tick)>> {
    let mut best: Option<(Pid, Tick)> = None;
    for &pid in state.ready() {
        let lifespan = state.process(pid)?.lifespan;
        if best.map_or(true, |(_, shortest)| lifespan < shortest) {
            best = Some((pid, lifespan));
        }
    }
    Ok(best)
}

/// Remove and return the shortest ready process
pub(super) fn pop_shortest(state: &mut SimState) -> SimResult<Option<Pid>> {
    match shortest_ready(state)? {
        Some((pid, _)) => {
            state.ready_remove(pid)?;
            Ok(Some(pid))
        }
        None => Ok(None),
    }
}

impl Policy for ShortestJobFirst {
    fn name(&self) -> &'static str {
        "Shortest-Job First"
    }

    fn acquire(&mut self, state: &mut SimState, resource: ResourceId) -> SimResult<bool> {
        protocol::fcfs_acquire(state, resource)
    }

    fn release(&mut self, state: &mut SimState, resource: ResourceId) -> SimResult<()> {
        protocol::fcfs_release(state, resource)
    }

    fn schedule(&mut self, state: &mut SimState) -> SimResult<Option<Pid>> {
        if let Some(current) = runnable_current(state)? {
            return Ok(Some(current));
        }
        pop_shortest(state)
    }
}

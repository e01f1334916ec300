/*!
 * Shortest-Remaining-Time-First Scheduler
 * Preempts whenever a ready job is shorter than the current's remaining
 * time, FCFS resource protocol
 */

use crate::core::types::{Pid, ResourceId};
use crate::policy::sjf::{pop_shortest, shortest_ready};
use crate::policy::{protocol, runnable_current, Policy};
use crate::sim::{SimResult, SimState};

pub struct ShortestRemainingTimeFirst;

impl Policy for ShortestRemainingTimeFirst {
    fn name(&self) -> &'static str {
        "Shortest Remaining Time First"
    }

    fn acquire(&mut self, state: &mut SimState, resource: ResourceId) -> SimResult<bool> {
        protocol::fcfs_acquire(state, resource)
    }

    fn release(&mut self, state: &mut SimState, resource: ResourceId) -> SimResult<()> {
        protocol::fcfs_release(state, resource)
    }

    fn schedule(&mut self, state: &mut SimState) -> SimResult<Option<Pid>> {
        if let Some(current) = runnable_current(state)? {
            if let Some((candidate, lifespan)) = shortest_ready(state)? {
                // Candidates are weighed by their full lifespan; ties keep
                // the current process on the CPU
                if lifespan < state.process(current)?.remaining() {
                    state.ready_remove(candidate)?;
                    state.ready_push_front(current)?;
                    return Ok(Some(candidate));
                }
            }
            return Ok(Some(current));
        }
        pop_shortest(state)
    }
}

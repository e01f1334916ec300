/*!
 * Round-Robin Scheduler
 * Fixed time slice, rotation through the ready queue, FCFS resource protocol
 */

use crate::core::types::{Pid, ResourceId, Tick};
use crate::policy::{protocol, runnable_current, Policy};
use crate::sim::{SimResult, SimState};

/// Round-robin with a configurable quantum; the simulator always builds it
/// with the canonical one-tick slice
pub struct RoundRobin {
    quantum: Tick,
    /// Ticks the current process has run since it was dispatched
    slice: Tick,
}

impl RoundRobin {
    #[must_use]
    pub fn new() -> Self {
        Self::with_quantum(1)
    }

    #[must_use]
    pub fn with_quantum(quantum: Tick) -> Self {
        Self {
            quantum: quantum.max(1),
            slice: 0,
        }
    }
}

impl Default for RoundRobin {
    fn default() -> Self {
        Self::new()
    }
}

impl Policy for RoundRobin {
    fn name(&self) -> &'static str {
        "Round-Robin"
    }

    fn acquire(&mut self, state: &mut SimState, resource: ResourceId) -> SimResult<bool> {
        protocol::fcfs_acquire(state, resource)
    }

    fn release(&mut self, state: &mut SimState, resource: ResourceId) -> SimResult<()> {
        protocol::fcfs_release(state, resource)
    }

    fn schedule(&mut self, state: &mut SimState) -> SimResult<Option<Pid>> {
        if let Some(current) = runnable_current(state)? {
            self.slice += 1;
            if self.slice >= self.quantum {
                if let Some(next) = state.ready_pop_front()? {
                    state.ready_push_back(current)?;
                    self.slice = 0;
                    return Ok(Some(next));
                }
            }
            // Alone in the system (or mid-quantum): keep running
            return Ok(Some(current));
        }

        self.slice = 0;
        state.ready_pop_front()
    }
}

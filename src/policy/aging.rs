/*!
 * Priority Scheduler with Aging
 * Preemptive highest-priority selection; waiting ready processes gain
 * priority every tick so nothing starves, priority-wakeup protocol
 */

use crate::core::limits::MAX_PRIORITY;
use crate::core::types::{Pid, ResourceId};
use crate::policy::{protocol, runnable_current, Policy};
use crate::sim::{SimResult, SimState};

pub struct PriorityAging;

/// Scan the ready queue for the highest-priority process (first match on
/// ties), aging every other scanned process by one. The winner is detached
/// and its priority reset to the original value so a long wait does not
/// carry over into its next turn.
fn pop_highest_and_age(state: &mut SimState) -> SimResult<Option<Pid>> {
    let pids: Vec<Pid> = state.ready().iter().copied().collect();
    if pids.is_empty() {
        return Ok(None);
    }

    let mut highest = 0;
    for &pid in &pids {
        highest = highest.max(state.process(pid)?.priority);
    }

    let mut chosen = None;
    for &pid in &pids {
        let p = state.process_mut(pid)?;
        if chosen.is_none() && p.priority == highest {
            chosen = Some(pid);
        } else if p.priority < MAX_PRIORITY {
            p.priority += 1;
        }
    }

    let Some(pid) = chosen else {
        return Ok(None);
    };
    state.ready_remove(pid)?;
    let p = state.process_mut(pid)?;
    p.priority = p.base_priority;
    Ok(Some(pid))
}

impl Policy for PriorityAging {
    fn name(&self) -> &'static str {
        "Priority + aging"
    }

    fn acquire(&mut self, state: &mut SimState, resource: ResourceId) -> SimResult<bool> {
        protocol::fcfs_acquire(state, resource)
    }

    fn release(&mut self, state: &mut SimState, resource: ResourceId) -> SimResult<()> {
        protocol::priority_release(state, resource)
    }

    fn schedule(&mut self, state: &mut SimState) -> SimResult<Option<Pid>> {
        if let Some(current) = runnable_current(state)? {
            if !state.ready_is_empty() {
                let mut highest = 0;
                for &pid in state.ready() {
                    highest = highest.max(state.process(pid)?.priority);
                }

                // A ready process that has caught up preempts the current;
                // the preempted process keeps its aged priority at the tail
                if state.process(current)?.priority <= highest {
                    state.ready_push_back(current)?;
                    return pop_highest_and_age(state);
                }

                // Otherwise everyone still waiting grows one step older
                let pids: Vec<Pid> = state.ready().iter().copied().collect();
                for pid in pids {
                    let p = state.process_mut(pid)?;
                    if p.priority < MAX_PRIORITY {
                        p.priority += 1;
                    }
                }
            }

            let p = state.process_mut(current)?;
            p.priority = p.base_priority;
            return Ok(Some(current));
        }

        pop_highest_and_age(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::PolicyKind;
    use crate::sim::{EventKind, ProcessScript, Simulation};

    #[test]
    fn waiting_processes_age_while_current_runs() {
        let scripts = vec![
            ProcessScript::new(1, 3, 5, 0),
            ProcessScript::new(2, 2, 1, 0),
        ];
        let mut sim = Simulation::new(PolicyKind::PriorityAging, &scripts).unwrap();

        sim.step().unwrap(); // tick 0: 1 picked, 2 aged in the scan
        assert_eq!(sim.state().process(2).unwrap().priority, 2);
        sim.step().unwrap(); // tick 1: 1 continues, 2 aged again
        assert_eq!(sim.state().process(2).unwrap().priority, 3);
        sim.step().unwrap();
        assert_eq!(sim.state().process(2).unwrap().priority, 4);
    }

    #[test]
    fn aging_clamps_at_the_maximum_priority() {
        let scripts = vec![
            ProcessScript::new(1, 30, MAX_PRIORITY, 0),
            ProcessScript::new(2, 1, MAX_PRIORITY - 1, 0),
        ];
        let mut sim = Simulation::new(PolicyKind::PriorityAging, &scripts).unwrap();
        for _ in 0..5 {
            sim.step().unwrap();
        }
        // Process 2 ages up to the clamp, then preempts as an equal
        assert!(sim.state().process(2).map_or(true, |p| p.priority <= MAX_PRIORITY));
    }

    #[test]
    fn equal_priority_arrival_preempts_and_alternates() {
        let scripts = vec![
            ProcessScript::new(1, 5, 3, 0),
            ProcessScript::new(2, 2, 3, 1),
        ];
        let mut sim = Simulation::new(PolicyKind::PriorityAging, &scripts).unwrap();
        sim.run().unwrap();

        let ran: Vec<u32> = sim
            .state()
            .events()
            .iter()
            .filter_map(|e| match e.kind {
                EventKind::Ran { pid } => Some(pid),
                _ => None,
            })
            .collect();
        assert_eq!(ran, vec![1, 2, 1, 2, 1, 1, 1]);
    }

    #[test]
    fn chosen_process_restarts_from_its_base_priority() {
        let scripts = vec![
            ProcessScript::new(1, 2, 5, 0),
            ProcessScript::new(2, 1, 1, 0),
        ];
        let mut sim = Simulation::new(PolicyKind::PriorityAging, &scripts).unwrap();
        sim.step().unwrap();
        sim.step().unwrap();
        sim.step().unwrap(); // tick 2: process 2 finally selected

        assert_eq!(sim.state().current(), Some(2));
        assert_eq!(sim.state().process(2).unwrap().priority, 1);
    }
}

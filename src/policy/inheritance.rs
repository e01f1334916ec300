/*!
 * Priority-Inheritance Scheduler
 * Preemptive highest-priority selection over the priority-inheritance
 * protocol; shares its schedule with the ceiling policy
 */

use crate::core::types::{Pid, ResourceId};
use crate::policy::ceiling::preemptive_priority_schedule;
use crate::policy::{protocol, Policy};
use crate::sim::{SimResult, SimState};

pub struct PriorityInheritance;

impl Policy for PriorityInheritance {
    fn name(&self) -> &'static str {
        "Priority + PIP Protocol"
    }

    fn acquire(&mut self, state: &mut SimState, resource: ResourceId) -> SimResult<bool> {
        protocol::inheritance_acquire(state, resource)
    }

    fn release(&mut self, state: &mut SimState, resource: ResourceId) -> SimResult<()> {
        protocol::inheritance_release(state, resource)
    }

    fn schedule(&mut self, state: &mut SimState) -> SimResult<Option<Pid>> {
        preemptive_priority_schedule(state)
    }
}

#[cfg(test)]
mod tests {
    use crate::policy::PolicyKind;
    use crate::sim::{ProcessScript, ProcessState, Simulation};

    #[test]
    fn blocked_high_priority_caller_boosts_the_owner() {
        let scripts = vec![
            ProcessScript::new(1, 4, 1, 0).with_acquire(0, 0, 3),
            ProcessScript::new(2, 2, 5, 1).with_acquire(0, 0, 1),
        ];
        let mut sim = Simulation::new(PolicyKind::PriorityInheritance, &scripts).unwrap();

        sim.step().unwrap(); // tick 0: 1 acquires at its own priority
        assert_eq!(sim.state().process(1).unwrap().priority, 1);

        sim.step().unwrap(); // tick 1: 2 preempts, blocks, donates priority
        assert_eq!(sim.state().process(1).unwrap().priority, 5);
        assert_eq!(sim.state().process(2).unwrap().state, ProcessState::Waiting);
    }

    #[test]
    fn release_restores_the_owner_and_wakes_the_waiter() {
        let scripts = vec![
            ProcessScript::new(1, 4, 1, 0).with_acquire(0, 0, 3),
            ProcessScript::new(2, 2, 5, 1).with_acquire(0, 0, 1),
        ];
        let mut sim = Simulation::new(PolicyKind::PriorityInheritance, &scripts).unwrap();

        for _ in 0..4 {
            sim.step().unwrap();
        }
        // tick 3: the boosted owner finished its hold and dropped back
        assert_eq!(sim.state().process(1).unwrap().priority, 1);
        assert_eq!(sim.state().process(2).unwrap().state, ProcessState::Ready);

        sim.step().unwrap(); // tick 4: the waiter preempts and acquires
        assert_eq!(sim.state().current(), Some(2));
    }
}

/*!
 * Protocol Tests
 * Resource protocol behavior: continuation after grant, boost lifetimes,
 * and the fatal invariant checks
 */

use pretty_assertions::assert_eq;
use schedsim::policy::protocol;
use schedsim::{
    EventKind, Policy, PolicyKind, ProcessScript, SimError, SimResult, SimState, Simulation,
};

#[test]
fn successful_acquirer_keeps_running_under_every_protocol() {
    // A granted acquisition must leave the acquirer on the CPU; it shows up
    // as consecutive run ticks with no detour through the ready queue.
    let scripts = vec![
        ProcessScript::new(1, 3, 5, 0).with_acquire(0, 0, 2),
        ProcessScript::new(2, 2, 2, 0),
    ];
    for kind in [
        PolicyKind::Fifo,
        PolicyKind::Priority,
        PolicyKind::PriorityAging,
        PolicyKind::PriorityCeiling,
        PolicyKind::PriorityInheritance,
    ] {
        let mut sim = Simulation::new(kind, &scripts).unwrap();
        sim.step().unwrap(); // tick 0: 1 selected, acquires, runs
        assert_eq!(sim.state().current(), Some(1), "{kind:?}");
        sim.step().unwrap(); // tick 1: still running, no requeue detour
        assert_eq!(sim.state().current(), Some(1), "{kind:?}");

        let ran: Vec<u32> = sim
            .state()
            .events()
            .iter()
            .filter_map(|e| match e.kind {
                EventKind::Ran { pid } => Some(pid),
                _ => None,
            })
            .collect();
        assert_eq!(ran, vec![1, 1], "{kind:?}");
    }
}

#[test]
fn priority_release_wakes_the_highest_priority_waiter() {
    // Owner 1 holds the resource while 2 (low) and then 3 (high) block on
    // it; the priority protocol must wake 3 first despite 2 arriving first.
    let scripts = vec![
        ProcessScript::new(1, 6, 1, 0).with_acquire(0, 0, 4),
        ProcessScript::new(2, 2, 4, 1).with_acquire(0, 0, 1),
        ProcessScript::new(3, 2, 7, 2).with_acquire(0, 0, 1),
    ];
    let mut sim = Simulation::new(PolicyKind::PriorityAging, &scripts).unwrap();
    sim.run().unwrap();

    let acquires: Vec<u32> = sim
        .state()
        .events()
        .iter()
        .filter_map(|e| match e.kind {
            EventKind::Acquired { pid, resource: 0 } => Some(pid),
            _ => None,
        })
        .collect();
    assert_eq!(acquires, vec![1, 3, 2]);
}

#[test]
fn ceiling_survives_until_the_last_hold_is_released() {
    let scripts = vec![ProcessScript::new(1, 4, 2, 0)
        .with_acquire(0, 0, 3)
        .with_acquire(1, 1, 1)];
    let mut sim = Simulation::new(PolicyKind::PriorityCeiling, &scripts).unwrap();

    sim.step().unwrap(); // tick 0: acquire 0, ceiling up
    assert_eq!(sim.state().process(1).unwrap().priority, 10);
    sim.step().unwrap(); // tick 1: acquire 1, release 1; resource 0 remains
    assert_eq!(sim.state().process(1).unwrap().priority, 10);
    sim.step().unwrap(); // tick 2: release 0, ceiling down
    assert_eq!(sim.state().process(1).unwrap().priority, 2);
}

#[test]
fn inheritance_is_recomputed_from_remaining_holds() {
    // The owner holds two resources; a high-priority waiter is blocked on
    // the first. Releasing the second must not discard the inherited
    // priority that waiter is still owed.
    let scripts = vec![
        ProcessScript::new(1, 5, 1, 0)
            .with_acquire(0, 0, 4)
            .with_acquire(1, 1, 2),
        ProcessScript::new(2, 2, 7, 1).with_acquire(0, 0, 1),
    ];
    let mut sim = Simulation::new(PolicyKind::PriorityInheritance, &scripts).unwrap();

    sim.step().unwrap(); // tick 0: 1 takes resource 0
    sim.step().unwrap(); // tick 1: 2 preempts, blocks, donates priority 7
    assert_eq!(sim.state().process(1).unwrap().priority, 7);

    sim.step().unwrap(); // tick 2: 1 resumes, takes resource 1
    sim.step().unwrap(); // tick 3: resource 1 expires; 0 still contended
    assert_eq!(sim.state().process(1).unwrap().priority, 7);

    sim.step().unwrap(); // tick 4: resource 0 released, boost gone
    assert_eq!(sim.state().process(1).unwrap().priority, 1);
}

/// Policy that reports success without ever granting ownership
struct GrantsNothing;

impl Policy for GrantsNothing {
    fn name(&self) -> &'static str {
        "grants-nothing"
    }

    fn acquire(&mut self, _state: &mut SimState, _resource: usize) -> SimResult<bool> {
        Ok(true)
    }

    fn release(&mut self, state: &mut SimState, resource: usize) -> SimResult<()> {
        protocol::fcfs_release(state, resource)
    }

    fn schedule(&mut self, state: &mut SimState) -> SimResult<Option<u32>> {
        state.ready_pop_front()
    }
}

#[test]
fn releasing_an_unowned_resource_aborts_the_run() {
    let scripts = vec![ProcessScript::new(1, 2, 0, 0).with_acquire(0, 0, 1)];
    let mut sim = Simulation::with_policy(Box::new(GrantsNothing), &scripts).unwrap();

    let err = sim.run().unwrap_err();
    assert_eq!(
        err,
        SimError::ReleaseNotOwner {
            pid: 1,
            resource: 0,
            owner: None,
        }
    );
}

/// Policy that returns a process without detaching it from the ready queue
struct LeavesLinked;

impl Policy for LeavesLinked {
    fn name(&self) -> &'static str {
        "leaves-linked"
    }

    fn acquire(&mut self, state: &mut SimState, resource: usize) -> SimResult<bool> {
        protocol::fcfs_acquire(state, resource)
    }

    fn release(&mut self, state: &mut SimState, resource: usize) -> SimResult<()> {
        protocol::fcfs_release(state, resource)
    }

    fn schedule(&mut self, state: &mut SimState) -> SimResult<Option<u32>> {
        Ok(state.ready().front().copied())
    }
}

#[test]
fn scheduling_a_linked_process_aborts_the_run() {
    let scripts = vec![ProcessScript::new(1, 2, 0, 0)];
    let mut sim = Simulation::with_policy(Box::new(LeavesLinked), &scripts).unwrap();

    let err = sim.run().unwrap_err();
    assert!(matches!(err, SimError::ScheduledWhileLinked { pid: 1, .. }));
}

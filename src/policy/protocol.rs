/*!
 * Resource Protocols
 * The four acquire/release pairs the policies delegate to
 *
 * Every pair preserves mutual exclusion, wakes exactly one waiter per
 * release, and re-inserts woken processes into the ready queue before they
 * can run again. A successful acquirer keeps running under every protocol.
 */

use crate::core::limits::MAX_PRIORITY;
use crate::core::types::{Pid, Priority, ResourceId};
use crate::sim::{ProcessState, SimError, SimResult, SimState};
use log::debug;

/// First-come-first-served acquire: grant if unowned, else block
pub fn fcfs_acquire(state: &mut SimState, resource: ResourceId) -> SimResult<bool> {
    let pid = state.current().ok_or(SimError::NoCurrent("acquire"))?;

    if state.resource(resource)?.owner.is_none() {
        state.grant(resource, pid)?;
        return Ok(true);
    }

    block(state, resource, pid)?;
    Ok(false)
}

/// First-come-first-served release: wake the earliest waiter
pub fn fcfs_release(state: &mut SimState, resource: ResourceId) -> SimResult<()> {
    let pid = state.current().ok_or(SimError::NoCurrent("release"))?;
    state.revoke(resource, pid)?;

    if let Some(waiter) = state.wait_pop_front(resource)? {
        wake(state, waiter)?;
    }
    Ok(())
}

/// Plain-priority release: wake the highest-priority waiter
///
/// Grant and block behave exactly like FCFS, so the plain-priority protocol
/// reuses `fcfs_acquire` and differs only here.
pub fn priority_release(state: &mut SimState, resource: ResourceId) -> SimResult<()> {
    let pid = state.current().ok_or(SimError::NoCurrent("release"))?;
    state.revoke(resource, pid)?;
    wake_highest(state, resource)
}

/// Priority-ceiling acquire: a granted owner runs at the ceiling priority
/// until it releases, so nothing contending can preempt it
pub fn ceiling_acquire(state: &mut SimState, resource: ResourceId) -> SimResult<bool> {
    let pid = state.current().ok_or(SimError::NoCurrent("acquire"))?;

    if state.resource(resource)?.owner.is_none() {
        state.grant(resource, pid)?;
        let p = state.process_mut(pid)?;
        p.priority = MAX_PRIORITY;
        debug!("process {pid} raised to ceiling while holding resource {resource}");
        return Ok(true);
    }

    block(state, resource, pid)?;
    Ok(false)
}

/// Priority-ceiling release: drop the ceiling once no hold remains, then
/// wake the highest-priority waiter
pub fn ceiling_release(state: &mut SimState, resource: ResourceId) -> SimResult<()> {
    let pid = state.current().ok_or(SimError::NoCurrent("release"))?;
    state.revoke(resource, pid)?;

    // The released hold is still on the owner's list at this point; the
    // ceiling stays up while any other resource is held.
    let last_hold = {
        let p = state.process(pid)?;
        !p.holding.iter().any(|h| h.resource != resource)
    };
    if last_hold {
        let p = state.process_mut(pid)?;
        p.priority = p.base_priority;
    }

    wake_highest(state, resource)
}

/// Priority-inheritance acquire: a blocked caller donates its priority to a
/// lower-priority owner (one hop, never chained through further resources)
pub fn inheritance_acquire(state: &mut SimState, resource: ResourceId) -> SimResult<bool> {
    let pid = state.current().ok_or(SimError::NoCurrent("acquire"))?;

    let owner = state.resource(resource)?.owner;
    let Some(owner) = owner else {
        state.grant(resource, pid)?;
        return Ok(true);
    };

    let caller_priority = state.process(pid)?.priority;
    let owner_record = state.process_mut(owner)?;
    if owner_record.priority < caller_priority {
        owner_record.priority = caller_priority;
        debug!("process {owner} inherits priority {caller_priority} from {pid}");
    }

    block(state, resource, pid)?;
    Ok(false)
}

/// Priority-inheritance release: recompute the owner's priority from the
/// waiters still blocked on its remaining holds, then wake the
/// highest-priority waiter of the released resource
pub fn inheritance_release(state: &mut SimState, resource: ResourceId) -> SimResult<()> {
    let pid = state.current().ok_or(SimError::NoCurrent("release"))?;
    state.revoke(resource, pid)?;

    let inherited = {
        let p = state.process(pid)?;
        let mut priority = p.base_priority;
        for hold in p.holding.iter().filter(|h| h.resource != resource) {
            for &waiter in &state.resource(hold.resource)?.waiters {
                priority = priority.max(state.process(waiter)?.priority);
            }
        }
        priority
    };
    state.process_mut(pid)?.priority = inherited;

    wake_highest(state, resource)
}

/// Park the caller on a resource's wait queue
fn block(state: &mut SimState, resource: ResourceId, pid: Pid) -> SimResult<()> {
    state.process_mut(pid)?.state = ProcessState::Waiting;
    state.wait_push_back(resource, pid)
}

/// Move a woken waiter to the back of the ready queue
fn wake(state: &mut SimState, pid: Pid) -> SimResult<()> {
    let p = state.process(pid)?;
    if p.state != ProcessState::Waiting {
        return Err(SimError::BadWakeup {
            pid,
            state: p.state,
        });
    }
    state.process_mut(pid)?.state = ProcessState::Ready;
    state.ready_push_back(pid)
}

/// Wake the single highest-priority waiter, first match on ties
fn wake_highest(state: &mut SimState, resource: ResourceId) -> SimResult<()> {
    let waiter = {
        let mut best: Option<(Pid, Priority)> = None;
        for &pid in &state.resource(resource)?.waiters {
            let priority = state.process(pid)?.priority;
            if best.map_or(true, |(_, bp)| priority > bp) {
                best = Some((pid, priority));
            }
        }
        best.map(|(pid, _)| pid)
    };

    if let Some(pid) = waiter {
        state.wait_remove(resource, pid)?;
        wake(state, pid)?;
    }
    Ok(())
}

/*!
 * Simulation Engine
 * The tick loop: fork, schedule, retire, acquire, age, release
 */

use crate::core::types::Pid;
use crate::policy::{Policy, PolicyKind};
use crate::sim::event::EventKind;
use crate::sim::process::{ProcessScript, ResourceHold};
use crate::sim::state::SimState;
use crate::sim::types::{ProcessState, QueueLink, RunSummary, SimError, SimResult};
use log::{debug, info};

/// A single simulation run: one policy, one state, one clock
///
/// The policy is chosen at construction and immutable for the run. `run`
/// drives the clock to completion; `step` advances exactly one tick so
/// callers can inspect intermediate state.
pub struct Simulation {
    state: SimState,
    policy: Box<dyn Policy>,
}

impl Simulation {
    /// Build a simulation for one of the named policies
    pub fn new(kind: PolicyKind, scripts: &[ProcessScript]) -> SimResult<Self> {
        Self::with_policy(kind.build(), scripts)
    }

    /// Build a simulation around a caller-supplied policy
    pub fn with_policy(
        mut policy: Box<dyn Policy>,
        scripts: &[ProcessScript],
    ) -> SimResult<Self> {
        let mut state = SimState::load(scripts)?;
        policy.initialize(&mut state)?;
        info!(
            "simulation loaded: {} process(es), {} policy",
            scripts.len(),
            policy.name()
        );
        Ok(Self { state, policy })
    }

    #[must_use]
    pub fn state(&self) -> &SimState {
        &self.state
    }

    /// Drive the clock until no process remains
    pub fn run(&mut self) -> SimResult<RunSummary> {
        while self.step()? {}
        self.policy.finalize(&mut self.state)?;

        let summary = RunSummary {
            ticks: self.state.tick(),
            completed: self.state.retired().len(),
        };
        info!(
            "simulation finished: {} tick(s), {} process(es) completed",
            summary.ticks, summary.completed
        );
        Ok(summary)
    }

    /// Advance one tick; returns false once the simulation is over
    pub fn step(&mut self) -> SimResult<bool> {
        self.state.fork_due()?;

        let prev = self.state.current();
        let next = self.policy.schedule(&mut self.state)?;
        self.state.set_current(next);

        if let Some(pid) = prev {
            self.settle_previous(pid, next)?;
        }

        match next {
            None => {
                // Nothing runnable; the run is over once nothing is left to fork
                if self.state.ready_is_empty() && !self.state.pending_forks() {
                    return Ok(false);
                }
                self.state.record(EventKind::Idle);
            }
            Some(pid) => {
                let p = self.state.process(pid)?;
                if p.link != QueueLink::Detached {
                    return Err(SimError::ScheduledWhileLinked { pid, link: p.link });
                }
                self.state.process_mut(pid)?.state = ProcessState::Running;

                if self.run_acquires(pid)? {
                    // Every acquisition due this tick succeeded: progress
                    self.state.record(EventKind::Ran { pid });
                    self.state.process_mut(pid)?.age += 1;
                    self.run_releases(pid)?;
                } else {
                    // Blocked mid-acquisition: no aging, no releases
                    self.state.record(EventKind::Blocked { pid });
                }
            }
        }

        self.state.advance_clock();
        Ok(true)
    }

    /// Demote last tick's process and retire it if its lifespan is spent
    fn settle_previous(&mut self, pid: Pid, next: Option<Pid>) -> SimResult<()> {
        let finished = {
            let p = self.state.process_mut(pid)?;
            if p.state == ProcessState::Running {
                p.state = ProcessState::Ready;
            }
            p.is_finished()
        };
        if !finished {
            return Ok(());
        }
        if next == Some(pid) {
            return Err(SimError::ScheduledFinished(pid));
        }

        let p = self.state.process(pid)?;
        if p.link != QueueLink::Detached {
            return Err(SimError::DirtyExit {
                pid,
                reason: "still linked to a queue",
            });
        }
        if !p.holding.is_empty() {
            return Err(SimError::DirtyExit {
                pid,
                reason: "still holding resources",
            });
        }
        if !p.pending.is_empty() {
            return Err(SimError::DirtyExit {
                pid,
                reason: "unissued resource requests remain",
            });
        }

        self.state.record(EventKind::Finished { pid });
        self.state.retire(pid)
    }

    /// Issue every acquisition scheduled for the current age
    ///
    /// Returns false as soon as one blocks; already-granted requests stay
    /// granted and the failed one is retried when the process runs again.
    fn run_acquires(&mut self, pid: Pid) -> SimResult<bool> {
        loop {
            let due = {
                let p = self.state.process(pid)?;
                match p.pending.front() {
                    Some(r) if r.at == p.age => Some(r.resource),
                    _ => None,
                }
            };
            let Some(resource) = due else {
                return Ok(true);
            };

            if !self.policy.acquire(&mut self.state, resource)? {
                debug!("tick {}: process {} blocked on resource {}", self.state.tick(), pid, resource);
                return Ok(false);
            }

            let p = self.state.process_mut(pid)?;
            if let Some(request) = p.pending.pop_front() {
                p.holding.push(ResourceHold {
                    resource: request.resource,
                    remaining: request.duration,
                });
            }
            self.state.record(EventKind::Acquired { pid, resource });
        }
    }

    /// Count down every hold and release the ones that expire this tick
    fn run_releases(&mut self, pid: Pid) -> SimResult<()> {
        let expiring: Vec<_> = {
            let p = self.state.process_mut(pid)?;
            p.holding
                .iter_mut()
                .filter_map(|hold| {
                    hold.remaining -= 1;
                    (hold.remaining == 0).then_some(hold.resource)
                })
                .collect()
        };

        for resource in expiring {
            self.policy.release(&mut self.state, resource)?;
            let p = self.state.process_mut(pid)?;
            p.holding.retain(|hold| hold.resource != resource);
            self.state.record(EventKind::Released { pid, resource });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::process::ProcessScript;

    #[test]
    fn late_start_produces_idle_ticks() {
        let scripts = vec![ProcessScript::new(1, 2, 0, 3)];
        let mut sim = Simulation::new(PolicyKind::Fifo, &scripts).unwrap();
        let summary = sim.run().unwrap();

        let idle_ticks: Vec<_> = sim
            .state()
            .events()
            .iter()
            .filter(|e| e.kind == EventKind::Idle)
            .map(|e| e.tick)
            .collect();
        assert_eq!(idle_ticks, vec![0, 1, 2]);
        assert_eq!(summary.completed, 1);
    }

    #[test]
    fn empty_script_terminates_immediately() {
        let mut sim = Simulation::new(PolicyKind::Fifo, &[]).unwrap();
        let summary = sim.run().unwrap();
        assert_eq!(summary.ticks, 0);
        assert_eq!(summary.completed, 0);
    }

    #[test]
    fn deadlocked_script_terminates_with_stranded_waiters() {
        // Two processes acquire the same two resources in opposite order;
        // under round-robin both end up blocked on each other forever.
        let scripts = vec![
            ProcessScript::new(1, 4, 0, 0)
                .with_acquire(0, 0, 3)
                .with_acquire(1, 1, 1),
            ProcessScript::new(2, 4, 0, 0)
                .with_acquire(1, 0, 3)
                .with_acquire(0, 1, 1),
        ];
        let mut sim = Simulation::new(PolicyKind::RoundRobin, &scripts).unwrap();
        let summary = sim.run().unwrap();

        assert_eq!(summary.completed, 0);
        let snapshot = sim.state().snapshot();
        assert!(snapshot.current.is_none());
        assert!(snapshot.ready.is_empty());
        let waiters: usize = snapshot.resources.iter().map(|r| r.waiters.len()).sum();
        assert_eq!(waiters, 2);
    }

    #[test]
    fn finishing_tick_is_followed_by_exit_event() {
        let scripts = vec![ProcessScript::new(7, 1, 0, 0)];
        let mut sim = Simulation::new(PolicyKind::Fifo, &scripts).unwrap();
        sim.run().unwrap();

        let events = sim.state().events();
        assert_eq!(events[0].kind, EventKind::Forked { pid: 7 });
        assert_eq!(events[1].kind, EventKind::Ran { pid: 7 });
        assert_eq!(events[2].kind, EventKind::Finished { pid: 7 });
        assert_eq!(events[2].tick, 1);
    }
}

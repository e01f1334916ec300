/*!
 * Scheduling Policies
 * The acquire/release/schedule contract and the eight named policies
 */

use crate::core::types::{Pid, ResourceId};
use crate::sim::{ProcessState, SimResult, SimState};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

mod aging;
mod ceiling;
mod fifo;
mod inheritance;
mod prio;
pub mod protocol;
mod rr;
mod sjf;
mod srtf;

pub use aging::PriorityAging;
pub use ceiling::PriorityCeiling;
pub use fifo::Fifo;
pub use inheritance::PriorityInheritance;
pub use prio::Priority;
pub use rr::RoundRobin;
pub use sjf::ShortestJobFirst;
pub use srtf::ShortestRemainingTimeFirst;

/// A scheduling policy paired with its resource protocol
///
/// One implementation is selected at startup and kept for the whole run.
/// `acquire` and `release` act on behalf of the running process; `schedule`
/// is called once per tick, after forks and before acquisitions, and must
/// return a process detached from every queue (or none).
///
/// Mixing the `acquire`/`release` pair of one policy with the `schedule` of
/// another breaks protocol correctness, which is why all three live on one
/// trait; the trait also makes a missing hook a compile error rather than a
/// runtime fault.
pub trait Policy {
    fn name(&self) -> &'static str;

    /// Optional startup hook
    fn initialize(&mut self, _state: &mut SimState) -> SimResult<()> {
        Ok(())
    }

    /// Optional end-of-run hook
    fn finalize(&mut self, _state: &mut SimState) -> SimResult<()> {
        Ok(())
    }

    /// Try to take a resource for the running process; false means the
    /// caller is now blocked on the resource's wait queue
    fn acquire(&mut self, state: &mut SimState, resource: ResourceId) -> SimResult<bool>;

    /// Give up a resource held by the running process and wake a waiter
    fn release(&mut self, state: &mut SimState, resource: ResourceId) -> SimResult<()>;

    /// Pick the process to run this tick
    fn schedule(&mut self, state: &mut SimState) -> SimResult<Option<Pid>>;
}

/// The eight selectable policies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    Fifo,
    Sjf,
    Srtf,
    RoundRobin,
    Priority,
    PriorityAging,
    PriorityCeiling,
    PriorityInheritance,
}

impl PolicyKind {
    /// Human-readable policy name, matching `Policy::name`
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            PolicyKind::Fifo => "FIFO",
            PolicyKind::Sjf => "Shortest-Job First",
            PolicyKind::Srtf => "Shortest Remaining Time First",
            PolicyKind::RoundRobin => "Round-Robin",
            PolicyKind::Priority => "Priority",
            PolicyKind::PriorityAging => "Priority + aging",
            PolicyKind::PriorityCeiling => "Priority + PCP Protocol",
            PolicyKind::PriorityInheritance => "Priority + PIP Protocol",
        }
    }

    /// Instantiate the policy this kind names
    #[must_use]
    pub fn build(self) -> Box<dyn Policy> {
        match self {
            PolicyKind::Fifo => Box::new(Fifo),
            PolicyKind::Sjf => Box::new(ShortestJobFirst),
            PolicyKind::Srtf => Box::new(ShortestRemainingTimeFirst),
            PolicyKind::RoundRobin => Box::new(RoundRobin::new()),
            PolicyKind::Priority => Box::new(Priority),
            PolicyKind::PriorityAging => Box::new(PriorityAging),
            PolicyKind::PriorityCeiling => Box::new(PriorityCeiling),
            PolicyKind::PriorityInheritance => Box::new(PriorityInheritance),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PolicyKind::Fifo => "fifo",
            PolicyKind::Sjf => "sjf",
            PolicyKind::Srtf => "srtf",
            PolicyKind::RoundRobin => "round-robin",
            PolicyKind::Priority => "priority",
            PolicyKind::PriorityAging => "priority-aging",
            PolicyKind::PriorityCeiling => "priority-ceiling",
            PolicyKind::PriorityInheritance => "priority-inheritance",
        })
    }
}

/// Common scheduling preamble
///
/// Returns the current process when it should be considered for another
/// tick: it exists, it is not blocked inside an acquisition, and it has
/// lifetime left. A Waiting process is never re-selected; a finished one
/// falls through so the engine can retire it.
pub(crate) fn runnable_current(state: &SimState) -> SimResult<Option<Pid>> {
    match state.current() {
        Some(pid) => {
            let p = state.process(pid)?;
            let runnable = p.state != ProcessState::Waiting && !p.is_finished();
            Ok(runnable.then_some(pid))
        }
        None => Ok(None),
    }
}

/*!
 * Simulation Core
 * Process table, resource table, tick-synchronous engine, and event stream
 */

mod engine;
mod event;
mod process;
mod resource;
mod state;
mod types;

pub use engine::Simulation;
pub use event::{Event, EventKind, EventLog};
pub use process::{AcquireSpec, Process, ProcessScript, ProcessTable, ResourceHold, ResourceRequest};
pub use resource::{Resource, ResourceTable};
pub use state::{ProcessSnapshot, ResourceSnapshot, SimState, Snapshot};
pub use types::{ProcessState, QueueLink, RunSummary, SimError, SimResult};

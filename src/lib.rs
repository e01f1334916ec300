/*!
 * schedsim
 * Discrete-time simulation of single-CPU scheduling with resource contention
 */

pub mod core;
pub mod policy;
pub mod report;
pub mod script;
pub mod sim;

// Re-exports
pub use policy::{Policy, PolicyKind};
pub use script::{load_script, parse_script, ScriptError, ScriptResult};
pub use sim::{
    AcquireSpec, Event, EventKind, Process, ProcessScript, ProcessState, QueueLink, RunSummary,
    SimError, SimResult, SimState, Simulation, Snapshot,
};

/*!
 * Core Types
 * Identifiers shared across the simulator
 */

/// Process identifier, unique for the lifetime of a run
pub type Pid = u32;

/// Scheduling priority; higher values are served first
pub type Priority = u32;

/// Discrete simulation time
pub type Tick = u64;

/// Index into the fixed resource table
pub type ResourceId = usize;

/*!
 * Simulation Limits
 * Fixed sizes of the simulated machine
 */

use crate::core::types::Priority;

/// Number of slots in the resource table
pub const RESOURCE_SLOTS: usize = 16;

/// Highest priority a process can reach; also the ceiling value used by the
/// priority-ceiling protocol and the clamp for priority aging
pub const MAX_PRIORITY: Priority = 10;

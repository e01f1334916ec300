/*!
 * Resource Table
 * Fixed array of mutually-exclusive resources with owner and wait queue
 */

use crate::core::limits::RESOURCE_SLOTS;
use crate::core::types::{Pid, ResourceId};
use crate::sim::types::{SimError, SimResult};
use std::collections::VecDeque;

/// One mutually-exclusive resource
#[derive(Debug, Clone, Default)]
pub struct Resource {
    /// Owning process, if any; mutual exclusion is structural
    pub owner: Option<Pid>,
    /// Processes blocked on this resource, in arrival order
    pub waiters: VecDeque<Pid>,
}

impl Resource {
    /// Check if the slot has an owner or waiters worth reporting
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.owner.is_some() || !self.waiters.is_empty()
    }
}

/// The machine's fixed set of resources
#[derive(Debug)]
pub struct ResourceTable {
    slots: Vec<Resource>,
}

impl ResourceTable {
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: vec![Resource::default(); RESOURCE_SLOTS],
        }
    }

    pub fn get(&self, resource: ResourceId) -> SimResult<&Resource> {
        self.slots
            .get(resource)
            .ok_or(SimError::ResourceOutOfRange(resource, RESOURCE_SLOTS))
    }

    pub fn get_mut(&mut self, resource: ResourceId) -> SimResult<&mut Resource> {
        self.slots
            .get_mut(resource)
            .ok_or(SimError::ResourceOutOfRange(resource, RESOURCE_SLOTS))
    }

    /// Slots paired with their resource ids
    pub fn iter(&self) -> impl Iterator<Item = (ResourceId, &Resource)> {
        self.slots.iter().enumerate()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl Default for ResourceTable {
    fn default() -> Self {
        Self::new()
    }
}

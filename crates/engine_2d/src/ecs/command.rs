//! Deferred mutation requests raised during an active tick
//!
//! The engine cannot be called re-entrantly while it is updating, so system
//! logic, entity hooks, and contact listeners record their spawn/destroy
//! requests here. The engine merges the buffer into its own queues at the
//! end of the tick; the requests take effect at the next tick's drains.

use super::entity::{Entity, EntityId};
use crate::foundation::properties::Properties;
use std::collections::HashSet;

/// Buffer of spawn/destroy requests applied at the next safe flush point
#[derive(Default)]
pub struct CommandBuffer {
    pub(crate) spawns: Vec<(Entity, Properties)>,
    pub(crate) destroys: Vec<EntityId>,
    destroy_set: HashSet<EntityId>,
}

impl CommandBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that a new entity be spawned with the given properties
    pub fn spawn(&mut self, entity: Entity, props: Properties) {
        self.spawns.push((entity, props));
    }

    /// Request that an entity be destroyed
    ///
    /// Requests deduplicate: a second request for the same entity within one
    /// tick is a no-op and returns `false`.
    pub fn destroy(&mut self, id: EntityId) -> bool {
        if !self.destroy_set.insert(id) {
            return false;
        }
        self.destroys.push(id);
        true
    }

    /// Whether any requests are buffered
    pub fn is_empty(&self) -> bool {
        self.spawns.is_empty() && self.destroys.is_empty()
    }

    pub(crate) fn take(&mut self) -> (Vec<(Entity, Properties)>, Vec<EntityId>) {
        self.destroy_set.clear();
        (
            std::mem::take(&mut self.spawns),
            std::mem::take(&mut self.destroys),
        )
    }

    pub(crate) fn clear(&mut self) {
        self.spawns.clear();
        self.destroys.clear();
        self.destroy_set.clear();
    }
}

//! Entity registry: the single strong owner of entity values

use super::entity::{Entity, EntityId};
use slotmap::SlotMap;

/// Canonical entity storage keyed by [`EntityId`]
#[derive(Default)]
pub struct EntityRegistry {
    entities: SlotMap<EntityId, Entity>,
}

impl EntityRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entity and record its handle on the entity itself
    pub fn insert(&mut self, entity: Entity) -> EntityId {
        let id = self.entities.insert(entity);
        self.entities[id].id = Some(id);
        id
    }

    /// Remove an entity, returning its value
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let mut entity = self.entities.remove(id)?;
        entity.id = None;
        Some(entity)
    }

    /// Whether an entity exists under the given handle
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(id)
    }

    /// Borrow an entity
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Borrow an entity mutably
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    /// Borrow two distinct entities mutably at once
    ///
    /// Used by pairwise collision resolution. Returns `None` when either
    /// handle is stale or when both refer to the same entity.
    pub fn get_pair_mut(&mut self, a: EntityId, b: EntityId) -> Option<(&mut Entity, &mut Entity)> {
        let [ea, eb] = self.entities.get_disjoint_mut([a, b])?;
        Some((ea, eb))
    }

    /// Iterate over all entities
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities.iter()
    }

    /// Iterate over all entities mutably
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut Entity)> {
        self.entities.iter_mut()
    }

    /// Collect every handle (used when draining the whole registry)
    pub fn ids(&self) -> Vec<EntityId> {
        self.entities.keys().collect()
    }

    /// Number of registered entities (live or awaiting respawn)
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Remove every entity
    pub fn clear(&mut self) {
        self.entities.clear();
    }
}

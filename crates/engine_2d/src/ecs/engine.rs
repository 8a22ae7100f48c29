//! Top-level simulation driver
//!
//! Owns the canonical entity registry and the ordered system list. All
//! structural mutation (spawn, destroy, reset) is queued and applied only at
//! well-defined flush points, never mid-iteration; this single-threaded
//! queue-then-flush discipline is the engine's substitute for locking.

use super::command::CommandBuffer;
use super::entity::{Entity, EntityId};
use super::registry::EntityRegistry;
use super::system::GameSystem;
use crate::foundation::properties::Properties;
use std::collections::{HashSet, VecDeque};
use thiserror::Error;

/// Engine contract violations
#[derive(Debug, Error)]
pub enum EngineError {
    /// `update` was invoked after `dispose`
    #[error("engine has been disposed; no further updates are allowed")]
    Disposed,
}

/// Orchestrates entity lifecycle and drives systems in registration order
///
/// Per tick: drain the spawn queue, drain the destroy queue, sweep entities
/// whose component sets changed, update every system in order, then merge
/// deferred commands raised during the tick into the queues for the next
/// one. A reset requested mid-update is performed after the tick completes.
#[derive(Default)]
pub struct GameEngine {
    registry: EntityRegistry,
    systems: Vec<GameSystem>,
    spawn_queue: VecDeque<(EntityId, Properties)>,
    spawn_set: HashSet<EntityId>,
    destroy_queue: VecDeque<EntityId>,
    destroy_set: HashSet<EntityId>,
    commands: CommandBuffer,
    updating: bool,
    reset_requested: bool,
    disposed: bool,
}

impl GameEngine {
    /// Create an engine with no entities or systems
    pub fn new() -> Self {
        log::info!("Initializing game engine...");
        Self::default()
    }

    /// Register a system; systems run in registration order every tick
    pub fn add_system(&mut self, system: GameSystem) {
        log::debug!("registered system '{}'", system.tag());
        self.systems.push(system);
    }

    /// Look up a system by tag
    pub fn system(&self, tag: &str) -> Option<&GameSystem> {
        self.systems.iter().find(|s| s.tag() == tag)
    }

    /// Look up a system by tag, mutably
    pub fn system_mut(&mut self, tag: &str) -> Option<&mut GameSystem> {
        self.systems.iter_mut().find(|s| s.tag() == tag)
    }

    /// The entity registry
    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// The entity registry, mutably
    pub fn registry_mut(&mut self) -> &mut EntityRegistry {
        &mut self.registry
    }

    /// Queue a new entity for spawning at the next tick
    ///
    /// The entity's `can_spawn` gate runs immediately; on rejection the
    /// entity value is handed back unchanged and nothing is queued.
    pub fn spawn(&mut self, entity: Entity, props: Properties) -> Result<EntityId, Entity> {
        if self.disposed {
            log::warn!("spawn of '{}' ignored: engine disposed", entity.tag());
            return Err(entity);
        }
        if !entity.dispatch_can_spawn(&props) {
            return Err(entity);
        }
        let id = self.registry.insert(entity);
        self.spawn_set.insert(id);
        self.spawn_queue.push_back((id, props));
        Ok(id)
    }

    /// Queue an already-registered, destroyed entity for spawning again
    ///
    /// Returns `false` (no-op) when the handle is unknown, the entity is
    /// already queued to spawn, or its `can_spawn` gate rejects the request.
    pub fn respawn(&mut self, id: EntityId, props: Properties) -> bool {
        if self.disposed || self.spawn_set.contains(&id) {
            return false;
        }
        let Some(entity) = self.registry.get(id) else {
            return false;
        };
        if !entity.dispatch_can_spawn(&props) {
            return false;
        }
        self.spawn_set.insert(id);
        self.spawn_queue.push_back((id, props));
        true
    }

    /// Queue an entity for destruction at the next tick
    ///
    /// Idempotent: a second request for the same entity is a no-op, and
    /// destroying an entity that is neither live nor queued is harmless.
    pub fn destroy(&mut self, id: EntityId) -> bool {
        if self.destroy_set.contains(&id) {
            return false;
        }
        let Some(entity) = self.registry.get(id) else {
            return false;
        };
        if !entity.is_spawned() && !self.spawn_set.contains(&id) {
            return false;
        }
        self.destroy_set.insert(id);
        self.destroy_queue.push_back(id);
        true
    }

    /// Membership check, optionally counting entities queued to spawn
    pub fn contains(&self, id: EntityId, include_queued: bool) -> bool {
        if include_queued && self.spawn_set.contains(&id) {
            return true;
        }
        self.registry.get(id).is_some_and(Entity::is_spawned)
    }

    /// Reclaim a destroyed entity value for factory-side pooling
    ///
    /// Only entities that are neither live nor queued may be removed.
    pub fn remove_entity(&mut self, id: EntityId) -> Option<Entity> {
        if self.contains(id, true) || self.destroy_set.contains(&id) {
            return None;
        }
        self.registry.remove(id)
    }

    /// Advance the simulation by one tick
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Disposed`] once the engine has been disposed.
    pub fn update(&mut self, delta: f32) -> Result<(), EngineError> {
        if self.disposed {
            return Err(EngineError::Disposed);
        }
        self.updating = true;

        self.drain_spawns();
        self.drain_destroys();
        self.sweep_dirty_memberships();

        for system in &mut self.systems {
            system.update(&mut self.registry, &mut self.commands, delta);
        }

        self.updating = false;
        self.merge_commands();

        if self.reset_requested {
            self.reset_requested = false;
            self.reset_now();
        }
        Ok(())
    }

    /// Destroy all live entities, clear all queues, and reset all systems
    ///
    /// Deferred to the end of the current tick when invoked mid-update.
    pub fn reset(&mut self) {
        if self.updating {
            self.reset_requested = true;
        } else {
            self.reset_now();
        }
    }

    /// Terminal teardown: destroys everything and forbids further updates
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        log::info!("disposing game engine");
        self.reset_now();
        self.registry.clear();
        self.systems.clear();
        self.disposed = true;
    }

    /// Whether `dispose` has been called
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn drain_spawns(&mut self) {
        while let Some((id, props)) = self.spawn_queue.pop_front() {
            self.spawn_set.remove(&id);
            let Some(entity) = self.registry.get_mut(id) else {
                continue;
            };
            if !entity.initialized {
                entity.dispatch_init();
            }
            entity.dispatch_spawn(&props, &mut self.commands);
            entity.spawned = true;
            entity.membership_dirty = false;
            log::trace!("spawned '{}' as {id:?}", entity.tag());

            if let Some(entity) = self.registry.get(id) {
                for system in &mut self.systems {
                    system.add(id, entity);
                }
            }
        }
    }

    fn drain_destroys(&mut self) {
        while let Some(id) = self.destroy_queue.pop_front() {
            self.destroy_set.remove(&id);
            let Some(entity) = self.registry.get_mut(id) else {
                continue;
            };
            for system in &mut self.systems {
                system.remove(id);
            }
            entity.reset_components();
            entity.dispatch_destroy(&mut self.commands);
            entity.spawned = false;
            entity.membership_dirty = false;
            log::trace!("destroyed '{}' ({id:?})", entity.tag());
        }
    }

    fn sweep_dirty_memberships(&mut self) {
        for (id, entity) in self.registry.iter_mut() {
            if !entity.membership_dirty {
                continue;
            }
            entity.membership_dirty = false;
            if !entity.spawned {
                continue;
            }
            for system in &mut self.systems {
                if system.qualifies(entity) {
                    system.add(id, entity);
                } else {
                    system.remove(id);
                }
            }
        }
    }

    fn merge_commands(&mut self) {
        let (spawns, destroys) = self.commands.take();
        for (entity, props) in spawns {
            if let Err(rejected) = self.spawn(entity, props) {
                log::debug!("deferred spawn of '{}' rejected", rejected.tag());
            }
        }
        for id in destroys {
            self.destroy(id);
        }
    }

    fn reset_now(&mut self) {
        log::info!("resetting game engine");
        self.spawn_queue.clear();
        self.spawn_set.clear();
        self.destroy_queue.clear();
        self.destroy_set.clear();

        for id in self.registry.ids() {
            let Some(entity) = self.registry.get_mut(id) else {
                continue;
            };
            if entity.spawned {
                entity.reset_components();
                entity.dispatch_destroy(&mut self.commands);
                entity.spawned = false;
            }
        }
        // Hooks may have queued follow-up work; a reset discards it all
        self.commands.clear();
        self.registry.clear();

        for system in &mut self.systems {
            system.reset();
        }
    }
}

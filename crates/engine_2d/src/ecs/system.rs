//! Game systems: mask-filtered batch processing with deferred membership

use super::command::CommandBuffer;
use super::component::ComponentMask;
use super::entity::{Entity, EntityId};
use super::registry::EntityRegistry;
use std::collections::HashSet;

/// Outcome of a membership add request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    /// The entity lacks one or more required component types
    NotQualified,
    /// The entity is tracked (inserted now, or already a member)
    Added,
    /// The system is mid-iteration; the insert happens at the next update
    Queued,
}

/// Outcome of a membership remove request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// The entity was not tracked by this system
    NotTracked,
    /// The entity was removed immediately
    Removed,
    /// The system is mid-iteration; the removal happens at the next update
    Queued,
}

/// Per-tick processing logic plugged into a [`GameSystem`]
pub trait SystemLogic: 'static {
    /// Process this tick's member set
    ///
    /// `members` is the entity set fixed at the start of this tick; it is
    /// never mutated mid-iteration. Structural changes discovered while
    /// processing go through `commands` and take effect next tick.
    fn process(
        &mut self,
        on: bool,
        members: &[EntityId],
        registry: &mut EntityRegistry,
        commands: &mut CommandBuffer,
        delta: f32,
    );

    /// Invoked when the owning engine resets
    fn on_reset(&mut self) {}
}

/// Filters entities by a component mask and batch-processes them each tick
///
/// Membership is maintained incrementally: the engine adds/removes entities
/// as their component sets change. Requests arriving while the system is
/// iterating are queued and flushed at the start of the next update, so the
/// member set handed to [`SystemLogic::process`] is stable for the tick.
pub struct GameSystem {
    tag: &'static str,
    mask: ComponentMask,
    on: bool,
    members: Vec<EntityId>,
    member_set: HashSet<EntityId>,
    pending_add: Vec<EntityId>,
    pending_remove: Vec<EntityId>,
    updating: bool,
    logic: Box<dyn SystemLogic>,
}

impl GameSystem {
    /// Create a system with the given tag, component mask, and logic
    pub fn new(tag: &'static str, mask: ComponentMask, logic: Box<dyn SystemLogic>) -> Self {
        Self {
            tag,
            mask,
            on: true,
            members: Vec::new(),
            member_set: HashSet::new(),
            pending_add: Vec::new(),
            pending_remove: Vec::new(),
            updating: false,
            logic,
        }
    }

    /// Identifier used for lookup and logging
    pub fn tag(&self) -> &'static str {
        self.tag
    }

    /// Whether processing is enabled
    pub fn is_on(&self) -> bool {
        self.on
    }

    /// Enable or disable processing; membership keeps flushing either way
    pub fn set_on(&mut self, on: bool) {
        self.on = on;
    }

    /// Whether the entity holds every component type in this system's mask
    pub fn qualifies(&self, entity: &Entity) -> bool {
        self.mask.matches(entity.components())
    }

    /// Whether the entity is currently a member (queued inserts excluded)
    pub fn is_member(&self, id: EntityId) -> bool {
        self.member_set.contains(&id)
    }

    /// Track an entity if it qualifies
    pub fn add(&mut self, id: EntityId, entity: &Entity) -> Membership {
        if !self.qualifies(entity) {
            return Membership::NotQualified;
        }
        if self.member_set.contains(&id) || self.pending_add.contains(&id) {
            return Membership::Added;
        }
        if self.updating {
            self.pending_add.push(id);
            return Membership::Queued;
        }
        self.insert_member(id);
        Membership::Added
    }

    /// Stop tracking an entity
    pub fn remove(&mut self, id: EntityId) -> Removal {
        if !self.member_set.contains(&id) {
            // May still sit in the pending-add queue from this tick
            self.pending_add.retain(|queued| *queued != id);
            return Removal::NotTracked;
        }
        if self.updating {
            if !self.pending_remove.contains(&id) {
                self.pending_remove.push(id);
            }
            return Removal::Queued;
        }
        self.erase_member(id);
        Removal::Removed
    }

    /// Flush deferred membership changes, purge stale members, and process
    pub fn update(
        &mut self,
        registry: &mut EntityRegistry,
        commands: &mut CommandBuffer,
        delta: f32,
    ) {
        self.flush_pending(registry);
        self.purge_unqualified(registry);

        if self.on {
            self.updating = true;
            self.logic
                .process(self.on, &self.members, registry, commands, delta);
            self.updating = false;
        }
    }

    /// Drop all members and pending changes, and reset the logic
    pub fn reset(&mut self) {
        self.members.clear();
        self.member_set.clear();
        self.pending_add.clear();
        self.pending_remove.clear();
        self.updating = false;
        self.logic.on_reset();
    }

    fn flush_pending(&mut self, registry: &EntityRegistry) {
        let pending_remove = std::mem::take(&mut self.pending_remove);
        for id in pending_remove {
            self.erase_member(id);
        }

        let pending_add = std::mem::take(&mut self.pending_add);
        for id in pending_add {
            // Re-validate: the entity may have changed since it was queued
            let still_qualifies = registry.get(id).is_some_and(|e| self.qualifies(e));
            if still_qualifies && !self.member_set.contains(&id) {
                self.insert_member(id);
            }
        }
    }

    fn purge_unqualified(&mut self, registry: &EntityRegistry) {
        let mask = &self.mask;
        let member_set = &mut self.member_set;
        let tag = self.tag;
        self.members.retain(|id| {
            let keep = registry
                .get(*id)
                .is_some_and(|e| e.is_spawned() && mask.matches(e.components()));
            if !keep {
                member_set.remove(id);
                log::trace!("system '{tag}' dropped entity {id:?}");
            }
            keep
        });
    }

    fn insert_member(&mut self, id: EntityId) {
        if self.member_set.insert(id) {
            self.members.push(id);
        }
    }

    fn erase_member(&mut self, id: EntityId) {
        if self.member_set.remove(&id) {
            self.members.retain(|member| *member != id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::component::Component;
    use std::any::Any;

    struct Tracked;

    impl Component for Tracked {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    struct NoopLogic;

    impl SystemLogic for NoopLogic {
        fn process(
            &mut self,
            _on: bool,
            _members: &[EntityId],
            _registry: &mut EntityRegistry,
            _commands: &mut CommandBuffer,
            _delta: f32,
        ) {
        }
    }

    fn tracked_system() -> GameSystem {
        GameSystem::new("tracked", ComponentMask::of::<Tracked>(), Box::new(NoopLogic))
    }

    fn tracked_entity(registry: &mut EntityRegistry) -> EntityId {
        let mut entity = Entity::new("e");
        entity.add_component(Tracked);
        entity.spawned = true;
        registry.insert(entity)
    }

    #[test]
    fn add_reports_qualification() {
        let mut registry = EntityRegistry::new();
        let mut system = tracked_system();

        let plain = registry.insert(Entity::new("plain"));
        assert_eq!(
            system.add(plain, registry.get(plain).unwrap()),
            Membership::NotQualified
        );

        let id = tracked_entity(&mut registry);
        assert_eq!(system.add(id, registry.get(id).unwrap()), Membership::Added);
        // Idempotent
        assert_eq!(system.add(id, registry.get(id).unwrap()), Membership::Added);
        assert!(system.is_member(id));
    }

    #[test]
    fn add_during_iteration_is_queued_until_next_update() {
        let mut registry = EntityRegistry::new();
        let mut commands = CommandBuffer::new();
        let mut system = tracked_system();

        let id = tracked_entity(&mut registry);
        system.updating = true;
        assert_eq!(
            system.add(id, registry.get(id).unwrap()),
            Membership::Queued
        );
        assert!(!system.is_member(id));
        system.updating = false;

        system.update(&mut registry, &mut commands, 0.0);
        assert!(system.is_member(id));
    }

    #[test]
    fn remove_during_iteration_is_queued_until_next_update() {
        let mut registry = EntityRegistry::new();
        let mut commands = CommandBuffer::new();
        let mut system = tracked_system();

        let id = tracked_entity(&mut registry);
        system.add(id, registry.get(id).unwrap());

        system.updating = true;
        assert_eq!(system.remove(id), Removal::Queued);
        assert!(system.is_member(id));
        system.updating = false;

        system.update(&mut registry, &mut commands, 0.0);
        assert!(!system.is_member(id));
    }

    #[test]
    fn update_purges_members_that_lost_components() {
        let mut registry = EntityRegistry::new();
        let mut commands = CommandBuffer::new();
        let mut system = tracked_system();

        let id = tracked_entity(&mut registry);
        system.add(id, registry.get(id).unwrap());

        registry.get_mut(id).unwrap().remove_component::<Tracked>();
        system.update(&mut registry, &mut commands, 0.0);
        assert!(!system.is_member(id));
    }

    #[test]
    fn disabled_system_still_flushes_membership() {
        struct CountingLogic(std::rc::Rc<std::cell::Cell<u32>>);

        impl SystemLogic for CountingLogic {
            fn process(
                &mut self,
                _on: bool,
                _members: &[EntityId],
                _registry: &mut EntityRegistry,
                _commands: &mut CommandBuffer,
                _delta: f32,
            ) {
                self.0.set(self.0.get() + 1);
            }
        }

        let calls = std::rc::Rc::new(std::cell::Cell::new(0));
        let mut system = GameSystem::new(
            "counting",
            ComponentMask::of::<Tracked>(),
            Box::new(CountingLogic(std::rc::Rc::clone(&calls))),
        );
        let mut registry = EntityRegistry::new();
        let mut commands = CommandBuffer::new();

        let id = tracked_entity(&mut registry);
        system.updating = true;
        system.add(id, registry.get(id).unwrap());
        system.updating = false;

        system.set_on(false);
        system.update(&mut registry, &mut commands, 0.0);
        assert!(system.is_member(id));
        assert_eq!(calls.get(), 0);

        system.set_on(true);
        system.update(&mut registry, &mut commands, 0.0);
        assert_eq!(calls.get(), 1);
    }
}

//! Entity abstraction: component bag, property bag, and lifecycle hooks

use super::command::CommandBuffer;
use super::component::{Component, ComponentMap};
use crate::foundation::properties::Properties;

slotmap::new_key_type! {
    /// Handle to an entity in the engine's registry
    pub struct EntityId;
}

/// Lifecycle hooks implemented by concrete entities
///
/// The engine invokes these at well-defined points: `init` once, lazily,
/// before the first spawn; `on_spawn` on every spawn with the spawn
/// properties; `on_destroy` on every destroy; `can_spawn` gates spawning.
/// Spawn and destroy hooks receive a [`CommandBuffer`] for requesting
/// further deferred mutations (for example spawning an explosion from a
/// death hook) since the engine cannot be called re-entrantly.
pub trait EntityBehavior: 'static {
    /// One-time setup, run lazily before the first spawn
    fn init(&mut self, entity: &mut Entity) {
        let _ = entity;
    }

    /// Gate predicate: return `false` to reject a spawn request outright
    fn can_spawn(&self, entity: &Entity, props: &Properties) -> bool {
        let _ = (entity, props);
        true
    }

    /// Invoked on every spawn with the spawn parameters
    fn on_spawn(&mut self, entity: &mut Entity, props: &Properties, commands: &mut CommandBuffer) {
        let _ = (entity, props, commands);
    }

    /// Invoked on every destroy
    fn on_destroy(&mut self, entity: &mut Entity, commands: &mut CommandBuffer) {
        let _ = (entity, commands);
    }
}

/// Behavior with no hooks, for purely data-driven entities
struct InertBehavior;

impl EntityBehavior for InertBehavior {}

/// An identity holding components, properties, and lifecycle state
///
/// Entities are owned exclusively by the engine's registry while spawned.
/// After destruction the value stays registered (components reset, flags
/// cleared) so factories can respawn it or reclaim it for pooling via
/// [`crate::ecs::GameEngine::remove_entity`].
pub struct Entity {
    tag: String,
    components: ComponentMap,
    properties: Properties,
    behavior: Option<Box<dyn EntityBehavior>>,
    pub(crate) id: Option<EntityId>,
    pub(crate) initialized: bool,
    pub(crate) spawned: bool,
    pub(crate) membership_dirty: bool,
}

impl Entity {
    /// Create an entity with the given tag and no hooks
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            components: ComponentMap::new(),
            properties: Properties::new(),
            behavior: Some(Box::new(InertBehavior)),
            id: None,
            initialized: false,
            spawned: false,
            membership_dirty: false,
        }
    }

    /// Attach lifecycle hooks
    #[must_use]
    pub fn with_behavior(mut self, behavior: impl EntityBehavior) -> Self {
        self.behavior = Some(Box::new(behavior));
        self
    }

    /// Builder-style component attachment
    #[must_use]
    pub fn with_component<C: Component>(mut self, component: C) -> Self {
        self.add_component(component);
        self
    }

    /// Human-readable tag used for logging
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The registry handle, once the entity has been handed to an engine
    pub fn id(&self) -> Option<EntityId> {
        self.id
    }

    /// Whether one-time `init` has already run
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Whether the entity is currently live in the simulation
    pub fn is_spawned(&self) -> bool {
        self.spawned
    }

    /// Add a component, replacing any existing component of the same type
    ///
    /// Marks the entity for membership re-evaluation at the next engine tick.
    pub fn add_component<C: Component>(&mut self, component: C) {
        self.components.put(component);
        self.membership_dirty = true;
    }

    /// Get the component of type `C`, if present
    pub fn get_component<C: Component>(&self) -> Option<&C> {
        self.components.get::<C>()
    }

    /// Get the component of type `C` mutably, if present
    pub fn get_component_mut<C: Component>(&mut self) -> Option<&mut C> {
        self.components.get_mut::<C>()
    }

    /// O(1) check for a component of type `C`
    pub fn has_component<C: Component>(&self) -> bool {
        self.components.has::<C>()
    }

    /// Remove the component of type `C`
    ///
    /// Marks the entity for membership re-evaluation at the next engine tick.
    pub fn remove_component<C: Component>(&mut self) -> Option<Box<dyn Component>> {
        self.membership_dirty = true;
        self.components.remove::<C>()
    }

    /// Remove every component (full reset/disposal path)
    pub fn clear_components(&mut self) {
        self.components.clear();
        self.membership_dirty = true;
    }

    /// The entity's component map
    pub fn components(&self) -> &ComponentMap {
        &self.components
    }

    /// The entity's property bag
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// The entity's property bag, mutably
    pub fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }

    pub(crate) fn reset_components(&mut self) {
        self.components.reset_all();
    }

    // The behavior box is taken out for the duration of each hook call so the
    // hook can receive `&mut Entity` without aliasing its own storage.

    pub(crate) fn dispatch_init(&mut self) {
        if let Some(mut behavior) = self.behavior.take() {
            behavior.init(self);
            self.behavior = Some(behavior);
        }
        self.initialized = true;
    }

    pub(crate) fn dispatch_can_spawn(&self, props: &Properties) -> bool {
        self.behavior
            .as_ref()
            .map_or(true, |behavior| behavior.can_spawn(self, props))
    }

    pub(crate) fn dispatch_spawn(&mut self, props: &Properties, commands: &mut CommandBuffer) {
        if let Some(mut behavior) = self.behavior.take() {
            behavior.on_spawn(self, props, commands);
            self.behavior = Some(behavior);
        }
    }

    pub(crate) fn dispatch_destroy(&mut self, commands: &mut CommandBuffer) {
        if let Some(mut behavior) = self.behavior.take() {
            behavior.on_destroy(self, commands);
            self.behavior = Some(behavior);
        }
    }
}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity")
            .field("tag", &self.tag)
            .field("id", &self.id)
            .field("initialized", &self.initialized)
            .field("spawned", &self.spawned)
            .field("components", &self.components.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;

    struct Marker;

    impl Component for Marker {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    struct Gated;

    impl EntityBehavior for Gated {
        fn can_spawn(&self, _entity: &Entity, props: &Properties) -> bool {
            props.get_or("allowed", false)
        }
    }

    #[test]
    fn component_changes_mark_membership_dirty() {
        let mut entity = Entity::new("test");
        assert!(!entity.membership_dirty);

        entity.add_component(Marker);
        assert!(entity.membership_dirty);

        entity.membership_dirty = false;
        entity.remove_component::<Marker>();
        assert!(entity.membership_dirty);
    }

    #[test]
    fn can_spawn_gate_reads_spawn_properties() {
        let entity = Entity::new("gated").with_behavior(Gated);
        assert!(!entity.dispatch_can_spawn(&Properties::new()));
        assert!(entity.dispatch_can_spawn(&Properties::new().with("allowed", true)));
    }

    #[test]
    fn hooks_can_mutate_the_entity() {
        struct Tagger;

        impl EntityBehavior for Tagger {
            fn init(&mut self, entity: &mut Entity) {
                entity.properties_mut().put("ready", true);
            }
        }

        let mut entity = Entity::new("hooked").with_behavior(Tagger);
        entity.dispatch_init();
        assert!(entity.is_initialized());
        assert!(entity.properties().get_or("ready", false));
    }
}

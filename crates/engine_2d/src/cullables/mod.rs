//! Lifecycle culling
//!
//! A cullable is a small predicate attached to an entity that decides when
//! the entity should leave the simulation (left the room, timed out, a
//! level event fired). The [`CullablesSystem`] checks every cullable each
//! tick and requests deferred destruction through the command buffer.

use crate::ecs::{
    CommandBuffer, Component, ComponentMask, EntityId, EntityRegistry, GameSystem, SystemLogic,
};
use crate::events::{Event, EventListener};
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

/// Decides whether the owning entity should be destroyed
pub trait Cullable: 'static {
    /// Whether the owning entity should be destroyed this tick
    fn should_be_culled(&self) -> bool;

    /// Clear any latched state (invoked when the owning entity resets)
    fn reset(&mut self) {}
}

/// Component holding an entity's tagged cullables
#[derive(Default)]
pub struct CullablesComponent {
    cullables: Vec<(String, Box<dyn Cullable>)>,
}

impl CullablesComponent {
    /// Create an empty cullables component
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the cullable stored under `tag`
    pub fn put(&mut self, tag: impl Into<String>, cullable: impl Cullable) {
        let tag = tag.into();
        if let Some(slot) = self.cullables.iter_mut().find(|(t, _)| *t == tag) {
            slot.1 = Box::new(cullable);
        } else {
            self.cullables.push((tag, Box::new(cullable)));
        }
    }

    /// Builder-style variant of [`CullablesComponent::put`]
    #[must_use]
    pub fn with(mut self, tag: impl Into<String>, cullable: impl Cullable) -> Self {
        self.put(tag, cullable);
        self
    }

    /// Remove the cullable stored under `tag`
    pub fn remove(&mut self, tag: &str) {
        self.cullables.retain(|(t, _)| t != tag);
    }

    /// Whether any cullable currently triggers
    pub fn should_be_culled(&self) -> bool {
        self.cullables.iter().any(|(_, c)| c.should_be_culled())
    }
}

impl Component for CullablesComponent {
    fn reset(&mut self) {
        for (_, cullable) in &mut self.cullables {
            cullable.reset();
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Destroys entities whose cullables trigger
pub struct CullablesSystem;

impl CullablesSystem {
    /// Wrap into a [`GameSystem`] requiring a [`CullablesComponent`]
    pub fn into_system(self) -> GameSystem {
        GameSystem::new(
            "cullables",
            ComponentMask::of::<CullablesComponent>(),
            Box::new(self),
        )
    }
}

impl SystemLogic for CullablesSystem {
    fn process(
        &mut self,
        _on: bool,
        members: &[EntityId],
        registry: &mut EntityRegistry,
        commands: &mut CommandBuffer,
        _delta: f32,
    ) {
        for &id in members {
            let Some(entity) = registry.get(id) else {
                continue;
            };
            let culled = entity
                .get_component::<CullablesComponent>()
                .is_some_and(CullablesComponent::should_be_culled);
            if culled {
                log::debug!("culling '{}' ({id:?})", entity.tag());
                commands.destroy(id);
            }
        }
    }
}

#[derive(Default)]
struct CullOnEventState {
    culled: bool,
}

/// Cullable that latches when one of its trigger events fires
///
/// Shares its state between the [`EventManager`](crate::events::EventManager)
/// (as a listener) and the owning entity's [`CullablesComponent`] (as a
/// cullable); clone it to register both sides.
#[derive(Clone)]
pub struct CullOnEvent {
    triggers: HashSet<String>,
    state: Rc<RefCell<CullOnEventState>>,
}

impl CullOnEvent {
    /// Create a cullable triggered by any of the given event keys
    pub fn new(triggers: HashSet<String>) -> Self {
        Self {
            triggers,
            state: Rc::new(RefCell::new(CullOnEventState::default())),
        }
    }

    /// The event keys this cullable listens for
    pub fn triggers(&self) -> &HashSet<String> {
        &self.triggers
    }
}

impl Cullable for CullOnEvent {
    fn should_be_culled(&self) -> bool {
        self.state.borrow().culled
    }

    fn reset(&mut self) {
        self.state.borrow_mut().culled = false;
    }
}

impl EventListener for CullOnEvent {
    fn on_event(&mut self, event: &Event) {
        if self.triggers.contains(&event.key) {
            self.state.borrow_mut().culled = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{Entity, GameEngine};
    use crate::events::EventManager;
    use crate::foundation::properties::Properties;

    struct Always(bool);

    impl Cullable for Always {
        fn should_be_culled(&self) -> bool {
            self.0
        }
    }

    #[test]
    fn triggered_cullable_destroys_the_entity_next_tick() {
        let mut engine = GameEngine::new();
        engine.add_system(CullablesSystem.into_system());

        let entity =
            Entity::new("doomed").with_component(CullablesComponent::new().with("always", Always(true)));
        let id = engine.spawn(entity, Properties::new()).unwrap();

        // Tick 1: spawned, cull request queued
        engine.update(0.016).unwrap();
        assert!(engine.contains(id, false));

        // Tick 2: destroy drain removes it
        engine.update(0.016).unwrap();
        assert!(!engine.contains(id, false));
    }

    #[test]
    fn untriggered_cullable_keeps_the_entity_alive() {
        let mut engine = GameEngine::new();
        engine.add_system(CullablesSystem.into_system());

        let entity =
            Entity::new("safe").with_component(CullablesComponent::new().with("never", Always(false)));
        let id = engine.spawn(entity, Properties::new()).unwrap();

        engine.update(0.016).unwrap();
        engine.update(0.016).unwrap();
        assert!(engine.contains(id, false));
    }

    #[test]
    fn cull_on_event_latches_and_resets() {
        let mut events = EventManager::new();
        let cullable = CullOnEvent::new(std::iter::once("room_exit".to_string()).collect());
        events.add_listener(cullable.triggers().clone(), Box::new(cullable.clone()));

        assert!(!cullable.should_be_culled());
        events.submit(Event::new("room_exit"));
        events.run();
        assert!(cullable.should_be_culled());

        let mut latch = cullable.clone();
        latch.reset();
        assert!(!cullable.should_be_culled());
    }
}

//! Component trait, per-entity component storage, and component masks

use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};

/// A data+behavior bundle attached to exactly one entity at a time
///
/// Components are looked up by their concrete type; an entity holds at most
/// one component of a given type. `reset` is invoked automatically when the
/// owning entity is destroyed.
pub trait Component: Any {
    /// Restore the component to its default state on entity destruction
    fn reset(&mut self) {}

    /// Upcast for typed downcasting out of storage
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for typed downcasting out of storage
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Per-entity heterogeneous typed-component map
#[derive(Default)]
pub struct ComponentMap {
    components: HashMap<TypeId, Box<dyn Component>>,
}

impl ComponentMap {
    /// Create an empty component map
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a component, replacing any existing component of the same type
    pub fn put<C: Component>(&mut self, component: C) {
        self.components.insert(TypeId::of::<C>(), Box::new(component));
    }

    /// Get the component of type `C`, if present
    pub fn get<C: Component>(&self) -> Option<&C> {
        self.components
            .get(&TypeId::of::<C>())
            .and_then(|c| c.as_any().downcast_ref())
    }

    /// Get the component of type `C` mutably, if present
    pub fn get_mut<C: Component>(&mut self) -> Option<&mut C> {
        self.components
            .get_mut(&TypeId::of::<C>())
            .and_then(|c| c.as_any_mut().downcast_mut())
    }

    /// O(1) check for a component of type `C`
    pub fn has<C: Component>(&self) -> bool {
        self.has_type(TypeId::of::<C>())
    }

    /// O(1) check for a component by type id
    pub fn has_type(&self, type_id: TypeId) -> bool {
        self.components.contains_key(&type_id)
    }

    /// Remove and return the component of type `C`, if present
    pub fn remove<C: Component>(&mut self) -> Option<Box<dyn Component>> {
        self.components.remove(&TypeId::of::<C>())
    }

    /// Remove every component
    pub fn clear(&mut self) {
        self.components.clear();
    }

    /// Invoke `reset` on every stored component
    pub fn reset_all(&mut self) {
        for component in self.components.values_mut() {
            component.reset();
        }
    }

    /// Number of stored components
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether no components are stored
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// The set of component types a system requires of its entities
#[derive(Debug, Clone, Default)]
pub struct ComponentMask {
    required: HashSet<TypeId>,
}

impl ComponentMask {
    /// Create an empty mask (matches every entity)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mask requiring a single component type
    pub fn of<C: Component>() -> Self {
        Self::new().with::<C>()
    }

    /// Add a required component type
    #[must_use]
    pub fn with<C: Component>(mut self) -> Self {
        self.required.insert(TypeId::of::<C>());
        self
    }

    /// Check whether the given component map satisfies the mask
    pub fn matches(&self, components: &ComponentMap) -> bool {
        self.required.iter().all(|id| components.has_type(*id))
    }
}

//! The world system: fixed-step simulation and contact management

use super::body::{Body, PhysicsFlags};
use super::collision::{CollisionHandler, ContactFilter, ContactListener, StandardCollisionHandler};
use super::contact::Contact;
use super::fixture::{Fixture, FixtureHandle};
use crate::config::SimulationConfig;
use crate::ecs::{
    CommandBuffer, ComponentMask, EntityId, EntityRegistry, GameSystem, SystemLogic,
};
use crate::foundation::math::Rect;
use crate::foundation::pool::Pool;
use crate::foundation::time::FixedStepAccumulator;
use crate::spatial::{BodyEntry, FixtureEntry, WorldContainer};
use std::collections::HashSet;

/// Produces the container rebuilt at the start of each simulation pass
///
/// Returning `None` is a contract violation; level loaders return `None`
/// only while no level is active, and the world system must not run then.
pub type ContainerSupplier = Box<dyn FnMut() -> Option<Box<dyn WorldContainer>>>;

/// Fixed-step physics driver over entities carrying a [`Body`] component
///
/// Each consumed step runs one cycle in a fixed order: pre-process hooks,
/// integration, contact collection, contact dispatch, collision resolution,
/// post-process hooks. Contact transitions are derived by comparing this
/// cycle's contact set against the prior cycle's.
pub struct WorldSystem {
    supplier: ContainerSupplier,
    container: Option<Box<dyn WorldContainer>>,
    ppm: f32,
    fixed_step_scalar: f32,
    accumulator: FixedStepAccumulator,
    prior_contacts: HashSet<Contact>,
    current_contacts: HashSet<Contact>,
    contact_filter: Option<Box<dyn ContactFilter>>,
    contact_listener: Option<Box<dyn ContactListener>>,
    handlers: Vec<Box<dyn CollisionHandler>>,
    standard_handler: StandardCollisionHandler,
    fixture_query_pool: Pool<Vec<FixtureEntry>>,
    body_query_pool: Pool<Vec<BodyEntry>>,
}

impl WorldSystem {
    /// Create a world system from simulation settings and a container supplier
    pub fn new(config: &SimulationConfig, supplier: ContainerSupplier) -> Self {
        log::info!(
            "Initializing world system: fixed_step={}, ppm={}, scalar={}",
            config.fixed_step,
            config.ppm,
            config.fixed_step_scalar
        );
        Self {
            supplier,
            container: None,
            ppm: config.ppm,
            fixed_step_scalar: config.fixed_step_scalar,
            accumulator: FixedStepAccumulator::new(config.fixed_step),
            prior_contacts: HashSet::new(),
            current_contacts: HashSet::new(),
            contact_filter: None,
            contact_listener: None,
            handlers: Vec::new(),
            standard_handler: StandardCollisionHandler,
            fixture_query_pool: Pool::new(Vec::new).with_on_free(Vec::clear),
            body_query_pool: Pool::new(Vec::new).with_on_free(Vec::clear),
        }
    }

    /// Set the contact filter (builder pattern)
    #[must_use]
    pub fn with_contact_filter(mut self, filter: Box<dyn ContactFilter>) -> Self {
        self.contact_filter = Some(filter);
        self
    }

    /// Set the contact listener (builder pattern)
    #[must_use]
    pub fn with_contact_listener(mut self, listener: Box<dyn ContactListener>) -> Self {
        self.contact_listener = Some(listener);
        self
    }

    /// Add a custom collision handler, tried before the standard one
    #[must_use]
    pub fn with_collision_handler(mut self, handler: Box<dyn CollisionHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// The container built by the latest simulation pass, if any
    pub fn container(&self) -> Option<&dyn WorldContainer> {
        self.container.as_deref()
    }

    /// Wrap into a [`GameSystem`] requiring a [`Body`] component
    pub fn into_system(self) -> GameSystem {
        GameSystem::new("world", ComponentMask::of::<Body>(), Box::new(self))
    }

    fn cycle(
        &mut self,
        members: &[EntityId],
        registry: &mut EntityRegistry,
        commands: &mut CommandBuffer,
        delta: f32,
    ) {
        Self::run_pre_process(members, registry);
        Self::integrate(members, registry, delta);
        self.rebuild_container(members, registry);
        self.collect_contacts(members, registry);
        self.dispatch_contacts(registry, commands, delta);
        self.resolve_collisions(members, registry);
        Self::run_post_process(members, registry);

        std::mem::swap(&mut self.prior_contacts, &mut self.current_contacts);
        self.current_contacts.clear();
    }

    fn run_pre_process(members: &[EntityId], registry: &mut EntityRegistry) {
        for &id in members {
            if let Some(body) = body_mut(registry, id) {
                body.pre_process();
            }
        }
    }

    fn integrate(members: &[EntityId], registry: &mut EntityRegistry, delta: f32) {
        for &id in members {
            if let Some(body) = body_mut(registry, id) {
                body.integrate(delta);
            }
        }
    }

    fn run_post_process(members: &[EntityId], registry: &mut EntityRegistry) {
        for &id in members {
            if let Some(body) = body_mut(registry, id) {
                body.post_process();
            }
        }
    }

    /// Rebuild the spatial container from the members' current bounds
    ///
    /// # Panics
    ///
    /// Panics when the container supplier returns `None`.
    fn rebuild_container(&mut self, members: &[EntityId], registry: &EntityRegistry) {
        if self.container.is_none() {
            match (self.supplier)() {
                Some(container) => self.container = Some(container),
                None => panic!("world container supplier returned no container"),
            }
        }
        let Some(container) = self.container.as_deref_mut() else {
            return;
        };

        container.clear();
        for &id in members {
            let Some(body) = body_ref(registry, id) else {
                continue;
            };
            container.add_body(BodyEntry {
                entity: id,
                bounds: body.bounds,
                body_type: body.body_type,
            });
            for (index, fixture) in body.fixtures().iter().enumerate() {
                if !proceed(self.contact_filter.as_deref(), fixture) {
                    continue;
                }
                container.add_fixture(FixtureEntry {
                    handle: FixtureHandle { entity: id, index },
                    bounds: fixture.world_bounds(body),
                });
            }
        }
    }

    fn collect_contacts(&mut self, members: &[EntityId], registry: &EntityRegistry) {
        let Self {
            container,
            ppm,
            current_contacts,
            contact_filter,
            fixture_query_pool,
            ..
        } = self;
        let Some(container) = container.as_deref() else {
            return;
        };

        let mut candidates = fixture_query_pool.fetch();
        for &id in members {
            let Some(body) = body_ref(registry, id) else {
                continue;
            };
            for (index, fixture) in body.fixtures().iter().enumerate() {
                if !proceed(contact_filter.as_deref(), fixture) {
                    continue;
                }
                let handle = FixtureHandle { entity: id, index };
                let bounds = fixture.world_bounds(body);
                let (min_x, min_y, max_x, max_y) = cell_span(&bounds, *ppm);

                candidates.clear();
                container.fixtures_in(min_x, min_y, max_x, max_y, &mut candidates);
                for candidate in &candidates {
                    if candidate.handle.entity == id {
                        continue;
                    }
                    if !bounds.overlaps(&candidate.bounds) {
                        continue;
                    }
                    if let Some(filter) = contact_filter.as_deref() {
                        let Some(other) = fixture_ref(registry, candidate.handle) else {
                            continue;
                        };
                        if !filter.filter(fixture, other) {
                            continue;
                        }
                    }
                    current_contacts.insert(Contact::new(handle, candidate.handle));
                }
            }
        }
        fixture_query_pool.free(candidates);
    }

    fn dispatch_contacts(
        &mut self,
        registry: &mut EntityRegistry,
        commands: &mut CommandBuffer,
        delta: f32,
    ) {
        let Some(listener) = self.contact_listener.as_deref_mut() else {
            return;
        };

        for contact in &self.current_contacts {
            if self.prior_contacts.contains(contact) {
                listener.continue_contact(contact, registry, commands, delta);
            } else {
                listener.begin_contact(contact, registry, commands, delta);
            }
        }
        for contact in self.prior_contacts.difference(&self.current_contacts) {
            listener.end_contact(contact, registry, commands, delta);
        }
    }

    fn resolve_collisions(&mut self, members: &[EntityId], registry: &mut EntityRegistry) {
        let mut pairs: Vec<(EntityId, EntityId)> = Vec::new();
        {
            let Some(container) = self.container.as_deref() else {
                return;
            };
            let mut seen: HashSet<(EntityId, EntityId)> = HashSet::new();
            let mut candidates = self.body_query_pool.fetch();
            for &id in members {
                let Some(body) = body_ref(registry, id) else {
                    continue;
                };
                if !body.physics.flags.contains(PhysicsFlags::COLLISION_ON) {
                    continue;
                }
                let (min_x, min_y, max_x, max_y) = cell_span(&body.bounds, self.ppm);

                candidates.clear();
                container.bodies_in(min_x, min_y, max_x, max_y, &mut candidates);
                for candidate in &candidates {
                    if candidate.entity == id {
                        continue;
                    }
                    let key = if candidate.entity < id {
                        (candidate.entity, id)
                    } else {
                        (id, candidate.entity)
                    };
                    if seen.insert(key) {
                        pairs.push(key);
                    }
                }
            }
            self.body_query_pool.free(candidates);
        }

        for (a, b) in pairs {
            // Narrow phase against live bounds; the container snapshot is
            // stale once earlier resolutions have moved bodies.
            let overlapping = match (body_ref(registry, a), body_ref(registry, b)) {
                (Some(body_a), Some(body_b)) => body_a.bounds.overlaps(&body_b.bounds),
                _ => false,
            };
            if !overlapping {
                continue;
            }
            let handled = self
                .handlers
                .iter_mut()
                .any(|handler| handler.handle_collision(registry, a, b));
            if !handled {
                self.standard_handler.handle_collision(registry, a, b);
            }
        }
    }
}

impl SystemLogic for WorldSystem {
    fn process(
        &mut self,
        _on: bool,
        members: &[EntityId],
        registry: &mut EntityRegistry,
        commands: &mut CommandBuffer,
        delta: f32,
    ) {
        self.accumulator.accumulate(delta);
        let step = self.accumulator.fixed_step() * self.fixed_step_scalar;

        let mut stepped = false;
        while self.accumulator.step() {
            stepped = true;
            self.cycle(members, registry, commands, step);
        }
        if stepped {
            // Leave a fresh snapshot behind for external spatial queries
            self.rebuild_container(members, registry);
        }
    }

    fn on_reset(&mut self) {
        self.container = None;
        self.accumulator.reset();
        self.prior_contacts.clear();
        self.current_contacts.clear();
    }
}

// Inactive fixtures never reach the container or the contact set; a filter
// can only veto further, not re-admit them.
fn proceed(filter: Option<&dyn ContactFilter>, fixture: &Fixture) -> bool {
    fixture.active && filter.map_or(true, |f| f.should_proceed(fixture))
}

fn body_ref(registry: &EntityRegistry, id: EntityId) -> Option<&Body> {
    registry.get(id).and_then(|e| e.get_component::<Body>())
}

fn body_mut(registry: &mut EntityRegistry, id: EntityId) -> Option<&mut Body> {
    registry
        .get_mut(id)
        .and_then(|e| e.get_component_mut::<Body>())
}

fn fixture_ref(registry: &EntityRegistry, handle: FixtureHandle) -> Option<&Fixture> {
    body_ref(registry, handle.entity).and_then(|body| body.fixture(handle.index))
}

#[allow(clippy::cast_possible_truncation)]
fn cell_span(bounds: &Rect, ppm: f32) -> (i32, i32, i32, i32) {
    (
        (bounds.x / ppm).floor() as i32,
        (bounds.y / ppm).floor() as i32,
        (bounds.max_x() / ppm).floor() as i32,
        (bounds.max_y() / ppm).floor() as i32,
    )
}

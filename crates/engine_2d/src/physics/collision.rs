//! Contact filtering, contact listening, and collision resolution

use super::body::{Body, BodyType, PhysicsFlags};
use super::contact::Contact;
use super::fixture::Fixture;
use crate::ecs::{CommandBuffer, EntityId, EntityRegistry};

/// Decides which fixture pairs may generate contacts
///
/// Inactive fixtures are excluded from contact collection before either
/// hook is consulted; a filter can only narrow participation further.
pub trait ContactFilter {
    /// Additional per-fixture veto, checked before pair filtering
    fn should_proceed(&self, _fixture: &Fixture) -> bool {
        true
    }

    /// Whether this particular pair may generate a contact
    fn filter(&self, a: &Fixture, b: &Fixture) -> bool;
}

/// Receives contact lifecycle transitions
///
/// Transitions are derived per cycle: a contact absent last cycle begins,
/// one present in both continues, one absent this cycle ends.
pub trait ContactListener {
    /// A contact that did not exist last cycle
    fn begin_contact(
        &mut self,
        contact: &Contact,
        registry: &mut EntityRegistry,
        commands: &mut CommandBuffer,
        delta: f32,
    );

    /// A contact persisting from last cycle
    fn continue_contact(
        &mut self,
        contact: &Contact,
        registry: &mut EntityRegistry,
        commands: &mut CommandBuffer,
        delta: f32,
    );

    /// A contact from last cycle that no longer holds
    fn end_contact(
        &mut self,
        contact: &Contact,
        registry: &mut EntityRegistry,
        commands: &mut CommandBuffer,
        delta: f32,
    );
}

/// Resolves an overlapping body pair
pub trait CollisionHandler {
    /// Attempt to resolve the collision; `true` means handled
    fn handle_collision(&mut self, registry: &mut EntityRegistry, a: EntityId, b: EntityId)
        -> bool;
}

/// Minimum-translation resolution for Dynamic-vs-Static pairs
///
/// The dynamic body is pushed out of the static one along the axis of
/// least penetration, and the static body's `friction_to_apply` is added
/// to the dynamic body's `friction_on_self` on the other axis. Any other
/// type pairing is left untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardCollisionHandler;

impl CollisionHandler for StandardCollisionHandler {
    fn handle_collision(
        &mut self,
        registry: &mut EntityRegistry,
        a: EntityId,
        b: EntityId,
    ) -> bool {
        let Some((entity_a, entity_b)) = registry.get_pair_mut(a, b) else {
            return false;
        };
        let Some(type_a) = entity_a.get_component::<Body>().map(|body| body.body_type) else {
            return false;
        };
        let Some(type_b) = entity_b.get_component::<Body>().map(|body| body.body_type) else {
            return false;
        };

        let (dynamic_entity, static_entity) = match (type_a, type_b) {
            (BodyType::Dynamic, BodyType::Static) => (entity_a, entity_b),
            (BodyType::Static, BodyType::Dynamic) => (entity_b, entity_a),
            _ => return false,
        };

        let Some(static_body) = static_entity.get_component::<Body>() else {
            return false;
        };
        let static_bounds = static_body.bounds;
        let friction = static_body.physics.friction_to_apply;

        let Some(dynamic_body) = dynamic_entity.get_component_mut::<Body>() else {
            return false;
        };
        if !dynamic_body.physics.flags.contains(PhysicsFlags::COLLISION_ON) {
            return false;
        }

        let Some(overlap) = dynamic_body.bounds.overlap(&static_bounds) else {
            // Types matched but nothing to push apart
            return true;
        };

        if overlap.width < overlap.height {
            let push = if dynamic_body.bounds.center().x < static_bounds.center().x {
                -overlap.width
            } else {
                overlap.width
            };
            dynamic_body.bounds.translate(push, 0.0);
            dynamic_body.physics.friction_on_self.y += friction.y;
        } else {
            let push = if dynamic_body.bounds.center().y < static_bounds.center().y {
                -overlap.height
            } else {
                overlap.height
            };
            dynamic_body.bounds.translate(0.0, push);
            dynamic_body.physics.friction_on_self.x += friction.x;
        }
        true
    }
}

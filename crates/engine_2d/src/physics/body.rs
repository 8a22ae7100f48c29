//! Bodies and their physics state

use super::fixture::Fixture;
use crate::ecs::Component;
use crate::foundation::math::{Rect, Vec2};
use crate::foundation::properties::Properties;
use std::any::Any;

bitflags::bitflags! {
    /// Per-body physics toggles
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PhysicsFlags: u8 {
        /// Apply gravity during integration
        const GRAVITY_ON = 1 << 0;
        /// Participate in collision resolution
        const COLLISION_ON = 1 << 1;
        /// Apply self-friction decay on the x axis
        const APPLY_FRICTION_X = 1 << 2;
        /// Apply self-friction decay on the y axis
        const APPLY_FRICTION_Y = 1 << 3;
    }
}

impl Default for PhysicsFlags {
    fn default() -> Self {
        Self::all()
    }
}

/// Kind of body, deciding how it moves and collides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyType {
    /// Immovable level geometry
    Static,
    /// Moves and is pushed out of static geometry
    Dynamic,
    /// Overlap detection only, never resolved
    Abstract,
}

/// Mutable physics state of a [`Body`]
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsData {
    /// Current velocity in world units per second
    pub velocity: Vec2,
    /// Gravity acceleration applied each step when enabled
    pub gravity: Vec2,
    /// Per-axis absolute velocity cap
    pub velocity_clamp: Vec2,
    /// Friction this body imparts on bodies it rests against
    pub friction_to_apply: Vec2,
    /// Friction acting on this body, re-accumulated every step
    pub friction_on_self: Vec2,
    /// Value `friction_on_self` falls back to after each step
    pub default_friction_on_self: Vec2,
    /// Physics toggles
    pub flags: PhysicsFlags,
}

impl Default for PhysicsData {
    fn default() -> Self {
        Self {
            velocity: Vec2::zeros(),
            gravity: Vec2::zeros(),
            velocity_clamp: Vec2::new(f32::MAX, f32::MAX),
            friction_to_apply: Vec2::zeros(),
            friction_on_self: Vec2::zeros(),
            default_friction_on_self: Vec2::zeros(),
            flags: PhysicsFlags::default(),
        }
    }
}

impl PhysicsData {
    /// Zero velocity and restore default friction; toggles are kept
    pub fn reset(&mut self) {
        self.velocity = Vec2::zeros();
        self.friction_on_self = self.default_friction_on_self;
    }
}

type BodyHook = Box<dyn FnMut(&mut Body)>;

/// Axis-aligned physics body carried as an entity component
///
/// Keyed hook lists run in insertion order at the matching points of the
/// world cycle; hooks receive the body itself and may mutate it freely.
pub struct Body {
    /// Kind of body
    pub body_type: BodyType,
    /// World-space bounds
    pub bounds: Rect,
    /// Physics state
    pub physics: PhysicsData,
    /// Arbitrary key-value data attached to the body
    pub properties: Properties,
    fixtures: Vec<Fixture>,
    pre_process: Vec<(String, BodyHook)>,
    post_process: Vec<(String, BodyHook)>,
    on_reset: Vec<(String, BodyHook)>,
}

impl Body {
    /// Create a body of the given type with zero-sized bounds
    pub fn new(body_type: BodyType) -> Self {
        Self {
            body_type,
            bounds: Rect::default(),
            physics: PhysicsData::default(),
            properties: Properties::new(),
            fixtures: Vec::new(),
            pre_process: Vec::new(),
            post_process: Vec::new(),
            on_reset: Vec::new(),
        }
    }

    /// Set the bounds (builder pattern)
    #[must_use]
    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = bounds;
        self
    }

    /// Set the physics state (builder pattern)
    #[must_use]
    pub fn with_physics(mut self, physics: PhysicsData) -> Self {
        self.physics = physics;
        self
    }

    /// Attach a fixture (builder pattern)
    #[must_use]
    pub fn with_fixture(mut self, fixture: Fixture) -> Self {
        self.fixtures.push(fixture);
        self
    }

    /// Attach a fixture, returning its slot index
    pub fn add_fixture(&mut self, fixture: Fixture) -> usize {
        self.fixtures.push(fixture);
        self.fixtures.len() - 1
    }

    /// Borrow the fixture in the given slot
    pub fn fixture(&self, index: usize) -> Option<&Fixture> {
        self.fixtures.get(index)
    }

    /// Borrow the fixture in the given slot mutably
    pub fn fixture_mut(&mut self, index: usize) -> Option<&mut Fixture> {
        self.fixtures.get_mut(index)
    }

    /// All fixtures in slot order
    pub fn fixtures(&self) -> &[Fixture] {
        &self.fixtures
    }

    /// Add or replace the pre-process hook stored under `key`
    pub fn put_pre_process_hook(
        &mut self,
        key: impl Into<String>,
        hook: impl FnMut(&mut Body) + 'static,
    ) {
        Self::put_hook(&mut self.pre_process, key.into(), Box::new(hook));
    }

    /// Add or replace the post-process hook stored under `key`
    pub fn put_post_process_hook(
        &mut self,
        key: impl Into<String>,
        hook: impl FnMut(&mut Body) + 'static,
    ) {
        Self::put_hook(&mut self.post_process, key.into(), Box::new(hook));
    }

    /// Add or replace the on-reset hook stored under `key`
    pub fn put_on_reset_hook(
        &mut self,
        key: impl Into<String>,
        hook: impl FnMut(&mut Body) + 'static,
    ) {
        Self::put_hook(&mut self.on_reset, key.into(), Box::new(hook));
    }

    /// Remove the pre-process hook stored under `key`
    pub fn remove_pre_process_hook(&mut self, key: &str) {
        self.pre_process.retain(|(k, _)| k != key);
    }

    /// Remove the post-process hook stored under `key`
    pub fn remove_post_process_hook(&mut self, key: &str) {
        self.post_process.retain(|(k, _)| k != key);
    }

    /// Remove the on-reset hook stored under `key`
    pub fn remove_on_reset_hook(&mut self, key: &str) {
        self.on_reset.retain(|(k, _)| k != key);
    }

    /// Run the pre-process hooks in insertion order
    pub fn pre_process(&mut self) {
        self.run_hooks(HookList::PreProcess);
    }

    /// Run the post-process hooks in insertion order
    pub fn post_process(&mut self) {
        self.run_hooks(HookList::PostProcess);
    }

    /// Advance the body by one fixed step
    ///
    /// Order: friction decay on enabled axes, friction restore, gravity,
    /// velocity clamp, translate x then y.
    pub fn integrate(&mut self, delta: f32) {
        let physics = &mut self.physics;

        if physics.flags.contains(PhysicsFlags::APPLY_FRICTION_X) && physics.friction_on_self.x > 0.0
        {
            physics.velocity.x *= (-physics.friction_on_self.x * delta).exp();
        }
        if physics.flags.contains(PhysicsFlags::APPLY_FRICTION_Y) && physics.friction_on_self.y > 0.0
        {
            physics.velocity.y *= (-physics.friction_on_self.y * delta).exp();
        }
        physics.friction_on_self = physics.default_friction_on_self;

        if physics.flags.contains(PhysicsFlags::GRAVITY_ON) {
            physics.velocity += physics.gravity * delta;
        }

        physics.velocity.x = physics
            .velocity
            .x
            .clamp(-physics.velocity_clamp.x.abs(), physics.velocity_clamp.x.abs());
        physics.velocity.y = physics
            .velocity
            .y
            .clamp(-physics.velocity_clamp.y.abs(), physics.velocity_clamp.y.abs());

        self.bounds.translate(physics.velocity.x * delta, 0.0);
        self.bounds.translate(0.0, physics.velocity.y * delta);
    }

    fn put_hook(list: &mut Vec<(String, BodyHook)>, key: String, hook: BodyHook) {
        if let Some(slot) = list.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = hook;
        } else {
            list.push((key, hook));
        }
    }

    // Hooks receive the body itself, so the list is detached while running
    // and re-attached afterwards. Hooks added mid-run are preserved.
    fn run_hooks(&mut self, which: HookList) {
        let mut hooks = std::mem::take(self.hook_list_mut(which));
        for (_, hook) in &mut hooks {
            hook(self);
        }
        let list = self.hook_list_mut(which);
        hooks.append(list);
        *list = hooks;
    }

    fn hook_list_mut(&mut self, which: HookList) -> &mut Vec<(String, BodyHook)> {
        match which {
            HookList::PreProcess => &mut self.pre_process,
            HookList::PostProcess => &mut self.post_process,
            HookList::OnReset => &mut self.on_reset,
        }
    }
}

#[derive(Clone, Copy)]
enum HookList {
    PreProcess,
    PostProcess,
    OnReset,
}

impl Component for Body {
    fn reset(&mut self) {
        self.physics.reset();
        self.run_hooks(HookList::OnReset);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

//! Fixtures: sensor boxes riding on bodies

use super::body::Body;
use crate::ecs::EntityId;
use crate::foundation::math::{Rect, Vec2};
use crate::foundation::properties::Properties;

/// Stable address of a fixture: owning entity plus slot index on its body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FixtureHandle {
    /// Entity owning the body the fixture is attached to
    pub entity: EntityId,
    /// Slot index on the body's fixture list
    pub index: usize,
}

/// Sensor box attached to a body
///
/// Fixtures never move bodies; they exist to generate contacts (hitboxes,
/// hurtboxes, feet sensors). An attached fixture follows its body's center
/// plus an offset; a detached one keeps its own world-space bounds.
#[derive(Debug)]
pub struct Fixture {
    /// Label describing the fixture's role ("damager", "feet", ...)
    pub tag: String,
    /// Offset from the body center while attached
    pub offset: Vec2,
    /// Local bounds; position is ignored while attached
    pub bounds: Rect,
    /// Inactive fixtures generate no contacts
    pub active: bool,
    /// Whether the fixture follows its body
    pub attached_to_body: bool,
    /// Arbitrary key-value data attached to the fixture
    pub properties: Properties,
}

impl Fixture {
    /// Create an active, attached fixture with the given tag and bounds
    pub fn new(tag: impl Into<String>, bounds: Rect) -> Self {
        Self {
            tag: tag.into(),
            offset: Vec2::zeros(),
            bounds,
            active: true,
            attached_to_body: true,
            properties: Properties::new(),
        }
    }

    /// Set the offset from the body center (builder pattern)
    #[must_use]
    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    /// Set whether the fixture generates contacts (builder pattern)
    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Detach the fixture from its body (builder pattern)
    #[must_use]
    pub fn detached(mut self) -> Self {
        self.attached_to_body = false;
        self
    }

    /// Current world-space bounds given the owning body
    pub fn world_bounds(&self, body: &Body) -> Rect {
        if self.attached_to_body {
            let mut bounds = self.bounds;
            bounds.set_center(body.bounds.center() + self.offset);
            bounds
        } else {
            self.bounds
        }
    }
}

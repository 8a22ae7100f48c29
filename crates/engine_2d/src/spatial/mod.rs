//! Broad-phase spatial indexing
//!
//! The world system rebuilds a [`WorldContainer`] every physics cycle and
//! queries it for collision candidates. Entries are plain copies of the
//! handle plus the bounds captured at insertion time, so queries never
//! touch the entity registry.

mod grid;

pub use grid::GridWorldContainer;

use crate::ecs::EntityId;
use crate::foundation::math::Rect;
use crate::physics::{BodyType, FixtureHandle};

/// Snapshot of a body inserted into a world container
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyEntry {
    /// Entity owning the body
    pub entity: EntityId,
    /// Body bounds at insertion time
    pub bounds: Rect,
    /// Body type at insertion time
    pub body_type: BodyType,
}

/// Snapshot of a fixture inserted into a world container
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixtureEntry {
    /// Handle back to the owning body's fixture slot
    pub handle: FixtureHandle,
    /// Fixture world bounds at insertion time
    pub bounds: Rect,
}

/// Spatial index over body and fixture snapshots
///
/// Query regions are inclusive cell-coordinate ranges; implementations
/// define how world coordinates map to cells.
pub trait WorldContainer {
    /// Drop every stored entry
    fn clear(&mut self);

    /// Index a body snapshot
    fn add_body(&mut self, entry: BodyEntry);

    /// Index a fixture snapshot
    fn add_fixture(&mut self, entry: FixtureEntry);

    /// Collect the bodies touching any cell in the region, deduplicated
    fn bodies_in(&self, min_x: i32, min_y: i32, max_x: i32, max_y: i32, out: &mut Vec<BodyEntry>);

    /// Collect the fixtures touching any cell in the region, deduplicated
    fn fixtures_in(
        &self,
        min_x: i32,
        min_y: i32,
        max_x: i32,
        max_y: i32,
        out: &mut Vec<FixtureEntry>,
    );
}

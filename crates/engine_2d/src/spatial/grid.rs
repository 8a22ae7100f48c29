//! Uniform grid world container

use super::{BodyEntry, FixtureEntry, WorldContainer};
use crate::foundation::math::Rect;
use std::collections::{HashMap, HashSet};

#[derive(Default)]
struct Cell {
    bodies: Vec<BodyEntry>,
    fixtures: Vec<FixtureEntry>,
}

/// Hash-grid [`WorldContainer`] with square cells of `ppm` world units
///
/// Each entry is indexed into every cell its bounds touch. When
/// `adjust_for_exact_grid_match` is set, a max edge landing exactly on a
/// gridline is attributed to the previous cell, so a body spanning
/// `[0, ppm]` occupies one cell rather than two.
pub struct GridWorldContainer {
    ppm: f32,
    adjust_for_exact_grid_match: bool,
    cells: HashMap<(i32, i32), Cell>,
}

impl GridWorldContainer {
    /// Create a grid with the given cell size in world units
    pub fn new(ppm: f32) -> Self {
        Self {
            ppm,
            adjust_for_exact_grid_match: true,
            cells: HashMap::new(),
        }
    }

    /// Set whether max edges exactly on gridlines map to the previous cell
    #[must_use]
    pub fn with_adjust_for_exact_grid_match(mut self, adjust: bool) -> Self {
        self.adjust_for_exact_grid_match = adjust;
        self
    }

    /// Cell size in world units
    pub fn ppm(&self) -> f32 {
        self.ppm
    }

    /// Inclusive cell range covered by the given bounds
    pub fn cell_range(&self, bounds: &Rect) -> (i32, i32, i32, i32) {
        let min_x = self.floor_cell(bounds.x);
        let min_y = self.floor_cell(bounds.y);
        let mut max_x = self.floor_cell(bounds.max_x());
        let mut max_y = self.floor_cell(bounds.max_y());
        if self.adjust_for_exact_grid_match {
            if self.on_gridline(bounds.max_x()) {
                max_x -= 1;
            }
            if self.on_gridline(bounds.max_y()) {
                max_y -= 1;
            }
        }
        (min_x, min_y, max_x.max(min_x), max_y.max(min_y))
    }

    fn floor_cell(&self, coord: f32) -> i32 {
        #[allow(clippy::cast_possible_truncation)]
        let cell = (coord / self.ppm).floor() as i32;
        cell
    }

    fn on_gridline(&self, coord: f32) -> bool {
        (coord / self.ppm).fract() == 0.0
    }
}

impl WorldContainer for GridWorldContainer {
    fn clear(&mut self) {
        self.cells.clear();
    }

    fn add_body(&mut self, entry: BodyEntry) {
        let (min_x, min_y, max_x, max_y) = self.cell_range(&entry.bounds);
        for x in min_x..=max_x {
            for y in min_y..=max_y {
                self.cells.entry((x, y)).or_default().bodies.push(entry);
            }
        }
    }

    fn add_fixture(&mut self, entry: FixtureEntry) {
        let (min_x, min_y, max_x, max_y) = self.cell_range(&entry.bounds);
        for x in min_x..=max_x {
            for y in min_y..=max_y {
                self.cells.entry((x, y)).or_default().fixtures.push(entry);
            }
        }
    }

    fn bodies_in(&self, min_x: i32, min_y: i32, max_x: i32, max_y: i32, out: &mut Vec<BodyEntry>) {
        let mut seen = HashSet::new();
        for x in min_x..=max_x {
            for y in min_y..=max_y {
                let Some(cell) = self.cells.get(&(x, y)) else {
                    continue;
                };
                for entry in &cell.bodies {
                    if seen.insert(entry.entity) {
                        out.push(*entry);
                    }
                }
            }
        }
    }

    fn fixtures_in(
        &self,
        min_x: i32,
        min_y: i32,
        max_x: i32,
        max_y: i32,
        out: &mut Vec<FixtureEntry>,
    ) {
        let mut seen = HashSet::new();
        for x in min_x..=max_x {
            for y in min_y..=max_y {
                let Some(cell) = self.cells.get(&(x, y)) else {
                    continue;
                };
                for entry in &cell.fixtures {
                    if seen.insert(entry.handle) {
                        out.push(*entry);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::EntityRegistry;
    use crate::ecs::{Entity, EntityId};
    use crate::physics::{BodyType, FixtureHandle};

    fn ids(n: usize) -> Vec<EntityId> {
        let mut registry = EntityRegistry::new();
        (0..n).map(|_| registry.insert(Entity::new("e"))).collect()
    }

    fn body(entity: EntityId, x: f32, y: f32, w: f32, h: f32) -> BodyEntry {
        BodyEntry {
            entity,
            bounds: Rect::new(x, y, w, h),
            body_type: BodyType::Dynamic,
        }
    }

    fn bodies_at(grid: &GridWorldContainer, x: i32, y: i32) -> Vec<BodyEntry> {
        let mut out = Vec::new();
        grid.bodies_in(x, y, x, y, &mut out);
        out
    }

    #[test]
    fn bodies_land_in_the_cells_their_bounds_touch() {
        let mut grid = GridWorldContainer::new(10.0).with_adjust_for_exact_grid_match(false);
        let ids = ids(3);
        let entries = [
            body(ids[0], 0.0, 0.0, 10.0, 10.0),
            body(ids[1], 42.0, 42.0, 15.0, 15.0),
            body(ids[2], 92.0, 92.0, 5.0, 5.0),
        ];
        for entry in entries {
            grid.add_body(entry);
        }

        for x in 0..=10 {
            for y in 0..=10 {
                let found = bodies_at(&grid, x, y);
                match (x, y) {
                    (0..=1, 0..=1) => assert_eq!(found, vec![entries[0]]),
                    (4..=5, 4..=5) => assert_eq!(found, vec![entries[1]]),
                    (9, 9) => assert_eq!(found, vec![entries[2]]),
                    _ => assert!(found.is_empty(), "unexpected body at ({x},{y})"),
                }
            }
        }
    }

    #[test]
    fn fixtures_land_in_the_cells_their_bounds_touch() {
        let mut grid = GridWorldContainer::new(10.0).with_adjust_for_exact_grid_match(false);
        let ids = ids(1);
        let handle = FixtureHandle {
            entity: ids[0],
            index: 0,
        };
        grid.add_fixture(FixtureEntry {
            handle,
            bounds: Rect::new(10.0, 10.0, 10.0, 10.0),
        });

        let mut out = Vec::new();
        grid.fixtures_in(1, 1, 1, 1, &mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].handle, handle);
    }

    #[test]
    fn area_queries_exclude_bodies_outside_the_region() {
        let mut grid = GridWorldContainer::new(10.0);
        let ids = ids(3);
        let entries = [
            body(ids[0], 10.0, 10.0, 20.0, 20.0),
            body(ids[1], 40.0, 40.0, 10.0, 10.0),
            body(ids[2], 80.0, 80.0, 5.0, 5.0),
        ];
        for entry in entries {
            grid.add_body(entry);
        }

        let mut out = Vec::new();
        grid.bodies_in(0, 0, 3, 3, &mut out);
        assert!(out.contains(&entries[0]));
        assert!(!out.contains(&entries[1]));
        assert!(!out.contains(&entries[2]));
    }

    #[test]
    fn area_queries_deduplicate_multi_cell_bodies() {
        let mut grid = GridWorldContainer::new(10.0);
        let ids = ids(1);
        let entry = body(ids[0], 5.0, 5.0, 20.0, 20.0);
        grid.add_body(entry);

        let mut out = Vec::new();
        grid.bodies_in(0, 0, 3, 3, &mut out);
        assert_eq!(out, vec![entry]);
    }

    #[test]
    fn exact_grid_match_attributes_max_edges_to_the_previous_cell() {
        let mut grid = GridWorldContainer::new(10.0);
        let ids = ids(1);
        grid.add_body(body(ids[0], 0.0, 0.0, 10.0, 10.0));

        assert_eq!(bodies_at(&grid, 0, 0).len(), 1);
        assert!(bodies_at(&grid, 1, 0).is_empty());
        assert!(bodies_at(&grid, 0, 1).is_empty());
        assert!(bodies_at(&grid, 1, 1).is_empty());
    }

    #[test]
    fn exact_grid_match_handles_negative_coordinates() {
        let mut grid = GridWorldContainer::new(10.0);
        let ids = ids(1);
        grid.add_body(body(ids[0], -10.0, -10.0, 10.0, 10.0));

        assert_eq!(bodies_at(&grid, -1, -1).len(), 1);
        assert!(bodies_at(&grid, 0, 0).is_empty());
        assert!(bodies_at(&grid, 0, 1).is_empty());
        assert!(bodies_at(&grid, 1, 0).is_empty());
    }

    #[test]
    fn without_adjustment_exact_max_edges_spill_into_the_next_cell() {
        let mut grid = GridWorldContainer::new(10.0).with_adjust_for_exact_grid_match(false);
        let ids = ids(2);
        grid.add_body(body(ids[0], 10.0, 10.0, 20.0, 20.0));
        grid.add_body(body(ids[1], 30.0, 30.0, 10.0, 10.0));

        assert_eq!(bodies_at(&grid, 1, 1).len(), 1);
        // Cell (3,3) holds both: the first body's max edge lands exactly on 30
        assert_eq!(bodies_at(&grid, 3, 3).len(), 2);
    }

    #[test]
    fn clear_empties_every_cell() {
        let mut grid = GridWorldContainer::new(10.0);
        let ids = ids(2);
        grid.add_body(body(ids[0], 10.0, 10.0, 20.0, 20.0));
        grid.add_body(body(ids[1], 40.0, 40.0, 10.0, 10.0));

        grid.clear();
        let mut out = Vec::new();
        grid.bodies_in(0, 0, 10, 10, &mut out);
        assert!(out.is_empty());
    }
}

use std::collections::HashMap;

use glade_ecs::Entity;
use glam::Vec2;

use crate::components::BoxCollider;

/// World-space axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Aabb {
    /// Box for an entity at `position` with the given collider: centered at
    /// position + offset, half-extents = size / 2.
    pub fn from_collider(position: Vec2, collider: &BoxCollider) -> Self {
        let cx = position.x + collider.offset_x;
        let cy = position.y + collider.offset_y;
        let hw = collider.width * 0.5;
        let hh = collider.height * 0.5;
        Self {
            left: cx - hw,
            top: cy - hh,
            right: cx + hw,
            bottom: cy + hh,
        }
    }

    /// Strict overlap test: boxes sharing only an edge do not overlap.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.left < other.right
            && self.right > other.left
            && self.top < other.bottom
            && self.bottom > other.top
    }
}

/// Broad-phase cell size in world units. Roughly twice a typical entity
/// footprint (~1 unit), so candidate lists stay short without the cell
/// count exploding.
pub const CELL_SIZE: f32 = 2.0;

/// Ephemeral uniform grid for broad-phase collision. Built fresh each
/// collision pass and discarded at its end; never persisted across frames.
pub struct SpatialGrid {
    cell_size: f32,
    cells: HashMap<(i32, i32), Vec<Entity>>,
}

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
        }
    }

    fn cell_span(&self, aabb: &Aabb) -> (i32, i32, i32, i32) {
        (
            (aabb.left / self.cell_size).floor() as i32,
            (aabb.right / self.cell_size).floor() as i32,
            (aabb.top / self.cell_size).floor() as i32,
            (aabb.bottom / self.cell_size).floor() as i32,
        )
    }

    /// Insert an entity into every cell its box overlaps. A box straddling
    /// a cell boundary registers in multiple cells.
    pub fn insert(&mut self, entity: Entity, aabb: &Aabb) {
        let (min_cx, max_cx, min_cy, max_cy) = self.cell_span(aabb);
        for cy in min_cy..=max_cy {
            for cx in min_cx..=max_cx {
                self.cells.entry((cx, cy)).or_default().push(entity);
            }
        }
    }

    /// Collect all entities registered in cells the box overlaps. The output
    /// may contain duplicates; the caller deduplicates.
    pub fn query(&self, aabb: &Aabb, out: &mut Vec<Entity>) {
        let (min_cx, max_cx, min_cy, max_cy) = self.cell_span(aabb);
        for cy in min_cy..=max_cy {
            for cx in min_cx..=max_cx {
                if let Some(cell) = self.cells.get(&(cx, cy)) {
                    out.extend_from_slice(cell);
                }
            }
        }
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(index: u32) -> Entity {
        Entity::from_raw(index, 0)
    }

    fn unit_box(x: f32, y: f32) -> Aabb {
        Aabb::from_collider(Vec2::new(x, y), &BoxCollider::solid(1.0, 1.0))
    }

    #[test]
    fn from_collider_applies_offset_and_half_extents() {
        let collider = BoxCollider::solid(2.0, 4.0).with_offset(1.0, -1.0);
        let aabb = Aabb::from_collider(Vec2::new(10.0, 10.0), &collider);
        assert_eq!(aabb.left, 10.0);
        assert_eq!(aabb.right, 12.0);
        assert_eq!(aabb.top, 7.0);
        assert_eq!(aabb.bottom, 11.0);
    }

    #[test]
    fn edge_touching_boxes_do_not_overlap() {
        let a = unit_box(0.0, 0.0);
        let b = unit_box(1.0, 0.0);
        assert!(!a.overlaps(&b));
        let c = unit_box(0.9, 0.0);
        assert!(a.overlaps(&c));
    }

    #[test]
    fn straddling_box_lands_in_multiple_cells() {
        let mut grid = SpatialGrid::new(CELL_SIZE);
        // Centered on a cell corner: covers four cells.
        grid.insert(entity(0), &unit_box(2.0, 2.0));
        assert_eq!(grid.cell_count(), 4);
    }

    #[test]
    fn query_finds_neighbors_and_may_duplicate() {
        let mut grid = SpatialGrid::new(CELL_SIZE);
        let near = unit_box(0.5, 0.5);
        let far = unit_box(40.0, 40.0);
        grid.insert(entity(1), &near);
        grid.insert(entity(2), &far);

        let mut found = Vec::new();
        grid.query(&unit_box(0.0, 0.0), &mut found);
        assert!(found.contains(&entity(1)));
        assert!(!found.contains(&entity(2)));
    }

    #[test]
    fn negative_coordinates_hash_to_distinct_cells() {
        let mut grid = SpatialGrid::new(CELL_SIZE);
        grid.insert(entity(1), &unit_box(-3.0, -3.0));

        let mut found = Vec::new();
        grid.query(&unit_box(3.0, 3.0), &mut found);
        assert!(found.is_empty());

        found.clear();
        grid.query(&unit_box(-3.0, -3.0), &mut found);
        assert_eq!(found.len(), 1);
    }
}

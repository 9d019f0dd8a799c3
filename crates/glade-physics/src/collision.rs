//! AABB collision resolution.
//!
//! Runs in FixedUpdate, after movement integration. One pass does:
//!
//! 1. Broad phase: build an ephemeral spatial grid over every solid entity
//!    with a transform and box collider.
//! 2. Per solid mover (additionally holds a velocity): resolve against solid
//!    tiles, then against nearby solid entities from the grid.
//!
//! Resolution is purely positional, along the single axis of minimum
//! penetration; velocity is never touched. There is no relaxation pass, so
//! stacked contacts can leave residual penetration, and entity-vs-entity
//! resolution displaces only the mover currently being processed.

use glade_ecs::{Entity, World};
use glam::Vec2;
use tracing::trace;

use crate::components::{BoxCollider, Transform2D, Velocity2D};
use crate::grid::{Aabb, SpatialGrid, CELL_SIZE};
use crate::tilemap::TileSolidity;

/// Displacement moving `mover` out of `other` along the axis of smallest
/// overlap. Both boxes must overlap. On equal overlaps the tie goes, in
/// order: left, right, top, bottom.
fn min_penetration_axis(mover: &Aabb, other: &Aabb) -> Vec2 {
    let overlap_left = mover.right - other.left;
    let overlap_right = other.right - mover.left;
    let overlap_top = mover.bottom - other.top;
    let overlap_bottom = other.bottom - mover.top;

    let mut min_overlap = overlap_left;
    let mut resolve = Vec2::new(-overlap_left, 0.0);

    if overlap_right < min_overlap {
        min_overlap = overlap_right;
        resolve = Vec2::new(overlap_right, 0.0);
    }
    if overlap_top < min_overlap {
        min_overlap = overlap_top;
        resolve = Vec2::new(0.0, -overlap_top);
    }
    if overlap_bottom < min_overlap {
        resolve = Vec2::new(0.0, overlap_bottom);
    }
    resolve
}

/// Push `position` out of every solid tile its box overlaps.
///
/// Tiles are visited in row-major scan order and the mover's box is
/// recomputed before each test, since earlier corrections may have moved it.
/// With several tiles involved the outcome can depend on visitation order;
/// that approximation is inherited behavior.
fn resolve_tile_collisions(position: &mut Vec2, collider: &BoxCollider, tiles: &TileSolidity) {
    let aabb = Aabb::from_collider(*position, collider);
    let origin = tiles.origin();

    // Candidate tile range, clamped to the grid.
    let col_min = (((aabb.left - origin.x).floor()) as i32).max(0);
    let col_max = (((aabb.right - origin.x).floor()) as i32).min(tiles.width() - 1);
    let row_min = (((aabb.top - origin.y).floor()) as i32).max(0);
    let row_max = (((aabb.bottom - origin.y).floor()) as i32).min(tiles.height() - 1);

    for row in row_min..=row_max {
        for col in col_min..=col_max {
            if !tiles.is_solid(row, col) {
                continue;
            }
            let tile_box = tiles.tile_box(row, col);
            let mover_box = Aabb::from_collider(*position, collider);
            if !mover_box.overlaps(&tile_box) {
                continue;
            }
            *position += min_penetration_axis(&mover_box, &tile_box);
        }
    }
}

/// One collision pass over the world. Scheduler-invoked with the
/// `(world, dt)` system shape; dt is unused, resolution is positional.
pub fn collision_system(world: &mut World, _dt: f32) {
    // Broad phase: every solid entity with a transform and collider.
    let mut grid = SpatialGrid::new(CELL_SIZE);
    for (entity, (transform, collider)) in world.query::<(&Transform2D, &BoxCollider)>() {
        if !collider.is_solid {
            continue;
        }
        grid.insert(entity, &Aabb::from_collider(transform.position, collider));
    }

    // Narrow phase runs per mover; collect handles first so component
    // borrows stay scoped to each iteration.
    let movers: Vec<Entity> = world
        .query::<(&Transform2D, &Velocity2D, &BoxCollider)>()
        .filter(|(_, (_, _, collider))| collider.is_solid)
        .map(|(entity, _)| entity)
        .collect();

    let mut candidates: Vec<Entity> = Vec::new();
    for mover in movers {
        let Some(collider) = world.get::<BoxCollider>(mover).copied() else {
            continue;
        };
        let Some(mut position) = world.get::<Transform2D>(mover).map(|t| t.position) else {
            continue;
        };

        // Static tile geometry first.
        if let Some(tiles) = world.resource::<TileSolidity>() {
            resolve_tile_collisions(&mut position, &collider, tiles);
        }

        // Then other solid entities near the (possibly corrected) box.
        let mover_box = Aabb::from_collider(position, &collider);
        candidates.clear();
        grid.query(&mover_box, &mut candidates);
        candidates.sort_unstable();
        candidates.dedup();

        for &other in &candidates {
            if other == mover {
                continue;
            }
            let Some(other_collider) = world.get::<BoxCollider>(other) else {
                continue;
            };
            if !other_collider.is_solid {
                continue;
            }
            let Some(other_transform) = world.get::<Transform2D>(other) else {
                continue;
            };
            let other_box = Aabb::from_collider(other_transform.position, other_collider);

            // Recompute: earlier contacts in this loop may have moved us.
            let mover_box = Aabb::from_collider(position, &collider);
            if !mover_box.overlaps(&other_box) {
                continue;
            }

            trace!(?mover, ?other, "resolving entity contact");
            // Only the mover is displaced; the other entity gets its own
            // turn later in the pass, if it is a mover at all.
            position += min_penetration_axis(&mover_box, &other_box);
        }

        if let Some(transform) = world.get_mut::<Transform2D>(mover) {
            transform.position = position;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(left: f32, top: f32, right: f32, bottom: f32) -> Aabb {
        Aabb {
            left,
            top,
            right,
            bottom,
        }
    }

    #[test]
    fn shallowest_axis_wins() {
        // Mover overlaps 0.2 deep from the left, 0.6 vertically.
        let mover = boxed(0.0, 0.0, 1.0, 1.0);
        let other = boxed(0.8, -0.4, 1.8, 0.6);
        let resolve = min_penetration_axis(&mover, &other);
        assert_eq!(resolve, Vec2::new(-0.2, 0.0));
    }

    #[test]
    fn vertical_resolution_leaves_x_alone() {
        let mover = boxed(0.0, 0.6, 1.0, 1.6);
        let other = boxed(-2.0, 1.5, 3.0, 2.5);
        let resolve = min_penetration_axis(&mover, &other);
        assert_eq!(resolve.x, 0.0);
        assert!((resolve.y - -0.1).abs() < 1e-6);
    }

    #[test]
    fn equal_overlap_prefers_left() {
        // Perfectly concentric unit boxes: all four overlaps equal.
        let mover = boxed(0.0, 0.0, 1.0, 1.0);
        let resolve = min_penetration_axis(&mover, &mover);
        assert_eq!(resolve, Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn tile_resolution_is_tangent() {
        let tiles = {
            let mut t = TileSolidity::open(Vec2::ZERO, 4, 4).unwrap();
            t.set_solid(0, 1, true);
            t
        };
        let collider = BoxCollider::solid(1.0, 1.0);
        // Box [1,2] x [-0.6,0.4] against tile [1,2] x [0,1]: min overlap is
        // 0.4 from the top.
        let mut position = Vec2::new(1.5, -0.1);
        resolve_tile_collisions(&mut position, &collider, &tiles);
        assert!((position.y - -0.5).abs() < 1e-6);
        assert_eq!(position.x, 1.5);

        let resolved = Aabb::from_collider(position, &collider);
        assert!(!resolved.overlaps(&tiles.tile_box(0, 1)));
    }

    #[test]
    fn mover_outside_map_is_untouched() {
        let tiles = TileSolidity::new(Vec2::ZERO, 2, 2, vec![true; 4]).unwrap();
        let collider = BoxCollider::solid(1.0, 1.0);
        let mut position = Vec2::new(-10.0, -10.0);
        resolve_tile_collisions(&mut position, &collider, &tiles);
        assert_eq!(position, Vec2::new(-10.0, -10.0));
    }
}

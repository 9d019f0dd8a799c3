//! Glade Physics - 2D collision for the Glade engine
//!
//! Axis-aligned box colliders, a uniform-grid broad phase, and positional
//! minimum-penetration resolution against tile geometry and other solid
//! entities. No impulses, no swept tests: movement integrates, collision
//! corrects positions.

mod collision;
mod components;
mod grid;
mod movement;
mod tilemap;

pub use collision::collision_system;
pub use components::{BoxCollider, Transform2D, Velocity2D};
pub use grid::{Aabb, SpatialGrid, CELL_SIZE};
pub use movement::movement_system;
pub use tilemap::{TileSolidity, TileSolidityError};

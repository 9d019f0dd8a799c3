//! Glade ECS - Entity Component System
//!
//! The simulation data store and scheduler for the Glade engine:
//! generational entity handles, sparse-set component pools with O(1)
//! insert/remove, multi-type queries driven by the smallest pool, and a
//! phase-ordered system schedule with per-system profiling.

mod component;
mod entity;
mod query;
mod schedule;
mod world;

pub use component::Component;
pub use entity::{Entity, EntityAllocator, MAX_ENTITIES};
pub use query::{QueryIter, WorldQuery};
pub use schedule::{Phase, Schedule, System};
pub use world::World;

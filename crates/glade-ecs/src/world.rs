use std::any::{Any, TypeId};
use std::collections::HashMap;

use crate::component::{Component, ComponentStorage, SparseSet};
use crate::entity::{Entity, EntityAllocator};
use crate::query::{QueryIter, WorldQuery};

/// The central ECS container. Owns the entity allocator, every component
/// pool, and the singleton resources.
pub struct World {
    entities: EntityAllocator,
    components: HashMap<TypeId, Box<dyn ComponentStorage>>,
    resources: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl World {
    pub fn new() -> Self {
        Self {
            entities: EntityAllocator::new(),
            components: HashMap::new(),
            resources: HashMap::new(),
        }
    }

    // ---- Entity management ----

    /// Spawn a new entity with no components.
    pub fn spawn(&mut self) -> Entity {
        self.entities.allocate()
    }

    /// Despawn an entity, purging it from every component pool. Returns
    /// `false` (and does nothing) if the handle is dead or stale.
    pub fn despawn(&mut self, entity: Entity) -> bool {
        if !self.entities.deallocate(entity) {
            return false;
        }
        for storage in self.components.values_mut() {
            storage.remove_entity(entity);
        }
        true
    }

    /// Check whether an entity is alive. Generation-checked: a handle from a
    /// destroyed entity stays dead even after its slot is reused.
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    /// Number of alive entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    // ---- Component management ----

    fn storage_mut<T: Component>(&mut self) -> &mut SparseSet<T> {
        self.components
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(SparseSet::<T>::new()))
            .as_any_mut()
            .downcast_mut::<SparseSet<T>>()
            .expect("component type mismatch")
    }

    fn storage<T: Component>(&self) -> Option<&SparseSet<T>> {
        self.components
            .get(&TypeId::of::<T>())
            .and_then(|s| s.as_any().downcast_ref::<SparseSet<T>>())
    }

    /// Insert a component on an entity, replacing any existing component of
    /// the same type in place. Lazily creates the pool on first use.
    pub fn insert<T: Component>(&mut self, entity: Entity, component: T) {
        assert!(
            self.entities.is_alive(entity),
            "cannot insert component on dead entity {entity:?}"
        );
        self.storage_mut::<T>().insert(entity, component);
    }

    /// Get an immutable reference to a component on an entity.
    pub fn get<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.storage::<T>()?.get(entity)
    }

    /// Get a mutable reference to a component on an entity.
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.components
            .get_mut(&TypeId::of::<T>())
            .and_then(|s| s.as_any_mut().downcast_mut::<SparseSet<T>>())
            .and_then(|set| set.get_mut(entity))
    }

    /// Remove a component from an entity. Returns `true` if it was present.
    pub fn remove<T: Component>(&mut self, entity: Entity) -> bool {
        if let Some(storage) = self.components.get_mut(&TypeId::of::<T>()) {
            storage.remove_entity(entity)
        } else {
            false
        }
    }

    /// Check whether an entity has a component of the given type.
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.storage::<T>().is_some_and(|s| s.contains(entity))
    }

    /// Number of components of a given type currently stored.
    pub fn component_count<T: Component>(&self) -> usize {
        self.storage::<T>().map_or(0, SparseSet::len)
    }

    /// Drop every entity, component pool, and resource.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.components.clear();
        self.resources.clear();
    }

    // ---- Queries ----

    /// Query entities that match the given component pattern, yielding
    /// `(Entity, Q::Item)`.
    ///
    /// Iteration is driven by the smallest required pool (fewest entries at
    /// call time) walked in its dense order; every other required component
    /// is membership-checked per entity. If any required pool has never been
    /// created, the query is valid and empty. Queries are cheap and
    /// single-use: build one per system invocation, never cache across
    /// frames.
    ///
    /// # Example
    /// ```ignore
    /// for (entity, (pos, vel)) in world.query::<(&Position, &Velocity)>() {
    ///     // ...
    /// }
    /// ```
    pub fn query<Q: WorldQuery>(&self) -> QueryIter<'_, Q> {
        let required = Q::required_type_ids();

        let candidates = if required.is_empty() {
            // Purely optional query: every alive entity is a candidate.
            self.entities.alive_handles().collect()
        } else {
            let mut driver: Option<&dyn ComponentStorage> = None;
            for tid in &required {
                match self.components.get(tid) {
                    Some(storage) => {
                        let storage = storage.as_ref();
                        if driver.map_or(true, |d| storage.len() < d.len()) {
                            driver = Some(storage);
                        }
                    }
                    // A required pool was never created: no matches possible.
                    None => {
                        driver = None;
                        break;
                    }
                }
            }
            match driver {
                Some(driver) => driver.dense_entities().to_vec(),
                None => Vec::new(),
            }
        };

        QueryIter {
            storages: &self.components,
            candidates,
            position: 0,
            _marker: std::marker::PhantomData,
        }
    }

    // ---- Resources ----

    /// Insert a singleton resource, replacing any previous value of the type.
    pub fn insert_resource<T: 'static + Send + Sync>(&mut self, value: T) {
        self.resources.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Get an immutable reference to a resource.
    pub fn resource<T: 'static + Send + Sync>(&self) -> Option<&T> {
        self.resources
            .get(&TypeId::of::<T>())
            .and_then(|b| b.downcast_ref())
    }

    /// Get a mutable reference to a resource.
    pub fn resource_mut<T: 'static + Send + Sync>(&mut self) -> Option<&mut T> {
        self.resources
            .get_mut(&TypeId::of::<T>())
            .and_then(|b| b.downcast_mut())
    }

    /// Remove a resource, returning it if it existed.
    pub fn remove_resource<T: 'static + Send + Sync>(&mut self) -> Option<T> {
        self.resources
            .remove(&TypeId::of::<T>())
            .and_then(|b| b.downcast().ok())
            .map(|b| *b)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Position {
        x: f32,
        y: f32,
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Velocity {
        dx: f32,
        dy: f32,
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Name(String);

    #[test]
    fn spawn_and_despawn() {
        let mut world = World::new();
        let e = world.spawn();
        assert!(world.is_alive(e));
        assert_eq!(world.entity_count(), 1);
        assert!(world.despawn(e));
        assert!(!world.is_alive(e));
        assert_eq!(world.entity_count(), 0);
        assert!(!world.despawn(e));
    }

    #[test]
    fn insert_get_remove_component() {
        let mut world = World::new();
        let e = world.spawn();
        world.insert(e, Position { x: 1.0, y: 2.0 });
        assert_eq!(world.get::<Position>(e), Some(&Position { x: 1.0, y: 2.0 }));
        assert!(world.has::<Position>(e));
        assert!(world.remove::<Position>(e));
        assert!(!world.has::<Position>(e));
        assert!(!world.remove::<Position>(e));
    }

    #[test]
    fn component_mutation() {
        let mut world = World::new();
        let e = world.spawn();
        world.insert(e, Position { x: 0.0, y: 0.0 });
        world.get_mut::<Position>(e).unwrap().x = 5.0;
        assert_eq!(world.get::<Position>(e).unwrap().x, 5.0);
    }

    #[test]
    fn stale_handle_cannot_reach_reused_slot() {
        let mut world = World::new();
        let e1 = world.spawn();
        world.insert(e1, Position { x: 1.0, y: 0.0 });
        world.despawn(e1);

        // Reuses slot 0 under a new generation.
        let e2 = world.spawn();
        world.insert(e2, Position { x: 9.0, y: 9.0 });
        assert_ne!(e1, e2);
        assert_eq!(e1.index(), e2.index());

        assert!(!world.is_alive(e1));
        assert_eq!(world.get::<Position>(e1), None);
        assert!(!world.has::<Position>(e1));
        // A stale remove must not strip the new entity's data.
        assert!(!world.remove::<Position>(e1));
        assert_eq!(world.get::<Position>(e2), Some(&Position { x: 9.0, y: 9.0 }));
    }

    #[test]
    fn query_multi_component() {
        let mut world = World::new();
        let e1 = world.spawn();
        let e2 = world.spawn();
        let e3 = world.spawn();
        world.insert(e1, Position { x: 1.0, y: 0.0 });
        world.insert(e1, Velocity { dx: 1.0, dy: 0.0 });
        world.insert(e2, Position { x: 2.0, y: 0.0 });
        world.insert(e3, Velocity { dx: 3.0, dy: 0.0 });

        let results: Vec<_> = world.query::<(&Position, &Velocity)>().collect();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, e1);
    }

    #[test]
    fn query_result_independent_of_driver_pool() {
        // Position is the bigger pool; Velocity drives.
        let mut world = World::new();
        let mut both = Vec::new();
        for i in 0..10 {
            let e = world.spawn();
            world.insert(e, Position { x: i as f32, y: 0.0 });
            if i % 2 == 0 {
                world.insert(e, Velocity { dx: 0.0, dy: 0.0 });
                both.push(e);
            }
        }
        let small_driver: Vec<_> = world
            .query::<(&Position, &Velocity)>()
            .map(|(e, _)| e)
            .collect();
        assert_eq!(small_driver, both);

        // Flip the pool sizes: now Position drives. Same set must come out.
        for _ in 0..20 {
            let e = world.spawn();
            world.insert(e, Velocity { dx: 1.0, dy: 1.0 });
        }
        let mut big_driver: Vec<_> = world
            .query::<(&Position, &Velocity)>()
            .map(|(e, _)| e)
            .collect();
        big_driver.sort();
        let mut expected: Vec<_> = both
            .iter()
            .copied()
            .chain(
                world
                    .query::<(&Velocity,)>()
                    .filter(|(e, _)| world.has::<Position>(*e))
                    .map(|(e, _)| e),
            )
            .collect();
        expected.sort();
        expected.dedup();
        assert_eq!(big_driver, expected);
    }

    #[test]
    fn query_missing_pool_is_empty_not_error() {
        let mut world = World::new();
        let e = world.spawn();
        world.insert(e, Position { x: 0.0, y: 0.0 });
        // Velocity pool never created.
        assert_eq!(world.query::<(&Position, &Velocity)>().count(), 0);
    }

    #[test]
    fn query_has_no_duplicates() {
        let mut world = World::new();
        for _ in 0..32 {
            let e = world.spawn();
            world.insert(e, Position { x: 0.0, y: 0.0 });
            world.insert(e, Velocity { dx: 0.0, dy: 0.0 });
        }
        let mut seen: Vec<_> = world
            .query::<(&Position, &Velocity)>()
            .map(|(e, _)| e)
            .collect();
        let total = seen.len();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), total);
        assert_eq!(total, 32);
    }

    #[test]
    fn query_optional() {
        let mut world = World::new();
        let e1 = world.spawn();
        let e2 = world.spawn();
        world.insert(e1, Position { x: 1.0, y: 0.0 });
        world.insert(e1, Name("one".to_string()));
        world.insert(e2, Position { x: 2.0, y: 0.0 });

        let results: Vec<_> = world.query::<(&Position, Option<&Name>)>().collect();
        assert_eq!(results.len(), 2);
        let named = results.iter().filter(|(_, (_, n))| n.is_some()).count();
        assert_eq!(named, 1);
    }

    #[test]
    fn unrelated_components_do_not_change_results() {
        let mut world = World::new();
        let e1 = world.spawn();
        world.insert(e1, Position { x: 0.0, y: 0.0 });
        world.insert(e1, Velocity { dx: 0.0, dy: 0.0 });

        let before: Vec<_> = world
            .query::<(&Position, &Velocity)>()
            .map(|(e, _)| e)
            .collect();

        for i in 0..5 {
            let e = world.spawn();
            world.insert(e, Name(format!("bystander {i}")));
        }

        let after: Vec<_> = world
            .query::<(&Position, &Velocity)>()
            .map(|(e, _)| e)
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn despawn_removes_components() {
        let mut world = World::new();
        let e = world.spawn();
        world.insert(e, Position { x: 1.0, y: 0.0 });
        world.despawn(e);
        assert_eq!(world.query::<(&Position,)>().count(), 0);
        assert_eq!(world.component_count::<Position>(), 0);
    }

    #[test]
    fn clear_drops_everything() {
        let mut world = World::new();
        let e = world.spawn();
        world.insert(e, Position { x: 0.0, y: 0.0 });
        world.insert_resource(1u8);
        world.clear();
        assert!(!world.is_alive(e));
        assert_eq!(world.entity_count(), 0);
        assert_eq!(world.component_count::<Position>(), 0);
        assert_eq!(world.resource::<u8>(), None);
    }

    #[test]
    fn resource_insert_get_remove() {
        let mut world = World::new();
        world.insert_resource(42u32);
        assert_eq!(world.resource::<u32>(), Some(&42));
        *world.resource_mut::<u32>().unwrap() = 100;
        assert_eq!(world.remove_resource::<u32>(), Some(100));
        assert_eq!(world.resource::<u32>(), None);
    }
}

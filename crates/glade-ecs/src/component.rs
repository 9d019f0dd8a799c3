use std::any::Any;

use crate::entity::{Entity, MAX_ENTITIES};

/// Marker trait for types that can be stored as ECS components.
pub trait Component: 'static + Send + Sync {}

/// Blanket implementation: any `'static + Send + Sync` type is a valid component.
impl<T: 'static + Send + Sync> Component for T {}

/// Type-erased component storage interface. Lets the [`crate::World`] purge
/// an entity from every pool without knowing the stored types.
pub(crate) trait ComponentStorage: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn remove_entity(&mut self, entity: Entity) -> bool;
    fn contains_entity(&self, entity: Entity) -> bool;
    fn dense_entities(&self) -> &[Entity];
    fn len(&self) -> usize;
    fn clear(&mut self);
}

const INVALID_DENSE: u32 = u32::MAX;

/// Sparse-set storage for a single component type. O(1) insert, remove and
/// lookup; dense, cache-friendly iteration.
///
/// The dense entity array stores full handles, so membership checks compare
/// index *and* generation. A stale handle whose slot was reused by a newer
/// entity fails that comparison and can never alias the new entity's data.
pub(crate) struct SparseSet<T> {
    /// Maps entity index to dense slot; `INVALID_DENSE` means absent.
    sparse: Vec<u32>,
    /// Handle owning each dense slot.
    entities: Vec<Entity>,
    /// Packed component values, parallel to `entities`.
    dense: Vec<T>,
}

impl<T: Component> SparseSet<T> {
    pub fn new() -> Self {
        Self {
            sparse: Vec::new(),
            entities: Vec::new(),
            dense: Vec::new(),
        }
    }

    fn dense_slot(&self, entity: Entity) -> Option<usize> {
        let slot = *self.sparse.get(entity.index as usize)?;
        if slot == INVALID_DENSE {
            return None;
        }
        let slot = slot as usize;
        // Index AND generation must match, or the handle is stale.
        if self.entities[slot] != entity {
            return None;
        }
        Some(slot)
    }

    /// Whether this entity holds a component, generation-checked.
    pub fn contains(&self, entity: Entity) -> bool {
        self.dense_slot(entity).is_some()
    }

    /// Insert or replace the component for an entity. Replacement happens in
    /// place, keeping the same dense slot.
    pub fn insert(&mut self, entity: Entity, value: T) {
        let idx = entity.index as usize;
        debug_assert!(entity.index < MAX_ENTITIES);
        if idx >= self.sparse.len() {
            self.sparse.resize(idx + 1, INVALID_DENSE);
        }
        if let Some(slot) = self.dense_slot(entity) {
            self.dense[slot] = value;
        } else {
            let slot = self.dense.len() as u32;
            self.sparse[idx] = slot;
            self.entities.push(entity);
            self.dense.push(value);
        }
    }

    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.dense_slot(entity).map(|slot| &self.dense[slot])
    }

    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.dense_slot(entity).map(|slot| &mut self.dense[slot])
    }

    /// Remove the component for an entity. Returns `true` if it was present.
    ///
    /// Swap-remove: the last dense entry (entity and component together)
    /// moves into the vacated slot and its sparse mapping is fixed up.
    /// O(1), does not preserve dense order.
    pub fn remove(&mut self, entity: Entity) -> bool {
        let Some(slot) = self.dense_slot(entity) else {
            return false;
        };
        self.sparse[entity.index as usize] = INVALID_DENSE;

        let last = self.dense.len() - 1;
        if slot != last {
            self.entities.swap(slot, last);
            self.dense.swap(slot, last);
            let moved = self.entities[slot];
            self.sparse[moved.index as usize] = slot as u32;
        }
        self.entities.pop();
        self.dense.pop();
        true
    }

    /// Iterate over all (entity, &component) pairs in dense order.
    #[allow(dead_code)]
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.entities.iter().copied().zip(self.dense.iter())
    }

    /// The dense array of all handles holding this component.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Number of components stored.
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }
}

impl<T: Component> ComponentStorage for SparseSet<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn remove_entity(&mut self, entity: Entity) -> bool {
        self.remove(entity)
    }

    fn contains_entity(&self, entity: Entity) -> bool {
        self.contains(entity)
    }

    fn dense_entities(&self) -> &[Entity] {
        self.entities()
    }

    fn len(&self) -> usize {
        self.len()
    }

    fn clear(&mut self) {
        self.sparse.clear();
        self.entities.clear();
        self.dense.clear();
    }
}

#![allow(private_interfaces)]

use std::any::TypeId;
use std::collections::HashMap;

use crate::component::{ComponentStorage, SparseSet};
use crate::entity::Entity;

/// Trait implemented for query parameter types (`&T`, `&mut T`, `Option<&T>`)
/// and tuples of them.
///
/// # Safety
/// Implementors must correctly report the component TypeIds they access.
pub unsafe trait WorldQuery {
    type Item<'w>;

    /// The TypeIds of components this query requires on the entity. Optional
    /// parameters report nothing here.
    fn required_type_ids() -> Vec<TypeId>;

    /// Fetch the item for a candidate entity from the storages map. Lookups
    /// are generation-checked, so a stale handle yields `None`.
    ///
    /// # Safety
    /// The caller must uphold the aliasing rules for `&` vs `&mut`: each
    /// entity is fetched at most once per iteration, and the same component
    /// type must not appear twice in one query.
    unsafe fn fetch<'w>(
        storages: &'w HashMap<TypeId, Box<dyn ComponentStorage>>,
        entity: Entity,
    ) -> Option<Self::Item<'w>>;
}

unsafe impl<T: 'static + Send + Sync> WorldQuery for &T {
    type Item<'w> = &'w T;

    fn required_type_ids() -> Vec<TypeId> {
        vec![TypeId::of::<T>()]
    }

    unsafe fn fetch<'w>(
        storages: &'w HashMap<TypeId, Box<dyn ComponentStorage>>,
        entity: Entity,
    ) -> Option<Self::Item<'w>> {
        let storage = storages.get(&TypeId::of::<T>())?;
        let set = storage.as_any().downcast_ref::<SparseSet<T>>()?;
        set.get(entity)
    }
}

unsafe impl<T: 'static + Send + Sync> WorldQuery for &mut T {
    type Item<'w> = &'w mut T;

    fn required_type_ids() -> Vec<TypeId> {
        vec![TypeId::of::<T>()]
    }

    unsafe fn fetch<'w>(
        storages: &'w HashMap<TypeId, Box<dyn ComponentStorage>>,
        entity: Entity,
    ) -> Option<Self::Item<'w>> {
        let storage = storages.get(&TypeId::of::<T>())?;
        // Mutable access through the shared map; the caller guarantees each
        // entity appears once and component types are not duplicated.
        let storage_ptr =
            storage.as_ref() as *const dyn ComponentStorage as *mut dyn ComponentStorage;
        let set = (*storage_ptr).as_any_mut().downcast_mut::<SparseSet<T>>()?;
        set.get_mut(entity)
    }
}

unsafe impl<T: 'static + Send + Sync> WorldQuery for Option<&T> {
    type Item<'w> = Option<&'w T>;

    fn required_type_ids() -> Vec<TypeId> {
        vec![]
    }

    unsafe fn fetch<'w>(
        storages: &'w HashMap<TypeId, Box<dyn ComponentStorage>>,
        entity: Entity,
    ) -> Option<Self::Item<'w>> {
        let value = storages
            .get(&TypeId::of::<T>())
            .and_then(|s| s.as_any().downcast_ref::<SparseSet<T>>())
            .and_then(|set| set.get(entity));
        Some(value)
    }
}

macro_rules! impl_world_query_tuple {
    ($($name:ident),+) => {
        #[allow(non_snake_case)]
        unsafe impl<$($name: WorldQuery),+> WorldQuery for ($($name,)+) {
            type Item<'w> = ($($name::Item<'w>,)+);

            fn required_type_ids() -> Vec<TypeId> {
                let mut ids = Vec::new();
                $(ids.extend($name::required_type_ids());)+
                ids
            }

            unsafe fn fetch<'w>(
                storages: &'w HashMap<TypeId, Box<dyn ComponentStorage>>,
                entity: Entity,
            ) -> Option<Self::Item<'w>> {
                Some(($($name::fetch(storages, entity)?,)+))
            }
        }
    };
}

impl_world_query_tuple!(A);
impl_world_query_tuple!(A, B);
impl_world_query_tuple!(A, B, C);
impl_world_query_tuple!(A, B, C, D);
impl_world_query_tuple!(A, B, C, D, E);
impl_world_query_tuple!(A, B, C, D, E, F);
impl_world_query_tuple!(A, B, C, D, E, F, G);
impl_world_query_tuple!(A, B, C, D, E, F, G, H);

/// Iterator returned by `World::query`. Yields `(Entity, Q::Item)` for each
/// matching entity.
///
/// Candidates come from the driver pool: the smallest required pool at query
/// construction time, walked in its dense order. Each candidate is then
/// re-checked for membership in every other required pool via `fetch`; a
/// miss skips the entity. A query over a never-created pool is valid and
/// empty.
pub struct QueryIter<'w, Q: WorldQuery> {
    pub(crate) storages: &'w HashMap<TypeId, Box<dyn ComponentStorage>>,
    pub(crate) candidates: Vec<Entity>,
    pub(crate) position: usize,
    pub(crate) _marker: std::marker::PhantomData<Q>,
}

impl<'w, Q: WorldQuery> Iterator for QueryIter<'w, Q> {
    type Item = (Entity, Q::Item<'w>);

    fn next(&mut self) -> Option<Self::Item> {
        while self.position < self.candidates.len() {
            let entity = self.candidates[self.position];
            self.position += 1;

            // Safety: each candidate is visited at most once.
            if let Some(item) = unsafe { Q::fetch(self.storages, entity) } {
                return Some((entity, item));
            }
        }
        None
    }
}

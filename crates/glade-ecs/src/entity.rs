use std::fmt;

/// Hard cap on the entity index space. A bug that leaks entities will hit
/// this long before it silently eats gigabytes of sparse arrays.
pub const MAX_ENTITIES: u32 = 1 << 20;

/// A generational entity handle. Compact u32 index + generation; the
/// generation invalidates old handles once a slot is reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl Entity {
    /// Reserved index meaning "no entity".
    pub const INVALID_INDEX: u32 = u32::MAX;

    /// Create an entity from raw parts (mainly for testing).
    pub fn from_raw(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// The handle that refers to no entity.
    pub fn invalid() -> Self {
        Self {
            index: Self::INVALID_INDEX,
            generation: 0,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.index != Self::INVALID_INDEX
    }

    /// The slot index of this entity.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// The generation of this entity (incremented on reuse).
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Allocates and recycles entity slots with generational tracking.
///
/// This is the sole authority on handle liveness: a handle is alive iff its
/// index is in range, the slot is marked alive, and the slot's generation
/// matches the handle's.
pub struct EntityAllocator {
    generations: Vec<u32>,
    alive: Vec<bool>,
    free_list: Vec<u32>,
    len: usize,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self {
            generations: Vec::new(),
            alive: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        }
    }

    /// Allocate a new entity, reusing a freed slot if available. The handle
    /// carries the slot's current generation.
    ///
    /// # Panics
    /// If the index space would exceed [`MAX_ENTITIES`]. That is a fatal
    /// configuration error, not something callers are expected to recover
    /// from.
    pub fn allocate(&mut self) -> Entity {
        self.len += 1;
        if let Some(index) = self.free_list.pop() {
            self.alive[index as usize] = true;
            Entity {
                index,
                generation: self.generations[index as usize],
            }
        } else {
            let index = self.generations.len() as u32;
            assert!(
                index < MAX_ENTITIES,
                "entity index space exhausted ({MAX_ENTITIES} slots)"
            );
            self.generations.push(0);
            self.alive.push(true);
            Entity {
                index,
                generation: 0,
            }
        }
    }

    /// Deallocate an entity. Returns `true` if it was alive. The slot's
    /// generation is bumped so every outstanding handle to it goes stale.
    pub fn deallocate(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        let idx = entity.index as usize;
        self.alive[idx] = false;
        self.generations[idx] += 1;
        self.free_list.push(entity.index);
        self.len -= 1;
        true
    }

    /// Check if an entity is currently alive (index + generation).
    pub fn is_alive(&self, entity: Entity) -> bool {
        if !entity.is_valid() {
            return false;
        }
        let idx = entity.index as usize;
        idx < self.alive.len() && self.alive[idx] && self.generations[idx] == entity.generation
    }

    /// Number of currently alive entities.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate all currently alive handles, in slot order.
    pub(crate) fn alive_handles(&self) -> impl Iterator<Item = Entity> + '_ {
        self.generations
            .iter()
            .zip(self.alive.iter())
            .enumerate()
            .filter(|(_, (_, &alive))| alive)
            .map(|(index, (&generation, _))| Entity {
                index: index as u32,
                generation,
            })
    }

    /// Forget all entities and recycled slots.
    pub fn clear(&mut self) {
        self.generations.clear();
        self.alive.clear();
        self.free_list.clear();
        self.len = 0;
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

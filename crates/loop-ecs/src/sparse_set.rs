//! Per-component-type sparse-set storage.
//!
//! A [`SparseSet`] keeps two views of the same data:
//!
//! - a *sparse* array indexed by [`Entity`] that yields the dense slot holding
//!   that entity's value (or `None`),
//! - a *dense* pair of parallel vectors (`entities`, `values`) with no gaps.
//!
//! Insert, lookup and removal are all O(1). Removal swaps the last dense
//! element into the vacated slot, so dense order is insertion order only until
//! the first removal.
//!
//! # Slot invalidation
//!
//! A dense slot index obtained from [`SparseSet::slot`] is only meaningful
//! until the next [`insert`](SparseSet::insert) or
//! [`remove`](SparseSet::remove) on the same set. Removal relocates the last
//! element and insertion may reallocate. References are protected by the
//! borrow checker; slot indices are not, so re-resolve them through the
//! entity after any structural change.
//!
//! # Memory
//!
//! The sparse array is sized by the highest entity index ever inserted, at
//! four bytes per index. Inserting an entity built with a very large
//! [`Entity::from_index`] grows it accordingly.

use std::num::NonZeroU32;

use crate::entity::Entity;

/// Dense, swap-remove storage for one component type.
#[derive(Debug, Clone)]
pub struct SparseSet<T> {
    /// Entity index -> dense slot + 1.
    sparse: Vec<Option<NonZeroU32>>,
    /// Dense slot -> owning entity. Parallel to `values`.
    entities: Vec<Entity>,
    /// Dense slot -> component value.
    values: Vec<T>,
}

impl<T> SparseSet<T> {
    /// Create an empty set.
    pub fn new() -> Self {
        Self {
            sparse: Vec::new(),
            entities: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Create an empty set whose sparse array already covers ids
    /// `[0, capacity)` and whose dense arrays can hold `capacity` values.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sparse: vec![None; capacity],
            entities: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        }
    }

    /// Attach `value` to `entity`, returning the stored value.
    ///
    /// If `entity` already holds a value, it is kept untouched (same slot,
    /// same contents) and `value` is dropped. This makes repeated attaches
    /// idempotent.
    pub fn insert(&mut self, entity: Entity, value: T) -> &mut T {
        self.insert_with(entity, || value)
    }

    /// Like [`insert`](Self::insert) but only builds the value when the
    /// entity does not already hold one.
    pub fn insert_with(&mut self, entity: Entity, make: impl FnOnce() -> T) -> &mut T {
        let key = entity.slot_key();
        if key >= self.sparse.len() {
            self.sparse.resize(key + 1, None);
        }
        let slot = match self.sparse[key] {
            Some(packed) => unpack(packed),
            None => {
                let slot = self.values.len();
                self.entities.push(entity);
                self.values.push(make());
                self.sparse[key] = Some(pack(slot));
                slot
            }
        };
        &mut self.values[slot]
    }

    /// The dense slot currently holding `entity`'s value.
    ///
    /// See the module docs: this index goes stale after any structural change.
    #[inline]
    pub fn slot(&self, entity: Entity) -> Option<usize> {
        self.sparse.get(entity.slot_key()).copied().flatten().map(unpack)
    }

    /// Whether `entity` holds a value in this set.
    #[inline]
    pub fn contains(&self, entity: Entity) -> bool {
        self.slot(entity).is_some()
    }

    /// Shared reference to `entity`'s value.
    #[inline]
    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.slot(entity).map(|slot| &self.values[slot])
    }

    /// Mutable reference to `entity`'s value, for in-place mutation.
    #[inline]
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        let slot = self.slot(entity)?;
        Some(&mut self.values[slot])
    }

    /// A copy of `entity`'s value.
    pub fn get_cloned(&self, entity: Entity) -> Option<T>
    where
        T: Clone,
    {
        self.get(entity).cloned()
    }

    /// Detach and return `entity`'s value. No-op if absent.
    ///
    /// The last dense element is moved into the vacated slot and its sparse
    /// entry is patched, keeping the dense arrays contiguous.
    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        let slot = unpack(self.sparse.get_mut(entity.slot_key())?.take()?);
        let last = self.values.len() - 1;
        if slot != last {
            let moved = self.entities[last];
            self.sparse[moved.slot_key()] = Some(pack(slot));
        }
        self.entities.swap_remove(slot);
        Some(self.values.swap_remove(slot))
    }

    /// Remove every value. Sparse capacity is kept.
    pub fn clear(&mut self) {
        for entity in self.entities.drain(..) {
            self.sparse[entity.slot_key()] = None;
        }
        self.values.clear();
    }

    /// Number of entities holding a value.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no entity holds a value.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Owning entities in dense order.
    #[inline]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Values in dense order.
    #[inline]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Values in dense order, mutably.
    #[inline]
    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.values
    }

    /// `(entity, &value)` pairs in dense order.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.entities.iter().copied().zip(self.values.iter())
    }

    /// `(entity, &mut value)` pairs in dense order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        self.entities.iter().copied().zip(self.values.iter_mut())
    }
}

/// Sparse entries store `slot + 1` so that `None` fits in the niche.
#[inline]
fn pack(slot: usize) -> NonZeroU32 {
    u32::try_from(slot + 1)
        .ok()
        .and_then(NonZeroU32::new)
        .expect("sparse set holds more than u32::MAX values")
}

#[inline]
fn unpack(packed: NonZeroU32) -> usize {
    packed.get() as usize - 1
}

impl<T> Default for SparseSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Component pool: one type-erased [`SparseSet`] per registered component type.
//!
//! The pool is keyed by Rust [`TypeId`]. Each entry is a boxed
//! [`ErasedSparseSet`] that can be recovered to its concrete `SparseSet<T>`
//! through a checked `Any` downcast. A failed downcast would mean the map
//! holds a set under the wrong key, which is an internal invariant violation
//! and panics.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;

use tracing::{debug, warn};

use crate::entity::Entity;
use crate::sparse_set::SparseSet;
use crate::EcsError;

// ---------------------------------------------------------------------------
// ErasedSparseSet
// ---------------------------------------------------------------------------

/// Object-safe view of a `SparseSet<T>` with `T` erased.
///
/// Only the operations that do not mention `T` are available here; anything
/// else goes through [`as_any`](Self::as_any) and a downcast.
pub trait ErasedSparseSet: Any {
    /// Upcast for downcasting to the concrete set.
    fn as_any(&self) -> &dyn Any;
    /// Mutable upcast for downcasting to the concrete set.
    fn as_any_mut(&mut self) -> &mut dyn Any;
    /// Drop `entity`'s value if it has one. Returns whether a value was removed.
    fn remove_entity(&mut self, entity: Entity) -> bool;
    /// Whether `entity` holds a value.
    fn contains_entity(&self, entity: Entity) -> bool;
    /// Number of stored values.
    fn len(&self) -> usize;
    /// Whether the set is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Rust type name of the stored component.
    fn component_name(&self) -> &'static str;
}

impl<T: 'static> ErasedSparseSet for SparseSet<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn remove_entity(&mut self, entity: Entity) -> bool {
        self.remove(entity).is_some()
    }

    fn contains_entity(&self, entity: Entity) -> bool {
        self.contains(entity)
    }

    fn len(&self) -> usize {
        SparseSet::len(self)
    }

    fn component_name(&self) -> &'static str {
        type_name::<T>()
    }
}

// ---------------------------------------------------------------------------
// ComponentPool
// ---------------------------------------------------------------------------

/// Registry mapping component types to their storage.
///
/// At most one set exists per Rust type. Registering a type twice is ignored:
/// the existing set and its data are kept.
#[derive(Default)]
pub struct ComponentPool {
    sets: HashMap<TypeId, Box<dyn ErasedSparseSet>>,
    /// Sparse capacity pre-allocated for every newly registered set.
    initial_capacity: usize,
}

impl std::fmt::Debug for ComponentPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentPool")
            .field("registered", &self.registered_names())
            .finish()
    }
}

impl ComponentPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty pool whose sets start with room for `capacity` entities.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sets: HashMap::new(),
            initial_capacity: capacity,
        }
    }

    /// Install an empty `SparseSet<T>`.
    ///
    /// Returns `true` if the type was newly registered, `false` if it was
    /// already present (in which case nothing changes).
    pub fn register<T: 'static>(&mut self) -> bool {
        let key = TypeId::of::<T>();
        if self.sets.contains_key(&key) {
            warn!(
                component = type_name::<T>(),
                "component type registered twice; keeping existing storage"
            );
            return false;
        }
        debug!(component = type_name::<T>(), "registering component type");
        self.sets.insert(
            key,
            Box::new(SparseSet::<T>::with_capacity(self.initial_capacity)),
        );
        true
    }

    /// Whether `T` has been registered.
    pub fn is_registered<T: 'static>(&self) -> bool {
        self.sets.contains_key(&TypeId::of::<T>())
    }

    /// The storage for `T`, or [`EcsError::UnregisteredComponent`].
    pub fn try_set<T: 'static>(&self) -> Result<&SparseSet<T>, EcsError> {
        let erased = self
            .sets
            .get(&TypeId::of::<T>())
            .ok_or_else(unregistered::<T>)?;
        Ok(downcast_ref(&**erased))
    }

    /// Mutable storage for `T`, or [`EcsError::UnregisteredComponent`].
    pub fn try_set_mut<T: 'static>(&mut self) -> Result<&mut SparseSet<T>, EcsError> {
        let erased = self
            .sets
            .get_mut(&TypeId::of::<T>())
            .ok_or_else(unregistered::<T>)?;
        Ok(downcast_mut(&mut **erased))
    }

    /// The storage for `T`.
    ///
    /// # Panics
    ///
    /// Panics if `T` was never registered. That is a missing initialisation
    /// step, not a runtime condition.
    #[track_caller]
    pub fn set<T: 'static>(&self) -> &SparseSet<T> {
        match self.try_set::<T>() {
            Ok(set) => set,
            Err(err) => panic!("{err}"),
        }
    }

    /// Mutable storage for `T`.
    ///
    /// # Panics
    ///
    /// Panics if `T` was never registered.
    #[track_caller]
    pub fn set_mut<T: 'static>(&mut self) -> &mut SparseSet<T> {
        match self.try_set_mut::<T>() {
            Ok(set) => set,
            Err(err) => panic!("{err}"),
        }
    }

    /// Mutable storage for `T`, registering it first if needed.
    pub fn set_mut_or_register<T: 'static>(&mut self) -> &mut SparseSet<T> {
        let capacity = self.initial_capacity;
        let erased = self.sets.entry(TypeId::of::<T>()).or_insert_with(|| {
            debug!(component = type_name::<T>(), "auto-registering component type");
            Box::new(SparseSet::<T>::with_capacity(capacity))
        });
        downcast_mut(&mut **erased)
    }

    /// Remove `entity` from every set. Returns how many values were dropped.
    pub fn remove_entity(&mut self, entity: Entity) -> usize {
        self.sets
            .values_mut()
            .map(|set| usize::from(set.remove_entity(entity)))
            .sum()
    }

    /// Names of the component types `entity` currently holds, sorted.
    pub fn components_of(&self, entity: Entity) -> Vec<&'static str> {
        let mut names: Vec<_> = self
            .sets
            .values()
            .filter(|set| set.contains_entity(entity))
            .map(|set| set.component_name())
            .collect();
        names.sort_unstable();
        names
    }

    /// Number of registered component types.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Whether no component types have been registered.
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Type names of all registered components, sorted.
    pub fn registered_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.sets.values().map(|set| set.component_name()).collect();
        names.sort_unstable();
        names
    }
}

fn unregistered<T>() -> EcsError {
    EcsError::UnregisteredComponent {
        name: type_name::<T>(),
    }
}

#[track_caller]
fn downcast_ref<T: 'static>(erased: &dyn ErasedSparseSet) -> &SparseSet<T> {
    match erased.as_any().downcast_ref::<SparseSet<T>>() {
        Some(set) => set,
        None => panic!(
            "component pool corrupted: storage for {} holds {}",
            type_name::<T>(),
            erased.component_name()
        ),
    }
}

#[track_caller]
fn downcast_mut<T: 'static>(erased: &mut dyn ErasedSparseSet) -> &mut SparseSet<T> {
    let found = erased.component_name();
    match erased.as_any_mut().downcast_mut::<SparseSet<T>>() {
        Some(set) => set,
        None => panic!(
            "component pool corrupted: storage for {} holds {found}",
            type_name::<T>()
        ),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

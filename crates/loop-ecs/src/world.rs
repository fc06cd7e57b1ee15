//! The [`World`] is the top-level container for the ECS. It owns the entity
//! allocator and the component pool, and is passed explicitly to every system
//! and collaborator that needs it.

use std::any::type_name;

use tracing::debug;

use crate::entity::{Entity, EntityAllocator};
use crate::pool::ComponentPool;
use crate::sparse_set::SparseSet;
use crate::EcsError;

// ---------------------------------------------------------------------------
// WorldConfig
// ---------------------------------------------------------------------------

/// Construction-time settings for a [`World`].
#[derive(Debug, Clone)]
pub struct WorldConfig {
    /// Number of entity ids to reserve room for in the allocator and in every
    /// component set created afterwards.
    pub initial_capacity: usize,
    /// Register component types on first use instead of panicking.
    ///
    /// When set, attaching a component of an unregistered type creates its
    /// set, and read-only accessors treat an unregistered type as one that no
    /// entity holds.
    pub auto_register: bool,
}

impl Default for WorldConfig {
    /// Room for 256 entities, strict registration.
    fn default() -> Self {
        Self {
            initial_capacity: 256,
            auto_register: false,
        }
    }
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// The top-level ECS container.
///
/// Component access comes in two strengths:
///
/// - Using a component type that was never registered is a setup bug and
///   panics (unless [`WorldConfig::auto_register`] is on).
/// - Asking a dead entity, or one lacking the component, for its value
///   returns [`EcsError::MissingComponent`]. Systems are expected to have
///   filtered with a query or [`has_component`](Self::has_component) first.
pub struct World {
    pub(crate) allocator: EntityAllocator,
    pub(crate) pool: ComponentPool,
    config: WorldConfig,
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("size", &self.allocator.size())
            .field("alive", &self.allocator.alive_count())
            .field("component_types", &self.pool.len())
            .finish()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Create a new, empty world with the default configuration.
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Create a new, empty world.
    pub fn with_config(config: WorldConfig) -> Self {
        Self {
            allocator: EntityAllocator::with_capacity(config.initial_capacity),
            pool: ComponentPool::with_capacity(config.initial_capacity),
            config,
        }
    }

    /// The configuration this world was created with.
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Read-only access to the component pool.
    pub fn pool(&self) -> &ComponentPool {
        &self.pool
    }

    // -- entity lifecycle ---------------------------------------------------

    /// Allocate the next unused entity id and mark it alive.
    pub fn new_entity(&mut self) -> Entity {
        self.allocator.allocate()
    }

    /// Whether `entity` was allocated and has not been killed or despawned.
    pub fn is_entity_alive(&self, entity: Entity) -> bool {
        self.allocator.is_alive(entity)
    }

    /// Size of the id space: every entity id is below this value.
    pub fn size(&self) -> usize {
        self.allocator.size()
    }

    /// Number of alive entities.
    pub fn alive_count(&self) -> usize {
        self.allocator.alive_count()
    }

    /// Alive entities in ascending id order.
    pub fn alive_entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.allocator.iter_alive()
    }

    /// Exclude `entity` from liveness while leaving its components in place.
    ///
    /// Queries stop returning it immediately. Returns `false` if it was not
    /// alive.
    pub fn kill_entity(&mut self, entity: Entity) -> bool {
        self.allocator.kill(entity)
    }

    /// Remove all of `entity`'s components and exclude it from liveness.
    ///
    /// The id is not handed out again. Returns the number of components
    /// dropped.
    pub fn despawn(&mut self, entity: Entity) -> Result<usize, EcsError> {
        if !self.allocator.kill(entity) {
            return Err(EcsError::DeadEntity { entity });
        }
        let removed = self.pool.remove_entity(entity);
        debug!(%entity, removed, "despawned entity");
        Ok(removed)
    }

    /// Type names of the components `entity` holds, sorted. Meant for
    /// diagnostics.
    pub fn components_of(&self, entity: Entity) -> Vec<&'static str> {
        self.pool.components_of(entity)
    }

    // -- registration -------------------------------------------------------

    /// Create an empty component set for `T`.
    ///
    /// Registering the same type again is ignored and returns `false`; the
    /// existing set keeps its data.
    pub fn register_component<T: 'static>(&mut self) -> bool {
        self.pool.register::<T>()
    }

    /// Whether `T` has a component set.
    pub fn is_registered<T: 'static>(&self) -> bool {
        self.pool.is_registered::<T>()
    }

    // -- component sets -----------------------------------------------------

    /// The component set for `T`.
    ///
    /// # Panics
    ///
    /// Panics if `T` was never registered, regardless of
    /// [`WorldConfig::auto_register`].
    #[track_caller]
    pub fn component_set<T: 'static>(&self) -> &SparseSet<T> {
        self.pool.set::<T>()
    }

    /// The component set for `T`, mutably.
    ///
    /// # Panics
    ///
    /// Panics if `T` was never registered and auto-registration is off.
    #[track_caller]
    pub fn component_set_mut<T: 'static>(&mut self) -> &mut SparseSet<T> {
        if self.config.auto_register {
            self.pool.set_mut_or_register::<T>()
        } else {
            self.pool.set_mut::<T>()
        }
    }

    /// The component set for `T`, or [`EcsError::UnregisteredComponent`].
    pub fn try_component_set<T: 'static>(&self) -> Result<&SparseSet<T>, EcsError> {
        self.pool.try_set::<T>()
    }

    /// The component set for `T` mutably, or
    /// [`EcsError::UnregisteredComponent`].
    pub fn try_component_set_mut<T: 'static>(&mut self) -> Result<&mut SparseSet<T>, EcsError> {
        self.pool.try_set_mut::<T>()
    }

    /// Resolve `T`'s set for reading. `None` only under auto-registration.
    #[track_caller]
    pub(crate) fn read_set<T: 'static>(&self) -> Option<&SparseSet<T>> {
        match self.pool.try_set::<T>() {
            Ok(set) => Some(set),
            Err(_) if self.config.auto_register => None,
            Err(err) => panic!("{err}"),
        }
    }

    /// Resolve `T`'s set for in-place mutation without creating it.
    #[track_caller]
    pub(crate) fn write_set<T: 'static>(&mut self) -> Option<&mut SparseSet<T>> {
        let auto_register = self.config.auto_register;
        match self.pool.try_set_mut::<T>() {
            Ok(set) => Some(set),
            Err(_) if auto_register => None,
            Err(err) => panic!("{err}"),
        }
    }

    // -- component access ---------------------------------------------------

    /// Whether `entity` holds a `T`. Liveness is not consulted.
    #[track_caller]
    pub fn has_component<T: 'static>(&self, entity: Entity) -> bool {
        self.read_set::<T>()
            .is_some_and(|set| set.contains(entity))
    }

    /// Attach a default-valued `T` to `entity` if it has none, and return the
    /// stored value for initialisation.
    ///
    /// Calling this on an entity that already holds a `T` returns the existing
    /// value untouched.
    #[track_caller]
    pub fn add_component<T: Default + 'static>(&mut self, entity: Entity) -> &mut T {
        self.component_set_mut::<T>().insert_with(entity, T::default)
    }

    /// Attach `value` to `entity` if it has no `T` yet, and return the stored
    /// value. An existing value is kept and `value` is dropped.
    #[track_caller]
    pub fn insert_component<T: 'static>(&mut self, entity: Entity, value: T) -> &mut T {
        self.component_set_mut::<T>().insert(entity, value)
    }

    /// Detach `entity`'s `T`, returning it. No-op if it has none.
    #[track_caller]
    pub fn remove_component<T: 'static>(&mut self, entity: Entity) -> Option<T> {
        self.write_set::<T>()?.remove(entity)
    }

    /// Shared reference to `entity`'s `T`.
    ///
    /// Fails with [`EcsError::MissingComponent`] if the entity is not alive
    /// or has no `T`.
    #[track_caller]
    pub fn get_component<T: 'static>(&self, entity: Entity) -> Result<&T, EcsError> {
        let alive = self.allocator.is_alive(entity);
        self.read_set::<T>()
            .filter(|_| alive)
            .and_then(|set| set.get(entity))
            .ok_or_else(|| missing::<T>(entity))
    }

    /// Mutable reference to `entity`'s `T`, for in-place updates.
    ///
    /// Fails with [`EcsError::MissingComponent`] if the entity is not alive
    /// or has no `T`.
    #[track_caller]
    pub fn get_component_mut<T: 'static>(&mut self, entity: Entity) -> Result<&mut T, EcsError> {
        if !self.allocator.is_alive(entity) {
            return Err(missing::<T>(entity));
        }
        self.write_set::<T>()
            .and_then(|set| set.get_mut(entity))
            .ok_or_else(|| missing::<T>(entity))
    }
}

fn missing<T>(entity: Entity) -> EcsError {
    EcsError::MissingComponent {
        entity,
        name: type_name::<T>(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

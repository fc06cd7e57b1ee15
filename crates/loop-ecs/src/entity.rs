//! Entity identifiers and liveness bookkeeping.
//!
//! An [`Entity`] is nothing more than a dense `u32` index. The core never
//! recycles ids: the id space only grows, and "alive" is a property tracked by
//! the [`EntityAllocator`] rather than by the entity itself.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A dense entity identifier in the range `[0, World::size())`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entity(u32);

impl Entity {
    /// Construct an `Entity` from its raw index.
    ///
    /// Attaching a component to the result sizes that component's sparse
    /// array to `index + 1` entries (four bytes each), so prefer ids handed
    /// out by [`World::new_entity`](crate::world::World::new_entity).
    #[inline]
    pub fn from_index(index: u32) -> Self {
        Self(index)
    }

    /// The raw index.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }

    /// The index widened to `usize`, for addressing sparse arrays.
    #[inline]
    pub(crate) fn slot_key(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<Entity> for u32 {
    fn from(entity: Entity) -> Self {
        entity.0
    }
}

// ---------------------------------------------------------------------------
// EntityAllocator
// ---------------------------------------------------------------------------

/// Hands out monotonically increasing [`Entity`] ids and answers liveness.
///
/// `size` is the length of the id space handed out so far; every id below it
/// has been allocated at some point, alive or not.
#[derive(Debug, Default)]
pub struct EntityAllocator {
    /// Alive flag per allocated index. `alive.len()` is the id space size.
    alive: Vec<bool>,
    /// Cached number of `true` entries in `alive`.
    alive_count: usize,
}

impl EntityAllocator {
    /// Create a new, empty allocator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an allocator with room for `capacity` ids before reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            alive: Vec::with_capacity(capacity),
            alive_count: 0,
        }
    }

    /// Allocate the next unused id and mark it alive.
    ///
    /// # Panics
    ///
    /// Panics if the `u32` id space is exhausted.
    pub fn allocate(&mut self) -> Entity {
        let index = u32::try_from(self.alive.len()).expect("entity id space exhausted");
        self.alive.push(true);
        self.alive_count += 1;
        Entity(index)
    }

    /// Exclude `entity` from liveness. The id is never handed out again.
    ///
    /// Returns `true` if the entity was alive and is now dead, `false` if it
    /// was already dead or was never allocated.
    pub fn kill(&mut self, entity: Entity) -> bool {
        match self.alive.get_mut(entity.slot_key()) {
            Some(flag) if *flag => {
                *flag = false;
                self.alive_count -= 1;
                true
            }
            _ => false,
        }
    }

    /// Returns `true` if `entity` was allocated and has not been killed.
    #[inline]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.alive.get(entity.slot_key()).copied().unwrap_or(false)
    }

    /// Size of the id space: one past the highest id ever allocated.
    #[inline]
    pub fn size(&self) -> usize {
        self.alive.len()
    }

    /// Number of currently alive entities.
    #[inline]
    pub fn alive_count(&self) -> usize {
        self.alive_count
    }

    /// Iterate every alive entity in ascending id order.
    pub fn iter_alive(&self) -> impl Iterator<Item = Entity> + '_ {
        self.alive
            .iter()
            .enumerate()
            .filter(|(_, alive)| **alive)
            .map(|(index, _)| Entity(index as u32))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_is_monotonic() {
        let mut alloc = EntityAllocator::new();
        let ids: Vec<u32> = (0..100).map(|_| alloc.allocate().index()).collect();
        assert_eq!(ids, (0..100).collect::<Vec<_>>());
        assert_eq!(alloc.size(), 100);
    }

    #[test]
    fn killed_ids_are_not_reused() {
        let mut alloc = EntityAllocator::new();
        let e0 = alloc.allocate();
        assert!(alloc.kill(e0));
        let e1 = alloc.allocate();
        assert_ne!(e0, e1);
        assert_eq!(e1.index(), 1);
        assert!(!alloc.is_alive(e0));
        assert!(alloc.is_alive(e1));
    }

    #[test]
    fn double_kill_returns_false() {
        let mut alloc = EntityAllocator::new();
        let e = alloc.allocate();
        assert!(alloc.kill(e));
        assert!(!alloc.kill(e));
    }

    #[test]
    fn never_allocated_is_not_alive() {
        let mut alloc = EntityAllocator::new();
        let _ = alloc.allocate();
        assert!(!alloc.is_alive(Entity::from_index(7)));
        assert!(!alloc.kill(Entity::from_index(7)));
    }

    #[test]
    fn alive_count_tracks_correctly() {
        let mut alloc = EntityAllocator::new();
        let e0 = alloc.allocate();
        let _e1 = alloc.allocate();
        assert_eq!(alloc.alive_count(), 2);
        alloc.kill(e0);
        assert_eq!(alloc.alive_count(), 1);
        assert_eq!(alloc.size(), 2);
        assert_eq!(alloc.iter_alive().collect::<Vec<_>>(), vec![Entity(1)]);
    }

    #[test]
    fn entity_serializes_as_bare_index() {
        let json = serde_json::to_string(&Entity::from_index(42)).unwrap();
        assert_eq!(json, "42");
        let back: Entity = serde_json::from_str(&json).unwrap();
        assert_eq!(back.index(), 42);
    }
}

//! Loop ECS -- sparse-set Entity Component System for a 2D game loop.
//!
//! Every component type gets its own [`SparseSet`](sparse_set::SparseSet):
//! packed, swap-remove storage keyed by a dense integer [`Entity`](entity::Entity).
//! The [`World`](world::World) owns one set per registered type in a
//! type-erased [`ComponentPool`](pool::ComponentPool) and recovers the
//! concrete set at each access through a checked downcast. Queries walk the
//! id space in ascending order and keep alive entities that hold every
//! requested component.
//!
//! # Quick Start
//!
//! ```
//! use loop_ecs::prelude::*;
//!
//! #[derive(Debug, Default, Clone, PartialEq)]
//! struct Position { x: f32, y: f32 }
//!
//! #[derive(Debug, Default, Clone, PartialEq)]
//! struct Velocity { dx: f32, dy: f32 }
//!
//! let mut world = World::new();
//! world.register_component::<Position>();
//! world.register_component::<Velocity>();
//!
//! let e = world.new_entity();
//! world.add_component::<Position>(e).x = 4.0;
//! *world.add_component::<Velocity>(e) = Velocity { dx: 1.0, dy: 0.0 };
//!
//! for entity in get_entities2::<Position, Velocity>(&world) {
//!     let dx = world.get_component::<Velocity>(entity).unwrap().dx;
//!     world.get_component_mut::<Position>(entity).unwrap().x += dx;
//! }
//!
//! assert_eq!(world.get_component::<Position>(e).unwrap().x, 5.0);
//! ```
//!
//! # Borrowing and structural changes
//!
//! References handed out by the world borrow it, so the compiler rejects
//! holding one across an insert or removal on the same type:
//!
//! ```compile_fail
//! use loop_ecs::prelude::*;
//!
//! let mut world = World::new();
//! world.register_component::<u32>();
//! let a = world.new_entity();
//! let b = world.new_entity();
//! let first = world.add_component::<u32>(a);
//! world.remove_component::<u32>(b);
//! *first = 7;
//! ```

#![deny(unsafe_code)]

pub mod entity;
pub mod pool;
pub mod query;
pub mod sparse_set;
pub mod world;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by ECS operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EcsError {
    /// A component type was accessed before `register_component` was called
    /// for it.
    #[error("component type {name} not registered")]
    UnregisteredComponent {
        name: &'static str,
    },

    /// The entity is dead, or alive but does not hold the component.
    #[error("entity {entity} is either not alive or does not have component {name}")]
    MissingComponent {
        entity: entity::Entity,
        name: &'static str,
    },

    /// A structural operation targeted an entity that is not alive.
    #[error("entity {entity} is not alive")]
    DeadEntity {
        entity: entity::Entity,
    },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::entity::{Entity, EntityAllocator};
    pub use crate::pool::{ComponentPool, ErasedSparseSet};
    pub use crate::query::{get_entities, get_entities2, ComponentFilter};
    pub use crate::sparse_set::SparseSet;
    pub use crate::world::{World, WorldConfig};
    pub use crate::EcsError;
}

// ---------------------------------------------------------------------------
// Integration Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Position {
        x: f32,
        y: f32,
    }

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Velocity {
        dx: f32,
        dy: f32,
    }

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Health(u32);

    fn setup_world() -> World {
        let mut world = World::new();
        world.register_component::<Position>();
        world.register_component::<Velocity>();
        world.register_component::<Health>();
        world
    }

    #[test]
    fn movement_system_over_query() {
        let mut world = setup_world();
        let moving = world.new_entity();
        *world.add_component::<Position>(moving) = Position { x: 0.0, y: 0.0 };
        *world.add_component::<Velocity>(moving) = Velocity { dx: 1.0, dy: 2.0 };
        let still = world.new_entity();
        *world.add_component::<Position>(still) = Position { x: 9.0, y: 9.0 };

        for _ in 0..3 {
            for e in get_entities2::<Position, Velocity>(&world) {
                let vel = world.get_component::<Velocity>(e).unwrap().clone();
                let pos = world.get_component_mut::<Position>(e).unwrap();
                pos.x += vel.dx;
                pos.y += vel.dy;
            }
        }

        assert_eq!(
            world.get_component::<Position>(moving),
            Ok(&Position { x: 3.0, y: 6.0 })
        );
        assert_eq!(
            world.get_component::<Position>(still),
            Ok(&Position { x: 9.0, y: 9.0 })
        );
    }

    #[test]
    fn despawn_then_query_skips_entity() {
        let mut world = setup_world();
        let a = world.new_entity();
        let b = world.new_entity();
        world.add_component::<Health>(a).0 = 10;
        world.add_component::<Health>(b).0 = 20;

        world.despawn(a).unwrap();

        assert_eq!(get_entities::<Health>(&world), vec![b]);
        assert!(!world.has_component::<Health>(a));
        assert_eq!(world.component_set::<Health>().len(), 1);
        assert_eq!(world.get_component::<Health>(b), Ok(&Health(20)));
    }

    #[test]
    fn scale_10k_entities() {
        let mut world = setup_world();
        let entities: Vec<Entity> = (0..10_000)
            .map(|i| {
                let e = world.new_entity();
                *world.add_component::<Position>(e) = Position {
                    x: i as f32,
                    y: i as f32 * 2.0,
                };
                if i % 2 == 0 {
                    *world.add_component::<Velocity>(e) = Velocity { dx: 1.0, dy: -1.0 };
                }
                e
            })
            .collect();

        assert_eq!(get_entities::<Position>(&world).len(), 10_000);
        assert_eq!(get_entities2::<Position, Velocity>(&world).len(), 5_000);

        world.for_each_mut::<Velocity>(|_, vel| {
            vel.dx *= 2.0;
        });
        assert_eq!(world.get_component::<Velocity>(entities[0]).unwrap().dx, 2.0);

        for e in entities.iter().take(5_000) {
            world.despawn(*e).unwrap();
        }
        assert_eq!(get_entities::<Position>(&world).len(), 5_000);
        assert_eq!(get_entities2::<Position, Velocity>(&world).len(), 2_500);
        assert_eq!(world.alive_count(), 5_000);
        assert_eq!(world.size(), 10_000);
    }
}

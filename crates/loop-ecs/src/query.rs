//! Query operators: enumerate entities that hold every component in a set.
//!
//! All queries walk the id space `[0, World::size())` in ascending order and
//! keep an entity only if it is alive and present in each requested
//! component set. Results are therefore deterministic and replayable across
//! runs, independent of dense storage order.
//!
//! Queries return owned `Vec<Entity>` lists so the caller is free to mutate
//! the world while walking the result. Component values are then fetched
//! through [`World::get_component`] / [`World::get_component_mut`], which
//! re-resolve the dense slot on every access.

use crate::entity::Entity;
use crate::sparse_set::SparseSet;
use crate::world::World;

// ---------------------------------------------------------------------------
// ComponentFilter -- a conjunction of "has component" predicates
// ---------------------------------------------------------------------------

/// A tuple of component types that an entity must all hold: `(A,)`,
/// `(A, B)`, ... up to eight elements.
///
/// The component sets are resolved once per query, not once per entity.
pub trait ComponentFilter {
    /// Borrowed sets for each element of the tuple.
    type Sets<'w>;

    /// Look up every set. `None` means some type is unregistered under
    /// auto-registration, so nothing can match.
    ///
    /// # Panics
    ///
    /// Panics on an unregistered type when auto-registration is off.
    fn resolve(world: &World) -> Option<Self::Sets<'_>>;

    /// Whether `entity` is present in every set.
    fn contains(sets: &Self::Sets<'_>, entity: Entity) -> bool;
}

macro_rules! impl_component_filter {
    ($($name:ident),+) => {
        impl<$($name: 'static),+> ComponentFilter for ($($name,)+) {
            type Sets<'w> = ($(&'w SparseSet<$name>,)+);

            #[track_caller]
            fn resolve(world: &World) -> Option<Self::Sets<'_>> {
                Some(($(world.read_set::<$name>()?,)+))
            }

            #[allow(non_snake_case)]
            #[inline]
            fn contains(sets: &Self::Sets<'_>, entity: Entity) -> bool {
                let ($($name,)+) = sets;
                true $(&& $name.contains(entity))+
            }
        }
    };
}

impl_component_filter!(A);
impl_component_filter!(A, B);
impl_component_filter!(A, B, C);
impl_component_filter!(A, B, C, D);
impl_component_filter!(A, B, C, D, E);
impl_component_filter!(A, B, C, D, E, F);
impl_component_filter!(A, B, C, D, E, F, G);
impl_component_filter!(A, B, C, D, E, F, G, H);

// ---------------------------------------------------------------------------
// World query methods
// ---------------------------------------------------------------------------

impl World {
    /// Alive entities holding every component in `Q`, ascending by id.
    ///
    /// ```
    /// use loop_ecs::prelude::*;
    ///
    /// struct A;
    /// struct B;
    /// struct C;
    ///
    /// let mut world = World::new();
    /// world.register_component::<A>();
    /// world.register_component::<B>();
    /// world.register_component::<C>();
    ///
    /// let e = world.new_entity();
    /// world.insert_component(e, A);
    /// world.insert_component(e, B);
    ///
    /// assert_eq!(world.entities::<(A, B)>(), vec![e]);
    /// assert!(world.entities::<(A, B, C)>().is_empty());
    /// ```
    #[track_caller]
    pub fn entities<Q: ComponentFilter>(&self) -> Vec<Entity> {
        let Some(sets) = Q::resolve(self) else {
            return Vec::new();
        };
        self.allocator
            .iter_alive()
            .filter(|&entity| Q::contains(&sets, entity))
            .collect()
    }

    /// Call `f` on every alive entity's `T`, ascending by id.
    ///
    /// Does nothing if `T` is unregistered under auto-registration.
    #[track_caller]
    pub fn for_each_mut<T: 'static>(&mut self, mut f: impl FnMut(Entity, &mut T)) {
        let auto_register = self.config().auto_register;
        let set = match self.pool.try_set_mut::<T>() {
            Ok(set) => set,
            Err(_) if auto_register => return,
            Err(err) => panic!("{err}"),
        };
        for entity in self.allocator.iter_alive() {
            if let Some(value) = set.get_mut(entity) {
                f(entity, value);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Free-function operators
// ---------------------------------------------------------------------------

/// Alive entities holding an `A`, ascending by id.
///
/// # Panics
///
/// Panics if `A` is unregistered and auto-registration is off.
#[track_caller]
pub fn get_entities<A: 'static>(world: &World) -> Vec<Entity> {
    world.entities::<(A,)>()
}

/// Alive entities holding both an `A` and a `B`, ascending by id.
///
/// # Panics
///
/// Panics if either type is unregistered and auto-registration is off.
#[track_caller]
pub fn get_entities2<A: 'static, B: 'static>(world: &World) -> Vec<Entity> {
    world.entities::<(A, B)>()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::WorldConfig;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct A(u32);

    #[derive(Debug, Default, Clone, PartialEq)]
    struct B(u32);

    #[derive(Debug, Default, Clone, PartialEq)]
    struct C;

    fn indices(entities: &[Entity]) -> Vec<u32> {
        entities.iter().map(|e| e.index()).collect()
    }

    /// Ten entities; `A` on even ids, `B` on multiples of three.
    fn populated() -> World {
        let mut world = World::new();
        world.register_component::<A>();
        world.register_component::<B>();
        world.register_component::<C>();
        for i in 0..10 {
            let e = world.new_entity();
            if i % 2 == 0 {
                world.insert_component(e, A(i));
            }
            if i % 3 == 0 {
                world.insert_component(e, B(i));
            }
        }
        world
    }

    #[test]
    fn single_component_query() {
        let world = populated();
        assert_eq!(indices(&get_entities::<A>(&world)), vec![0, 2, 4, 6, 8]);
        assert_eq!(indices(&get_entities::<B>(&world)), vec![0, 3, 6, 9]);
        assert!(get_entities::<C>(&world).is_empty());
    }

    #[test]
    fn two_component_query() {
        let world = populated();
        assert_eq!(indices(&get_entities2::<A, B>(&world)), vec![0, 6]);
        assert_eq!(indices(&get_entities2::<B, A>(&world)), vec![0, 6]);
    }

    #[test]
    fn results_ascend_despite_insertion_order() {
        let mut world = World::new();
        world.register_component::<A>();
        let ids: Vec<Entity> = (0..5).map(|_| world.new_entity()).collect();
        for e in ids.iter().rev() {
            world.insert_component(*e, A(e.index()));
        }
        world.remove_component::<A>(ids[4]);

        assert_eq!(indices(&get_entities::<A>(&world)), vec![0, 1, 2, 3]);
    }

    #[test]
    fn killed_entities_never_returned() {
        let mut world = populated();
        assert!(world.kill_entity(Entity::from_index(6)));

        // Still holds both components.
        assert!(world.has_component::<A>(Entity::from_index(6)));
        assert!(world.has_component::<B>(Entity::from_index(6)));

        assert_eq!(indices(&get_entities2::<A, B>(&world)), vec![0]);
        assert_eq!(indices(&get_entities::<A>(&world)), vec![0, 2, 4, 8]);
        assert_eq!(indices(&world.entities::<(B,)>()), vec![0, 3, 9]);
    }

    #[test]
    fn n_ary_query() {
        let mut world = populated();
        world.insert_component(Entity::from_index(6), C);
        world.insert_component(Entity::from_index(4), C);
        assert_eq!(indices(&world.entities::<(A, B, C)>()), vec![6]);
        assert_eq!(indices(&world.entities::<(C, A)>()), vec![4, 6]);
    }

    #[test]
    fn for_each_mut_visits_alive_in_order() {
        let mut world = populated();
        world.kill_entity(Entity::from_index(2));

        let mut visited = Vec::new();
        world.for_each_mut::<A>(|e, a| {
            a.0 += 100;
            visited.push(e.index());
        });

        assert_eq!(visited, vec![0, 4, 6, 8]);
        assert_eq!(world.component_set::<A>().get(Entity::from_index(4)), Some(&A(104)));
        // Dead entity's value untouched.
        assert_eq!(world.component_set::<A>().get(Entity::from_index(2)), Some(&A(2)));
    }

    #[test]
    #[should_panic(expected = "not registered")]
    fn unregistered_query_panics() {
        let world = populated();
        get_entities::<String>(&world);
    }

    #[test]
    #[should_panic(expected = "not registered")]
    fn unregistered_for_each_panics() {
        let mut world = populated();
        world.for_each_mut::<String>(|_, _| {});
    }

    #[test]
    fn unregistered_query_is_empty_under_auto_register() {
        let mut world = World::with_config(WorldConfig {
            auto_register: true,
            ..Default::default()
        });
        let e = world.new_entity();
        world.insert_component(e, A(1));
        assert!(get_entities2::<A, String>(&world).is_empty());
        assert_eq!(get_entities::<A>(&world), vec![e]);

        let mut calls = 0;
        world.for_each_mut::<String>(|_, _| calls += 1);
        assert_eq!(calls, 0);
    }
}

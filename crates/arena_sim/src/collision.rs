//! Pairwise collision resolution.
//!
//! The [`CollisionManager`] keeps the registration order of every object
//! that carries a [`CollisionComponent`]. Each pass tests every pair
//! `(i, j)` with `i < j` once: first the group/mask filter in both
//! directions, then the closed-interval box overlap. Both objects of an
//! overlapping pair get `handle_collision`, the earlier-registered one
//! first. No contact state survives between passes.

use std::collections::HashMap;

use arena_component::{ComponentError, Entity, GameObject};
use tracing::trace;

use crate::components::collision::{CollisionComponent, hit_box};

#[derive(Debug, Default)]
pub struct CollisionManager {
    entries: Vec<Entity>,
}

impl CollisionManager {
    /// Manager with nothing registered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `object` if it has a collision component and is not
    /// registered yet. Returns `true` if it was added.
    pub fn register(&mut self, object: &GameObject) -> bool {
        let id = object.id();
        if !object.has::<CollisionComponent>() || self.entries.contains(&id) {
            return false;
        }
        self.entries.push(id);
        true
    }

    /// Forgets `id`. Returns `true` if it was registered.
    pub fn unregister(&mut self, id: Entity) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| *e != id);
        self.entries.len() != before
    }

    /// Forgets every registration.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// `true` if `id` takes part in collision passes.
    #[must_use]
    pub fn contains(&self, id: Entity) -> bool {
        self.entries.contains(&id)
    }

    /// Registered object count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Runs one all-pairs pass over `objects` and returns the number of
    /// contacts dispatched.
    ///
    /// Objects deactivated by an earlier contact take part in no further
    /// pairs of this pass.
    ///
    /// # Errors
    ///
    /// Stops at the first failing `handle_collision` hook.
    pub fn handle_collisions(&self, objects: &mut HashMap<Entity, GameObject>) -> Result<usize, ComponentError> {
        let mut contacts = 0;
        for (i, &a_id) in self.entries.iter().enumerate() {
            for &b_id in &self.entries[i + 1..] {
                if !Self::touching(objects, a_id, b_id) {
                    continue;
                }
                let (Some(mut a), Some(mut b)) = (objects.remove(&a_id), objects.remove(&b_id)) else {
                    continue;
                };
                trace!(a = %a_id, b = %b_id, a_label = a.label(), b_label = b.label(), "collision");
                let result = a.handle_collision(&mut b).and_then(|()| b.handle_collision(&mut a));
                objects.insert(a_id, a);
                objects.insert(b_id, b);
                result?;
                contacts += 1;
            }
        }
        Ok(contacts)
    }

    fn touching(objects: &HashMap<Entity, GameObject>, a_id: Entity, b_id: Entity) -> bool {
        let (Some(a), Some(b)) = (objects.get(&a_id), objects.get(&b_id)) else {
            return false;
        };
        if !a.is_active() || !b.is_active() {
            return false;
        }
        let (Some(ca), Some(cb)) = (a.get::<CollisionComponent>(), b.get::<CollisionComponent>()) else {
            return false;
        };
        if !ca.accepts(cb) {
            return false;
        }
        match (hit_box(a), hit_box(b)) {
            (Some(box_a), Some(box_b)) => box_a.overlaps(&box_b),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use arena_component::Component;
    use arena_math::{Transform2D, Vec2};

    use super::*;
    use crate::components::collision::CollisionGroup;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Probe(Log);

    impl Component for Probe {
        fn type_name() -> &'static str {
            "Probe"
        }

        fn handle_collision(&mut self, owner: &mut GameObject, other: &mut GameObject) -> Result<(), ComponentError> {
            self.0.borrow_mut().push(format!("{}<-{}", owner.label(), other.label()));
            Ok(())
        }
    }

    fn object(id: u64, label: &str, min: Vec2, max: Vec2, group: CollisionGroup, mask: CollisionGroup, log: &Log) -> GameObject {
        let mut obj = GameObject::new(label)
            .attach(Transform2D::new((min + max) / 2.0, max - min))
            .and_then(|o| o.attach(CollisionComponent::new(group, mask)))
            .and_then(|o| o.attach(Probe(log.clone())))
            .expect("distinct components");
        obj.bind(Entity::from_raw(id));
        obj
    }

    fn world(objects: Vec<GameObject>) -> (CollisionManager, HashMap<Entity, GameObject>) {
        let mut manager = CollisionManager::new();
        let mut map = HashMap::new();
        for obj in objects {
            manager.register(&obj);
            map.insert(obj.id(), obj);
        }
        (manager, map)
    }

    #[test]
    fn test_register_skips_duplicates_and_bare_objects() {
        let log = Log::default();
        let a = object(1, "a", Vec2::ZERO, Vec2::ONE, CollisionGroup::PLAYER, CollisionGroup::MONSTER, &log);
        let mut bare = GameObject::new("bg");
        bare.bind(Entity::from_raw(2));
        let mut manager = CollisionManager::new();
        assert!(manager.register(&a));
        assert!(!manager.register(&a));
        assert!(!manager.register(&bare));
        assert_eq!(manager.len(), 1);
        assert!(manager.unregister(a.id()));
        assert!(!manager.contains(a.id()));
        assert!(manager.is_empty());
    }

    #[test]
    fn test_monster_and_projectile_both_notified() {
        let log = Log::default();
        let (manager, mut map) = world(vec![
            object(
                1,
                "monster",
                Vec2::ZERO,
                Vec2::splat(10.0),
                CollisionGroup::MONSTER,
                CollisionGroup::PLAYER | CollisionGroup::PROJECTILE,
                &log,
            ),
            object(2, "fireball", Vec2::splat(5.0), Vec2::splat(15.0), CollisionGroup::PROJECTILE, CollisionGroup::MONSTER, &log),
        ]);
        assert_eq!(manager.handle_collisions(&mut map).expect("pass"), 1);
        assert_eq!(*log.borrow(), vec!["monster<-fireball", "fireball<-monster"]);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_one_sided_mask_filters_pair() {
        let log = Log::default();
        let (manager, mut map) = world(vec![
            object(1, "monster", Vec2::ZERO, Vec2::splat(10.0), CollisionGroup::MONSTER, CollisionGroup::PLAYER, &log),
            object(2, "fireball", Vec2::splat(5.0), Vec2::splat(15.0), CollisionGroup::PROJECTILE, CollisionGroup::MONSTER, &log),
        ]);
        assert_eq!(manager.handle_collisions(&mut map).expect("pass"), 0);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_touching_edges_collide() {
        let log = Log::default();
        let (manager, mut map) = world(vec![
            object(1, "player", Vec2::ZERO, Vec2::splat(10.0), CollisionGroup::PLAYER, CollisionGroup::MONSTER, &log),
            object(2, "slime", Vec2::new(10.0, 0.0), Vec2::new(20.0, 10.0), CollisionGroup::MONSTER, CollisionGroup::PLAYER, &log),
            object(3, "far", Vec2::new(10.5, 20.0), Vec2::new(20.0, 30.0), CollisionGroup::MONSTER, CollisionGroup::PLAYER, &log),
        ]);
        assert_eq!(manager.handle_collisions(&mut map).expect("pass"), 1);
        assert_eq!(*log.borrow(), vec!["player<-slime", "slime<-player"]);
    }

    #[test]
    fn test_deactivated_object_skips_remaining_pairs() {
        struct Pop;

        impl Component for Pop {
            fn type_name() -> &'static str {
                "Pop"
            }

            fn handle_collision(&mut self, owner: &mut GameObject, _other: &mut GameObject) -> Result<(), ComponentError> {
                owner.despawn();
                Ok(())
            }
        }

        let log = Log::default();
        let bolt = object(1, "bolt", Vec2::ZERO, Vec2::splat(10.0), CollisionGroup::PROJECTILE, CollisionGroup::MONSTER, &log)
            .attach(Pop)
            .expect("attach");
        let (manager, mut map) = world(vec![
            bolt,
            object(2, "a", Vec2::ZERO, Vec2::splat(10.0), CollisionGroup::MONSTER, CollisionGroup::PROJECTILE, &log),
            object(3, "b", Vec2::ZERO, Vec2::splat(10.0), CollisionGroup::MONSTER, CollisionGroup::PROJECTILE, &log),
        ]);
        assert_eq!(manager.handle_collisions(&mut map).expect("pass"), 1);
        assert_eq!(*log.borrow(), vec!["bolt<-a", "a<-bolt"]);
    }
}

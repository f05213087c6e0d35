//! World registry.
//!
//! The [`World`] owns every live [`GameObject`]. Objects are kept in depth
//! layers (update and draw order) and, when they declare a collision group,
//! in a per-group index used for area queries. Both are maintained together
//! with the [`CollisionManager`] registration on add and remove.
//!
//! Per frame the driver calls [`World::update`], then
//! [`World::handle_collisions`], then [`World::draw`].

use std::collections::{BTreeMap, HashMap, HashSet};

use arena_component::{Canvas, Entity, EntityAllocator, FrameContext, GameObject, MeleeSweep, TargetInfo, WorldRequest};
use arena_math::{Aabb, Transform2D, Vec2};
use tracing::{debug, trace};

use crate::collision::CollisionManager;
use crate::components::attack::MeleeAttack;
use crate::components::brain::MonsterTag;
use crate::components::collision::{CollisionGroup, group_of, hit_box};
use crate::components::combat::{deal_damage, is_alive};
use crate::error::SimError;

/// Number of depth layers.
pub const LAYERS: usize = 4;
pub const BACKGROUND_DEPTH: usize = 0;
pub const ACTOR_DEPTH: usize = 1;

#[derive(Debug)]
pub struct World {
    allocator: EntityAllocator,
    objects: HashMap<Entity, GameObject>,
    layers: Vec<Vec<Entity>>,
    groups: BTreeMap<CollisionGroup, Vec<Entity>>,
    collisions: CollisionManager,
    arena: Vec2,
    target: Option<Entity>,
}

impl World {
    /// Empty world over an arena of the given size.
    #[must_use]
    pub fn new(arena: Vec2) -> Self {
        Self {
            allocator: EntityAllocator::new(),
            objects: HashMap::new(),
            layers: vec![Vec::new(); LAYERS],
            groups: CollisionGroup::INDEXED.into_iter().map(|g| (g, Vec::new())).collect(),
            collisions: CollisionManager::new(),
            arena,
            target: None,
        }
    }

    /// Size of the playable area.
    #[must_use]
    pub fn arena(&self) -> Vec2 {
        self.arena
    }

    /// Inserts `object` at `depth`, binding its id.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidDepth`] if `depth` is not a layer.
    pub fn add_object(&mut self, mut object: GameObject, depth: usize) -> Result<Entity, SimError> {
        if depth >= self.layers.len() {
            return Err(SimError::InvalidDepth {
                depth,
                layers: self.layers.len(),
            });
        }
        let id = self.allocator.allocate();
        let previous = object.unbind();
        object.bind(id);
        self.layers[depth].push(id);
        let group = group_of(&object);
        if !group.is_empty() {
            self.groups.entry(group).or_default().push(id);
        }
        self.collisions.register(&object);
        debug!(%id, %previous, label = object.label(), depth, ?group, "object added");
        self.objects.insert(id, object);
        Ok(id)
    }

    /// Removes `id` from every layer, group, and the collision manager.
    /// The returned object is unbound and can be added again under a new id.
    pub fn remove_object(&mut self, id: Entity) -> Option<GameObject> {
        let mut object = self.objects.remove(&id)?;
        object.unbind();
        for layer in &mut self.layers {
            layer.retain(|e| *e != id);
        }
        for members in self.groups.values_mut() {
            members.retain(|e| *e != id);
        }
        self.collisions.unregister(id);
        if self.target == Some(id) {
            self.target = None;
        }
        debug!(%id, label = object.label(), "object removed");
        Some(object)
    }

    /// Drops every object, leaving the layers and group keys in place.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.layers.iter_mut().for_each(Vec::clear);
        self.groups.values_mut().for_each(Vec::clear);
        self.collisions.clear();
        self.target = None;
    }

    /// Makes `id` the object AI actors track, usually the player.
    pub fn set_target(&mut self, id: Entity) {
        self.target = Some(id);
    }

    /// The object AI actors track.
    #[must_use]
    pub fn target(&self) -> Option<Entity> {
        self.target
    }

    /// The object with `id`, if it is still in the world.
    #[must_use]
    pub fn get(&self, id: Entity) -> Option<&GameObject> {
        self.objects.get(&id)
    }

    /// Mutable form of [`get`](Self::get).
    pub fn get_mut(&mut self, id: Entity) -> Option<&mut GameObject> {
        self.objects.get_mut(&id)
    }

    /// `true` if `id` is in the world.
    #[must_use]
    pub fn contains(&self, id: Entity) -> bool {
        self.objects.contains_key(&id)
    }

    /// Object count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// `true` when the world holds no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Ids at `depth` in insertion order; empty for an unknown depth.
    #[must_use]
    pub fn layer(&self, depth: usize) -> &[Entity] {
        self.layers.get(depth).map_or(&[], Vec::as_slice)
    }

    /// Members of exactly `group`.
    #[must_use]
    pub fn group(&self, group: CollisionGroup) -> &[Entity] {
        self.groups.get(&group).map_or(&[], Vec::as_slice)
    }

    /// The collision registry.
    #[must_use]
    pub fn collisions(&self) -> &CollisionManager {
        &self.collisions
    }

    /// Objects in layer order.
    pub fn iter(&self) -> impl Iterator<Item = &GameObject> + '_ {
        self.layers.iter().flatten().filter_map(|id| self.objects.get(id))
    }

    /// `true` while any active monster remains.
    #[must_use]
    pub fn has_monsters(&self) -> bool {
        self.objects.values().any(|o| o.is_active() && o.has::<MonsterTag>())
    }

    /// Snapshot of the target for this moment of the frame.
    #[must_use]
    pub fn target_info(&self) -> Option<TargetInfo> {
        let id = self.target?;
        let object = self.objects.get(&id)?;
        let transform = object.get::<Transform2D>()?;
        Some(TargetInfo {
            entity: id,
            position: transform.position,
            size: transform.size,
            alive: object.is_active() && is_alive(object),
        })
    }

    /// Updates every object, layer by layer.
    ///
    /// Each layer is walked over a snapshot of its ids, so objects removed
    /// mid-walk never shift their siblings. Objects spawned during the walk
    /// are inserted right away but first update next frame.
    ///
    /// # Errors
    ///
    /// The first failing component hook aborts the frame.
    pub fn update(&mut self, dt: f32) -> Result<(), SimError> {
        let mut spawned = HashSet::new();
        for depth in 0..self.layers.len() {
            let snapshot = self.layers[depth].clone();
            for id in snapshot {
                if spawned.contains(&id) {
                    continue;
                }
                let target = self.target_info().filter(|t| t.entity != id);
                let frame = FrameContext::new(dt, self.arena).with_target(target);
                let Some(object) = self.objects.get_mut(&id) else {
                    continue;
                };
                if !object.is_active() {
                    continue;
                }
                object.set_frame(frame);
                object.update()?;
                let requests = object.drain_requests();
                let active = object.is_active();
                self.apply_requests(id, requests, &mut spawned)?;
                if !active {
                    self.remove_object(id);
                }
            }
        }
        self.remove_inactive();
        Ok(())
    }

    /// Runs the collision pass, then applies what the contacts asked for and
    /// removes objects they deactivated. Returns the contact count.
    ///
    /// # Errors
    ///
    /// The first failing collision hook aborts the pass.
    pub fn handle_collisions(&mut self) -> Result<usize, SimError> {
        let contacts = self.collisions.handle_collisions(&mut self.objects)?;
        let mut spawned = HashSet::new();
        let order: Vec<Entity> = self.layers.iter().flatten().copied().collect();
        for id in order {
            let requests = match self.objects.get_mut(&id) {
                Some(object) => object.drain_requests(),
                None => continue,
            };
            self.apply_requests(id, requests, &mut spawned)?;
        }
        self.remove_inactive();
        Ok(contacts)
    }

    /// Draws every object, background layer first.
    pub fn draw(&self, canvas: &mut dyn Canvas) {
        for object in self.iter() {
            object.draw(canvas);
        }
    }

    fn apply_requests(
        &mut self,
        source: Entity,
        requests: Vec<WorldRequest>,
        spawned: &mut HashSet<Entity>,
    ) -> Result<(), SimError> {
        for request in requests {
            match request {
                WorldRequest::Spawn { depth, object } => {
                    spawned.insert(self.add_object(*object, depth)?);
                }
                WorldRequest::Sweep(sweep) => self.resolve_sweep(source, sweep)?,
            }
        }
        Ok(())
    }

    /// Damages every object of the swept groups whose hit box overlaps the
    /// sweep, and tells the attacker whom it hit.
    fn resolve_sweep(&mut self, source: Entity, sweep: MeleeSweep) -> Result<(), SimError> {
        let area = Aabb::from_center_size(sweep.center, sweep.size);
        let mask = CollisionGroup(sweep.hits);
        let candidates: Vec<Entity> = self
            .groups
            .iter()
            .filter(|(group, _)| group.intersects(mask))
            .flat_map(|(_, members)| members.iter().copied())
            .filter(|id| *id != source && !sweep.exclude.contains(id))
            .collect();

        let mut hits = Vec::new();
        for id in candidates {
            let Some(object) = self.objects.get_mut(&id) else {
                continue;
            };
            if !object.is_active() || !hit_box(object).is_some_and(|b| b.overlaps(&area)) {
                continue;
            }
            let outcome = deal_damage(object, sweep.damage)?;
            trace!(%source, target = %id, ?outcome, "melee hit");
            hits.push(id);
        }

        if !hits.is_empty()
            && let Some(attack) = self.objects.get_mut(&source).and_then(|o| o.get_mut::<MeleeAttack>())
        {
            attack.record_hits(&hits);
        }
        Ok(())
    }

    fn remove_inactive(&mut self) {
        let inactive: Vec<Entity> = self
            .layers
            .iter()
            .flatten()
            .copied()
            .filter(|id| self.objects.get(id).is_some_and(|o| !o.is_active()))
            .collect();
        for id in inactive {
            self.remove_object(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use arena_component::{Component, ComponentError};

    use super::*;
    use crate::components::collision::CollisionComponent;
    use crate::components::combat::CombatComponent;

    type Log = Rc<RefCell<Vec<String>>>;

    /// Records its update and despawns its owner once `hp` reaches zero.
    struct Mortal {
        hp: i32,
        log: Log,
    }

    impl Component for Mortal {
        fn type_name() -> &'static str {
            "Mortal"
        }

        fn update(&mut self, owner: &mut GameObject) -> Result<(), ComponentError> {
            self.log.borrow_mut().push(owner.label().to_string());
            self.hp -= 1;
            if self.hp <= 0 {
                owner.despawn();
            }
            Ok(())
        }
    }

    /// Spawns one child on its first update.
    struct Spawner {
        done: bool,
        log: Log,
    }

    impl Component for Spawner {
        fn type_name() -> &'static str {
            "Spawner"
        }

        fn update(&mut self, owner: &mut GameObject) -> Result<(), ComponentError> {
            if !self.done {
                self.done = true;
                let child = GameObject::new("child").attach(Mortal {
                    hp: 5,
                    log: self.log.clone(),
                })?;
                owner.spawn(ACTOR_DEPTH, child);
            }
            Ok(())
        }
    }

    fn mortal(label: &str, hp: i32, log: &Log) -> GameObject {
        GameObject::new(label)
            .attach(Mortal { hp, log: log.clone() })
            .expect("attach")
    }

    fn arena() -> World {
        World::new(Vec2::new(1600.0, 1800.0))
    }

    fn boxed(group: CollisionGroup, mask: CollisionGroup, at: Vec2) -> GameObject {
        GameObject::new("box")
            .attach(Transform2D::new(at, Vec2::splat(20.0)))
            .and_then(|o| o.attach(CollisionComponent::new(group, mask)))
            .and_then(|o| o.attach(CombatComponent::new(10.0)))
            .expect("distinct components")
    }

    #[test]
    fn test_add_indexes_layer_group_and_collisions() {
        let mut world = arena();
        let id = world
            .add_object(boxed(CollisionGroup::MONSTER, CollisionGroup::PLAYER, Vec2::ZERO), ACTOR_DEPTH)
            .expect("valid depth");
        assert!(id.is_bound());
        assert_eq!(world.get(id).map(GameObject::id), Some(id));
        assert_eq!(world.layer(ACTOR_DEPTH), &[id]);
        assert_eq!(world.group(CollisionGroup::MONSTER), &[id]);
        assert!(world.collisions().contains(id));

        let removed = world.remove_object(id);
        assert!(removed.is_some());
        assert!(world.layer(ACTOR_DEPTH).is_empty());
        assert!(world.group(CollisionGroup::MONSTER).is_empty());
        assert!(world.collisions().is_empty());
    }

    #[test]
    fn test_invalid_depth_rejected() {
        let mut world = arena();
        let err = world.add_object(GameObject::new("lost"), LAYERS);
        assert!(matches!(err, Err(SimError::InvalidDepth { depth: 4, layers: 4 })));
        assert!(world.is_empty());
    }

    #[test]
    fn test_removal_mid_update_keeps_siblings() {
        let log = Log::default();
        let mut world = arena();
        world.add_object(mortal("first", 5, &log), ACTOR_DEPTH).expect("add");
        let doomed = world.add_object(mortal("doomed", 1, &log), ACTOR_DEPTH).expect("add");
        world.add_object(mortal("next", 5, &log), ACTOR_DEPTH).expect("add");

        world.update(0.016).expect("update");
        assert_eq!(*log.borrow(), vec!["first", "doomed", "next"]);
        assert!(!world.contains(doomed));
        assert_eq!(world.len(), 2);

        log.borrow_mut().clear();
        world.update(0.016).expect("update");
        assert_eq!(*log.borrow(), vec!["first", "next"]);
    }

    #[test]
    fn test_spawned_objects_wait_for_next_frame() {
        let log = Log::default();
        let mut world = arena();
        world
            .add_object(
                GameObject::new("spawner")
                    .attach(Spawner {
                        done: false,
                        log: log.clone(),
                    })
                    .expect("attach"),
                ACTOR_DEPTH,
            )
            .expect("add");
        world.update(0.016).expect("update");
        assert_eq!(world.len(), 2);
        assert!(log.borrow().is_empty());
        world.update(0.016).expect("update");
        assert_eq!(*log.borrow(), vec!["child"]);
    }

    #[test]
    fn test_sweep_hits_overlapping_group_members_once() {
        let mut world = arena();
        let near = world
            .add_object(boxed(CollisionGroup::MONSTER, CollisionGroup::PLAYER, Vec2::new(40.0, 0.0)), ACTOR_DEPTH)
            .expect("add");
        let far = world
            .add_object(boxed(CollisionGroup::MONSTER, CollisionGroup::PLAYER, Vec2::new(400.0, 0.0)), ACTOR_DEPTH)
            .expect("add");
        let attacker = world
            .add_object(
                boxed(CollisionGroup::PLAYER, CollisionGroup::MONSTER, Vec2::ZERO)
                    .attach(MeleeAttack::new(5.0, CollisionGroup::MONSTER))
                    .expect("attach"),
                ACTOR_DEPTH,
            )
            .expect("add");
        let sweep = MeleeSweep {
            center: Vec2::new(32.0, 0.0),
            size: Vec2::splat(64.0),
            damage: 5.0,
            hits: CollisionGroup::MONSTER.bits(),
            exclude: Vec::new(),
        };
        world.resolve_sweep(attacker, sweep.clone()).expect("sweep");
        let hp = |world: &World, id| world.get(id).and_then(|o| o.get::<CombatComponent>()).map(CombatComponent::hp);
        assert_eq!(hp(&world, near), Some(5.0));
        assert_eq!(hp(&world, far), Some(10.0));
        assert_eq!(hp(&world, attacker), Some(10.0));
        assert_eq!(
            world.get(attacker).and_then(|o| o.get::<MeleeAttack>()).map(|m| m.struck().to_vec()),
            Some(vec![near])
        );

        let repeat = MeleeSweep {
            exclude: vec![near],
            ..sweep
        };
        world.resolve_sweep(attacker, repeat).expect("sweep");
        assert_eq!(hp(&world, near), Some(5.0));
    }

    #[test]
    fn test_target_is_hidden_from_itself() {
        struct SeesTarget(Log);

        impl Component for SeesTarget {
            fn type_name() -> &'static str {
                "SeesTarget"
            }

            fn update(&mut self, owner: &mut GameObject) -> Result<(), ComponentError> {
                let seen = owner.frame().target.map(|t| t.entity.raw());
                self.0.borrow_mut().push(format!("{}:{seen:?}", owner.label()));
                Ok(())
            }
        }

        let log = Log::default();
        let mut world = arena();
        let player = GameObject::new("player")
            .attach(Transform2D::from_position(Vec2::ZERO))
            .and_then(|o| o.attach(CombatComponent::new(100.0)))
            .and_then(|o| o.attach(SeesTarget(log.clone())))
            .expect("distinct components");
        let player = world.add_object(player, ACTOR_DEPTH).expect("add");
        let monster = GameObject::new("monster").attach(SeesTarget(log.clone())).expect("attach");
        world.add_object(monster, ACTOR_DEPTH).expect("add");
        world.set_target(player);
        world.update(0.016).expect("update");
        assert_eq!(*log.borrow(), vec!["player:None", "monster:Some(1)"]);
    }

    #[test]
    fn test_readded_object_registers_new_id() {
        let mut world = arena();
        let first = world
            .add_object(boxed(CollisionGroup::MONSTER, CollisionGroup::PLAYER, Vec2::ZERO), ACTOR_DEPTH)
            .expect("add");
        let object = world.remove_object(first).expect("present");
        assert_eq!(object.id(), Entity::UNBOUND);
        assert!(world.collisions().is_empty());

        let second = world.add_object(object, ACTOR_DEPTH).expect("add");
        assert_ne!(first, second);
        assert_eq!(world.get(second).map(GameObject::id), Some(second));
        assert!(world.collisions().contains(second));
        assert!(!world.collisions().contains(first));
        assert_eq!(world.group(CollisionGroup::MONSTER), &[second]);

        world.remove_object(second).expect("present");
        assert!(world.collisions().is_empty());
    }

    #[test]
    fn test_prebound_object_takes_world_id() {
        let mut world = arena();
        let mut object = boxed(CollisionGroup::PLAYER, CollisionGroup::MONSTER, Vec2::ZERO);
        object.bind(Entity::from_raw(99));
        let id = world.add_object(object, ACTOR_DEPTH).expect("add");
        assert_ne!(id, Entity::from_raw(99));
        assert!(world.collisions().contains(id));
    }

    #[test]
    fn test_clear_empties_everything() {
        let mut world = arena();
        let id = world
            .add_object(boxed(CollisionGroup::PLAYER, CollisionGroup::MONSTER, Vec2::ZERO), ACTOR_DEPTH)
            .expect("add");
        world.set_target(id);
        world.clear();
        assert!(world.is_empty());
        assert!(world.group(CollisionGroup::PLAYER).is_empty());
        assert!(world.collisions().is_empty());
        assert_eq!(world.target(), None);
    }
}

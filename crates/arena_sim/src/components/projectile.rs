//! Damage carried by thrown and fired objects.

use arena_component::{Component, ComponentError, Entity, GameObject};
use arena_math::{Aabb, Transform2D, Vec2};
use tracing::trace;

use super::collision::{CollisionGroup, group_of};
use super::combat::deal_damage;
use super::movement::MovementComponent;

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectileComponent {
    pub damage: f32,
    /// Groups this projectile damages.
    pub hits: CollisionGroup,
    /// Deactivate the owner after the first hit.
    pub despawn_on_hit: bool,
    /// Despawn once this far outside the arena; `None` never leaves.
    pub margin: Option<f32>,
    /// Push applied to the struck object, mirrored by travel direction.
    pub knockback: Option<Vec2>,
    struck: Vec<Entity>,
}

impl ProjectileComponent {
    /// Single-hit projectile damaging `hits`.
    #[must_use]
    pub fn new(damage: f32, hits: CollisionGroup) -> Self {
        Self {
            damage,
            hits,
            despawn_on_hit: true,
            margin: None,
            knockback: None,
            struck: Vec::new(),
        }
    }

    /// Distance outside the arena before despawning.
    #[must_use]
    pub fn with_margin(mut self, margin: f32) -> Self {
        self.margin = Some(margin);
        self
    }

    /// Shove applied to whatever it hits.
    #[must_use]
    pub fn with_knockback(mut self, knockback: Vec2) -> Self {
        self.knockback = Some(knockback);
        self
    }

    /// Lingering area damage: stays alive and hits each object once.
    #[must_use]
    pub fn lingering(mut self) -> Self {
        self.despawn_on_hit = false;
        self
    }

    /// Objects this projectile has hit.
    #[must_use]
    pub fn struck(&self) -> &[Entity] {
        &self.struck
    }
}

impl Component for ProjectileComponent {
    fn type_name() -> &'static str {
        "Projectile"
    }

    fn update(&mut self, owner: &mut GameObject) -> Result<(), ComponentError> {
        let Some(margin) = self.margin else {
            return Ok(());
        };
        let arena = Aabb::new(Vec2::ZERO, owner.frame().arena).expanded(margin);
        if let Some(transform) = owner.get::<Transform2D>()
            && !arena.contains(transform.position)
        {
            trace!(projectile = owner.label(), "left the arena");
            owner.despawn();
        }
        Ok(())
    }

    fn handle_collision(&mut self, owner: &mut GameObject, other: &mut GameObject) -> Result<(), ComponentError> {
        if !owner.is_active() || !group_of(other).intersects(self.hits) || self.struck.contains(&other.id()) {
            return Ok(());
        }
        deal_damage(other, self.damage)?;
        self.struck.push(other.id());

        if let Some(push) = self.knockback {
            let heading = owner
                .get::<MovementComponent>()
                .map_or(1.0, |m| if m.dir.x < 0.0 { -1.0 } else { 1.0 });
            if let Some(transform) = other.get_mut::<Transform2D>() {
                transform.position += Vec2::new(push.x * heading, push.y);
            }
        }
        if self.despawn_on_hit {
            owner.despawn();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use arena_component::FrameContext;

    use super::*;
    use crate::components::collision::CollisionComponent;
    use crate::components::combat::CombatComponent;

    fn target(id: u64, hp: f32) -> GameObject {
        let mut obj = GameObject::new("slime")
            .attach(Transform2D::new(Vec2::ZERO, Vec2::splat(20.0)))
            .and_then(|o| o.attach(CollisionComponent::new(CollisionGroup::MONSTER, CollisionGroup::PROJECTILE)))
            .and_then(|o| o.attach(CombatComponent::new(hp)))
            .expect("distinct components");
        obj.bind(Entity::from_raw(id));
        obj
    }

    fn hp(obj: &GameObject) -> Option<f32> {
        obj.get::<CombatComponent>().map(CombatComponent::hp)
    }

    #[test]
    fn test_hit_damages_and_despawns() {
        let mut bolt = GameObject::new("fireball")
            .attach(ProjectileComponent::new(5.0, CollisionGroup::MONSTER))
            .expect("attach");
        let mut slime = target(2, 10.0);
        bolt.handle_collision(&mut slime).expect("collision");
        assert_eq!(hp(&slime), Some(5.0));
        assert!(!bolt.is_active());

        // A spent projectile does nothing more.
        bolt.handle_collision(&mut slime).expect("collision");
        assert_eq!(hp(&slime), Some(5.0));
    }

    #[test]
    fn test_lingering_hits_each_object_once() {
        let mut blast = GameObject::new("explosion")
            .attach(ProjectileComponent::new(3.0, CollisionGroup::MONSTER).lingering())
            .expect("attach");
        let mut a = target(2, 10.0);
        let mut b = target(3, 10.0);
        for _ in 0..3 {
            blast.handle_collision(&mut a).expect("collision");
            blast.handle_collision(&mut b).expect("collision");
        }
        assert_eq!(hp(&a), Some(7.0));
        assert_eq!(hp(&b), Some(7.0));
        assert!(blast.is_active());
    }

    #[test]
    fn test_ignores_groups_outside_hits() {
        let mut arrow = GameObject::new("arrow")
            .attach(ProjectileComponent::new(10.0, CollisionGroup::PLAYER))
            .expect("attach");
        let mut slime = target(2, 10.0);
        arrow.handle_collision(&mut slime).expect("collision");
        assert_eq!(hp(&slime), Some(10.0));
        assert!(arrow.is_active());
    }

    #[test]
    fn test_despawns_outside_margin() {
        let mut arrow = GameObject::new("arrow")
            .attach(Transform2D::from_position(Vec2::new(-40.0, 10.0)))
            .and_then(|o| o.attach(ProjectileComponent::new(10.0, CollisionGroup::PLAYER).with_margin(50.0)))
            .expect("distinct components");
        arrow.set_frame(FrameContext::new(0.016, Vec2::new(100.0, 100.0)));
        arrow.update().expect("update");
        assert!(arrow.is_active());
        if let Some(t) = arrow.get_mut::<Transform2D>() {
            t.position.x = -60.0;
        }
        arrow.update().expect("update");
        assert!(!arrow.is_active());
    }

    #[test]
    fn test_knockback_follows_travel_direction() {
        let mut missile = GameObject::new("missile")
            .attach(MovementComponent::new(480.0))
            .and_then(|o| o.attach(ProjectileComponent::new(1.0, CollisionGroup::MONSTER).with_knockback(Vec2::new(120.0, 30.0))))
            .expect("distinct components");
        if let Some(m) = missile.get_mut::<MovementComponent>() {
            m.set_direction(Vec2::new(-1.0, 0.0));
        }
        let mut slime = target(2, 10.0);
        missile.handle_collision(&mut slime).expect("collision");
        assert_eq!(slime.get::<Transform2D>().map(|t| t.position), Some(Vec2::new(-120.0, 30.0)));
    }
}

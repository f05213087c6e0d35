//! Projectiles fired by the player and by monsters.

use arena_component::{Component, ComponentError, GameObject, SpriteHandle};
use arena_math::{Transform2D, Vec2};
use tracing::trace;

use super::position;
use crate::components::{
    AnimationComponent, CollisionComponent, CollisionGroup, MovementComponent, ProjectileComponent, SpriteComponent,
    group_of,
};
use crate::world::ACTOR_DEPTH;

pub const FIREBALL_SPEED: f32 = 1000.0;
pub const FIREBALL_DAMAGE: f32 = 5.0;

pub const ARROW_SPEED: f32 = 280.0;
pub const ARROW_DAMAGE: f32 = 10.0;

pub const BOMB_DAMAGE: f32 = 18.0;
pub const BOMB_ARC_DISTANCE: f32 = 260.0;
pub const BOMB_ARC_HEIGHT: f32 = 180.0;
pub const BOMB_ARC_DURATION: f32 = 0.95;

pub const MISSILE_SPEED: f32 = 480.0;
pub const MISSILE_DAMAGE: f32 = 14.0;

const PROJECTILE_SIZE: f32 = 48.0;
const EXPLOSION_FPS: f32 = 1.0 / 0.03;

fn flying(label: &str, sprite: SpriteHandle, at: Vec2, size: Vec2, speed: f32, dir: Vec2) -> Result<GameObject, ComponentError> {
    let mut movement = MovementComponent::new(speed);
    movement.set_direction(dir);
    GameObject::new(label)
        .attach(Transform2D::new(at, size))?
        .attach(SpriteComponent::new(sprite))?
        .attach(movement)
}

/// The player's fireball: flies along `dir` until it hits a monster or
/// leaves the arena.
///
/// # Errors
///
/// Only on a duplicate component, which the fixed layout rules out.
pub fn fireball(sprite: SpriteHandle, at: Vec2, dir: Vec2) -> Result<GameObject, ComponentError> {
    let size = sprite.frame_size();
    flying("Fireball", sprite, at, size, FIREBALL_SPEED, dir)?
        .attach(CollisionComponent::new(CollisionGroup::PROJECTILE, CollisionGroup::MONSTER))?
        .attach(ProjectileComponent::new(FIREBALL_DAMAGE, CollisionGroup::MONSTER).with_margin(50.0))
}

/// An archer's arrow, loosed along `dir`.
///
/// Arrows fly in the monster group so only the player's hit box accepts
/// them. The arrow art points left.
///
/// # Errors
///
/// Same as [`fireball`].
pub fn arrow(sprite: SpriteHandle, at: Vec2, dir: Vec2) -> Result<GameObject, ComponentError> {
    let size = sprite.frame_size();
    let mut shot = flying("Arrow", sprite, at, size, ARROW_SPEED, dir.normalize_or(Vec2::X))?
        .attach(CollisionComponent::new(CollisionGroup::MONSTER, CollisionGroup::PLAYER))?
        .attach(ProjectileComponent::new(ARROW_DAMAGE, CollisionGroup::PLAYER).with_margin(50.0))?;
    if let Some(drawn) = shot.get_mut::<SpriteComponent>() {
        drawn.faces_left = true;
    }
    Ok(shot)
}

/// The goblin king's missile. Pushes the player back along its heading.
///
/// # Errors
///
/// Same as [`fireball`].
pub fn missile(sprite: SpriteHandle, at: Vec2, face: f32) -> Result<GameObject, ComponentError> {
    flying("Missile", sprite, at, Vec2::splat(PROJECTILE_SIZE), MISSILE_SPEED, Vec2::new(face, 0.0))?
        .attach(AnimationComponent::looping(1.0 / 0.11))?
        .attach(CollisionComponent::new(CollisionGroup::PROJECTILE, CollisionGroup::PLAYER).with_size(Vec2::splat(PROJECTILE_SIZE * 0.7)))?
        .attach(
            ProjectileComponent::new(MISSILE_DAMAGE, CollisionGroup::PLAYER)
                .with_margin(100.0)
                .with_knockback(Vec2::new(120.0, 30.0)),
        )
}

/// A bomb lobbed along an arc toward `target_y`. It explodes on landing or
/// on touching the player, whichever comes first.
///
/// # Errors
///
/// Same as [`fireball`].
pub fn bomb(sprite: SpriteHandle, explosion: SpriteHandle, at: Vec2, target_y: f32, face: f32) -> Result<GameObject, ComponentError> {
    let mut movement = MovementComponent::new(0.0);
    let end = Vec2::new(at.x + face * BOMB_ARC_DISTANCE, target_y);
    movement.start_parabolic(at, end, BOMB_ARC_HEIGHT, BOMB_ARC_DURATION, Some(Box::new(Fuse::on_landing)));
    GameObject::new("Bomb")
        .attach(Transform2D::new(at, Vec2::splat(PROJECTILE_SIZE)))?
        .attach(SpriteComponent::new(sprite))?
        .attach(movement)?
        .attach(CollisionComponent::new(CollisionGroup::PROJECTILE, CollisionGroup::PLAYER).with_size(Vec2::splat(PROJECTILE_SIZE * 0.8)))?
        .attach(ProjectileComponent::new(BOMB_DAMAGE, CollisionGroup::PLAYER))?
        .attach(Fuse::new(explosion))
}

/// Blast left by a bomb. Hurts players and monsters alike, each once, then
/// fades when its animation ends.
///
/// # Errors
///
/// Same as [`fireball`].
pub fn explosion(sprite: SpriteHandle, at: Vec2) -> Result<GameObject, ComponentError> {
    let frame = sprite.frame_size();
    let mut drawn = SpriteComponent::new(sprite);
    drawn.follow_facing = false;
    GameObject::new("Explosion")
        .attach(Transform2D::new(at, frame * 2.0))?
        .attach(drawn)?
        .attach(AnimationComponent::once(EXPLOSION_FPS))?
        .attach(
            CollisionComponent::new(CollisionGroup::PROJECTILE, CollisionGroup::PLAYER | CollisionGroup::MONSTER)
                .with_size(frame * 1.6),
        )?
        .attach(ProjectileComponent::new(BOMB_DAMAGE, CollisionGroup::PLAYER | CollisionGroup::MONSTER).lingering())
}

/// Turns a bomb into an [`explosion`] exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct Fuse {
    explosion: SpriteHandle,
    spent: bool,
}

impl Fuse {
    /// Unlit fuse that bursts into `explosion`.
    #[must_use]
    pub fn new(explosion: SpriteHandle) -> Self {
        Self { explosion, spent: false }
    }

    /// `true` after the explosion was spawned.
    #[must_use]
    pub fn is_spent(&self) -> bool {
        self.spent
    }

    fn detonate(&mut self, owner: &mut GameObject) -> Result<(), ComponentError> {
        if self.spent {
            return Ok(());
        }
        self.spent = true;
        let at = position(owner);
        trace!(bomb = %owner.id(), ?at, "detonated");
        owner.spawn(ACTOR_DEPTH, explosion(self.explosion.clone(), at)?);
        owner.despawn();
        Ok(())
    }

    fn on_landing(owner: &mut GameObject) -> Result<(), ComponentError> {
        owner
            .with_component::<Self, _>(|fuse, owner| fuse.detonate(owner))
            .unwrap_or(Ok(()))
    }
}

impl Component for Fuse {
    fn type_name() -> &'static str {
        "Fuse"
    }

    fn handle_collision(&mut self, owner: &mut GameObject, other: &mut GameObject) -> Result<(), ComponentError> {
        if group_of(other).intersects(CollisionGroup::PLAYER) {
            self.detonate(owner)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use arena_component::{Entity, FrameContext, WorldRequest};

    use super::*;
    use crate::components::CombatComponent;

    const ARENA: Vec2 = Vec2::new(1600.0, 1800.0);

    fn tick(obj: &mut GameObject, dt: f32) {
        obj.set_frame(FrameContext::new(dt, ARENA));
        obj.update().expect("update");
    }

    fn player() -> GameObject {
        let mut obj = GameObject::new("player")
            .attach(Transform2D::new(Vec2::new(500.0, 500.0), Vec2::new(32.0, 64.0)))
            .and_then(|o| o.attach(CollisionComponent::new(CollisionGroup::PLAYER, CollisionGroup::MONSTER | CollisionGroup::PROJECTILE)))
            .and_then(|o| o.attach(CombatComponent::new(100.0)))
            .expect("distinct components");
        obj.bind(Entity::from_raw(1));
        obj
    }

    fn spawned_labels(obj: &mut GameObject) -> Vec<String> {
        obj.drain_requests()
            .into_iter()
            .filter_map(|r| match r {
                WorldRequest::Spawn { object, .. } => Some(object.label().to_string()),
                WorldRequest::Sweep(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_fireball_leaves_arena_and_despawns() {
        let mut bolt = fireball(SpriteHandle::new("fireball", 30.0, 30.0, 1), Vec2::new(1500.0, 500.0), Vec2::X)
            .expect("fireball");
        tick(&mut bolt, 0.1);
        assert!(bolt.is_active());
        tick(&mut bolt, 0.1);
        assert!(!bolt.is_active());
    }

    #[test]
    fn test_arrow_flies_along_normalized_dir() {
        let mut shot = arrow(SpriteHandle::new("arrow", 40.0, 10.0, 1), Vec2::new(500.0, 500.0), Vec2::new(-3.0, 0.0)).expect("arrow");
        tick(&mut shot, 0.5);
        assert_eq!(position(&shot), Vec2::new(360.0, 500.0));
    }

    #[test]
    fn test_bomb_explodes_on_landing() {
        let mut lobbed = bomb(
            SpriteHandle::new("bomb", 48.0, 48.0, 1),
            SpriteHandle::new("explosion", 48.0, 48.0, 48),
            Vec2::new(400.0, 500.0),
            450.0,
            1.0,
        )
        .expect("bomb");
        tick(&mut lobbed, 0.5);
        assert!(lobbed.is_active());
        tick(&mut lobbed, 0.5);
        assert!(!lobbed.is_active());
        assert_eq!(position(&lobbed), Vec2::new(660.0, 450.0));
        assert_eq!(spawned_labels(&mut lobbed), vec!["Explosion"]);
    }

    #[test]
    fn test_bomb_contact_damages_and_explodes_once() {
        let mut lobbed = bomb(
            SpriteHandle::new("bomb", 48.0, 48.0, 1),
            SpriteHandle::new("explosion", 48.0, 48.0, 48),
            Vec2::new(500.0, 500.0),
            500.0,
            1.0,
        )
        .expect("bomb");
        let mut target = player();
        lobbed.handle_collision(&mut target).expect("collide");
        lobbed.handle_collision(&mut target).expect("collide");
        assert_eq!(target.get::<CombatComponent>().map(CombatComponent::hp), Some(100.0 - BOMB_DAMAGE));
        assert_eq!(spawned_labels(&mut lobbed), vec!["Explosion"]);
        assert!(lobbed.get::<Fuse>().is_some_and(Fuse::is_spent));
    }

    #[test]
    fn test_missile_knocks_target_back() {
        let mut shot = missile(SpriteHandle::new("missile", 64.0, 64.0, 6), Vec2::new(520.0, 500.0), -1.0).expect("missile");
        let mut target = player();
        shot.handle_collision(&mut target).expect("collide");
        assert_eq!(position(&target), Vec2::new(380.0, 530.0));
        assert!(!shot.is_active());
    }

    #[test]
    fn test_explosion_lingers_and_fades() {
        let mut blast = explosion(SpriteHandle::new("explosion", 48.0, 48.0, 48), Vec2::new(500.0, 500.0)).expect("blast");
        let mut target = player();
        blast.handle_collision(&mut target).expect("collide");
        blast.handle_collision(&mut target).expect("collide");
        assert!(blast.is_active());
        assert_eq!(target.get::<CombatComponent>().map(CombatComponent::hp), Some(100.0 - BOMB_DAMAGE));
        tick(&mut blast, 1.0);
        assert!(blast.is_active());
        tick(&mut blast, 0.5);
        assert!(!blast.is_active());
    }
}

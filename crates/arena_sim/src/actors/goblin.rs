//! Goblin: patrols around its spawn point, and when the player comes near,
//! winds up and dashes at them with a widened hit box.

use arena_behavior::{BehaviorTree, Node, Status};
use arena_component::{Component, ComponentError, GameObject, SpriteHandle};
use arena_math::{Transform2D, Vec2};
use tracing::trace;

use super::{check, movement, notify, position, random_point, random_side, set_frame, set_position, think};
use crate::components::{
    BehaviorComponent, CollisionComponent, CollisionGroup, CombatComponent, ContactDamage, HudComponent, MonsterTag,
    MovementComponent, PerceptionComponent, SpriteComponent, group_of,
};
use crate::components::perception::living_target;
use crate::error::SimError;
use crate::registry::SpawnContext;

pub const KIND: &str = "Goblin";

const SCALE: f32 = 2.0;
const HP: f32 = 20.0;
const SPEED: f32 = 90.0;
const BODY_INSET: f32 = 10.0;

const PATROL_RADIUS: f32 = 140.0;
const DETECTION_RANGE: f32 = 220.0;

const PREPARE_FRAME: u32 = 3;
const PREPARE_TIME: f32 = 1.0;
const ATTACK_ANIM: f32 = 0.45;
const ATTACK_DASH: f32 = 0.25;
const ATTACK_COOLDOWN: f32 = 2.0;
const ATTACK_DAMAGE: f32 = 15.0;
const BASE_ATTACK_DISTANCE: f32 = 80.0;
const ATTACK_RANGE_SCALE: f32 = 0.85;
const HITBOX_EXTRA: f32 = 20.0;
const HIT_KNOCKBACK: f32 = 12.0;

pub(crate) const WALK_FRAMES: u32 = 3;
pub(crate) const WALK_ANIM_SPEED: f32 = 0.12;

/// Where a patrolling goblin is in its attack cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stance {
    #[default]
    Patrol,
    Prepare,
    Attack,
    Cooldown,
}

/// Walks back and forth between two x bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Patrol {
    pub left: f32,
    pub right: f32,
    pub dir: f32,
    anim_timer: f32,
}

impl Patrol {
    /// Patrol of `radius` either side of `x`, heading `dir` first.
    #[must_use]
    pub fn around(x: f32, radius: f32, dir: f32) -> Self {
        Self {
            left: x - radius,
            right: x + radius,
            dir,
            anim_timer: 0.0,
        }
    }

    /// Turns at the bounds, keeps walking, and cycles the walk frames.
    pub fn tick(&mut self, owner: &mut GameObject, dt: f32) {
        let x = position(owner).x;
        if x <= self.left {
            self.dir = 1.0;
        } else if x >= self.right {
            self.dir = -1.0;
        }
        if let Some(movement) = movement(owner) {
            movement.set_direction(Vec2::new(self.dir, 0.0));
        }
        self.anim_timer += dt;
        if self.anim_timer >= WALK_ANIM_SPEED {
            self.anim_timer -= WALK_ANIM_SPEED;
            let frame = owner.get::<SpriteComponent>().map_or(0, |s| s.frame);
            set_frame(owner, (frame + 1) % WALK_FRAMES);
        }
    }

    /// Stops walking and turns toward `dx`.
    pub fn halt(&mut self, owner: &mut GameObject, dx: f32) {
        if dx != 0.0 {
            self.dir = dx.signum();
        }
        if let Some(movement) = movement(owner) {
            movement.stop();
            movement.face_toward(self.dir);
        }
    }
}

/// Attack frame for `elapsed` seconds into an attack of `duration`.
pub(crate) fn attack_frame(elapsed: f32, duration: f32) -> u32 {
    let progress = (elapsed / duration).min(1.0);
    (4 + (progress * 3.0) as u32).min(6)
}

/// Goblin AI state.
#[derive(Debug, Clone, PartialEq)]
pub struct GoblinBrain {
    patrol: Patrol,
    stance: Stance,
    timer: f32,
    cooldown: f32,
    dash_done: bool,
    dash_from: Vec2,
    dash_to: Vec2,
    body: Vec2,
}

impl GoblinBrain {
    /// Brain that starts patrolling with the given body hit box.
    #[must_use]
    pub fn new(patrol: Patrol, body: Vec2) -> Self {
        Self {
            patrol,
            stance: Stance::Patrol,
            timer: 0.0,
            cooldown: ATTACK_COOLDOWN,
            dash_done: false,
            dash_from: Vec2::ZERO,
            dash_to: Vec2::ZERO,
            body,
        }
    }

    /// Current attack phase.
    #[must_use]
    pub fn stance(&self) -> Stance {
        self.stance
    }

    fn is_attacking(&self, _owner: &GameObject) -> bool {
        matches!(self.stance, Stance::Prepare | Stance::Attack | Stance::Cooldown)
    }

    fn can_start_attack(&self, owner: &GameObject) -> bool {
        self.stance == Stance::Patrol
            && self.cooldown >= ATTACK_COOLDOWN
            && owner
                .get::<PerceptionComponent>()
                .and_then(|p| p.sense(owner))
                .is_some()
    }

    fn begin_prepare(&mut self, owner: &mut GameObject) -> Status {
        let from = position(owner);
        let (dir, reach) = match living_target(owner) {
            Some(target) => {
                let offset = target.position - from;
                let distance = offset.length();
                let reach = (distance * ATTACK_RANGE_SCALE).clamp(BASE_ATTACK_DISTANCE, DETECTION_RANGE);
                self.patrol.halt(owner, offset.x);
                let dir = if distance == 0.0 { Vec2::new(self.patrol.dir, 0.0) } else { offset / distance };
                (dir, reach)
            }
            None => {
                self.patrol.halt(owner, 0.0);
                (Vec2::new(self.patrol.dir, 0.0), BASE_ATTACK_DISTANCE)
            }
        };
        self.dash_from = from;
        self.dash_to = from + dir * reach;
        self.stance = Stance::Prepare;
        self.timer = 0.0;
        self.dash_done = false;
        set_frame(owner, PREPARE_FRAME);
        Status::Running
    }

    fn start_attack(&mut self, owner: &mut GameObject) {
        self.stance = Stance::Attack;
        self.timer = 0.0;
        self.cooldown = 0.0;
        self.dash_done = false;
        let face = if self.dash_to.x < self.dash_from.x { -1.0 } else { 1.0 };
        self.patrol.dir = face;

        let width = owner.get::<Transform2D>().map_or(self.body.x, |t| t.size.x) + HITBOX_EXTRA;
        if let Some(collision) = owner.get_mut::<CollisionComponent>() {
            collision.offset = Vec2::new(face * HITBOX_EXTRA * 0.5, 0.0);
            collision.size = Some(Vec2::new(width, self.body.y));
        }
        if let Some(contact) = owner.get_mut::<ContactDamage>() {
            contact.arm(ATTACK_DAMAGE);
        }
        let (from, to) = (self.dash_from, self.dash_to);
        if let Some(movement) = movement(owner) {
            movement.start_linear(from, to, ATTACK_DASH, Some(notify::<Self>(Self::finish_dash)));
        }
        trace!(goblin = %owner.id(), ?to, "dash");
    }

    fn finish_dash(&mut self, _owner: &mut GameObject) {
        self.dash_done = true;
    }

    /// Back to the resting hit box, with the strike disarmed.
    fn stand_down(&mut self, owner: &mut GameObject) {
        if let Some(collision) = owner.get_mut::<CollisionComponent>() {
            collision.offset = Vec2::ZERO;
            collision.size = Some(self.body);
        }
        if let Some(contact) = owner.get_mut::<ContactDamage>() {
            contact.disarm();
        }
    }

    fn run_attack(&mut self, owner: &mut GameObject) -> Status {
        let dt = owner.frame().dt;
        match self.stance {
            Stance::Prepare => {
                self.timer += dt;
                if self.timer >= PREPARE_TIME {
                    self.start_attack(owner);
                }
                Status::Running
            }
            Stance::Attack => {
                self.timer += dt;
                set_frame(owner, attack_frame(self.timer, ATTACK_ANIM));
                if self.dash_done && self.timer >= ATTACK_ANIM {
                    self.stance = Stance::Cooldown;
                    self.stand_down(owner);
                }
                Status::Running
            }
            Stance::Cooldown => {
                self.cooldown += dt;
                if self.cooldown < ATTACK_COOLDOWN {
                    return Status::Running;
                }
                self.stance = Stance::Patrol;
                set_frame(owner, 0);
                Status::Success
            }
            Stance::Patrol => Status::Fail,
        }
    }

    fn patrol(&mut self, owner: &mut GameObject) -> Status {
        let dt = owner.frame().dt;
        self.cooldown = (self.cooldown + dt).min(ATTACK_COOLDOWN);
        self.patrol.tick(owner, dt);
        Status::Success
    }

    fn enter_hit(&mut self, owner: &mut GameObject, attacker: &GameObject) {
        if let Some(movement) = movement(owner) {
            movement.cancel_path();
        }
        self.stance = Stance::Patrol;
        self.timer = 0.0;
        self.cooldown = 0.0;
        self.stand_down(owner);
        set_frame(owner, 0);

        let at = position(owner);
        let push = if position(attacker).x < at.x { HIT_KNOCKBACK } else { -HIT_KNOCKBACK };
        set_position(owner, at + Vec2::new(push, 0.0));
    }
}

impl Component for GoblinBrain {
    fn type_name() -> &'static str {
        "GoblinBrain"
    }

    fn handle_collision(&mut self, owner: &mut GameObject, other: &mut GameObject) -> Result<(), ComponentError> {
        if group_of(other).intersects(CollisionGroup::PROJECTILE) {
            self.enter_hit(owner, other);
        }
        Ok(())
    }
}

fn tree() -> BehaviorTree<GameObject> {
    BehaviorTree::new(
        KIND,
        Node::selector(
            "GoblinSelector",
            vec![
                Node::sequence(
                    "HandleAttack",
                    vec![
                        Node::condition("IsAttacking", check::<GoblinBrain>(GoblinBrain::is_attacking)),
                        Node::action("RunAttack", think::<GoblinBrain>(GoblinBrain::run_attack)),
                    ],
                ),
                Node::sequence(
                    "StartAttack",
                    vec![
                        Node::condition("CanStartAttack", check::<GoblinBrain>(GoblinBrain::can_start_attack)),
                        Node::action("BeginPrepare", think::<GoblinBrain>(GoblinBrain::begin_prepare)),
                    ],
                ),
                Node::action("Patrol", think::<GoblinBrain>(GoblinBrain::patrol)),
            ],
        ),
    )
}

fn assemble(sheet: SpriteHandle, at: Vec2, dir: f32) -> Result<GameObject, ComponentError> {
    let size = sheet.frame_size() * SCALE;
    let body = size - Vec2::splat(BODY_INSET);
    let mut movement = MovementComponent::new(SPEED);
    movement.face_toward(dir);
    GameObject::new(KIND)
        .attach(MonsterTag::new(KIND))?
        .attach(Transform2D::new(at, size))?
        .attach(SpriteComponent::new(sheet).facing_left())?
        .attach(
            CollisionComponent::new(CollisionGroup::MONSTER, CollisionGroup::PLAYER | CollisionGroup::PROJECTILE)
                .with_size(body),
        )?
        .attach(CombatComponent::new(HP))?
        .attach(movement)?
        .attach(PerceptionComponent::new(DETECTION_RANGE))?
        .attach(HudComponent::default())?
        .attach(GoblinBrain::new(Patrol::around(at.x, PATROL_RADIUS, dir), body))?
        .attach(ContactDamage::strike(ATTACK_DAMAGE, CollisionGroup::PLAYER))?
        .attach(BehaviorComponent::new(tree()))
}

/// # Errors
///
/// [`SimError::Resource`] when the goblin sheet is missing.
pub fn spawn(ctx: &mut SpawnContext<'_>) -> Result<GameObject, SimError> {
    let sheet = ctx.sprites.sprite("goblin")?;
    let at = random_point(&mut ctx.rng, 140.0..=ctx.arena.x - 140.0, 140.0..=760.0);
    let dir = random_side(&mut ctx.rng);
    Ok(assemble(sheet, at, dir)?)
}

#[cfg(test)]
mod tests {
    use arena_component::Entity;

    use super::*;
    use crate::actors::testing::{step, target_at};

    fn goblin(at: Vec2, dir: f32) -> GameObject {
        let mut obj = assemble(SpriteHandle::new("goblin", 30.0, 35.0, 7), at, dir).expect("goblin");
        obj.bind(Entity::from_raw(9));
        obj
    }

    fn stance(obj: &GameObject) -> Option<Stance> {
        obj.get::<GoblinBrain>().map(GoblinBrain::stance)
    }

    #[test]
    fn test_patrol_turns_at_bounds() {
        let mut obj = goblin(Vec2::new(500.0, 300.0), 1.0);
        let (mut went_left, mut went_right) = (false, false);
        for _ in 0..80 {
            let before = position(&obj).x;
            step(&mut obj, 0.1, None, 1);
            let x = position(&obj).x;
            went_right |= x > before;
            went_left |= x < before;
            assert!((360.0 - 9.5..=640.0 + 9.5).contains(&x), "left the patrol range at {x}");
        }
        assert!(went_left && went_right);
    }

    #[test]
    fn test_prepares_then_dashes_with_wide_hitbox() {
        let target = Some(target_at(Vec2::new(650.0, 300.0)));
        let mut obj = goblin(Vec2::new(500.0, 300.0), -1.0);
        step(&mut obj, 0.125, target, 1);
        assert_eq!(stance(&obj), Some(Stance::Prepare));
        assert_eq!(obj.get::<MovementComponent>().map(|m| m.dir), Some(Vec2::ZERO));
        assert_eq!(obj.get::<SpriteComponent>().map(|s| s.frame), Some(PREPARE_FRAME));

        step(&mut obj, 0.125, target, 8);
        assert_eq!(stance(&obj), Some(Stance::Attack));
        assert!(obj.get::<ContactDamage>().is_some_and(|c| c.enabled));
        let collision = obj.get::<CollisionComponent>().copied().expect("collision");
        assert_eq!(collision.offset, Vec2::new(10.0, 0.0));
        assert_eq!(collision.size, Some(Vec2::new(80.0, 60.0)));

        step(&mut obj, 0.125, target, 4);
        assert_eq!(stance(&obj), Some(Stance::Cooldown));
        assert_eq!(position(&obj), Vec2::new(627.5, 300.0));
        assert!(obj.get::<ContactDamage>().is_some_and(|c| !c.enabled));
        assert_eq!(obj.get::<CollisionComponent>().and_then(|c| c.size), Some(Vec2::new(50.0, 60.0)));
    }

    #[test]
    fn test_cooldown_returns_to_patrol() {
        let target = Some(target_at(Vec2::new(650.0, 300.0)));
        let mut obj = goblin(Vec2::new(500.0, 300.0), -1.0);
        step(&mut obj, 0.125, target, 13);
        assert_eq!(stance(&obj), Some(Stance::Cooldown));
        step(&mut obj, 0.125, None, 14);
        assert_eq!(stance(&obj), Some(Stance::Cooldown));
        step(&mut obj, 0.125, None, 3);
        assert_eq!(stance(&obj), Some(Stance::Patrol));
    }

    #[test]
    fn test_projectile_hit_cancels_attack() {
        let target = Some(target_at(Vec2::new(650.0, 300.0)));
        let mut obj = goblin(Vec2::new(500.0, 300.0), -1.0);
        step(&mut obj, 0.125, target, 10);
        assert_eq!(stance(&obj), Some(Stance::Attack));
        let before = position(&obj);

        let mut fireball = GameObject::new("fireball")
            .attach(Transform2D::from_position(before + Vec2::new(30.0, 0.0)))
            .and_then(|o| o.attach(CollisionComponent::new(CollisionGroup::PROJECTILE, CollisionGroup::MONSTER)))
            .expect("distinct components");
        obj.handle_collision(&mut fireball).expect("collide");
        assert_eq!(stance(&obj), Some(Stance::Patrol));
        assert_eq!(position(&obj), before - Vec2::new(12.0, 0.0));
        assert!(obj.get::<MovementComponent>().is_some_and(|m| !m.is_path_active()));
        assert!(obj.get::<ContactDamage>().is_some_and(|c| !c.enabled));
    }

    #[test]
    fn test_attack_frames_progress() {
        assert_eq!(attack_frame(0.0, ATTACK_ANIM), 4);
        assert_eq!(attack_frame(0.2, ATTACK_ANIM), 5);
        assert_eq!(attack_frame(1.0, ATTACK_ANIM), 6);
    }
}

//! Goblin king: a stationary boss that lobs bombs and fires missiles, and
//! leaps back out of reach when the player closes in.
//!
//! Any hit point loss, or touching the player, staggers the king: it is
//! knocked back and its current move is abandoned.

use arena_behavior::{BehaviorTree, Node, Status};
use arena_component::{Component, ComponentError, GameObject, SpriteHandle};
use arena_math::{Transform2D, Vec2};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use super::{check, movement, notify, position, projectiles, random_point, set_frame, set_position, set_sheet, think};
use crate::components::perception::living_target;
use crate::components::{
    BehaviorComponent, CollisionComponent, CollisionGroup, CombatComponent, HudComponent, MonsterTag,
    MovementComponent, PerceptionComponent, SpriteComponent, group_of,
};
use crate::error::SimError;
use crate::registry::SpawnContext;
use crate::world::ACTOR_DEPTH;

pub const KIND: &str = "GoblinKing";

const SCALE: f32 = 2.5;
const COLLISION_SCALE: f32 = 0.9;
const HP: f32 = 120.0;
const INVINCIBILITY: f32 = 0.35;
const SPEED: f32 = 120.0;

const IDLE_FRAMES: [u32; 4] = [0, 1, 2, 1];
const IDLE_ANIM: f32 = 0.15;

const HIT_DURATION: f32 = 0.18;
const HIT_KNOCKBACK: f32 = 140.0;
const WALL_MARGIN: f32 = 40.0;

const ATTACK_FRAMES: u32 = 6;
const ATTACK_ANIM: f32 = 0.11;
const ATTACK_COOLDOWN: f32 = 1.4;
const ATTACK_RANGE: f32 = 420.0;
const BOMB_DROP: f32 = 60.0;
const MISSILE_MUZZLE: f32 = 40.0;

const BACKRUN_FRAMES: u32 = 5;
const BACKRUN_ANIM: f32 = 0.12;
const BACKRUN_DISTANCE: f32 = 240.0;
const BACKRUN_HEIGHT: f32 = 120.0;
const BACKRUN_DURATION: f32 = 0.75;
const BACKRUN_TRIGGER: f32 = 90.0;
const BACKRUN_MARGIN: f32 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Volley {
    Bomb,
    Missile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KingState {
    #[default]
    Idle,
    Hit,
    Backrun,
    Attack(Volley),
}

/// Every sheet and projectile sprite the king switches between.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheets {
    pub idle: SpriteHandle,
    pub hit: SpriteHandle,
    pub backrun: SpriteHandle,
    pub attack: SpriteHandle,
    pub bomb: SpriteHandle,
    pub explosion: SpriteHandle,
    pub missile: SpriteHandle,
}

#[derive(Debug, Clone)]
pub struct GoblinKingBrain {
    sheets: Sheets,
    rng: SmallRng,
    state: KingState,
    face: f32,
    anim_timer: f32,
    frame_index: u32,
    hit_timer: f32,
    cooldown: f32,
    fired: bool,
    last_hp: f32,
}

impl GoblinKingBrain {
    /// Idle brain with its own roll source.
    #[must_use]
    pub fn new(sheets: Sheets, rng: SmallRng) -> Self {
        Self {
            sheets,
            rng,
            state: KingState::Idle,
            face: -1.0,
            anim_timer: 0.0,
            frame_index: 0,
            hit_timer: 0.0,
            cooldown: ATTACK_COOLDOWN,
            fired: false,
            last_hp: HP,
        }
    }

    /// What the king is doing this frame.
    #[must_use]
    pub fn state(&self) -> KingState {
        self.state
    }

    fn reset_animation(&mut self, owner: &mut GameObject, sheet: SpriteHandle, frame: u32) {
        set_sheet(owner, &sheet);
        self.anim_timer = 0.0;
        self.frame_index = 0;
        set_frame(owner, frame);
    }

    fn enter_idle(&mut self, owner: &mut GameObject) {
        self.state = KingState::Idle;
        self.reset_animation(owner, self.sheets.idle.clone(), IDLE_FRAMES[0]);
    }

    /// Staggers the king away from what it faces. Ignored while already
    /// staggered.
    fn enter_hit(&mut self, owner: &mut GameObject) {
        if self.state == KingState::Hit {
            return;
        }
        debug!(king = %owner.id(), from = ?self.state, "staggered");
        self.state = KingState::Hit;
        self.hit_timer = HIT_DURATION;
        self.reset_animation(owner, self.sheets.hit.clone(), 0);
        if let Some(movement) = movement(owner) {
            movement.cancel_path();
            movement.stop();
        }
        let arena = owner.frame().arena;
        let at = position(owner);
        let x = (at.x - self.face * HIT_KNOCKBACK).clamp(WALL_MARGIN, (arena.x - WALL_MARGIN).max(WALL_MARGIN));
        set_position(owner, Vec2::new(x, at.y));
    }

    fn is_hit(&self, _owner: &GameObject) -> bool {
        self.state == KingState::Hit
    }

    fn recover(&mut self, owner: &mut GameObject) -> Status {
        self.hit_timer -= owner.frame().dt;
        if self.hit_timer > 0.0 {
            return Status::Running;
        }
        self.enter_idle(owner);
        Status::Success
    }

    fn is_backrunning(&self, _owner: &GameObject) -> bool {
        self.state == KingState::Backrun
    }

    fn backrun(&mut self, owner: &mut GameObject) -> Status {
        self.anim_timer += owner.frame().dt;
        if self.anim_timer >= BACKRUN_ANIM {
            self.anim_timer -= BACKRUN_ANIM;
            self.frame_index = (self.frame_index + 1) % BACKRUN_FRAMES;
            set_frame(owner, self.frame_index);
        }
        Status::Running
    }

    fn end_backrun(&mut self, owner: &mut GameObject) {
        if self.state == KingState::Backrun {
            self.enter_idle(owner);
        }
    }

    fn is_attacking(&self, _owner: &GameObject) -> bool {
        matches!(self.state, KingState::Attack(_))
    }

    fn run_attack(&mut self, owner: &mut GameObject) -> Status {
        let KingState::Attack(volley) = self.state else {
            return Status::Fail;
        };
        self.anim_timer += owner.frame().dt;
        if self.anim_timer >= ATTACK_ANIM {
            self.anim_timer -= ATTACK_ANIM;
            self.frame_index += 1;
            if self.frame_index >= ATTACK_FRAMES {
                self.enter_idle(owner);
                return Status::Success;
            }
            set_frame(owner, self.frame_index);
        }
        if !self.fired && self.frame_index == ATTACK_FRAMES - 1 {
            self.fire(owner, volley);
        }
        Status::Running
    }

    fn fire(&mut self, owner: &mut GameObject, volley: Volley) {
        self.fired = true;
        let at = position(owner);
        let face = self.face;
        trace!(king = %owner.id(), ?volley, "volley");
        match volley {
            Volley::Bomb => {
                let (bomb, explosion) = (self.sheets.bomb.clone(), self.sheets.explosion.clone());
                owner.defer(Box::new(move |owner| {
                    let shot = projectiles::bomb(bomb, explosion, at, at.y - BOMB_DROP, face)?;
                    owner.spawn(ACTOR_DEPTH, shot);
                    Ok(())
                }));
            }
            Volley::Missile => {
                let sprite = self.sheets.missile.clone();
                owner.defer(Box::new(move |owner| {
                    let shot = projectiles::missile(sprite, at + Vec2::new(face * MISSILE_MUZZLE, 0.0), face)?;
                    owner.spawn(ACTOR_DEPTH, shot);
                    Ok(())
                }));
            }
        }
    }

    /// Idles, faces the target and lets the attack cooldown recover.
    fn idle(&mut self, owner: &mut GameObject) -> Status {
        let dt = owner.frame().dt;
        if let Some(movement) = movement(owner) {
            movement.stop();
        }
        self.anim_timer += dt;
        if self.anim_timer >= IDLE_ANIM {
            self.anim_timer -= IDLE_ANIM;
            self.frame_index = (self.frame_index + 1) % IDLE_FRAMES.len() as u32;
            set_frame(owner, IDLE_FRAMES[self.frame_index as usize]);
        }
        self.cooldown = (self.cooldown + dt).min(ATTACK_COOLDOWN);

        if let Some(target) = living_target(owner) {
            self.face = if target.position.x < position(owner).x { -1.0 } else { 1.0 };
            let face = self.face;
            if let Some(movement) = movement(owner) {
                movement.face_toward(face);
            }
        }
        Status::Success
    }

    fn target_distance(owner: &GameObject) -> Option<f32> {
        living_target(owner).map(|t| t.position.distance(position(owner)))
    }

    fn backrun_landing(&self, owner: &GameObject) -> f32 {
        position(owner).x - self.face * BACKRUN_DISTANCE
    }

    fn has_backrun_room(&self, owner: &GameObject) -> bool {
        let x = self.backrun_landing(owner);
        BACKRUN_MARGIN < x && x < owner.frame().arena.x - BACKRUN_MARGIN
    }

    fn should_backrun(&self, owner: &GameObject) -> bool {
        Self::target_distance(owner).is_some_and(|d| d < BACKRUN_TRIGGER) && self.has_backrun_room(owner)
    }

    fn begin_backrun(&mut self, owner: &mut GameObject) -> Status {
        self.state = KingState::Backrun;
        self.reset_animation(owner, self.sheets.backrun.clone(), 0);
        let from = position(owner);
        let to = Vec2::new(self.backrun_landing(owner), from.y);
        let face = self.face;
        if let Some(movement) = movement(owner) {
            movement.start_parabolic(
                from,
                to,
                BACKRUN_HEIGHT,
                BACKRUN_DURATION,
                Some(notify::<Self>(Self::end_backrun)),
            );
            movement.face_toward(face);
        }
        Status::Running
    }

    fn can_attack(&self, owner: &GameObject) -> bool {
        self.cooldown >= ATTACK_COOLDOWN
            && owner
                .get::<PerceptionComponent>()
                .and_then(|p| p.sense(owner))
                .is_some()
    }

    /// Cornered, the king always bombs; otherwise it picks at random.
    fn begin_attack(&mut self, owner: &mut GameObject) -> Status {
        let cornered = Self::target_distance(owner).is_some_and(|d| d < BACKRUN_TRIGGER);
        let volley = if cornered || self.rng.gen_bool(0.5) { Volley::Bomb } else { Volley::Missile };
        let sheet = match volley {
            Volley::Bomb => self.sheets.attack.clone(),
            Volley::Missile => self.sheets.missile.clone(),
        };
        self.state = KingState::Attack(volley);
        self.reset_animation(owner, sheet, 0);
        self.cooldown = 0.0;
        self.fired = false;
        if let Some(movement) = movement(owner) {
            movement.stop();
        }
        Status::Running
    }
}

impl Component for GoblinKingBrain {
    fn type_name() -> &'static str {
        "GoblinKingBrain"
    }

    fn update(&mut self, owner: &mut GameObject) -> Result<(), ComponentError> {
        let hp = owner.get::<CombatComponent>().map_or(self.last_hp, CombatComponent::hp);
        if hp < self.last_hp && hp > 0.0 {
            self.enter_hit(owner);
        }
        self.last_hp = hp;
        Ok(())
    }

    fn handle_collision(&mut self, owner: &mut GameObject, other: &mut GameObject) -> Result<(), ComponentError> {
        if group_of(other).intersects(CollisionGroup::PLAYER) {
            self.enter_hit(owner);
        }
        Ok(())
    }
}

fn tree() -> BehaviorTree<GameObject> {
    BehaviorTree::new(
        KIND,
        Node::selector(
            "GoblinKingSelector",
            vec![
                Node::sequence(
                    "HandleHit",
                    vec![
                        Node::condition("IsHit", check::<GoblinKingBrain>(GoblinKingBrain::is_hit)),
                        Node::action("Recover", think::<GoblinKingBrain>(GoblinKingBrain::recover)),
                    ],
                ),
                Node::sequence(
                    "HandleBackrun",
                    vec![
                        Node::condition("IsBackrunning", check::<GoblinKingBrain>(GoblinKingBrain::is_backrunning)),
                        Node::action("Backrun", think::<GoblinKingBrain>(GoblinKingBrain::backrun)),
                    ],
                ),
                Node::sequence(
                    "HandleAttack",
                    vec![
                        Node::condition("IsAttacking", check::<GoblinKingBrain>(GoblinKingBrain::is_attacking)),
                        Node::action("RunAttack", think::<GoblinKingBrain>(GoblinKingBrain::run_attack)),
                    ],
                ),
                Node::sequence(
                    "Engage",
                    vec![
                        Node::action("Idle", think::<GoblinKingBrain>(GoblinKingBrain::idle)),
                        Node::selector(
                            "ChooseMove",
                            vec![
                                Node::sequence(
                                    "Retreat",
                                    vec![
                                        Node::condition(
                                            "ShouldBackrun",
                                            check::<GoblinKingBrain>(GoblinKingBrain::should_backrun),
                                        ),
                                        Node::action(
                                            "BeginBackrun",
                                            think::<GoblinKingBrain>(GoblinKingBrain::begin_backrun),
                                        ),
                                    ],
                                ),
                                Node::sequence(
                                    "Volley",
                                    vec![
                                        Node::condition("CanAttack", check::<GoblinKingBrain>(GoblinKingBrain::can_attack)),
                                        Node::action(
                                            "BeginAttack",
                                            think::<GoblinKingBrain>(GoblinKingBrain::begin_attack),
                                        ),
                                    ],
                                ),
                            ],
                        ),
                    ],
                ),
            ],
        ),
    )
}

fn assemble(sheets: Sheets, rng: SmallRng, at: Vec2) -> Result<GameObject, ComponentError> {
    let size = sheets.idle.frame_size() * SCALE;
    let mut movement = MovementComponent::new(SPEED);
    movement.face_toward(-1.0);
    let mut sprite = SpriteComponent::new(sheets.idle.clone()).facing_left();
    sprite.draw_size = Some(size);
    GameObject::new(KIND)
        .attach(MonsterTag::new(KIND))?
        .attach(Transform2D::new(at, size))?
        .attach(sprite)?
        .attach(
            CollisionComponent::new(CollisionGroup::MONSTER, CollisionGroup::PLAYER | CollisionGroup::PROJECTILE)
                .with_size(size * COLLISION_SCALE),
        )?
        .attach(CombatComponent::new(HP).with_invincibility(INVINCIBILITY))?
        .attach(movement)?
        .attach(PerceptionComponent::new(ATTACK_RANGE))?
        .attach(HudComponent {
            bar_size: Vec2::new(90.0, 10.0),
            ..HudComponent::default()
        })?
        .attach(GoblinKingBrain::new(sheets, rng))?
        .attach(BehaviorComponent::new(tree()))
}

/// # Errors
///
/// [`SimError::Resource`] when any of the king's sheets is missing.
pub fn spawn(ctx: &mut SpawnContext<'_>) -> Result<GameObject, SimError> {
    let sheets = Sheets {
        idle: ctx.sprites.sprite("goblin_king_idle")?,
        hit: ctx.sprites.sprite("goblin_king_hit")?,
        backrun: ctx.sprites.sprite("goblin_king_backrun")?,
        attack: ctx.sprites.sprite("goblin_king_attack")?,
        bomb: ctx.sprites.sprite("bomb")?,
        explosion: ctx.sprites.sprite("explosion")?,
        missile: ctx.sprites.sprite("missile")?,
    };
    let at = random_point(&mut ctx.rng, 200.0..=ctx.arena.x - 200.0, 220.0..=520.0);
    let rng = SmallRng::seed_from_u64(ctx.rng.r#gen());
    Ok(assemble(sheets, rng, at)?)
}

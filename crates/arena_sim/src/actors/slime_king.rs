//! Slime King: the first stage boss.
//!
//! Hops like a slime, charges a close player, and from mid range leaps onto
//! the player. While winding up and airborne the king cannot be touched;
//! landing hits harder than a charge for a short window. A projectile hit
//! interrupts whatever it was doing.

use arena_behavior::{BehaviorTree, Node, Status};
use arena_component::{Component, ComponentError, GameObject, SpriteHandle};
use arena_math::{Transform2D, Vec2};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::slime::{HopProfile, HopStep, Hopper};
use super::{check, movement, notify, position, random_point, set_frame, set_position, set_sheet, think};
use crate::components::{
    BehaviorComponent, CollisionComponent, CollisionGroup, CombatComponent, ContactDamage, HudComponent, MonsterTag,
    MovementComponent, PerceptionComponent, SpriteComponent, group_of, living_target, target_distance,
};
use crate::error::SimError;
use crate::registry::SpawnContext;

pub const KIND: &str = "SlimeKing";

const SCALE: f32 = 6.0;
const COLLISION_SCALE: f32 = 0.8;
const HP: f32 = 50.0;
const SPEED: f32 = 70.0;

const IDLE_FRAMES: &[u32] = &[1, 2, 3];
const IDLE_ANIM_SPEED: f32 = 0.14;

const ATTACK_FRAMES: &[u32] = &[0, 1, 2, 3, 4, 5];
const ATTACK_STOP_INDEX: usize = 4;
const ATTACK_ANIM_SPEED: f32 = 0.12;
const ATTACK_COOLDOWN: f32 = 2.5;
const ATTACK_DAMAGE: f32 = 25.0;
const ATTACK_HOLD: f32 = 1.0;
const ATTACK_DASH: f32 = 0.35;
const CLOSE_ATTACK_RANGE: f32 = 180.0;

const HOP: HopProfile = HopProfile {
    distance: 55.0,
    height: 16.0,
    duration: 0.32,
    interval: 1.4,
    prepare: 0.5,
};

const JUMP_COOLDOWN: f32 = 4.0;
const JUMP_CHANCE: f32 = 0.2;
const JUMP_CHANCE_ENRAGED: f32 = 0.35;
const JUMP_MIN_RANGE: f32 = 220.0;
const JUMP_MAX_RANGE: f32 = 520.0;
const JUMP_PREPARE: f32 = 1.0;
const JUMP_HEIGHT: f32 = 120.0;
const JUMP_DURATION: f32 = 1.0;
const JUMP_WINDUP_FRAMES: &[u32] = &[3];
const JUMP_AIR_FRAMES: &[u32] = &[3, 2, 1, 0];
const FALL_ANIM_SPEED: f32 = 0.08;
const LANDING_DAMAGE: f32 = 60.0;
const LANDING_WINDOW: f32 = 0.2;

const HIT_KNOCKBACK: f32 = 10.0;

fn default_mask() -> CollisionGroup {
    CollisionGroup::PLAYER | CollisionGroup::PROJECTILE
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChargePhase {
    #[default]
    None,
    Prepare,
    Hold,
    Dash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeapPhase {
    #[default]
    None,
    Prepare,
    Air,
    Landing,
}

/// The king's three sheets.
#[derive(Debug, Clone, PartialEq)]
pub struct KingSheets {
    pub idle: SpriteHandle,
    pub attack: SpriteHandle,
    pub back: SpriteHandle,
}

/// Slime King AI state.
#[derive(Debug, Clone)]
pub struct SlimeKingBrain {
    sheets: KingSheets,
    rng: SmallRng,
    hopper: Hopper,
    frames: &'static [u32],
    frame_index: usize,
    anim_timer: f32,

    charge: ChargePhase,
    charge_cooldown: f32,
    charge_timer: f32,
    dash_started: bool,
    dash_from: Vec2,
    dash_to: Vec2,

    leap: LeapPhase,
    leap_cooldown: f32,
    leap_timer: f32,
    leap_target: Vec2,
    landing_timer: f32,
}

impl SlimeKingBrain {
    /// Brain that starts hopping, with its own roll source.
    #[must_use]
    pub fn new(sheets: KingSheets, rng: SmallRng, y_base: f32, hop_timer: f32) -> Self {
        Self {
            sheets,
            rng,
            hopper: Hopper::new(HOP, y_base, hop_timer),
            frames: IDLE_FRAMES,
            frame_index: 0,
            anim_timer: 0.0,
            charge: ChargePhase::None,
            charge_cooldown: ATTACK_COOLDOWN,
            charge_timer: 0.0,
            dash_started: false,
            dash_from: Vec2::ZERO,
            dash_to: Vec2::ZERO,
            leap: LeapPhase::None,
            leap_cooldown: JUMP_COOLDOWN,
            leap_timer: 0.0,
            leap_target: Vec2::ZERO,
            landing_timer: 0.0,
        }
    }

    /// Current dash phase.
    #[must_use]
    pub fn charge_phase(&self) -> ChargePhase {
        self.charge
    }

    /// Current jump attack phase.
    #[must_use]
    pub fn leap_phase(&self) -> LeapPhase {
        self.leap
    }

    fn animate(&mut self, owner: &mut GameObject, sheet: &SpriteHandle, frames: &'static [u32]) {
        set_sheet(owner, sheet);
        self.frames = frames;
        self.frame_index = 0;
        self.show(owner);
    }

    fn idle(&mut self, owner: &mut GameObject) {
        let sheet = self.sheets.idle.clone();
        self.animate(owner, &sheet, IDLE_FRAMES);
    }

    fn show(&mut self, owner: &mut GameObject) {
        let frame = self.frames.get(self.frame_index).copied().unwrap_or(0);
        set_frame(owner, frame);
    }

    fn show_index(&mut self, owner: &mut GameObject, index: usize) {
        self.frame_index = index.min(self.frames.len().saturating_sub(1));
        self.show(owner);
    }

    fn advance_idle(&mut self, owner: &mut GameObject, dt: f32) {
        self.anim_timer += dt;
        if self.anim_timer >= IDLE_ANIM_SPEED {
            self.anim_timer -= IDLE_ANIM_SPEED;
            self.frame_index = (self.frame_index + 1) % self.frames.len().max(1);
            self.show(owner);
        }
    }

    fn set_mask(owner: &mut GameObject, mask: CollisionGroup) {
        if let Some(collision) = owner.get_mut::<CollisionComponent>() {
            collision.mask = mask;
        }
    }

    fn face(owner: &mut GameObject, dx: f32) {
        if let Some(movement) = movement(owner) {
            movement.face_toward(dx);
        }
    }

    fn is_leaping(&self, _owner: &GameObject) -> bool {
        self.leap != LeapPhase::None
    }

    fn can_leap(&self, owner: &GameObject) -> bool {
        self.leap == LeapPhase::None
            && self.charge == ChargePhase::None
            && !self.hopper.is_busy()
            && self.leap_cooldown >= JUMP_COOLDOWN
            && target_distance(owner).is_some_and(|d| (JUMP_MIN_RANGE..=JUMP_MAX_RANGE).contains(&d))
    }

    /// Rolls for the leap; fails the branch on a miss so the tree falls
    /// through to the next option.
    fn begin_leap(&mut self, owner: &mut GameObject) -> Status {
        let Some(target) = living_target(owner) else {
            return Status::Fail;
        };
        let enraged = owner
            .get::<CombatComponent>()
            .is_some_and(|c| c.hp() <= c.max_hp() * 0.5);
        let chance = if enraged { JUMP_CHANCE_ENRAGED } else { JUMP_CHANCE };
        if self.rng.r#gen::<f32>() > chance {
            return Status::Fail;
        }

        self.leap = LeapPhase::Prepare;
        self.leap_cooldown = 0.0;
        self.leap_timer = 0.0;
        self.leap_target = target.position;
        let back = self.sheets.back.clone();
        self.animate(owner, &back, JUMP_WINDUP_FRAMES);
        Self::face(owner, target.position.x - position(owner).x);
        Self::set_mask(owner, CollisionGroup::NONE);
        debug!(king = %owner.id(), target = ?target.position, "leap wind-up");
        Status::Running
    }

    fn abort_leap(&mut self, owner: &mut GameObject) {
        self.leap = LeapPhase::None;
        self.leap_cooldown = 0.0;
        Self::set_mask(owner, default_mask());
        self.idle(owner);
    }

    fn run_leap(&mut self, owner: &mut GameObject) -> Status {
        let dt = owner.frame().dt;
        match self.leap {
            LeapPhase::Prepare => {
                if let Some(target) = living_target(owner) {
                    let offset = target.position - position(owner);
                    if !(JUMP_MIN_RANGE..=JUMP_MAX_RANGE).contains(&offset.length()) {
                        self.abort_leap(owner);
                        return Status::Success;
                    }
                    self.leap_target = target.position;
                    Self::face(owner, offset.x);
                }
                self.leap_timer += dt;
                if self.leap_timer >= JUMP_PREPARE {
                    self.leap = LeapPhase::Air;
                    self.leap_timer = 0.0;
                    self.anim_timer = 0.0;
                    let back = self.sheets.back.clone();
                    self.animate(owner, &back, JUMP_AIR_FRAMES);
                    let (from, to) = (position(owner), self.leap_target);
                    if let Some(movement) = movement(owner) {
                        movement.start_parabolic(from, to, JUMP_HEIGHT, JUMP_DURATION, Some(notify::<Self>(Self::land_leap)));
                    }
                }
                Status::Running
            }
            LeapPhase::Air => {
                self.leap_timer += dt;
                if self.leap_timer >= JUMP_DURATION * 0.5 {
                    self.anim_timer += dt;
                    if self.anim_timer >= FALL_ANIM_SPEED && self.frame_index + 1 < self.frames.len() {
                        self.anim_timer -= FALL_ANIM_SPEED;
                        let next = self.frame_index + 1;
                        self.show_index(owner, next);
                    }
                }
                Status::Running
            }
            LeapPhase::Landing if self.landing_timer > 0.0 => Status::Running,
            LeapPhase::Landing => {
                self.leap = LeapPhase::None;
                self.idle(owner);
                Status::Success
            }
            LeapPhase::None => Status::Fail,
        }
    }

    fn land_leap(&mut self, owner: &mut GameObject) {
        self.leap = LeapPhase::Landing;
        self.landing_timer = LANDING_WINDOW;
        let last = self.frames.len().saturating_sub(1);
        self.show_index(owner, last);
        Self::set_mask(owner, default_mask());
        self.hopper.interrupt(position(owner).y);
        if let Some(contact) = owner.get_mut::<ContactDamage>() {
            contact.damage = LANDING_DAMAGE;
        }
        debug!(king = %owner.id(), at = ?position(owner), "leap landed");
    }

    fn is_charging(&self, _owner: &GameObject) -> bool {
        self.charge != ChargePhase::None
    }

    fn can_charge(&self, owner: &GameObject) -> bool {
        self.charge == ChargePhase::None
            && self.leap == LeapPhase::None
            && !self.hopper.is_busy()
            && self.charge_cooldown >= ATTACK_COOLDOWN
            && target_distance(owner).is_some_and(|d| d <= CLOSE_ATTACK_RANGE)
    }

    fn begin_charge(&mut self, owner: &mut GameObject) -> Status {
        let Some(target) = living_target(owner) else {
            return Status::Fail;
        };
        self.charge = ChargePhase::Prepare;
        self.charge_cooldown = 0.0;
        self.charge_timer = 0.0;
        self.anim_timer = 0.0;
        self.dash_started = false;
        self.dash_from = position(owner);
        self.dash_to = target.position;
        let attack = self.sheets.attack.clone();
        self.animate(owner, &attack, ATTACK_FRAMES);
        Self::face(owner, target.position.x - self.dash_from.x);
        Status::Running
    }

    fn run_charge(&mut self, owner: &mut GameObject) -> Status {
        let dt = owner.frame().dt;
        match self.charge {
            ChargePhase::Prepare => {
                self.anim_timer += dt;
                if self.anim_timer >= ATTACK_ANIM_SPEED {
                    self.anim_timer -= ATTACK_ANIM_SPEED;
                    if self.frame_index < ATTACK_STOP_INDEX {
                        let next = self.frame_index + 1;
                        self.show_index(owner, next);
                    }
                    if self.frame_index >= ATTACK_STOP_INDEX {
                        self.charge = ChargePhase::Hold;
                        self.charge_timer = 0.0;
                    }
                }
                Status::Running
            }
            ChargePhase::Hold => {
                self.charge_timer += dt;
                if self.charge_timer >= ATTACK_HOLD {
                    self.charge = ChargePhase::Dash;
                    self.show_index(owner, ATTACK_FRAMES.len() - 1);
                }
                Status::Running
            }
            ChargePhase::Dash if !self.dash_started => {
                self.dash_started = true;
                let (from, to) = (self.dash_from, self.dash_to);
                if let Some(movement) = movement(owner) {
                    movement.start_linear(from, to, ATTACK_DASH, Some(notify::<Self>(Self::finish_charge)));
                }
                Status::Running
            }
            ChargePhase::Dash if owner.get::<MovementComponent>().is_some_and(MovementComponent::is_path_active) => {
                Status::Running
            }
            _ => Status::Success,
        }
    }

    fn finish_charge(&mut self, owner: &mut GameObject) {
        self.charge = ChargePhase::None;
        self.dash_started = false;
        self.hopper.interrupt(position(owner).y);
        self.idle(owner);
    }

    fn land_hop(&mut self, owner: &mut GameObject) {
        self.hopper.land(owner);
        self.show_index(owner, 0);
    }

    fn handle_hop(&mut self, owner: &mut GameObject) -> Status {
        let dt = owner.frame().dt;
        if self.charge == ChargePhase::None && self.leap == LeapPhase::None {
            self.charge_cooldown = (self.charge_cooldown + dt).min(ATTACK_COOLDOWN);
            self.leap_cooldown = (self.leap_cooldown + dt).min(JUMP_COOLDOWN);
        }
        match self.hopper.tick(owner, dt, || notify::<Self>(Self::land_hop)) {
            HopStep::Launched | HopStep::Airborne => {
                if self.frames != IDLE_FRAMES {
                    self.idle(owner);
                }
                self.show_index(owner, 0);
            }
            HopStep::Preparing { started: true } => {
                self.anim_timer = 0.0;
                self.idle(owner);
            }
            HopStep::Preparing { started: false } => self.advance_idle(owner, dt),
            HopStep::Resting => {
                let idle_sheet = owner
                    .get::<SpriteComponent>()
                    .is_some_and(|s| s.sprite.key == self.sheets.idle.key);
                if !idle_sheet || self.frames != IDLE_FRAMES {
                    self.idle(owner);
                }
                self.advance_idle(owner, dt);
            }
        }
        Status::Running
    }

    /// Knocked out of any attack or hop by a projectile.
    fn enter_hit(&mut self, owner: &mut GameObject, attacker: &GameObject) {
        if owner.get::<CombatComponent>().is_some_and(CombatComponent::is_dead) {
            return;
        }
        if let Some(movement) = movement(owner) {
            movement.cancel_path();
        }
        self.charge = ChargePhase::None;
        self.dash_started = false;
        if self.leap != LeapPhase::None {
            self.leap = LeapPhase::None;
            self.leap_cooldown = 0.0;
            Self::set_mask(owner, default_mask());
        }
        self.idle(owner);

        let at = position(owner);
        let push = if position(attacker).x < at.x { HIT_KNOCKBACK } else { -HIT_KNOCKBACK };
        set_position(owner, at + Vec2::new(push, 0.0));
        self.hopper.interrupt(at.y);
    }
}

impl Component for SlimeKingBrain {
    fn type_name() -> &'static str {
        "SlimeKingBrain"
    }

    fn update(&mut self, owner: &mut GameObject) -> Result<(), ComponentError> {
        if self.landing_timer > 0.0 {
            self.landing_timer -= owner.frame().dt;
            if self.landing_timer <= 0.0
                && let Some(contact) = owner.get_mut::<ContactDamage>()
            {
                contact.damage = ATTACK_DAMAGE;
            }
        }
        Ok(())
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
            "SlimeKingSelector",
            vec![
                Node::sequence(
                    "HandleJumpAttack",
                    vec![
                        Node::condition("IsJumpAttacking", check::<SlimeKingBrain>(SlimeKingBrain::is_leaping)),
                        Node::action("RunJumpAttack", think::<SlimeKingBrain>(SlimeKingBrain::run_leap)),
                    ],
                ),
                Node::sequence(
                    "StartJumpAttack",
                    vec![
                        Node::condition("CanStartJumpAttack", check::<SlimeKingBrain>(SlimeKingBrain::can_leap)),
                        Node::action("BeginJumpAttack", think::<SlimeKingBrain>(SlimeKingBrain::begin_leap)),
                    ],
                ),
                Node::sequence(
                    "HandleAttack",
                    vec![
                        Node::condition("IsAttacking", check::<SlimeKingBrain>(SlimeKingBrain::is_charging)),
                        Node::action("RunAttack", think::<SlimeKingBrain>(SlimeKingBrain::run_charge)),
                    ],
                ),
                Node::sequence(
                    "StartAttack",
                    vec![
                        Node::condition("CanAttack", check::<SlimeKingBrain>(SlimeKingBrain::can_charge)),
                        Node::action("BeginAttack", think::<SlimeKingBrain>(SlimeKingBrain::begin_charge)),
                    ],
                ),
                Node::action("HandleHop", think::<SlimeKingBrain>(SlimeKingBrain::handle_hop)),
            ],
        ),
    )
}

fn assemble(sheets: KingSheets, rng: SmallRng, at: Vec2, hop_timer: f32) -> Result<GameObject, ComponentError> {
    let size = sheets.idle.frame_size() * SCALE;
    let mut movement = MovementComponent::new(SPEED);
    movement.face_toward(-1.0);
    let mut sprite = SpriteComponent::new(sheets.idle.clone()).facing_left();
    sprite.set_frame(IDLE_FRAMES[0]);
    GameObject::new(KIND)
        .attach(MonsterTag::new(KIND))?
        .attach(Transform2D::new(at, size))?
        .attach(sprite)?
        .attach(CollisionComponent::new(CollisionGroup::MONSTER, default_mask()).with_size(size * COLLISION_SCALE))?
        .attach(CombatComponent::new(HP))?
        .attach(movement)?
        .attach(PerceptionComponent::new(JUMP_MAX_RANGE))?
        .attach(HudComponent {
            bar_size: Vec2::new(80.0, 8.0),
            ..HudComponent::default()
        })?
        .attach(SlimeKingBrain::new(sheets, rng, at.y, hop_timer))?
        .attach(ContactDamage::body(ATTACK_DAMAGE, CollisionGroup::PLAYER))?
        .attach(BehaviorComponent::new(tree()))
}

/// # Errors
///
/// [`SimError::Resource`] when one of the king's sheets is missing.
pub fn spawn(ctx: &mut SpawnContext<'_>) -> Result<GameObject, SimError> {
    let sheets = KingSheets {
        idle: ctx.sprites.sprite("slime_king_idle")?,
        attack: ctx.sprites.sprite("slime_king_attack")?,
        back: ctx.sprites.sprite("slime_king_back")?,
    };
    let at = random_point(&mut ctx.rng, 150.0..=ctx.arena.x - 150.0, 1170.0..=ctx.arena.y - 220.0);
    let hop_timer = ctx.rng.gen_range(0.0..HOP.interval);
    let rng = SmallRng::seed_from_u64(ctx.rng.r#gen());
    Ok(assemble(sheets, rng, at, hop_timer)?)
}

//! Slime: hops back and forth, and lunges at a player who comes close.
//!
//! The hop cycle lives in [`Hopper`], which the slime king reuses with a
//! heavier [`HopProfile`].

use arena_behavior::{BehaviorTree, Node, Status};
use arena_component::{Component, ComponentError, Deferred, GameObject, SpriteHandle};
use arena_math::{Transform2D, Vec2};
use rand::Rng;
use tracing::trace;

use super::{check, movement, notify, position, random_point, set_frame, think};
use crate::components::{
    BehaviorComponent, CollisionComponent, CollisionGroup, CombatComponent, ContactDamage, HudComponent, MonsterTag,
    MotionMode, MovementComponent, PerceptionComponent, SpriteComponent, living_target,
};
use crate::error::SimError;
use crate::registry::SpawnContext;

pub const KIND: &str = "Slime";

const FRAME_COUNT: u32 = 6;
const SCALE: f32 = 2.0;
const HP: f32 = 10.0;
const CONTACT_DAMAGE: f32 = 10.0;

const AIR_FRAME: u32 = 1;
const LAND_FRAME: u32 = 0;
const ANIM_SPEED: f32 = 0.12;

const ATTACK_RANGE: f32 = 100.0;
const ATTACK_COOLDOWN: f32 = 3.0;
const ATTACK_ANIM_SPEED: f32 = 0.2;
const ATTACK_HOLD_FRAME: u32 = 4;
const ATTACK_HOLD: f32 = 0.5;
const ATTACK_DASH: f32 = 0.2;

pub const HOP: HopProfile = HopProfile {
    distance: 40.0,
    height: 12.0,
    duration: 0.25,
    interval: 1.0,
    prepare: 0.4,
};

/// Shape and rhythm of an idle hop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HopProfile {
    pub distance: f32,
    pub height: f32,
    pub duration: f32,
    /// Seconds on the ground between hops.
    pub interval: f32,
    /// Lead time before a hop during which the wind-up plays.
    pub prepare: f32,
}

/// What a [`Hopper`] tick did, for the caller's animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HopStep {
    Launched,
    Airborne,
    /// Winding up; `started` is set on the first frame of the wind-up.
    Preparing { started: bool },
    Resting,
}

/// Alternating left/right hops along a fixed ground line.
#[derive(Debug, Clone, PartialEq)]
pub struct Hopper {
    pub profile: HopProfile,
    /// Direction of the last hop.
    pub dir: f32,
    /// Ground line hops start from and land on.
    pub y_base: f32,
    timer: f32,
    preparing: bool,
    hopping: bool,
}

impl Hopper {
    /// Hop cycle resting at `y_base` with `timer` seconds already elapsed.
    #[must_use]
    pub fn new(profile: HopProfile, y_base: f32, timer: f32) -> Self {
        Self {
            profile,
            dir: -1.0,
            y_base,
            timer,
            preparing: false,
            hopping: false,
        }
    }

    /// Winding up or in the air.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.preparing || self.hopping
    }

    /// Advances the cycle by `dt`. When a hop launches it reverses
    /// direction and starts a parabolic path whose completion runs
    /// `on_land()`.
    pub fn tick(&mut self, owner: &mut GameObject, dt: f32, on_land: impl FnOnce() -> Deferred) -> HopStep {
        let path_active = owner.get::<MovementComponent>().is_some_and(MovementComponent::is_path_active);
        if !self.hopping && !path_active {
            self.timer += dt;
        }
        let mut started = false;
        if !self.is_busy() && self.timer >= (self.profile.interval - self.profile.prepare).max(0.0) {
            self.preparing = true;
            started = true;
        }
        if self.timer >= self.profile.interval {
            self.timer -= self.profile.interval;
            self.dir = -self.dir;
            self.preparing = false;
            self.hopping = true;
            let x = position(owner).x;
            let profile = self.profile;
            let start = Vec2::new(x, self.y_base);
            let end = Vec2::new(x + self.dir * profile.distance, self.y_base);
            if let Some(movement) = movement(owner) {
                movement.start_parabolic(start, end, profile.height, profile.duration, Some(on_land()));
            }
            return HopStep::Launched;
        }
        if owner.get::<MovementComponent>().is_some_and(|m| m.mode() == MotionMode::Parabolic) {
            HopStep::Airborne
        } else if self.preparing {
            HopStep::Preparing { started }
        } else {
            HopStep::Resting
        }
    }

    /// Ends the hop and rests at the owner's current height.
    pub fn land(&mut self, owner: &GameObject) {
        self.hopping = false;
        self.preparing = false;
        self.y_base = position(owner).y;
    }

    /// Drops out of the cycle, for example after being knocked away.
    pub fn interrupt(&mut self, y_base: f32) {
        self.hopping = false;
        self.preparing = false;
        self.y_base = y_base;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LungePhase {
    #[default]
    None,
    Prepare,
    Hold,
    Dash,
}

/// Slime AI state.
#[derive(Debug, Clone, PartialEq)]
pub struct SlimeBrain {
    hopper: Hopper,
    phase: LungePhase,
    cooldown: f32,
    anim_timer: f32,
    hold_timer: f32,
    frame: u32,
    dash_started: bool,
    dash_from: Vec2,
    dash_to: Vec2,
}

impl SlimeBrain {
    /// Brain that starts hopping with the given phase.
    #[must_use]
    pub fn new(y_base: f32, hop_timer: f32) -> Self {
        Self {
            hopper: Hopper::new(HOP, y_base, hop_timer),
            phase: LungePhase::None,
            cooldown: ATTACK_COOLDOWN,
            anim_timer: 0.0,
            hold_timer: 0.0,
            frame: LAND_FRAME,
            dash_started: false,
            dash_from: Vec2::ZERO,
            dash_to: Vec2::ZERO,
        }
    }

    /// Current lunge phase.
    #[must_use]
    pub fn phase(&self) -> LungePhase {
        self.phase
    }

    fn show(&mut self, owner: &mut GameObject, frame: u32) {
        self.frame = frame;
        set_frame(owner, frame);
    }

    fn is_attacking(&self, _owner: &GameObject) -> bool {
        self.phase != LungePhase::None
    }

    fn can_attack(&self, owner: &GameObject) -> bool {
        self.phase == LungePhase::None
            && !self.hopper.is_busy()
            && self.cooldown >= ATTACK_COOLDOWN
            && owner
                .get::<PerceptionComponent>()
                .and_then(|p| p.sense(owner))
                .is_some()
    }

    fn begin_attack(&mut self, owner: &mut GameObject) -> Status {
        let Some(target) = living_target(owner) else {
            return Status::Fail;
        };
        self.phase = LungePhase::Prepare;
        self.anim_timer = 0.0;
        self.dash_started = false;
        self.dash_from = position(owner);
        self.dash_to = target.position;
        if let Some(movement) = movement(owner) {
            movement.face_toward(target.position.x - self.dash_from.x);
        }
        self.show(owner, 0);
        Status::Running
    }

    fn run_attack(&mut self, owner: &mut GameObject) -> Status {
        let dt = owner.frame().dt;
        match self.phase {
            LungePhase::Prepare => {
                self.anim_timer += dt;
                if self.anim_timer >= ATTACK_ANIM_SPEED {
                    self.anim_timer -= ATTACK_ANIM_SPEED;
                    let next = (self.frame + 1).min(ATTACK_HOLD_FRAME);
                    self.show(owner, next);
                    if next == ATTACK_HOLD_FRAME {
                        self.phase = LungePhase::Hold;
                        self.hold_timer = 0.0;
                    }
                }
                Status::Running
            }
            LungePhase::Hold => {
                self.show(owner, ATTACK_HOLD_FRAME);
                self.hold_timer += dt;
                if self.hold_timer >= ATTACK_HOLD {
                    self.phase = LungePhase::Dash;
                }
                Status::Running
            }
            LungePhase::Dash if !self.dash_started => {
                self.dash_started = true;
                let (from, to) = (self.dash_from, self.dash_to);
                if let Some(movement) = movement(owner) {
                    movement.start_linear(from, to, ATTACK_DASH, Some(notify::<Self>(Self::finish_dash)));
                }
                trace!(slime = %owner.id(), ?to, "lunge");
                Status::Running
            }
            LungePhase::Dash if owner.get::<MovementComponent>().is_some_and(MovementComponent::is_path_active) => {
                Status::Running
            }
            _ => Status::Success,
        }
    }

    fn finish_dash(&mut self, owner: &mut GameObject) {
        self.phase = LungePhase::None;
        self.cooldown = 0.0;
        self.dash_started = false;
        self.hopper.y_base = position(owner).y;
    }

    fn land(&mut self, owner: &mut GameObject) {
        self.hopper.land(owner);
        self.anim_timer = 0.0;
        self.show(owner, LAND_FRAME);
    }

    fn handle_hop(&mut self, owner: &mut GameObject) -> Status {
        let dt = owner.frame().dt;
        if self.phase == LungePhase::None {
            self.cooldown += dt;
        }
        match self.hopper.tick(owner, dt, || notify::<Self>(Self::land)) {
            HopStep::Launched | HopStep::Airborne => self.show(owner, AIR_FRAME),
            HopStep::Preparing { started: true } => {
                self.anim_timer = 0.0;
                self.show(owner, 0);
            }
            HopStep::Preparing { started: false } => {
                self.anim_timer += dt;
                if self.anim_timer >= ANIM_SPEED {
                    self.anim_timer -= ANIM_SPEED;
                    let next = (self.frame + 1) % FRAME_COUNT;
                    self.show(owner, next);
                }
            }
            HopStep::Resting => {
                self.anim_timer = 0.0;
                self.show(owner, LAND_FRAME);
            }
        }
        Status::Running
    }
}

impl Component for SlimeBrain {
    fn type_name() -> &'static str {
        "SlimeBrain"
    }
}

fn tree() -> BehaviorTree<GameObject> {
    BehaviorTree::new(
        KIND,
        Node::selector(
            "SlimeSelector",
            vec![
                Node::sequence(
                    "HandleAttack",
                    vec![
                        Node::condition("IsAttacking", check::<SlimeBrain>(SlimeBrain::is_attacking)),
                        Node::action("RunAttack", think::<SlimeBrain>(SlimeBrain::run_attack)),
                    ],
                ),
                Node::sequence(
                    "StartAttack",
                    vec![
                        Node::condition("CanAttack", check::<SlimeBrain>(SlimeBrain::can_attack)),
                        Node::action("BeginAttack", think::<SlimeBrain>(SlimeBrain::begin_attack)),
                    ],
                ),
                Node::action("HandleHop", think::<SlimeBrain>(SlimeBrain::handle_hop)),
            ],
        ),
    )
}

fn assemble(sheet: SpriteHandle, at: Vec2, hop_timer: f32) -> Result<GameObject, ComponentError> {
    let size = sheet.frame_size() * SCALE;
    let mut movement = MovementComponent::new(0.0);
    movement.face_toward(-1.0);
    GameObject::new(KIND)
        .attach(MonsterTag::new(KIND))?
        .attach(Transform2D::new(at, size))?
        .attach(SpriteComponent::new(sheet).facing_left())?
        .attach(CollisionComponent::new(
            CollisionGroup::MONSTER,
            CollisionGroup::PLAYER | CollisionGroup::PROJECTILE,
        ))?
        .attach(CombatComponent::new(HP))?
        .attach(movement)?
        .attach(PerceptionComponent::new(ATTACK_RANGE))?
        .attach(HudComponent::default())?
        .attach(SlimeBrain::new(at.y, hop_timer))?
        .attach(ContactDamage::body(CONTACT_DAMAGE, CollisionGroup::PLAYER))?
        .attach(BehaviorComponent::new(tree()))
}

/// # Errors
///
/// [`SimError::Resource`] when the slime sheet is missing.
pub fn spawn(ctx: &mut SpawnContext<'_>) -> Result<GameObject, SimError> {
    let sheet = ctx.sprites.sprite("blue_slime")?;
    let at = random_point(&mut ctx.rng, 100.0..=1100.0, 100.0..=600.0);
    let hop_timer = ctx.rng.gen_range(0.0..HOP.interval);
    Ok(assemble(sheet, at, hop_timer)?)
}

//! The player: keyboard-driven, with a melee swing, a fireball, and a
//! four-state locomotion machine.

use arena_behavior::{State, StateId, StateMachineError};
use arena_component::{GameObject, SpriteProvider};
use arena_math::{Transform2D, Vec2};
use tracing::debug;

use super::movement;
use crate::components::{
    ActorMachine, ActorStateMachine, AnimationComponent, CollisionComponent, CollisionGroup, CombatComponent,
    FireballSkill, HudComponent, InputComponent, MeleeAttack, MovementComponent, PlayerStats, SpriteComponent,
    StateEvent,
};
use crate::config::SimConfig;
use crate::error::SimError;
use crate::input::Key;
use crate::progress::PlayerProgress;

pub const LABEL: &str = "Player";
pub const START: Vec2 = Vec2::new(400.0, 300.0);

const SIZE: Vec2 = Vec2::new(32.0, 64.0);
const SPEED: f32 = 200.0;
const HP: f32 = 100.0;
const MELEE_DAMAGE: f32 = 5.0;
const IDLE_FPS: f32 = 2.0;
const RUN_FPS: f32 = 6.0;

pub const IDLE: StateId = "Idle";
pub const RUN: StateId = "Run";
pub const ATTACK: StateId = "Attack";
pub const DIE: StateId = "Die";

fn set_animation(owner: &mut GameObject, fps: Option<f32>) {
    if let Some(animation) = owner.get_mut::<AnimationComponent>() {
        match fps {
            Some(fps) => {
                animation.fps = fps;
                animation.playing = true;
            }
            None => animation.playing = false,
        }
    }
}

struct Idle;

impl State<GameObject, StateEvent> for Idle {
    fn name(&self) -> StateId {
        IDLE
    }

    fn enter(&mut self, owner: &mut GameObject, _event: Option<&StateEvent>) {
        set_animation(owner, Some(IDLE_FPS));
    }
}

struct Run;

impl State<GameObject, StateEvent> for Run {
    fn name(&self) -> StateId {
        RUN
    }

    fn enter(&mut self, owner: &mut GameObject, _event: Option<&StateEvent>) {
        set_animation(owner, Some(RUN_FPS));
    }
}

struct Attack;

impl State<GameObject, StateEvent> for Attack {
    fn name(&self) -> StateId {
        ATTACK
    }

    fn enter(&mut self, owner: &mut GameObject, _event: Option<&StateEvent>) {
        let started = owner.get_mut::<MeleeAttack>().is_some_and(MeleeAttack::begin);
        debug!(player = %owner.id(), started, "swing");
        set_animation(owner, None);
        if let Some(sprite) = owner.get_mut::<SpriteComponent>() {
            sprite.set_frame(1);
        }
    }
}

struct Die;

impl State<GameObject, StateEvent> for Die {
    fn name(&self) -> StateId {
        DIE
    }

    fn enter(&mut self, owner: &mut GameObject, _event: Option<&StateEvent>) {
        debug!(player = %owner.id(), "died");
        if let Some(movement) = movement(owner) {
            movement.stop();
        }
        set_animation(owner, None);
    }
}

fn is_attack_input(event: &StateEvent) -> bool {
    matches!(event, StateEvent::Input(key) if key.key == Key::Attack && key.pressed)
}

/// Idle/Run/Attack/Die with `Die` terminal.
///
/// # Errors
///
/// Only if the transition table is malformed.
pub fn machine() -> Result<ActorMachine, StateMachineError> {
    ActorMachine::builder()
        .state(Idle)
        .state(Run)
        .state(Attack)
        .state(Die)
        .transition(IDLE, |e| *e == StateEvent::Run, RUN)
        .transition(IDLE, is_attack_input, ATTACK)
        .transition(IDLE, |e| *e == StateEvent::Died, DIE)
        .transition(RUN, |e| *e == StateEvent::Stop, IDLE)
        .transition(RUN, is_attack_input, ATTACK)
        .transition(RUN, |e| *e == StateEvent::Died, DIE)
        .transition(ATTACK, |e| *e == StateEvent::AttackFinished { moving: true }, RUN)
        .transition(ATTACK, |e| *e == StateEvent::AttackFinished { moving: false }, IDLE)
        .transition(ATTACK, |e| *e == StateEvent::Died, DIE)
        .initial(IDLE)
        .build()
}

/// Builds the player at [`START`] with `progress` loaded into its stats.
///
/// # Errors
///
/// [`SimError::Resource`] when a player sprite is missing.
/// [`SimError::StateMachine`] if the state table is miswired.
pub fn spawn(sprites: &dyn SpriteProvider, config: &SimConfig, progress: PlayerProgress) -> Result<GameObject, SimError> {
    let body = sprites.sprite("zag")?;
    let slash = sprites.sprite("slash")?;
    let fireball = sprites.sprite("fireball")?;
    let machine = machine()?;

    let player = GameObject::new(LABEL)
        .attach(Transform2D::new(START, SIZE))?
        .attach(SpriteComponent::new(body))?
        .attach(AnimationComponent::looping(IDLE_FPS))?
        .attach(ActorStateMachine::new(machine))?
        .attach(InputComponent::new())?
        .attach(MovementComponent::new(SPEED))?
        .attach(CollisionComponent::new(
            CollisionGroup::PLAYER,
            CollisionGroup::MONSTER | CollisionGroup::PROJECTILE,
        ))?
        .attach(CombatComponent::new(HP).with_invincibility(config.player_invincibility))?
        .attach(MeleeAttack::new(MELEE_DAMAGE, CollisionGroup::MONSTER).with_effect(slash))?
        .attach(FireballSkill::new(fireball))?
        .attach(PlayerStats::from_progress(progress))?
        .attach(HudComponent::default())?;
    Ok(player)
}

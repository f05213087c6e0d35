//! Concrete actors: the player, the monster roster, and their projectiles.
//!
//! Every monster module exposes a `KIND` string and a `spawn` factory for
//! the [`MonsterRegistry`](crate::registry::MonsterRegistry). Monster AI
//! keeps its timers in a per-kind brain component; tree nodes reach that
//! component through [`think`] and [`check`].

use std::ops::RangeInclusive;

use arena_behavior::Status;
use arena_component::{Component, ComponentError, Deferred, GameObject, SpriteHandle};
use arena_math::{Transform2D, Vec2};
use rand::Rng;
use rand::rngs::SmallRng;

use crate::components::{MovementComponent, SpriteComponent};

pub mod goblin;
pub mod goblin_archer;
pub mod goblin_king;
pub mod player;
pub mod projectiles;
pub mod slime;
pub mod slime_king;

/// Full-arena backdrop drawn beneath every actor.
///
/// # Errors
///
/// Never fails in practice; attaching is fallible in general.
pub fn background(sprite: SpriteHandle, arena: Vec2) -> Result<GameObject, ComponentError> {
    let mut sprite = SpriteComponent::new(sprite);
    sprite.follow_facing = false;
    GameObject::new("Background")
        .attach(Transform2D::new(arena * 0.5, arena))?
        .attach(sprite)
}

/// Tree action that runs `f` on the owner's brain component `B`.
///
/// Fails when `B` is missing.
pub(crate) fn think<B: Component>(f: fn(&mut B, &mut GameObject) -> Status) -> impl Fn(&mut GameObject) -> Status {
    move |owner: &mut GameObject| owner.with_component::<B, _>(|brain, owner| f(brain, owner)).unwrap_or(Status::Fail)
}

/// Tree condition evaluated against the owner's brain component `B`.
pub(crate) fn check<B: Component>(f: fn(&B, &GameObject) -> bool) -> impl Fn(&GameObject) -> bool {
    move |owner: &GameObject| owner.get::<B>().is_some_and(|brain| f(brain, owner))
}

/// Path completion callback that forwards to brain component `B`.
pub(crate) fn notify<B: Component>(f: fn(&mut B, &mut GameObject)) -> Deferred {
    Box::new(move |owner: &mut GameObject| {
        owner.with_component::<B, _>(|brain, owner| f(brain, owner));
        Ok(())
    })
}

pub(crate) fn position(owner: &GameObject) -> Vec2 {
    owner.get::<Transform2D>().map_or(Vec2::ZERO, |t| t.position)
}

pub(crate) fn set_position(owner: &mut GameObject, position: Vec2) {
    if let Some(transform) = owner.get_mut::<Transform2D>() {
        transform.position = position;
    }
}

pub(crate) fn set_frame(owner: &mut GameObject, frame: u32) {
    if let Some(sprite) = owner.get_mut::<SpriteComponent>() {
        sprite.set_frame(frame);
    }
}

pub(crate) fn set_sheet(owner: &mut GameObject, sheet: &SpriteHandle) {
    if let Some(sprite) = owner.get_mut::<SpriteComponent>()
        && sprite.sprite.key != sheet.key
    {
        sprite.set_sheet(sheet.clone());
    }
}

pub(crate) fn movement(owner: &mut GameObject) -> Option<&mut MovementComponent> {
    owner.get_mut::<MovementComponent>()
}

/// Uniform point in the given ranges; an inverted range collapses to its
/// start.
pub(crate) fn random_point(rng: &mut SmallRng, x: RangeInclusive<f32>, y: RangeInclusive<f32>) -> Vec2 {
    Vec2::new(sample(rng, x), sample(rng, y))
}

pub(crate) fn sample(rng: &mut SmallRng, range: RangeInclusive<f32>) -> f32 {
    let (lo, hi) = range.into_inner();
    if hi <= lo { lo } else { rng.gen_range(lo..=hi) }
}

/// `-1.0` or `1.0` with equal odds.
pub(crate) fn random_side(rng: &mut SmallRng) -> f32 {
    if rng.gen_bool(0.5) { 1.0 } else { -1.0 }
}

//! Melee swings and contact damage.

use arena_component::{Canvas, Component, ComponentError, Entity, Flip, GameObject, MeleeSweep, SpriteHandle, WorldRequest};
use arena_math::{Transform2D, Vec2};

use super::collision::{CollisionGroup, group_of};
use super::combat::deal_damage;
use super::movement::MovementComponent;
use super::state::{StateEvent, send_event};

/// A timed melee swing that sweeps a box in front of the owner.
///
/// While the swing timer is inside the hit window, each update queues a
/// [`MeleeSweep`] that the world resolves against [`hits`](Self::hits).
/// Objects already struck are excluded, so one swing hits each target once.
#[derive(Debug, Clone, PartialEq)]
pub struct MeleeAttack {
    pub damage: f32,
    pub duration: f32,
    /// Hit window `(open, close)`, exclusive, in swing seconds.
    pub window: (f32, f32),
    pub cooldown: f32,
    pub size: Vec2,
    /// Distance of the box centre ahead of the owner.
    pub reach: f32,
    pub hits: CollisionGroup,
    effect: Option<SpriteHandle>,
    timer: Option<f32>,
    cooldown_left: f32,
    struck: Vec<Entity>,
}

impl MeleeAttack {
    /// Swing dealing `damage` to objects in `hits`.
    #[must_use]
    pub fn new(damage: f32, hits: CollisionGroup) -> Self {
        Self {
            damage,
            duration: 0.2,
            window: (0.1, 0.2),
            cooldown: 0.3,
            size: Vec2::splat(64.0),
            reach: 32.0,
            hits,
            effect: None,
            timer: None,
            cooldown_left: 0.0,
            struck: Vec::new(),
        }
    }

    /// Slash sprite drawn while the swing lasts.
    #[must_use]
    pub fn with_effect(mut self, effect: SpriteHandle) -> Self {
        self.effect = Some(effect);
        self
    }

    /// `true` between `begin` and the end of the swing.
    #[must_use]
    pub fn is_swinging(&self) -> bool {
        self.timer.is_some()
    }

    /// `true` when a new swing may start.
    #[must_use]
    pub fn ready(&self) -> bool {
        self.timer.is_none() && self.cooldown_left <= 0.0
    }

    /// Starts a swing. Returns `false` while swinging or cooling down.
    pub fn begin(&mut self) -> bool {
        if !self.ready() {
            return false;
        }
        self.timer = Some(0.0);
        self.struck.clear();
        true
    }

    /// Marks objects hit by this swing.
    pub fn record_hits(&mut self, hits: &[Entity]) {
        self.struck.extend_from_slice(hits);
    }

    /// Objects already hit by the current swing.
    #[must_use]
    pub fn struck(&self) -> &[Entity] {
        &self.struck
    }

    fn sweep_center(&self, owner: &GameObject) -> Option<Vec2> {
        let position = owner.get::<Transform2D>()?.position;
        let face = owner.get::<MovementComponent>().map_or(1.0, |m| m.face_dir);
        Some(position + Vec2::new(face * self.reach, 0.0))
    }
}

impl Component for MeleeAttack {
    fn type_name() -> &'static str {
        "MeleeAttack"
    }

    fn update(&mut self, owner: &mut GameObject) -> Result<(), ComponentError> {
        let dt = owner.frame().dt;
        self.cooldown_left = (self.cooldown_left - dt).max(0.0);
        let Some(timer) = self.timer.as_mut() else {
            return Ok(());
        };
        *timer += dt;
        let elapsed = *timer;

        if elapsed > self.window.0
            && elapsed < self.window.1
            && let Some(center) = self.sweep_center(owner)
        {
            owner.request(WorldRequest::Sweep(MeleeSweep {
                center,
                size: self.size,
                damage: self.damage,
                hits: self.hits.bits(),
                exclude: self.struck.clone(),
            }));
        }

        if elapsed >= self.duration {
            self.timer = None;
            self.cooldown_left = self.cooldown;
            let moving = owner.get::<MovementComponent>().is_some_and(|m| m.dir != Vec2::ZERO);
            send_event(owner, StateEvent::AttackFinished { moving })?;
        }
        Ok(())
    }

    fn draw(&self, owner: &GameObject, canvas: &mut dyn Canvas) {
        let (Some(effect), Some(_)) = (&self.effect, self.timer) else {
            return;
        };
        let Some(center) = self.sweep_center(owner) else {
            return;
        };
        let face = owner.get::<MovementComponent>().map_or(1.0, |m| m.face_dir);
        let flip = if face < 0.0 { Flip::Horizontal } else { Flip::None };
        canvas.draw_sprite(effect, 0, center, self.size, flip);
    }
}

/// Damage dealt to whatever of `hits` the owner touches.
///
/// With `once` set, each object is hit once per [`arm`](Self::arm).
#[derive(Debug, Clone, PartialEq)]
pub struct ContactDamage {
    pub damage: f32,
    pub hits: CollisionGroup,
    pub enabled: bool,
    pub once: bool,
    struck: Vec<Entity>,
}

impl ContactDamage {
    /// Always-on body damage.
    #[must_use]
    pub fn body(damage: f32, hits: CollisionGroup) -> Self {
        Self {
            damage,
            hits,
            enabled: true,
            once: false,
            struck: Vec::new(),
        }
    }

    /// Damage that is off until armed and lands once per target.
    #[must_use]
    pub fn strike(damage: f32, hits: CollisionGroup) -> Self {
        Self {
            enabled: false,
            once: true,
            ..Self::body(damage, hits)
        }
    }

    /// Enables contact damage and forgets earlier hits.
    pub fn arm(&mut self, damage: f32) {
        self.damage = damage;
        self.enabled = true;
        self.struck.clear();
    }

    /// Stops dealing contact damage.
    pub fn disarm(&mut self) {
        self.enabled = false;
    }
}

impl Component for ContactDamage {
    fn type_name() -> &'static str {
        "ContactDamage"
    }

    fn handle_collision(&mut self, _owner: &mut GameObject, other: &mut GameObject) -> Result<(), ComponentError> {
        if !self.enabled || !group_of(other).intersects(self.hits) {
            return Ok(());
        }
        if self.once {
            if self.struck.contains(&other.id()) {
                return Ok(());
            }
            self.struck.push(other.id());
        }
        deal_damage(other, self.damage)?;
        Ok(())
    }
}

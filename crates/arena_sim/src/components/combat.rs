//! Hit points and the invincibility window.
//!
//! [`CombatComponent::take_damage`] is the only place hit points go down.
//! Cross-object damage goes through [`deal_damage`], which also drives the
//! target's state machine into `Die` on the killing blow.

use arena_component::{Component, ComponentError, GameObject};

use super::state::{StateEvent, send_event};

/// What a single `take_damage` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Blocked by invincibility, already dead, or no combat component.
    Ignored,
    Damaged,
    /// This hit brought hit points to zero. Reported once per life.
    Killed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CombatComponent {
    hp: f32,
    max_hp: f32,
    /// Window length; `None` disables invincibility.
    invincibility: Option<f32>,
    timer: f32,
    dead: bool,
}

impl CombatComponent {
    /// Full health, no invincibility window.
    #[must_use]
    pub fn new(max_hp: f32) -> Self {
        Self {
            hp: max_hp,
            max_hp,
            invincibility: None,
            timer: 0.0,
            dead: false,
        }
    }

    /// Ignore damage for `seconds` after each hit.
    #[must_use]
    pub fn with_invincibility(mut self, seconds: f32) -> Self {
        self.invincibility = Some(seconds);
        self
    }

    /// Remaining hit points, never below zero.
    #[must_use]
    pub fn hp(&self) -> f32 {
        self.hp
    }

    /// Hit points at spawn.
    #[must_use]
    pub fn max_hp(&self) -> f32 {
        self.max_hp
    }

    /// Remaining fraction of hit points in `[0, 1]`.
    #[must_use]
    pub fn ratio(&self) -> f32 {
        if self.max_hp <= 0.0 {
            0.0
        } else {
            (self.hp / self.max_hp).clamp(0.0, 1.0)
        }
    }

    /// `true` once hit points reached zero.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// `true` while the post-hit window runs.
    #[must_use]
    pub fn is_invincible(&self) -> bool {
        self.invincibility.is_some() && self.timer > 0.0
    }

    /// Applies `amount` unless dead or invincible.
    pub fn take_damage(&mut self, amount: f32) -> DamageOutcome {
        if self.dead || self.is_invincible() {
            return DamageOutcome::Ignored;
        }
        self.hp -= amount;
        if self.hp <= 0.0 {
            self.hp = 0.0;
            self.dead = true;
            return DamageOutcome::Killed;
        }
        if let Some(window) = self.invincibility {
            self.timer = window;
        }
        DamageOutcome::Damaged
    }

    /// Restores up to `amount`, capped at the maximum. Dead objects stay dead.
    pub fn heal(&mut self, amount: f32) {
        if !self.dead {
            self.hp = (self.hp + amount).min(self.max_hp);
        }
    }
}

impl Component for CombatComponent {
    fn type_name() -> &'static str {
        "Combat"
    }

    fn update(&mut self, owner: &mut GameObject) -> Result<(), ComponentError> {
        self.timer = (self.timer - owner.frame().dt).max(0.0);
        Ok(())
    }
}

/// Routes `amount` through `target`'s combat gate.
///
/// A target without a combat component is left alone.
///
/// # Errors
///
/// Propagates a failing `Die` transition on the target.
pub fn deal_damage(target: &mut GameObject, amount: f32) -> Result<DamageOutcome, ComponentError> {
    let outcome = target
        .get_mut::<CombatComponent>()
        .map_or(DamageOutcome::Ignored, |combat| combat.take_damage(amount));
    if outcome == DamageOutcome::Killed {
        send_event(target, StateEvent::Died)?;
    }
    Ok(outcome)
}

/// `true` for objects with combat that have not died.
#[must_use]
pub fn is_alive(object: &GameObject) -> bool {
    object.get::<CombatComponent>().is_some_and(|c| !c.is_dead())
}

#[cfg(test)]
mod tests {
    use arena_component::FrameContext;
    use arena_math::Vec2;

    use super::*;

    #[test]
    fn test_damage_without_invincibility() {
        let mut combat = CombatComponent::new(10.0);
        assert_eq!(combat.take_damage(3.0), DamageOutcome::Damaged);
        assert_eq!(combat.take_damage(3.0), DamageOutcome::Damaged);
        assert_eq!(combat.hp(), 4.0);
    }

    #[test]
    fn test_invincibility_blocks_damage() {
        let mut combat = CombatComponent::new(100.0).with_invincibility(0.5);
        assert_eq!(combat.take_damage(10.0), DamageOutcome::Damaged);
        assert!(combat.is_invincible());
        assert_eq!(combat.take_damage(10.0), DamageOutcome::Ignored);
        assert_eq!(combat.hp(), 90.0);
    }

    #[test]
    fn test_exact_damage_kills_once() {
        let mut combat = CombatComponent::new(10.0).with_invincibility(0.5);
        assert_eq!(combat.take_damage(10.0), DamageOutcome::Killed);
        assert_eq!(combat.hp(), 0.0);
        assert!(combat.is_dead());
        assert_eq!(combat.take_damage(10.0), DamageOutcome::Ignored);
        assert_eq!(combat.hp(), 0.0);
    }

    #[test]
    fn test_overkill_clamps_to_zero() {
        let mut combat = CombatComponent::new(5.0);
        assert_eq!(combat.take_damage(18.0), DamageOutcome::Killed);
        assert_eq!(combat.hp(), 0.0);
        assert_eq!(combat.ratio(), 0.0);
    }

    #[test]
    fn test_timer_decays_with_frames() {
        let mut obj = GameObject::new("player")
            .attach(CombatComponent::new(100.0).with_invincibility(0.5))
            .expect("attach");
        obj.set_frame(FrameContext::new(0.25, Vec2::ZERO));
        assert_eq!(deal_damage(&mut obj, 10.0).ok(), Some(DamageOutcome::Damaged));
        obj.update().expect("update");
        assert_eq!(deal_damage(&mut obj, 10.0).ok(), Some(DamageOutcome::Ignored));
        obj.update().expect("update");
        assert_eq!(deal_damage(&mut obj, 10.0).ok(), Some(DamageOutcome::Damaged));
        assert_eq!(obj.get::<CombatComponent>().map(CombatComponent::hp), Some(80.0));
    }

    #[test]
    fn test_target_without_combat_is_ignored() {
        let mut rock = GameObject::new("rock");
        assert_eq!(deal_damage(&mut rock, 50.0).ok(), Some(DamageOutcome::Ignored));
        assert!(!is_alive(&rock));
    }

    #[test]
    fn test_heal_caps_at_max() {
        let mut combat = CombatComponent::new(100.0);
        combat.take_damage(10.0);
        combat.heal(20.0);
        assert_eq!(combat.hp(), 100.0);
    }
}

//! Fireball spell.

use arena_component::{Component, ComponentError, GameObject, SpriteHandle};
use arena_math::{Transform2D, Vec2};
use tracing::debug;

use super::movement::MovementComponent;
use super::stats::PlayerStats;
use crate::actors::projectiles;
use crate::world::ACTOR_DEPTH;

#[derive(Debug, Clone, PartialEq)]
pub struct FireballSkill {
    pub mp_cost: f32,
    sprite: SpriteHandle,
}

impl FireballSkill {
    /// Fireball skill casting `sprite`.
    #[must_use]
    pub fn new(sprite: SpriteHandle) -> Self {
        Self { mp_cost: 10.0, sprite }
    }

    /// Spends mana and launches a fireball along the movement intent, or
    /// straight ahead when standing still. Returns `false` without enough
    /// mana.
    ///
    /// # Errors
    ///
    /// [`ComponentError::Missing`] if the caster has no transform.
    pub fn cast(&self, owner: &mut GameObject) -> Result<bool, ComponentError> {
        let position = owner
            .get::<Transform2D>()
            .map(|t| t.position)
            .ok_or(ComponentError::Missing(Transform2D::type_name()))?;
        let paid = owner
            .get_mut::<PlayerStats>()
            .is_some_and(|stats| stats.spend_mp(self.mp_cost));
        if !paid {
            return Ok(false);
        }

        let dir = owner.get::<MovementComponent>().map_or(Vec2::X, |m| {
            if m.dir == Vec2::ZERO { Vec2::new(m.face_dir, 0.0) } else { m.dir }
        });
        let fireball = projectiles::fireball(self.sprite.clone(), position, dir.normalize_or(Vec2::X))?;
        debug!(caster = %owner.id(), ?dir, "fireball cast");
        owner.spawn(ACTOR_DEPTH, fireball);
        Ok(true)
    }
}

impl Component for FireballSkill {
    fn type_name() -> &'static str {
        "FireballSkill"
    }
}

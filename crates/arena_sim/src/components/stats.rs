//! Player resources: mana, gold, and potions.

use arena_component::{Component, ComponentError, GameObject};

use super::combat::CombatComponent;
use crate::progress::PlayerProgress;

/// Amount a potion restores.
pub const POTION_STRENGTH: f32 = 20.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStats {
    pub mp: f32,
    pub max_mp: f32,
    pub gold: u32,
    pub hp_potions: u32,
    pub mp_potions: u32,
}

impl PlayerStats {
    /// Full mana, with gold and potions from `progress`.
    #[must_use]
    pub fn from_progress(progress: PlayerProgress) -> Self {
        Self {
            mp: 100.0,
            max_mp: 100.0,
            gold: progress.gold,
            hp_potions: progress.hp_potions,
            mp_potions: progress.mp_potions,
        }
    }

    /// Gold and potion counts to carry into the next stage.
    #[must_use]
    pub fn progress(&self) -> PlayerProgress {
        PlayerProgress {
            gold: self.gold,
            hp_potions: self.hp_potions,
            mp_potions: self.mp_potions,
        }
    }

    /// Spends `cost` mana if available.
    pub fn spend_mp(&mut self, cost: f32) -> bool {
        if self.mp < cost {
            return false;
        }
        self.mp -= cost;
        true
    }

    /// Restores mana from a potion, if one is left.
    pub fn drink_mp_potion(&mut self) -> bool {
        if self.mp_potions == 0 {
            return false;
        }
        self.mp_potions -= 1;
        self.mp = (self.mp + POTION_STRENGTH).min(self.max_mp);
        true
    }

    /// Mana as a fraction of the maximum, for the HUD.
    #[must_use]
    pub fn mp_ratio(&self) -> f32 {
        if self.max_mp <= 0.0 { 0.0 } else { (self.mp / self.max_mp).clamp(0.0, 1.0) }
    }
}

impl Component for PlayerStats {
    fn type_name() -> &'static str {
        "PlayerStats"
    }
}

/// Uses one HP potion on `owner`, healing its combat component.
///
/// # Errors
///
/// [`ComponentError::Missing`] if the owner has no stats.
pub fn drink_hp_potion(owner: &mut GameObject) -> Result<bool, ComponentError> {
    let stats = owner
        .get_mut::<PlayerStats>()
        .ok_or(ComponentError::Missing(PlayerStats::type_name()))?;
    if stats.hp_potions == 0 {
        return Ok(false);
    }
    stats.hp_potions -= 1;
    if let Some(combat) = owner.get_mut::<CombatComponent>() {
        combat.heal(POTION_STRENGTH);
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mp_potion_caps_at_max() {
        let mut stats = PlayerStats::from_progress(PlayerProgress::default());
        assert!(stats.spend_mp(10.0));
        assert!(stats.drink_mp_potion());
        assert_eq!(stats.mp, 100.0);
        assert_eq!(stats.mp_potions, 2);
    }

    #[test]
    fn test_spend_mp_refuses_when_short() {
        let mut stats = PlayerStats::from_progress(PlayerProgress::default());
        stats.mp = 5.0;
        assert!(!stats.spend_mp(10.0));
        assert_eq!(stats.mp, 5.0);
    }

    #[test]
    fn test_hp_potion_heals_and_runs_out() {
        let progress = PlayerProgress {
            gold: 0,
            hp_potions: 1,
            mp_potions: 0,
        };
        let mut player = GameObject::new("player")
            .attach(CombatComponent::new(100.0))
            .and_then(|o| o.attach(PlayerStats::from_progress(progress)))
            .expect("distinct components");
        if let Some(combat) = player.get_mut::<CombatComponent>() {
            combat.take_damage(30.0);
        }
        assert!(drink_hp_potion(&mut player).expect("stats attached"));
        assert_eq!(player.get::<CombatComponent>().map(CombatComponent::hp), Some(90.0));
        assert!(!drink_hp_potion(&mut player).expect("stats attached"));
        assert_eq!(player.get::<PlayerStats>().map(|s| s.progress().hp_potions), Some(0));
    }

    #[test]
    fn test_missing_stats_is_an_error() {
        let mut rock = GameObject::new("rock");
        assert!(matches!(drink_hp_potion(&mut rock), Err(ComponentError::Missing("PlayerStats"))));
    }
}

//! Keyboard control of the player.
//!
//! Movement keys set the movement intent. Outside an attack a change of
//! intent becomes a `Run` or `Stop` event; during an attack the intent is
//! kept and the state machine picks it up when the swing ends. Everything
//! is ignored once the player is in `Die`.

use arena_component::{Component, ComponentError, GameObject};
use arena_math::Vec2;

use super::attack::MeleeAttack;
use super::movement::MovementComponent;
use super::skill::FireballSkill;
use super::state::{StateEvent, current_state, send_event};
use super::stats::{PlayerStats, drink_hp_potion};
use crate::input::{Key, KeyEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputComponent {
    left: bool,
    right: bool,
    up: bool,
    down: bool,
}

impl InputComponent {
    /// No keys held.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Unit intent vector from the held movement keys.
    #[must_use]
    pub fn intent(&self) -> Vec2 {
        let axis = |neg: bool, pos: bool| f32::from(u8::from(pos)) - f32::from(u8::from(neg));
        Vec2::new(axis(self.left, self.right), axis(self.down, self.up)).normalize_or_zero()
    }

    /// # Errors
    ///
    /// Propagates state-machine and skill failures.
    pub fn handle_event(&mut self, owner: &mut GameObject, event: &KeyEvent) -> Result<(), ComponentError> {
        let state = current_state(owner);
        if state == Some("Die") {
            return Ok(());
        }
        match event.key {
            Key::Left => self.left = event.pressed,
            Key::Right => self.right = event.pressed,
            Key::Up => self.up = event.pressed,
            Key::Down => self.down = event.pressed,
            Key::Attack if event.pressed => {
                if owner.get::<MeleeAttack>().is_some_and(MeleeAttack::ready) {
                    send_event(owner, StateEvent::Input(*event))?;
                }
                return Ok(());
            }
            Key::Fireball if event.pressed => {
                owner
                    .with_component::<FireballSkill, _>(|skill, owner| skill.cast(owner))
                    .transpose()?;
                return Ok(());
            }
            Key::HpPotion if event.pressed => {
                drink_hp_potion(owner)?;
                return Ok(());
            }
            Key::MpPotion if event.pressed => {
                if let Some(stats) = owner.get_mut::<PlayerStats>() {
                    stats.drink_mp_potion();
                }
                return Ok(());
            }
            _ => return Ok(()),
        }

        let intent = self.intent();
        let changed = owner.get_mut::<MovementComponent>().is_some_and(|movement| {
            let changed = movement.dir != intent;
            movement.set_direction(intent);
            changed
        });
        if changed && state != Some("Attack") {
            let event = if intent == Vec2::ZERO { StateEvent::Stop } else { StateEvent::Run };
            send_event(owner, event)?;
        }
        Ok(())
    }
}

impl Component for InputComponent {
    fn type_name() -> &'static str {
        "Input"
    }
}

/// Routes a key event to `owner`'s input component.
///
/// # Errors
///
/// Whatever [`InputComponent::handle_event`] reports.
pub fn dispatch_key(owner: &mut GameObject, event: &KeyEvent) -> Result<(), ComponentError> {
    owner
        .with_component::<InputComponent, _>(|input, owner| input.handle_event(owner, event))
        .unwrap_or(Ok(()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_from_keys() {
        let mut input = InputComponent::new();
        assert_eq!(input.intent(), Vec2::ZERO);
        input.right = true;
        assert_eq!(input.intent(), Vec2::X);
        input.left = true;
        assert_eq!(input.intent(), Vec2::ZERO);
        input.left = false;
        input.up = true;
        let diagonal = input.intent();
        assert!((diagonal.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_dispatch_without_input_component_is_noop() {
        let mut rock = GameObject::new("rock");
        assert!(dispatch_key(&mut rock, &KeyEvent::down(Key::Left)).is_ok());
    }
}

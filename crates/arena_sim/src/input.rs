//! Keyboard events and input sources.
//!
//! The core never reads a device. The frame driver polls an [`InputSource`]
//! once per frame and hands the events to the active scene. The headless
//! binary replays a [`ScriptedInput`] loaded from JSON:
//!
//! ```json
//! [ { "frame": 10, "key": "Right", "pressed": true },
//!   { "frame": 40, "key": "Right", "pressed": false } ]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SimError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    /// Melee swing (`Z`).
    Attack,
    /// Fireball (`A`).
    Fireball,
    /// HP potion (`1`).
    HpPotion,
    /// MP potion (`2`).
    MpPotion,
    Escape,
}

impl Key {
    /// `true` for the arrow keys.
    #[must_use]
    pub fn is_movement(self) -> bool {
        matches!(self, Self::Left | Self::Right | Self::Up | Self::Down)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: Key,
    pub pressed: bool,
}

impl KeyEvent {
    /// Press of `key`.
    #[must_use]
    pub fn down(key: Key) -> Self {
        Self { key, pressed: true }
    }

    /// Release of `key`.
    #[must_use]
    pub fn up(key: Key) -> Self {
        Self { key, pressed: false }
    }
}

/// Supplies the events for one frame.
pub trait InputSource {
    fn poll(&mut self, frame: u64) -> Vec<KeyEvent>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptedEvent {
    pub frame: u64,
    pub key: Key,
    pub pressed: bool,
}

/// Replays a fixed list of events keyed by frame number.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    events: Vec<ScriptedEvent>,
    cursor: usize,
}

impl ScriptedInput {
    /// Replays `events` in frame order.
    #[must_use]
    pub fn new(mut events: Vec<ScriptedEvent>) -> Self {
        // Stable sort keeps same-frame events in script order.
        events.sort_by_key(|e| e.frame);
        Self { events, cursor: 0 }
    }

    /// # Errors
    ///
    /// [`SimError::Json`] if the script is not an event array.
    pub fn from_json(text: &str) -> Result<Self, SimError> {
        Ok(Self::new(serde_json::from_str(text)?))
    }

    /// # Errors
    ///
    /// I/O failures and everything [`ScriptedInput::from_json`] reports.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Events not yet delivered.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.events.len() - self.cursor
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self, frame: u64) -> Vec<KeyEvent> {
        let mut out = Vec::new();
        while let Some(event) = self.events.get(self.cursor) {
            if event.frame > frame {
                break;
            }
            out.push(KeyEvent {
                key: event.key,
                pressed: event.pressed,
            });
            self.cursor += 1;
        }
        out
    }
}

//! Simulation configuration.
//!
//! Every field has a default, so a config file only needs to name what it
//! changes. The binary layers CLI flags on top.

use std::path::Path;

use arena_math::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::SimError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Fixed simulation rate in frames per second.
    pub tick_rate: f64,
    /// Stop after this many frames (0 = unlimited).
    pub max_frames: u64,
    /// Seed for every random roll in a run.
    pub seed: u64,
    /// Sleep between frames to hold `tick_rate` in wall-clock time.
    pub realtime: bool,
    /// Visible window size.
    pub viewport: [f32; 2],
    /// Playable area; taller than the viewport so the camera can scroll.
    pub arena: [f32; 2],
    /// Seconds the victory/defeat result is held before the scene ends.
    pub result_delay: f32,
    /// Player invincibility window after taking damage, in seconds.
    pub player_invincibility: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            max_frames: 0,
            seed: 0,
            realtime: false,
            viewport: [1600.0, 900.0],
            arena: [1600.0, 1800.0],
            result_delay: 2.0,
            player_invincibility: 0.5,
        }
    }
}

impl SimConfig {
    /// Parse a JSON config document.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Json`] for malformed input and
    /// [`SimError::Config`] for values that cannot drive a simulation.
    pub fn from_json(text: &str) -> Result<Self, SimError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON config file.
    ///
    /// # Errors
    ///
    /// I/O failures, plus everything [`SimConfig::from_json`] reports.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// # Errors
    ///
    /// [`SimError::Config`] when a value is out of range.
    pub fn validate(&self) -> Result<(), SimError> {
        if !(self.tick_rate.is_finite() && self.tick_rate > 0.0) {
            return Err(SimError::Config(format!("tick_rate must be positive, got {}", self.tick_rate)));
        }
        if self.viewport.iter().chain(self.arena.iter()).any(|v| *v <= 0.0) {
            return Err(SimError::Config("viewport and arena sizes must be positive".into()));
        }
        if self.result_delay < 0.0 || self.player_invincibility < 0.0 {
            return Err(SimError::Config("durations must not be negative".into()));
        }
        Ok(())
    }

    /// Seconds simulated per frame.
    #[must_use]
    pub fn frame_dt(&self) -> f32 {
        (1.0 / self.tick_rate) as f32
    }

    /// Viewport as a vector.
    #[must_use]
    pub fn viewport_size(&self) -> Vec2 {
        Vec2::from(self.viewport)
    }

    /// Arena as a vector.
    #[must_use]
    pub fn arena_size(&self) -> Vec2 {
        Vec2::from(self.arena)
    }
}

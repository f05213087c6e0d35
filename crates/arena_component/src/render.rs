//! Rendering and resource collaborator interfaces.
//!
//! The simulation only hands world-space coordinates to a [`Canvas`] and
//! never reads anything back. Sprites are opaque [`SpriteHandle`]s obtained
//! from a [`SpriteProvider`]; the core reads nothing from them except the
//! frame size used for hit-box sizing.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::ResourceError;

/// Horizontal mirroring for sprite draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Flip {
    #[default]
    None,
    Horizontal,
}

/// Opaque handle to a loaded sprite sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteHandle {
    pub key: String,
    /// Width of one frame.
    pub width: f32,
    /// Height of one frame.
    pub height: f32,
    pub frames: u32,
}

impl SpriteHandle {
    /// Handle for the sheet `key` with `frames` frames across `width`.
    #[must_use]
    pub fn new(key: impl Into<String>, width: f32, height: f32, frames: u32) -> Self {
        Self {
            key: key.into(),
            width,
            height,
            frames: frames.max(1),
        }
    }

    /// Size of a single frame of the sheet.
    #[must_use]
    pub fn frame_size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

/// Draw target. Implemented by the host (window, headless logger, tests).
pub trait Canvas {
    /// Offset subtracted from every world-space position drawn afterwards.
    fn set_camera(&mut self, offset: Vec2);

    fn draw_sprite(&mut self, sprite: &SpriteHandle, frame: u32, center: Vec2, size: Vec2, flip: Flip);

    fn draw_rect(&mut self, min: Vec2, max: Vec2, color: [u8; 4]);
}

/// Source of sprite handles.
pub trait SpriteProvider {
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] when `key` is unknown.
    fn sprite(&self, key: &str) -> Result<SpriteHandle, ResourceError>;
}

//! A canvas that renders nothing and counts what it was asked to draw.

use arena_component::{Canvas, Flip, SpriteHandle};
use arena_math::Vec2;
use tracing::trace;

#[derive(Debug, Default)]
pub struct LogCanvas {
    frames: u64,
    sprites: usize,
    rects: usize,
    total: usize,
    camera: Vec2,
}

impl LogCanvas {
    /// A canvas with nothing counted yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames drawn so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Draw calls across every frame.
    #[must_use]
    pub fn total_draws(&self) -> usize {
        self.total + self.sprites + self.rects
    }

    fn flush(&mut self) {
        if self.sprites + self.rects == 0 {
            return;
        }
        trace!(
            frame = self.frames,
            sprites = self.sprites,
            rects = self.rects,
            camera_y = self.camera.y,
            "frame drawn"
        );
        self.total += self.sprites + self.rects;
        self.sprites = 0;
        self.rects = 0;
    }
}

impl Canvas for LogCanvas {
    // Scenes set the camera first, so it marks the start of a frame.
    fn set_camera(&mut self, offset: Vec2) {
        self.flush();
        self.frames += 1;
        self.camera = offset;
    }

    fn draw_sprite(&mut self, _sprite: &SpriteHandle, _frame: u32, _center: Vec2, _size: Vec2, _flip: Flip) {
        self.sprites += 1;
    }

    fn draw_rect(&mut self, _min: Vec2, _max: Vec2, _color: [u8; 4]) {
        self.rects += 1;
    }
}

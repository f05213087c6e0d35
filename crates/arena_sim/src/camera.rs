//! Vertical follow camera.

use arena_math::Vec2;

/// Keeps the followed point vertically centred without showing anything
/// outside the arena.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub viewport: Vec2,
    pub arena: Vec2,
    offset: Vec2,
}

impl Camera {
    /// Camera at the top of the arena.
    #[must_use]
    pub fn new(viewport: Vec2, arena: Vec2) -> Self {
        Self {
            viewport,
            arena,
            offset: Vec2::ZERO,
        }
    }

    /// Offset passed to the canvas this frame.
    #[must_use]
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Recentres on `focus`. Returns the new offset.
    pub fn follow(&mut self, focus: Vec2) -> Vec2 {
        let max_y = (self.arena.y - self.viewport.y).max(0.0);
        let y = (focus.y - self.viewport.y / 2.0).clamp(0.0, max_y);
        self.offset = Vec2::new(0.0, y);
        self.offset
    }
}

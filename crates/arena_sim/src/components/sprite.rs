//! Sprite drawing and frame animation.

use arena_component::{Canvas, Component, ComponentError, Flip, GameObject, SpriteHandle};
use arena_math::{Transform2D, Vec2};

use super::movement::MovementComponent;

/// Draws one frame of a sprite sheet at the owner's transform.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteComponent {
    pub sprite: SpriteHandle,
    pub frame: u32,
    pub flip: Flip,
    /// Overrides the transform size on screen.
    pub draw_size: Option<Vec2>,
    /// Mirror the sheet to match the owner's facing.
    pub follow_facing: bool,
    /// The sheet is drawn facing left.
    pub faces_left: bool,
}

impl SpriteComponent {
    /// Draws frame 0 of `sprite` at the transform's size.
    #[must_use]
    pub fn new(sprite: SpriteHandle) -> Self {
        Self {
            sprite,
            frame: 0,
            flip: Flip::None,
            draw_size: None,
            follow_facing: true,
            faces_left: false,
        }
    }

    /// For art drawn facing left.
    #[must_use]
    pub fn facing_left(mut self) -> Self {
        self.faces_left = true;
        self
    }

    /// Swaps the sheet and rewinds to its first frame.
    pub fn set_sheet(&mut self, sprite: SpriteHandle) {
        self.sprite = sprite;
        self.frame = 0;
    }

    /// Shows `frame`, wrapped to the sheet.
    pub fn set_frame(&mut self, frame: u32) {
        self.frame = frame.min(self.sprite.frames - 1);
    }
}

impl Component for SpriteComponent {
    fn type_name() -> &'static str {
        "Sprite"
    }

    fn update(&mut self, owner: &mut GameObject) -> Result<(), ComponentError> {
        if self.follow_facing
            && let Some(movement) = owner.get::<MovementComponent>()
        {
            let facing_left = movement.face_dir < 0.0;
            self.flip = if facing_left == self.faces_left { Flip::None } else { Flip::Horizontal };
        }
        Ok(())
    }

    fn draw(&self, owner: &GameObject, canvas: &mut dyn Canvas) {
        let Some(transform) = owner.get::<Transform2D>() else {
            return;
        };
        let size = self.draw_size.unwrap_or(transform.size);
        canvas.draw_sprite(&self.sprite, self.frame, transform.position, size, self.flip);
    }
}

/// Steps the owner's sprite through its frames at a fixed rate.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationComponent {
    pub fps: f32,
    pub playing: bool,
    /// Despawn the owner after the last frame instead of looping.
    pub despawn_at_end: bool,
    time: f32,
}

impl AnimationComponent {
    /// Cycles the sheet forever.
    #[must_use]
    pub fn looping(fps: f32) -> Self {
        Self {
            fps,
            playing: true,
            despawn_at_end: false,
            time: 0.0,
        }
    }

    /// Plays the sheet once, then despawns the owner.
    #[must_use]
    pub fn once(fps: f32) -> Self {
        Self {
            despawn_at_end: true,
            ..Self::looping(fps)
        }
    }

    /// Back to the first frame.
    pub fn restart(&mut self) {
        self.time = 0.0;
        self.playing = true;
    }
}

impl Component for AnimationComponent {
    fn type_name() -> &'static str {
        "Animation"
    }

    fn update(&mut self, owner: &mut GameObject) -> Result<(), ComponentError> {
        if !self.playing {
            return Ok(());
        }
        self.time += owner.frame().dt;
        let step = (self.time * self.fps) as u32;
        let Some(sprite) = owner.get_mut::<SpriteComponent>() else {
            return Ok(());
        };
        let frames = sprite.sprite.frames;
        if step >= frames && self.despawn_at_end {
            owner.despawn();
            return Ok(());
        }
        sprite.frame = step % frames;
        Ok(())
    }
}

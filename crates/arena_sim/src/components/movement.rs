//! Directional movement and time-bounded paths.
//!
//! A [`MovementComponent`] is always in one of three modes. `Directional`
//! integrates the intent vector every frame. `Linear` and `Parabolic`
//! interpolate from a start to an end point over a fixed duration; the
//! parabolic arc adds `4·h·t·(1−t)` on the y axis. When a path reaches
//! `t = 1` the position is set to the exact end point, the mode reverts to
//! `Directional`, and the completion callback is deferred onto the owner.
//!
//! Only one path is ever active. Starting a path replaces the one in flight
//! and drops its callback without running it.

use std::fmt;

use arena_component::{Component, ComponentError, Deferred, GameObject};
use arena_math::{Transform2D, Vec2};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotionMode {
    #[default]
    Directional,
    Linear,
    Parabolic,
}

struct Path {
    start: Vec2,
    end: Vec2,
    height: f32,
    duration: f32,
    elapsed: f32,
    on_complete: Option<Deferred>,
}

impl Path {
    fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).min(1.0)
        }
    }
}

pub struct MovementComponent {
    /// Units per second in `Directional` mode.
    pub speed: f32,
    /// Intent vector, typically unit length or zero.
    pub dir: Vec2,
    /// `1.0` facing right, `-1.0` facing left.
    pub face_dir: f32,
    mode: MotionMode,
    path: Option<Path>,
}

impl MovementComponent {
    /// Standing still, facing right.
    #[must_use]
    pub fn new(speed: f32) -> Self {
        Self {
            speed,
            dir: Vec2::ZERO,
            face_dir: 1.0,
            mode: MotionMode::Directional,
            path: None,
        }
    }

    /// Directional, or the kind of path in flight.
    #[must_use]
    pub fn mode(&self) -> MotionMode {
        self.mode
    }

    /// `true` while a Linear or Parabolic path runs.
    #[must_use]
    pub fn is_path_active(&self) -> bool {
        self.path.is_some()
    }

    /// Sets the intent vector and turns to face its x component.
    pub fn set_direction(&mut self, dir: Vec2) {
        self.dir = dir;
        self.face_toward(dir.x);
    }

    /// Turns left for negative `dx`, right for positive; zero keeps facing.
    pub fn face_toward(&mut self, dx: f32) {
        if dx > 0.0 {
            self.face_dir = 1.0;
        } else if dx < 0.0 {
            self.face_dir = -1.0;
        }
    }

    /// Clears the movement intent.
    pub fn stop(&mut self) {
        self.dir = Vec2::ZERO;
    }

    /// Straight path to `end`; replaces any running path.
    pub fn start_linear(&mut self, start: Vec2, end: Vec2, duration: f32, on_complete: Option<Deferred>) {
        self.start_path(MotionMode::Linear, start, end, 0.0, duration, on_complete);
    }

    /// Arcing path to `end`; replaces any running path.
    pub fn start_parabolic(
        &mut self,
        start: Vec2,
        end: Vec2,
        height: f32,
        duration: f32,
        on_complete: Option<Deferred>,
    ) {
        self.start_path(MotionMode::Parabolic, start, end, height, duration, on_complete);
    }

    /// Abandons the active path without running its callback.
    pub fn cancel_path(&mut self) {
        self.path = None;
        self.mode = MotionMode::Directional;
    }

    fn start_path(
        &mut self,
        mode: MotionMode,
        start: Vec2,
        end: Vec2,
        height: f32,
        duration: f32,
        on_complete: Option<Deferred>,
    ) {
        if let Some(previous) = self.path.take()
            && previous.on_complete.is_some()
        {
            trace!(?mode, "path replaced; pending completion callback dropped");
        }
        self.face_toward(end.x - start.x);
        self.mode = mode;
        self.path = Some(Path {
            start,
            end,
            height,
            duration,
            elapsed: 0.0,
            on_complete,
        });
    }
}

impl fmt::Debug for MovementComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MovementComponent")
            .field("speed", &self.speed)
            .field("dir", &self.dir)
            .field("face_dir", &self.face_dir)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl Component for MovementComponent {
    fn type_name() -> &'static str {
        "Movement"
    }

    fn update(&mut self, owner: &mut GameObject) -> Result<(), ComponentError> {
        let dt = owner.frame().dt;
        let Some(path) = self.path.as_mut() else {
            if let Some(transform) = owner.get_mut::<Transform2D>() {
                transform.position += self.dir * self.speed * dt;
            }
            return Ok(());
        };

        path.elapsed += dt;
        let t = path.progress();
        let position = if t >= 1.0 {
            path.end
        } else {
            let mut p = path.start.lerp(path.end, t);
            if self.mode == MotionMode::Parabolic {
                p.y += 4.0 * path.height * t * (1.0 - t);
            }
            p
        };
        if let Some(transform) = owner.get_mut::<Transform2D>() {
            transform.position = position;
        }

        if t >= 1.0 {
            let finished = self.path.take();
            self.mode = MotionMode::Directional;
            if let Some(callback) = finished.and_then(|p| p.on_complete) {
                owner.defer(callback);
            }
        }
        Ok(())
    }
}

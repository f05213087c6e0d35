//! Per-frame context handed to every object before its update.

use glam::Vec2;

use crate::entity::Entity;

/// Snapshot of the entity AI components chase (the player).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetInfo {
    pub entity: Entity,
    pub position: Vec2,
    pub size: Vec2,
    /// `false` once the target's hit points reached zero.
    pub alive: bool,
}

/// Frame-scoped data the world supplies to an object before its update.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameContext {
    /// Seconds simulated this frame.
    pub dt: f32,
    /// Playable area, origin at the bottom-left corner.
    pub arena: Vec2,
    /// Current target, absent for the target itself or when none exists.
    pub target: Option<TargetInfo>,
}

impl FrameContext {
    /// Context for one frame with no target in view.
    #[must_use]
    pub fn new(dt: f32, arena: Vec2) -> Self {
        Self {
            dt,
            arena,
            target: None,
        }
    }

    /// Sets the tracked target snapshot.
    #[must_use]
    pub fn with_target(mut self, target: Option<TargetInfo>) -> Self {
        self.target = target;
        self
    }

    /// Vector from `from` to the target, if there is one.
    #[must_use]
    pub fn to_target(&self, from: Vec2) -> Option<Vec2> {
        self.target.map(|t| t.position - from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_target_without_target_is_none() {
        let ctx = FrameContext::new(0.016, Vec2::new(100.0, 100.0));
        assert_eq!(ctx.to_target(Vec2::ZERO), None);
    }

    #[test]
    fn test_to_target_points_at_target() {
        let target = TargetInfo {
            entity: Entity::from_raw(1),
            position: Vec2::new(10.0, 5.0),
            size: Vec2::splat(32.0),
            alive: true,
        };
        let ctx = FrameContext::new(0.016, Vec2::ZERO).with_target(Some(target));
        assert_eq!(ctx.to_target(Vec2::new(4.0, 5.0)), Some(Vec2::new(6.0, 0.0)));
    }
}

//! Target sensing for AI-driven actors.

use arena_component::{Component, GameObject, TargetInfo};
use arena_math::{Transform2D, Vec2};

/// How far an actor notices its target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerceptionComponent {
    pub detection_range: f32,
}

impl PerceptionComponent {
    /// Senses a living target within `detection_range`.
    #[must_use]
    pub fn new(detection_range: f32) -> Self {
        Self { detection_range }
    }

    /// The living target, if it is within detection range.
    #[must_use]
    pub fn sense(&self, owner: &GameObject) -> Option<TargetInfo> {
        let target = living_target(owner)?;
        let distance = target_distance(owner)?;
        (distance <= self.detection_range).then_some(target)
    }
}

impl Component for PerceptionComponent {
    fn type_name() -> &'static str {
        "Perception"
    }
}

/// The frame's target if it is still alive.
#[must_use]
pub fn living_target(owner: &GameObject) -> Option<TargetInfo> {
    owner.frame().target.filter(|t| t.alive)
}

/// Vector from the owner to the living target.
#[must_use]
pub fn target_offset(owner: &GameObject) -> Option<Vec2> {
    let position = owner.get::<Transform2D>()?.position;
    let target = living_target(owner)?;
    Some(target.position - position)
}

/// Distance from the owner to a living target.
#[must_use]
pub fn target_distance(owner: &GameObject) -> Option<f32> {
    target_offset(owner).map(Vec2::length)
}

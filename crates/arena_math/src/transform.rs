//! 2D transform component.
//!
//! [`Transform2D`] is the centre position and size of an object in arena
//! space (y grows upwards). Nearly every object carries one; movement writes
//! it, collision and drawing read it.

use arena_component::Component;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::aabb::Aabb;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Transform2D {
    /// World-space centre.
    pub position: Vec2,
    /// Full width and height.
    pub size: Vec2,
}

impl Transform2D {
    pub const ORIGIN: Self = Self {
        position: Vec2::ZERO,
        size: Vec2::ZERO,
    };

    /// Transform centred on `position`.
    #[must_use]
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self { position, size }
    }

    /// Zero-sized transform at `position`.
    #[must_use]
    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            ..Self::ORIGIN
        }
    }

    /// Translate the transform by the given offset.
    #[must_use]
    pub fn translated(mut self, offset: Vec2) -> Self {
        self.position += offset;
        self
    }

    /// The box covered by this transform.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_center_size(self.position, self.size)
    }
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::ORIGIN
    }
}

impl Component for Transform2D {
    fn type_name() -> &'static str {
        "Transform2D"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_transform() {
        let t = Transform2D::default();
        assert_eq!(t.position, Vec2::ZERO);
        assert_eq!(t.size, Vec2::ZERO);
    }

    #[test]
    fn test_translated() {
        let t = Transform2D::from_position(Vec2::new(1.0, 2.0)).translated(Vec2::new(5.0, 0.0));
        assert_eq!(t.position, Vec2::new(6.0, 2.0));
    }

    #[test]
    fn test_bounds_are_centred() {
        let t = Transform2D::new(Vec2::new(10.0, 10.0), Vec2::new(4.0, 6.0));
        let b = t.bounds();
        assert_eq!(b.min, Vec2::new(8.0, 7.0));
        assert_eq!(b.max, Vec2::new(12.0, 13.0));
    }
}

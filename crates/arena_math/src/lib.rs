//! # arena_math
//!
//! 2D spatial types for the arena simulation. Re-exports [`glam`] for linear
//! algebra and defines the [`Transform2D`] component
//! (implements [`Component`](arena_component::Component)) and [`Aabb`].

pub mod aabb;
pub mod transform;

// Re-export glam types for convenience.
pub use glam::{Vec2, vec2};

pub use aabb::Aabb;
pub use transform::Transform2D;

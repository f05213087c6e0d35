//! Collision groups and the per-object hit box.

use std::fmt;
use std::ops::BitOr;

use arena_component::{Component, GameObject};
use arena_math::{Aabb, Transform2D, Vec2};
use serde::{Deserialize, Serialize};

/// Bit set of collision groups.
///
/// An object's `group` says what it is; its `mask` says which groups it
/// reacts to.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct CollisionGroup(pub u32);

impl CollisionGroup {
    pub const NONE: Self = Self(0);
    pub const PLAYER: Self = Self(1);
    pub const MONSTER: Self = Self(2);
    pub const PROJECTILE: Self = Self(4);

    /// The groups the world keeps an index for.
    pub const INDEXED: [Self; 3] = [Self::PLAYER, Self::MONSTER, Self::PROJECTILE];

    /// Raw bit pattern.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// `true` if any bit is shared.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// `true` for [`CollisionGroup::NONE`].
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for CollisionGroup {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Debug for CollisionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = [(Self::PLAYER, "PLAYER"), (Self::MONSTER, "MONSTER"), (Self::PROJECTILE, "PROJECTILE")]
            .into_iter()
            .filter(|(group, _)| self.intersects(*group))
            .map(|(_, name)| name)
            .collect();
        if names.is_empty() {
            write!(f, "CollisionGroup({})", self.0)
        } else {
            write!(f, "{}", names.join(" | "))
        }
    }
}

/// Hit box relative to the owner's transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionComponent {
    pub group: CollisionGroup,
    pub mask: CollisionGroup,
    /// Box centre relative to the transform centre.
    pub offset: Vec2,
    /// Overrides the transform size when set.
    pub size: Option<Vec2>,
}

impl CollisionComponent {
    /// Hit box the size of the owner's transform.
    #[must_use]
    pub fn new(group: CollisionGroup, mask: CollisionGroup) -> Self {
        Self {
            group,
            mask,
            offset: Vec2::ZERO,
            size: None,
        }
    }

    /// Overrides the hit box size.
    #[must_use]
    pub fn with_size(mut self, size: Vec2) -> Self {
        self.size = Some(size);
        self
    }

    /// `true` when each side's mask accepts the other's group.
    #[must_use]
    pub fn accepts(&self, other: &CollisionComponent) -> bool {
        self.mask.intersects(other.group) && other.mask.intersects(self.group)
    }

    /// World-space hit box for an owner at `transform`.
    #[must_use]
    pub fn bounds(&self, transform: &Transform2D) -> Aabb {
        Aabb::from_center_size(transform.position + self.offset, self.size.unwrap_or(transform.size))
    }
}

impl Component for CollisionComponent {
    fn type_name() -> &'static str {
        "Collision"
    }
}

/// World-space hit box of `object`, if it has a transform and a collision
/// component.
#[must_use]
pub fn hit_box(object: &GameObject) -> Option<Aabb> {
    let transform = object.get::<Transform2D>()?;
    let collision = object.get::<CollisionComponent>()?;
    Some(collision.bounds(transform))
}

/// Collision group of `object`, or [`CollisionGroup::NONE`].
#[must_use]
pub fn group_of(object: &GameObject) -> CollisionGroup {
    object
        .get::<CollisionComponent>()
        .map_or(CollisionGroup::NONE, |c| c.group)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_bits() {
        let mask = CollisionGroup::PLAYER | CollisionGroup::PROJECTILE;
        assert_eq!(mask.bits(), 5);
        assert!(mask.intersects(CollisionGroup::PROJECTILE));
        assert!(!mask.intersects(CollisionGroup::MONSTER));
        assert_eq!(format!("{mask:?}"), "PLAYER | PROJECTILE");
    }

    #[test]
    fn test_filter_is_asymmetric_per_side() {
        let monster = CollisionComponent::new(CollisionGroup::MONSTER, CollisionGroup::PLAYER);
        let projectile = CollisionComponent::new(CollisionGroup::PROJECTILE, CollisionGroup::MONSTER);
        // The monster does not listen to projectiles, so the pair is filtered.
        assert!(!monster.accepts(&projectile));
        let listening = CollisionComponent::new(CollisionGroup::MONSTER, CollisionGroup::PLAYER | CollisionGroup::PROJECTILE);
        assert!(listening.accepts(&projectile));
        assert!(projectile.accepts(&listening));
    }

    #[test]
    fn test_bounds_use_offset_and_override() {
        let transform = Transform2D::new(Vec2::new(100.0, 50.0), Vec2::new(60.0, 70.0));
        let mut collision = CollisionComponent::new(CollisionGroup::MONSTER, CollisionGroup::PLAYER);
        assert_eq!(collision.bounds(&transform), transform.bounds());

        collision.offset = Vec2::new(10.0, 0.0);
        collision.size = Some(Vec2::new(80.0, 60.0));
        let b = collision.bounds(&transform);
        assert_eq!(b.min, Vec2::new(70.0, 20.0));
        assert_eq!(b.max, Vec2::new(150.0, 80.0));
    }

    #[test]
    fn test_hit_box_requires_both_components() {
        let bare = GameObject::new("bare");
        assert!(hit_box(&bare).is_none());
        let object = GameObject::new("box")
            .attach(Transform2D::new(Vec2::ZERO, Vec2::splat(10.0)))
            .and_then(|o| o.attach(CollisionComponent::new(CollisionGroup::PLAYER, CollisionGroup::MONSTER)))
            .expect("distinct components");
        assert_eq!(hit_box(&object).map(|b| b.max), Some(Vec2::splat(5.0)));
        assert_eq!(group_of(&object), CollisionGroup::PLAYER);
    }
}

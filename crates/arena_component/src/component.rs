//! The [`Component`] trait and the capability tag objects index it by.
//!
//! A [`GameObject`] answers "do you have X" with a hash lookup on
//! [`ComponentTypeId`], the FNV-1a 64-bit hash of the component's
//! [`type_name`](Component::type_name). Hooks a component leaves alone
//! (`update`, `draw`, `handle_collision`) cost nothing at dispatch.

use std::any::Any;

use serde::{Deserialize, Serialize};

use crate::error::ComponentError;
use crate::object::GameObject;
use crate::render::Canvas;

/// Capability tag of one concrete component type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentTypeId(pub u64);

impl ComponentTypeId {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0100_0000_01b3;

    /// FNV-1a over the bytes of `name`. Two types with the same name share
    /// a tag, so names must be unique per crate graph.
    #[must_use]
    pub const fn from_name(name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut hash = Self::OFFSET;
        let mut i = 0;
        while i < bytes.len() {
            hash = (hash ^ bytes[i] as u64).wrapping_mul(Self::PRIME);
            i += 1;
        }
        Self(hash)
    }

    /// Tag of component type `T`.
    #[must_use]
    pub fn of<T: Component>() -> Self {
        Self::from_name(T::type_name())
    }
}

/// Lets a boxed `dyn Component` be downcast to its concrete type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// The core component trait.
///
/// A component is attached to exactly one [`GameObject`] and never holds a
/// reference to it; instead every hook receives the owner as a borrowed
/// parameter. While a hook runs, the component is lifted out of its slot, so
/// the owner can be borrowed mutably alongside `self` and
/// `owner.get::<Self>()` yields `None` for the duration of the call.
///
/// # Examples
///
/// ```rust
/// use arena_component::{Component, ComponentError, GameObject};
///
/// struct Lifetime {
///     remaining: f32,
/// }
///
/// impl Component for Lifetime {
///     fn type_name() -> &'static str { "Lifetime" }
///
///     fn update(&mut self, owner: &mut GameObject) -> Result<(), ComponentError> {
///         self.remaining -= owner.frame().dt;
///         if self.remaining <= 0.0 {
///             owner.despawn();
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Component: AsAny {
    /// Unique per component type; the capability tag is derived from it.
    fn type_name() -> &'static str
    where
        Self: Sized;

    fn component_type_id() -> ComponentTypeId
    where
        Self: Sized,
    {
        ComponentTypeId::from_name(Self::type_name())
    }

    /// Per-frame simulation hook.
    ///
    /// # Errors
    ///
    /// A returned error aborts the current frame.
    fn update(&mut self, _owner: &mut GameObject) -> Result<(), ComponentError> {
        Ok(())
    }

    /// Render hook. Receives world-space data only; never feeds back.
    fn draw(&self, _owner: &GameObject, _canvas: &mut dyn Canvas) {}

    /// Called by the collision pass when the owner overlaps `other` and the
    /// group/mask filter passed.
    ///
    /// # Errors
    ///
    /// A returned error aborts the collision pass.
    fn handle_collision(
        &mut self,
        _owner: &mut GameObject,
        _other: &mut GameObject,
    ) -> Result<(), ComponentError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Armor {
        rating: f32,
    }

    impl Component for Armor {
        fn type_name() -> &'static str {
            "Armor"
        }
    }

    struct Speed;

    impl Component for Speed {
        fn type_name() -> &'static str {
            "Speed"
        }
    }

    #[test]
    fn test_tag_follows_name() {
        assert_eq!(Armor::component_type_id(), ComponentTypeId::from_name("Armor"));
        assert_eq!(ComponentTypeId::of::<Armor>(), Armor::component_type_id());
        assert_ne!(Armor::component_type_id(), Speed::component_type_id());
    }

    #[test]
    fn test_fnv1a_reference_values() {
        assert_eq!(ComponentTypeId::from_name("").0, 0xcbf2_9ce4_8422_2325);
        assert_eq!(ComponentTypeId::from_name("a").0, 0xaf63_dc4c_8601_ec8c);
    }

    #[test]
    fn test_erased_component_downcasts() {
        let boxed: Box<dyn Component> = Box::new(Armor { rating: 3.5 });
        let erased: &dyn Component = boxed.as_ref();
        assert_eq!(erased.as_any().downcast_ref::<Armor>().map(|a| a.rating), Some(3.5));
        assert!(erased.as_any().downcast_ref::<Speed>().is_none());
    }
}

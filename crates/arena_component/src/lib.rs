//! # arena_component
//!
//! The composition layer of the arena simulation: what a component is, how a
//! game object owns and looks up its components, and the interfaces the
//! simulation uses to talk to rendering and resource collaborators.
//!
//! This crate provides:
//!
//! - [`Component`] trait: per-frame `update`, `draw`, and `handle_collision` hooks.
//! - [`ComponentTypeId`]: FNV-1a capability tags used for lookup.
//! - [`GameObject`]: ordered owned components, active flag, world requests.
//! - [`Entity`] and [`EntityAllocator`]: world-assigned object ids.
//! - [`Canvas`] and [`SpriteProvider`]: collaborator boundaries.

pub mod component;
pub mod entity;
pub mod error;
pub mod frame;
pub mod object;
pub mod render;

pub use component::{AsAny, Component, ComponentTypeId};
pub use entity::{Entity, EntityAllocator};
pub use error::{ComponentError, ResourceError};
pub use frame::{FrameContext, TargetInfo};
pub use object::{Deferred, GameObject, MeleeSweep, WorldRequest};
pub use render::{Canvas, Flip, SpriteHandle, SpriteProvider};

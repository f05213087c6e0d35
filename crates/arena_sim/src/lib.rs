//! # arena_sim
//!
//! The arena action game, minus pixels and sound.
//!
//! - [`World`]: depth layers, group index, target tracking, and the
//!   per-frame update and collision passes.
//! - [`CollisionManager`]: group/mask filtered pair tests over hit boxes.
//! - [`components`]: movement paths, combat, attacks, projectiles, AI glue.
//! - [`actors`]: the player, the monster roster, and their projectiles.
//! - [`FrameLoop`] and [`SceneStack`]: the fixed-step driver and its modes.
//! - [`PlayScene`]: one stage from spawn to victory or defeat.
//!
//! Stages, sprites, and player progress arrive through [`StageCatalog`],
//! [`SpriteAtlas`], and [`ProgressStore`] so a run can be driven headless.

pub mod actors;
pub mod assets;
pub mod camera;
pub mod collision;
pub mod components;
pub mod config;
pub mod error;
pub mod input;
pub mod play;
pub mod progress;
pub mod registry;
pub mod stage;
pub mod tick;
pub mod world;

pub use assets::SpriteAtlas;
pub use camera::Camera;
pub use collision::CollisionManager;
pub use config::SimConfig;
pub use error::SimError;
pub use input::{InputSource, Key, KeyEvent, ScriptedEvent, ScriptedInput};
pub use play::{Outcome, PlayScene};
pub use progress::{MemoryProgress, PlayerProgress, ProgressStore};
pub use registry::{MonsterRegistry, SpawnContext};
pub use stage::{MonsterSpawn, StageCatalog, StageDefinition};
pub use tick::{FrameConfig, FrameLoop, Scene, SceneStack, Transition};
pub use world::{ACTOR_DEPTH, BACKGROUND_DEPTH, World};

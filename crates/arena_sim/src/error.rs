//! Simulation-level error types.

use arena_behavior::StateMachineError;
use arena_component::{ComponentError, ResourceError};

/// Errors raised while building or running a simulation.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// A component hook or object construction failed.
    #[error(transparent)]
    Component(#[from] ComponentError),

    /// A sprite could not be resolved while constructing an actor.
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// A state machine table was wired incorrectly.
    #[error(transparent)]
    StateMachine(#[from] StateMachineError),

    /// Stage data named a monster type with no registered constructor.
    #[error("unknown monster type: {0}")]
    UnknownMonster(String),

    #[error("unknown stage: {0}")]
    UnknownStage(u32),

    #[error("depth {depth} is outside the {layers} world layers")]
    InvalidDepth { depth: usize, layers: usize },

    /// Stage, config, or input script JSON could not be parsed.
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

//! # arena_behavior
//!
//! Decision and animation control for AI-driven and player objects.
//!
//! - [`BehaviorTree`]: Selector/Sequence/Condition/Action nodes re-walked
//!   from the root every tick. The tree holds no state of its own; multi-frame
//!   behaviours keep their phase in the context they are run against.
//! - [`StateMachine`]: event-driven states with predicate-guarded transition
//!   tables, first match wins, exit-then-enter on every change.
//!
//! Both are generic over the context type they drive.

pub mod behavior_tree;
pub mod error;
pub mod state_machine;

pub use behavior_tree::{BehaviorTree, Node, Status};
pub use error::StateMachineError;
pub use state_machine::{State, StateId, StateMachine, StateMachineBuilder};

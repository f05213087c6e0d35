//! Behavior tree executor.
//!
//! A tree is built once and evaluated from the root on every tick. Nodes
//! report [`Status::Success`], [`Status::Fail`], or [`Status::Running`]:
//!
//! - **Selector** returns the first child result that is not `Fail`.
//! - **Sequence** returns the first child result that is not `Success`.
//! - **Condition** maps a predicate to `Success`/`Fail`, never `Running`.
//! - **Action** returns whatever its callback returns.
//!
//! No child is evaluated after a short-circuit within the same tick.

use std::fmt;

use tracing::trace;

/// Result of evaluating a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Fail,
    Running,
}

pub type Predicate<C> = Box<dyn Fn(&C) -> bool>;
pub type Callback<C> = Box<dyn Fn(&mut C) -> Status>;

/// A node in a behavior tree over context `C`.
pub enum Node<C: ?Sized> {
    Selector {
        name: &'static str,
        children: Vec<Node<C>>,
    },
    Sequence {
        name: &'static str,
        children: Vec<Node<C>>,
    },
    Condition {
        name: &'static str,
        predicate: Predicate<C>,
    },
    Action {
        name: &'static str,
        callback: Callback<C>,
    },
}

impl<C: ?Sized> Node<C> {
    /// Create a selector (fallback) node.
    #[must_use]
    pub fn selector(name: &'static str, children: Vec<Node<C>>) -> Self {
        Self::Selector { name, children }
    }

    /// Create a sequence node.
    #[must_use]
    pub fn sequence(name: &'static str, children: Vec<Node<C>>) -> Self {
        Self::Sequence { name, children }
    }

    /// Leaf that answers `Success` or `Fail` from `predicate`.
    #[must_use]
    pub fn condition(name: &'static str, predicate: impl Fn(&C) -> bool + 'static) -> Self {
        Self::Condition {
            name,
            predicate: Box::new(predicate),
        }
    }

    /// Leaf that runs `callback` and returns whatever it reports.
    #[must_use]
    pub fn action(name: &'static str, callback: impl Fn(&mut C) -> Status + 'static) -> Self {
        Self::Action {
            name,
            callback: Box::new(callback),
        }
    }

    /// Label given at construction, used in trace output.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Selector { name, .. }
            | Self::Sequence { name, .. }
            | Self::Condition { name, .. }
            | Self::Action { name, .. } => *name,
        }
    }

    /// Evaluate this node and, for composites, its children.
    pub fn tick(&self, ctx: &mut C) -> Status {
        match self {
            Self::Selector { children, .. } => {
                for child in children {
                    let status = child.tick(ctx);
                    if status != Status::Fail {
                        return status;
                    }
                }
                Status::Fail
            }
            Self::Sequence { children, .. } => {
                for child in children {
                    let status = child.tick(ctx);
                    if status != Status::Success {
                        return status;
                    }
                }
                Status::Success
            }
            Self::Condition { predicate, .. } => {
                if predicate(ctx) {
                    Status::Success
                } else {
                    Status::Fail
                }
            }
            Self::Action { callback, .. } => callback(ctx),
        }
    }
}

impl<C: ?Sized> fmt::Debug for Node<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Selector { name, children } => {
                f.debug_struct("Selector").field("name", name).field("children", children).finish()
            }
            Self::Sequence { name, children } => {
                f.debug_struct("Sequence").field("name", name).field("children", children).finish()
            }
            Self::Condition { name, .. } => f.debug_tuple("Condition").field(name).finish(),
            Self::Action { name, .. } => f.debug_tuple("Action").field(name).finish(),
        }
    }
}

/// A named tree with a single root node.
pub struct BehaviorTree<C: ?Sized> {
    name: &'static str,
    root: Node<C>,
}

impl<C: ?Sized> BehaviorTree<C> {
    /// Wraps `root` under a tree name.
    #[must_use]
    pub fn new(name: &'static str, root: Node<C>) -> Self {
        Self { name, root }
    }

    /// Tree name, logged with every evaluation.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Top node of the tree.
    #[must_use]
    pub fn root(&self) -> &Node<C> {
        &self.root
    }

    /// Walk the tree from the root once.
    pub fn run(&self, ctx: &mut C) -> Status {
        let status = self.root.tick(ctx);
        trace!(tree = self.name, ?status, "behavior tree evaluated");
        status
    }
}

impl<C: ?Sized> fmt::Debug for BehaviorTree<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BehaviorTree")
            .field("name", &self.name)
            .field("root", &self.root)
            .finish()
    }
}

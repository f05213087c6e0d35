//! Behavior-tree driven AI.

use std::fmt;

use arena_behavior::{BehaviorTree, Status};
use arena_component::{Component, ComponentError, GameObject};
use tracing::debug;

use super::combat::CombatComponent;

/// Runs a monster's behavior tree once per frame.
///
/// Timers and phase flags live in the actor's own state component; the tree
/// only dispatches. A monster whose hit points reached zero despawns on its
/// next update instead of thinking.
pub struct BehaviorComponent {
    tree: BehaviorTree<GameObject>,
    last: Option<Status>,
}

impl BehaviorComponent {
    /// Runs `tree` against the owner every frame.
    #[must_use]
    pub fn new(tree: BehaviorTree<GameObject>) -> Self {
        Self { tree, last: None }
    }

    /// Result of the most recent tick.
    #[must_use]
    pub fn last_status(&self) -> Option<Status> {
        self.last
    }
}

impl fmt::Debug for BehaviorComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BehaviorComponent")
            .field("tree", &self.tree.name())
            .field("last", &self.last)
            .finish()
    }
}

impl Component for BehaviorComponent {
    fn type_name() -> &'static str {
        "Behavior"
    }

    fn update(&mut self, owner: &mut GameObject) -> Result<(), ComponentError> {
        if owner.get::<CombatComponent>().is_some_and(CombatComponent::is_dead) {
            debug!(monster = owner.label(), id = %owner.id(), "defeated");
            owner.despawn();
            return Ok(());
        }
        self.last = Some(self.tree.run(owner));
        Ok(())
    }
}

/// Marks an object as a monster of the given kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonsterTag {
    pub kind: String,
}

impl MonsterTag {
    /// Marks the owner as a monster of `kind`.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self { kind: kind.into() }
    }
}

impl Component for MonsterTag {
    fn type_name() -> &'static str {
        "MonsterTag"
    }
}

#[cfg(test)]
mod tests {
    use arena_behavior::Node;

    use super::*;

    struct Ticks(u32);

    impl Component for Ticks {
        fn type_name() -> &'static str {
            "Ticks"
        }
    }

    fn thinker(hp: f32) -> GameObject {
        let tree = BehaviorTree::new(
            "count",
            Node::action("tick", |owner: &mut GameObject| {
                if let Some(ticks) = owner.get_mut::<Ticks>() {
                    ticks.0 += 1;
                }
                Status::Running
            }),
        );
        GameObject::new("slime")
            .attach(Ticks(0))
            .and_then(|o| o.attach(CombatComponent::new(hp)))
            .and_then(|o| o.attach(BehaviorComponent::new(tree)))
            .expect("distinct components")
    }

    #[test]
    fn test_tree_runs_every_update() {
        let mut obj = thinker(10.0);
        obj.update().expect("update");
        obj.update().expect("update");
        assert_eq!(obj.get::<Ticks>().map(|t| t.0), Some(2));
        assert_eq!(obj.get::<BehaviorComponent>().and_then(BehaviorComponent::last_status), Some(Status::Running));
    }

    #[test]
    fn test_dead_monster_despawns_instead_of_thinking() {
        let mut obj = thinker(10.0);
        if let Some(combat) = obj.get_mut::<CombatComponent>() {
            combat.take_damage(10.0);
        }
        obj.update().expect("update");
        assert!(!obj.is_active());
        assert_eq!(obj.get::<Ticks>().map(|t| t.0), Some(0));
    }
}

//! Locomotion/animation state machine as a component.

use std::fmt;

use arena_behavior::{StateId, StateMachine};
use arena_component::{Canvas, Component, ComponentError, GameObject};

use crate::input::KeyEvent;

/// Events understood by actor state machines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StateEvent {
    Input(KeyEvent),
    Run,
    Stop,
    /// The swing ended; `moving` says whether movement keys are held.
    AttackFinished { moving: bool },
    Died,
}

pub type ActorMachine = StateMachine<GameObject, StateEvent>;

/// Owns an actor's state machine and enters its initial state on the first
/// update.
pub struct ActorStateMachine {
    machine: ActorMachine,
    started: bool,
}

impl ActorStateMachine {
    /// Wraps `machine`; it starts on the first update.
    #[must_use]
    pub fn new(machine: ActorMachine) -> Self {
        Self {
            machine,
            started: false,
        }
    }

    /// Name of the active state.
    #[must_use]
    pub fn current(&self) -> StateId {
        self.machine.current()
    }

    /// # Errors
    ///
    /// An unknown current state is reported as a hook failure.
    pub fn dispatch(&mut self, owner: &mut GameObject, event: &StateEvent) -> Result<bool, ComponentError> {
        self.ensure_started(owner)?;
        self.machine
            .handle_event(owner, event)
            .map_err(|err| ComponentError::hook(Self::type_name(), err))
    }

    fn ensure_started(&mut self, owner: &mut GameObject) -> Result<(), ComponentError> {
        if !self.started {
            self.started = true;
            self.machine
                .start(owner)
                .map_err(|err| ComponentError::hook(Self::type_name(), err))?;
        }
        Ok(())
    }
}

impl fmt::Debug for ActorStateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorStateMachine")
            .field("machine", &self.machine)
            .field("started", &self.started)
            .finish()
    }
}

impl Component for ActorStateMachine {
    fn type_name() -> &'static str {
        "StateMachine"
    }

    fn update(&mut self, owner: &mut GameObject) -> Result<(), ComponentError> {
        self.ensure_started(owner)?;
        self.machine.update(owner);
        Ok(())
    }

    fn draw(&self, owner: &GameObject, canvas: &mut dyn Canvas) {
        self.machine.draw(owner, canvas);
    }
}

/// Sends `event` to `owner`'s state machine. Returns `false` if no
/// transition fired or the owner has no state machine.
///
/// # Errors
///
/// Propagates a state-machine wiring error.
pub fn send_event(owner: &mut GameObject, event: StateEvent) -> Result<bool, ComponentError> {
    owner
        .with_component::<ActorStateMachine, _>(|machine, owner| machine.dispatch(owner, &event))
        .unwrap_or(Ok(false))
}

/// Current state name, if `owner` has a state machine that is not running
/// its own hook right now.
#[must_use]
pub fn current_state(owner: &GameObject) -> Option<StateId> {
    owner.get::<ActorStateMachine>().map(ActorStateMachine::current)
}

#[cfg(test)]
mod tests {
    use arena_behavior::State;

    use super::*;
    use crate::input::Key;

    struct Tag(StateId);

    impl State<GameObject, StateEvent> for Tag {
        fn name(&self) -> StateId {
            self.0
        }

        fn enter(&mut self, ctx: &mut GameObject, _event: Option<&StateEvent>) {
            if self.0 == "Die" {
                ctx.despawn();
            }
        }
    }

    fn actor() -> GameObject {
        let machine = ActorMachine::builder()
            .state(Tag("Idle"))
            .state(Tag("Attack"))
            .state(Tag("Die"))
            .transition("Idle", |e| matches!(e, StateEvent::Input(k) if k.key == Key::Attack), "Attack")
            .transition("Idle", |e| *e == StateEvent::Died, "Die")
            .transition("Attack", |e| *e == StateEvent::Died, "Die")
            .initial("Idle")
            .build()
            .expect("valid table");
        GameObject::new("actor")
            .attach(ActorStateMachine::new(machine))
            .expect("attach")
    }

    #[test]
    fn test_send_event_drives_transition() {
        let mut obj = actor();
        assert_eq!(current_state(&obj), Some("Idle"));
        assert!(!send_event(&mut obj, StateEvent::Stop).expect("dispatch"));
        assert!(send_event(&mut obj, StateEvent::Input(KeyEvent::down(Key::Attack))).expect("dispatch"));
        assert_eq!(current_state(&obj), Some("Attack"));
    }

    #[test]
    fn test_state_hooks_reach_owner() {
        let mut obj = actor();
        obj.update().expect("update");
        assert!(send_event(&mut obj, StateEvent::Died).expect("dispatch"));
        assert!(!obj.is_active());
        assert_eq!(current_state(&obj), Some("Die"));
    }

    #[test]
    fn test_send_event_without_machine() {
        let mut obj = GameObject::new("rock");
        assert!(!send_event(&mut obj, StateEvent::Died).expect("dispatch"));
        assert_eq!(current_state(&obj), None);
    }
}

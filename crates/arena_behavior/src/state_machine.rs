//! Event-driven finite-state machine.
//!
//! Each state owns a transition list of `(guard, next)` pairs. On an event
//! the first guard that accepts it wins and the machine changes state:
//! `exit` on the old state, then the switch, then `enter` on the new one.
//! `update` only ever runs the current state's per-frame hook; transitions
//! happen through events alone.
//!
//! The table is validated when the machine is built. Referring to an
//! unknown state afterwards is a wiring bug and is reported as an error.

use std::collections::HashMap;
use std::fmt;

use arena_component::Canvas;
use tracing::debug;

use crate::error::StateMachineError;

/// State names double as identifiers.
pub type StateId = &'static str;

pub type Guard<E> = Box<dyn Fn(&E) -> bool>;

/// Handler for one state, driving context `C` with events `E`.
pub trait State<C: ?Sized, E> {
    fn name(&self) -> StateId;

    /// Called after the machine switched to this state.
    fn enter(&mut self, _ctx: &mut C, _event: Option<&E>) {}

    /// Called before the machine leaves this state.
    fn exit(&mut self, _ctx: &mut C, _event: Option<&E>) {}

    /// Per-frame hook while current.
    fn update(&mut self, _ctx: &mut C) {}

    fn draw(&self, _ctx: &C, _canvas: &mut dyn Canvas) {}
}

struct Transition<E> {
    guard: Guard<E>,
    next: StateId,
}

/// Collects states and transitions, then validates them into a
/// [`StateMachine`].
pub struct StateMachineBuilder<C: ?Sized, E> {
    states: Vec<Box<dyn State<C, E>>>,
    transitions: Vec<(StateId, Transition<E>)>,
    initial: Option<StateId>,
}

impl<C: ?Sized, E> StateMachineBuilder<C, E> {
    /// Empty builder with no states and no initial state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            transitions: Vec::new(),
            initial: None,
        }
    }

    /// Registers a handler under its own [`State::name`].
    #[must_use]
    pub fn state(mut self, state: impl State<C, E> + 'static) -> Self {
        self.states.push(Box::new(state));
        self
    }

    /// Adds `from → next` guarded by `guard`. Order of calls is match order.
    #[must_use]
    pub fn transition(mut self, from: StateId, guard: impl Fn(&E) -> bool + 'static, next: StateId) -> Self {
        self.transitions.push((
            from,
            Transition {
                guard: Box::new(guard),
                next,
            },
        ));
        self
    }

    /// State entered by [`StateMachine::start`].
    #[must_use]
    pub fn initial(mut self, state: StateId) -> Self {
        self.initial = Some(state);
        self
    }

    /// # Errors
    ///
    /// - [`StateMachineError::InvalidTable`] for a missing initial state or a
    ///   duplicate state name.
    /// - [`StateMachineError::UnknownState`] when the initial state or a
    ///   transition endpoint was never registered.
    pub fn build(self) -> Result<StateMachine<C, E>, StateMachineError> {
        let initial = self
            .initial
            .ok_or_else(|| StateMachineError::InvalidTable("no initial state".into()))?;

        let mut states: HashMap<StateId, Box<dyn State<C, E>>> = HashMap::new();
        let mut table: HashMap<StateId, Vec<Transition<E>>> = HashMap::new();
        for state in self.states {
            let name = state.name();
            if states.insert(name, state).is_some() {
                return Err(StateMachineError::InvalidTable(format!("duplicate state '{name}'")));
            }
            table.insert(name, Vec::new());
        }

        if !states.contains_key(initial) {
            return Err(StateMachineError::UnknownState(initial.into()));
        }
        for (from, transition) in self.transitions {
            if !states.contains_key(transition.next) {
                return Err(StateMachineError::UnknownState(transition.next.into()));
            }
            table
                .get_mut(from)
                .ok_or_else(|| StateMachineError::UnknownState(from.into()))?
                .push(transition);
        }

        Ok(StateMachine {
            states,
            table,
            current: initial,
        })
    }
}

impl<C: ?Sized, E> Default for StateMachineBuilder<C, E> {
    fn default() -> Self {
        Self::new()
    }
}

/// A validated state machine.
pub struct StateMachine<C: ?Sized, E> {
    states: HashMap<StateId, Box<dyn State<C, E>>>,
    table: HashMap<StateId, Vec<Transition<E>>>,
    current: StateId,
}

impl<C: ?Sized, E> StateMachine<C, E> {
    /// Starts a [`StateMachineBuilder`].
    #[must_use]
    pub fn builder() -> StateMachineBuilder<C, E> {
        StateMachineBuilder::new()
    }

    /// Name of the active state.
    #[must_use]
    pub fn current(&self) -> StateId {
        self.current
    }

    /// Enters the initial state without an event.
    ///
    /// # Errors
    ///
    /// [`StateMachineError::UnknownState`] if the current state is missing.
    pub fn start(&mut self, ctx: &mut C) -> Result<(), StateMachineError> {
        let current = self.current;
        self.state_mut(current)?.enter(ctx, None);
        Ok(())
    }

    /// Dispatches `event`. Returns `true` if a transition fired; an event no
    /// guard accepts is a no-op.
    ///
    /// # Errors
    ///
    /// [`StateMachineError::UnknownState`] if the current state has no row
    /// in the table.
    pub fn handle_event(&mut self, ctx: &mut C, event: &E) -> Result<bool, StateMachineError> {
        let row = self
            .table
            .get(self.current)
            .ok_or_else(|| StateMachineError::UnknownState(self.current.into()))?;
        let Some(next) = row.iter().find(|t| (t.guard)(event)).map(|t| t.next) else {
            return Ok(false);
        };
        self.change_state(ctx, next, Some(event))?;
        Ok(true)
    }

    /// Exit the current state, switch, then enter `next`.
    ///
    /// # Errors
    ///
    /// [`StateMachineError::UnknownState`] if `next` is not a known state.
    pub fn change_state(&mut self, ctx: &mut C, next: StateId, event: Option<&E>) -> Result<(), StateMachineError> {
        if !self.states.contains_key(next) {
            return Err(StateMachineError::UnknownState(next.into()));
        }
        let previous = self.current;
        self.state_mut(previous)?.exit(ctx, event);
        self.current = next;
        debug!(from = previous, to = next, "state changed");
        self.state_mut(next)?.enter(ctx, event);
        Ok(())
    }

    /// Runs the current state's per-frame hook.
    pub fn update(&mut self, ctx: &mut C) {
        if let Some(state) = self.states.get_mut(self.current) {
            state.update(ctx);
        }
    }

    /// Forwards to the active state's `draw`.
    pub fn draw(&self, ctx: &C, canvas: &mut dyn Canvas) {
        if let Some(state) = self.states.get(self.current) {
            state.draw(ctx, canvas);
        }
    }

    fn state_mut(&mut self, id: StateId) -> Result<&mut Box<dyn State<C, E>>, StateMachineError> {
        self.states
            .get_mut(id)
            .ok_or_else(|| StateMachineError::UnknownState(id.into()))
    }
}

impl<C: ?Sized, E> fmt::Debug for StateMachine<C, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut states: Vec<_> = self.states.keys().copied().collect();
        states.sort_unstable();
        f.debug_struct("StateMachine")
            .field("current", &self.current)
            .field("states", &states)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Event {
        Run,
        Stop,
        Died,
    }

    #[derive(Default)]
    struct Journal {
        entries: Vec<String>,
        frames: u32,
    }

    struct Named(StateId);

    impl State<Journal, Event> for Named {
        fn name(&self) -> StateId {
            self.0
        }

        fn enter(&mut self, ctx: &mut Journal, event: Option<&Event>) {
            ctx.entries.push(format!("{}.enter({event:?})", self.0));
        }

        fn exit(&mut self, ctx: &mut Journal, _event: Option<&Event>) {
            ctx.entries.push(format!("{}.exit", self.0));
        }

        fn update(&mut self, ctx: &mut Journal) {
            ctx.frames += 1;
        }
    }

    fn machine() -> StateMachine<Journal, Event> {
        StateMachine::<Journal, Event>::builder()
            .state(Named("Idle"))
            .state(Named("Run"))
            .state(Named("Die"))
            .transition("Idle", |e| *e == Event::Run, "Run")
            .transition("Idle", |e| *e == Event::Died, "Die")
            .transition("Run", |e| *e == Event::Stop, "Idle")
            .transition("Run", |e| *e == Event::Died, "Die")
            .initial("Idle")
            .build()
            .expect("valid table")
    }

    #[test]
    fn test_run_event_exits_idle_then_enters_run() {
        let mut sm = machine();
        let mut journal = Journal::default();
        assert!(sm.handle_event(&mut journal, &Event::Run).expect("known state"));
        assert_eq!(sm.current(), "Run");
        assert_eq!(journal.entries, vec!["Idle.exit", "Run.enter(Some(Run))"]);
    }

    #[test]
    fn test_unmatched_event_is_noop() {
        let mut sm = machine();
        let mut journal = Journal::default();
        assert!(!sm.handle_event(&mut journal, &Event::Stop).expect("known state"));
        assert_eq!(sm.current(), "Idle");
        assert!(journal.entries.is_empty());
    }

    #[test]
    fn test_terminal_state_ignores_events() {
        let mut sm = machine();
        let mut journal = Journal::default();
        sm.handle_event(&mut journal, &Event::Died).expect("known state");
        assert_eq!(sm.current(), "Die");
        assert!(!sm.handle_event(&mut journal, &Event::Run).expect("known state"));
        assert_eq!(sm.current(), "Die");
    }

    #[test]
    fn test_first_matching_transition_wins() {
        let mut sm: StateMachine<Journal, Event> = StateMachine::builder()
            .state(Named("Idle"))
            .state(Named("A"))
            .state(Named("B"))
            .transition("Idle", |_| true, "A")
            .transition("Idle", |_| true, "B")
            .initial("Idle")
            .build()
            .expect("valid table");
        let mut journal = Journal::default();
        sm.handle_event(&mut journal, &Event::Run).expect("known state");
        assert_eq!(sm.current(), "A");
    }

    #[test]
    fn test_update_runs_current_state_only() {
        let mut sm = machine();
        let mut journal = Journal::default();
        sm.start(&mut journal).expect("started");
        sm.update(&mut journal);
        sm.update(&mut journal);
        assert_eq!(journal.frames, 2);
        assert_eq!(sm.current(), "Idle");
        assert_eq!(journal.entries, vec!["Idle.enter(None)"]);
    }

    #[test]
    fn test_change_to_unknown_state_fails() {
        let mut sm = machine();
        let mut journal = Journal::default();
        let err = sm.change_state(&mut journal, "Fly", None);
        assert!(matches!(err, Err(StateMachineError::UnknownState(name)) if name == "Fly"));
        assert_eq!(sm.current(), "Idle");
        assert!(journal.entries.is_empty());
    }

    #[test]
    fn test_build_rejects_bad_tables() {
        let missing_target = StateMachine::<Journal, Event>::builder()
            .state(Named("Idle"))
            .transition("Idle", |_| true, "Run")
            .initial("Idle")
            .build();
        assert!(matches!(missing_target, Err(StateMachineError::UnknownState(_))));

        let duplicate = StateMachine::<Journal, Event>::builder()
            .state(Named("Idle"))
            .state(Named("Idle"))
            .initial("Idle")
            .build();
        assert!(matches!(duplicate, Err(StateMachineError::InvalidTable(_))));

        let no_initial = StateMachine::<Journal, Event>::builder().state(Named("Idle")).build();
        assert!(matches!(no_initial, Err(StateMachineError::InvalidTable(_))));
    }
}

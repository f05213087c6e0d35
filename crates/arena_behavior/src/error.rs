//! Behavior-layer error types.

/// Wiring errors in a state machine's transition table.
#[derive(Debug, thiserror::Error)]
pub enum StateMachineError {
    /// A state was referenced that the machine does not know.
    #[error("state '{0}' is not in the transition table")]
    UnknownState(String),

    /// The table is malformed (no initial state, duplicate state names).
    #[error("invalid transition table: {0}")]
    InvalidTable(String),
}

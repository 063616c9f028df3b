use thiserror::Error;

/// Errors that can occur when defining or driving a state machine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateMachineError {
    /// Transition target is neither a state of the definition nor the none state
    #[error("State index {state} out of range for state machine '{tag}' ({count} states)")]
    StateOutOfRange {
        tag: &'static str,
        state: usize,
        count: usize,
    },

    /// A conditional points at a state the definition does not have
    #[error("Conditional {conditional} of state {state} in state machine '{tag}' targets state {target}, but only {count} states are defined")]
    InvalidConditionalTarget {
        tag: &'static str,
        state: usize,
        conditional: usize,
        target: usize,
        count: usize,
    },
}

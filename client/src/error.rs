use thiserror::Error;

use cmdlink_shared::{CmdQueueError, StateMachineError};

/// Errors that can occur while setting up or driving a session
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// A session or phase state machine definition failed validation
    #[error("Invalid session state machine: {0}")]
    StateMachine(#[from] StateMachineError),

    /// The session's command queue refused an operation
    #[error("Command queue error: {0}")]
    Queue(#[from] CmdQueueError),

    /// `start()` called on a session that is already running
    #[error("Session already started (currently in {state})")]
    AlreadyStarted { state: &'static str },

    /// Operation requires a known peer but none has announced itself yet
    #[error("No peer known yet; wait for the connect phase to complete")]
    NoPeer,
}

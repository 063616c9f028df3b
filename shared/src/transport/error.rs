use thiserror::Error;

use crate::types::Destination;

/// The transport refused a block
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    /// No endpoint is reachable at the destination
    #[error("No endpoint reachable at {destination}")]
    Unreachable { destination: Destination },

    /// Block larger than the transport's frame limit
    #[error("Block of {size} bytes exceeds the transport limit of {max} bytes")]
    TooLarge { size: usize, max: usize },

    /// The transport is currently rejecting writes
    #[error("Transport rejected the write: {reason}")]
    Rejected { reason: &'static str },
}

/// The transport could not be polled
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecvError {
    /// The endpoint has been detached from its network
    #[error("Transport endpoint is closed")]
    Closed,
}

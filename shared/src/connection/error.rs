use thiserror::Error;

use crate::{
    packet::error::PacketError,
    transport::{RecvError, SendError},
};

/// Errors raised by packet framing over a transport
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IoError {
    /// The transport rejected an outgoing block
    #[error("Transport send failed: {0}")]
    Send(#[from] SendError),

    /// The transport could not be polled
    #[error("Transport receive failed: {0}")]
    Recv(#[from] RecvError),

    /// A received block is not a valid packet
    #[error("Invalid packet: {0}")]
    Packet(#[from] PacketError),
}

use thiserror::Error;

use crate::types::PacketId;

/// Errors that can occur during command queue operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CmdQueueError {
    /// Packet's leading byte is not a defined command code
    #[error("Cannot queue packet with command code {code}. Only defined command codes may be sent through the command queue")]
    InvalidCommand { code: u8 },

    /// Packet id already present in the command's list
    #[error("Duplicate packet id {id} not allowed in a command list")]
    DuplicateId { id: PacketId },

    /// ACK packets cannot be looped back locally
    #[error("forced_receive() cannot be used with ACK packets. ACKs are only meaningful to the queue that sent the acknowledged packet")]
    ForcedAck,
}

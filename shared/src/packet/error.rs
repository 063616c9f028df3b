use thiserror::Error;

use crate::packet::command::Command;

/// Errors that can occur while building, framing or parsing a packet
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PacketError {
    /// Leading tag byte is not the packet prefix
    #[error("Invalid packet prefix 0x{found:02x} (expected 0x{expected:02x}). The block is not a framed packet")]
    InvalidPrefix { found: u8, expected: u8 },

    /// Declared payload length is zero or larger than a long packet
    #[error("Invalid payload length {length}. Payload length must be between 1 and {max} bytes")]
    InvalidLength { length: usize, max: usize },

    /// Received block is shorter than the header claims
    #[error("Truncated packet: header declares {expected} bytes but only {actual} were received")]
    Truncated { expected: usize, actual: usize },

    /// Command code outside the defined command range
    #[error("Unknown command code {code}. Valid command codes are 0 through {max}")]
    UnknownCommand { code: u8, max: u8 },

    /// Checksum carried in the header does not match the recomputed one
    #[error("Checksum mismatch on packet {id}: header carries 0x{found:04x}, computed 0x{computed:04x}")]
    ChecksumMismatch { id: u32, found: u16, computed: u16 },

    /// Typed payload requested from a packet carrying another command
    #[error("Expected a {expected:?} payload but packet carries command code {found}")]
    WrongCommand { expected: Command, found: u8 },

    /// Typed payload could not be decoded from the packet bytes
    #[error("Malformed {command:?} payload: {reason}")]
    MalformedPayload {
        command: Command,
        reason: &'static str,
    },
}

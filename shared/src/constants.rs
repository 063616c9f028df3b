use crate::Tick;

/// Tag byte leading every framed packet.
pub const PACKET_PREFIX: u8 = 0xCC;

/// prefix:u8, length:u8, id:u32, sender:[u8;6], checksum:u16
pub const HEADER_SIZE: usize = 14;

pub const SHORT_PACKET_LENGTH: usize = 10;
pub const LONG_PACKET_LENGTH: usize = 72;

/// Largest block a transport is ever asked to carry.
pub const MAX_FRAME_SIZE: usize = HEADER_SIZE + LONG_PACKET_LENGTH;

/// Retry interval used by the session layer for lossless commands
/// (two seconds at the game's 70Hz tick).
pub const DEFAULT_RETRY_INTERVAL: Tick = 140;

/// Bytes (header + payload) the scheduler may put on the wire per tick.
pub const DEFAULT_BYTES_PER_TICK: usize = 512;

//! Typed views of the command-specific structures overlaid on packet data.
//! Byte 0 is always the command code; fields start at offset 1.

use crate::{
    constants::{LONG_PACKET_LENGTH, SHORT_PACKET_LENGTH},
    packet::{command::Command, error::PacketError},
    types::{PacketId, Tick},
};

pub trait CommandPayload: Sized {
    const COMMAND: Command;
    /// Declared payload length: short or long.
    const LENGTH: usize;

    /// Writes the fields into `data[1..]`. `data` is exactly `LENGTH` bytes
    /// and `data[0]` already holds the command code.
    fn write(&self, data: &mut [u8]);

    /// Reads the fields from `data`, which is exactly `LENGTH` bytes.
    fn read(data: &[u8]) -> Result<Self, PacketError>;
}

fn read_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

/// Acknowledges one lossless packet: `command:u8=0, ackedCommand:u8, ackedId:u32`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AckPayload {
    pub command: Command,
    pub id: PacketId,
}

impl CommandPayload for AckPayload {
    const COMMAND: Command = Command::Ack;
    const LENGTH: usize = SHORT_PACKET_LENGTH;

    fn write(&self, data: &mut [u8]) {
        data[1] = self.command.code();
        data[2..6].copy_from_slice(&self.id.to_le_bytes());
    }

    fn read(data: &[u8]) -> Result<Self, PacketError> {
        let command =
            Command::try_from(data[1]).map_err(|_| PacketError::MalformedPayload {
                command: Command::Ack,
                reason: "acknowledged command code out of range",
            })?;
        Ok(Self {
            command,
            id: read_u32(data, 2),
        })
    }
}

/// Announces the sender's player id on the port.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerIdSelf {
    pub player_id: u32,
}

impl CommandPayload for PlayerIdSelf {
    const COMMAND: Command = Command::PlayerIdSelf;
    const LENGTH: usize = SHORT_PACKET_LENGTH;

    fn write(&self, data: &mut [u8]) {
        data[1..5].copy_from_slice(&self.player_id.to_le_bytes());
    }

    fn read(data: &[u8]) -> Result<Self, PacketError> {
        Ok(Self {
            player_id: read_u32(data, 1),
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameRequestJoin {
    pub game_id: u16,
}

impl CommandPayload for GameRequestJoin {
    const COMMAND: Command = Command::GameRequestJoin;
    const LENGTH: usize = SHORT_PACKET_LENGTH;

    fn write(&self, data: &mut [u8]) {
        data[1..3].copy_from_slice(&self.game_id.to_le_bytes());
    }

    fn read(data: &[u8]) -> Result<Self, PacketError> {
        Ok(Self {
            game_id: read_u16(data, 1),
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameRespondJoin {
    pub game_id: u16,
    pub accepted: bool,
}

impl CommandPayload for GameRespondJoin {
    const COMMAND: Command = Command::GameRespondJoin;
    const LENGTH: usize = SHORT_PACKET_LENGTH;

    fn write(&self, data: &mut [u8]) {
        data[1..3].copy_from_slice(&self.game_id.to_le_bytes());
        data[3] = u8::from(self.accepted);
    }

    fn read(data: &[u8]) -> Result<Self, PacketError> {
        let accepted = match data[3] {
            0 => false,
            1 => true,
            _ => {
                return Err(PacketError::MalformedPayload {
                    command: Command::GameRespondJoin,
                    reason: "accepted flag must be 0 or 1",
                })
            }
        };
        Ok(Self {
            game_id: read_u16(data, 1),
            accepted,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameStart {
    pub game_id: u16,
    pub seed: u32,
}

impl CommandPayload for GameStart {
    const COMMAND: Command = Command::GameStart;
    const LENGTH: usize = SHORT_PACKET_LENGTH;

    fn write(&self, data: &mut [u8]) {
        data[1..3].copy_from_slice(&self.game_id.to_le_bytes());
        data[3..7].copy_from_slice(&self.seed.to_le_bytes());
    }

    fn read(data: &[u8]) -> Result<Self, PacketError> {
        Ok(Self {
            game_id: read_u16(data, 1),
            seed: read_u32(data, 3),
        })
    }
}

/// Periodic in-game synchronisation beat.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SyncPayload {
    pub tick: Tick,
    pub sequence: u16,
}

impl CommandPayload for SyncPayload {
    const COMMAND: Command = Command::Sync;
    const LENGTH: usize = SHORT_PACKET_LENGTH;

    fn write(&self, data: &mut [u8]) {
        data[1..5].copy_from_slice(&self.tick.to_le_bytes());
        data[5..7].copy_from_slice(&self.sequence.to_le_bytes());
    }

    fn read(data: &[u8]) -> Result<Self, PacketError> {
        Ok(Self {
            tick: read_u32(data, 1),
            sequence: read_u16(data, 5),
        })
    }
}

/// Longest text a long packet can carry after the command byte.
pub const MAX_TEXT_LENGTH: usize = LONG_PACKET_LENGTH - 1;

fn write_text(text: &str, data: &mut [u8]) {
    let bytes = truncate_utf8(text, MAX_TEXT_LENGTH).as_bytes();
    data[1..1 + bytes.len()].copy_from_slice(bytes);
}

fn read_text(command: Command, data: &[u8]) -> Result<String, PacketError> {
    let body = &data[1..];
    let end = body.iter().position(|b| *b == 0).unwrap_or(body.len());
    std::str::from_utf8(&body[..end])
        .map(str::to_owned)
        .map_err(|_| PacketError::MalformedPayload {
            command,
            reason: "text is not valid UTF-8",
        })
}

fn truncate_utf8(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Chat text, NUL-padded. Longer text is cut at a character boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextMessage {
    pub text: String,
}

impl TextMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl CommandPayload for TextMessage {
    const COMMAND: Command = Command::Message;
    const LENGTH: usize = LONG_PACKET_LENGTH;

    fn write(&self, data: &mut [u8]) {
        write_text(&self.text, data);
    }

    fn read(data: &[u8]) -> Result<Self, PacketError> {
        read_text(Self::COMMAND, data).map(|text| Self { text })
    }
}

/// Text shown by the town UI of the receiving peer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TownUiMessage {
    pub text: String,
}

impl TownUiMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl CommandPayload for TownUiMessage {
    const COMMAND: Command = Command::TownUiMessage;
    const LENGTH: usize = LONG_PACKET_LENGTH;

    fn write(&self, data: &mut [u8]) {
        write_text(&self.text, data);
    }

    fn read(data: &[u8]) -> Result<Self, PacketError> {
        read_text(Self::COMMAND, data).map(|text| Self { text })
    }
}

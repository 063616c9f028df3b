use std::fmt;

use crate::{
    constants::{HEADER_SIZE, LONG_PACKET_LENGTH, SHORT_PACKET_LENGTH},
    packet::{
        command::Command,
        error::PacketError,
        header::{checksum, PacketHeader},
        payloads::CommandPayload,
    },
    types::{Address, PacketId},
};

/// A header plus a long-sized payload buffer. Only the first
/// `header.length` bytes of `data` are meaningful; byte 0 is the command code.
#[derive(Clone, PartialEq, Eq)]
pub struct Packet {
    header: PacketHeader,
    data: [u8; LONG_PACKET_LENGTH],
}

impl Packet {
    pub fn short(payload: [u8; SHORT_PACKET_LENGTH]) -> Self {
        let mut data = [0u8; LONG_PACKET_LENGTH];
        data[..SHORT_PACKET_LENGTH].copy_from_slice(&payload);
        Self {
            header: PacketHeader::new(SHORT_PACKET_LENGTH as u8),
            data,
        }
    }

    pub fn long(payload: [u8; LONG_PACKET_LENGTH]) -> Self {
        Self {
            header: PacketHeader::new(LONG_PACKET_LENGTH as u8),
            data: payload,
        }
    }

    /// Builds a packet whose length is exactly `payload.len()`.
    pub fn with_length(payload: &[u8]) -> Result<Self, PacketError> {
        if payload.is_empty() || payload.len() > LONG_PACKET_LENGTH {
            return Err(PacketError::InvalidLength {
                length: payload.len(),
                max: LONG_PACKET_LENGTH,
            });
        }
        let mut data = [0u8; LONG_PACKET_LENGTH];
        data[..payload.len()].copy_from_slice(payload);
        Ok(Self {
            header: PacketHeader::new(payload.len() as u8),
            data,
        })
    }

    pub fn from_payload<P: CommandPayload>(payload: &P) -> Self {
        let mut data = [0u8; LONG_PACKET_LENGTH];
        data[0] = P::COMMAND.code();
        payload.write(&mut data[..P::LENGTH]);
        Self {
            header: PacketHeader::new(P::LENGTH as u8),
            data,
        }
    }

    /// Decodes the typed payload carried by this packet.
    pub fn payload<P: CommandPayload>(&self) -> Result<P, PacketError> {
        if self.command_code() != P::COMMAND.code() {
            return Err(PacketError::WrongCommand {
                expected: P::COMMAND,
                found: self.command_code(),
            });
        }
        if self.len() < P::LENGTH {
            return Err(PacketError::MalformedPayload {
                command: P::COMMAND,
                reason: "payload shorter than the command's fixed size",
            });
        }
        P::read(&self.data[..P::LENGTH])
    }

    pub fn header(&self) -> &PacketHeader {
        &self.header
    }

    pub fn id(&self) -> PacketId {
        self.header.id
    }

    pub fn set_id(&mut self, id: PacketId) {
        self.header.id = id;
    }

    pub fn sender(&self) -> Address {
        self.header.sender
    }

    pub fn set_sender(&mut self, sender: Address) {
        self.header.sender = sender;
    }

    /// Payload length declared in the header.
    pub fn len(&self) -> usize {
        self.header.length as usize
    }

    pub fn is_empty(&self) -> bool {
        self.header.length == 0
    }

    pub fn is_short(&self) -> bool {
        self.len() == SHORT_PACKET_LENGTH
    }

    pub fn is_long(&self) -> bool {
        self.len() == LONG_PACKET_LENGTH
    }

    /// Bytes this packet occupies on the wire.
    pub fn frame_size(&self) -> usize {
        HEADER_SIZE + self.len()
    }

    pub fn data(&self) -> &[u8] {
        &self.data[..self.len()]
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        let length = self.len();
        &mut self.data[..length]
    }

    pub fn command_code(&self) -> u8 {
        self.data[0]
    }

    pub fn command(&self) -> Result<Command, PacketError> {
        Command::try_from(self.command_code())
    }

    pub fn compute_checksum(&self) -> u16 {
        checksum(self.header.id, self.header.length, &self.data)
    }

    /// Stores the checksum of the current id, length and payload.
    pub fn seal(&mut self) {
        self.header.checksum = self.compute_checksum();
    }

    pub fn verify_checksum(&self) -> Result<(), PacketError> {
        let computed = self.compute_checksum();
        if computed == self.header.checksum {
            Ok(())
        } else {
            Err(PacketError::ChecksumMismatch {
                id: self.header.id,
                found: self.header.checksum,
                computed,
            })
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut header = [0u8; HEADER_SIZE];
        self.header.write(&mut header);

        let mut bytes = Vec::with_capacity(self.frame_size());
        bytes.extend_from_slice(&header);
        bytes.extend_from_slice(self.data());
        bytes
    }

    /// Parses a received block. Bytes past the declared length are ignored.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PacketError> {
        let header = PacketHeader::read(bytes)?;
        let expected = HEADER_SIZE + header.length as usize;
        if bytes.len() < expected {
            return Err(PacketError::Truncated {
                expected,
                actual: bytes.len(),
            });
        }

        let mut data = [0u8; LONG_PACKET_LENGTH];
        data[..header.length as usize].copy_from_slice(&bytes[HEADER_SIZE..expected]);
        Ok(Self { header, data })
    }
}

impl fmt::Debug for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Packet")
            .field("header", &self.header)
            .field("data", &self.data())
            .finish()
    }
}

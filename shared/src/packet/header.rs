use crate::{
    constants::{HEADER_SIZE, LONG_PACKET_LENGTH, PACKET_PREFIX},
    packet::error::PacketError,
    types::{Address, PacketId, ADDRESS_SIZE},
};

/// Fixed-layout header leading every packet on the wire:
/// `prefix:u8, length:u8, id:u32, sender:[u8;6], checksum:u16`, little-endian.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PacketHeader {
    pub prefix: u8,
    pub length: u8,
    pub id: PacketId,
    pub sender: Address,
    pub checksum: u16,
}

impl PacketHeader {
    pub fn new(length: u8) -> Self {
        Self {
            prefix: PACKET_PREFIX,
            length,
            id: 0,
            sender: Address::default(),
            checksum: 0,
        }
    }

    pub fn write(&self, out: &mut [u8; HEADER_SIZE]) {
        out[0] = self.prefix;
        out[1] = self.length;
        out[2..6].copy_from_slice(&self.id.to_le_bytes());
        out[6..12].copy_from_slice(self.sender.bytes());
        out[12..14].copy_from_slice(&self.checksum.to_le_bytes());
    }

    /// Parses a header, validating the prefix and the declared length.
    /// Does not check that the payload is present.
    pub fn read(bytes: &[u8]) -> Result<Self, PacketError> {
        if bytes.len() < HEADER_SIZE {
            return Err(PacketError::Truncated {
                expected: HEADER_SIZE,
                actual: bytes.len(),
            });
        }
        if bytes[0] != PACKET_PREFIX {
            return Err(PacketError::InvalidPrefix {
                found: bytes[0],
                expected: PACKET_PREFIX,
            });
        }
        let length = bytes[1];
        if length == 0 || length as usize > LONG_PACKET_LENGTH {
            return Err(PacketError::InvalidLength {
                length: length as usize,
                max: LONG_PACKET_LENGTH,
            });
        }

        let mut id = [0u8; 4];
        id.copy_from_slice(&bytes[2..6]);
        let mut sender = [0u8; ADDRESS_SIZE];
        sender.copy_from_slice(&bytes[6..12]);
        let mut checksum = [0u8; 2];
        checksum.copy_from_slice(&bytes[12..14]);

        Ok(Self {
            prefix: bytes[0],
            length,
            id: PacketId::from_le_bytes(id),
            sender: Address::new(sender),
            checksum: u16::from_le_bytes(checksum),
        })
    }
}

/// Error-detection checksum over a packet's id, length and payload.
///
/// Seeded with `id + length` (truncated to 16 bits); every payload byte at an
/// odd position is added, every byte at an even position is XORed in. Each
/// step is a bijection of the running value, so changing any single payload
/// byte always changes the result. This is not a cryptographic guarantee.
pub fn checksum(id: PacketId, length: u8, data: &[u8]) -> u16 {
    let mut sum = (id as u16).wrapping_add(u16::from(length));
    for (position, byte) in data.iter().take(length as usize).enumerate() {
        if position & 1 == 1 {
            sum = sum.wrapping_add(u16::from(*byte));
        } else {
            sum ^= u16::from(*byte);
        }
    }
    sum
}

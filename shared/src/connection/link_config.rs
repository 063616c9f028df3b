use crate::types::PacketId;

/// Where the packet id counter starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PacketIdSeed {
    Fixed(PacketId),
    /// Random start, so ids from separate runs of the same peer do not collide
    Random,
}

impl PacketIdSeed {
    pub fn first_id(&self) -> PacketId {
        match self {
            PacketIdSeed::Fixed(id) => *id,
            PacketIdSeed::Random => fastrand::u32(..),
        }
    }
}

/// Contains config properties which control packet framing on a port
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkConfig {
    /// Drop received packets whose checksum does not match their contents
    pub verify_checksums: bool,
    /// First id handed out by the packet id counter
    pub packet_id_seed: PacketIdSeed,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            verify_checksums: true,
            packet_id_seed: PacketIdSeed::Fixed(1),
        }
    }
}

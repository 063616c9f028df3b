use std::fmt;

/// Outer-loop tick counter. Retry deadlines are absolute ticks.
pub type Tick = u32;
/// Id stamped into every packet header at send time.
pub type PacketId = u32;

pub const ADDRESS_SIZE: usize = 6;

/// Opaque 6-byte hardware/unique address of a peer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; ADDRESS_SIZE]);

impl Address {
    pub const fn new(bytes: [u8; ADDRESS_SIZE]) -> Self {
        Self(bytes)
    }

    /// Convenience constructor for tests and local networks: the low bytes
    /// carry `index`, the top byte is a fixed locally-administered marker.
    pub const fn local(index: u16) -> Self {
        let [lo, hi] = index.to_le_bytes();
        Self([0x02, 0x00, 0x00, 0x00, hi, lo])
    }

    pub fn bytes(&self) -> &[u8; ADDRESS_SIZE] {
        &self.0
    }
}

impl From<[u8; ADDRESS_SIZE]> for Address {
    fn from(bytes: [u8; ADDRESS_SIZE]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

/// Where a queued packet goes: one peer, or every peer on the port.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Destination {
    Unicast(Address),
    Broadcast,
}

impl Destination {
    pub fn is_broadcast(&self) -> bool {
        matches!(self, Destination::Broadcast)
    }
}

impl From<Option<Address>> for Destination {
    fn from(address: Option<Address>) -> Self {
        match address {
            Some(address) => Destination::Unicast(address),
            None => Destination::Broadcast,
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Unicast(address) => address.fmt(f),
            Destination::Broadcast => f.write_str("broadcast"),
        }
    }
}

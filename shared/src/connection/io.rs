use log::trace;

use crate::{
    connection::{error::IoError, link_config::LinkConfig},
    constants::{LONG_PACKET_LENGTH, SHORT_PACKET_LENGTH},
    packet::{error::PacketError, packet::Packet},
    transport::Transport,
    types::{Address, Destination, PacketId},
};

/// Frames packets onto a transport and parses what comes back.
///
/// Owns the port's packet id counter: every stamped packet gets the next id,
/// post-incremented and wrapping only on 32-bit overflow.
pub struct PacketIo {
    transport: Box<dyn Transport>,
    local_address: Address,
    next_id: PacketId,
    destination: Destination,
    verify_checksums: bool,
}

impl PacketIo {
    pub fn new(transport: Box<dyn Transport>, config: &LinkConfig) -> Self {
        let local_address = transport.local_address();
        Self {
            transport,
            local_address,
            next_id: config.packet_id_seed.first_id(),
            destination: Destination::Broadcast,
            verify_checksums: config.verify_checksums,
        }
    }

    pub fn local_address(&self) -> Address {
        self.local_address
    }

    /// Id the next stamped packet will carry.
    pub fn peek_next_id(&self) -> PacketId {
        self.next_id
    }

    /// Destination used by `send_short`, `send_long`, `send_any_length` and `send`.
    pub fn set_destination(&mut self, destination: Destination) {
        self.destination = destination;
    }

    pub fn destination(&self) -> Destination {
        self.destination
    }

    /// Gives `packet` a fresh id and this port's address, then seals its checksum.
    pub fn stamp(&mut self, packet: &mut Packet) -> PacketId {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        packet.set_id(id);
        packet.set_sender(self.local_address);
        packet.seal();
        id
    }

    /// Stamps and sends a short packet. Fails if `packet` is not short.
    pub fn send_short(&mut self, packet: &mut Packet) -> Result<PacketId, IoError> {
        if !packet.is_short() {
            return Err(PacketError::InvalidLength {
                length: packet.len(),
                max: SHORT_PACKET_LENGTH,
            }
            .into());
        }
        self.send_any_length(packet)
    }

    /// Stamps and sends a long packet. Fails if `packet` is not long.
    pub fn send_long(&mut self, packet: &mut Packet) -> Result<PacketId, IoError> {
        if !packet.is_long() {
            return Err(PacketError::InvalidLength {
                length: packet.len(),
                max: LONG_PACKET_LENGTH,
            }
            .into());
        }
        self.send_any_length(packet)
    }

    /// Stamps and sends exactly `HEADER_SIZE + packet.len()` bytes.
    pub fn send_any_length(&mut self, packet: &mut Packet) -> Result<PacketId, IoError> {
        let id = self.stamp(packet);
        let destination = self.destination;
        self.transmit(packet, &destination)?;
        Ok(id)
    }

    /// Generic entry point: dispatches on the header's declared length.
    pub fn send(&mut self, packet: &mut Packet) -> Result<PacketId, IoError> {
        match packet.len() {
            SHORT_PACKET_LENGTH => self.send_short(packet),
            LONG_PACKET_LENGTH => self.send_long(packet),
            _ => self.send_any_length(packet),
        }
    }

    /// Puts an already stamped packet on the wire unchanged. Retransmissions
    /// go through here so every copy of a queued packet carries the same id.
    pub fn transmit(&mut self, packet: &Packet, destination: &Destination) -> Result<(), IoError> {
        trace!(
            "tx id={} cmd={} len={} -> {}",
            packet.id(),
            packet.command_code(),
            packet.len(),
            destination
        );
        self.transport.send(destination, &packet.to_bytes())?;
        Ok(())
    }

    /// Polls the transport once. `Ok(None)` means nothing is waiting.
    pub fn receive(&mut self) -> Result<Option<Packet>, IoError> {
        let Some(bytes) = self.transport.receive()? else {
            return Ok(None);
        };
        let packet = Packet::from_bytes(&bytes)?;
        if self.verify_checksums {
            packet.verify_checksum()?;
        }
        trace!(
            "rx id={} cmd={} len={} <- {}",
            packet.id(),
            packet.command_code(),
            packet.len(),
            packet.sender()
        );
        Ok(Some(packet))
    }
}

//! Boundary to the raw, unreliable, size-bounded packet transport.

mod conditioner;
mod error;
mod local;

pub use conditioner::{LinkConditioner, LinkConditionerConfig};
pub use error::{RecvError, SendError};
pub use local::{LocalNetwork, LocalTransport};

use crate::types::{Address, Destination};

pub trait Transport {
    /// Hands one block of exactly `payload.len()` bytes to the wire.
    fn send(&mut self, destination: &Destination, payload: &[u8]) -> Result<(), SendError>;
    /// Non-blocking poll for the next received block, oldest first.
    fn receive(&mut self) -> Result<Option<Vec<u8>>, RecvError>;
    /// This endpoint's own address, stamped into outgoing headers.
    fn local_address(&self) -> Address;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&mut self, destination: &Destination, payload: &[u8]) -> Result<(), SendError> {
        (**self).send(destination, payload)
    }

    fn receive(&mut self) -> Result<Option<Vec<u8>>, RecvError> {
        (**self).receive()
    }

    fn local_address(&self) -> Address {
        (**self).local_address()
    }
}

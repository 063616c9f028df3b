use std::fmt;

use crate::{
    packet::packet::Packet,
    types::{Destination, Tick},
};

/// How a queued send was resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    /// A matching ACK arrived
    Acknowledged,
    /// Lossy or broadcast packet handed to the transport once
    Transmitted,
    /// Lossy packet the transport refused; it is not retried
    Dropped,
    /// Discarded by a port clear
    Cleared,
}

/// Invoked exactly once when a queued send is resolved, with the entry's
/// extra data word and its packet.
pub type CompletionCallback = Box<dyn FnOnce(SendOutcome, u32, &Packet)>;

/// One in-flight outbound packet.
pub struct SendEntry {
    packet: Packet,
    destination: Destination,
    /// `None` until the first attempt, i.e. due immediately
    retry_at: Option<Tick>,
    retry_interval: Tick,
    extra_data: u32,
    attempts: u32,
    on_complete: Option<CompletionCallback>,
}

impl SendEntry {
    pub fn new(
        packet: Packet,
        destination: Destination,
        retry_interval: Tick,
        extra_data: u32,
        on_complete: Option<CompletionCallback>,
    ) -> Self {
        Self {
            packet,
            destination,
            retry_at: None,
            retry_interval,
            extra_data,
            attempts: 0,
            on_complete,
        }
    }

    pub fn packet(&self) -> &Packet {
        &self.packet
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    pub fn retry_at(&self) -> Option<Tick> {
        self.retry_at
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn extra_data(&self) -> u32 {
        self.extra_data
    }

    /// Deadlines compare with wrapping arithmetic, so a deadline past
    /// `Tick::MAX` comes due once the clock wraps around to it.
    pub fn is_due(&self, now: Tick) -> bool {
        match self.retry_at {
            None => true,
            Some(retry_at) => (now.wrapping_sub(retry_at) as i32) >= 0,
        }
    }

    /// Records a transmit attempt and pushes the deadline one interval out.
    /// An interval of zero still waits for the next tick.
    pub fn reschedule(&mut self, now: Tick) {
        self.attempts += 1;
        self.retry_at = Some(now.wrapping_add(self.retry_interval.max(1)));
    }

    pub fn complete(mut self, outcome: SendOutcome) {
        if let Some(on_complete) = self.on_complete.take() {
            on_complete(outcome, self.extra_data, &self.packet);
        }
    }
}

impl fmt::Debug for SendEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SendEntry")
            .field("id", &self.packet.id())
            .field("command", &self.packet.command_code())
            .field("destination", &self.destination)
            .field("retry_at", &self.retry_at)
            .field("retry_interval", &self.retry_interval)
            .field("attempts", &self.attempts)
            .finish()
    }
}

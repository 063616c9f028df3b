use std::collections::VecDeque;

use log::{trace, warn};

use cmdlink_shared::{
    Address, CmdQueue, Command, CommandPayload, CompletionCallback, Destination, Packet,
    PacketId, SendOutcome, Tick,
};

use crate::session::{
    session_config::SessionConfig,
    signals::{SessionSignal, SignalQueue},
};

/// A line of text received from a peer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReceivedText {
    pub from: Address,
    pub command: Command,
    pub text: String,
}

/// Everything the session machines share: the port, the clock and what is
/// known about the peer. Passed to every state machine callback.
pub struct SessionContext {
    pub(crate) queue: CmdQueue,
    pub(crate) config: SessionConfig,
    pub(crate) signals: SignalQueue,
    pub(crate) now: Tick,
    pub(crate) peer: Option<Address>,
    pub(crate) peer_player_id: Option<u32>,
    pub(crate) character: Option<String>,
    pub(crate) game_seed: Option<u32>,
    pub(crate) peer_tick: Option<Tick>,
    pub(crate) received: VecDeque<ReceivedText>,
}

impl SessionContext {
    pub(crate) fn new(queue: CmdQueue, config: SessionConfig, signals: SignalQueue) -> Self {
        Self {
            queue,
            config,
            signals,
            now: 0,
            peer: None,
            peer_player_id: None,
            character: None,
            game_seed: None,
            peer_tick: None,
            received: VecDeque::new(),
        }
    }

    pub fn queue(&self) -> &CmdQueue {
        &self.queue
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn now(&self) -> Tick {
        self.now
    }

    pub fn peer(&self) -> Option<Address> {
        self.peer
    }

    pub fn peer_player_id(&self) -> Option<u32> {
        self.peer_player_id
    }

    pub fn character(&self) -> Option<&str> {
        self.character.as_deref()
    }

    /// Seed received with GAME_START for the game being played.
    pub fn game_seed(&self) -> Option<u32> {
        self.game_seed
    }

    /// Last tick reported by the peer's SYNC packets.
    pub fn peer_tick(&self) -> Option<Tick> {
        self.peer_tick
    }

    /// The most recent received lines, oldest first, at most
    /// `received_capacity` of them.
    pub fn received(&self) -> &VecDeque<ReceivedText> {
        &self.received
    }

    pub(crate) fn record_text(&mut self, text: ReceivedText) {
        let capacity = self.config.received_capacity;
        if capacity == 0 {
            return;
        }
        while self.received.len() >= capacity {
            if let Some(dropped) = self.received.pop_front() {
                trace!("received log full, dropping line from {}", dropped.from);
            }
        }
        self.received.push_back(text);
    }

    /// Ticks elapsed since `since`.
    pub(crate) fn since(&self, since: Tick) -> Tick {
        self.now.saturating_sub(since)
    }

    /// The peer if one is known, otherwise every endpoint on the port.
    pub(crate) fn peer_destination(&self) -> Destination {
        Destination::from(self.peer)
    }

    /// Queues a typed payload with the default retry interval.
    pub(crate) fn send<P: CommandPayload>(
        &mut self,
        payload: &P,
        destination: Destination,
    ) -> Option<PacketId> {
        self.enqueue(payload, destination, None)
    }

    /// Queues a typed payload whose resolution is reported back to the
    /// session as [`SessionSignal::Delivered`].
    pub(crate) fn send_tracked<P: CommandPayload>(
        &mut self,
        payload: &P,
        destination: Destination,
    ) -> Option<PacketId> {
        let signals = self.signals.clone();
        let command = P::COMMAND;
        let on_complete: CompletionCallback =
            Box::new(move |outcome: SendOutcome, _: u32, packet: &Packet| {
                if matches!(outcome, SendOutcome::Acknowledged | SendOutcome::Transmitted) {
                    signals.push(SessionSignal::Delivered {
                        command,
                        id: packet.id(),
                    });
                }
            });
        self.enqueue(payload, destination, Some(on_complete))
    }

    fn enqueue<P: CommandPayload>(
        &mut self,
        payload: &P,
        destination: Destination,
        on_complete: Option<CompletionCallback>,
    ) -> Option<PacketId> {
        let retry_interval = self.config.queue.default_retry_interval;
        match self.queue.try_enqueue(
            Packet::from_payload(payload),
            destination,
            retry_interval,
            0,
            on_complete,
        ) {
            Ok(id) => Some(id),
            Err(err) => {
                warn!("could not queue {:?}: {}", P::COMMAND, err);
                None
            }
        }
    }
}

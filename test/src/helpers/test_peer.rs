use cmdlink_shared::{
    Address, CmdQueue, CmdQueueConfig, LocalNetwork, Packet, SyncPayload, TextMessage, Tick,
    Transport,
};

use super::recording::Recorder;

/// A lossless MESSAGE packet carrying `text`.
pub fn message_packet(text: &str) -> Packet {
    Packet::from_payload(&TextMessage::new(text))
}

/// A lossy SYNC packet.
pub fn sync_packet(tick: Tick, sequence: u16) -> Packet {
    Packet::from_payload(&SyncPayload { tick, sequence })
}

/// A command queue on a [`LocalNetwork`] endpoint with a recording handler
/// table installed.
pub struct TestPeer {
    pub address: Address,
    pub queue: CmdQueue,
    pub recorder: Recorder,
}

impl TestPeer {
    pub fn new(network: &LocalNetwork, index: u16) -> Self {
        Self::with_config(network, index, CmdQueueConfig::default())
    }

    pub fn with_config(network: &LocalNetwork, index: u16, config: CmdQueueConfig) -> Self {
        let address = Address::local(index);
        Self::with_transport(address, Box::new(network.join(address)), config)
    }

    pub fn with_transport(
        address: Address,
        transport: Box<dyn Transport>,
        config: CmdQueueConfig,
    ) -> Self {
        let mut queue = CmdQueue::new(transport, config);
        let recorder = Recorder::new();
        queue.register_callbacks(recorder.callbacks());
        Self {
            address,
            queue,
            recorder,
        }
    }

    /// One tick of the outer loop, without a state machine.
    pub fn tick(&mut self, now: Tick) {
        self.queue.process_receives();
        self.queue.schedule_sends(now);
    }
}

/// Ticks every peer once per tick from `from` up to but excluding `to`.
pub fn tick_all(peers: &mut [&mut TestPeer], from: Tick, to: Tick) {
    for now in from..to {
        for peer in peers.iter_mut() {
            peer.tick(now);
        }
    }
}

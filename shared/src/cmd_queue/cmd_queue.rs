use std::collections::VecDeque;

use log::{debug, trace, warn};

use crate::{
    cmd_queue::{
        callbacks::CommandCallbacks,
        command_list::CommandList,
        config::CmdQueueConfig,
        error::CmdQueueError,
        send_entry::{CompletionCallback, SendEntry, SendOutcome},
        stats::QueueStats,
    },
    connection::{error::IoError, io::PacketIo},
    constants::MAX_FRAME_SIZE,
    packet::{command::Command, error::PacketError, packet::Packet, payloads::AckPayload},
    transport::Transport,
    types::{Address, Destination, PacketId, Tick},
};

enum Scheduled {
    Attempted,
    NothingDue,
    OverBudget,
}

/// Reliable command queue for one port.
///
/// Lossless commands are retried every `retry_interval` ticks until the
/// receiver acknowledges them; lossy commands are handed to the transport
/// at most once. Inbound packets are dispatched to the registered
/// [`CommandCallbacks`], after lossless ones have been acknowledged.
pub struct CmdQueue {
    io: PacketIo,
    config: CmdQueueConfig,
    queues: [CommandList<SendEntry>; Command::COUNT],
    callbacks: CommandCallbacks,
    callbacks_epoch: u64,
    /// Set while a handler runs; dispatches it triggers wait in `deferred`
    dispatching: bool,
    deferred: VecDeque<(Command, Packet)>,
    stats: QueueStats,
}

impl CmdQueue {
    /// A byte budget below [`MAX_FRAME_SIZE`] is raised to it, so a long
    /// packet always fits an unspent budget.
    pub fn new(transport: Box<dyn Transport>, mut config: CmdQueueConfig) -> Self {
        if config.bytes_per_tick < MAX_FRAME_SIZE {
            warn!(
                "bytes_per_tick {} cannot carry a long packet, raising it to {}",
                config.bytes_per_tick, MAX_FRAME_SIZE
            );
            config.bytes_per_tick = MAX_FRAME_SIZE;
        }

        let io = PacketIo::new(transport, &config.link);
        Self {
            io,
            config,
            queues: std::array::from_fn(|_| CommandList::new()),
            callbacks: CommandCallbacks::new(),
            callbacks_epoch: 0,
            dispatching: false,
            deferred: VecDeque::new(),
            stats: QueueStats::default(),
        }
    }

    pub fn local_address(&self) -> Address {
        self.io.local_address()
    }

    pub fn config(&self) -> &CmdQueueConfig {
        &self.config
    }

    pub fn stats(&self) -> &QueueStats {
        &self.stats
    }

    /// Raw framing access, for sends that bypass the queue.
    pub fn io_mut(&mut self) -> &mut PacketIo {
        &mut self.io
    }

    /// Installs a new handler table and returns the previous one. Safe to
    /// call from inside a handler; the running handler is then discarded.
    pub fn register_callbacks(&mut self, callbacks: CommandCallbacks) -> CommandCallbacks {
        self.callbacks_epoch += 1;
        std::mem::replace(&mut self.callbacks, callbacks)
    }

    // Outgoing

    /// Queues `packet` for `destination` (`None` broadcasts). The packet is
    /// stamped with a fresh id and this port's address; the id is returned.
    pub fn try_enqueue(
        &mut self,
        mut packet: Packet,
        destination: impl Into<Destination>,
        retry_interval: Tick,
        extra_data: u32,
        on_complete: Option<CompletionCallback>,
    ) -> Result<PacketId, CmdQueueError> {
        let command = packet.command().map_err(|_| CmdQueueError::InvalidCommand {
            code: packet.command_code(),
        })?;
        let destination = destination.into();

        let id = self.io.stamp(&mut packet);
        let entry = SendEntry::new(packet, destination, retry_interval, extra_data, on_complete);
        self.queues[command.index()].try_push_front(id, entry)?;

        debug!("queued {:?} id={} for {}", command, id, destination);
        Ok(id)
    }

    /// Queues `packet`, see [`CmdQueue::try_enqueue`].
    ///
    /// # Panics
    ///
    /// Panics if the packet does not carry a defined command code.
    pub fn enqueue(
        &mut self,
        packet: Packet,
        destination: impl Into<Destination>,
        retry_interval: Tick,
        extra_data: u32,
        on_complete: Option<CompletionCallback>,
    ) -> PacketId {
        self.try_enqueue(packet, destination, retry_interval, extra_data, on_complete)
            .expect("packet must carry a defined command code to be queued")
    }

    /// Queues `packet` with the default retry interval and no completion callback.
    pub fn send(&mut self, packet: Packet, destination: impl Into<Destination>) -> PacketId {
        let retry_interval = self.config.default_retry_interval;
        self.enqueue(packet, destination, retry_interval, 0, None)
    }

    /// Transmits every due entry the per-call byte budget allows. ACKs go
    /// first and are drained completely; other command types get one entry
    /// per round, and rounds repeat while anything was attempted. A packet
    /// that does not fit the remaining budget ends scheduling for this call.
    pub fn schedule_sends(&mut self, now: Tick) {
        let mut budget = self.config.bytes_per_tick;
        loop {
            let mut attempted = false;
            for command in Command::ALL {
                loop {
                    match self.send_next_due(command, now, &mut budget) {
                        Scheduled::Attempted => {
                            attempted = true;
                            if command != Command::Ack {
                                break;
                            }
                        }
                        Scheduled::NothingDue => break,
                        Scheduled::OverBudget => return,
                    }
                }
            }
            if !attempted {
                return;
            }
        }
    }

    fn send_next_due(&mut self, command: Command, now: Tick, budget: &mut usize) -> Scheduled {
        let queue = &mut self.queues[command.index()];
        let Some(id) = queue.oldest_where(|entry| entry.is_due(now)) else {
            return Scheduled::NothingDue;
        };
        let Some(entry) = queue.get_mut(&id) else {
            return Scheduled::NothingDue;
        };

        let size = entry.packet().frame_size();
        if size > *budget {
            trace!("budget exhausted, deferring {:?} id={}", command, id);
            return Scheduled::OverBudget;
        }
        *budget -= size;

        let discard_after_send = command.is_lossy() || entry.destination().is_broadcast();
        match self.io.transmit(entry.packet(), entry.destination()) {
            Ok(()) => {
                self.stats.packets_sent += 1;
                self.stats.bytes_sent += size as u64;
                if entry.attempts() > 0 {
                    self.stats.retransmissions += 1;
                }
                if command == Command::Ack {
                    self.stats.acks_sent += 1;
                }

                if discard_after_send {
                    if let Some(entry) = queue.remove(&id) {
                        entry.complete(SendOutcome::Transmitted);
                    }
                } else {
                    entry.reschedule(now);
                }
            }
            Err(err) => {
                self.stats.send_failures += 1;
                debug!("transmit of {:?} id={} failed: {}", command, id, err);

                if command.is_lossy() {
                    self.stats.lossy_dropped += 1;
                    if let Some(entry) = queue.remove(&id) {
                        entry.complete(SendOutcome::Dropped);
                    }
                } else {
                    entry.reschedule(now);
                }
            }
        }
        Scheduled::Attempted
    }

    // Incoming

    /// Drains every packet currently waiting on the transport, acknowledging
    /// lossless commands, resolving ACKs and dispatching to handlers.
    pub fn process_receives(&mut self) {
        loop {
            let packet = match self.io.receive() {
                Ok(Some(packet)) => packet,
                Ok(None) => break,
                Err(IoError::Packet(err)) => {
                    warn!("dropping received block: {}", err);
                    match err {
                        PacketError::ChecksumMismatch { .. } => self.stats.checksum_failures += 1,
                        _ => self.stats.malformed_received += 1,
                    }
                    continue;
                }
                Err(err) => {
                    warn!("stopped draining port {}: {}", self.local_address(), err);
                    break;
                }
            };
            self.process_packet(packet);
        }
    }

    fn process_packet(&mut self, packet: Packet) {
        let Ok(command) = packet.command() else {
            warn!(
                "ignoring packet id={} with command code {} from {}",
                packet.id(),
                packet.command_code(),
                packet.sender()
            );
            self.stats.invalid_received += 1;
            return;
        };

        if command == Command::Ack {
            self.process_ack(&packet);
            return;
        }

        if command.is_lossless() {
            self.acknowledge(command, &packet);
        }
        self.dispatch(command, &packet);
    }

    fn process_ack(&mut self, packet: &Packet) {
        let ack = match packet.payload::<AckPayload>() {
            Ok(ack) => ack,
            Err(err) => {
                warn!("ignoring ACK from {}: {}", packet.sender(), err);
                self.stats.invalid_received += 1;
                return;
            }
        };
        if !ack.command.is_lossless() {
            self.stats.acks_unmatched += 1;
            return;
        }

        match self.queues[ack.command.index()].remove(&ack.id) {
            Some(entry) => {
                debug!("{:?} id={} acknowledged by {}", ack.command, ack.id, packet.sender());
                self.stats.acks_matched += 1;
                entry.complete(SendOutcome::Acknowledged);
            }
            None => {
                trace!("late or duplicate ACK for {:?} id={}", ack.command, ack.id);
                self.stats.acks_unmatched += 1;
            }
        }
    }

    fn acknowledge(&mut self, command: Command, packet: &Packet) {
        let ack = Packet::from_payload(&AckPayload {
            command,
            id: packet.id(),
        });
        let retry_interval = self.config.default_retry_interval;
        if let Err(err) = self.try_enqueue(
            ack,
            Destination::Unicast(packet.sender()),
            retry_interval,
            0,
            None,
        ) {
            warn!("could not queue ACK for {:?} id={}: {}", command, packet.id(), err);
        }
    }

    /// Runs the handler for `command`. A dispatch started from inside a
    /// handler (a `forced_receive` loopback, say) is queued and runs once
    /// the outer handler has returned, in the order it was requested.
    fn dispatch(&mut self, command: Command, packet: &Packet) {
        if self.dispatching {
            trace!("deferring nested {:?} id={}", command, packet.id());
            self.deferred.push_back((command, packet.clone()));
            return;
        }

        self.dispatching = true;
        self.run_handler(command, packet);
        while let Some((command, packet)) = self.deferred.pop_front() {
            self.run_handler(command, &packet);
        }
        self.dispatching = false;
    }

    fn run_handler(&mut self, command: Command, packet: &Packet) {
        let Some(mut handler) = self.callbacks.take(command) else {
            trace!("no handler for {:?}, dropping id={}", command, packet.id());
            return;
        };

        let epoch = self.callbacks_epoch;
        self.stats.dispatched += 1;
        handler.on_command(self, packet);
        if self.callbacks_epoch == epoch {
            self.callbacks.restore(command, handler);
        }
    }

    /// Hands `packet` straight to its registered handler, bypassing the
    /// transport and the queue. Used to loop back a packet this port just
    /// sent, e.g. echoing a chat line locally.
    pub fn try_forced_receive(&mut self, packet: &Packet) -> Result<(), CmdQueueError> {
        let command = packet.command().map_err(|_| CmdQueueError::InvalidCommand {
            code: packet.command_code(),
        })?;
        if command == Command::Ack {
            return Err(CmdQueueError::ForcedAck);
        }
        self.dispatch(command, packet);
        Ok(())
    }

    /// See [`CmdQueue::try_forced_receive`].
    ///
    /// # Panics
    ///
    /// Panics if `packet` is an ACK or carries an undefined command code.
    pub fn forced_receive(&mut self, packet: &Packet) {
        self.try_forced_receive(packet)
            .expect("forced_receive() requires a non-ACK packet with a defined command code")
    }

    // Teardown

    /// Discards everything waiting on the transport and every queued send,
    /// resolving the latter as [`SendOutcome::Cleared`]. Used at shutdown.
    pub fn clear_port(&mut self) {
        let mut discarded = 0usize;
        loop {
            match self.io.receive() {
                Ok(Some(_)) | Err(IoError::Packet(_)) => discarded += 1,
                Ok(None) | Err(_) => break,
            }
        }

        let mut cleared = 0usize;
        for queue in self.queues.iter_mut() {
            for (_, entry) in queue.drain_oldest_first() {
                cleared += 1;
                entry.complete(SendOutcome::Cleared);
            }
        }
        debug!(
            "cleared port {}: {} inbound discarded, {} queued sends dropped",
            self.local_address(),
            discarded,
            cleared
        );
    }

    // Introspection

    /// Entries queued for `command`.
    pub fn pending(&self, command: Command) -> usize {
        self.queues[command.index()].len()
    }

    pub fn is_pending(&self, command: Command, id: PacketId) -> bool {
        self.queues[command.index()].contains(&id)
    }

    pub fn total_pending(&self) -> usize {
        self.queues.iter().map(CommandList::len).sum()
    }

    pub fn entry(&self, command: Command, id: PacketId) -> Option<&SendEntry> {
        self.queues[command.index()].get(&id)
    }
}

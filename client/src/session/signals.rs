use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use cmdlink_shared::{Address, Command, PacketId, Tick};

/// Something that happened to the session: either a command received from
/// the peer, a queued send being resolved, or a request from the application.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionSignal {
    // From the peer
    PeerSeen { address: Address, player_id: u32 },
    JoinAccepted { game_id: u16 },
    JoinRejected { game_id: u16 },
    Started { game_id: u16, seed: u32 },
    SyncReceived { from: Address, tick: Tick, sequence: u16 },
    Text { from: Address, command: Command, text: String },
    /// A queued send of this session resolved (acknowledged, or transmitted
    /// once for broadcasts)
    Delivered { command: Command, id: PacketId },

    // From the application
    SelectCharacter { name: String },
    Leave,
    Logoff,
    AbortLogoff,
    ConnectionLost,
    Reconnect,
    Exit,
}

/// FIFO of pending signals, shared between the command handlers, the
/// completion callbacks and the session machine.
#[derive(Clone, Default)]
pub struct SignalQueue {
    signals: Rc<RefCell<VecDeque<SessionSignal>>>,
}

impl SignalQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, signal: SessionSignal) {
        self.signals.borrow_mut().push_back(signal);
    }

    pub fn pop(&self) -> Option<SessionSignal> {
        self.signals.borrow_mut().pop_front()
    }

    /// Drops every pending signal, returning how many there were.
    pub fn clear(&self) -> usize {
        let mut signals = self.signals.borrow_mut();
        let dropped = signals.len();
        signals.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.signals.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.borrow().is_empty()
    }
}

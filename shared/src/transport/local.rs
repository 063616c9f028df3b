//! In-process network routing blocks between endpoints without any I/O.

use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::{Arc, Mutex, MutexGuard},
};

use log::{trace, warn};

use crate::{
    constants::MAX_FRAME_SIZE,
    transport::{RecvError, SendError, Transport},
    types::{Address, Destination},
};

const DEFAULT_INBOX_CAPACITY: usize = 64;

#[derive(Default)]
struct Endpoint {
    inbox: VecDeque<Vec<u8>>,
    dropped: usize,
    sent: usize,
}

struct NetworkState {
    endpoints: HashMap<Address, Endpoint>,
    failing: HashSet<Address>,
    inbox_capacity: usize,
}

impl NetworkState {
    fn deliver(&mut self, to: Address, payload: &[u8]) {
        let capacity = self.inbox_capacity;
        let Some(endpoint) = self.endpoints.get_mut(&to) else {
            return;
        };
        if endpoint.inbox.len() >= capacity {
            warn!("Inbox of {} full ({} blocks), dropping arrival", to, capacity);
            endpoint.dropped += 1;
            return;
        }
        endpoint.inbox.push_back(payload.to_vec());
    }
}

/// Shared hub; clone it freely, every clone routes through the same state.
#[derive(Clone)]
pub struct LocalNetwork {
    state: Arc<Mutex<NetworkState>>,
}

impl Default for LocalNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalNetwork {
    pub fn new() -> Self {
        Self::with_inbox_capacity(DEFAULT_INBOX_CAPACITY)
    }

    /// Each endpoint buffers at most `inbox_capacity` undrained blocks;
    /// further arrivals are dropped and counted.
    pub fn with_inbox_capacity(inbox_capacity: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(NetworkState {
                endpoints: HashMap::new(),
                failing: HashSet::new(),
                inbox_capacity,
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, NetworkState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Registers `address` on the network and returns its transport.
    pub fn join(&self, address: Address) -> LocalTransport {
        self.state().endpoints.entry(address).or_default();
        LocalTransport {
            address,
            network: self.clone(),
        }
    }

    /// Detaches `address`; its transport reports `RecvError::Closed` afterwards.
    pub fn leave(&self, address: &Address) {
        let mut state = self.state();
        state.endpoints.remove(address);
        state.failing.remove(address);
    }

    /// While set, every send from `address` is rejected.
    pub fn set_send_failure(&self, address: &Address, failing: bool) {
        let mut state = self.state();
        if failing {
            state.failing.insert(*address);
        } else {
            state.failing.remove(address);
        }
    }

    /// Places a raw block in the inbox of `to`, as if it had arrived.
    pub fn inject(&self, to: &Address, payload: &[u8]) {
        self.state().deliver(*to, payload);
    }

    /// Removes and returns every block waiting for `address`.
    pub fn take_inbox(&self, address: &Address) -> Vec<Vec<u8>> {
        self.state()
            .endpoints
            .get_mut(address)
            .map(|endpoint| endpoint.inbox.drain(..).collect())
            .unwrap_or_default()
    }

    pub fn inbox_len(&self, address: &Address) -> usize {
        self.state()
            .endpoints
            .get(address)
            .map_or(0, |endpoint| endpoint.inbox.len())
    }

    /// Arrivals dropped because the inbox of `address` was full.
    pub fn dropped(&self, address: &Address) -> usize {
        self.state()
            .endpoints
            .get(address)
            .map_or(0, |endpoint| endpoint.dropped)
    }

    /// Blocks accepted from `address` so far.
    pub fn sent(&self, address: &Address) -> usize {
        self.state()
            .endpoints
            .get(address)
            .map_or(0, |endpoint| endpoint.sent)
    }
}

/// One endpoint of a [`LocalNetwork`].
pub struct LocalTransport {
    address: Address,
    network: LocalNetwork,
}

impl Transport for LocalTransport {
    fn send(&mut self, destination: &Destination, payload: &[u8]) -> Result<(), SendError> {
        if payload.len() > MAX_FRAME_SIZE {
            return Err(SendError::TooLarge {
                size: payload.len(),
                max: MAX_FRAME_SIZE,
            });
        }

        let mut state = self.network.state();
        if state.failing.contains(&self.address) {
            return Err(SendError::Rejected {
                reason: "send failure injected",
            });
        }

        match destination {
            Destination::Unicast(to) => {
                if !state.endpoints.contains_key(to) {
                    return Err(SendError::Unreachable {
                        destination: *destination,
                    });
                }
                state.deliver(*to, payload);
            }
            Destination::Broadcast => {
                let others: Vec<Address> = state
                    .endpoints
                    .keys()
                    .filter(|address| **address != self.address)
                    .copied()
                    .collect();
                for to in others {
                    state.deliver(to, payload);
                }
            }
        }

        if let Some(endpoint) = state.endpoints.get_mut(&self.address) {
            endpoint.sent += 1;
        }
        trace!("{} -> {}: {} bytes", self.address, destination, payload.len());
        Ok(())
    }

    fn receive(&mut self) -> Result<Option<Vec<u8>>, RecvError> {
        let mut state = self.network.state();
        let endpoint = state
            .endpoints
            .get_mut(&self.address)
            .ok_or(RecvError::Closed)?;
        Ok(endpoint.inbox.pop_front())
    }

    fn local_address(&self) -> Address {
        self.address
    }
}

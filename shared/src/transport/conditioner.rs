use log::trace;

use crate::{
    transport::{RecvError, SendError, Transport},
    types::{Address, Destination},
};

/// Describes how outbound traffic is degraded by a [`LinkConditioner`].
#[derive(Clone, Debug, PartialEq)]
pub struct LinkConditionerConfig {
    /// Probability in `[0, 1]` that an outbound block is silently lost
    pub loss: f32,
    /// Seed of the loss generator, so runs are reproducible
    pub seed: u64,
}

impl LinkConditionerConfig {
    pub fn new(loss: f32, seed: u64) -> Self {
        Self {
            loss: loss.clamp(0.0, 1.0),
            seed,
        }
    }

    pub fn perfect() -> Self {
        Self::new(0.0, 0)
    }

    pub fn lossy(loss: f32) -> Self {
        Self::new(loss, 0x5EED)
    }
}

/// Wraps a transport and drops a share of outbound blocks after reporting
/// them as sent, the way a lossy link would.
pub struct LinkConditioner<T: Transport> {
    inner: T,
    config: LinkConditionerConfig,
    rng: fastrand::Rng,
    lost: usize,
}

impl<T: Transport> LinkConditioner<T> {
    pub fn new(inner: T, config: LinkConditionerConfig) -> Self {
        let rng = fastrand::Rng::with_seed(config.seed);
        Self {
            inner,
            config,
            rng,
            lost: 0,
        }
    }

    /// Blocks swallowed so far.
    pub fn lost(&self) -> usize {
        self.lost
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T: Transport> Transport for LinkConditioner<T> {
    fn send(&mut self, destination: &Destination, payload: &[u8]) -> Result<(), SendError> {
        if self.config.loss > 0.0 && self.rng.f32() < self.config.loss {
            self.lost += 1;
            trace!("link conditioner dropped {} bytes to {}", payload.len(), destination);
            return Ok(());
        }
        self.inner.send(destination, payload)
    }

    fn receive(&mut self) -> Result<Option<Vec<u8>>, RecvError> {
        self.inner.receive()
    }

    fn local_address(&self) -> Address {
        self.inner.local_address()
    }
}

use crate::{
    connection::link_config::LinkConfig,
    constants::{DEFAULT_BYTES_PER_TICK, DEFAULT_RETRY_INTERVAL},
    types::Tick,
};

/// Contains config properties which will be used by a command queue
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CmdQueueConfig {
    /// Used to configure packet framing on the port
    pub link: LinkConfig,
    /// Header + payload bytes `schedule_sends` may transmit per call. The
    /// queue raises values below `MAX_FRAME_SIZE` to it
    pub bytes_per_tick: usize,
    /// Retry interval used by `send` and for synthesized ACKs
    pub default_retry_interval: Tick,
}

impl Default for CmdQueueConfig {
    fn default() -> Self {
        Self {
            link: LinkConfig::default(),
            bytes_per_tick: DEFAULT_BYTES_PER_TICK,
            default_retry_interval: DEFAULT_RETRY_INTERVAL,
        }
    }
}

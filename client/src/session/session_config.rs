use std::default::Default;

use cmdlink_shared::{CmdQueueConfig, Tick};

/// Contains Config properties which will be used by a Session
#[derive(Clone)]
pub struct SessionConfig {
    /// Used to configure the reliable command queue of the session's port
    pub queue: CmdQueueConfig,
    /// Player id announced with PLAYER_ID_SELF while connecting
    pub player_id: u32,
    /// Game requested when joining, and hosted when answering join requests
    pub game_id: u16,
    /// Whether join requests from peers are accepted (host role)
    pub accept_joins: bool,
    /// Seed handed to joining peers in GAME_START
    pub game_seed: u32,
    /// Ticks to wait for a peer before the connect phase fails
    pub connect_timeout: Tick,
    /// Ticks between PLAYER_ID_SELF broadcasts while connecting
    pub connect_announce_interval: Tick,
    /// Ticks between lossy SYNC packets while playing
    pub sync_interval: Tick,
    /// Ticks to wait for the logoff save to be acknowledged
    pub logoff_timeout: Tick,
    /// Received text lines kept before the oldest is dropped
    pub received_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            queue: CmdQueueConfig::default(),
            player_id: 1,
            game_id: 1,
            accept_joins: true,
            game_seed: 0x5EED,
            connect_timeout: 700,
            connect_announce_interval: 70,
            sync_interval: 7,
            logoff_timeout: 350,
            received_capacity: 64,
        }
    }
}

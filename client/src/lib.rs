//! # Cmdlink Client
//! Session orchestration for a cmdlink peer. A top-level state machine walks
//! the session through connecting, choosing a character, playing, logging off
//! and leaving, creating one phase machine per step. All traffic goes through
//! a reliable [`CmdQueue`](cmdlink_shared::CmdQueue) polled once per tick.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use cmdlink_shared::{
        Address, CmdQueueConfig, Command, Destination, LinkConfig, LocalNetwork, PacketIdSeed,
        QueueStats, Tick, Transport,
    };
}

mod error;
mod session;

pub use error::SessionError;
pub use session::{
    context::{ReceivedText, SessionContext},
    phases::{
        choose_character::{ChooseCharacterFlag, ChooseCharacterState},
        connect::{ConnectFlag, ConnectState},
        leave_server::{LeaveServerFlag, LeaveServerState},
        logoff_character::{LogoffCharacterFlag, LogoffCharacterState},
        play_game::{PlayGameFlag, PlayGameState},
    },
    session::Session,
    session_config::SessionConfig,
    signals::{SessionSignal, SignalQueue},
    top_level::{TopFlag, TopState},
};

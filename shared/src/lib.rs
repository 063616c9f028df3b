//! # Cmdlink Shared
//! Packet framing, the reliable command queue and the state machine engine
//! shared by every cmdlink peer.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod cmd_queue;
mod connection;
mod constants;
mod packet;
mod state_machine;
mod transport;
mod types;

pub use cmd_queue::{
    callbacks::{CommandCallbacks, CommandHandler},
    cmd_queue::CmdQueue,
    command_list::CommandList,
    config::CmdQueueConfig,
    error::CmdQueueError,
    send_entry::{CompletionCallback, SendEntry, SendOutcome},
    stats::QueueStats,
};
pub use connection::{
    error::IoError,
    io::PacketIo,
    link_config::{LinkConfig, PacketIdSeed},
};
pub use constants::{
    DEFAULT_BYTES_PER_TICK, DEFAULT_RETRY_INTERVAL, HEADER_SIZE, LONG_PACKET_LENGTH,
    MAX_FRAME_SIZE, PACKET_PREFIX, SHORT_PACKET_LENGTH,
};
pub use packet::{
    command::{Command, Reliability, COMMAND_UNKNOWN},
    error::PacketError,
    header::{checksum, PacketHeader},
    packet::Packet,
    payloads::{
        AckPayload, CommandPayload, GameRequestJoin, GameRespondJoin, GameStart, PlayerIdSelf,
        SyncPayload, TextMessage, TownUiMessage, MAX_TEXT_LENGTH,
    },
};
pub use state_machine::{
    definition::{
        ConditionFn, Conditional, EnterFn, ExitFn, HookFn, IdleFn, StateBehavior, StateDef,
        StateIndex, StateMachineDef,
    },
    error::StateMachineError,
    flags::{FlagSet, Flags, HasFlags},
    machine::StateMachine,
};
pub use transport::{
    LinkConditioner, LinkConditionerConfig, LocalNetwork, LocalTransport, RecvError, SendError,
    Transport,
};
pub use types::{Address, Destination, PacketId, Tick, ADDRESS_SIZE};

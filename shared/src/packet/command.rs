use crate::packet::error::PacketError;

/// Command code reserved for "unknown/invalid"; also the size of the
/// command code space.
pub const COMMAND_UNKNOWN: u8 = 10;

/// The leading payload byte of every packet.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Command {
    Ack = 0,
    Retransmit = 1,
    TownUiMessage = 2,
    PlayerIdSelf = 3,
    GameRequestJoin = 4,
    GameRespondJoin = 5,
    GameStart = 6,
    Sync = 7,
    Message = 8,
}

/// Delivery policy of a command type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Reliability {
    /// Retried until acknowledged
    Lossless,
    /// Sent at most once, never acknowledged
    Lossy,
}

// Classification table, indexed by command code.
const COMMAND_RELIABILITY: [Reliability; Command::COUNT] = [
    Reliability::Lossy,    // Ack
    Reliability::Lossy,    // Retransmit
    Reliability::Lossless, // TownUiMessage
    Reliability::Lossless, // PlayerIdSelf
    Reliability::Lossless, // GameRequestJoin
    Reliability::Lossless, // GameRespondJoin
    Reliability::Lossless, // GameStart
    Reliability::Lossy,    // Sync
    Reliability::Lossless, // Message
];

impl Command {
    pub const COUNT: usize = 9;

    /// Every command, in scheduling order. Ack is first so acknowledgments
    /// are never starved by other traffic.
    pub const ALL: [Command; Command::COUNT] = [
        Command::Ack,
        Command::Retransmit,
        Command::TownUiMessage,
        Command::PlayerIdSelf,
        Command::GameRequestJoin,
        Command::GameRespondJoin,
        Command::GameStart,
        Command::Sync,
        Command::Message,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn reliability(self) -> Reliability {
        COMMAND_RELIABILITY[self.index()]
    }

    pub fn is_lossless(self) -> bool {
        self.reliability() == Reliability::Lossless
    }

    pub fn is_lossy(self) -> bool {
        self.reliability() == Reliability::Lossy
    }
}

impl TryFrom<u8> for Command {
    type Error = PacketError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Command::ALL
            .get(code as usize)
            .copied()
            .ok_or(PacketError::UnknownCommand {
                code,
                max: (Command::COUNT - 1) as u8,
            })
    }
}

impl From<Command> for u8 {
    fn from(command: Command) -> Self {
        command.code()
    }
}

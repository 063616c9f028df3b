use log::info;

use cmdlink_shared::{Command, FlagSet, StateIndex, TextMessage};

use crate::session::{
    context::SessionContext,
    phase::{Phase, PhaseData, PhaseDef, PhaseState},
    signals::SessionSignal,
    top_level::TopFlag,
};

/// Text of the save request sent to the peer when logging off.
pub const LOGOFF_NOTICE: &str = "logoff";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogoffCharacterFlag {
    Saved,
    Abort,
    TimedOut,
}

impl FlagSet for LogoffCharacterFlag {
    const COUNT: usize = 3;

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogoffCharacterState {
    /// Waiting for the peer to acknowledge the logoff notice
    Saving,
    Done,
    Resumed,
}

impl LogoffCharacterState {
    pub const ALL: [LogoffCharacterState; 3] = [
        LogoffCharacterState::Saving,
        LogoffCharacterState::Done,
        LogoffCharacterState::Resumed,
    ];
}

impl From<LogoffCharacterState> for StateIndex {
    fn from(state: LogoffCharacterState) -> Self {
        state as StateIndex
    }
}

pub(crate) struct LogoffCharacterPhase;

impl Phase for LogoffCharacterPhase {
    type Flag = LogoffCharacterFlag;

    fn definition() -> PhaseDef<LogoffCharacterFlag> {
        PhaseDef::<LogoffCharacterFlag>::new("logoff_character")
            .state(
                PhaseState::<LogoffCharacterFlag>::new("Saving")
                    .enter(|data, ctx, _| {
                        data.entered(ctx.now);
                        let destination = ctx.peer_destination();
                        data.pending =
                            ctx.send_tracked(&TextMessage::new(LOGOFF_NOTICE), destination);
                    })
                    .idle(|data, ctx, _| {
                        if ctx.since(data.entered_at) >= ctx.config.logoff_timeout {
                            info!("logoff save not acknowledged, logging off anyway");
                            data.flags.raise(LogoffCharacterFlag::TimedOut);
                        }
                    })
                    .when_flag(LogoffCharacterFlag::Saved, LogoffCharacterState::Done)
                    .when_flag(LogoffCharacterFlag::Abort, LogoffCharacterState::Resumed)
                    .when_flag(LogoffCharacterFlag::TimedOut, LogoffCharacterState::Done),
            )
            .state(PhaseState::<LogoffCharacterFlag>::new("Done").enter(|_, ctx, _| {
                ctx.character = None;
            }))
            .state(PhaseState::<LogoffCharacterFlag>::new("Resumed"))
    }

    fn route(
        signal: &SessionSignal,
        data: &PhaseData<LogoffCharacterFlag>,
        _: &mut SessionContext,
    ) -> Option<LogoffCharacterFlag> {
        match signal {
            SessionSignal::Delivered {
                command: Command::Message,
                id,
            } if data.pending == Some(*id) => Some(LogoffCharacterFlag::Saved),
            SessionSignal::AbortLogoff => Some(LogoffCharacterFlag::Abort),
            _ => None,
        }
    }

    fn outcome(state: StateIndex) -> Option<TopFlag> {
        match LogoffCharacterState::ALL.get(state)? {
            LogoffCharacterState::Saving => None,
            LogoffCharacterState::Done => Some(TopFlag::LogoffComplete),
            LogoffCharacterState::Resumed => Some(TopFlag::LogoffAborted),
        }
    }
}

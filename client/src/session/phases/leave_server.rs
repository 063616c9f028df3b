use cmdlink_shared::{Command, FlagSet, StateIndex, TownUiMessage};

use crate::session::{
    context::SessionContext,
    phase::{Phase, PhaseData, PhaseDef, PhaseState},
    signals::SessionSignal,
    top_level::TopFlag,
};

/// Text of the notice sent to the peer when leaving.
pub const LEAVE_NOTICE: &str = "leave";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LeaveServerFlag {
    Notified,
}

impl FlagSet for LeaveServerFlag {
    const COUNT: usize = 1;

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LeaveServerState {
    Notifying,
    Gone,
}

impl LeaveServerState {
    pub const ALL: [LeaveServerState; 2] = [LeaveServerState::Notifying, LeaveServerState::Gone];
}

impl From<LeaveServerState> for StateIndex {
    fn from(state: LeaveServerState) -> Self {
        state as StateIndex
    }
}

pub(crate) struct LeaveServerPhase;

impl Phase for LeaveServerPhase {
    type Flag = LeaveServerFlag;

    fn definition() -> PhaseDef<LeaveServerFlag> {
        PhaseDef::<LeaveServerFlag>::new("leave_server")
            .state(
                PhaseState::<LeaveServerFlag>::new("Notifying")
                    .enter(|data, ctx, _| {
                        data.entered(ctx.now);
                        let destination = ctx.peer_destination();
                        data.pending =
                            ctx.send_tracked(&TownUiMessage::new(LEAVE_NOTICE), destination);
                    })
                    .when_flag(LeaveServerFlag::Notified, LeaveServerState::Gone),
            )
            .state(PhaseState::<LeaveServerFlag>::new("Gone"))
    }

    fn route(
        signal: &SessionSignal,
        data: &PhaseData<LeaveServerFlag>,
        _: &mut SessionContext,
    ) -> Option<LeaveServerFlag> {
        match signal {
            SessionSignal::Delivered {
                command: Command::TownUiMessage,
                id,
            } if data.pending == Some(*id) => Some(LeaveServerFlag::Notified),
            _ => None,
        }
    }

    fn outcome(state: StateIndex) -> Option<TopFlag> {
        match LeaveServerState::ALL.get(state)? {
            LeaveServerState::Notifying => None,
            LeaveServerState::Gone => Some(TopFlag::LeaveComplete),
        }
    }
}

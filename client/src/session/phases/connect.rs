use log::info;

use cmdlink_shared::{Destination, FlagSet, PlayerIdSelf, StateIndex};

use crate::session::{
    context::SessionContext,
    phase::{Phase, PhaseData, PhaseDef, PhaseState},
    signals::SessionSignal,
    top_level::TopFlag,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectFlag {
    PeerSeen,
    TimedOut,
}

impl FlagSet for ConnectFlag {
    const COUNT: usize = 2;

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectState {
    /// Broadcasting PLAYER_ID_SELF until a peer answers or time runs out
    Announcing,
    Connected,
    Failed,
}

impl ConnectState {
    pub const ALL: [ConnectState; 3] = [
        ConnectState::Announcing,
        ConnectState::Connected,
        ConnectState::Failed,
    ];
}

impl From<ConnectState> for StateIndex {
    fn from(state: ConnectState) -> Self {
        state as StateIndex
    }
}

fn announce(data: &mut PhaseData<ConnectFlag>, ctx: &mut SessionContext) {
    let player_id = ctx.config.player_id;
    ctx.send(&PlayerIdSelf { player_id }, Destination::Broadcast);
    data.last_sent_at = ctx.now;
}

pub(crate) struct ConnectPhase;

impl Phase for ConnectPhase {
    type Flag = ConnectFlag;

    fn definition() -> PhaseDef<ConnectFlag> {
        PhaseDef::<ConnectFlag>::new("connect")
            .state(
                PhaseState::<ConnectFlag>::new("Announcing")
                    .enter(|data, ctx, _| {
                        data.entered(ctx.now);
                        announce(data, ctx);
                    })
                    .idle(|data, ctx, _| {
                        if ctx.since(data.entered_at) >= ctx.config.connect_timeout {
                            data.flags.raise(ConnectFlag::TimedOut);
                        } else if ctx.since(data.last_sent_at) >= ctx.config.connect_announce_interval
                        {
                            announce(data, ctx);
                        }
                    })
                    .when_flag(ConnectFlag::PeerSeen, ConnectState::Connected)
                    .when_flag(ConnectFlag::TimedOut, ConnectState::Failed),
            )
            .state(PhaseState::<ConnectFlag>::new("Connected").enter(|_, ctx, _| {
                info!(
                    "connected to {}",
                    ctx.peer.map(|peer| peer.to_string()).unwrap_or_default()
                );
            }))
            .state(PhaseState::<ConnectFlag>::new("Failed").enter(|_, ctx, _| {
                info!("no peer answered within {} ticks", ctx.config.connect_timeout);
            }))
    }

    fn route(
        signal: &SessionSignal,
        _: &PhaseData<ConnectFlag>,
        _: &mut SessionContext,
    ) -> Option<ConnectFlag> {
        match signal {
            SessionSignal::PeerSeen { .. } => Some(ConnectFlag::PeerSeen),
            _ => None,
        }
    }

    fn outcome(state: StateIndex) -> Option<TopFlag> {
        match ConnectState::ALL.get(state)? {
            ConnectState::Announcing => None,
            ConnectState::Connected => Some(TopFlag::ConnectComplete),
            ConnectState::Failed => Some(TopFlag::ConnectFailed),
        }
    }
}

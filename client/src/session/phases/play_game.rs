use log::{debug, info};

use cmdlink_shared::{FlagSet, GameRequestJoin, StateIndex, SyncPayload};

use crate::session::{
    context::SessionContext,
    phase::{Phase, PhaseData, PhaseDef, PhaseState},
    signals::SessionSignal,
    top_level::TopFlag,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayGameFlag {
    JoinAccepted,
    JoinRejected,
    Started,
    Logoff,
}

impl FlagSet for PlayGameFlag {
    const COUNT: usize = 4;

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayGameState {
    /// GAME_REQUEST_JOIN sent, waiting for the answer
    Joining,
    /// Join accepted, waiting for GAME_START
    Waiting,
    Playing,
    Leaving,
}

impl PlayGameState {
    pub const ALL: [PlayGameState; 4] = [
        PlayGameState::Joining,
        PlayGameState::Waiting,
        PlayGameState::Playing,
        PlayGameState::Leaving,
    ];
}

impl From<PlayGameState> for StateIndex {
    fn from(state: PlayGameState) -> Self {
        state as StateIndex
    }
}

fn sync(data: &mut PhaseData<PlayGameFlag>, ctx: &mut SessionContext) {
    let payload = SyncPayload {
        tick: ctx.now,
        sequence: data.sequence,
    };
    let destination = ctx.peer_destination();
    ctx.send(&payload, destination);
    data.sequence = data.sequence.wrapping_add(1);
    data.last_sent_at = ctx.now;
}

pub(crate) struct PlayGamePhase;

impl Phase for PlayGamePhase {
    type Flag = PlayGameFlag;

    fn definition() -> PhaseDef<PlayGameFlag> {
        PhaseDef::<PlayGameFlag>::new("play_game")
            .state(
                PhaseState::<PlayGameFlag>::new("Joining")
                    .enter(|data, ctx, _| {
                        data.entered(ctx.now);
                        let game_id = ctx.config.game_id;
                        let destination = ctx.peer_destination();
                        data.pending = ctx.send(&GameRequestJoin { game_id }, destination);
                    })
                    .when_flag(PlayGameFlag::JoinRejected, PlayGameState::Leaving)
                    .when_flag(PlayGameFlag::Logoff, PlayGameState::Leaving)
                    .when_flag(PlayGameFlag::JoinAccepted, PlayGameState::Waiting),
            )
            .state(
                PhaseState::<PlayGameFlag>::new("Waiting")
                    .enter(|data, ctx, _| data.entered(ctx.now))
                    .when_flag(PlayGameFlag::Logoff, PlayGameState::Leaving)
                    .when_flag(PlayGameFlag::Started, PlayGameState::Playing),
            )
            .state(
                PhaseState::<PlayGameFlag>::new("Playing")
                    .enter(|data, ctx, _| {
                        data.entered(ctx.now);
                        info!(
                            "game {} started with seed {}",
                            ctx.config.game_id,
                            ctx.game_seed.unwrap_or_default()
                        );
                        sync(data, ctx);
                    })
                    .idle(|data, ctx, _| {
                        if ctx.since(data.last_sent_at) >= ctx.config.sync_interval {
                            sync(data, ctx);
                        }
                    })
                    .when_flag(PlayGameFlag::Logoff, PlayGameState::Leaving),
            )
            .state(PhaseState::<PlayGameFlag>::new("Leaving"))
    }

    fn route(
        signal: &SessionSignal,
        _: &PhaseData<PlayGameFlag>,
        ctx: &mut SessionContext,
    ) -> Option<PlayGameFlag> {
        match signal {
            SessionSignal::JoinAccepted { game_id } if *game_id == ctx.config.game_id => {
                Some(PlayGameFlag::JoinAccepted)
            }
            SessionSignal::JoinRejected { game_id } if *game_id == ctx.config.game_id => {
                info!("join of game {} rejected", game_id);
                Some(PlayGameFlag::JoinRejected)
            }
            SessionSignal::Started { game_id, seed } if *game_id == ctx.config.game_id => {
                ctx.game_seed = Some(*seed);
                Some(PlayGameFlag::Started)
            }
            SessionSignal::Logoff => Some(PlayGameFlag::Logoff),
            SessionSignal::JoinAccepted { game_id }
            | SessionSignal::JoinRejected { game_id }
            | SessionSignal::Started { game_id, .. } => {
                debug!("ignoring answer for game {}", game_id);
                None
            }
            _ => None,
        }
    }

    fn outcome(state: StateIndex) -> Option<TopFlag> {
        match PlayGameState::ALL.get(state)? {
            PlayGameState::Leaving => Some(TopFlag::LogoffRequested),
            _ => None,
        }
    }
}

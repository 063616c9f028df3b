use std::rc::Rc;

use log::{debug, info, trace};

use cmdlink_shared::{
    FlagSet, Flags, HasFlags, StateDef, StateIndex, StateMachineDef, StateMachineError,
};

use crate::session::{
    context::{ReceivedText, SessionContext},
    phase::{ActivePhase, Phase, PhaseMachine},
    phases::{
        choose_character::ChooseCharacterPhase, connect::ConnectPhase,
        leave_server::LeaveServerPhase, logoff_character::LogoffCharacterPhase,
        play_game::PlayGamePhase,
    },
    signals::SessionSignal,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TopState {
    Connect,
    ChooseCharacter,
    PlayGame,
    LogoffCharacter,
    LeaveServer,
    Disconnected,
    ExitGame,
}

impl TopState {
    pub const ALL: [TopState; 7] = [
        TopState::Connect,
        TopState::ChooseCharacter,
        TopState::PlayGame,
        TopState::LogoffCharacter,
        TopState::LeaveServer,
        TopState::Disconnected,
        TopState::ExitGame,
    ];

    pub fn from_index(index: StateIndex) -> Option<TopState> {
        Self::ALL.get(index).copied()
    }
}

impl From<TopState> for StateIndex {
    fn from(state: TopState) -> Self {
        state as StateIndex
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TopFlag {
    ConnectComplete,
    ConnectFailed,
    CharacterChosen,
    LeaveRequested,
    LogoffRequested,
    LogoffComplete,
    LogoffAborted,
    LeaveComplete,
    ConnectionLost,
    Reconnect,
    ExitRequested,
}

impl FlagSet for TopFlag {
    const COUNT: usize = 11;

    fn index(self) -> usize {
        self as usize
    }
}

/// Extra data of the top-level session machine.
pub struct TopLevel {
    flags: Flags<TopFlag>,
    phase: Option<Box<dyn ActivePhase>>,
}

impl TopLevel {
    pub(crate) fn new() -> Self {
        Self {
            flags: Flags::new(),
            phase: None,
        }
    }

    pub(crate) fn phase(&self) -> Option<&dyn ActivePhase> {
        self.phase.as_deref()
    }

    fn begin(&mut self, name: &'static str) {
        self.flags.clear_all();
        info!("session: {}", name);
    }

    fn end_phase(&mut self, ctx: &mut SessionContext) {
        if let Some(phase) = self.phase.take() {
            debug!("{} phase ended in {}", phase.tag(), phase.state_name().unwrap_or("none"));
            phase.destroy(ctx);
        }
    }

    /// Drains pending signals, steps the running phase and raises the
    /// phase's outcome flag once it has finished.
    fn run(&mut self, ctx: &mut SessionContext) {
        while let Some(signal) = ctx.signals.pop() {
            self.handle(signal, ctx);
        }

        if let Some(phase) = self.phase.as_mut() {
            phase.update(ctx);
            if let Some(flag) = phase.outcome() {
                if !self.flags.check(flag) {
                    debug!("{} phase finished: {:?}", phase.tag(), flag);
                    self.flags.raise(flag);
                }
            }
        }
    }

    fn handle(&mut self, signal: SessionSignal, ctx: &mut SessionContext) {
        match &signal {
            SessionSignal::ConnectionLost => {
                self.flags.raise(TopFlag::ConnectionLost);
                return;
            }
            SessionSignal::Reconnect => {
                self.flags.raise(TopFlag::Reconnect);
                return;
            }
            SessionSignal::Exit => {
                self.flags.raise(TopFlag::ExitRequested);
                return;
            }
            SessionSignal::SyncReceived { tick, .. } => {
                ctx.peer_tick = Some(*tick);
                return;
            }
            SessionSignal::Text {
                from,
                command,
                text,
            } => {
                ctx.record_text(ReceivedText {
                    from: *from,
                    command: *command,
                    text: text.clone(),
                });
                return;
            }
            SessionSignal::PeerSeen { address, player_id } => {
                ctx.peer = Some(*address);
                ctx.peer_player_id = Some(*player_id);
            }
            _ => {}
        }

        match self.phase.as_mut() {
            Some(phase) => {
                if !phase.signal(&signal, ctx) {
                    trace!("{:?} ignored by {} phase", signal, phase.tag());
                }
            }
            None => trace!("{:?} ignored, no phase running", signal),
        }
    }
}

impl HasFlags<TopFlag> for TopLevel {
    fn flags(&self) -> &Flags<TopFlag> {
        &self.flags
    }

    fn flags_mut(&mut self) -> &mut Flags<TopFlag> {
        &mut self.flags
    }
}

type TopStateDef = StateDef<TopLevel, SessionContext>;

/// A top-level state that runs phase `P` while active.
fn phase_state<P: Phase>(name: &'static str) -> Result<TopStateDef, StateMachineError> {
    let definition = Rc::new(P::definition());
    definition.validate()?;

    Ok(TopStateDef::new(name)
        .enter(move |top, ctx, _| {
            top.begin(name);
            top.phase = Some(Box::new(PhaseMachine::<P>::start(&definition, ctx)));
        })
        .exit(|top, ctx, _, _| top.end_phase(ctx))
        .idle(|top, ctx, _| top.run(ctx)))
}

/// A top-level state with no phase of its own.
fn plain_state(name: &'static str) -> TopStateDef {
    TopStateDef::new(name)
        .enter(move |top, _, _| top.begin(name))
        .idle(|top, ctx, _| top.run(ctx))
}

pub(crate) fn definition() -> Result<Rc<StateMachineDef<TopLevel, SessionContext>>, StateMachineError>
{
    let definition = StateMachineDef::new("session")
        .state(
            phase_state::<ConnectPhase>("Connect")?
                .when_flag(TopFlag::ConnectComplete, TopState::ChooseCharacter)
                .when_flag(TopFlag::ConnectFailed, TopState::Disconnected)
                .when_flag(TopFlag::ConnectionLost, TopState::Disconnected),
        )
        .state(
            phase_state::<ChooseCharacterPhase>("ChooseCharacter")?
                .when_flag(TopFlag::CharacterChosen, TopState::PlayGame)
                .when_flag(TopFlag::LeaveRequested, TopState::LeaveServer)
                .when_flag(TopFlag::ConnectionLost, TopState::Disconnected),
        )
        .state(
            phase_state::<PlayGamePhase>("PlayGame")?
                .when_flag(TopFlag::LogoffRequested, TopState::LogoffCharacter)
                .when_flag(TopFlag::ConnectionLost, TopState::Disconnected),
        )
        .state(
            phase_state::<LogoffCharacterPhase>("LogoffCharacter")?
                .when_flag(TopFlag::LogoffComplete, TopState::ChooseCharacter)
                .when_flag(TopFlag::LogoffAborted, TopState::PlayGame)
                .when_flag(TopFlag::ConnectionLost, TopState::Disconnected),
        )
        .state(
            phase_state::<LeaveServerPhase>("LeaveServer")?
                .when_flag(TopFlag::LeaveComplete, TopState::Disconnected)
                .when_flag(TopFlag::ConnectionLost, TopState::Disconnected),
        )
        .state(
            plain_state("Disconnected")
                .when_flag(TopFlag::Reconnect, TopState::Connect)
                .when_flag(TopFlag::ExitRequested, TopState::ExitGame),
        )
        .state(plain_state("ExitGame"));

    definition.validate()?;
    Ok(Rc::new(definition))
}

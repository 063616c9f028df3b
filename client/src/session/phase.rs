use std::rc::Rc;

use log::debug;

use cmdlink_shared::{
    FlagSet, Flags, HasFlags, PacketId, StateDef, StateIndex, StateMachine, StateMachineDef, Tick,
};

use crate::session::{context::SessionContext, signals::SessionSignal, top_level::TopFlag};

/// Extra data of every phase machine: the phase's flags plus the timers and
/// bookkeeping its states share.
#[derive(Debug)]
pub struct PhaseData<F: FlagSet> {
    pub(crate) flags: Flags<F>,
    /// Tick the current state was entered
    pub(crate) entered_at: Tick,
    /// Tick of the last periodic send (announce, sync)
    pub(crate) last_sent_at: Tick,
    /// Id of the tracked send the current state waits on
    pub(crate) pending: Option<PacketId>,
    pub(crate) sequence: u16,
}

impl<F: FlagSet> PhaseData<F> {
    fn new() -> Self {
        Self {
            flags: Flags::new(),
            entered_at: 0,
            last_sent_at: 0,
            pending: None,
            sequence: 0,
        }
    }

    /// Resets the per-state bookkeeping; call from enter callbacks.
    pub(crate) fn entered(&mut self, now: Tick) {
        self.entered_at = now;
        self.last_sent_at = now;
        self.pending = None;
    }
}

impl<F: FlagSet> HasFlags<F> for PhaseData<F> {
    fn flags(&self) -> &Flags<F> {
        &self.flags
    }

    fn flags_mut(&mut self) -> &mut Flags<F> {
        &mut self.flags
    }
}

pub(crate) type PhaseDef<F> = StateMachineDef<PhaseData<F>, SessionContext>;
pub(crate) type PhaseState<F> = StateDef<PhaseData<F>, SessionContext>;

/// One step of the session, run as its own state machine while the matching
/// top-level state is active. The machine starts in state 0; reaching a
/// state with an [`outcome`](Phase::outcome) finishes the phase.
pub(crate) trait Phase: 'static {
    type Flag: FlagSet + 'static;

    fn definition() -> PhaseDef<Self::Flag>;

    /// Flag raised on the phase for `signal`, if the phase cares about it.
    fn route(
        signal: &SessionSignal,
        data: &PhaseData<Self::Flag>,
        ctx: &mut SessionContext,
    ) -> Option<Self::Flag>;

    /// Top-level flag raised once the phase sits in `state`.
    fn outcome(state: StateIndex) -> Option<TopFlag>;
}

/// Object-safe handle to whichever phase machine is running.
pub(crate) trait ActivePhase {
    fn tag(&self) -> &'static str;
    fn state_name(&self) -> Option<&'static str>;
    fn signal(&mut self, signal: &SessionSignal, ctx: &mut SessionContext) -> bool;
    fn update(&mut self, ctx: &mut SessionContext);
    fn outcome(&self) -> Option<TopFlag>;
    fn destroy(self: Box<Self>, ctx: &mut SessionContext);
}

pub(crate) struct PhaseMachine<P: Phase> {
    machine: StateMachine<PhaseData<P::Flag>, SessionContext>,
}

impl<P: Phase> PhaseMachine<P> {
    /// Creates the phase machine and enters its first state.
    pub(crate) fn start(definition: &Rc<PhaseDef<P::Flag>>, ctx: &mut SessionContext) -> Self {
        let mut machine = StateMachine::create(Rc::clone(definition), PhaseData::new(), ctx);
        machine.goto_state(ctx, 0);
        Self { machine }
    }
}

impl<P: Phase> ActivePhase for PhaseMachine<P> {
    fn tag(&self) -> &'static str {
        self.machine.tag()
    }

    fn state_name(&self) -> Option<&'static str> {
        self.machine.state_name()
    }

    fn signal(&mut self, signal: &SessionSignal, ctx: &mut SessionContext) -> bool {
        let data = self.machine.extra_data_mut();
        match P::route(signal, data, ctx) {
            Some(flag) => {
                data.flags.raise(flag);
                true
            }
            None => false,
        }
    }

    fn update(&mut self, ctx: &mut SessionContext) {
        let before = self.machine.state_name();
        if self.machine.update(ctx) {
            debug!(
                "{} phase: {} -> {}",
                self.machine.tag(),
                before.unwrap_or("none"),
                self.machine.state_name().unwrap_or("none")
            );
        }
    }

    fn outcome(&self) -> Option<TopFlag> {
        self.machine.state().and_then(P::outcome)
    }

    fn destroy(self: Box<Self>, ctx: &mut SessionContext) {
        self.machine.destroy(ctx);
    }
}

use log::{debug, info, trace};

use cmdlink_shared::{
    CmdQueue, Command, Destination, Packet, PacketId, QueueStats, StateMachine, TextMessage,
    Tick, Transport,
};

use crate::{
    error::SessionError,
    session::{
        context::{ReceivedText, SessionContext},
        handlers::session_callbacks,
        session_config::SessionConfig,
        signals::{SessionSignal, SignalQueue},
        top_level::{self, TopLevel, TopState},
    },
};

/// One peer's networked session over a single port.
///
/// Call [`tick`](Session::tick) once per iteration of the outer loop: it
/// drains the port, runs the send scheduler and steps the session machine,
/// in that order. Application requests (choosing a character, logging off,
/// leaving) are queued with [`signal`](Session::signal) or the helpers below
/// and take effect on the next tick.
pub struct Session {
    machine: StateMachine<TopLevel, SessionContext>,
    ctx: SessionContext,
}

impl Session {
    pub fn new(transport: Box<dyn Transport>, config: SessionConfig) -> Result<Self, SessionError> {
        let signals = SignalQueue::new();
        let mut queue = CmdQueue::new(transport, config.queue.clone());
        queue.register_callbacks(session_callbacks(&signals, &config));

        let mut ctx = SessionContext::new(queue, config, signals);
        let machine = StateMachine::try_create(top_level::definition()?, TopLevel::new(), &mut ctx)?;

        Ok(Self { machine, ctx })
    }

    /// Enters the connect phase at tick `now`.
    pub fn start(&mut self, now: Tick) -> Result<(), SessionError> {
        if let Some(state) = self.machine.state_name() {
            return Err(SessionError::AlreadyStarted { state });
        }
        self.ctx.now = now;
        info!("session starting on {}", self.ctx.queue.local_address());
        self.machine.try_goto_state(&mut self.ctx, usize::from(TopState::Connect))?;
        Ok(())
    }

    /// Runs one tick: receives, then sends, then one step of the session.
    /// Before [`start`](Session::start) nothing consumes signals, so the
    /// ones raised by the port are dropped instead.
    pub fn tick(&mut self, now: Tick) {
        self.ctx.now = now;
        self.ctx.queue.process_receives();
        self.ctx.queue.schedule_sends(now);
        if self.machine.state().is_none() {
            let dropped = self.ctx.signals.clear();
            if dropped > 0 {
                trace!("session not started, dropped {} signals", dropped);
            }
            return;
        }
        self.machine.update(&mut self.ctx);
    }

    /// Signals queued for the next tick.
    pub fn pending_signals(&self) -> usize {
        self.ctx.signals.len()
    }

    /// Drains the received text log.
    pub fn take_received(&mut self) -> Vec<ReceivedText> {
        self.ctx.received.drain(..).collect()
    }

    /// Queues an application request or an externally detected event.
    pub fn signal(&self, signal: SessionSignal) {
        self.ctx.signals.push(signal);
    }

    pub fn select_character(&self, name: impl Into<String>) {
        self.signal(SessionSignal::SelectCharacter { name: name.into() });
    }

    pub fn logoff(&self) {
        self.signal(SessionSignal::Logoff);
    }

    pub fn abort_logoff(&self) {
        self.signal(SessionSignal::AbortLogoff);
    }

    pub fn leave(&self) {
        self.signal(SessionSignal::Leave);
    }

    pub fn connection_lost(&self) {
        self.signal(SessionSignal::ConnectionLost);
    }

    pub fn reconnect(&self) {
        self.signal(SessionSignal::Reconnect);
    }

    pub fn exit(&self) {
        self.signal(SessionSignal::Exit);
    }

    /// Sends a chat line to the peer and loops it back through this
    /// session's own MESSAGE handler, so it shows up in
    /// [`SessionContext::received`] on both ends.
    pub fn try_say(&mut self, text: impl Into<String>) -> Result<PacketId, SessionError> {
        let peer = self.ctx.peer.ok_or(SessionError::NoPeer)?;
        let packet = Packet::from_payload(&TextMessage::new(text));

        let id = self.ctx.queue.send(packet, Destination::Unicast(peer));
        let stamped = self
            .ctx
            .queue
            .entry(Command::Message, id)
            .map(|entry| entry.packet().clone());
        if let Some(stamped) = stamped {
            self.ctx.queue.try_forced_receive(&stamped)?;
        }
        Ok(id)
    }

    pub fn state(&self) -> Option<TopState> {
        self.machine.state().and_then(TopState::from_index)
    }

    /// Name of the running phase machine's current state.
    pub fn phase_state(&self) -> Option<&'static str> {
        self.machine
            .extra_data()
            .phase()
            .and_then(|phase| phase.state_name())
    }

    pub fn is_finished(&self) -> bool {
        self.state() == Some(TopState::ExitGame)
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    pub fn stats(&self) -> &QueueStats {
        self.ctx.queue.stats()
    }

    /// Tears the session down: the current state and phase are exited as
    /// destroyed, then every pending inbound and outbound packet on the port
    /// is discarded. Returns the context for inspection.
    pub fn shutdown(self) -> SessionContext {
        let Self { machine, mut ctx } = self;
        let state = machine.state_name();
        machine.destroy(&mut ctx);
        ctx.queue.clear_port();
        debug!("session shut down from {}", state.unwrap_or("none"));
        ctx
    }
}

use std::fmt;

use crate::{
    cmd_queue::cmd_queue::CmdQueue,
    packet::{command::Command, packet::Packet},
};

/// Receives every packet of the command type it is registered for.
pub trait CommandHandler {
    fn on_command(&mut self, queue: &mut CmdQueue, packet: &Packet);
}

impl<F> CommandHandler for F
where
    F: FnMut(&mut CmdQueue, &Packet),
{
    fn on_command(&mut self, queue: &mut CmdQueue, packet: &Packet) {
        self(queue, packet)
    }
}

/// Handler table indexed by command code.
pub struct CommandCallbacks {
    handlers: [Option<Box<dyn CommandHandler>>; Command::COUNT],
}

impl Default for CommandCallbacks {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandCallbacks {
    pub fn new() -> Self {
        Self {
            handlers: std::array::from_fn(|_| None),
        }
    }

    /// Registers a closure for `command`, replacing any previous handler.
    pub fn on<F>(mut self, command: Command, handler: F) -> Self
    where
        F: FnMut(&mut CmdQueue, &Packet) + 'static,
    {
        self.set(command, Box::new(handler));
        self
    }

    pub fn on_handler<H: CommandHandler + 'static>(mut self, command: Command, handler: H) -> Self {
        self.set(command, Box::new(handler));
        self
    }

    pub fn set(&mut self, command: Command, handler: Box<dyn CommandHandler>) {
        self.handlers[command.index()] = Some(handler);
    }

    pub fn remove(&mut self, command: Command) -> Option<Box<dyn CommandHandler>> {
        self.handlers[command.index()].take()
    }

    pub fn is_registered(&self, command: Command) -> bool {
        self.handlers[command.index()].is_some()
    }

    pub(crate) fn take(&mut self, command: Command) -> Option<Box<dyn CommandHandler>> {
        self.handlers[command.index()].take()
    }

    pub(crate) fn restore(&mut self, command: Command, handler: Box<dyn CommandHandler>) {
        let slot = &mut self.handlers[command.index()];
        if slot.is_none() {
            *slot = Some(handler);
        }
    }
}

impl fmt::Debug for CommandCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registered: Vec<Command> = Command::ALL
            .iter()
            .copied()
            .filter(|command| self.is_registered(*command))
            .collect();
        f.debug_struct("CommandCallbacks")
            .field("registered", &registered)
            .finish()
    }
}

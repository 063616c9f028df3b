use std::{fmt, rc::Rc};

use log::trace;

use crate::state_machine::{
    definition::{StateIndex, StateMachineDef},
    error::StateMachineError,
};

/// A running instance of a [`StateMachineDef`].
///
/// `X` is the instance's extra data, owned by the instance and handed to
/// every callback. `C` is the caller's context, borrowed for the duration of
/// each call that may run callbacks. The current state is `None` before the
/// first transition and after [`destroy`](StateMachine::destroy).
pub struct StateMachine<X, C> {
    definition: Rc<StateMachineDef<X, C>>,
    state: Option<StateIndex>,
    extra: X,
}

impl<X: 'static, C: 'static> StateMachine<X, C> {
    /// Creates an instance in the none state and runs the definition's init
    /// callback. No state is entered; call [`goto_state`](Self::goto_state)
    /// to start the machine.
    pub fn try_create(
        definition: Rc<StateMachineDef<X, C>>,
        extra: X,
        ctx: &mut C,
    ) -> Result<Self, StateMachineError> {
        definition.validate()?;

        let mut machine = Self {
            definition,
            state: None,
            extra,
        };
        if let Some(init) = &machine.definition.init {
            init(&mut machine.extra, ctx);
        }
        trace!("state machine '{}' created", machine.definition.tag);
        Ok(machine)
    }

    /// Creates an instance in the none state and runs the init callback.
    ///
    /// # Panics
    ///
    /// Panics if a conditional of the definition targets a state that does
    /// not exist.
    pub fn create(definition: Rc<StateMachineDef<X, C>>, extra: X, ctx: &mut C) -> Self {
        Self::try_create(definition, extra, ctx)
            .expect("state machine definition has an invalid conditional target")
    }

    /// Leaves the current state (its exit callback sees `is_destroyed`), runs
    /// the finish callback and hands back the extra data.
    pub fn destroy(mut self, ctx: &mut C) -> X {
        self.transition(ctx, None);
        let definition = Rc::clone(&self.definition);
        if let Some(finish) = &definition.finish {
            finish(&mut self.extra, ctx);
        }
        trace!("state machine '{}' destroyed", definition.tag);
        self.extra
    }

    /// Steps the machine once. Returns whether a transition happened.
    ///
    /// The current state's conditionals are checked in order and the first
    /// one that passes moves the machine to its target, after which nothing
    /// else is checked. The idle callback runs only when no conditional
    /// passed. Does nothing in the none state.
    pub fn update(&mut self, ctx: &mut C) -> bool {
        let Some(state) = self.state else {
            return false;
        };
        let definition = Rc::clone(&self.definition);
        let state_def = &definition.states[state];

        let fired = state_def
            .conditionals
            .iter()
            .find(|conditional| (conditional.check)(&self.extra, ctx, conditional.data));

        match fired {
            Some(conditional) => {
                self.transition(ctx, Some(conditional.target));
                true
            }
            None => {
                if let Some(idle) = &state_def.idle {
                    idle(&mut self.extra, ctx, state_def.data);
                }
                false
            }
        }
    }

    /// Moves to `target`, running the current state's exit callback and then
    /// the target's enter callback. Moving to `None` runs exit only, with
    /// `is_destroyed` set.
    pub fn try_goto_state(
        &mut self,
        ctx: &mut C,
        target: impl Into<Option<StateIndex>>,
    ) -> Result<(), StateMachineError> {
        let target = target.into();
        if let Some(index) = target {
            let count = self.definition.states.len();
            if index >= count {
                return Err(StateMachineError::StateOutOfRange {
                    tag: self.definition.tag,
                    state: index,
                    count,
                });
            }
        }
        self.transition(ctx, target);
        Ok(())
    }

    /// Moves to `target`. See [`try_goto_state`](Self::try_goto_state).
    ///
    /// # Panics
    ///
    /// Panics if `target` is not a state of the definition.
    pub fn goto_state(&mut self, ctx: &mut C, target: impl Into<Option<StateIndex>>) {
        self.try_goto_state(ctx, target)
            .expect("state index out of range");
    }

    fn transition(&mut self, ctx: &mut C, target: Option<StateIndex>) {
        let definition = Rc::clone(&self.definition);

        if let Some(current) = self.state {
            let state_def = &definition.states[current];
            if let Some(exit) = &state_def.exit {
                exit(&mut self.extra, ctx, state_def.data, target.is_none());
            }
        }

        trace!(
            "state machine '{}': {} -> {}",
            definition.tag,
            self.state_name().unwrap_or("none"),
            target
                .map(|index| definition.states[index].name)
                .unwrap_or("none"),
        );
        self.state = target;

        if let Some(next) = target {
            let state_def = &definition.states[next];
            if let Some(enter) = &state_def.enter {
                enter(&mut self.extra, ctx, state_def.data);
            }
        }
    }
}

impl<X, C> StateMachine<X, C> {
    pub fn state(&self) -> Option<StateIndex> {
        self.state
    }

    pub fn state_name(&self) -> Option<&'static str> {
        self.state.map(|index| self.definition.states[index].name)
    }

    pub fn is_running(&self) -> bool {
        self.state.is_some()
    }

    pub fn extra_data(&self) -> &X {
        &self.extra
    }

    pub fn extra_data_mut(&mut self) -> &mut X {
        &mut self.extra
    }

    /// Replaces the extra data, returning the previous value.
    pub fn set_extra_data(&mut self, extra: X) -> X {
        std::mem::replace(&mut self.extra, extra)
    }

    pub fn tag(&self) -> &'static str {
        self.definition.tag
    }

    pub fn definition(&self) -> &Rc<StateMachineDef<X, C>> {
        &self.definition
    }
}

impl<X: fmt::Debug, C> fmt::Debug for StateMachine<X, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("tag", &self.definition.tag)
            .field("state", &self.state_name())
            .field("extra", &self.extra)
            .finish()
    }
}

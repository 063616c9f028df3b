use std::rc::Rc;

use crate::state_machine::{
    error::StateMachineError,
    flags::{FlagSet, HasFlags},
};

pub type StateIndex = usize;

pub type HookFn<X, C> = Box<dyn Fn(&mut X, &mut C)>;
pub type EnterFn<X, C> = Box<dyn Fn(&mut X, &mut C, u32)>;
pub type ExitFn<X, C> = Box<dyn Fn(&mut X, &mut C, u32, bool)>;
pub type IdleFn<X, C> = Box<dyn Fn(&mut X, &mut C, u32)>;
pub type ConditionFn<X, C> = Box<dyn Fn(&X, &C, u32) -> bool>;

/// Behaviour of a single state as one object, for states whose enter, exit
/// and idle logic share code or data. Every method defaults to doing nothing.
///
/// `data` is the state's extra data word; `is_destroyed` is true when the
/// machine is leaving the state because it is being torn down.
pub trait StateBehavior<X, C> {
    fn on_enter(&self, _extra: &mut X, _ctx: &mut C, _data: u32) {}
    fn on_exit(&self, _extra: &mut X, _ctx: &mut C, _data: u32, _is_destroyed: bool) {}
    fn on_idle(&self, _extra: &mut X, _ctx: &mut C, _data: u32) {}
}

/// A (check, extra data, target) triple. Conditionals of a state are tried
/// in order and the first one whose check passes wins.
pub struct Conditional<X, C> {
    pub(crate) check: ConditionFn<X, C>,
    pub(crate) data: u32,
    pub(crate) target: StateIndex,
}

impl<X, C> Conditional<X, C> {
    pub fn target(&self) -> StateIndex {
        self.target
    }

    pub fn data(&self) -> u32 {
        self.data
    }
}

pub struct StateDef<X, C> {
    pub(crate) name: &'static str,
    pub(crate) enter: Option<EnterFn<X, C>>,
    pub(crate) exit: Option<ExitFn<X, C>>,
    pub(crate) idle: Option<IdleFn<X, C>>,
    pub(crate) data: u32,
    pub(crate) conditionals: Vec<Conditional<X, C>>,
}

impl<X: 'static, C: 'static> StateDef<X, C> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            enter: None,
            exit: None,
            idle: None,
            data: 0,
            conditionals: Vec::new(),
        }
    }

    pub fn enter(mut self, enter: impl Fn(&mut X, &mut C, u32) + 'static) -> Self {
        self.enter = Some(Box::new(enter));
        self
    }

    pub fn exit(mut self, exit: impl Fn(&mut X, &mut C, u32, bool) + 'static) -> Self {
        self.exit = Some(Box::new(exit));
        self
    }

    pub fn idle(mut self, idle: impl Fn(&mut X, &mut C, u32) + 'static) -> Self {
        self.idle = Some(Box::new(idle));
        self
    }

    /// Installs all three callbacks from one behaviour object.
    pub fn behavior<B: StateBehavior<X, C> + 'static>(self, behavior: B) -> Self {
        let behavior = Rc::new(behavior);
        let on_exit = Rc::clone(&behavior);
        let on_idle = Rc::clone(&behavior);
        self.enter(move |extra, ctx, data| behavior.on_enter(extra, ctx, data))
            .exit(move |extra, ctx, data, is_destroyed| {
                on_exit.on_exit(extra, ctx, data, is_destroyed)
            })
            .idle(move |extra, ctx, data| on_idle.on_idle(extra, ctx, data))
    }

    /// Extra data word handed to this state's callbacks.
    pub fn data(mut self, data: u32) -> Self {
        self.data = data;
        self
    }

    /// Appends a conditional; `target` is entered when `check` passes.
    pub fn when(
        self,
        check: impl Fn(&X, &C, u32) -> bool + 'static,
        target: impl Into<StateIndex>,
    ) -> Self {
        self.when_with_data(check, 0, target)
    }

    pub fn when_with_data(
        mut self,
        check: impl Fn(&X, &C, u32) -> bool + 'static,
        data: u32,
        target: impl Into<StateIndex>,
    ) -> Self {
        self.conditionals.push(Conditional {
            check: Box::new(check),
            data,
            target: target.into(),
        });
        self
    }

    /// Appends a conditional that passes while `flag` is set.
    pub fn when_flag<F>(self, flag: F, target: impl Into<StateIndex>) -> Self
    where
        F: FlagSet + 'static,
        X: HasFlags<F>,
    {
        self.when(move |extra: &X, _: &C, _| extra.flags().check(flag), target)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn conditionals(&self) -> &[Conditional<X, C>] {
        &self.conditionals
    }
}

/// Immutable description of a state machine, shared by all its instances.
pub struct StateMachineDef<X, C> {
    pub(crate) tag: &'static str,
    pub(crate) init: Option<HookFn<X, C>>,
    pub(crate) finish: Option<HookFn<X, C>>,
    pub(crate) states: Vec<StateDef<X, C>>,
}

impl<X: 'static, C: 'static> StateMachineDef<X, C> {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            init: None,
            finish: None,
            states: Vec::new(),
        }
    }

    /// Runs once when an instance is created, before any state is entered.
    pub fn init(mut self, init: impl Fn(&mut X, &mut C) + 'static) -> Self {
        self.init = Some(Box::new(init));
        self
    }

    /// Runs once when an instance is destroyed, after the last exit callback.
    pub fn finish(mut self, finish: impl Fn(&mut X, &mut C) + 'static) -> Self {
        self.finish = Some(Box::new(finish));
        self
    }

    /// Appends a state; its index is its position.
    pub fn state(mut self, state: StateDef<X, C>) -> Self {
        self.states.push(state);
        self
    }

    pub fn tag(&self) -> &'static str {
        self.tag
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn state_def(&self, index: StateIndex) -> Option<&StateDef<X, C>> {
        self.states.get(index)
    }

    /// Checks that every conditional targets a defined state.
    pub fn validate(&self) -> Result<(), StateMachineError> {
        let count = self.states.len();
        for (state, state_def) in self.states.iter().enumerate() {
            for (conditional, cond) in state_def.conditionals.iter().enumerate() {
                if cond.target >= count {
                    return Err(StateMachineError::InvalidConditionalTarget {
                        tag: self.tag,
                        state,
                        conditional,
                        target: cond.target,
                        count,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn into_shared(self) -> Rc<Self> {
        Rc::new(self)
    }
}

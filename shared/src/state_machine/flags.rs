use std::{fmt, marker::PhantomData};

/// An enum naming the flags of one state machine.
pub trait FlagSet: Copy + fmt::Debug {
    const COUNT: usize;

    fn index(self) -> usize;
}

/// Fixed boolean flag array keyed by a [`FlagSet`]. This is the usual extra
/// data of session machines: conditionals check flags, outside events set them.
#[derive(Clone, PartialEq, Eq)]
pub struct Flags<F: FlagSet> {
    flags: Vec<bool>,
    phantom: PhantomData<F>,
}

impl<F: FlagSet> Default for Flags<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: FlagSet> Flags<F> {
    pub fn new() -> Self {
        Self {
            flags: vec![false; F::COUNT],
            phantom: PhantomData,
        }
    }

    pub fn check(&self, flag: F) -> bool {
        self.flags[flag.index()]
    }

    pub fn set(&mut self, flag: F, value: bool) {
        self.flags[flag.index()] = value;
    }

    pub fn raise(&mut self, flag: F) {
        self.set(flag, true);
    }

    pub fn clear_all(&mut self) {
        self.flags.iter_mut().for_each(|flag| *flag = false);
    }

    pub fn any(&self) -> bool {
        self.flags.iter().any(|flag| *flag)
    }
}

impl<F: FlagSet> fmt::Debug for Flags<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.flags.iter().enumerate().filter(|(_, set)| **set).map(|(i, _)| i))
            .finish()
    }
}

/// Extra data that carries a flag array, so conditionals can be written as
/// plain flag checks with [`StateDef::when_flag`](crate::StateDef::when_flag).
pub trait HasFlags<F: FlagSet> {
    fn flags(&self) -> &Flags<F>;
    fn flags_mut(&mut self) -> &mut Flags<F>;
}

impl<F: FlagSet> HasFlags<F> for Flags<F> {
    fn flags(&self) -> &Flags<F> {
        self
    }

    fn flags_mut(&mut self) -> &mut Flags<F> {
        self
    }
}

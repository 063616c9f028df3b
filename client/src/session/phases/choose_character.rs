use log::info;

use cmdlink_shared::{FlagSet, StateIndex};

use crate::session::{
    context::SessionContext,
    phase::{Phase, PhaseData, PhaseDef, PhaseState},
    signals::SessionSignal,
    top_level::TopFlag,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChooseCharacterFlag {
    Selected,
    Leave,
}

impl FlagSet for ChooseCharacterFlag {
    const COUNT: usize = 2;

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChooseCharacterState {
    Choosing,
    Chosen,
    Leaving,
}

impl ChooseCharacterState {
    pub const ALL: [ChooseCharacterState; 3] = [
        ChooseCharacterState::Choosing,
        ChooseCharacterState::Chosen,
        ChooseCharacterState::Leaving,
    ];
}

impl From<ChooseCharacterState> for StateIndex {
    fn from(state: ChooseCharacterState) -> Self {
        state as StateIndex
    }
}

pub(crate) struct ChooseCharacterPhase;

impl Phase for ChooseCharacterPhase {
    type Flag = ChooseCharacterFlag;

    fn definition() -> PhaseDef<ChooseCharacterFlag> {
        PhaseDef::<ChooseCharacterFlag>::new("choose_character")
            .state(
                PhaseState::<ChooseCharacterFlag>::new("Choosing")
                    .enter(|data, ctx, _| data.entered(ctx.now))
                    .when_flag(ChooseCharacterFlag::Selected, ChooseCharacterState::Chosen)
                    .when_flag(ChooseCharacterFlag::Leave, ChooseCharacterState::Leaving),
            )
            .state(PhaseState::<ChooseCharacterFlag>::new("Chosen").enter(|_, ctx, _| {
                info!("playing as {}", ctx.character.as_deref().unwrap_or("?"));
            }))
            .state(PhaseState::<ChooseCharacterFlag>::new("Leaving"))
    }

    fn route(
        signal: &SessionSignal,
        _: &PhaseData<ChooseCharacterFlag>,
        ctx: &mut SessionContext,
    ) -> Option<ChooseCharacterFlag> {
        match signal {
            SessionSignal::SelectCharacter { name } => {
                ctx.character = Some(name.clone());
                Some(ChooseCharacterFlag::Selected)
            }
            SessionSignal::Leave => Some(ChooseCharacterFlag::Leave),
            _ => None,
        }
    }

    fn outcome(state: StateIndex) -> Option<TopFlag> {
        match ChooseCharacterState::ALL.get(state)? {
            ChooseCharacterState::Choosing => None,
            ChooseCharacterState::Chosen => Some(TopFlag::CharacterChosen),
            ChooseCharacterState::Leaving => Some(TopFlag::LeaveRequested),
        }
    }
}

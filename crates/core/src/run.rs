//! The reducer. `apply` is the only mutation path for a run; every arm either
//! refuses with an error and leaves the input untouched, or returns a fresh
//! state plus the ordered events of the transition.

use crate::actions::Action;
use crate::error::{illegal, EngineError};
use crate::events::{Event, EventBus};
use crate::state::{Phase, RunState};

mod helpers;
mod legal;
mod prompts;
mod resolve;
mod rooms;
mod setup;
mod window;

impl RunState {
    /// Pure at the contract boundary: the input state is never mutated.
    pub fn apply(&self, action: &Action) -> Result<(RunState, Vec<Event>), EngineError> {
        let mut next = self.clone();
        let mut events = EventBus::default();
        next.apply_mut(action, &mut events)?;
        Ok((next, events.drain().collect()))
    }

    fn apply_mut(&mut self, action: &Action, events: &mut EventBus) -> Result<(), EngineError> {
        if self.is_over() {
            return Err(illegal("run is over"));
        }
        if self.pending_prompt.is_some() {
            return self.answer_prompt(action, events);
        }
        match action {
            Action::StartRun { .. } => Err(illegal("run already started")),
            Action::SelectAttunement { major_ids } => self.select_attunement(major_ids, events),
            Action::ChooseEngage => self.choose_engage(),
            Action::ChooseFlee => self.choose_flee(events),
            Action::SelectCarriedCard { slot } => self.select_carried_card(*slot),
            Action::UseLeapOfFaith { slot } => self.use_leap_of_faith(*slot, events),
            Action::SpendFateReroll { slot } => self.spend_fate_reroll(*slot, events),
            Action::SpendFateCleanse { slot } => self.spend_fate_cleanse(*slot, events),
            Action::SpendFateExileReplace { slot } => {
                self.spend_fate_exile_replace(*slot, events)
            }
            Action::SpendFateCheatWeapon => self.spend_fate_cheat_weapon(events),
            Action::UseSpellCleanse { slot } => self.use_spell_cleanse(*slot, events),
            Action::UseSpellReroll { slot } => self.use_spell_reroll(*slot, events),
            Action::UseMajorGift { major_id } => self.use_major_gift(major_id, events),
            Action::CommitResolve { slot } => self.commit_resolve(*slot, events),
            Action::ResolveAce { .. }
            | Action::ResolveEnemyFight { .. }
            | Action::ResolveAmbush { .. }
            | Action::ResolveCupsChoice { .. }
            | Action::AnswerChoice { .. }
            | Action::AnswerBargain { .. }
            | Action::SelectTarget { .. }
            | Action::ReorderTop { .. }
            | Action::ReorderRoom { .. } => Err(EngineError::PromptMismatch),
        }
    }

    /// Continue the phase flow once a Major evaluation has fully drained.
    pub(crate) fn advance_after_effects(
        &mut self,
        events: &mut EventBus,
    ) -> Result<(), EngineError> {
        if self.is_over() || self.pending_prompt.is_some() {
            return Ok(());
        }
        match self.phase {
            Phase::FloorStart => self.start_room(None, events),
            Phase::RoomReveal => {
                self.phase = Phase::RoomChoice;
                Ok(())
            }
            Phase::ResolveExecute => self.finish_resolution_step(events),
            _ => Ok(()),
        }
    }

    pub(crate) fn run_queue_and_advance(
        &mut self,
        events: &mut EventBus,
    ) -> Result<(), EngineError> {
        self.run_effect_queue(events)?;
        self.advance_after_effects(events)
    }
}

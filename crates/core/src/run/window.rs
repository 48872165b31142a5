use crate::cards::Orientation;
use crate::content::{Effect, FateAction, ShadowTrigger};
use crate::error::{illegal, EngineError};
use crate::events::{Event, EventBus, EquipmentKind};
use crate::rules::{ordering_value, OrderConstraintKind};
use crate::state::{PendingResolution, Phase, RunState};

impl RunState {
    pub(crate) fn use_leap_of_faith(
        &mut self,
        slot: usize,
        events: &mut EventBus,
    ) -> Result<(), EngineError> {
        self.ensure_phase(Phase::PreResolveWindow, "leap of faith")?;
        if self.room.leap_used {
            return Err(illegal("leap of faith already used this room"));
        }
        let id = self.open_slot_id(slot)?;
        self.room.leap_used = true;
        if let Some(card) = self.cards.get_mut(&id) {
            card.orientation = card.orientation.flipped();
        }
        if self.cards[id.as_str()].orientation == Orientation::Reversed {
            self.gain_fate(2, events);
        } else {
            self.apply_damage(2, false, events);
        }
        Ok(())
    }

    pub(crate) fn spend_fate_reroll(
        &mut self,
        slot: usize,
        events: &mut EventBus,
    ) -> Result<(), EngineError> {
        self.ensure_phase(Phase::PreResolveWindow, "fate reroll")?;
        if self.room.fate_action_disabled(FateAction::Reroll) {
            return Err(illegal("rerolls are disabled this room"));
        }
        if self.player.fate < 1 {
            return Err(illegal("not enough fate"));
        }
        self.open_slot_id(slot)?;
        self.spend_fate(1, events);
        self.reroll_slot(slot, events)
    }

    pub(crate) fn spend_fate_cleanse(
        &mut self,
        slot: usize,
        events: &mut EventBus,
    ) -> Result<(), EngineError> {
        self.ensure_phase(Phase::PreResolveWindow, "fate cleanse")?;
        if self.room.fate_action_disabled(FateAction::Cleanse) {
            return Err(illegal("cleanses are disabled this room"));
        }
        if self.player.fate < 1 {
            return Err(illegal("not enough fate"));
        }
        self.open_slot_id(slot)?;
        if self.slot_effective(slot) != Orientation::Reversed {
            return Err(illegal("cleanse targets must be effectively reversed"));
        }
        self.spend_fate(1, events);
        self.room.pending_cleanses[slot] = true;
        Ok(())
    }

    pub(crate) fn spend_fate_exile_replace(
        &mut self,
        slot: usize,
        events: &mut EventBus,
    ) -> Result<(), EngineError> {
        self.ensure_phase(Phase::PreResolveWindow, "fate exile")?;
        if self.player.fate < 2 {
            return Err(illegal("not enough fate"));
        }
        self.open_slot_id(slot)?;
        self.spend_fate(2, events);
        self.exile_replace_slot(slot, events)
    }

    pub(crate) fn spend_fate_cheat_weapon(
        &mut self,
        events: &mut EventBus,
    ) -> Result<(), EngineError> {
        self.ensure_phase(Phase::PreResolveWindow, "fate cheat")?;
        if self.player.fate < 2 {
            return Err(illegal("not enough fate"));
        }
        self.spend_fate(2, events);
        self.player.cheat_weapon_next_enemy_fight = true;
        Ok(())
    }

    pub(crate) fn use_spell_cleanse(
        &mut self,
        slot: usize,
        events: &mut EventBus,
    ) -> Result<(), EngineError> {
        self.ensure_phase(Phase::PreResolveWindow, "spell cleanse")?;
        self.open_slot_id(slot)?;
        self.consume_spell(events)?;
        self.room.pending_cleanses[slot] = true;
        Ok(())
    }

    pub(crate) fn use_spell_reroll(
        &mut self,
        slot: usize,
        events: &mut EventBus,
    ) -> Result<(), EngineError> {
        self.ensure_phase(Phase::PreResolveWindow, "spell reroll")?;
        self.open_slot_id(slot)?;
        self.consume_spell(events)?;
        self.reroll_slot(slot, events)
    }

    fn consume_spell(&mut self, events: &mut EventBus) -> Result<(), EngineError> {
        let spell = self
            .player
            .spell
            .take()
            .ok_or_else(|| illegal("no spell prepared"))?;
        self.floor.floor_discard.push(spell.card_id.clone());
        events.push(Event::DiscardEquipment {
            kind: EquipmentKind::Spell,
            card_id: spell.card_id,
        });
        Ok(())
    }

    pub(crate) fn use_major_gift(
        &mut self,
        major_id: &str,
        events: &mut EventBus,
    ) -> Result<(), EngineError> {
        self.ensure_phase(Phase::PreResolveWindow, "major gift")?;
        if !self.majors.attuned.iter().any(|id| id == major_id) {
            return Err(illegal("major is not attuned"));
        }
        if self.majors.spent_this_floor.iter().any(|id| id == major_id) {
            return Err(illegal("gift already spent this floor"));
        }
        self.majors.spent_this_floor.push(major_id.to_string());
        self.enqueue_gift(major_id)?;
        self.run_queue_and_advance(events)
    }

    /// Unresolved occupied slots, minus the chosen carry, narrowed by the
    /// floor's order constraint.
    pub(crate) fn allowed_commit_slots(&self) -> Vec<usize> {
        let mut allowed = self.room.open_slots();
        if let Some(carry) = self.room.carry_choice_index {
            allowed.retain(|&slot| slot != carry);
        }
        let constraint = &self.rules.order_constraint;
        if constraint.requires_choose_carried_first && self.room.carry_choice_index.is_none() {
            return Vec::new();
        }
        match constraint.kind {
            OrderConstraintKind::None => allowed,
            OrderConstraintKind::LeftToRight => allowed.into_iter().take(1).collect(),
            OrderConstraintKind::RightToLeft => allowed.into_iter().last().into_iter().collect(),
            OrderConstraintKind::SuitOrder => allowed
                .iter()
                .copied()
                .min_by_key(|&slot| (self.slot_card(slot).suit.lock_index(), slot))
                .into_iter()
                .collect(),
            OrderConstraintKind::AscOrderingValue => allowed
                .iter()
                .copied()
                .min_by_key(|&slot| {
                    (
                        ordering_value(self.slot_card(slot), self.slot_effective(slot)),
                        slot,
                    )
                })
                .into_iter()
                .collect(),
        }
    }

    pub(crate) fn commit_resolve(
        &mut self,
        slot: usize,
        events: &mut EventBus,
    ) -> Result<(), EngineError> {
        self.ensure_phase(Phase::PreResolveWindow, "commit")?;
        if !self.allowed_commit_slots().contains(&slot) {
            return Err(illegal("slot cannot be committed under the current order"));
        }
        let card_id = self.open_slot_id(slot)?;

        // Hanged-man style shadow: the first commit of the room exiles the
        // card instead of resolving it, once.
        let content = self.content.clone();
        let major = content.require_major(&self.floor.active_major_id)?;
        if major.shadow.trigger == ShadowTrigger::BeforeFirstResolveAttempt
            && matches!(major.shadow.effect, Effect::ForcedExileFirstResolveAttempt)
            && self.room.resolved_count() == 0
            && !self.room.hanged_man_triggered_this_room
        {
            self.room.hanged_man_triggered_this_room = true;
            return self.exile_replace_slot(slot, events);
        }

        let effective = self.slot_effective(slot);
        self.pending_resolution = Some(PendingResolution {
            slot,
            card_id,
            effective,
        });
        // ResolveCommit is passed through without an observable stop.
        self.phase = Phase::ResolveExecute;
        self.execute_resolution(events)
    }
}

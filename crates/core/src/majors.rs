//! Interpreter for Major shadow and gift effect trees.
//!
//! Effects are authored content, never code. Evaluation walks a queue of
//! nodes held on the run state; when a node needs a player decision it parks
//! a pending prompt and returns, and the answering action resumes the queue.

use crate::cards::Orientation;
use crate::content::{Effect, Predicate, Scope, Selector, ShadowTrigger};
use crate::error::EngineError;
use crate::events::{Event, EventBus};
use crate::rules::{ordering_value, OrderConstraint};
use crate::state::{ChariotDirection, PendingPrompt, RunState, TargetPrimitive};

enum SelectorOutcome {
    Chosen(usize),
    Park(Vec<usize>),
    Skip,
}

impl RunState {
    /// Queue the active Major's shadow effect if its trigger matches.
    pub(crate) fn enqueue_shadow(&mut self, trigger: ShadowTrigger) -> Result<(), EngineError> {
        let content = self.content.clone();
        let major = content.require_major(&self.floor.active_major_id)?;
        if major.shadow.trigger == trigger {
            self.effect_queue.push(major.shadow.effect.clone());
        }
        Ok(())
    }

    pub(crate) fn enqueue_gift(&mut self, major_id: &str) -> Result<(), EngineError> {
        let content = self.content.clone();
        let major = content.require_major(major_id)?;
        self.effect_queue.push(major.gift.effect.clone());
        Ok(())
    }

    /// Evaluate queued effect nodes until the queue drains, a prompt parks,
    /// or the run ends.
    pub(crate) fn run_effect_queue(&mut self, events: &mut EventBus) -> Result<(), EngineError> {
        while !self.effect_queue.is_empty() {
            if self.is_over() {
                self.effect_queue.clear();
                return Ok(());
            }
            let effect = self.effect_queue.remove(0);
            if self.eval_effect(effect, events)? {
                return Ok(());
            }
        }
        Ok(())
    }

    /// Returns true when the node parked a prompt.
    fn eval_effect(&mut self, effect: Effect, events: &mut EventBus) -> Result<bool, EngineError> {
        match effect {
            Effect::Noop | Effect::ForcedExileFirstResolveAttempt => Ok(false),
            Effect::Sequence { effects } => {
                let mut queue = effects;
                queue.append(&mut self.effect_queue);
                self.effect_queue = queue;
                Ok(false)
            }
            Effect::Choice {
                prompt_key,
                options,
            } => {
                self.pending_prompt = Some(PendingPrompt::MajorChoice {
                    prompt_key,
                    options,
                });
                Ok(true)
            }
            Effect::Conditional {
                predicate,
                then,
                otherwise,
            } => {
                let branch = if self.eval_predicate(&predicate) {
                    *then
                } else {
                    *otherwise
                };
                self.effect_queue.insert(0, branch);
                Ok(false)
            }
            Effect::RerollRevealed { selector } => {
                self.targeted(selector, TargetPrimitive::Reroll, events)
            }
            Effect::ExileReplaceRevealed { selector } => {
                self.targeted(selector, TargetPrimitive::ExileReplace, events)
            }
            Effect::CleanseRevealed { selector } => {
                self.targeted(selector, TargetPrimitive::Cleanse, events)
            }
            Effect::PeekTopN { n, can_reorder } => {
                let card_ids = self.peek_top(n);
                events.push(Event::PeekTopN {
                    n,
                    card_ids: card_ids.clone(),
                });
                if can_reorder && !card_ids.is_empty() {
                    self.pending_prompt = Some(PendingPrompt::ReorderTop3 { card_ids });
                    return Ok(true);
                }
                Ok(false)
            }
            Effect::ReorderTopN { n } => {
                let card_ids = self.peek_top(n);
                if card_ids.is_empty() {
                    return Ok(false);
                }
                self.pending_prompt = Some(PendingPrompt::ReorderTop3 { card_ids });
                Ok(true)
            }
            Effect::ReorderRoomByValue => {
                self.reorder_room_by_value();
                Ok(false)
            }
            Effect::ReorderRoomArbitrary => {
                self.pending_prompt = Some(PendingPrompt::ReorderRoom4);
                Ok(true)
            }
            Effect::Bargain {
                prompt_key,
                options,
            } => {
                self.pending_prompt = Some(PendingPrompt::MajorBargain {
                    prompt_key,
                    options,
                });
                Ok(true)
            }
            Effect::DisableFateAction { fate_action, scope } => {
                // Scope mismatches are authoring bugs the loader rejects;
                // ignore rather than corrupt the floor.
                if scope == Scope::ThisRoom && !self.room.fate_action_disabled(fate_action) {
                    self.room.disabled_fate_actions.push(fate_action);
                }
                Ok(false)
            }
            Effect::SetWeaponRestrictionMode { mode, scope } => {
                if scope == Scope::ThisFloor {
                    self.rules.weapon_restriction_mode = mode;
                }
                Ok(false)
            }
            Effect::SetOrderConstraint {
                order_constraint,
                requires_choose_carried_first,
                scope,
            } => {
                if scope == Scope::ThisFloor {
                    self.rules.order_constraint = OrderConstraint {
                        kind: order_constraint,
                        requires_choose_carried_first,
                        scope_major_id: Some(self.floor.active_major_id.clone()),
                    };
                }
                Ok(false)
            }
            Effect::SetFloorParam {
                param_key,
                param_value,
                scope,
            } => {
                if scope == Scope::ThisFloor {
                    match param_key.as_str() {
                        "cheatWeapon" => self.player.cheat_weapon_next_enemy_fight = true,
                        "chariotDirection" => {
                            self.floor.params.chariot_direction = match param_value.as_str() {
                                "LEFT_TO_RIGHT" => Some(ChariotDirection::LeftToRight),
                                "RIGHT_TO_LEFT" => Some(ChariotDirection::RightToLeft),
                                _ => None,
                            };
                        }
                        _ => {}
                    }
                }
                Ok(false)
            }
        }
    }

    fn eval_predicate(&self, predicate: &Predicate) -> bool {
        match predicate {
            Predicate::RoomHasEnemy => self
                .room
                .open_slots()
                .into_iter()
                .any(|slot| self.slot_card(slot).rank.is_court()),
            Predicate::RoomHasAnyEffectiveReversed => self
                .room
                .open_slots()
                .into_iter()
                .any(|slot| self.slot_effective(slot) == Orientation::Reversed),
            Predicate::PlayerGoldAtLeast { value } => self.player.gold >= *value,
        }
    }

    fn targeted(
        &mut self,
        selector: Selector,
        primitive: TargetPrimitive,
        events: &mut EventBus,
    ) -> Result<bool, EngineError> {
        let mut candidates = self.room.open_slots();
        if primitive == TargetPrimitive::Cleanse {
            candidates.retain(|&slot| self.slot_effective(slot) == Orientation::Reversed);
        }
        match self.resolve_selector(selector, candidates) {
            SelectorOutcome::Skip => Ok(false),
            SelectorOutcome::Chosen(slot) => {
                self.apply_target_primitive(primitive, slot, events)?;
                Ok(false)
            }
            SelectorOutcome::Park(candidates) => {
                self.pending_prompt = Some(PendingPrompt::SelectTarget {
                    primitive,
                    candidates,
                });
                Ok(true)
            }
        }
    }

    pub(crate) fn apply_target_primitive(
        &mut self,
        primitive: TargetPrimitive,
        slot: usize,
        events: &mut EventBus,
    ) -> Result<(), EngineError> {
        match primitive {
            TargetPrimitive::Reroll => self.reroll_slot(slot, events),
            TargetPrimitive::ExileReplace => self.exile_replace_slot(slot, events),
            TargetPrimitive::Cleanse => {
                self.room.pending_cleanses[slot] = true;
                Ok(())
            }
        }
    }

    fn resolve_selector(&mut self, selector: Selector, candidates: Vec<usize>) -> SelectorOutcome {
        if candidates.is_empty() {
            return SelectorOutcome::Skip;
        }
        match selector {
            Selector::PlayerChoice => SelectorOutcome::Park(candidates),
            Selector::Random => {
                let pick = self.rng.next_index(candidates.len());
                SelectorOutcome::Chosen(candidates[pick])
            }
            Selector::Leftmost => SelectorOutcome::Chosen(candidates[0]),
            Selector::HighestValue => {
                let value_of = |slot: usize| {
                    ordering_value(self.slot_card(slot), self.slot_effective(slot))
                };
                let best = candidates.iter().map(|&s| value_of(s)).max().unwrap_or(0);
                let tied: Vec<usize> = candidates
                    .into_iter()
                    .filter(|&s| value_of(s) == best)
                    .collect();
                if tied.len() == 1 {
                    SelectorOutcome::Chosen(tied[0])
                } else {
                    SelectorOutcome::Park(tied)
                }
            }
            Selector::IfEnemyPresentPlayerChoice => {
                let enemies: Vec<usize> = candidates
                    .into_iter()
                    .filter(|&slot| self.slot_card(slot).rank.is_court())
                    .collect();
                if enemies.is_empty() {
                    SelectorOutcome::Skip
                } else {
                    SelectorOutcome::Park(enemies)
                }
            }
            Selector::IfAnyReversedPlayerChoice => {
                let reversed: Vec<usize> = candidates
                    .into_iter()
                    .filter(|&slot| self.slot_effective(slot) == Orientation::Reversed)
                    .collect();
                if reversed.is_empty() {
                    SelectorOutcome::Skip
                } else {
                    SelectorOutcome::Park(reversed)
                }
            }
        }
    }

    fn peek_top(&self, n: usize) -> Vec<String> {
        let deck = self.active_deck();
        deck.iter().take(n.min(deck.len())).cloned().collect()
    }

    /// Stable ascending sort by ordering value; empty slots sink to the end.
    /// Carried markers follow the cards they referred to.
    pub(crate) fn reorder_room_by_value(&mut self) {
        let mut order: Vec<usize> = (0..self.room.slots.len()).collect();
        order.sort_by_key(|&slot| {
            let key = match &self.room.slots[slot] {
                Some(_) if !self.room.resolved_mask[slot] => {
                    ordering_value(self.slot_card(slot), self.slot_effective(slot))
                }
                _ => u32::MAX,
            };
            (key, slot)
        });
        self.apply_room_permutation(&order);
    }

    /// New position `k` receives the contents of old position `order[k]`.
    pub(crate) fn apply_room_permutation(&mut self, order: &[usize]) {
        let old_slots = self.room.slots.clone();
        let old_mask = self.room.resolved_mask;
        let old_cleanses = self.room.pending_cleanses;
        for (k, &from) in order.iter().enumerate() {
            self.room.slots[k] = old_slots[from].clone();
            self.room.resolved_mask[k] = old_mask[from];
            self.room.pending_cleanses[k] = old_cleanses[from];
        }
        let remap = |old: Option<usize>| {
            old.and_then(|from| order.iter().position(|&source| source == from))
        };
        self.room.carried_index = remap(self.room.carried_index);
        self.room.carry_choice_index = remap(self.room.carry_choice_index);
    }
}

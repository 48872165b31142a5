use crate::actions::{Action, CupsBigChoice, FightChoice};
use crate::content::BargainOption;
use crate::error::{illegal, EngineError};
use crate::events::EventBus;
use crate::state::{PendingPrompt, RunState};

impl RunState {
    /// Route an action into the parked prompt. Wrong-kind actions are a
    /// PromptMismatch; matching actions with bad payloads are illegal.
    pub(crate) fn answer_prompt(
        &mut self,
        action: &Action,
        events: &mut EventBus,
    ) -> Result<(), EngineError> {
        let Some(prompt) = self.pending_prompt.take() else {
            return Err(EngineError::PromptMismatch);
        };
        match (prompt, action) {
            (PendingPrompt::AceResolution { options, .. }, Action::ResolveAce { option }) => {
                if !options.contains(option) {
                    return Err(illegal("ace option was not offered"));
                }
                self.apply_ace_option(option, events)?;
                self.complete_resolution(true, events)
            }
            (
                PendingPrompt::EnemyFightChoice {
                    card_id,
                    enemy_value,
                    ..
                },
                Action::ResolveEnemyFight { choice },
            ) => match choice {
                FightChoice::Barehand => {
                    self.apply_damage(enemy_value as i32, false, events);
                    self.complete_resolution(true, events)
                }
                FightChoice::Weapon => {
                    let weapon = self
                        .player
                        .weapon
                        .as_mut()
                        .ok_or_else(|| illegal("no weapon equipped"))?;
                    let damage = enemy_value.saturating_sub(weapon.value);
                    weapon.last_helped_defeat_value = Some(enemy_value);
                    weapon.tucked_enemy_ids.push(card_id);
                    self.player.cheat_weapon_next_enemy_fight = false;
                    self.player.cheat_weapon_this_room = false;
                    self.apply_damage(damage as i32, false, events);
                    self.complete_resolution(false, events)
                }
            },
            (PendingPrompt::AmbushBlock { value, .. }, Action::ResolveAmbush { block }) => {
                let damage = if *block {
                    let weapon_value =
                        self.player.weapon.as_ref().map(|w| w.value).unwrap_or(0);
                    value.saturating_sub(weapon_value)
                } else {
                    value
                };
                self.apply_damage(damage as i32, false, events);
                self.complete_resolution(true, events)
            }
            (
                PendingPrompt::CupsChoice { card_id, value, .. },
                Action::ResolveCupsChoice { choice },
            ) => match choice {
                CupsBigChoice::Heal => {
                    self.apply_heal(value as i32, events);
                    self.complete_resolution(true, events)
                }
                CupsBigChoice::EquipArmor => {
                    self.equip_armor_from_resolution(card_id, value, events);
                    self.complete_resolution(false, events)
                }
            },
            (PendingPrompt::MajorChoice { options, .. }, Action::AnswerChoice { index }) => {
                let option = options
                    .get(*index)
                    .ok_or_else(|| illegal("choice index out of range"))?;
                self.effect_queue.insert(0, option.effect.clone());
                self.run_queue_and_advance(events)
            }
            (PendingPrompt::MajorBargain { options, .. }, Action::AnswerBargain { index }) => {
                let option = options
                    .get(*index)
                    .ok_or_else(|| illegal("bargain index out of range"))?
                    .clone();
                self.apply_bargain_option(&option, events)?;
                self.run_queue_and_advance(events)
            }
            (
                PendingPrompt::SelectTarget {
                    primitive,
                    candidates,
                },
                Action::SelectTarget { slot },
            ) => {
                if !candidates.contains(slot) {
                    return Err(illegal("target slot is not a candidate"));
                }
                self.apply_target_primitive(primitive, *slot, events)?;
                self.run_queue_and_advance(events)
            }
            (PendingPrompt::ReorderTop3 { card_ids }, Action::ReorderTop { order }) => {
                ensure_permutation(order, card_ids.len())?;
                let deck = self.active_deck_mut();
                for (position, &source) in order.iter().enumerate() {
                    deck[position] = card_ids[source].clone();
                }
                self.run_queue_and_advance(events)
            }
            (PendingPrompt::ReorderRoom4, Action::ReorderRoom { order }) => {
                ensure_permutation(order, self.room.slots.len())?;
                self.apply_room_permutation(order);
                self.run_queue_and_advance(events)
            }
            (prompt, _) => {
                self.pending_prompt = Some(prompt);
                Err(EngineError::PromptMismatch)
            }
        }
    }

    /// Pay or bleed first, then heal, then gold, per the bargain contract.
    pub(crate) fn apply_bargain_option(
        &mut self,
        option: &BargainOption,
        events: &mut EventBus,
    ) -> Result<(), EngineError> {
        if let Some(pay) = option.pay_gold {
            if self.player.gold < pay {
                return Err(illegal("cannot afford this bargain"));
            }
            self.lose_gold(pay, events);
        }
        if let Some(damage) = option.take_damage {
            self.apply_damage(damage, false, events);
        }
        if let Some(heal) = option.heal {
            self.apply_heal(heal, events);
        }
        if let Some(gain) = option.gain_gold {
            self.gain_gold(gain, events);
        }
        Ok(())
    }
}

fn ensure_permutation(order: &[usize], len: usize) -> Result<(), EngineError> {
    if order.len() != len {
        return Err(illegal("reorder length mismatch"));
    }
    let mut seen = vec![false; len];
    for &index in order {
        if index >= len || seen[index] {
            return Err(illegal("reorder is not a permutation"));
        }
        seen[index] = true;
    }
    Ok(())
}

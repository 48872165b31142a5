use crate::actions::AceOption;
use crate::cards::{Card, Orientation, Rank, Suit};
use crate::content::ShadowTrigger;
use crate::error::{illegal, EngineError};
use crate::events::{Event, EventBus, EquipmentKind};
use crate::rules::enemy_value;
use crate::state::{
    PendingPrompt, PendingResolution, Phase, RunState, SpellSlot, WeaponSlot,
};

impl RunState {
    /// Attempt no-choice resolution of the committed card. Suits that need a
    /// decision park a prompt instead.
    pub(crate) fn execute_resolution(&mut self, events: &mut EventBus) -> Result<(), EngineError> {
        let Some(pending) = self.pending_resolution.clone() else {
            return Err(illegal("nothing committed to resolve"));
        };
        let card = *self.card(&pending.card_id);
        if card.rank == Rank::Ace {
            return self.resolve_ace_start(&pending, card, events);
        }
        if card.rank.is_court() {
            return self.resolve_enemy_start(&pending, card, events);
        }
        self.resolve_numbered(&pending, card, events)
    }

    fn resolve_numbered(
        &mut self,
        pending: &PendingResolution,
        card: Card,
        events: &mut EventBus,
    ) -> Result<(), EngineError> {
        let value = card.rank.numeric_value().unwrap_or(0) as i32;
        let reversed = pending.effective == Orientation::Reversed;
        match card.suit {
            Suit::Pentacles => {
                if reversed {
                    let lost = self.player.gold.min(value);
                    self.lose_gold(lost, events);
                    self.apply_damage(value - lost, false, events);
                } else {
                    self.gain_gold(value, events);
                }
                self.complete_resolution(true, events)
            }
            Suit::Cups => {
                if reversed {
                    // Corrupted cups bite straight through armor.
                    self.apply_damage(value, true, events);
                    return self.complete_resolution(true, events);
                }
                if value >= 8 {
                    self.pending_prompt = Some(PendingPrompt::CupsChoice {
                        slot: pending.slot,
                        card_id: pending.card_id.clone(),
                        value: value as u32,
                    });
                    return Ok(());
                }
                self.apply_heal(value, events);
                self.complete_resolution(true, events)
            }
            Suit::Wands => {
                if reversed {
                    if let Some(spell) = self.player.spell.take() {
                        self.floor.floor_discard.push(spell.card_id.clone());
                        events.push(Event::DiscardEquipment {
                            kind: EquipmentKind::Spell,
                            card_id: spell.card_id,
                        });
                    } else {
                        self.apply_damage(2, false, events);
                    }
                    return self.complete_resolution(true, events);
                }
                self.equip_spell(pending.card_id.clone(), value as u32, events);
                self.complete_resolution(false, events)
            }
            Suit::Swords => {
                if reversed {
                    if self.player.weapon.is_some() {
                        self.pending_prompt = Some(PendingPrompt::AmbushBlock {
                            slot: pending.slot,
                            card_id: pending.card_id.clone(),
                            value: value as u32,
                        });
                        return Ok(());
                    }
                    self.apply_damage(value, false, events);
                    return self.complete_resolution(true, events);
                }
                self.equip_weapon(pending.card_id.clone(), value as u32, events);
                self.complete_resolution(false, events)
            }
        }
    }

    fn resolve_enemy_start(
        &mut self,
        pending: &PendingResolution,
        card: Card,
        events: &mut EventBus,
    ) -> Result<(), EngineError> {
        let value = enemy_value(&card, pending.effective);
        if self.player.weapon.is_some() && self.can_use_weapon(value) {
            self.pending_prompt = Some(PendingPrompt::EnemyFightChoice {
                slot: pending.slot,
                card_id: pending.card_id.clone(),
                enemy_value: value,
            });
            return Ok(());
        }
        self.apply_damage(value as i32, false, events);
        self.complete_resolution(true, events)
    }

    fn resolve_ace_start(
        &mut self,
        pending: &PendingResolution,
        card: Card,
        events: &mut EventBus,
    ) -> Result<(), EngineError> {
        let options = self.ace_options(pending.slot, card.suit);
        if options.is_empty() {
            // No eligible targets anywhere; the ace fizzles.
            return self.complete_resolution(true, events);
        }
        self.pending_prompt = Some(PendingPrompt::AceResolution {
            slot: pending.slot,
            card_id: pending.card_id.clone(),
            options,
        });
        Ok(())
    }

    /// Offer order is part of the legal-action contract.
    fn ace_options(&self, slot: usize, suit: Suit) -> Vec<AceOption> {
        let others: Vec<usize> = self
            .room
            .open_slots()
            .into_iter()
            .filter(|&other| other != slot)
            .collect();
        match suit {
            Suit::Pentacles => {
                let mut options = Vec::new();
                if self.player.gold >= 5 {
                    options.push(AceOption::Pay5Heal5);
                }
                options.push(AceOption::Gain5Take3);
                options
            }
            Suit::Cups => {
                let mut options = vec![AceOption::HealToFull];
                for &other in &others {
                    if self.slot_effective(other) == Orientation::Reversed {
                        options.push(AceOption::CleanseFree { slot: other });
                    }
                }
                options
            }
            Suit::Wands => others
                .iter()
                .flat_map(|&other| {
                    [
                        AceOption::ExileReplaceFree { slot: other },
                        AceOption::RerollFree { slot: other },
                    ]
                })
                .collect(),
            Suit::Swords => {
                let mut options = vec![AceOption::CheatWeaponFree];
                for &other in &others {
                    options.push(AceOption::RerollFree { slot: other });
                }
                options
            }
        }
    }

    pub(crate) fn apply_ace_option(
        &mut self,
        option: &AceOption,
        events: &mut EventBus,
    ) -> Result<(), EngineError> {
        match option {
            AceOption::Pay5Heal5 => {
                if self.player.gold < 5 {
                    return Err(illegal("cannot afford the ace bargain"));
                }
                self.lose_gold(5, events);
                self.apply_heal(5, events);
            }
            AceOption::Gain5Take3 => {
                self.gain_gold(5, events);
                self.apply_damage(3, false, events);
            }
            AceOption::HealToFull => {
                let missing = self.player.max_hp - self.player.hp;
                self.apply_heal(missing, events);
            }
            AceOption::CleanseFree { slot } => {
                self.open_slot_id(*slot)?;
                self.room.pending_cleanses[*slot] = true;
            }
            AceOption::ExileReplaceFree { slot } => self.exile_replace_slot(*slot, events)?,
            AceOption::RerollFree { slot } => self.reroll_slot(*slot, events)?,
            AceOption::CheatWeaponFree => self.player.cheat_weapon_this_room = true,
        }
        Ok(())
    }

    fn equip_spell(&mut self, card_id: String, value: u32, events: &mut EventBus) {
        // An already-prepared spell is replaced silently.
        if let Some(old) = self.player.spell.take() {
            self.floor.floor_discard.push(old.card_id);
        }
        events.push(Event::EquipSpell {
            card_id: card_id.clone(),
            value,
        });
        self.player.spell = Some(SpellSlot { card_id, value });
    }

    fn equip_weapon(&mut self, card_id: String, value: u32, events: &mut EventBus) {
        if let Some(old) = self.player.weapon.take() {
            events.push(Event::DiscardEquipment {
                kind: EquipmentKind::Weapon,
                card_id: old.card_id.clone(),
            });
            self.floor.floor_discard.push(old.card_id);
            // Enemies tucked under the old weapon leave with it.
            self.floor.floor_discard.extend(old.tucked_enemy_ids);
        }
        events.push(Event::EquipWeapon {
            card_id: card_id.clone(),
            value,
        });
        self.player.weapon = Some(WeaponSlot {
            card_id,
            value,
            last_helped_defeat_value: None,
            tucked_enemy_ids: Vec::new(),
        });
    }

    pub(crate) fn equip_armor_from_resolution(
        &mut self,
        card_id: String,
        value: u32,
        events: &mut EventBus,
    ) {
        if let Some(old) = self.player.armor.take() {
            events.push(Event::DiscardEquipment {
                kind: EquipmentKind::Armor,
                card_id: old.card_id.clone(),
            });
            self.floor.floor_discard.push(old.card_id);
        }
        events.push(Event::EquipArmor {
            card_id: card_id.clone(),
            value,
        });
        self.player.armor = Some(crate::state::ArmorSlot { card_id, value });
    }

    /// Shared tail of every resolution: mark, clear, discard, emit, grant
    /// Fate, then either die, fire the first-resolution shadow, or move on.
    pub(crate) fn complete_resolution(
        &mut self,
        discard_to_floor: bool,
        events: &mut EventBus,
    ) -> Result<(), EngineError> {
        let Some(pending) = self.pending_resolution.take() else {
            return Err(illegal("no resolution to complete"));
        };
        self.room.resolved_mask[pending.slot] = true;
        self.room.slots[pending.slot] = None;
        self.room.pending_cleanses[pending.slot] = false;
        if discard_to_floor {
            self.floor.floor_discard.push(pending.card_id.clone());
        }
        events.push(Event::CardResolved {
            card_id: pending.card_id,
            slot_index: pending.slot,
        });
        if pending.effective == Orientation::Reversed {
            self.gain_fate(1, events);
        }
        if self.is_over() {
            return Ok(());
        }
        if self.room.resolved_count() == 1 {
            self.enqueue_shadow(ShadowTrigger::AfterFirstResolution)?;
            self.run_effect_queue(events)?;
            if self.pending_prompt.is_some() {
                return Ok(());
            }
        }
        self.finish_resolution_step(events)
    }

    pub(crate) fn finish_resolution_step(
        &mut self,
        events: &mut EventBus,
    ) -> Result<(), EngineError> {
        if self.is_over() {
            return Ok(());
        }
        if self.room.resolved_count() >= 3 {
            self.room_end(events)
        } else {
            self.phase = Phase::PreResolveWindow;
            Ok(())
        }
    }
}

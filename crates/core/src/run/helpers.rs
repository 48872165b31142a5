use crate::cards::{Card, Orientation};
use crate::error::{illegal, EngineError};
use crate::events::{Event, EventBus};
use crate::rules::{effective_orientation, WeaponRestrictionMode};
use crate::state::{Phase, RunState, FATE_CAP, GOLD_CAP, ROOM_SLOTS};

impl RunState {
    pub(crate) fn slot_card(&self, slot: usize) -> &Card {
        let id = self.room.slots[slot].as_deref().unwrap_or("");
        &self.cards[id]
    }

    pub(crate) fn slot_effective(&self, slot: usize) -> Orientation {
        effective_orientation(
            self.slot_card(slot),
            self.floor.boss_mode,
            self.room.pending_cleanses[slot],
        )
    }

    /// Validated clone of the card id in an occupied, unresolved slot.
    pub(crate) fn open_slot_id(&self, slot: usize) -> Result<String, EngineError> {
        if slot >= ROOM_SLOTS {
            return Err(illegal("slot index out of range"));
        }
        match &self.room.slots[slot] {
            Some(id) if !self.room.resolved_mask[slot] => Ok(id.clone()),
            _ => Err(illegal("slot is empty or already resolved")),
        }
    }

    pub(crate) fn active_deck(&self) -> &[String] {
        match &self.floor.boss_deck {
            Some(deck) if self.floor.boss_mode => deck,
            _ => &self.minor_deck,
        }
    }

    pub(crate) fn active_deck_mut(&mut self) -> &mut Vec<String> {
        match self.floor.boss_deck {
            Some(ref mut deck) if self.floor.boss_mode => deck,
            _ => &mut self.minor_deck,
        }
    }

    /// Index 0 is the top of every deck.
    pub(crate) fn draw_active(&mut self) -> Result<String, EngineError> {
        let deck = self.active_deck_mut();
        if deck.is_empty() {
            return Err(EngineError::DeckExhausted);
        }
        Ok(deck.remove(0))
    }

    pub(crate) fn draw_into_slot(&mut self, slot: usize) -> Result<(), EngineError> {
        let card = self.draw_active()?;
        self.room.slots[slot] = Some(card);
        self.room.pending_cleanses[slot] = false;
        Ok(())
    }

    /// Bottom the slot's card and draw a replacement into the same slot.
    pub(crate) fn reroll_slot(
        &mut self,
        slot: usize,
        events: &mut EventBus,
    ) -> Result<(), EngineError> {
        let id = self.open_slot_id(slot)?;
        self.room.slots[slot] = None;
        events.push(Event::CardBottomed {
            card_id: id.clone(),
        });
        self.active_deck_mut().push(id);
        self.draw_into_slot(slot)
    }

    /// Exile the slot's card to floor discard and draw a replacement.
    pub(crate) fn exile_replace_slot(
        &mut self,
        slot: usize,
        events: &mut EventBus,
    ) -> Result<(), EngineError> {
        let id = self.open_slot_id(slot)?;
        self.room.slots[slot] = None;
        events.push(Event::CardExiled {
            card_id: id.clone(),
        });
        self.floor.floor_discard.push(id);
        self.draw_into_slot(slot)
    }

    pub(crate) fn gain_gold(&mut self, amount: i32, events: &mut EventBus) {
        let next = (self.player.gold + amount.max(0)).min(GOLD_CAP);
        let delta = next - self.player.gold;
        if delta != 0 {
            self.player.gold = next;
            events.push(Event::PlayerGoldChanged { delta, gold: next });
        }
    }

    pub(crate) fn lose_gold(&mut self, amount: i32, events: &mut EventBus) {
        let next = (self.player.gold - amount.max(0)).max(0);
        let delta = next - self.player.gold;
        if delta != 0 {
            self.player.gold = next;
            events.push(Event::PlayerGoldChanged { delta, gold: next });
        }
    }

    pub(crate) fn gain_fate(&mut self, amount: u8, events: &mut EventBus) {
        let next = (self.player.fate + amount).min(FATE_CAP);
        let delta = i32::from(next) - i32::from(self.player.fate);
        if delta != 0 {
            self.player.fate = next;
            events.push(Event::PlayerFateChanged { delta, fate: next });
        }
    }

    /// Callers have already checked the balance.
    pub(crate) fn spend_fate(&mut self, amount: u8, events: &mut EventBus) {
        let next = self.player.fate.saturating_sub(amount);
        let delta = i32::from(next) - i32::from(self.player.fate);
        if delta != 0 {
            self.player.fate = next;
            events.push(Event::PlayerFateChanged { delta, fate: next });
        }
    }

    /// Armor soaks the hit and is consumed; reversed-cups damage bypasses it.
    /// Reaching 0 hp ends the run.
    pub(crate) fn apply_damage(&mut self, amount: i32, bypass_armor: bool, events: &mut EventBus) {
        if amount <= 0 {
            return;
        }
        let mut damage = amount;
        if !bypass_armor {
            if let Some(armor) = self.player.armor.take() {
                damage = (amount - armor.value as i32).max(0);
                if armor.value > 0 {
                    self.floor.floor_discard.push(armor.card_id.clone());
                    events.push(Event::DiscardEquipment {
                        kind: crate::events::EquipmentKind::Armor,
                        card_id: armor.card_id,
                    });
                } else {
                    self.player.armor = Some(armor);
                }
            }
        }
        if damage == 0 {
            return;
        }
        let next = (self.player.hp - damage).max(0);
        let delta = next - self.player.hp;
        if delta != 0 {
            self.player.hp = next;
            events.push(Event::PlayerHpChanged { delta, hp: next });
        }
        if next == 0 {
            self.phase = Phase::RunDefeat;
        }
    }

    /// One heal per room, whatever the source. Only an actual hp gain
    /// consumes the allowance.
    pub(crate) fn apply_heal(&mut self, amount: i32, events: &mut EventBus) {
        if self.is_over() || self.room.healing_used_this_room || amount <= 0 {
            return;
        }
        let delta = amount.min(self.player.max_hp - self.player.hp);
        if delta > 0 {
            self.player.hp += delta;
            events.push(Event::PlayerHpChanged {
                delta,
                hp: self.player.hp,
            });
            self.room.healing_used_this_room = true;
        }
    }

    pub(crate) fn can_use_weapon(&self, enemy_value: u32) -> bool {
        if self.player.cheat_weapon_next_enemy_fight || self.player.cheat_weapon_this_room {
            return true;
        }
        let Some(weapon) = &self.player.weapon else {
            return false;
        };
        match weapon.last_helped_defeat_value {
            None => true,
            Some(last) => match self.rules.weapon_restriction_mode {
                WeaponRestrictionMode::Strict => enemy_value < last,
                WeaponRestrictionMode::Default => enemy_value <= last,
            },
        }
    }

    pub(crate) fn ensure_phase(&self, phase: Phase, what: &str) -> Result<(), EngineError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(illegal(format!("{what} is not available in this phase")))
        }
    }
}

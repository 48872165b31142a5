use crate::content::ShadowTrigger;
use crate::error::{illegal, EngineError};
use crate::events::{Event, EventBus};
use crate::state::{Phase, RoomState, RunState, ENGAGED_ROOMS_PER_FLOOR, ROOM_SLOTS};

fn boss_rooms_required_for(floor_number: u32) -> u32 {
    match floor_number {
        1..=7 => 2,
        8..=14 => 3,
        _ => 4,
    }
}

impl RunState {
    /// Open a new room: the carried card (if any) lands in slot 0, the rest
    /// fills from the active deck, then the ROOM_REVEALED shadow fires.
    pub(crate) fn start_room(
        &mut self,
        carried: Option<String>,
        events: &mut EventBus,
    ) -> Result<(), EngineError> {
        self.phase = Phase::RoomReveal;
        let mut room = RoomState::empty();
        if let Some(card) = carried {
            room.slots[0] = Some(card);
            room.carried_index = Some(0);
        }
        self.room = room;
        self.player.cheat_weapon_this_room = false;
        for slot in 0..ROOM_SLOTS {
            if self.room.slots[slot].is_none() {
                self.draw_into_slot(slot)?;
            }
        }
        events.push(Event::RoomRevealed {
            slots: self.room.slots.clone(),
        });
        self.enqueue_shadow(ShadowTrigger::RoomRevealed)?;
        self.run_queue_and_advance(events)
    }

    pub(crate) fn choose_engage(&mut self) -> Result<(), EngineError> {
        self.ensure_phase(Phase::RoomChoice, "engage")?;
        self.last_room_was_flee = false;
        if self.rules.order_constraint.requires_choose_carried_first {
            self.phase = Phase::EngageSetup;
        } else {
            self.phase = Phase::PreResolveWindow;
        }
        Ok(())
    }

    /// Bottom all four slots left to right and reveal a fresh room. Illegal
    /// twice in a row.
    pub(crate) fn choose_flee(&mut self, events: &mut EventBus) -> Result<(), EngineError> {
        self.ensure_phase(Phase::RoomChoice, "flee")?;
        if self.last_room_was_flee {
            return Err(illegal("cannot flee twice in a row"));
        }
        for slot in 0..ROOM_SLOTS {
            if let Some(card_id) = self.room.slots[slot].take() {
                events.push(Event::CardBottomed {
                    card_id: card_id.clone(),
                });
                self.active_deck_mut().push(card_id);
            }
        }
        self.last_room_was_flee = true;
        self.start_room(None, events)
    }

    pub(crate) fn select_carried_card(&mut self, slot: usize) -> Result<(), EngineError> {
        self.ensure_phase(Phase::EngageSetup, "carry choice")?;
        self.open_slot_id(slot)?;
        self.room.carry_choice_index = Some(slot);
        self.phase = Phase::PreResolveWindow;
        Ok(())
    }

    /// Third resolution done: count the room, then advance the floor, enter
    /// boss mode, or carry the leftover card into the next room.
    pub(crate) fn room_end(&mut self, events: &mut EventBus) -> Result<(), EngineError> {
        self.phase = Phase::RoomEnd;
        if self.floor.boss_mode {
            self.floor.boss_rooms_completed += 1;
        } else {
            self.floor.engaged_rooms_completed += 1;
        }

        if self.floor.boss_mode
            && self.floor.boss_rooms_completed >= self.floor.boss_rooms_required
        {
            let defeated = self.floor.active_major_id.clone();
            if !self.majors.claimed.contains(&defeated) {
                self.majors.claimed.push(defeated.clone());
            }
            if !self.majors.spent_this_floor.contains(&defeated) {
                self.majors.spent_this_floor.push(defeated);
            }
            if self.majors.claimed.len() >= usize::from(self.run_length_target) {
                self.phase = Phase::RunVictory;
                return Ok(());
            }
            return self.enter_floor_start(self.floor.floor_number + 1);
        }

        if !self.floor.boss_mode
            && self.floor.engaged_rooms_completed >= ENGAGED_ROOMS_PER_FLOOR
        {
            self.floor.boss_mode = true;
            self.floor.boss_rooms_required = boss_rooms_required_for(self.floor.floor_number);
            self.floor.boss_rooms_completed = 0;
            let mut deck = std::mem::take(&mut self.floor.floor_discard);
            self.rng.shuffle(&mut deck);
            self.floor.boss_deck = Some(deck);
        }

        let carried = self
            .room
            .open_slots()
            .first()
            .and_then(|&slot| self.room.slots[slot].clone());
        self.start_room(carried, events)
    }
}

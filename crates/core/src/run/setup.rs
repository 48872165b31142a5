use crate::cards::{card_id, registry_order, Card, Orientation};
use crate::content::{ContentBundle, ShadowTrigger};
use crate::error::{illegal, EngineError};
use crate::events::EventBus;
use crate::rng::RngState;
use crate::rules::RulesState;
use crate::state::{
    FloorParams, FloorState, MajorsProgress, Phase, PlayerState, RoomState, RunState,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

impl RunState {
    /// Build a fresh run. RNG consumption order is locked: one draw per card
    /// in registry order for orientations, then the Major shuffle, then the
    /// first floor's minor-deck shuffle.
    pub fn create(
        content: Arc<ContentBundle>,
        seed: u32,
        run_length_target: u8,
    ) -> Result<Self, EngineError> {
        if !matches!(run_length_target, 7 | 14 | 21) {
            return Err(illegal("run_length_target must be 7, 14, or 21"));
        }
        let mut rng = RngState::from_seed(seed);
        let mut cards = BTreeMap::new();
        for (suit, rank) in registry_order() {
            let orientation = if rng.next_u32() & 1 == 1 {
                Orientation::Reversed
            } else {
                Orientation::Upright
            };
            cards.insert(
                card_id(suit, rank),
                Card {
                    suit,
                    rank,
                    orientation,
                },
            );
        }
        let mut major_deck: Vec<String> =
            content.majors.iter().map(|major| major.id.clone()).collect();
        rng.shuffle(&mut major_deck);

        let mut state = Self {
            content,
            seed,
            run_length_target,
            rng,
            phase: Phase::RunInit,
            cards,
            minor_deck: Vec::new(),
            major_deck,
            player: PlayerState::new(),
            floor: FloorState {
                floor_number: 0,
                active_major_id: String::new(),
                engaged_rooms_completed: 0,
                floor_discard: Vec::new(),
                boss_mode: false,
                boss_rooms_required: 0,
                boss_rooms_completed: 0,
                boss_deck: None,
                params: FloorParams::default(),
            },
            room: RoomState::empty(),
            majors: MajorsProgress::default(),
            rules: RulesState::default(),
            last_room_was_flee: false,
            pending_prompt: None,
            pending_resolution: None,
            effect_queue: Vec::new(),
        };
        state.enter_floor_start(1)?;
        Ok(state)
    }

    /// Reset floor-scoped state, pop the next Major, rebuild and shuffle the
    /// minor deck from every card not currently equipped.
    pub(crate) fn enter_floor_start(&mut self, floor_number: u32) -> Result<(), EngineError> {
        if self.major_deck.is_empty() {
            return Err(EngineError::DeckExhausted);
        }
        let active_major_id = self.major_deck.remove(0);
        self.floor = FloorState {
            floor_number,
            active_major_id,
            engaged_rooms_completed: 0,
            floor_discard: Vec::new(),
            boss_mode: false,
            boss_rooms_required: 0,
            boss_rooms_completed: 0,
            boss_deck: None,
            params: FloorParams::default(),
        };
        // Tucked enemies come back into the pool with the rebuild.
        if let Some(weapon) = self.player.weapon.as_mut() {
            weapon.tucked_enemy_ids.clear();
        }
        let equipped: BTreeSet<String> = [
            self.player.weapon.as_ref().map(|w| w.card_id.clone()),
            self.player.armor.as_ref().map(|a| a.card_id.clone()),
            self.player.spell.as_ref().map(|s| s.card_id.clone()),
        ]
        .into_iter()
        .flatten()
        .collect();
        let mut deck: Vec<String> = registry_order()
            .map(|(suit, rank)| card_id(suit, rank))
            .filter(|id| !equipped.contains(id))
            .collect();
        self.rng.shuffle(&mut deck);
        self.minor_deck = deck;

        self.room = RoomState::empty();
        self.rules = RulesState::default();
        self.majors.attuned.clear();
        self.majors.spent_this_floor.clear();
        self.last_room_was_flee = false;
        self.phase = Phase::FloorStart;
        Ok(())
    }

    /// Lock in up to three claimed Majors for this floor, then fire the
    /// FLOOR_START and ORDER_CONSTRAINT shadows and reveal the first room.
    pub(crate) fn select_attunement(
        &mut self,
        major_ids: &[String],
        events: &mut EventBus,
    ) -> Result<(), EngineError> {
        self.ensure_phase(Phase::FloorStart, "attunement")?;
        if major_ids.len() > 3 {
            return Err(illegal("attunement is capped at 3 majors"));
        }
        let mut seen = BTreeSet::new();
        for id in major_ids {
            if !self.majors.claimed.contains(id) {
                return Err(illegal(format!("major {id} is not claimed")));
            }
            if !seen.insert(id) {
                return Err(illegal(format!("major {id} attuned twice")));
            }
        }
        // Canonical order follows the claim order, not the request order.
        self.majors.attuned = self
            .majors
            .claimed
            .iter()
            .filter(|id| major_ids.contains(id))
            .cloned()
            .collect();
        self.enqueue_shadow(ShadowTrigger::FloorStart)?;
        self.enqueue_shadow(ShadowTrigger::OrderConstraint)?;
        self.run_queue_and_advance(events)
    }
}

use crate::actions::AceOption;
use crate::cards::{card_id, registry_order, Card, MINOR_COUNT};
use crate::content::{BargainOption, ChoiceOption, ContentBundle, FateAction};
use crate::rng::RngState;
use crate::rules::RulesState;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

pub const FATE_CAP: u8 = 10;
pub const GOLD_CAP: i32 = 9999;
pub const STARTING_MAX_HP: i32 = 20;
pub const ROOM_SLOTS: usize = 4;
pub const ENGAGED_ROOMS_PER_FLOOR: u32 = 6;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Phase {
    RunInit,
    FloorStart,
    RoomReveal,
    RoomChoice,
    EngageSetup,
    PreResolveWindow,
    ResolveCommit,
    ResolveExecute,
    RoomEnd,
    RunVictory,
    RunDefeat,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeaponSlot {
    pub card_id: String,
    pub value: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_helped_defeat_value: Option<u32>,
    #[serde(default)]
    pub tucked_enemy_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArmorSlot {
    pub card_id: String,
    pub value: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpellSlot {
    pub card_id: String,
    pub value: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerState {
    pub hp: i32,
    pub max_hp: i32,
    pub gold: i32,
    pub fate: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weapon: Option<WeaponSlot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub armor: Option<ArmorSlot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spell: Option<SpellSlot>,
    pub cheat_weapon_next_enemy_fight: bool,
    pub cheat_weapon_this_room: bool,
}

impl PlayerState {
    pub fn new() -> Self {
        Self {
            hp: STARTING_MAX_HP,
            max_hp: STARTING_MAX_HP,
            gold: 0,
            fate: 0,
            weapon: None,
            armor: None,
            spell: None,
            cheat_weapon_next_enemy_fight: false,
            cheat_weapon_this_room: false,
        }
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChariotDirection {
    LeftToRight,
    RightToLeft,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FloorParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chariot_direction: Option<ChariotDirection>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FloorState {
    pub floor_number: u32,
    pub active_major_id: String,
    pub engaged_rooms_completed: u32,
    pub floor_discard: Vec<String>,
    pub boss_mode: bool,
    pub boss_rooms_required: u32,
    pub boss_rooms_completed: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boss_deck: Option<Vec<String>>,
    pub params: FloorParams,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomState {
    pub slots: [Option<String>; ROOM_SLOTS],
    pub resolved_mask: [bool; ROOM_SLOTS],
    pub pending_cleanses: [bool; ROOM_SLOTS],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carried_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carry_choice_index: Option<usize>,
    pub leap_used: bool,
    pub healing_used_this_room: bool,
    pub hanged_man_triggered_this_room: bool,
    pub disabled_fate_actions: Vec<FateAction>,
}

impl RoomState {
    pub fn empty() -> Self {
        Self {
            slots: Default::default(),
            resolved_mask: [false; ROOM_SLOTS],
            pending_cleanses: [false; ROOM_SLOTS],
            carried_index: None,
            carry_choice_index: None,
            leap_used: false,
            healing_used_this_room: false,
            hanged_man_triggered_this_room: false,
            disabled_fate_actions: Vec::new(),
        }
    }

    /// Occupied, unresolved slot indices, ascending.
    pub fn open_slots(&self) -> Vec<usize> {
        (0..ROOM_SLOTS)
            .filter(|&i| self.slots[i].is_some() && !self.resolved_mask[i])
            .collect()
    }

    pub fn resolved_count(&self) -> usize {
        self.resolved_mask.iter().filter(|r| **r).count()
    }

    pub fn fate_action_disabled(&self, action: FateAction) -> bool {
        self.disabled_fate_actions.contains(&action)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MajorsProgress {
    pub claimed: Vec<String>,
    pub attuned: Vec<String>,
    pub spent_this_floor: Vec<String>,
}

/// Which slot primitive a parked SELECT_TARGET prompt will apply.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TargetPrimitive {
    Reroll,
    ExileReplace,
    Cleanse,
}

/// A decision the reducer cannot progress without. At most one at a time.
/// Excluded from the canonical hash; the action log re-derives it on replay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "prompt", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PendingPrompt {
    AceResolution {
        slot: usize,
        card_id: String,
        options: Vec<AceOption>,
    },
    EnemyFightChoice {
        slot: usize,
        card_id: String,
        enemy_value: u32,
    },
    AmbushBlock {
        slot: usize,
        card_id: String,
        value: u32,
    },
    CupsChoice {
        slot: usize,
        card_id: String,
        value: u32,
    },
    MajorChoice {
        prompt_key: String,
        options: Vec<ChoiceOption>,
    },
    MajorBargain {
        prompt_key: String,
        options: Vec<BargainOption>,
    },
    ReorderTop3 {
        card_ids: Vec<String>,
    },
    ReorderRoom4,
    SelectTarget {
        primitive: TargetPrimitive,
        candidates: Vec<usize>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingResolution {
    pub slot: usize,
    pub card_id: String,
    pub effective: crate::cards::Orientation,
}

/// The whole run. Created by `create_run`, advanced only by `apply_action`,
/// value-comparable and serializable for saves and parity hashing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunState {
    /// The bundle this run was created against. Not serialized; save loading
    /// reattaches the process bundle.
    #[serde(skip)]
    pub content: Arc<ContentBundle>,
    pub seed: u32,
    pub run_length_target: u8,
    pub rng: RngState,
    pub phase: Phase,
    pub cards: BTreeMap<String, Card>,
    pub minor_deck: Vec<String>,
    pub major_deck: Vec<String>,
    pub player: PlayerState,
    pub floor: FloorState,
    pub room: RoomState,
    pub majors: MajorsProgress,
    pub rules: RulesState,
    pub last_room_was_flee: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_prompt: Option<PendingPrompt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_resolution: Option<PendingResolution>,
    /// Remaining effect nodes of a parked Major evaluation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effect_queue: Vec<crate::content::Effect>,
}

impl RunState {
    pub fn card(&self, id: &str) -> &Card {
        &self.cards[id]
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, Phase::RunVictory | Phase::RunDefeat)
    }

    /// Audits the invariants that must hold between transitions. Test suites
    /// call this after every applied action.
    pub fn check_invariants(&self) -> Result<(), String> {
        let p = &self.player;
        if p.hp < 0 || p.hp > p.max_hp {
            return Err(format!("hp {} outside [0, {}]", p.hp, p.max_hp));
        }
        if p.fate > FATE_CAP {
            return Err(format!("fate {} above cap", p.fate));
        }
        if p.gold < 0 || p.gold > GOLD_CAP {
            return Err(format!("gold {} outside [0, {GOLD_CAP}]", p.gold));
        }

        for id in &self.majors.attuned {
            if !self.majors.claimed.contains(id) {
                return Err(format!("attuned {id} not claimed"));
            }
        }
        if self.majors.attuned.len() > 3 {
            return Err("more than 3 attuned".into());
        }
        for list in [
            &self.majors.claimed,
            &self.majors.attuned,
            &self.majors.spent_this_floor,
        ] {
            let unique: BTreeSet<_> = list.iter().collect();
            if unique.len() != list.len() {
                return Err("duplicate id in a major list".into());
            }
        }

        if self.floor.boss_deck.is_some() != self.floor.boss_mode {
            return Err("boss deck presence disagrees with boss mode".into());
        }

        let mut held: Vec<&str> = Vec::with_capacity(MINOR_COUNT);
        held.extend(self.room.slots.iter().flatten().map(String::as_str));
        held.extend(self.minor_deck.iter().map(String::as_str));
        if let Some(boss_deck) = &self.floor.boss_deck {
            held.extend(boss_deck.iter().map(String::as_str));
        }
        held.extend(self.floor.floor_discard.iter().map(String::as_str));
        if let Some(weapon) = &p.weapon {
            held.push(&weapon.card_id);
            held.extend(weapon.tucked_enemy_ids.iter().map(String::as_str));
        }
        if let Some(armor) = &p.armor {
            held.push(&armor.card_id);
        }
        if let Some(spell) = &p.spell {
            held.push(&spell.card_id);
        }
        if held.len() != MINOR_COUNT {
            return Err(format!("{} cards reachable, want {MINOR_COUNT}", held.len()));
        }
        let unique: BTreeSet<&str> = held.iter().copied().collect();
        if unique.len() != MINOR_COUNT {
            return Err("card id held in two places".into());
        }
        let registry: BTreeSet<String> = registry_order().map(|(s, r)| card_id(s, r)).collect();
        for id in unique {
            if !registry.contains(id) {
                return Err(format!("unknown card id {id}"));
            }
        }
        Ok(())
    }
}

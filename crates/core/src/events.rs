use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentKind {
    Weapon,
    Armor,
    Spell,
}

/// Observable happenings within a single `apply_action`, in emission order.
/// The order is part of the public contract; renderers replay it verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Event {
    RoomRevealed {
        slots: [Option<String>; 4],
    },
    PeekTopN {
        n: usize,
        card_ids: Vec<String>,
    },
    PlayerHpChanged {
        delta: i32,
        hp: i32,
    },
    PlayerGoldChanged {
        delta: i32,
        gold: i32,
    },
    PlayerFateChanged {
        delta: i32,
        fate: u8,
    },
    CardBottomed {
        card_id: String,
    },
    CardExiled {
        card_id: String,
    },
    CardResolved {
        card_id: String,
        slot_index: usize,
    },
    EquipWeapon {
        card_id: String,
        value: u32,
    },
    EquipArmor {
        card_id: String,
        value: u32,
    },
    EquipSpell {
        card_id: String,
        value: u32,
    },
    DiscardEquipment {
        kind: EquipmentKind,
        card_id: String,
    },
}

#[derive(Debug, Default)]
pub struct EventBus {
    queue: Vec<Event>,
}

impl EventBus {
    pub fn push(&mut self, event: Event) {
        self.queue.push(event);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.queue.drain(..)
    }
}

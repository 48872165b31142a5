#![allow(dead_code)]

use gambit_core::content::{
    ContentBundle, Effect, Gift, MajorDef, MajorText, Shadow, ShadowTrigger, MAJOR_COUNT,
};
use gambit_core::state::{ArmorSlot, RunState, SpellSlot, WeaponSlot, ROOM_SLOTS};
use gambit_core::{Action, Orientation};
use std::collections::BTreeMap;
use std::sync::Arc;

/// 21 identical majors so the shuffled floor order never matters: whichever
/// Major is active, the behavior under test applies.
pub fn uniform_bundle(trigger: ShadowTrigger, shadow: Effect, gift: Effect) -> Arc<ContentBundle> {
    let mut strings = BTreeMap::new();
    for key in [
        "k.name", "k.shadow", "k.gift", "k.prompt", "k.a", "k.b", "k.c",
    ] {
        strings.insert(key.to_string(), format!("text for {key}"));
    }
    let majors = (0..MAJOR_COUNT)
        .map(|index| MajorDef {
            id: format!("m{index:02}"),
            text: MajorText {
                name_key: "k.name".into(),
                shadow_key: "k.shadow".into(),
                gift_key: "k.gift".into(),
            },
            shadow: Shadow {
                trigger,
                effect: shadow.clone(),
            },
            gift: Gift {
                effect: gift.clone(),
            },
        })
        .collect();
    let bundle = ContentBundle {
        content_version: "test-uniform".into(),
        majors,
        strings,
    };
    bundle.validate().expect("uniform test bundle is valid");
    Arc::new(bundle)
}

pub fn noop_bundle() -> Arc<ContentBundle> {
    uniform_bundle(ShadowTrigger::FloorStart, Effect::Noop, Effect::Noop)
}

/// Apply an action that must be legal, auditing invariants afterwards.
pub fn apply_ok(state: &RunState, action: Action) -> RunState {
    let (next, _) = state.apply(&action).expect("action should be accepted");
    next.check_invariants().expect("invariants hold");
    next
}

pub fn apply_with_events(
    state: &RunState,
    action: Action,
) -> (RunState, Vec<gambit_core::Event>) {
    let (next, events) = state.apply(&action).expect("action should be accepted");
    next.check_invariants().expect("invariants hold");
    (next, events)
}

/// Fresh run with the empty attunement already chosen: lands in RoomChoice.
pub fn begin(bundle: Arc<ContentBundle>, seed: u32) -> RunState {
    let state = RunState::create(bundle, seed, 7).expect("create run");
    apply_ok(&state, Action::SelectAttunement { major_ids: vec![] })
}

/// `begin` plus engage: lands in the pre-resolve window.
pub fn window(bundle: Arc<ContentBundle>, seed: u32) -> RunState {
    let state = begin(bundle, seed);
    apply_ok(&state, Action::ChooseEngage)
}

/// Force a specific card into a slot with a chosen physical orientation,
/// keeping the 56-card partition intact.
pub fn place(state: &mut RunState, slot: usize, id: &str, orientation: Orientation) {
    let in_room = (0..ROOM_SLOTS).find(|&j| state.room.slots[j].as_deref() == Some(id));
    if let Some(j) = in_room {
        if j != slot {
            let displaced = state.room.slots[slot].take();
            state.room.slots[j] = displaced;
        }
    } else {
        take_from_pools(state, id);
        if let Some(old) = state.room.slots[slot].take() {
            state.minor_deck.push(old);
        }
    }
    state.room.slots[slot] = Some(id.to_string());
    state.room.pending_cleanses[slot] = false;
    state.room.resolved_mask[slot] = false;
    set_orientation(state, id, orientation);
    state
        .check_invariants()
        .expect("place keeps the partition intact");
}

pub fn set_orientation(state: &mut RunState, id: &str, orientation: Orientation) {
    state
        .cards
        .get_mut(id)
        .expect("card exists in the registry")
        .orientation = orientation;
}

fn take_from_pools(state: &mut RunState, id: &str) {
    if let Some(pos) = state.minor_deck.iter().position(|c| c == id) {
        state.minor_deck.remove(pos);
        return;
    }
    if let Some(pos) = state.floor.floor_discard.iter().position(|c| c == id) {
        state.floor.floor_discard.remove(pos);
        return;
    }
    if let Some(deck) = state.floor.boss_deck.as_mut() {
        if let Some(pos) = deck.iter().position(|c| c == id) {
            deck.remove(pos);
            return;
        }
    }
    panic!("card {id} not found in any pool");
}

pub fn give_weapon(state: &mut RunState, id: &str, value: u32) {
    take_from_pools(state, id);
    state.player.weapon = Some(WeaponSlot {
        card_id: id.to_string(),
        value,
        last_helped_defeat_value: None,
        tucked_enemy_ids: Vec::new(),
    });
}

pub fn give_armor(state: &mut RunState, id: &str, value: u32) {
    take_from_pools(state, id);
    state.player.armor = Some(ArmorSlot {
        card_id: id.to_string(),
        value,
    });
}

pub fn give_spell(state: &mut RunState, id: &str, value: u32) {
    take_from_pools(state, id);
    state.player.spell = Some(SpellSlot {
        card_id: id.to_string(),
        value,
    });
}

/// Drive a run by always taking the last legal action (commits and prompt
/// answers sit at the tail, so this makes steady progress).
pub fn drive(mut state: RunState, max_steps: usize) -> (RunState, Vec<Action>) {
    let mut taken = Vec::new();
    for _ in 0..max_steps {
        if state.is_over() {
            break;
        }
        let actions = state.legal_actions();
        let action = actions.last().expect("non-terminal state offers actions");
        state = apply_ok(&state, action.clone());
        taken.push(action.clone());
    }
    (state, taken)
}

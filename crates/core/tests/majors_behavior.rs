mod common;

use common::{apply_ok, apply_with_events, begin, place, uniform_bundle, window};
use gambit_core::content::{
    BargainOption, ChoiceOption, Effect, FateAction, Predicate, Scope, Selector, ShadowTrigger,
};
use gambit_core::rules::OrderConstraintKind;
use gambit_core::state::{ChariotDirection, PendingPrompt};
use gambit_core::{Action, Event, Orientation, Phase, RunState, WeaponRestrictionMode};
use std::sync::Arc;

fn attune_one(state: &mut RunState) -> String {
    let id = "m00".to_string();
    state.majors.claimed.push(id.clone());
    state.majors.attuned.push(id.clone());
    id
}

#[test]
fn forced_exile_swallows_the_first_commit() {
    let bundle = uniform_bundle(
        ShadowTrigger::BeforeFirstResolveAttempt,
        Effect::ForcedExileFirstResolveAttempt,
        Effect::Noop,
    );
    let state = window(bundle, 11);
    let victim = state.room.slots[0].clone().unwrap();

    let (state, events) = apply_with_events(&state, Action::CommitResolve { slot: 0 });
    assert_eq!(state.phase, Phase::PreResolveWindow);
    assert!(state.room.hanged_man_triggered_this_room);
    assert!(state.floor.floor_discard.contains(&victim));
    assert!(state.room.slots[0].is_some(), "a replacement was drawn");
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::CardExiled { card_id } if *card_id == victim)));
    assert_eq!(state.room.resolved_count(), 0);

    // The second commit resolves normally.
    let slot = match state.legal_actions().last().cloned() {
        Some(Action::CommitResolve { slot }) => slot,
        other => panic!("expected a commit, got {other:?}"),
    };
    let next = apply_ok(&state, Action::CommitResolve { slot });
    assert!(next.room.resolved_count() == 1 || next.pending_prompt.is_some());
}

#[test]
fn choice_shadow_parks_and_applies_the_picked_branch() {
    let bundle = uniform_bundle(
        ShadowTrigger::RoomRevealed,
        Effect::Choice {
            prompt_key: "k.prompt".into(),
            options: vec![
                ChoiceOption {
                    label_key: "k.a".into(),
                    effect: Effect::DisableFateAction {
                        fate_action: FateAction::Reroll,
                        scope: Scope::ThisRoom,
                    },
                },
                ChoiceOption {
                    label_key: "k.b".into(),
                    effect: Effect::DisableFateAction {
                        fate_action: FateAction::Cleanse,
                        scope: Scope::ThisRoom,
                    },
                },
            ],
        },
        Effect::Noop,
    );
    let state = RunState::create(bundle, 11, 7).unwrap();
    let state = apply_ok(&state, Action::SelectAttunement { major_ids: vec![] });
    assert!(matches!(
        state.pending_prompt,
        Some(PendingPrompt::MajorChoice { .. })
    ));
    assert_eq!(
        state.legal_actions(),
        vec![Action::AnswerChoice { index: 0 }, Action::AnswerChoice { index: 1 }]
    );

    let state = apply_ok(&state, Action::AnswerChoice { index: 0 });
    assert_eq!(state.phase, Phase::RoomChoice);
    assert!(state.room.fate_action_disabled(FateAction::Reroll));
    assert!(!state.room.fate_action_disabled(FateAction::Cleanse));
}

#[test]
fn bargain_shadow_hides_unaffordable_options() {
    let bundle = uniform_bundle(
        ShadowTrigger::FloorStart,
        Effect::Bargain {
            prompt_key: "k.prompt".into(),
            options: vec![
                BargainOption {
                    label_key: "k.a".into(),
                    pay_gold: Some(5),
                    take_damage: None,
                    heal: None,
                    gain_gold: None,
                },
                BargainOption {
                    label_key: "k.b".into(),
                    pay_gold: None,
                    take_damage: Some(3),
                    heal: None,
                    gain_gold: None,
                },
            ],
        },
        Effect::Noop,
    );
    let state = RunState::create(bundle, 11, 7).unwrap();
    let state = apply_ok(&state, Action::SelectAttunement { major_ids: vec![] });
    // Broke: only the blood option is on the table.
    assert_eq!(state.legal_actions(), vec![Action::AnswerBargain { index: 1 }]);
    let err = state.apply(&Action::AnswerBargain { index: 0 }).unwrap_err();
    assert!(matches!(err, gambit_core::EngineError::IllegalAction(_)));

    let state = apply_ok(&state, Action::AnswerBargain { index: 1 });
    assert_eq!(state.player.hp, 17);
    assert_eq!(state.phase, Phase::RoomChoice);
}

#[test]
fn disable_fate_action_blocks_the_window_action() {
    let bundle = uniform_bundle(
        ShadowTrigger::RoomRevealed,
        Effect::DisableFateAction {
            fate_action: FateAction::Cleanse,
            scope: Scope::ThisRoom,
        },
        Effect::Noop,
    );
    let mut state = window(bundle, 11);
    state.player.fate = 5;
    place(&mut state, 0, "cups_6", Orientation::Reversed);

    assert!(!state
        .legal_actions()
        .iter()
        .any(|a| matches!(a, Action::SpendFateCleanse { .. })));
    let err = state.apply(&Action::SpendFateCleanse { slot: 0 }).unwrap_err();
    assert!(matches!(err, gambit_core::EngineError::IllegalAction(_)));
    // Rerolls stay available.
    assert!(state
        .legal_actions()
        .iter()
        .any(|a| matches!(a, Action::SpendFateReroll { .. })));
}

#[test]
fn peek_gift_emits_event_and_reorders_the_top() {
    let bundle = uniform_bundle(
        ShadowTrigger::FloorStart,
        Effect::Noop,
        Effect::PeekTopN {
            n: 3,
            can_reorder: true,
        },
    );
    let mut state = window(bundle, 11);
    let gift = attune_one(&mut state);
    let top: Vec<String> = state.minor_deck.iter().take(3).cloned().collect();

    let (state, events) = apply_with_events(&state, Action::UseMajorGift { major_id: gift });
    assert!(events.iter().any(|e| matches!(
        e,
        Event::PeekTopN { n: 3, card_ids } if *card_ids == top
    )));
    assert!(matches!(
        state.pending_prompt,
        Some(PendingPrompt::ReorderTop3 { .. })
    ));
    assert_eq!(state.legal_actions().len(), 6);

    let state = apply_ok(
        &state,
        Action::ReorderTop {
            order: vec![2, 0, 1],
        },
    );
    assert_eq!(state.minor_deck[0], top[2]);
    assert_eq!(state.minor_deck[1], top[0]);
    assert_eq!(state.minor_deck[2], top[1]);
    assert_eq!(state.phase, Phase::PreResolveWindow);
    assert!(state.majors.spent_this_floor.contains(&"m00".to_string()));
}

#[test]
fn gift_cannot_be_used_twice_per_floor() {
    let bundle = uniform_bundle(ShadowTrigger::FloorStart, Effect::Noop, Effect::Noop);
    let mut state = window(bundle, 11);
    let gift = attune_one(&mut state);
    let state = apply_ok(
        &state,
        Action::UseMajorGift {
            major_id: gift.clone(),
        },
    );
    let err = state
        .apply(&Action::UseMajorGift { major_id: gift })
        .unwrap_err();
    assert!(matches!(err, gambit_core::EngineError::IllegalAction(_)));
}

#[test]
fn reorder_room_by_value_sorts_and_remaps_carried() {
    let bundle = uniform_bundle(
        ShadowTrigger::FloorStart,
        Effect::Noop,
        Effect::ReorderRoomByValue,
    );
    let mut state = window(bundle, 11);
    let gift = attune_one(&mut state);
    place(&mut state, 0, "swords_9", Orientation::Upright);
    place(&mut state, 1, "cups_2", Orientation::Upright);
    place(&mut state, 2, "cups_queen", Orientation::Upright);
    place(&mut state, 3, "pentacles_5", Orientation::Upright);
    state.room.carried_index = Some(2);

    let state = apply_ok(&state, Action::UseMajorGift { major_id: gift });
    let slots: Vec<&str> = state
        .room
        .slots
        .iter()
        .map(|s| s.as_deref().unwrap())
        .collect();
    assert_eq!(slots, vec!["cups_2", "pentacles_5", "swords_9", "cups_queen"]);
    assert_eq!(
        state.room.carried_index,
        Some(3),
        "the marker follows the queen"
    );
}

#[test]
fn reorder_room_arbitrary_applies_the_permutation() {
    let bundle = uniform_bundle(
        ShadowTrigger::FloorStart,
        Effect::Noop,
        Effect::ReorderRoomArbitrary,
    );
    let mut state = window(bundle, 11);
    let gift = attune_one(&mut state);
    let before: Vec<String> = state.room.slots.iter().flatten().cloned().collect();

    let state = apply_ok(&state, Action::UseMajorGift { major_id: gift });
    assert!(matches!(
        state.pending_prompt,
        Some(PendingPrompt::ReorderRoom4)
    ));
    assert_eq!(state.legal_actions().len(), 24);
    let state = apply_ok(
        &state,
        Action::ReorderRoom {
            order: vec![3, 2, 1, 0],
        },
    );
    let after: Vec<String> = state.room.slots.iter().flatten().cloned().collect();
    let mut reversed = before.clone();
    reversed.reverse();
    assert_eq!(after, reversed);
}

#[test]
fn order_constraint_shadow_locks_commits_left_to_right() {
    let bundle = uniform_bundle(
        ShadowTrigger::OrderConstraint,
        Effect::SetOrderConstraint {
            order_constraint: OrderConstraintKind::LeftToRight,
            requires_choose_carried_first: false,
            scope: Scope::ThisFloor,
        },
        Effect::Noop,
    );
    let state = window(bundle, 11);
    assert_eq!(state.rules.order_constraint.kind, OrderConstraintKind::LeftToRight);
    assert_eq!(
        state.rules.order_constraint.scope_major_id.as_deref(),
        Some(state.floor.active_major_id.as_str())
    );
    let commits: Vec<Action> = state
        .legal_actions()
        .into_iter()
        .filter(|a| matches!(a, Action::CommitResolve { .. }))
        .collect();
    assert_eq!(commits, vec![Action::CommitResolve { slot: 0 }]);
}

#[test]
fn carried_first_constraint_routes_through_engage_setup() {
    let bundle = uniform_bundle(
        ShadowTrigger::OrderConstraint,
        Effect::SetOrderConstraint {
            order_constraint: OrderConstraintKind::RightToLeft,
            requires_choose_carried_first: true,
            scope: Scope::ThisFloor,
        },
        Effect::Noop,
    );
    let state = begin(bundle, 11);
    let state = apply_ok(&state, Action::ChooseEngage);
    assert_eq!(state.phase, Phase::EngageSetup);
    assert_eq!(
        state.legal_actions(),
        vec![
            Action::SelectCarriedCard { slot: 0 },
            Action::SelectCarriedCard { slot: 1 },
            Action::SelectCarriedCard { slot: 2 },
            Action::SelectCarriedCard { slot: 3 },
        ]
    );
    let state = apply_ok(&state, Action::SelectCarriedCard { slot: 3 });
    assert_eq!(state.phase, Phase::PreResolveWindow);
    assert_eq!(state.room.carry_choice_index, Some(3));
    // Right-to-left, with slot 3 reserved for the carry: slot 2 is forced.
    let commits: Vec<Action> = state
        .legal_actions()
        .into_iter()
        .filter(|a| matches!(a, Action::CommitResolve { .. }))
        .collect();
    assert_eq!(commits, vec![Action::CommitResolve { slot: 2 }]);
}

#[test]
fn strict_mode_and_floor_params_come_from_shadows() {
    let strict = uniform_bundle(
        ShadowTrigger::FloorStart,
        Effect::SetWeaponRestrictionMode {
            mode: WeaponRestrictionMode::Strict,
            scope: Scope::ThisFloor,
        },
        Effect::Noop,
    );
    let state = begin(strict, 11);
    assert_eq!(
        state.rules.weapon_restriction_mode,
        WeaponRestrictionMode::Strict
    );

    let chariot = uniform_bundle(
        ShadowTrigger::OrderConstraint,
        Effect::Sequence {
            effects: vec![
                Effect::SetOrderConstraint {
                    order_constraint: OrderConstraintKind::LeftToRight,
                    requires_choose_carried_first: false,
                    scope: Scope::ThisFloor,
                },
                Effect::SetFloorParam {
                    param_key: "chariotDirection".into(),
                    param_value: "LEFT_TO_RIGHT".into(),
                    scope: Scope::ThisFloor,
                },
            ],
        },
        Effect::Noop,
    );
    let state = begin(chariot, 11);
    assert_eq!(
        state.floor.params.chariot_direction,
        Some(ChariotDirection::LeftToRight)
    );
    assert_eq!(state.rules.order_constraint.kind, OrderConstraintKind::LeftToRight);
}

#[test]
fn cheat_weapon_param_sets_the_buff() {
    let bundle = uniform_bundle(
        ShadowTrigger::FloorStart,
        Effect::Noop,
        Effect::SetFloorParam {
            param_key: "cheatWeapon".into(),
            param_value: "true".into(),
            scope: Scope::ThisFloor,
        },
    );
    let mut state = window(bundle, 11);
    let gift = attune_one(&mut state);
    let state = apply_ok(&state, Action::UseMajorGift { major_id: gift });
    assert!(state.player.cheat_weapon_next_enemy_fight);
}

#[test]
fn after_first_resolution_shadow_fires_once_per_room() {
    let bundle = uniform_bundle(
        ShadowTrigger::AfterFirstResolution,
        Effect::ExileReplaceRevealed {
            selector: Selector::Leftmost,
        },
        Effect::Noop,
    );
    let mut state = window(bundle, 11);
    place(&mut state, 0, "pentacles_2", Orientation::Upright);
    place(&mut state, 1, "pentacles_3", Orientation::Upright);
    place(&mut state, 2, "pentacles_5", Orientation::Upright);
    place(&mut state, 3, "pentacles_6", Orientation::Upright);

    let state = apply_ok(&state, Action::CommitResolve { slot: 0 });
    // Resolved card plus the shadow's exiled card.
    assert_eq!(state.floor.floor_discard.len(), 2);
    assert!(state.floor.floor_discard.contains(&"pentacles_3".to_string()));
    assert!(state.room.slots[1].is_some(), "exiled slot was refilled");

    let discard_after_first = state.floor.floor_discard.len();
    let state = apply_ok(&state, Action::CommitResolve { slot: 2 });
    assert_eq!(
        state.floor.floor_discard.len(),
        discard_after_first + 1,
        "second resolution does not re-fire the shadow"
    );
}

#[test]
fn selector_with_no_candidates_is_a_noop() {
    let bundle = uniform_bundle(
        ShadowTrigger::FloorStart,
        Effect::Noop,
        Effect::CleanseRevealed {
            selector: Selector::PlayerChoice,
        },
    );
    let mut state = window(bundle, 11);
    let gift = attune_one(&mut state);
    for (slot, id) in ["cups_2", "cups_3", "cups_4", "cups_5"].into_iter().enumerate() {
        place(&mut state, slot, id, Orientation::Upright);
    }
    let state = apply_ok(&state, Action::UseMajorGift { major_id: gift });
    assert!(state.pending_prompt.is_none(), "nothing to cleanse, no prompt");
    assert!(state.majors.spent_this_floor.contains(&"m00".to_string()));
}

#[test]
fn conditional_predicates_branch() {
    let bundle = uniform_bundle(
        ShadowTrigger::RoomRevealed,
        Effect::Conditional {
            predicate: Predicate::PlayerGoldAtLeast { value: 3 },
            then: Box::new(Effect::DisableFateAction {
                fate_action: FateAction::Reroll,
                scope: Scope::ThisRoom,
            }),
            otherwise: Box::new(Effect::Noop),
        },
        Effect::Noop,
    );
    let poor = begin(Arc::clone(&bundle), 11);
    assert!(!poor.room.fate_action_disabled(FateAction::Reroll));

    let mut rich = RunState::create(bundle, 11, 7).unwrap();
    rich.player.gold = 5;
    let rich = apply_ok(&rich, Action::SelectAttunement { major_ids: vec![] });
    assert!(rich.room.fate_action_disabled(FateAction::Reroll));
}

#[test]
fn select_target_prompt_lists_candidates_in_order() {
    let bundle = uniform_bundle(
        ShadowTrigger::FloorStart,
        Effect::Noop,
        Effect::CleanseRevealed {
            selector: Selector::PlayerChoice,
        },
    );
    let mut state = window(bundle, 11);
    let gift = attune_one(&mut state);
    place(&mut state, 0, "cups_2", Orientation::Upright);
    place(&mut state, 1, "cups_3", Orientation::Reversed);
    place(&mut state, 2, "cups_4", Orientation::Upright);
    place(&mut state, 3, "cups_5", Orientation::Reversed);

    let state = apply_ok(&state, Action::UseMajorGift { major_id: gift });
    assert_eq!(
        state.legal_actions(),
        vec![Action::SelectTarget { slot: 1 }, Action::SelectTarget { slot: 3 }]
    );
    let err = state.apply(&Action::SelectTarget { slot: 2 }).unwrap_err();
    assert!(matches!(err, gambit_core::EngineError::IllegalAction(_)));
    let state = apply_ok(&state, Action::SelectTarget { slot: 3 });
    assert!(state.room.pending_cleanses[3]);
    assert_eq!(state.phase, Phase::PreResolveWindow);
}

#[test]
fn wrong_answer_kind_is_a_prompt_mismatch() {
    let bundle = uniform_bundle(
        ShadowTrigger::FloorStart,
        Effect::Bargain {
            prompt_key: "k.prompt".into(),
            options: vec![
                BargainOption {
                    label_key: "k.a".into(),
                    pay_gold: None,
                    take_damage: Some(1),
                    heal: None,
                    gain_gold: None,
                },
                BargainOption {
                    label_key: "k.b".into(),
                    pay_gold: None,
                    take_damage: None,
                    heal: Some(1),
                    gain_gold: None,
                },
            ],
        },
        Effect::Noop,
    );
    let state = RunState::create(bundle, 11, 7).unwrap();
    let state = apply_ok(&state, Action::SelectAttunement { major_ids: vec![] });
    let err = state.apply(&Action::AnswerChoice { index: 0 }).unwrap_err();
    assert!(matches!(err, gambit_core::EngineError::PromptMismatch));
    let err = state.apply(&Action::ChooseEngage).unwrap_err();
    assert!(matches!(err, gambit_core::EngineError::PromptMismatch));
}

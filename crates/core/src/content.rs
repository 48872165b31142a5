use crate::rules::{OrderConstraintKind, WeaponRestrictionMode};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

pub const MAJOR_COUNT: usize = 21;

/// Engine hooks a Major's shadow can fire on during its floor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShadowTrigger {
    FloorStart,
    RoomRevealed,
    OrderConstraint,
    BeforeFirstResolveAttempt,
    AfterFirstResolution,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Selector {
    PlayerChoice,
    Random,
    Leftmost,
    HighestValue,
    IfEnemyPresentPlayerChoice,
    IfAnyReversedPlayerChoice,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Predicate {
    RoomHasEnemy,
    RoomHasAnyEffectiveReversed,
    PlayerGoldAtLeast { value: i32 },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Scope {
    ThisRoom,
    ThisFloor,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FateAction {
    Cleanse,
    Reroll,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChoiceOption {
    pub label_key: String,
    pub effect: Effect,
}

/// One bargain shape. Pay/damage first, then heal, then gold gain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BargainOption {
    pub label_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pay_gold: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take_damage: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heal: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gain_gold: Option<i32>,
}

/// The closed primitive set Major effects are authored in. The interpreter
/// walks these; there is never per-Major code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Effect {
    Noop,
    Sequence {
        effects: Vec<Effect>,
    },
    Choice {
        prompt_key: String,
        options: Vec<ChoiceOption>,
    },
    Conditional {
        #[serde(rename = "if")]
        predicate: Predicate,
        then: Box<Effect>,
        #[serde(rename = "else")]
        otherwise: Box<Effect>,
    },
    RerollRevealed {
        selector: Selector,
    },
    ExileReplaceRevealed {
        selector: Selector,
    },
    CleanseRevealed {
        selector: Selector,
    },
    PeekTopN {
        n: usize,
        can_reorder: bool,
    },
    ReorderTopN {
        n: usize,
    },
    ReorderRoomByValue,
    ReorderRoomArbitrary,
    Bargain {
        prompt_key: String,
        options: Vec<BargainOption>,
    },
    DisableFateAction {
        fate_action: FateAction,
        scope: Scope,
    },
    SetWeaponRestrictionMode {
        mode: WeaponRestrictionMode,
        scope: Scope,
    },
    SetOrderConstraint {
        order_constraint: OrderConstraintKind,
        requires_choose_carried_first: bool,
        scope: Scope,
    },
    SetFloorParam {
        param_key: String,
        param_value: String,
        scope: Scope,
    },
    ForcedExileFirstResolveAttempt,
}

/// Opaque UI string keys; the engine only checks they exist in the table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MajorText {
    pub name_key: String,
    pub shadow_key: String,
    pub gift_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Shadow {
    pub trigger: ShadowTrigger,
    pub effect: Effect,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Gift {
    pub effect: Effect,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MajorDef {
    pub id: String,
    pub text: MajorText,
    pub shadow: Shadow,
    pub gift: Gift,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ContentBundle {
    pub content_version: String,
    pub majors: Vec<MajorDef>,
    pub strings: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContentError {
    #[error("expected {MAJOR_COUNT} majors, found {0}")]
    WrongMajorCount(usize),
    #[error("duplicate major id {0}")]
    DuplicateMajorId(String),
    #[error("unknown major id {0}")]
    UnknownMajorId(String),
    #[error("major {major} references missing string key {key}")]
    MissingStringKey { major: String, key: String },
    #[error("malformed effect in major {major}: {reason}")]
    MalformedEffect { major: String, reason: String },
}

impl ContentBundle {
    pub fn major(&self, id: &str) -> Option<&MajorDef> {
        self.majors.iter().find(|major| major.id == id)
    }

    pub fn require_major(&self, id: &str) -> Result<&MajorDef, ContentError> {
        self.major(id)
            .ok_or_else(|| ContentError::UnknownMajorId(id.to_string()))
    }

    /// Structural and referential validation. Rejecting here is what lets the
    /// interpreter trust every node it walks.
    pub fn validate(&self) -> Result<(), ContentError> {
        if self.majors.len() != MAJOR_COUNT {
            return Err(ContentError::WrongMajorCount(self.majors.len()));
        }
        let mut seen = BTreeSet::new();
        for major in &self.majors {
            if !seen.insert(major.id.as_str()) {
                return Err(ContentError::DuplicateMajorId(major.id.clone()));
            }
            self.require_string(major, &major.text.name_key)?;
            self.require_string(major, &major.text.shadow_key)?;
            self.require_string(major, &major.text.gift_key)?;
            self.validate_effect(major, &major.shadow.effect)?;
            self.validate_effect(major, &major.gift.effect)?;
        }
        Ok(())
    }

    fn require_string(&self, major: &MajorDef, key: &str) -> Result<(), ContentError> {
        if self.strings.contains_key(key) {
            Ok(())
        } else {
            Err(ContentError::MissingStringKey {
                major: major.id.clone(),
                key: key.to_string(),
            })
        }
    }

    fn validate_effect(&self, major: &MajorDef, effect: &Effect) -> Result<(), ContentError> {
        let malformed = |reason: &str| ContentError::MalformedEffect {
            major: major.id.clone(),
            reason: reason.to_string(),
        };
        match effect {
            Effect::Noop
            | Effect::ReorderRoomByValue
            | Effect::ReorderRoomArbitrary
            | Effect::ForcedExileFirstResolveAttempt => Ok(()),
            Effect::RerollRevealed { .. }
            | Effect::ExileReplaceRevealed { .. }
            | Effect::CleanseRevealed { .. } => Ok(()),
            Effect::Sequence { effects } => {
                if effects.is_empty() {
                    return Err(malformed("SEQUENCE requires effects"));
                }
                for child in effects {
                    self.validate_effect(major, child)?;
                }
                Ok(())
            }
            Effect::Choice {
                prompt_key,
                options,
            } => {
                if options.is_empty() {
                    return Err(malformed("CHOICE requires options"));
                }
                self.require_string(major, prompt_key)?;
                for option in options {
                    self.require_string(major, &option.label_key)?;
                    self.validate_effect(major, &option.effect)?;
                }
                Ok(())
            }
            Effect::Conditional {
                then, otherwise, ..
            } => {
                self.validate_effect(major, then)?;
                self.validate_effect(major, otherwise)
            }
            Effect::PeekTopN { n, .. } | Effect::ReorderTopN { n } => {
                if *n != 3 {
                    return Err(malformed("peek/reorder depth must be 3"));
                }
                Ok(())
            }
            Effect::Bargain {
                prompt_key,
                options,
            } => {
                if options.len() < 2 {
                    return Err(malformed("BARGAIN requires at least 2 options"));
                }
                self.require_string(major, prompt_key)?;
                for option in options {
                    self.require_string(major, &option.label_key)?;
                    let fields = [
                        option.pay_gold,
                        option.take_damage,
                        option.heal,
                        option.gain_gold,
                    ];
                    if fields.iter().all(Option::is_none) {
                        return Err(malformed("bargain option with no terms"));
                    }
                    if fields.iter().flatten().any(|amount| *amount < 0) {
                        return Err(malformed("negative bargain term"));
                    }
                }
                Ok(())
            }
            Effect::DisableFateAction { scope, .. } => {
                if *scope != Scope::ThisRoom {
                    return Err(malformed("DISABLE_FATE_ACTION is room-scoped"));
                }
                Ok(())
            }
            Effect::SetWeaponRestrictionMode { scope, .. }
            | Effect::SetOrderConstraint { scope, .. } => {
                if *scope != Scope::ThisFloor {
                    return Err(malformed("constraint effects are floor-scoped"));
                }
                Ok(())
            }
            Effect::SetFloorParam {
                param_key,
                param_value,
                scope,
            } => {
                if *scope != Scope::ThisFloor {
                    return Err(malformed("SET_FLOOR_PARAM is floor-scoped"));
                }
                match param_key.as_str() {
                    "cheatWeapon" => {
                        if param_value != "true" {
                            return Err(malformed("cheatWeapon takes \"true\""));
                        }
                        Ok(())
                    }
                    "chariotDirection" => {
                        if param_value != "LEFT_TO_RIGHT" && param_value != "RIGHT_TO_LEFT" {
                            return Err(malformed("bad chariotDirection value"));
                        }
                        Ok(())
                    }
                    _ => Err(malformed("unrecognized floor param")),
                }
            }
        }
    }
}

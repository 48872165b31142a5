use serde::{Deserialize, Serialize};

/// One resolution branch of an Ace prompt. Recorded in offer order so that
/// `legal_actions` enumeration stays byte-stable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "option", rename_all = "snake_case")]
pub enum AceOption {
    Pay5Heal5,
    Gain5Take3,
    HealToFull,
    CleanseFree { slot: usize },
    ExileReplaceFree { slot: usize },
    RerollFree { slot: usize },
    CheatWeaponFree,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FightChoice {
    Barehand,
    Weapon,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CupsBigChoice {
    Heal,
    EquipArmor,
}

/// Every decision a client can feed the reducer. The wire tags are the
/// action-log format; logs begin with `START_RUN`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    StartRun {
        seed: u32,
        run_length_target: u8,
    },
    SelectAttunement {
        major_ids: Vec<String>,
    },
    ChooseEngage,
    ChooseFlee,
    SelectCarriedCard {
        slot: usize,
    },
    UseLeapOfFaith {
        slot: usize,
    },
    SpendFateReroll {
        slot: usize,
    },
    SpendFateCleanse {
        slot: usize,
    },
    SpendFateExileReplace {
        slot: usize,
    },
    SpendFateCheatWeapon,
    UseSpellCleanse {
        slot: usize,
    },
    UseSpellReroll {
        slot: usize,
    },
    UseMajorGift {
        major_id: String,
    },
    CommitResolve {
        slot: usize,
    },
    ResolveAce {
        option: AceOption,
    },
    ResolveEnemyFight {
        choice: FightChoice,
    },
    ResolveAmbush {
        block: bool,
    },
    ResolveCupsChoice {
        choice: CupsBigChoice,
    },
    AnswerChoice {
        index: usize,
    },
    AnswerBargain {
        index: usize,
    },
    SelectTarget {
        slot: usize,
    },
    ReorderTop {
        order: Vec<usize>,
    },
    ReorderRoom {
        order: Vec<usize>,
    },
}

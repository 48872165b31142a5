use crate::actions::{Action, CupsBigChoice, FightChoice};
use crate::cards::Orientation;
use crate::content::FateAction;
use crate::state::{PendingPrompt, Phase, RunState};

impl RunState {
    /// Deterministic enumeration; independent implementations must agree on
    /// this list byte for byte.
    pub fn legal_actions(&self) -> Vec<Action> {
        if self.is_over() {
            return Vec::new();
        }
        if let Some(prompt) = &self.pending_prompt {
            return self.prompt_actions(prompt);
        }
        match self.phase {
            Phase::FloorStart => attunement_subsets(&self.majors.claimed)
                .into_iter()
                .map(|major_ids| Action::SelectAttunement { major_ids })
                .collect(),
            Phase::RoomChoice => {
                let mut actions = vec![Action::ChooseEngage];
                if !self.last_room_was_flee {
                    actions.push(Action::ChooseFlee);
                }
                actions
            }
            Phase::EngageSetup => self
                .room
                .open_slots()
                .into_iter()
                .map(|slot| Action::SelectCarriedCard { slot })
                .collect(),
            Phase::PreResolveWindow => self.window_actions(),
            _ => Vec::new(),
        }
    }

    fn prompt_actions(&self, prompt: &PendingPrompt) -> Vec<Action> {
        match prompt {
            PendingPrompt::AceResolution { options, .. } => options
                .iter()
                .map(|option| Action::ResolveAce {
                    option: option.clone(),
                })
                .collect(),
            PendingPrompt::EnemyFightChoice { .. } => vec![
                Action::ResolveEnemyFight {
                    choice: FightChoice::Barehand,
                },
                Action::ResolveEnemyFight {
                    choice: FightChoice::Weapon,
                },
            ],
            PendingPrompt::AmbushBlock { .. } => vec![
                Action::ResolveAmbush { block: true },
                Action::ResolveAmbush { block: false },
            ],
            PendingPrompt::CupsChoice { .. } => vec![
                Action::ResolveCupsChoice {
                    choice: CupsBigChoice::Heal,
                },
                Action::ResolveCupsChoice {
                    choice: CupsBigChoice::EquipArmor,
                },
            ],
            PendingPrompt::MajorChoice { options, .. } => (0..options.len())
                .map(|index| Action::AnswerChoice { index })
                .collect(),
            PendingPrompt::MajorBargain { options, .. } => options
                .iter()
                .enumerate()
                .filter(|(_, option)| {
                    option.pay_gold.map_or(true, |pay| self.player.gold >= pay)
                })
                .map(|(index, _)| Action::AnswerBargain { index })
                .collect(),
            PendingPrompt::SelectTarget { candidates, .. } => candidates
                .iter()
                .map(|&slot| Action::SelectTarget { slot })
                .collect(),
            PendingPrompt::ReorderTop3 { card_ids } => permutations(card_ids.len())
                .into_iter()
                .map(|order| Action::ReorderTop { order })
                .collect(),
            PendingPrompt::ReorderRoom4 => permutations(self.room.slots.len())
                .into_iter()
                .map(|order| Action::ReorderRoom { order })
                .collect(),
        }
    }

    /// Locked order: gifts, leap, fate reroll, fate cleanse, fate exile,
    /// fate cheat, spell cleanse, spell reroll, commits.
    fn window_actions(&self) -> Vec<Action> {
        let mut actions = Vec::new();
        for id in &self.majors.attuned {
            if !self.majors.spent_this_floor.contains(id) {
                actions.push(Action::UseMajorGift {
                    major_id: id.clone(),
                });
            }
        }
        let open = self.room.open_slots();
        if !self.room.leap_used {
            for &slot in &open {
                actions.push(Action::UseLeapOfFaith { slot });
            }
        }
        if self.player.fate >= 1 && !self.room.fate_action_disabled(FateAction::Reroll) {
            for &slot in &open {
                actions.push(Action::SpendFateReroll { slot });
            }
        }
        if self.player.fate >= 1 && !self.room.fate_action_disabled(FateAction::Cleanse) {
            for &slot in &open {
                if self.slot_effective(slot) == Orientation::Reversed {
                    actions.push(Action::SpendFateCleanse { slot });
                }
            }
        }
        if self.player.fate >= 2 {
            for &slot in &open {
                actions.push(Action::SpendFateExileReplace { slot });
            }
            actions.push(Action::SpendFateCheatWeapon);
        }
        if self.player.spell.is_some() {
            for &slot in &open {
                actions.push(Action::UseSpellCleanse { slot });
            }
            for &slot in &open {
                actions.push(Action::UseSpellReroll { slot });
            }
        }
        for slot in self.allowed_commit_slots() {
            actions.push(Action::CommitResolve { slot });
        }
        actions
    }
}

/// Power set of `claimed` up to size 3, in the locked order: empty set,
/// singletons in claimed order, pairs lexicographic by indices, triples
/// lexicographic by indices.
fn attunement_subsets(claimed: &[String]) -> Vec<Vec<String>> {
    let n = claimed.len();
    let mut subsets = vec![Vec::new()];
    for i in 0..n {
        subsets.push(vec![claimed[i].clone()]);
    }
    for i in 0..n {
        for j in i + 1..n {
            subsets.push(vec![claimed[i].clone(), claimed[j].clone()]);
        }
    }
    for i in 0..n {
        for j in i + 1..n {
            for k in j + 1..n {
                subsets.push(vec![
                    claimed[i].clone(),
                    claimed[j].clone(),
                    claimed[k].clone(),
                ]);
            }
        }
    }
    subsets
}

/// All permutations of `0..n` in lexicographic order.
fn permutations(n: usize) -> Vec<Vec<usize>> {
    fn extend(current: &mut Vec<usize>, used: &mut [bool], out: &mut Vec<Vec<usize>>) {
        if current.len() == used.len() {
            out.push(current.clone());
            return;
        }
        for index in 0..used.len() {
            if !used[index] {
                used[index] = true;
                current.push(index);
                extend(current, used, out);
                current.pop();
                used[index] = false;
            }
        }
    }
    let mut out = Vec::new();
    extend(&mut Vec::new(), &mut vec![false; n], &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subsets_follow_the_locked_order() {
        let claimed: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        let subsets = attunement_subsets(&claimed);
        let rendered: Vec<String> = subsets.iter().map(|s| s.join("")).collect();
        assert_eq!(
            rendered,
            vec![
                "", "a", "b", "c", "d", "ab", "ac", "ad", "bc", "bd", "cd", "abc", "abd", "acd",
                "bcd"
            ]
        );
    }

    #[test]
    fn permutations_are_lexicographic() {
        let perms = permutations(3);
        assert_eq!(
            perms,
            vec![
                vec![0, 1, 2],
                vec![0, 2, 1],
                vec![1, 0, 2],
                vec![1, 2, 0],
                vec![2, 0, 1],
                vec![2, 1, 0],
            ]
        );
        assert_eq!(permutations(4).len(), 24);
    }
}

use crate::actions::Action;
use crate::content::ContentBundle;
use crate::error::{illegal, EngineError};
use crate::hash::hash_state;
use crate::state::RunState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogHeader {
    pub engine_version: String,
    pub content_version: String,
    pub spec_version: String,
    pub created_at_utc: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Checkpoint {
    pub step_index: usize,
    pub state_hash: String,
}

/// Append-only record of a run: a seed and every decision, starting with
/// `START_RUN`. Replaying it reproduces the run hash-for-hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionLog {
    pub header: LogHeader,
    pub seed: u32,
    pub actions: Vec<Action>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkpoints: Option<Vec<Checkpoint>>,
}

impl ActionLog {
    pub fn start(
        seed: u32,
        run_length_target: u8,
        content_version: &str,
        created_at_utc: &str,
    ) -> Self {
        Self {
            header: LogHeader {
                engine_version: crate::ENGINE_VERSION.to_string(),
                content_version: content_version.to_string(),
                spec_version: crate::SPEC_VERSION.to_string(),
                created_at_utc: created_at_utc.to_string(),
            },
            seed,
            actions: vec![Action::StartRun {
                seed,
                run_length_target,
            }],
            checkpoints: None,
        }
    }

    pub fn push(&mut self, action: Action) {
        self.actions.push(action);
    }
}

/// Drive the reducer through a whole log. Returns the final state and the
/// hash after every step; step 0 is the state `START_RUN` produced.
pub fn replay(
    content: Arc<ContentBundle>,
    log: &ActionLog,
) -> Result<(RunState, BTreeMap<usize, String>), EngineError> {
    let mut steps = log.actions.iter().enumerate();
    let Some((
        _,
        Action::StartRun {
            seed,
            run_length_target,
        },
    )) = steps.next()
    else {
        return Err(illegal("action log must begin with START_RUN"));
    };
    if *seed != log.seed {
        return Err(illegal("log seed does not match START_RUN"));
    }
    let mut state = RunState::create(content, *seed, *run_length_target)?;
    let mut hashes = BTreeMap::new();
    hashes.insert(0, hash_state(&state));
    for (step_index, action) in steps {
        let (next, _) = state.apply(action)?;
        state = next;
        hashes.insert(step_index, hash_state(&state));
    }
    tracing::debug!(steps = log.actions.len(), "replayed action log");
    Ok((state, hashes))
}

/// First checkpoint whose recorded hash disagrees with the replay, if any.
pub fn verify_checkpoints(log: &ActionLog, hashes: &BTreeMap<usize, String>) -> Option<usize> {
    let checkpoints = log.checkpoints.as_deref()?;
    checkpoints
        .iter()
        .find(|checkpoint| {
            hashes.get(&checkpoint.step_index) != Some(&checkpoint.state_hash)
        })
        .map(|checkpoint| checkpoint.step_index)
}

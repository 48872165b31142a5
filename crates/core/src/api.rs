//! The engine surface clients drive: load content once, then loop on
//! `legal_actions` / `apply_action`.

use crate::actions::Action;
use crate::content::ContentBundle;
use crate::error::EngineError;
use crate::events::Event;
use crate::replay::ActionLog;
use crate::state::RunState;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// The one piece of process-wide state: the validated content bundle.
/// Read-only after load.
static CONTENT: RwLock<Option<Arc<ContentBundle>>> = RwLock::new(None);

pub fn load_content(bundle: ContentBundle) -> Result<(), EngineError> {
    bundle.validate()?;
    let mut slot = match CONTENT.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    *slot = Some(Arc::new(bundle));
    Ok(())
}

pub fn loaded_content() -> Result<Arc<ContentBundle>, EngineError> {
    let slot = match CONTENT.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    slot.clone().ok_or(EngineError::ContentNotLoaded)
}

pub fn create_run(seed: u32, run_length_target: u8) -> Result<RunState, EngineError> {
    RunState::create(loaded_content()?, seed, run_length_target)
}

pub fn legal_actions(state: &RunState) -> Vec<Action> {
    state.legal_actions()
}

pub fn apply_action(
    state: &RunState,
    action: &Action,
) -> Result<(RunState, Vec<Event>), EngineError> {
    state.apply(action)
}

pub fn hash_state(state: &RunState) -> String {
    crate::hash::hash_state(state)
}

pub fn replay_log(log: &ActionLog) -> Result<(RunState, BTreeMap<usize, String>), EngineError> {
    crate::replay::replay(loaded_content()?, log)
}

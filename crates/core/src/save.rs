use crate::content::ContentBundle;
use crate::hash::hash_state;
use crate::replay::ActionLog;
use crate::state::{RunState, FATE_CAP};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SaveHeader {
    pub engine_version: String,
    pub content_version: String,
    pub spec_version: String,
    pub save_version: u32,
    pub created_at_utc: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    pub run_length_target: u8,
    pub fate_cap: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RngBlob {
    pub algo: String,
    pub state: u32,
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("malformed save blob: {0}")]
    Malformed(String),
    #[error("save version {found} is newer than supported {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
    #[error("save checksum does not match its state")]
    ChecksumMismatch,
    #[error("save was written against content {found}, loaded content is {expected}")]
    ContentMismatch { expected: String, found: String },
}

/// A complete persisted run: enough to resume play or re-verify the log.
/// The engine never timestamps these itself; callers pass `created_at_utc`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SaveBlob {
    pub header: SaveHeader,
    pub seed: u32,
    pub run_config: RunConfig,
    pub rng_state: RngBlob,
    pub state: RunState,
    pub action_log: ActionLog,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

impl SaveBlob {
    pub fn capture(state: &RunState, log: &ActionLog, created_at_utc: &str) -> Self {
        Self {
            header: SaveHeader {
                engine_version: crate::ENGINE_VERSION.to_string(),
                content_version: state.content.content_version.clone(),
                spec_version: crate::SPEC_VERSION.to_string(),
                save_version: SAVE_VERSION,
                created_at_utc: created_at_utc.to_string(),
            },
            seed: state.seed,
            run_config: RunConfig {
                run_length_target: state.run_length_target,
                fate_cap: FATE_CAP,
            },
            rng_state: RngBlob {
                algo: "xorshift32".to_string(),
                state: state.rng.state(),
            },
            state: state.clone(),
            action_log: log.clone(),
            checksum: Some(hash_state(state)),
        }
    }

    pub fn encode(&self) -> Result<String, SaveError> {
        serde_json::to_string_pretty(self).map_err(|err| SaveError::Malformed(err.to_string()))
    }

    /// Version-checked, migrated, checksum-verified decode. The run state
    /// comes back attached to the given content bundle.
    pub fn decode(raw: &str, content: Arc<ContentBundle>) -> Result<Self, SaveError> {
        let mut value: Value =
            serde_json::from_str(raw).map_err(|err| SaveError::Malformed(err.to_string()))?;
        let found = value
            .pointer("/header/save_version")
            .and_then(Value::as_u64)
            .ok_or_else(|| SaveError::Malformed("missing save_version".to_string()))?
            as u32;
        if found > SAVE_VERSION {
            return Err(SaveError::UnsupportedVersion {
                found,
                supported: SAVE_VERSION,
            });
        }
        migrate(&mut value, found)?;
        let mut blob: SaveBlob = serde_json::from_value(value)
            .map_err(|err| SaveError::Malformed(err.to_string()))?;
        if blob.header.content_version != content.content_version {
            return Err(SaveError::ContentMismatch {
                expected: content.content_version.clone(),
                found: blob.header.content_version.clone(),
            });
        }
        blob.state.content = content;
        if blob.rng_state.state != blob.state.rng.state() {
            return Err(SaveError::Malformed(
                "rng_state disagrees with the embedded state".to_string(),
            ));
        }
        if let Some(checksum) = &blob.checksum {
            if *checksum != hash_state(&blob.state) {
                return Err(SaveError::ChecksumMismatch);
            }
        }
        Ok(blob)
    }
}

/// Lift an older blob to the current layout, one version at a time. No
/// historical versions exist yet; anything below 1 never shipped.
fn migrate(_value: &mut Value, from: u32) -> Result<(), SaveError> {
    if from < SAVE_VERSION {
        return Err(SaveError::Malformed(format!(
            "no migration from save version {from}"
        )));
    }
    Ok(())
}

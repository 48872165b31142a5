//! Core rules engine for Fool's Gambit. Keep this crate free of IO and
//! platform concerns: no filesystem, no clock, no randomness beyond the
//! run's own xorshift32 stream.

pub mod actions;
pub mod api;
pub mod cards;
pub mod content;
pub mod error;
pub mod events;
pub mod hash;
mod majors;
pub mod replay;
pub mod rng;
pub mod rules;
mod run;
pub mod save;
pub mod state;

pub use actions::*;
pub use cards::*;
pub use content::*;
pub use error::EngineError;
pub use events::*;
pub use rng::*;
pub use rules::*;
pub use state::*;

pub use api::{apply_action, create_run, hash_state, legal_actions, load_content, loaded_content, replay_log};
pub use replay::{replay, verify_checkpoints, ActionLog, Checkpoint, LogHeader};
pub use save::{SaveBlob, SaveError, SAVE_VERSION};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const SPEC_VERSION: &str = "v1.1";

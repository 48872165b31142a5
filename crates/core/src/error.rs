use crate::content::ContentError;
use thiserror::Error;

/// Everything an engine entry point can refuse with. Illegal actions are
/// recoverable and leave the state untouched; the rest indicate corrupted
/// content, corrupted saves, or engine bugs and should abort the run.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid content: {0}")]
    ContentInvalid(#[from] ContentError),
    #[error("content bundle not loaded")]
    ContentNotLoaded,
    #[error("illegal action: {0}")]
    IllegalAction(String),
    #[error("draw from an exhausted deck")]
    DeckExhausted,
    #[error("action does not match the pending prompt")]
    PromptMismatch,
}

pub(crate) fn illegal(reason: impl Into<String>) -> EngineError {
    EngineError::IllegalAction(reason.into())
}

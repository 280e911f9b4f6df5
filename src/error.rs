//! Error types for flow-interact

use thiserror::Error;

/// Errors that can occur while resolving or routing an interaction.
///
/// Every variant is local and non-fatal: handlers log, abort the single
/// operation, and leave the page fully interactive for the next signal.
#[derive(Debug, Error)]
pub enum InteractError {
    #[error("Scroll target not found: {0}")]
    TargetNotFound(String),

    #[error("Invalid signal payload: {0}")]
    InvalidSignal(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}

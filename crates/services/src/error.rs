//! Shared error types for the services crate.

use thiserror::Error;

use brain_core::model::{RoundId, SessionSummaryError};
use storage::repository::StorageError;

/// Errors emitted by challenge sessions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("session is already running")]
    AlreadyActive,
    #[error("session is not active")]
    NotActive,
    #[error("answer for round {submitted} arrived after round {current} began")]
    StaleRound { submitted: RoundId, current: RoundId },
    #[error("input is locked while the sequence is shown")]
    InputLocked,
    #[error(transparent)]
    Summary(#[from] SessionSummaryError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

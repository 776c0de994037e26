use brain_core::model::{Feedback, RoundId, SessionStatus};
use serde::Serialize;

/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionProgress {
    pub status: SessionStatus,
    pub round: RoundId,
    pub score: u32,
    pub streak: u32,
    pub best_streak: u32,
    pub level: u32,
    pub lives: Option<u32>,
    pub elapsed_ms: u64,
    /// `None` when the session runs on a stopwatch.
    pub remaining_ms: Option<u64>,
    pub round_remaining_ms: Option<u64>,
    pub accuracy_percent: u32,
    pub input_locked: bool,
}

/// Result of one handled submission or round timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnswerResult {
    pub feedback: Feedback,
    pub points: u32,
    /// The round open after this result; unchanged when the problem is kept.
    pub round: RoundId,
    pub ended: bool,
}

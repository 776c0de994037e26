use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{ChallengeKind, RecordKind, STARTING_LEVEL};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionSummaryError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("correct answers ({correct}) exceed answered ({answered})")]
    CountMismatch { answered: u32, correct: u32 },
}

/// Lifecycle of one challenge session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Idle,
    Active,
    Ended,
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// The countdown reached zero.
    TimeUp,
    /// All lives were lost.
    OutOfLives,
    /// A single miss ends the run (memory and pattern challenges).
    Mistake,
    /// The challenge was finished (e.g. all numbers tapped).
    Finished,
    /// The player stopped the session.
    Stopped,
}

impl EndReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EndReason::TimeUp => "time_up",
            EndReason::OutOfLives => "out_of_lives",
            EndReason::Mistake => "mistake",
            EndReason::Finished => "finished",
            EndReason::Stopped => "stopped",
        }
    }
}

/// Result reported by the completion dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    NewRecord,
    Completed,
    /// Stopped by the player; the best record is left untouched.
    Abandoned,
}

impl Outcome {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::NewRecord => "new_record",
            Outcome::Completed => "completed",
            Outcome::Abandoned => "abandoned",
        }
    }
}

/// The single feedback signal emitted for each handled input or round timeout.
///
/// Presentation layers map it to haptics or sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feedback {
    Success,
    Error,
    /// A correct step inside a multi-step answer (a tap in a sequence).
    Step,
    /// A round ran out of time.
    Warning,
}

/// Running counters of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionStats {
    pub score: u32,
    pub streak: u32,
    pub best_streak: u32,
    pub level: u32,
    pub answered: u32,
    pub correct: u32,
    pub elapsed_ms: u64,
    pub reaction_total_ms: u64,
    pub reactions: u32,
}

impl SessionStats {
    /// Counters for a freshly started session.
    #[must_use]
    pub fn fresh() -> Self {
        Self {
            level: STARTING_LEVEL,
            ..Self::default()
        }
    }

    /// Percentage of answered problems that were correct; 100 before any answer.
    #[must_use]
    pub fn accuracy_percent(&self) -> u32 {
        if self.answered == 0 {
            return 100;
        }
        let pct = f64::from(self.correct) * 100.0 / f64::from(self.answered);
        pct.round() as u32
    }

    #[must_use]
    pub fn average_reaction_ms(&self) -> Option<u64> {
        if self.reactions == 0 {
            None
        } else {
            Some(self.reaction_total_ms / u64::from(self.reactions))
        }
    }

    /// Value compared against the best record of the given kind.
    #[must_use]
    pub fn record_value(&self, kind: RecordKind) -> u64 {
        match kind {
            RecordKind::HighestScore => u64::from(self.score),
            RecordKind::HighestLevel => u64::from(self.level),
            RecordKind::HighestStreak => u64::from(self.best_streak),
            RecordKind::LowestTime | RecordKind::LongestTime => self.elapsed_ms,
        }
    }
}

/// Final report of one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    challenge: ChallengeKind,
    stats: SessionStats,
    reason: EndReason,
    outcome: Outcome,
    previous_best: Option<u64>,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
}

impl SessionSummary {
    /// Build a summary from the counters of a finished session.
    ///
    /// # Errors
    ///
    /// Returns `SessionSummaryError::InvalidTimeRange` if `completed_at` is before `started_at`.
    /// Returns `SessionSummaryError::CountMismatch` if more answers are correct than answered.
    pub fn from_stats(
        challenge: ChallengeKind,
        stats: SessionStats,
        reason: EndReason,
        outcome: Outcome,
        previous_best: Option<u64>,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, SessionSummaryError> {
        if completed_at < started_at {
            return Err(SessionSummaryError::InvalidTimeRange);
        }
        if stats.correct > stats.answered {
            return Err(SessionSummaryError::CountMismatch {
                answered: stats.answered,
                correct: stats.correct,
            });
        }

        Ok(Self {
            challenge,
            stats,
            reason,
            outcome,
            previous_best,
            started_at,
            completed_at,
        })
    }

    #[must_use]
    pub fn challenge(&self) -> ChallengeKind {
        self.challenge
    }

    #[must_use]
    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.stats.score
    }

    #[must_use]
    pub fn best_streak(&self) -> u32 {
        self.stats.best_streak
    }

    #[must_use]
    pub fn final_streak(&self) -> u32 {
        self.stats.streak
    }

    #[must_use]
    pub fn level(&self) -> u32 {
        self.stats.level
    }

    #[must_use]
    pub fn elapsed_ms(&self) -> u64 {
        self.stats.elapsed_ms
    }

    #[must_use]
    pub fn reason(&self) -> EndReason {
        self.reason
    }

    #[must_use]
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    #[must_use]
    pub fn is_new_record(&self) -> bool {
        self.outcome == Outcome::NewRecord
    }

    /// Best record value before this session finished.
    #[must_use]
    pub fn previous_best(&self) -> Option<u64> {
        self.previous_best
    }

    /// The value this session contributed to its record kind.
    #[must_use]
    pub fn record_value(&self) -> u64 {
        self.stats.record_value(self.challenge.record_kind())
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    #[test]
    fn summary_rejects_reversed_time_range() {
        let now = fixed_now();
        let err = SessionSummary::from_stats(
            ChallengeKind::MathSprint,
            SessionStats::fresh(),
            EndReason::TimeUp,
            Outcome::Completed,
            None,
            now,
            now - Duration::seconds(1),
        )
        .unwrap_err();
        assert_eq!(err, SessionSummaryError::InvalidTimeRange);
    }

    #[test]
    fn summary_rejects_more_correct_than_answered() {
        let now = fixed_now();
        let stats = SessionStats {
            answered: 2,
            correct: 3,
            ..SessionStats::fresh()
        };
        let err = SessionSummary::from_stats(
            ChallengeKind::MathSprint,
            stats,
            EndReason::TimeUp,
            Outcome::Completed,
            None,
            now,
            now,
        )
        .unwrap_err();
        assert!(matches!(err, SessionSummaryError::CountMismatch { .. }));
    }

    #[test]
    fn accuracy_rounds_like_the_zen_counter() {
        let stats = SessionStats {
            answered: 3,
            correct: 2,
            ..SessionStats::fresh()
        };
        assert_eq!(stats.accuracy_percent(), 67);
        assert_eq!(SessionStats::fresh().accuracy_percent(), 100);
    }

    #[test]
    fn record_value_follows_kind() {
        let stats = SessionStats {
            score: 40,
            best_streak: 7,
            level: 3,
            elapsed_ms: 12_340,
            ..SessionStats::fresh()
        };
        assert_eq!(stats.record_value(RecordKind::HighestScore), 40);
        assert_eq!(stats.record_value(RecordKind::HighestStreak), 7);
        assert_eq!(stats.record_value(RecordKind::HighestLevel), 3);
        assert_eq!(stats.record_value(RecordKind::LowestTime), 12_340);
    }
}

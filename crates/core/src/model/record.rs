use serde::{Deserialize, Serialize};

use crate::model::ChallengeKind;

/// Level every session starts on.
pub const STARTING_LEVEL: u32 = 1;

/// What a challenge's best record measures and which direction counts as better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    HighestScore,
    HighestLevel,
    HighestStreak,
    /// Fastest completion, in milliseconds.
    LowestTime,
    /// Longest survival, in milliseconds.
    LongestTime,
}

impl RecordKind {
    /// Whether `candidate` beats `current`.
    ///
    /// "Highest" kinds compare against an implicit baseline: zero, or the
    /// starting level for `HighestLevel`. A run that never gets past the start
    /// never counts as a record. `LowestTime` has no baseline: the first
    /// completion always sets the record.
    #[must_use]
    pub fn improves(self, candidate: u64, current: Option<u64>) -> bool {
        match self {
            RecordKind::LowestTime => current.is_none_or(|best| candidate < best),
            RecordKind::HighestLevel => candidate > current.unwrap_or(u64::from(STARTING_LEVEL)),
            RecordKind::HighestScore | RecordKind::HighestStreak | RecordKind::LongestTime => {
                candidate > current.unwrap_or(0)
            }
        }
    }

    #[must_use]
    pub fn is_time(self) -> bool {
        matches!(self, RecordKind::LowestTime | RecordKind::LongestTime)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::HighestScore => "highest_score",
            RecordKind::HighestLevel => "highest_level",
            RecordKind::HighestStreak => "highest_streak",
            RecordKind::LowestTime => "lowest_time",
            RecordKind::LongestTime => "longest_time",
        }
    }
}

/// Best result seen for one challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestRecord {
    challenge: ChallengeKind,
    kind: RecordKind,
    value: Option<u64>,
}

impl BestRecord {
    /// An empty record for `challenge`.
    #[must_use]
    pub fn new(challenge: ChallengeKind) -> Self {
        Self {
            challenge,
            kind: challenge.record_kind(),
            value: None,
        }
    }

    /// Rehydrate a record from storage.
    #[must_use]
    pub fn from_persisted(challenge: ChallengeKind, value: Option<u64>) -> Self {
        Self {
            value,
            ..Self::new(challenge)
        }
    }

    #[must_use]
    pub fn challenge(&self) -> ChallengeKind {
        self.challenge
    }

    #[must_use]
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    #[must_use]
    pub fn value(&self) -> Option<u64> {
        self.value
    }

    /// Offer a finished session's value; keeps it and returns `true` when it is better.
    pub fn offer(&mut self, candidate: u64) -> bool {
        if self.kind.improves(candidate, self.value) {
            self.value = Some(candidate);
            true
        } else {
            false
        }
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Smallest and largest multiplication table offered by Math Facts.
pub const TABLE_RANGE: std::ops::RangeInclusive<u32> = 2..=12;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),
    #[error("multiplication table {0} is outside 2..=12")]
    TableOutOfRange(u32),
}

/// Difficulty tier chosen before a session starts (Division Master).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(SettingsError::UnknownDifficulty(s.to_string())),
        }
    }
}

/// Per-challenge options picked on the start screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeSettings {
    difficulty: Difficulty,
    table: u32,
}

/// Unvalidated settings as they arrive from flags or environment.
#[derive(Clone, Debug, Default)]
pub struct ChallengeSettingsDraft {
    pub difficulty: Option<String>,
    pub table: Option<u32>,
}

impl ChallengeSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and normalize the draft.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the difficulty is unknown or the table is out of range.
    pub fn validate(self) -> Result<ChallengeSettings, SettingsError> {
        let difficulty = match normalize_optional(self.difficulty) {
            Some(raw) => raw.parse()?,
            None => Difficulty::default(),
        };
        let table = self.table.unwrap_or(*TABLE_RANGE.start());
        if !TABLE_RANGE.contains(&table) {
            return Err(SettingsError::TableOutOfRange(table));
        }

        Ok(ChallengeSettings { difficulty, table })
    }
}

impl ChallengeSettings {
    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Multiplication table drilled by Math Facts.
    #[must_use]
    pub fn table(&self) -> u32 {
        self.table
    }
}

impl Default for ChallengeSettings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            table: *TABLE_RANGE.start(),
        }
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

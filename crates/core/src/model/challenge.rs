use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::RecordKind;

/// Error returned when a challenge id does not name a known challenge.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown challenge: {raw}")]
pub struct ParseChallengeError {
    raw: String,
}

/// Dashboard grouping for challenges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Speed,
    Memory,
    Logic,
    Math,
    Advanced,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Speed,
        Category::Memory,
        Category::Logic,
        Category::Math,
        Category::Advanced,
    ];

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Category::Speed => "Reflex & Speed",
            Category::Memory => "Memory",
            Category::Logic => "Logic & Patterns",
            Category::Math => "Math & Calculation",
            Category::Advanced => "Advanced & Endless",
        }
    }
}

/// The closed set of challenges offered on the dashboard.
///
/// The serialized form is the stable challenge id (`numberTap`, `mathSprint`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChallengeKind {
    NumberTap,
    MathSprint,
    ReflexRush,
    MemoryMatrix,
    MemoryNumbers,
    PatternMatch,
    PatternPath,
    SequenceMaster,
    PrimeHunter,
    DivisionChallenge,
    MentalArithmetic,
    MathFactMaster,
    InfiniteMathZen,
    MathStream,
}

impl ChallengeKind {
    /// All challenges in dashboard order.
    pub const ALL: [ChallengeKind; 14] = [
        ChallengeKind::NumberTap,
        ChallengeKind::MathSprint,
        ChallengeKind::ReflexRush,
        ChallengeKind::MemoryMatrix,
        ChallengeKind::MemoryNumbers,
        ChallengeKind::PatternMatch,
        ChallengeKind::PatternPath,
        ChallengeKind::SequenceMaster,
        ChallengeKind::PrimeHunter,
        ChallengeKind::DivisionChallenge,
        ChallengeKind::MentalArithmetic,
        ChallengeKind::MathFactMaster,
        ChallengeKind::InfiniteMathZen,
        ChallengeKind::MathStream,
    ];

    /// Stable identifier used by the router and by storage.
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            ChallengeKind::NumberTap => "numberTap",
            ChallengeKind::MathSprint => "mathSprint",
            ChallengeKind::ReflexRush => "reflexRush",
            ChallengeKind::MemoryMatrix => "memoryMatrix",
            ChallengeKind::MemoryNumbers => "memoryNumbers",
            ChallengeKind::PatternMatch => "patternMatch",
            ChallengeKind::PatternPath => "patternPath",
            ChallengeKind::SequenceMaster => "sequenceMaster",
            ChallengeKind::PrimeHunter => "primeHunter",
            ChallengeKind::DivisionChallenge => "divisionChallenge",
            ChallengeKind::MentalArithmetic => "mentalArithmetic",
            ChallengeKind::MathFactMaster => "mathFactMaster",
            ChallengeKind::InfiniteMathZen => "infiniteMathZen",
            ChallengeKind::MathStream => "mathStream",
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ChallengeKind::NumberTap => "Number Tap",
            ChallengeKind::MathSprint => "Math Sprint",
            ChallengeKind::ReflexRush => "Reflex Rush",
            ChallengeKind::MemoryMatrix => "Memory Matrix",
            ChallengeKind::MemoryNumbers => "Memory Numbers",
            ChallengeKind::PatternMatch => "Pattern Match",
            ChallengeKind::PatternPath => "Pattern Path",
            ChallengeKind::SequenceMaster => "Sequence Master",
            ChallengeKind::PrimeHunter => "Prime Hunter",
            ChallengeKind::DivisionChallenge => "Division Master",
            ChallengeKind::MentalArithmetic => "Mental Arithmetic",
            ChallengeKind::MathFactMaster => "Math Facts",
            ChallengeKind::InfiniteMathZen => "Math Zen",
            ChallengeKind::MathStream => "Math Stream",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            ChallengeKind::NumberTap => "Tap numbers 1-25 in order",
            ChallengeKind::MathSprint => "Quick mental calculations",
            ChallengeKind::ReflexRush => "React to colors & shapes",
            ChallengeKind::MemoryMatrix => "Remember tile patterns",
            ChallengeKind::MemoryNumbers => "Remember sequences",
            ChallengeKind::PatternMatch => "Find the pattern",
            ChallengeKind::PatternPath => "Complete visual patterns",
            ChallengeKind::SequenceMaster => "Identify number patterns",
            ChallengeKind::PrimeHunter => "Find prime numbers",
            ChallengeKind::DivisionChallenge => "Division practice",
            ChallengeKind::MentalArithmetic => "Mixed operations",
            ChallengeKind::MathFactMaster => "Master basic facts",
            ChallengeKind::InfiniteMathZen => "Relaxing endless math",
            ChallengeKind::MathStream => "Endless math challenge",
        }
    }

    #[must_use]
    pub fn category(self) -> Category {
        match self {
            ChallengeKind::NumberTap | ChallengeKind::MathSprint | ChallengeKind::ReflexRush => {
                Category::Speed
            }
            ChallengeKind::MemoryMatrix | ChallengeKind::MemoryNumbers => Category::Memory,
            ChallengeKind::PatternMatch
            | ChallengeKind::PatternPath
            | ChallengeKind::SequenceMaster => Category::Logic,
            ChallengeKind::PrimeHunter
            | ChallengeKind::DivisionChallenge
            | ChallengeKind::MentalArithmetic
            | ChallengeKind::MathFactMaster => Category::Math,
            ChallengeKind::InfiniteMathZen | ChallengeKind::MathStream => Category::Advanced,
        }
    }

    /// Which measurement the best record for this challenge tracks.
    #[must_use]
    pub fn record_kind(self) -> RecordKind {
        match self {
            ChallengeKind::NumberTap => RecordKind::LowestTime,
            ChallengeKind::MemoryNumbers => RecordKind::HighestLevel,
            ChallengeKind::InfiniteMathZen => RecordKind::HighestStreak,
            ChallengeKind::MathStream => RecordKind::LongestTime,
            _ => RecordKind::HighestScore,
        }
    }

    /// Challenges belonging to `category`, in dashboard order.
    pub fn in_category(category: Category) -> impl Iterator<Item = ChallengeKind> {
        Self::ALL
            .into_iter()
            .filter(move |kind| kind.category() == category)
    }
}

impl fmt::Display for ChallengeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ChallengeKind {
    type Err = ParseChallengeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.id().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseChallengeError {
                raw: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_through_from_str() {
        for kind in ChallengeKind::ALL {
            assert_eq!(kind.id().parse::<ChallengeKind>().unwrap(), kind);
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(
            "MATHSTREAM".parse::<ChallengeKind>().unwrap(),
            ChallengeKind::MathStream
        );
        assert!("tetris".parse::<ChallengeKind>().is_err());
    }

    #[test]
    fn every_category_has_challenges() {
        let total: usize = Category::ALL
            .into_iter()
            .map(|c| ChallengeKind::in_category(c).count())
            .sum();
        assert_eq!(total, ChallengeKind::ALL.len());
        assert_eq!(ChallengeKind::in_category(Category::Math).count(), 4);
    }
}

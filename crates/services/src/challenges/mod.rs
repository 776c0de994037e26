//! Rule sets for the fourteen challenges, grouped by dashboard category.

mod advanced;
mod logic;
mod math;
mod memory;
mod speed;

pub use advanced::{MathStreamRules, MathZenRules, StreamProblem};
pub use logic::{PatternMatchRules, PatternPathRules, SequenceMasterRules};
pub use math::{DivisionRules, MathFactsRules, MentalArithmeticRules, PrimeHunterRules};
pub use memory::MemoryRules;
pub use speed::{MathSprintRules, NumberTapRules, ReflexRushRules, TapRound};

use brain_core::problem::OptionSet;
use std::fmt;

const CHOICE_LABELS: [char; 4] = ['A', 'B', 'C', 'D'];

/// A whole number typed by the player.
pub(crate) fn parse_number(input: &str) -> Option<i64> {
    input.trim().parse().ok()
}

/// An option letter `a`..`d`, case-insensitive, mapped to its index.
pub(crate) fn parse_choice<T: Clone + PartialEq>(options: &OptionSet<T>, input: &str) -> Option<usize> {
    let mut chars = input.trim().chars();
    let (Some(letter), None) = (chars.next(), chars.next()) else {
        return None;
    };
    let letter = letter.to_ascii_uppercase();
    CHOICE_LABELS
        .iter()
        .position(|label| *label == letter)
        .filter(|index| *index < options.options().len())
}

/// `A) 12   B) 16   C) 14   D) 18`
pub(crate) fn render_options<T: fmt::Display + Clone + PartialEq>(options: &OptionSet<T>) -> String {
    options
        .options()
        .iter()
        .zip(CHOICE_LABELS)
        .map(|(option, label)| format!("{label}) {option}"))
        .collect::<Vec<_>>()
        .join("   ")
}

#[cfg(test)]
pub(crate) mod testing {
    use brain_core::time::fixed_clock;
    use crate::engine::ChallengeRules;
    use crate::sessions::ChallengeSession;

    pub(crate) fn seeded<R: ChallengeRules>(rules: R) -> ChallengeSession<R> {
        ChallengeSession::with_seed(rules, 11).with_clock(fixed_clock())
    }

    /// Tick until the session leaves its reveal phase.
    pub(crate) fn unlock<R: ChallengeRules>(session: &mut ChallengeSession<R>) {
        while session.is_input_locked() {
            session.tick(session.tick_ms()).unwrap();
        }
    }
}

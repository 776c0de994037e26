use brain_core::model::{ChallengeKind, EndReason};
use brain_core::problem::memory::MATRIX_TILES;
use brain_core::problem::{RecallKind, RecallSequence};
use brain_core::scoring::{ScoreContext, ScoringPolicy};
use brain_core::time::ClockSpec;
use rand::Rng;

use crate::engine::{ChallengeRules, Judgement, RoundState};

/// Memory Matrix (tiles) and Memory Numbers (digits).
///
/// Each round shows a sequence, locks input while it is on screen, then collects
/// taps. Taps may arrive one at a time or several at once; a wrong tap ends the run.
#[derive(Debug)]
pub struct MemoryRules {
    kind: RecallKind,
    entered: Vec<u8>,
}

impl MemoryRules {
    #[must_use]
    pub fn matrix() -> Self {
        Self {
            kind: RecallKind::Tiles,
            entered: Vec::new(),
        }
    }

    #[must_use]
    pub fn numbers() -> Self {
        Self {
            kind: RecallKind::Digits,
            entered: Vec::new(),
        }
    }

    #[must_use]
    pub fn entered(&self) -> &[u8] {
        &self.entered
    }

    fn scoring(&self) -> ScoringPolicy {
        match self.kind {
            RecallKind::Tiles => ScoringPolicy::PerLevel(10),
            RecallKind::Digits => ScoringPolicy::Flat(1),
        }
    }
}

impl ChallengeRules for MemoryRules {
    type Problem = RecallSequence;
    type Answer = Vec<u8>;

    fn kind(&self) -> ChallengeKind {
        match self.kind {
            RecallKind::Tiles => ChallengeKind::MemoryMatrix,
            RecallKind::Digits => ChallengeKind::MemoryNumbers,
        }
    }

    fn clock(&self) -> ClockSpec {
        ClockSpec::Stopwatch
    }

    fn tick_ms(&self) -> u64 {
        100
    }

    fn reset(&mut self) {
        self.entered.clear();
    }

    fn generate<G: Rng + ?Sized>(&mut self, state: &RoundState, rng: &mut G) -> RecallSequence {
        self.entered.clear();
        match self.kind {
            RecallKind::Tiles => RecallSequence::tiles(state.level, rng),
            RecallKind::Digits => RecallSequence::digits(state.level, rng),
        }
    }

    /// Digits `1`..`9`; spaces and commas are skipped. Tiles are typed by their
    /// 1-based grid label.
    fn parse_answer(&self, _problem: &RecallSequence, input: &str) -> Option<Vec<u8>> {
        let mut taps = Vec::new();
        for c in input.chars().filter(|c| !c.is_whitespace() && *c != ',') {
            let digit = c.to_digit(10).filter(|d| (1..=9).contains(d))?;
            let digit = u8::try_from(digit).ok()?;
            taps.push(match self.kind {
                RecallKind::Tiles => digit - 1,
                RecallKind::Digits => digit,
            });
        }
        (!taps.is_empty()).then_some(taps)
    }

    fn judge(&mut self, problem: &RecallSequence, answer: Vec<u8>, state: &RoundState) -> Judgement {
        for tap in answer {
            self.entered.push(tap);
            if !problem.matches_prefix(&self.entered) {
                return Judgement::wrong().ending(EndReason::Mistake);
            }
            if self.entered.len() == problem.len() {
                // extra taps past a completed sequence are dropped
                let points = self.scoring().points(&ScoreContext {
                    level: state.level,
                    ..ScoreContext::default()
                });
                return Judgement::correct(points).leveling_up();
            }
        }
        Judgement::step()
    }

    fn reveal_ms(&self, problem: &RecallSequence) -> u64 {
        problem.reveal_ms()
    }

    fn describe(&self, problem: &RecallSequence, state: &RoundState) -> String {
        if state.round_elapsed_ms < problem.reveal_ms() {
            return match self.kind {
                RecallKind::Tiles => format!(
                    "Level {}: remember the tiles {problem} (grid 1-{MATRIX_TILES})",
                    state.level
                ),
                RecallKind::Digits => format!("Level {}: remember {problem}", state.level),
            };
        }
        format!(
            "Level {}: repeat the sequence ({}/{})",
            state.level,
            self.entered.len(),
            problem.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenges::testing::{seeded, unlock};
    use brain_core::model::{Feedback, Outcome};

    fn typed(problem: &RecallSequence, kind: RecallKind) -> Vec<String> {
        problem
            .items()
            .iter()
            .map(|item| match kind {
                RecallKind::Tiles => (item + 1).to_string(),
                RecallKind::Digits => item.to_string(),
            })
            .collect()
    }

    #[test]
    fn input_is_locked_during_the_reveal() {
        let mut s = seeded(MemoryRules::numbers());
        s.start().unwrap();
        assert_eq!(s.problem().unwrap().len(), 3);
        assert!(s.prompt().unwrap().contains("remember"));
        assert!(matches!(
            s.submit_text("1"),
            Err(crate::SessionError::InputLocked)
        ));
        unlock(&mut s);
        assert!(s.prompt().unwrap().contains("repeat"));
    }

    #[test]
    fn taps_step_then_complete_and_level_up() {
        let mut s = seeded(MemoryRules::matrix());
        s.start().unwrap();
        unlock(&mut s);
        let taps = typed(s.problem().unwrap(), RecallKind::Tiles);
        for (i, tap) in taps.iter().enumerate() {
            let result = s.submit_text(tap).unwrap().unwrap();
            let expected = if i + 1 == taps.len() {
                Feedback::Success
            } else {
                Feedback::Step
            };
            assert_eq!(result.feedback, expected);
        }
        assert_eq!(s.stats().score, 10);
        assert_eq!(s.stats().level, 2);
        assert_eq!(s.problem().unwrap().len(), 4);
        assert!(s.rules().entered().is_empty());
    }

    #[test]
    fn whole_sequence_at_once_and_a_mistake_ends_the_run() {
        let mut s = seeded(MemoryRules::numbers());
        s.start().unwrap();
        unlock(&mut s);
        let line = typed(s.problem().unwrap(), RecallKind::Digits).join(" ");
        assert_eq!(s.submit_text(&line).unwrap().unwrap().feedback, Feedback::Success);

        unlock(&mut s);
        let first = s.problem().unwrap().items()[0];
        let wrong = if first == 9 { 1 } else { first + 1 };
        let result = s.submit_text(&wrong.to_string()).unwrap().unwrap();
        assert_eq!(result.feedback, Feedback::Error);
        assert!(result.ended);

        let summary = s.summary().unwrap();
        assert_eq!(summary.reason(), EndReason::Mistake);
        assert_eq!(summary.level(), 2);
        assert_eq!(summary.outcome(), Outcome::NewRecord);
    }

    #[test]
    fn failing_the_first_level_sets_no_record() {
        let mut s = seeded(MemoryRules::numbers());
        s.start().unwrap();
        unlock(&mut s);
        let first = s.problem().unwrap().items()[0];
        let wrong = if first == 9 { 1 } else { first + 1 };
        assert!(s.submit_text(&wrong.to_string()).unwrap().unwrap().ended);

        let summary = s.summary().unwrap();
        assert_eq!(summary.level(), 1);
        assert_eq!(summary.outcome(), Outcome::Completed);
        assert_eq!(s.best_record().value(), None);
    }

    #[test]
    fn rejects_non_digits() {
        let rules = MemoryRules::matrix();
        let problem = RecallSequence::tiles(1, &mut rand::rng());
        assert_eq!(rules.parse_answer(&problem, "1, 5 9"), Some(vec![0, 4, 8]));
        assert_eq!(rules.parse_answer(&problem, "0"), None);
        assert_eq!(rules.parse_answer(&problem, "x"), None);
    }
}

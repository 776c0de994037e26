use brain_core::model::{ChallengeKind, EndReason};
use brain_core::problem::{BinaryProblem, arithmetic};
use brain_core::scoring::{DifficultyLadder, StreamTier, zen_level};
use brain_core::time::ClockSpec;
use rand::Rng;

use super::parse_number;
use crate::engine::{ChallengeRules, Judgement, RoundState};

// ─── Math Zen ───────────────────────────────────────────────────────────────

/// Endless, untimed arithmetic. A miss only resets the streak and moves on;
/// the record is the best streak of the run.
#[derive(Debug, Clone, Copy, Default)]
pub struct MathZenRules;

impl ChallengeRules for MathZenRules {
    type Problem = BinaryProblem;
    type Answer = i64;

    fn kind(&self) -> ChallengeKind {
        ChallengeKind::InfiniteMathZen
    }

    fn clock(&self) -> ClockSpec {
        ClockSpec::Stopwatch
    }

    fn tick_ms(&self) -> u64 {
        1_000
    }

    fn generate<G: Rng + ?Sized>(&mut self, state: &RoundState, rng: &mut G) -> BinaryProblem {
        arithmetic::zen(zen_level(state.streak), rng)
    }

    fn parse_answer(&self, _problem: &BinaryProblem, input: &str) -> Option<i64> {
        parse_number(input)
    }

    fn judge(&mut self, problem: &BinaryProblem, answer: i64, _state: &RoundState) -> Judgement {
        if answer == problem.answer() {
            Judgement::correct(1)
        } else {
            Judgement::wrong().advancing()
        }
    }

    fn stop_reason(&self) -> EndReason {
        EndReason::Finished
    }

    fn describe(&self, problem: &BinaryProblem, state: &RoundState) -> String {
        format!("[level {}] {problem} = ?", zen_level(state.streak))
    }
}

// ─── Math Stream ────────────────────────────────────────────────────────────

const STREAM_LIVES: u32 = 3;

/// A stream problem with the tier and deadline it was dealt with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamProblem {
    pub problem: BinaryProblem,
    pub tier: StreamTier,
    pub limit_ms: u64,
}

/// Survive as long as possible: three lives, a per-problem deadline and a tier
/// that climbs with the streak.
#[derive(Debug, Default)]
pub struct MathStreamRules {
    ladder: DifficultyLadder,
}

impl MathStreamRules {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn tier(&self) -> StreamTier {
        self.ladder.tier()
    }

    fn miss(&mut self, state: &RoundState, judgement: Judgement) -> Judgement {
        self.ladder.on_miss(state.lives.unwrap_or(0));
        judgement.losing_life()
    }
}

impl ChallengeRules for MathStreamRules {
    type Problem = StreamProblem;
    type Answer = i64;

    fn kind(&self) -> ChallengeKind {
        ChallengeKind::MathStream
    }

    fn clock(&self) -> ClockSpec {
        ClockSpec::Stopwatch
    }

    fn tick_ms(&self) -> u64 {
        100
    }

    fn starting_lives(&self) -> Option<u32> {
        Some(STREAM_LIVES)
    }

    fn reset(&mut self) {
        self.ladder.reset();
    }

    fn generate<G: Rng + ?Sized>(&mut self, state: &RoundState, rng: &mut G) -> StreamProblem {
        let tier = self.ladder.tier();
        StreamProblem {
            problem: arithmetic::stream(tier, rng),
            tier,
            limit_ms: tier.problem_limit_ms(state.streak),
        }
    }

    fn parse_answer(&self, _problem: &StreamProblem, input: &str) -> Option<i64> {
        parse_number(input)
    }

    fn judge(&mut self, problem: &StreamProblem, answer: i64, state: &RoundState) -> Judgement {
        if answer == problem.problem.answer() {
            let points = problem.tier.points(state.streak);
            self.ladder.on_correct(state.streak);
            Judgement::correct(points)
        } else {
            self.miss(state, Judgement::wrong())
        }
    }

    fn round_limit_ms(&self, problem: &StreamProblem) -> Option<u64> {
        Some(problem.limit_ms)
    }

    fn on_round_timeout(&mut self, state: &RoundState) -> Judgement {
        self.miss(state, Judgement::timeout())
    }

    fn describe(&self, problem: &StreamProblem, state: &RoundState) -> String {
        let lives = state.lives.unwrap_or(0) as usize;
        format!(
            "{} [{}] {} = ?",
            "♥".repeat(lives),
            problem.tier.as_str(),
            problem.problem
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenges::testing::seeded;
    use crate::sessions::TickOutcome;
    use brain_core::model::{Feedback, Outcome, RecordKind};

    #[test]
    fn zen_moves_on_after_a_miss_and_records_best_streak() {
        let mut s = seeded(MathZenRules);
        s.start().unwrap();
        for _ in 0..4 {
            let answer = s.problem().unwrap().answer();
            s.submit_text(&answer.to_string()).unwrap();
        }
        let round = s.round_id().unwrap();
        let answer = s.problem().unwrap().answer();
        let result = s.submit_text(&(answer + 1).to_string()).unwrap().unwrap();
        assert_eq!(result.feedback, Feedback::Error);
        assert!(result.round > round);
        assert_eq!(s.stats().streak, 0);

        s.stop().unwrap();
        let summary = s.summary().unwrap();
        assert_eq!(summary.reason(), EndReason::Finished);
        assert_eq!(summary.outcome(), Outcome::NewRecord);
        assert_eq!(s.best_record().kind(), RecordKind::HighestStreak);
        assert_eq!(s.best_record().value(), Some(4));
    }

    #[test]
    fn stream_climbs_tiers_with_the_streak() {
        let mut s = seeded(MathStreamRules::new());
        s.start().unwrap();
        let mut points = Vec::new();
        for _ in 0..12 {
            let answer = s.problem().unwrap().problem.answer();
            points.push(s.submit_text(&answer.to_string()).unwrap().unwrap().points);
        }
        assert_eq!(points[0], 1);
        assert_eq!(points[5], 2);
        // streak 11 on a medium problem: 2 + 11 / 5
        assert_eq!(points[11], 4);
        assert_eq!(s.rules().tier(), StreamTier::Medium);
        assert_eq!(s.problem().unwrap().tier, StreamTier::Medium);
    }

    #[test]
    fn stream_miss_keeps_the_problem_and_costs_a_life() {
        let mut s = seeded(MathStreamRules::new());
        s.start().unwrap();
        let problem = *s.problem().unwrap();
        s.submit_text(&(problem.problem.answer() + 1).to_string()).unwrap();
        assert_eq!(s.lives(), Some(2));
        assert_eq!(s.problem(), Some(&problem));
    }

    #[test]
    fn stream_ends_when_timeouts_take_every_life() {
        let mut s = seeded(MathStreamRules::new());
        s.start().unwrap();
        let mut timeouts = 0;
        let mut last = TickOutcome::Running;
        while s.lives() != Some(0) {
            last = s.tick(100).unwrap();
            if let TickOutcome::RoundTimedOut(result) = last {
                assert_eq!(result.feedback, Feedback::Warning);
                timeouts += 1;
            }
        }
        assert_eq!(timeouts, 3);
        let TickOutcome::RoundTimedOut(result) = last else {
            panic!("expected the last timeout to end the run");
        };
        assert!(result.ended);
        let summary = s.summary().unwrap();
        assert_eq!(summary.reason(), EndReason::OutOfLives);
        // three easy problems at five seconds each
        assert_eq!(summary.elapsed_ms(), 15_000);
        assert_eq!(s.best_record().value(), Some(15_000));
        assert_eq!(s.tick(100).unwrap(), TickOutcome::Inactive);
    }
}

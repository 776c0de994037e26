use brain_core::model::{ChallengeKind, EndReason};
use brain_core::problem::{NumberSequence, TilePattern};
use brain_core::scoring::{ScoreContext, ScoringPolicy, StreakBonus};
use brain_core::time::ClockSpec;
use rand::Rng;

use super::{parse_choice, render_options};
use crate::engine::{ChallengeRules, Judgement, RoundState};

fn streak_points(policy: ScoringPolicy, state: &RoundState) -> u32 {
    policy.points(&ScoreContext {
        streak: state.streak,
        level: state.level,
        reaction_ms: state.round_elapsed_ms,
    })
}

// ─── Pattern Match ──────────────────────────────────────────────────────────

const PATTERN_MATCH_SCORING: ScoringPolicy = ScoringPolicy::Streak {
    base: 10,
    bonus: StreakBonus::new(2, 20),
};

/// Untimed number patterns; each solved pattern is a level, one miss ends the run.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternMatchRules;

impl ChallengeRules for PatternMatchRules {
    type Problem = NumberSequence;
    type Answer = usize;

    fn kind(&self) -> ChallengeKind {
        ChallengeKind::PatternMatch
    }

    fn clock(&self) -> ClockSpec {
        ClockSpec::Stopwatch
    }

    fn tick_ms(&self) -> u64 {
        100
    }

    fn generate<G: Rng + ?Sized>(&mut self, _state: &RoundState, rng: &mut G) -> NumberSequence {
        NumberSequence::pattern_match(rng)
    }

    fn parse_answer(&self, problem: &NumberSequence, input: &str) -> Option<usize> {
        parse_choice(problem.options(), input)
    }

    fn judge(&mut self, problem: &NumberSequence, answer: usize, state: &RoundState) -> Judgement {
        if problem.options().is_correct(answer) {
            Judgement::correct(streak_points(PATTERN_MATCH_SCORING, state)).leveling_up()
        } else {
            Judgement::wrong().ending(EndReason::Mistake)
        }
    }

    fn describe(&self, problem: &NumberSequence, state: &RoundState) -> String {
        format!(
            "Level {}: {problem}\n{}",
            state.level,
            render_options(problem.options())
        )
    }
}

// ─── Pattern Path ───────────────────────────────────────────────────────────

const PATTERN_PATH_LIMIT_MS: u64 = 45_000;
const PATTERN_PATH_PENALTY_MS: u64 = 3_000;
const PATTERN_PATH_SCORING: ScoringPolicy = ScoringPolicy::Streak {
    base: 15,
    bonus: StreakBonus::new(3, 30),
};

/// Complete visual tile patterns against the clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternPathRules;

impl ChallengeRules for PatternPathRules {
    type Problem = TilePattern;
    type Answer = usize;

    fn kind(&self) -> ChallengeKind {
        ChallengeKind::PatternPath
    }

    fn clock(&self) -> ClockSpec {
        ClockSpec::Countdown {
            limit_ms: PATTERN_PATH_LIMIT_MS,
        }
    }

    fn tick_ms(&self) -> u64 {
        50
    }

    fn generate<G: Rng + ?Sized>(&mut self, _state: &RoundState, rng: &mut G) -> TilePattern {
        TilePattern::generate(rng)
    }

    fn parse_answer(&self, problem: &TilePattern, input: &str) -> Option<usize> {
        parse_choice(problem.options(), input)
    }

    fn judge(&mut self, problem: &TilePattern, answer: usize, state: &RoundState) -> Judgement {
        if problem.options().is_correct(answer) {
            Judgement::correct(streak_points(PATTERN_PATH_SCORING, state))
        } else {
            Judgement::wrong().with_penalty(PATTERN_PATH_PENALTY_MS)
        }
    }

    fn describe(&self, problem: &TilePattern, _state: &RoundState) -> String {
        format!("{problem}\n{}", render_options(problem.options()))
    }
}

// ─── Sequence Master ────────────────────────────────────────────────────────

const SEQUENCE_LIMIT_MS: u64 = 60_000;
const SEQUENCE_PENALTY_MS: u64 = 2_000;
const SEQUENCE_SCORING: ScoringPolicy = ScoringPolicy::Streak {
    base: 10,
    bonus: StreakBonus::new(2, 20),
};

/// Name the next term of five kinds of number sequence.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceMasterRules;

impl ChallengeRules for SequenceMasterRules {
    type Problem = NumberSequence;
    type Answer = usize;

    fn kind(&self) -> ChallengeKind {
        ChallengeKind::SequenceMaster
    }

    fn clock(&self) -> ClockSpec {
        ClockSpec::Countdown {
            limit_ms: SEQUENCE_LIMIT_MS,
        }
    }

    fn tick_ms(&self) -> u64 {
        50
    }

    fn generate<G: Rng + ?Sized>(&mut self, _state: &RoundState, rng: &mut G) -> NumberSequence {
        NumberSequence::master(rng)
    }

    fn parse_answer(&self, problem: &NumberSequence, input: &str) -> Option<usize> {
        parse_choice(problem.options(), input)
    }

    fn judge(&mut self, problem: &NumberSequence, answer: usize, state: &RoundState) -> Judgement {
        if problem.options().is_correct(answer) {
            Judgement::correct(streak_points(SEQUENCE_SCORING, state))
        } else {
            Judgement::wrong().with_penalty(SEQUENCE_PENALTY_MS)
        }
    }

    fn describe(&self, problem: &NumberSequence, _state: &RoundState) -> String {
        format!(
            "{} sequence: {problem}\n{}",
            problem.kind().name(),
            render_options(problem.options())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenges::testing::seeded;
    use crate::sessions::ChallengeSession;
    use brain_core::model::Feedback;

    const LETTERS: [&str; 4] = ["a", "b", "c", "d"];

    fn answer_correctly<R>(s: &mut ChallengeSession<R>, correct: usize) -> u32
    where
        R: ChallengeRules<Answer = usize>,
    {
        let round = s.round_id().unwrap();
        s.submit(round, correct).unwrap().points
    }

    #[test]
    fn sequence_bonus_grows_and_caps() {
        let mut s = seeded(SequenceMasterRules);
        s.start().unwrap();
        let mut points = Vec::new();
        for _ in 0..13 {
            let correct = s.problem().unwrap().options().correct_index();
            points.push(answer_correctly(&mut s, correct));
        }
        assert_eq!(points[0], 10);
        assert_eq!(points[1], 12);
        // streak 12 before the answer: bonus capped at 20
        assert_eq!(points[12], 30);
    }

    #[test]
    fn pattern_path_miss_costs_three_seconds() {
        let mut s = seeded(PatternPathRules);
        s.start().unwrap();
        let correct = s.problem().unwrap().options().correct_index();
        let wrong = LETTERS[(correct + 1) % 4];
        let result = s.submit_text(wrong).unwrap().unwrap();
        assert_eq!(result.feedback, Feedback::Error);
        assert_eq!(s.game_clock().remaining_ms(), Some(42_000));
        assert_eq!(answer_correctly(&mut s, correct), 15);
    }

    #[test]
    fn pattern_match_levels_up_until_a_miss() {
        let mut s = seeded(PatternMatchRules);
        s.start().unwrap();
        for _ in 0..3 {
            let correct = s.problem().unwrap().options().correct_index();
            answer_correctly(&mut s, correct);
        }
        assert_eq!(s.stats().level, 4);
        assert_eq!(s.stats().score, 10 + 12 + 14);

        let correct = s.problem().unwrap().options().correct_index();
        let result = s.submit_text(LETTERS[(correct + 2) % 4]).unwrap().unwrap();
        assert!(result.ended);
        assert_eq!(s.summary().unwrap().reason(), EndReason::Mistake);
        assert_eq!(s.summary().unwrap().score(), 36);
    }
}

use brain_core::model::{ChallengeKind, EndReason};
use brain_core::problem::grid::TAP_COUNT;
use brain_core::problem::{BinaryProblem, Stimulus, TapGrid, arithmetic};
use brain_core::scoring::{ScoreContext, ScoringPolicy, StreakBonus};
use brain_core::time::ClockSpec;
use rand::Rng;

use super::{parse_choice, parse_number, render_options};
use crate::engine::{ChallengeRules, Judgement, RoundState};

// ─── Number Tap ─────────────────────────────────────────────────────────────

/// The grid together with the number that must be tapped next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TapRound {
    pub grid: TapGrid,
    pub next: u32,
}

/// Tap 1..=25 in order as fast as possible. The grid stays put for the whole run.
#[derive(Debug)]
pub struct NumberTapRules {
    grid: Option<TapGrid>,
    next: u32,
}

impl NumberTapRules {
    #[must_use]
    pub fn new() -> Self {
        Self { grid: None, next: 1 }
    }
}

impl Default for NumberTapRules {
    fn default() -> Self {
        Self::new()
    }
}

impl ChallengeRules for NumberTapRules {
    type Problem = TapRound;
    type Answer = u32;

    fn kind(&self) -> ChallengeKind {
        ChallengeKind::NumberTap
    }

    fn clock(&self) -> ClockSpec {
        ClockSpec::Stopwatch
    }

    fn tick_ms(&self) -> u64 {
        10
    }

    fn reset(&mut self) {
        self.grid = None;
        self.next = 1;
    }

    fn generate<G: Rng + ?Sized>(&mut self, _state: &RoundState, rng: &mut G) -> TapRound {
        let grid = self.grid.get_or_insert_with(|| TapGrid::generate(rng)).clone();
        TapRound {
            grid,
            next: self.next,
        }
    }

    fn parse_answer(&self, problem: &TapRound, input: &str) -> Option<u32> {
        let value = u32::try_from(parse_number(input)?).ok()?;
        problem.grid.contains(value).then_some(value)
    }

    fn judge(&mut self, problem: &TapRound, answer: u32, _state: &RoundState) -> Judgement {
        if answer != problem.next {
            return Judgement::wrong();
        }
        self.next = problem.next + 1;
        if answer == TAP_COUNT {
            Judgement::correct(1).ending(EndReason::Finished)
        } else {
            Judgement::correct(1)
        }
    }

    fn describe(&self, problem: &TapRound, _state: &RoundState) -> String {
        format!("{}\nTap {}", problem.grid.render(problem.next), problem.next)
    }
}

// ─── Math Sprint ────────────────────────────────────────────────────────────

const SPRINT_LIMIT_MS: u64 = 60_000;

/// One minute of quick arithmetic, one point per answer.
#[derive(Debug, Clone, Copy, Default)]
pub struct MathSprintRules;

impl ChallengeRules for MathSprintRules {
    type Problem = BinaryProblem;
    type Answer = i64;

    fn kind(&self) -> ChallengeKind {
        ChallengeKind::MathSprint
    }

    fn clock(&self) -> ClockSpec {
        ClockSpec::Countdown {
            limit_ms: SPRINT_LIMIT_MS,
        }
    }

    fn tick_ms(&self) -> u64 {
        1_000
    }

    fn generate<G: Rng + ?Sized>(&mut self, _state: &RoundState, rng: &mut G) -> BinaryProblem {
        arithmetic::sprint(rng)
    }

    fn parse_answer(&self, _problem: &BinaryProblem, input: &str) -> Option<i64> {
        parse_number(input)
    }

    fn judge(&mut self, problem: &BinaryProblem, answer: i64, _state: &RoundState) -> Judgement {
        if answer == problem.answer() {
            Judgement::correct(1)
        } else {
            Judgement::wrong()
        }
    }

    fn describe(&self, problem: &BinaryProblem, _state: &RoundState) -> String {
        format!("{problem} = ?")
    }
}

// ─── Reflex Rush ────────────────────────────────────────────────────────────

const REFLEX_LIMIT_MS: u64 = 30_000;
const REFLEX_MISS_PENALTY_MS: u64 = 2_000;
const REFLEX_SCORING: ScoringPolicy = ScoringPolicy::Reaction {
    max_points: 10,
    ms_per_point: 100,
    bonus: StreakBonus::new(2, 20),
};

/// Answer color, shape, word and math stimuli before each one times out.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReflexRushRules;

impl ChallengeRules for ReflexRushRules {
    type Problem = Stimulus;
    type Answer = usize;

    fn kind(&self) -> ChallengeKind {
        ChallengeKind::ReflexRush
    }

    fn clock(&self) -> ClockSpec {
        ClockSpec::Countdown {
            limit_ms: REFLEX_LIMIT_MS,
        }
    }

    fn tick_ms(&self) -> u64 {
        50
    }

    fn generate<G: Rng + ?Sized>(&mut self, state: &RoundState, rng: &mut G) -> Stimulus {
        Stimulus::generate(state.streak, rng)
    }

    fn parse_answer(&self, problem: &Stimulus, input: &str) -> Option<usize> {
        parse_choice(problem.options(), input)
    }

    fn judge(&mut self, problem: &Stimulus, answer: usize, state: &RoundState) -> Judgement {
        if problem.options().is_correct(answer) {
            Judgement::correct(REFLEX_SCORING.points(&ScoreContext {
                streak: state.streak,
                level: state.level,
                reaction_ms: state.round_elapsed_ms,
            }))
        } else {
            Judgement::wrong().with_penalty(REFLEX_MISS_PENALTY_MS)
        }
    }

    fn round_limit_ms(&self, problem: &Stimulus) -> Option<u64> {
        Some(problem.time_limit_ms())
    }

    fn describe(&self, problem: &Stimulus, _state: &RoundState) -> String {
        format!("{problem}\n{}", render_options(problem.options()))
    }
}

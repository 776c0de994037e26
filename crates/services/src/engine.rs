//! The strategy seam between the generic session and each challenge.

use brain_core::model::{ChallengeKind, EndReason, Feedback};
use brain_core::time::ClockSpec;
use rand::Rng;
use std::fmt;

/// Session counters a rule set may read when generating or judging a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoundState {
    pub score: u32,
    pub streak: u32,
    pub level: u32,
    pub lives: Option<u32>,
    /// Time spent on the current round so far.
    pub round_elapsed_ms: u64,
}

/// How an input or a round timeout was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    /// A correct part of a multi-part answer.
    Step,
    Wrong,
    Timeout,
}

impl Verdict {
    #[must_use]
    pub fn feedback(self) -> Feedback {
        match self {
            Verdict::Correct => Feedback::Success,
            Verdict::Step => Feedback::Step,
            Verdict::Wrong => Feedback::Error,
            Verdict::Timeout => Feedback::Warning,
        }
    }
}

/// Everything the session applies after a rule set has judged a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Judgement {
    verdict: Verdict,
    points: u32,
    penalty_ms: u64,
    lose_life: bool,
    advance: bool,
    reset_streak: bool,
    level_up: bool,
    end: Option<EndReason>,
}

impl Judgement {
    /// A correct answer worth `points`; the next round begins.
    #[must_use]
    pub fn correct(points: u32) -> Self {
        Self {
            verdict: Verdict::Correct,
            points,
            penalty_ms: 0,
            lose_life: false,
            advance: true,
            reset_streak: false,
            level_up: false,
            end: None,
        }
    }

    /// Partial progress; the round stays open.
    #[must_use]
    pub fn step() -> Self {
        Self {
            verdict: Verdict::Step,
            advance: false,
            ..Self::correct(0)
        }
    }

    /// A miss. Resets the streak and keeps the current problem.
    #[must_use]
    pub fn wrong() -> Self {
        Self {
            verdict: Verdict::Wrong,
            advance: false,
            reset_streak: true,
            ..Self::correct(0)
        }
    }

    /// The round ran out of time. Resets the streak and moves on.
    #[must_use]
    pub fn timeout() -> Self {
        Self {
            verdict: Verdict::Timeout,
            reset_streak: true,
            ..Self::correct(0)
        }
    }

    #[must_use]
    pub fn with_penalty(mut self, ms: u64) -> Self {
        self.penalty_ms = ms;
        self
    }

    #[must_use]
    pub fn losing_life(mut self) -> Self {
        self.lose_life = true;
        self
    }

    #[must_use]
    pub fn advancing(mut self) -> Self {
        self.advance = true;
        self
    }

    #[must_use]
    pub fn keeping_streak(mut self) -> Self {
        self.reset_streak = false;
        self
    }

    #[must_use]
    pub fn leveling_up(mut self) -> Self {
        self.level_up = true;
        self
    }

    #[must_use]
    pub fn ending(mut self, reason: EndReason) -> Self {
        self.end = Some(reason);
        self
    }

    #[must_use]
    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    #[must_use]
    pub fn points(&self) -> u32 {
        self.points
    }

    #[must_use]
    pub fn penalty_ms(&self) -> u64 {
        self.penalty_ms
    }

    #[must_use]
    pub fn loses_life(&self) -> bool {
        self.lose_life
    }

    #[must_use]
    pub fn advances(&self) -> bool {
        self.advance
    }

    #[must_use]
    pub fn resets_streak(&self) -> bool {
        self.reset_streak
    }

    #[must_use]
    pub fn levels_up(&self) -> bool {
        self.level_up
    }

    #[must_use]
    pub fn end(&self) -> Option<EndReason> {
        self.end
    }
}

/// One challenge's rules, plugged into [`crate::ChallengeSession`].
///
/// Rule sets may keep per-session state (the Number Tap cursor, the Math Stream
/// tier, the digits entered so far). [`ChallengeRules::reset`] is called on every
/// start so no state leaks between sessions.
pub trait ChallengeRules: Send {
    type Problem: Clone + fmt::Debug + Send;
    type Answer: Send;

    fn kind(&self) -> ChallengeKind;

    fn clock(&self) -> ClockSpec;

    /// Period of the session tick.
    fn tick_ms(&self) -> u64;

    fn starting_lives(&self) -> Option<u32> {
        None
    }

    fn reset(&mut self) {}

    fn generate<G: Rng + ?Sized>(&mut self, state: &RoundState, rng: &mut G) -> Self::Problem;

    /// Parse free text into an answer. `None` means the input is ignored.
    fn parse_answer(&self, problem: &Self::Problem, input: &str) -> Option<Self::Answer>;

    fn judge(&mut self, problem: &Self::Problem, answer: Self::Answer, state: &RoundState)
    -> Judgement;

    /// Per-round deadline, if the challenge has one.
    fn round_limit_ms(&self, _problem: &Self::Problem) -> Option<u64> {
        None
    }

    fn on_round_timeout(&mut self, _state: &RoundState) -> Judgement {
        Judgement::timeout()
    }

    /// How a player-requested stop is recorded. Endless challenges finish
    /// normally so their record still counts.
    fn stop_reason(&self) -> EndReason {
        EndReason::Stopped
    }

    /// How long input stays locked at the start of a round.
    fn reveal_ms(&self, _problem: &Self::Problem) -> u64 {
        0
    }

    /// Text shown to the player for the current round.
    fn describe(&self, problem: &Self::Problem, state: &RoundState) -> String;
}

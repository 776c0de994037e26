use brain_core::model::{ChallengeKind, Difficulty};
use brain_core::problem::{BinaryProblem, MentalProblem, PrimeBoard, arithmetic, is_prime};
use brain_core::time::ClockSpec;
use rand::Rng;

use super::parse_number;
use crate::engine::{ChallengeRules, Judgement, RoundState};

fn judge_number(expected: i64, answer: i64) -> Judgement {
    if answer == expected {
        Judgement::correct(1)
    } else {
        Judgement::wrong()
    }
}

// ─── Prime Hunter ───────────────────────────────────────────────────────────

const PRIME_LIMIT_MS: u64 = 30_000;
const WRONG_PRIME_PENALTY_MS: u64 = 1_000;
const NOT_PRIME_PENALTY_MS: u64 = 500;

/// Find the requested prime on a 4×4 board. Found cells are cleared; once the
/// board runs out of primes a new one is dealt.
#[derive(Debug, Default)]
pub struct PrimeHunterRules {
    found: Option<(PrimeBoard, usize)>,
}

impl PrimeHunterRules {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChallengeRules for PrimeHunterRules {
    type Problem = PrimeBoard;
    /// Index of the tapped cell.
    type Answer = usize;

    fn kind(&self) -> ChallengeKind {
        ChallengeKind::PrimeHunter
    }

    fn clock(&self) -> ClockSpec {
        ClockSpec::Countdown {
            limit_ms: PRIME_LIMIT_MS,
        }
    }

    fn tick_ms(&self) -> u64 {
        50
    }

    fn reset(&mut self) {
        self.found = None;
    }

    fn generate<G: Rng + ?Sized>(&mut self, _state: &RoundState, rng: &mut G) -> PrimeBoard {
        match self.found.take() {
            Some((board, index)) => board
                .after_found(index, rng)
                .unwrap_or_else(|| PrimeBoard::generate(rng)),
            None => PrimeBoard::generate(rng),
        }
    }

    /// The player types a value shown on the board.
    fn parse_answer(&self, problem: &PrimeBoard, input: &str) -> Option<usize> {
        let value = u32::try_from(parse_number(input)?).ok()?;
        problem.position_of(value)
    }

    fn judge(&mut self, problem: &PrimeBoard, answer: usize, _state: &RoundState) -> Judgement {
        let Some(value) = problem.value_at(answer) else {
            return Judgement::wrong();
        };
        if value == problem.target() {
            self.found = Some((problem.clone(), answer));
            Judgement::correct(1)
        } else if is_prime(value) {
            Judgement::wrong().with_penalty(WRONG_PRIME_PENALTY_MS)
        } else {
            Judgement::wrong().with_penalty(NOT_PRIME_PENALTY_MS)
        }
    }

    fn describe(&self, problem: &PrimeBoard, _state: &RoundState) -> String {
        problem.to_string().trim_end().to_string()
    }
}

// ─── Division Master ────────────────────────────────────────────────────────

const DIVISION_LIMIT_MS: u64 = 60_000;

/// Exact division at a chosen difficulty.
#[derive(Debug, Clone, Copy, Default)]
pub struct DivisionRules {
    difficulty: Difficulty,
}

impl DivisionRules {
    #[must_use]
    pub fn new(difficulty: Difficulty) -> Self {
        Self { difficulty }
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }
}

impl ChallengeRules for DivisionRules {
    type Problem = BinaryProblem;
    type Answer = i64;

    fn kind(&self) -> ChallengeKind {
        ChallengeKind::DivisionChallenge
    }

    fn clock(&self) -> ClockSpec {
        ClockSpec::Countdown {
            limit_ms: DIVISION_LIMIT_MS,
        }
    }

    fn tick_ms(&self) -> u64 {
        1_000
    }

    fn generate<G: Rng + ?Sized>(&mut self, _state: &RoundState, rng: &mut G) -> BinaryProblem {
        arithmetic::division(self.difficulty, rng)
    }

    fn parse_answer(&self, _problem: &BinaryProblem, input: &str) -> Option<i64> {
        parse_number(input)
    }

    fn judge(&mut self, problem: &BinaryProblem, answer: i64, _state: &RoundState) -> Judgement {
        judge_number(problem.answer(), answer)
    }

    fn describe(&self, problem: &BinaryProblem, _state: &RoundState) -> String {
        format!("[{}] {problem} = ?", self.difficulty)
    }
}

// ─── Mental Arithmetic ──────────────────────────────────────────────────────

const MENTAL_LIMIT_MS: u64 = 120_000;

/// Three-operand expressions in five forms, each with a hint.
#[derive(Debug, Clone, Copy, Default)]
pub struct MentalArithmeticRules;

impl ChallengeRules for MentalArithmeticRules {
    type Problem = MentalProblem;
    type Answer = i64;

    fn kind(&self) -> ChallengeKind {
        ChallengeKind::MentalArithmetic
    }

    fn clock(&self) -> ClockSpec {
        ClockSpec::Countdown {
            limit_ms: MENTAL_LIMIT_MS,
        }
    }

    fn tick_ms(&self) -> u64 {
        1_000
    }

    fn generate<G: Rng + ?Sized>(&mut self, _state: &RoundState, rng: &mut G) -> MentalProblem {
        MentalProblem::generate(rng)
    }

    fn parse_answer(&self, _problem: &MentalProblem, input: &str) -> Option<i64> {
        parse_number(input)
    }

    fn judge(&mut self, problem: &MentalProblem, answer: i64, _state: &RoundState) -> Judgement {
        judge_number(problem.answer(), answer)
    }

    fn describe(&self, problem: &MentalProblem, _state: &RoundState) -> String {
        format!("{problem} = ?\nHint: {}", problem.hint())
    }
}

// ─── Math Facts ─────────────────────────────────────────────────────────────

const FACTS_LIMIT_MS: u64 = 90_000;

/// One multiplication table, drilled for ninety seconds.
#[derive(Debug, Clone, Copy)]
pub struct MathFactsRules {
    table: u32,
}

impl MathFactsRules {
    /// `table` must already be validated to `2..=12`.
    #[must_use]
    pub fn new(table: u32) -> Self {
        Self { table }
    }

    #[must_use]
    pub fn table(&self) -> u32 {
        self.table
    }
}

impl ChallengeRules for MathFactsRules {
    type Problem = BinaryProblem;
    type Answer = i64;

    fn kind(&self) -> ChallengeKind {
        ChallengeKind::MathFactMaster
    }

    fn clock(&self) -> ClockSpec {
        ClockSpec::Countdown {
            limit_ms: FACTS_LIMIT_MS,
        }
    }

    fn tick_ms(&self) -> u64 {
        1_000
    }

    fn generate<G: Rng + ?Sized>(&mut self, _state: &RoundState, rng: &mut G) -> BinaryProblem {
        arithmetic::times_table(self.table, rng)
    }

    fn parse_answer(&self, _problem: &BinaryProblem, input: &str) -> Option<i64> {
        parse_number(input)
    }

    fn judge(&mut self, problem: &BinaryProblem, answer: i64, _state: &RoundState) -> Judgement {
        judge_number(problem.answer(), answer)
    }

    fn describe(&self, problem: &BinaryProblem, _state: &RoundState) -> String {
        format!("{problem} = ?")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenges::testing::seeded;
    use brain_core::model::Feedback;
    use brain_core::problem::Operation;

    #[test]
    fn division_accepts_only_the_quotient() {
        let mut rules = DivisionRules::new(Difficulty::Medium);
        let problem = BinaryProblem::division(7, 9);
        assert_eq!(problem.left(), 63);
        let state = RoundState::default();
        assert_eq!(rules.parse_answer(&problem, "9"), Some(9));
        assert_eq!(rules.judge(&problem, 9, &state).points(), 1);
        assert!(rules.judge(&problem, 8, &state).resets_streak());
        assert!(rules.describe(&problem, &state).starts_with("[medium] 63 ÷ 7"));
    }

    #[test]
    fn facts_stick_to_the_table() {
        let mut s = seeded(MathFactsRules::new(7));
        s.start().unwrap();
        for _ in 0..20 {
            let problem = *s.problem().unwrap();
            assert_eq!(problem.left(), 7);
            assert_eq!(problem.op(), Operation::Multiply);
            s.submit_text(&problem.answer().to_string()).unwrap();
        }
        assert_eq!(s.stats().score, 20);
    }

    #[test]
    fn mental_arithmetic_tracks_streak() {
        let mut s = seeded(MentalArithmeticRules);
        s.start().unwrap();
        for _ in 0..3 {
            let answer = s.problem().unwrap().answer();
            s.submit_text(&answer.to_string()).unwrap();
        }
        assert_eq!(s.stats().streak, 3);
        let answer = s.problem().unwrap().answer();
        s.submit_text(&(answer + 1).to_string()).unwrap();
        assert_eq!(s.stats().streak, 0);
        assert_eq!(s.stats().best_streak, 3);
        assert!(s.prompt().unwrap().contains("Hint:"));
    }

    #[test]
    fn prime_hunter_clears_found_cells_and_penalizes() {
        let mut s = seeded(PrimeHunterRules::new());
        s.start().unwrap();

        let board = s.problem().unwrap().clone();
        let target = board.target();
        let index = board.position_of(target).unwrap();
        let result = s.submit_text(&target.to_string()).unwrap().unwrap();
        assert_eq!(result.feedback, Feedback::Success);
        let next = s.problem().unwrap();
        if next.cells().iter().any(Option::is_none) {
            assert_eq!(next.value_at(index), None);
        }

        let board = s.problem().unwrap().clone();
        let before = s.game_clock().remaining_ms().unwrap();
        let decoy = board
            .cells()
            .iter()
            .flatten()
            .copied()
            .find(|n| *n != board.target())
            .unwrap();
        s.submit_text(&decoy.to_string()).unwrap();
        let penalty = if is_prime(decoy) { 1_000 } else { 500 };
        assert_eq!(s.game_clock().remaining_ms().unwrap(), before - penalty);
        assert_eq!(s.stats().score, 1);
    }

    #[test]
    fn prime_hunter_ignores_values_not_on_the_board() {
        let mut s = seeded(PrimeHunterRules::new());
        s.start().unwrap();
        assert_eq!(s.submit_text("100").unwrap(), None);
        assert_eq!(s.submit_text("seven").unwrap(), None);
    }
}

//! Arithmetic problems built from operand/operator values and evaluated directly.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::Difficulty;
use crate::scoring::StreamTier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Add,
        Operation::Subtract,
        Operation::Multiply,
        Operation::Divide,
    ];

    #[must_use]
    pub fn symbol(self) -> char {
        match self {
            Operation::Add => '+',
            Operation::Subtract => '−',
            Operation::Multiply => '×',
            Operation::Divide => '÷',
        }
    }

    /// Exact result, or `None` on overflow, division by zero or a non-integer quotient.
    #[must_use]
    pub fn apply(self, left: i64, right: i64) -> Option<i64> {
        match self {
            Operation::Add => left.checked_add(right),
            Operation::Subtract => left.checked_sub(right),
            Operation::Multiply => left.checked_mul(right),
            Operation::Divide => {
                if right == 0 || left % right != 0 {
                    None
                } else {
                    left.checked_div(right)
                }
            }
        }
    }

    fn precedence(self) -> u8 {
        match self {
            Operation::Add | Operation::Subtract => 1,
            Operation::Multiply | Operation::Divide => 2,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// `left op right` with a non-negative integer answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryProblem {
    left: i64,
    right: i64,
    op: Operation,
}

impl BinaryProblem {
    /// `None` unless the answer is an exact, non-negative integer.
    #[must_use]
    pub fn new(left: i64, right: i64, op: Operation) -> Option<Self> {
        match op.apply(left, right) {
            Some(answer) if answer >= 0 => Some(Self { left, right, op }),
            _ => None,
        }
    }

    /// `divisor * quotient ÷ divisor`; the quotient is exact by construction.
    #[must_use]
    pub fn division(divisor: i64, quotient: i64) -> Self {
        Self {
            left: divisor * quotient,
            right: divisor.max(1),
            op: Operation::Divide,
        }
    }

    fn ordered(a: i64, b: i64, op: Operation) -> Self {
        let (left, right) = if op == Operation::Subtract && a < b {
            (b, a)
        } else {
            (a, b)
        };
        Self { left, right, op }
    }

    #[must_use]
    pub fn left(&self) -> i64 {
        self.left
    }

    #[must_use]
    pub fn right(&self) -> i64 {
        self.right
    }

    #[must_use]
    pub fn op(&self) -> Operation {
        self.op
    }

    #[must_use]
    pub fn answer(&self) -> i64 {
        self.op.apply(self.left, self.right).unwrap_or_default()
    }
}

impl fmt::Display for BinaryProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.op, self.right)
    }
}

// ─── Generators ─────────────────────────────────────────────────────────────

fn pick_op<R: Rng + ?Sized>(ops: &[Operation], rng: &mut R) -> Operation {
    ops.choose(rng).copied().unwrap_or(Operation::Add)
}

/// Math Sprint: small operands, all four operations.
pub fn sprint<R: Rng + ?Sized>(rng: &mut R) -> BinaryProblem {
    match pick_op(&Operation::ALL, rng) {
        Operation::Add => {
            BinaryProblem::ordered(rng.random_range(1..=20), rng.random_range(1..=20), Operation::Add)
        }
        Operation::Subtract => BinaryProblem::ordered(
            rng.random_range(10..=29),
            rng.random_range(1..=10),
            Operation::Subtract,
        ),
        Operation::Multiply => BinaryProblem::ordered(
            rng.random_range(1..=10),
            rng.random_range(1..=10),
            Operation::Multiply,
        ),
        Operation::Divide => {
            BinaryProblem::division(rng.random_range(2..=9), rng.random_range(2..=9))
        }
    }
}

/// Division Master: divisor and quotient ranges grow with difficulty.
pub fn division<R: Rng + ?Sized>(difficulty: Difficulty, rng: &mut R) -> BinaryProblem {
    let (divisors, quotients) = match difficulty {
        Difficulty::Easy => (2..=11, 1..=10),
        Difficulty::Medium => (3..=14, 1..=12),
        Difficulty::Hard => (5..=19, 1..=15),
    };
    BinaryProblem::division(rng.random_range(divisors), rng.random_range(quotients))
}

/// Math Facts: `table × n` for n in 1..=12.
pub fn times_table<R: Rng + ?Sized>(table: u32, rng: &mut R) -> BinaryProblem {
    BinaryProblem::ordered(i64::from(table), rng.random_range(1..=12), Operation::Multiply)
}

/// Math Zen: operand ranges scale with the zen level (1..=5).
pub fn zen<R: Rng + ?Sized>(level: u32, rng: &mut R) -> BinaryProblem {
    let d = i64::from(level.clamp(1, 5));
    match pick_op(&Operation::ALL, rng) {
        Operation::Add => BinaryProblem::ordered(
            rng.random_range(5..5 + 20 * d),
            rng.random_range(5..5 + 20 * d),
            Operation::Add,
        ),
        Operation::Subtract => BinaryProblem::ordered(
            rng.random_range(20..20 + 30 * d),
            rng.random_range(5..5 + 20 * d),
            Operation::Subtract,
        ),
        Operation::Multiply => BinaryProblem::ordered(
            rng.random_range(1..=12 * d),
            rng.random_range(1..=12 * d),
            Operation::Multiply,
        ),
        Operation::Divide => BinaryProblem::division(
            rng.random_range(2..2 + 10 * d),
            rng.random_range(1..=12 * d),
        ),
    }
}

/// Math Stream: operations and operand size follow the tier.
pub fn stream<R: Rng + ?Sized>(tier: StreamTier, rng: &mut R) -> BinaryProblem {
    let settings = tier.settings();
    let max = i64::from(settings.max_number);
    match pick_op(settings.operations, rng) {
        Operation::Add => {
            BinaryProblem::ordered(rng.random_range(1..=max), rng.random_range(1..=max), Operation::Add)
        }
        Operation::Subtract => BinaryProblem::ordered(
            rng.random_range(10..10 + max),
            rng.random_range(1..=max),
            Operation::Subtract,
        ),
        Operation::Multiply => BinaryProblem::ordered(
            rng.random_range(1..=12),
            rng.random_range(1..=12),
            Operation::Multiply,
        ),
        Operation::Divide => {
            BinaryProblem::division(rng.random_range(1..=12), rng.random_range(1..=12))
        }
    }
}

/// Reflex Rush quick math: addition, subtraction and single-digit products.
pub fn reflex_math<R: Rng + ?Sized>(rng: &mut R) -> BinaryProblem {
    let ops = [Operation::Add, Operation::Subtract, Operation::Multiply];
    match pick_op(&ops, rng) {
        Operation::Subtract => BinaryProblem::ordered(
            rng.random_range(10..=29),
            rng.random_range(1..=10),
            Operation::Subtract,
        ),
        Operation::Multiply => BinaryProblem::ordered(
            rng.random_range(1..=9),
            rng.random_range(1..=9),
            Operation::Multiply,
        ),
        _ => BinaryProblem::ordered(rng.random_range(1..=20), rng.random_range(1..=20), Operation::Add),
    }
}

// ─── Expressions ────────────────────────────────────────────────────────────

/// A small closed expression tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expression {
    Number(i64),
    Binary {
        op: Operation,
        left: Box<Expression>,
        right: Box<Expression>,
    },
}

impl Expression {
    #[must_use]
    pub fn num(value: i64) -> Self {
        Expression::Number(value)
    }

    #[must_use]
    pub fn binary(op: Operation, left: Expression, right: Expression) -> Self {
        Expression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Exact integer value, `None` if any step is not an exact integer.
    #[must_use]
    pub fn evaluate(&self) -> Option<i64> {
        match self {
            Expression::Number(value) => Some(*value),
            Expression::Binary { op, left, right } => op.apply(left.evaluate()?, right.evaluate()?),
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expression::Number(_) => u8::MAX,
            Expression::Binary { op, .. } => op.precedence(),
        }
    }

    fn fmt_child(&self, f: &mut fmt::Formatter<'_>, parens: bool) -> fmt::Result {
        if parens {
            write!(f, "({self})")
        } else {
            write!(f, "{self}")
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Number(value) => write!(f, "{value}"),
            Expression::Binary { op, left, right } => {
                let prec = op.precedence();
                left.fmt_child(f, left.precedence() < prec)?;
                write!(f, " {op} ")?;
                // Left-associative: an equal-precedence right child needs parentheses.
                right.fmt_child(f, right.precedence() <= prec)
            }
        }
    }
}

/// The five Mental Arithmetic problem shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MentalForm {
    SumOfThree,
    DoubleSubtraction,
    ProductOfThree,
    EvenSplit,
    SumThenProduct,
}

impl MentalForm {
    pub const ALL: [MentalForm; 5] = [
        MentalForm::SumOfThree,
        MentalForm::DoubleSubtraction,
        MentalForm::ProductOfThree,
        MentalForm::EvenSplit,
        MentalForm::SumThenProduct,
    ];

    #[must_use]
    pub fn hint(self) -> &'static str {
        match self {
            MentalForm::SumOfThree => "Add all three numbers",
            MentalForm::DoubleSubtraction => "Subtract both numbers from the first",
            MentalForm::ProductOfThree => "Multiply all three numbers",
            MentalForm::EvenSplit => "Divide evenly",
            MentalForm::SumThenProduct => "Add first, then multiply",
        }
    }
}

/// A multi-step expression with its precomputed answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentalProblem {
    form: MentalForm,
    expression: Expression,
    answer: i64,
}

impl MentalProblem {
    /// `None` if the expression does not evaluate to an exact, non-negative integer.
    #[must_use]
    pub fn new(form: MentalForm, expression: Expression) -> Option<Self> {
        let answer = expression.evaluate().filter(|answer| *answer >= 0)?;
        Some(Self {
            form,
            expression,
            answer,
        })
    }

    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        use Expression as E;
        use Operation::{Add, Divide, Multiply, Subtract};

        let form = MentalForm::ALL
            .choose(rng)
            .copied()
            .unwrap_or(MentalForm::SumOfThree);
        let expression = match form {
            MentalForm::SumOfThree => E::binary(
                Add,
                E::binary(Add, E::num(rng.random_range(10..=59)), E::num(rng.random_range(10..=49))),
                E::num(rng.random_range(10..=39)),
            ),
            MentalForm::DoubleSubtraction => {
                let b = rng.random_range(10..=49);
                let c = rng.random_range(10..=39);
                let a = rng.random_range(50..=149_i64).max(b + c);
                E::binary(Subtract, E::binary(Subtract, E::num(a), E::num(b)), E::num(c))
            }
            MentalForm::ProductOfThree => E::binary(
                Multiply,
                E::binary(Multiply, E::num(rng.random_range(2..=16)), E::num(rng.random_range(2..=11))),
                E::num(rng.random_range(2..=6)),
            ),
            MentalForm::EvenSplit => {
                let parts: i64 = rng.random_range(2..=6);
                let quotient = rng.random_range((50 + parts - 1) / parts..=149 / parts);
                E::binary(Divide, E::num(parts * quotient), E::num(parts))
            }
            MentalForm::SumThenProduct => E::binary(
                Multiply,
                E::binary(Add, E::num(rng.random_range(10..=29)), E::num(rng.random_range(5..=14))),
                E::num(rng.random_range(2..=6)),
            ),
        };
        let answer = expression.evaluate().unwrap_or_default();
        Self {
            form,
            expression,
            answer,
        }
    }

    #[must_use]
    pub fn form(&self) -> MentalForm {
        self.form
    }

    #[must_use]
    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    #[must_use]
    pub fn answer(&self) -> i64 {
        self.answer
    }

    #[must_use]
    pub fn hint(&self) -> &'static str {
        self.form.hint()
    }
}

impl fmt::Display for MentalProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expression)
    }
}

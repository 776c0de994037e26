//! "What comes next?" number sequences.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::options::OptionSet;

const MASTER_SHOWN: usize = 4;
const PATTERN_SHOWN: usize = 3;
const GEOMETRIC_LIMIT: i64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceKind {
    Arithmetic,
    Geometric,
    Square,
    Fibonacci,
    Alternating,
}

impl SequenceKind {
    pub const ALL: [SequenceKind; 5] = [
        SequenceKind::Arithmetic,
        SequenceKind::Geometric,
        SequenceKind::Square,
        SequenceKind::Fibonacci,
        SequenceKind::Alternating,
    ];

    /// Kinds used by Pattern Match.
    pub const SIMPLE: [SequenceKind; 3] = [
        SequenceKind::Arithmetic,
        SequenceKind::Geometric,
        SequenceKind::Alternating,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            SequenceKind::Arithmetic => "Arithmetic",
            SequenceKind::Geometric => "Geometric",
            SequenceKind::Square => "Square",
            SequenceKind::Fibonacci => "Fibonacci",
            SequenceKind::Alternating => "Alternating",
        }
    }
}

/// A visible prefix of a sequence and options for the next term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberSequence {
    kind: SequenceKind,
    shown: Vec<i64>,
    options: OptionSet<i64>,
}

impl NumberSequence {
    /// Sequence Master: any of the five kinds, four terms shown.
    pub fn master<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let kind = SequenceKind::ALL
            .choose(rng)
            .copied()
            .unwrap_or(SequenceKind::Arithmetic);
        let (terms, distractors) = match kind {
            SequenceKind::Arithmetic => {
                let start = rng.random_range(1..=10);
                let diff = rng.random_range(1..=5);
                let terms = linear(start, diff, MASTER_SHOWN + 1);
                let next = terms[MASTER_SHOWN];
                (terms, vec![next + diff, next - diff, next + 1, next - 1, next + 2, next - 2])
            }
            SequenceKind::Geometric => {
                let ratio: i64 = rng.random_range(2..=4);
                let max_start = ((GEOMETRIC_LIMIT - 1) / ratio.pow(MASTER_SHOWN as u32)).clamp(1, 5);
                let start = rng.random_range(1..=max_start);
                let terms = geometric(start, ratio, MASTER_SHOWN + 1);
                let next = terms[MASTER_SHOWN];
                let distractors = vec![
                    next + ratio,
                    next - ratio,
                    next * ratio,
                    next / ratio,
                    next + start,
                    next - start,
                ]
                .into_iter()
                .filter(|n| *n < GEOMETRIC_LIMIT)
                .collect();
                (terms, distractors)
            }
            SequenceKind::Square => {
                let start: i64 = rng.random_range(1..=5);
                let terms: Vec<i64> = (0..=MASTER_SHOWN as i64).map(|i| (start + i).pow(2)).collect();
                let root = start + MASTER_SHOWN as i64;
                let next = terms[MASTER_SHOWN];
                let distractors = vec![
                    (root + 1).pow(2),
                    (root - 1).pow(2),
                    next + root,
                    next - root,
                    root * (root + 1),
                    root * (root - 1),
                ];
                (terms, distractors)
            }
            SequenceKind::Fibonacci => {
                let a = rng.random_range(1..=5);
                let b = a + rng.random_range(1..=3);
                let mut terms = vec![a, b];
                while terms.len() <= MASTER_SHOWN {
                    let n = terms.len();
                    terms.push(terms[n - 1] + terms[n - 2]);
                }
                let next = terms[MASTER_SHOWN];
                let last = terms[MASTER_SHOWN - 1];
                let before = terms[MASTER_SHOWN - 2];
                (terms, vec![next + 1, next - 1, next + last, next - before, last * 2, before * 3])
            }
            SequenceKind::Alternating => {
                let up = rng.random_range(1..=5);
                let down = rng.random_range(1..=3);
                let start = rng.random_range(1..=10_i64).max(1 + 2 * down);
                let steps = [up, -down];
                let terms = stepped(start, &steps, MASTER_SHOWN + 1);
                let next = terms[MASTER_SHOWN];
                let last = terms[MASTER_SHOWN - 1];
                let step = steps[(MASTER_SHOWN - 1) % 2];
                let other = steps[MASTER_SHOWN % 2];
                (terms, vec![next + up, next - down, next + 1, next - 1, last + other, last + step * 2])
            }
        };
        Self::from_terms(kind, terms, MASTER_SHOWN, distractors, rng)
    }

    /// Pattern Match: arithmetic, geometric or alternating, three terms shown.
    pub fn pattern_match<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let kind = SequenceKind::SIMPLE
            .choose(rng)
            .copied()
            .unwrap_or(SequenceKind::Arithmetic);
        let start = rng.random_range(1..=10);
        let terms = match kind {
            SequenceKind::Geometric => geometric(start, rng.random_range(2..=4), PATTERN_SHOWN + 1),
            SequenceKind::Alternating => {
                let diff = rng.random_range(1..=4);
                stepped(start, &[diff, -diff], PATTERN_SHOWN + 1)
            }
            _ => linear(start, rng.random_range(1..=5), PATTERN_SHOWN + 1),
        };
        let next = terms[PATTERN_SHOWN];
        let distractors = (-10..10).map(|offset| next + offset).collect();
        Self::from_terms(kind, terms, PATTERN_SHOWN, distractors, rng)
    }

    fn from_terms<R: Rng + ?Sized>(
        kind: SequenceKind,
        mut terms: Vec<i64>,
        shown: usize,
        distractors: Vec<i64>,
        rng: &mut R,
    ) -> Self {
        let next = terms[shown];
        terms.truncate(shown);
        Self {
            kind,
            shown: terms,
            options: OptionSet::numeric(next, distractors, rng),
        }
    }

    #[must_use]
    pub fn kind(&self) -> SequenceKind {
        self.kind
    }

    #[must_use]
    pub fn shown(&self) -> &[i64] {
        &self.shown
    }

    #[must_use]
    pub fn options(&self) -> &OptionSet<i64> {
        &self.options
    }

    /// The hidden next term.
    #[must_use]
    pub fn next_term(&self) -> i64 {
        *self.options.correct()
    }
}

impl fmt::Display for NumberSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for term in &self.shown {
            write!(f, "{term}, ")?;
        }
        write!(f, "?")
    }
}

fn linear(start: i64, diff: i64, len: usize) -> Vec<i64> {
    (0..len as i64).map(|i| start + i * diff).collect()
}

fn geometric(start: i64, ratio: i64, len: usize) -> Vec<i64> {
    std::iter::successors(Some(start), |prev| Some(prev * ratio))
        .take(len)
        .collect()
}

fn stepped(start: i64, steps: &[i64], len: usize) -> Vec<i64> {
    let mut terms = Vec::with_capacity(len);
    let mut current = start;
    for i in 0..len {
        terms.push(current);
        current += steps[i % steps.len()];
    }
    terms
}

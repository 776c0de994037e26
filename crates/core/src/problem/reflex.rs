//! Reflex Rush stimuli.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::arithmetic::{self, BinaryProblem};
use super::options::OptionSet;

const COLORS: [&str; 4] = ["Red", "Blue", "Green", "Yellow"];
const SHAPES: [&str; 4] = ["Circle", "Square", "Triangle", "Diamond"];
const MISMATCH_CHANCE: f64 = 0.3;
const SPEEDUP_PER_STREAK_MS: u64 = 50;

static UNLOCK_ORDER: [StimulusKind; 5] = StimulusKind::ALL;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StimulusKind {
    Color,
    Shape,
    Word,
    ColorShape,
    Math,
}

impl StimulusKind {
    /// Kinds in unlock order.
    pub const ALL: [StimulusKind; 5] = [
        StimulusKind::Color,
        StimulusKind::Shape,
        StimulusKind::Word,
        StimulusKind::ColorShape,
        StimulusKind::Math,
    ];

    /// Kinds on offer at the given streak.
    #[must_use]
    pub fn unlocked(streak: u32) -> &'static [StimulusKind] {
        match streak {
            0..5 => &UNLOCK_ORDER[..3],
            5..10 => &UNLOCK_ORDER[..4],
            _ => &UNLOCK_ORDER,
        }
    }

    /// Time allowed to answer: `max(floor, base − 50 ms · streak)`.
    #[must_use]
    pub fn time_limit_ms(self, streak: u32) -> u64 {
        let (base, floor): (u64, u64) = match self {
            StimulusKind::Color | StimulusKind::Shape => (3_000, 1_500),
            StimulusKind::ColorShape => (4_000, 2_000),
            StimulusKind::Word | StimulusKind::Math => (3_500, 2_000),
        };
        base.saturating_sub(u64::from(streak) * SPEEDUP_PER_STREAK_MS)
            .max(floor)
    }
}

/// What is displayed to the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cue {
    /// A color word printed in some ink.
    InkedWord { word: &'static str, ink: &'static str },
    Shape(&'static str),
    ColoredShape { color: &'static str, shape: &'static str },
    Math(BinaryProblem),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stimulus {
    kind: StimulusKind,
    cue: Cue,
    options: OptionSet<String>,
    time_limit_ms: u64,
}

impl Stimulus {
    pub fn generate<R: Rng + ?Sized>(streak: u32, rng: &mut R) -> Self {
        let kind = StimulusKind::unlocked(streak)
            .choose(rng)
            .copied()
            .unwrap_or(StimulusKind::Color);
        Self::generate_kind(kind, streak, rng)
    }

    pub fn generate_kind<R: Rng + ?Sized>(kind: StimulusKind, streak: u32, rng: &mut R) -> Self {
        let (cue, correct, candidates) = match kind {
            StimulusKind::Color => {
                let word = pick(&COLORS, rng);
                let ink = maybe_mismatch(word, rng);
                (Cue::InkedWord { word, ink }, word.to_string(), labels(&COLORS))
            }
            StimulusKind::Word => {
                let ink = pick(&COLORS, rng);
                let word = maybe_mismatch(ink, rng);
                (Cue::InkedWord { word, ink }, ink.to_string(), labels(&COLORS))
            }
            StimulusKind::Shape => {
                let shape = pick(&SHAPES, rng);
                (Cue::Shape(shape), shape.to_string(), labels(&SHAPES))
            }
            StimulusKind::ColorShape => {
                let color = pick(&COLORS, rng);
                let shape = pick(&SHAPES, rng);
                let candidates = (0..8)
                    .map(|_| format!("{} {}", pick(&COLORS, rng), pick(&SHAPES, rng)))
                    .collect();
                (
                    Cue::ColoredShape { color, shape },
                    format!("{color} {shape}"),
                    candidates,
                )
            }
            StimulusKind::Math => {
                let problem = arithmetic::reflex_math(rng);
                let answer = problem.answer();
                let candidates = (-2..=2).map(|d| (answer + d).to_string()).collect();
                (Cue::Math(problem), answer.to_string(), candidates)
            }
        };
        let options = OptionSet::build(
            correct.clone(),
            candidates,
            |label: &String| label.parse::<i64>().map_or(true, |n| n > 0),
            |attempt| pad_label(kind, &correct, attempt),
            rng,
        );
        Self {
            kind,
            cue,
            options,
            time_limit_ms: kind.time_limit_ms(streak),
        }
    }

    #[must_use]
    pub fn kind(&self) -> StimulusKind {
        self.kind
    }

    #[must_use]
    pub fn cue(&self) -> &Cue {
        &self.cue
    }

    #[must_use]
    pub fn options(&self) -> &OptionSet<String> {
        &self.options
    }

    #[must_use]
    pub fn time_limit_ms(&self) -> u64 {
        self.time_limit_ms
    }
}

impl fmt::Display for Stimulus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.kind, &self.cue) {
            (StimulusKind::Word, Cue::InkedWord { word, ink }) => {
                write!(f, "Which ink? \"{}\" printed in {}", word.to_uppercase(), ink.to_lowercase())
            }
            (_, Cue::InkedWord { word, ink }) => {
                write!(f, "Which word? \"{}\" printed in {}", word.to_uppercase(), ink.to_lowercase())
            }
            (_, Cue::Shape(shape)) => write!(f, "Which shape? [{}]", shape.to_lowercase()),
            (_, Cue::ColoredShape { color, shape }) => {
                write!(f, "Find: {} {}", color.to_lowercase(), shape.to_lowercase())
            }
            (_, Cue::Math(problem)) => write!(f, "{problem} = ?"),
        }
    }
}

fn pick<R: Rng + ?Sized>(items: &[&'static str], rng: &mut R) -> &'static str {
    items.choose(rng).copied().unwrap_or(items[0])
}

/// `value` most of the time, otherwise a different color.
fn maybe_mismatch<R: Rng + ?Sized>(value: &'static str, rng: &mut R) -> &'static str {
    if rng.random_bool(MISMATCH_CHANCE) {
        let others: Vec<&'static str> = COLORS.into_iter().filter(|c| *c != value).collect();
        pick(&others, rng)
    } else {
        value
    }
}

fn labels(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn pad_label(kind: StimulusKind, correct: &str, attempt: usize) -> String {
    match kind {
        StimulusKind::Math => {
            let answer = correct.parse::<i64>().unwrap_or(0);
            (answer + 3 + attempt as i64).to_string()
        }
        StimulusKind::ColorShape => {
            let color = COLORS[attempt % COLORS.len()];
            let shape = SHAPES[(attempt / COLORS.len()) % SHAPES.len()];
            format!("{color} {shape}")
        }
        StimulusKind::Shape => SHAPES[attempt % SHAPES.len()].to_string(),
        StimulusKind::Color | StimulusKind::Word => COLORS[attempt % COLORS.len()].to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn kinds_unlock_with_streak() {
        assert_eq!(StimulusKind::unlocked(0).len(), 3);
        assert!(!StimulusKind::unlocked(4).contains(&StimulusKind::ColorShape));
        assert!(StimulusKind::unlocked(5).contains(&StimulusKind::ColorShape));
        assert!(!StimulusKind::unlocked(9).contains(&StimulusKind::Math));
        assert_eq!(StimulusKind::unlocked(10).len(), 5);
    }

    #[test]
    fn time_limits_shrink_to_a_floor() {
        assert_eq!(StimulusKind::Color.time_limit_ms(0), 3_000);
        assert_eq!(StimulusKind::Color.time_limit_ms(10), 2_500);
        assert_eq!(StimulusKind::Color.time_limit_ms(100), 1_500);
        assert_eq!(StimulusKind::ColorShape.time_limit_ms(100), 2_000);
        assert_eq!(StimulusKind::Math.time_limit_ms(20), 2_500);
    }

    #[test]
    fn options_are_unique_and_hold_the_answer() {
        let mut rng = StdRng::seed_from_u64(21);
        for _ in 0..100 {
            for kind in StimulusKind::ALL {
                let stimulus = Stimulus::generate_kind(kind, 12, &mut rng);
                let options = stimulus.options().options();
                assert_eq!(options.len(), 4);
                for (i, a) in options.iter().enumerate() {
                    assert!(options[i + 1..].iter().all(|b| a != b), "{kind:?}");
                }
                match stimulus.cue() {
                    Cue::InkedWord { word, ink } => {
                        let expected = if kind == StimulusKind::Word { ink } else { word };
                        assert_eq!(stimulus.options().correct(), expected);
                    }
                    Cue::Math(problem) => {
                        assert_eq!(*stimulus.options().correct(), problem.answer().to_string());
                    }
                    Cue::Shape(shape) => assert_eq!(stimulus.options().correct(), shape),
                    Cue::ColoredShape { color, shape } => {
                        assert_eq!(*stimulus.options().correct(), format!("{color} {shape}"));
                    }
                }
            }
        }
    }
}

//! Visual tile sequences for Pattern Path.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::options::OptionSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    Circle,
    Square,
    Triangle,
    Diamond,
    Star,
}

impl Shape {
    pub const ALL: [Shape; 5] = [
        Shape::Circle,
        Shape::Square,
        Shape::Triangle,
        Shape::Diamond,
        Shape::Star,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Shape::Circle => "circle",
            Shape::Square => "square",
            Shape::Triangle => "triangle",
            Shape::Diamond => "diamond",
            Shape::Star => "star",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileColor {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
}

impl TileColor {
    pub const ALL: [TileColor; 5] = [
        TileColor::Red,
        TileColor::Blue,
        TileColor::Green,
        TileColor::Yellow,
        TileColor::Purple,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            TileColor::Red => "red",
            TileColor::Blue => "blue",
            TileColor::Green => "green",
            TileColor::Yellow => "yellow",
            TileColor::Purple => "purple",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Size {
    Small,
    Medium,
    Large,
}

impl Size {
    pub const ALL: [Size; 3] = [Size::Small, Size::Medium, Size::Large];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Size::Small => "small",
            Size::Medium => "medium",
            Size::Large => "large",
        }
    }
}

/// One tile; rotation is kept in whole degrees within `0..360`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    pub shape: Shape,
    pub color: TileColor,
    rotation: u16,
    pub size: Size,
}

impl Tile {
    #[must_use]
    pub fn new(shape: Shape, color: TileColor, rotation: i32, size: Size) -> Self {
        Self {
            shape,
            color,
            rotation: normalize(rotation),
            size,
        }
    }

    #[must_use]
    pub fn rotation(&self) -> u16 {
        self.rotation
    }

    #[must_use]
    pub fn rotated(self, degrees: i32) -> Self {
        Self {
            rotation: normalize(i32::from(self.rotation) + degrees),
            ..self
        }
    }

    #[must_use]
    pub fn with_shape(self, shape: Shape) -> Self {
        Self { shape, ..self }
    }

    #[must_use]
    pub fn with_color(self, color: TileColor) -> Self {
        Self { color, ..self }
    }

    #[must_use]
    pub fn with_size(self, size: Size) -> Self {
        Self { size, ..self }
    }

    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::new(
            pick(&Shape::ALL, rng),
            pick(&TileColor::ALL, rng),
            pick(&ROTATIONS, rng),
            pick(&Size::ALL, rng),
        )
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}°",
            self.size.name(),
            self.color.name(),
            self.shape.name(),
            self.rotation
        )
    }
}

fn normalize(degrees: i32) -> u16 {
    // rem_euclid keeps negative rotations inside 0..360
    degrees.rem_euclid(360) as u16
}

const ROTATIONS: [i32; 4] = [0, 90, 180, 270];

fn pick<T: Copy, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> T {
    *items.choose(rng).unwrap_or(&items[0])
}

fn other_than<T: Copy + PartialEq>(items: &[T], excluded: &[T]) -> T {
    items
        .iter()
        .copied()
        .find(|item| !excluded.contains(item))
        .unwrap_or(items[0])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TilePatternKind {
    Rotation,
    Progression,
    Alternation,
    Symmetry,
    Transformation,
}

impl TilePatternKind {
    pub const ALL: [TilePatternKind; 5] = [
        TilePatternKind::Rotation,
        TilePatternKind::Progression,
        TilePatternKind::Alternation,
        TilePatternKind::Symmetry,
        TilePatternKind::Transformation,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            TilePatternKind::Rotation => "Rotation",
            TilePatternKind::Progression => "Progression",
            TilePatternKind::Alternation => "Alternation",
            TilePatternKind::Symmetry => "Symmetry",
            TilePatternKind::Transformation => "Transformation",
        }
    }
}

/// A tile sequence and four candidate continuations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TilePattern {
    kind: TilePatternKind,
    sequence: Vec<Tile>,
    options: OptionSet<Tile>,
}

impl TilePattern {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let kind = pick(&TilePatternKind::ALL, rng);
        Self::generate_kind(kind, rng)
    }

    pub fn generate_kind<R: Rng + ?Sized>(kind: TilePatternKind, rng: &mut R) -> Self {
        let (sequence, correct, wrong) = match kind {
            TilePatternKind::Rotation => stepped_rotation(90, rng),
            TilePatternKind::Symmetry => stepped_rotation(45, rng),
            TilePatternKind::Progression => {
                let shape = pick(&Shape::ALL, rng);
                let color = pick(&TileColor::ALL, rng);
                let sequence: Vec<Tile> = Size::ALL
                    .iter()
                    .map(|size| Tile::new(shape, color, 0, *size))
                    .collect();
                let correct = Tile::new(shape, color, 0, Size::ALL[sequence.len() % Size::ALL.len()]);
                let wrong = vec![
                    correct.with_size(Size::ALL[(sequence.len() + 1) % Size::ALL.len()]),
                    correct.with_size(Size::ALL[sequence.len() - 1]),
                    correct.with_shape(other_than(&Shape::ALL, &[shape])),
                    correct.with_color(other_than(&TileColor::ALL, &[color])),
                    correct.rotated(90),
                ];
                (sequence, correct, wrong)
            }
            TilePatternKind::Alternation => {
                let shape_a = pick(&Shape::ALL, rng);
                let shapes_b: Vec<Shape> = Shape::ALL.into_iter().filter(|s| *s != shape_a).collect();
                let shape_b = pick(&shapes_b, rng);
                let color_a = pick(&TileColor::ALL, rng);
                let colors_b: Vec<TileColor> = TileColor::ALL.into_iter().filter(|c| *c != color_a).collect();
                let color_b = pick(&colors_b, rng);
                let a = Tile::new(shape_a, color_a, 0, Size::Medium);
                let b = Tile::new(shape_b, color_b, 0, Size::Medium);
                let sequence = vec![a, b, a, b];
                let correct = a;
                let wrong = vec![
                    b,
                    a.with_shape(shape_b),
                    a.with_color(color_b),
                    a.with_shape(other_than(&Shape::ALL, &[shape_a, shape_b])),
                ];
                (sequence, correct, wrong)
            }
            TilePatternKind::Transformation => {
                let shape = pick(&Shape::ALL, rng);
                let at = |i: usize| {
                    Tile::new(
                        shape,
                        TileColor::ALL[i % TileColor::ALL.len()],
                        ROTATIONS[i % ROTATIONS.len()],
                        Size::ALL[i % Size::ALL.len()],
                    )
                };
                let sequence: Vec<Tile> = (0..3).map(at).collect();
                let correct = at(3);
                let wrong = vec![
                    correct.with_shape(other_than(&Shape::ALL, &[shape])),
                    correct.with_color(TileColor::ALL[4]),
                    correct.rotated(90),
                    correct.with_size(Size::ALL[1]),
                    correct.with_color(TileColor::ALL[2]),
                ];
                (sequence, correct, wrong)
            }
        };
        let options = OptionSet::build(
            correct,
            wrong,
            |_| true,
            |attempt| correct.rotated(45 * (attempt as i32 + 1)),
            rng,
        );
        Self {
            kind,
            sequence,
            options,
        }
    }

    #[must_use]
    pub fn kind(&self) -> TilePatternKind {
        self.kind
    }

    #[must_use]
    pub fn sequence(&self) -> &[Tile] {
        &self.sequence
    }

    #[must_use]
    pub fn options(&self) -> &OptionSet<Tile> {
        &self.options
    }
}

impl fmt::Display for TilePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown: Vec<String> = self.sequence.iter().map(ToString::to_string).collect();
        write!(f, "{}: {} → ?", self.kind.name(), shown.join(" | "))
    }
}

fn stepped_rotation<R: Rng + ?Sized>(step: i32, rng: &mut R) -> (Vec<Tile>, Tile, Vec<Tile>) {
    let base = Tile::random(rng);
    let sequence: Vec<Tile> = (0..3).map(|i| base.rotated(i * step)).collect();
    let correct = base.rotated(3 * step);
    let wrong = vec![
        correct.rotated(step),
        correct.rotated(-step),
        Tile::new(correct.shape, correct.color, 0, correct.size),
        correct.with_shape(other_than(&Shape::ALL, &[base.shape])),
        correct.with_color(other_than(&TileColor::ALL, &[base.color])),
    ];
    (sequence, correct, wrong)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn rotation_normalizes_negative_degrees() {
        let tile = Tile::new(Shape::Star, TileColor::Red, -90, Size::Small);
        assert_eq!(tile.rotation(), 270);
        assert_eq!(tile.rotated(-315).rotation(), 315);
        assert_eq!(tile.rotated(450).rotation(), 0);
    }

    #[test]
    fn every_kind_has_four_distinct_options() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            for kind in TilePatternKind::ALL {
                let pattern = TilePattern::generate_kind(kind, &mut rng);
                let options = pattern.options().options();
                assert_eq!(options.len(), 4);
                for (i, a) in options.iter().enumerate() {
                    assert!(options[i + 1..].iter().all(|b| a != b), "{kind:?}");
                }
            }
        }
    }

    #[test]
    fn rotation_pattern_continues_by_quarter_turns() {
        let mut rng = StdRng::seed_from_u64(5);
        let pattern = TilePattern::generate_kind(TilePatternKind::Rotation, &mut rng);
        let last = pattern.sequence()[2];
        assert_eq!(*pattern.options().correct(), last.rotated(90));
    }

    #[test]
    fn progression_wraps_to_small() {
        let mut rng = StdRng::seed_from_u64(2);
        let pattern = TilePattern::generate_kind(TilePatternKind::Progression, &mut rng);
        assert_eq!(pattern.options().correct().size, Size::Small);
    }
}

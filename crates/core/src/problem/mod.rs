//! Problem value objects and their randomized generators.
//!
//! Every generator takes an `Rng` so sessions can be replayed from a seed. Each
//! problem carries everything needed to compute its own answer.

pub mod arithmetic;
pub mod grid;
pub mod memory;
pub mod options;
pub mod primes;
pub mod reflex;
pub mod sequence;
pub mod tiles;

pub use arithmetic::{BinaryProblem, Expression, MentalForm, MentalProblem, Operation};
pub use grid::TapGrid;
pub use memory::{RecallKind, RecallSequence};
pub use options::{OPTION_COUNT, OptionSet};
pub use primes::{PrimeBoard, is_prime};
pub use reflex::{Cue, Stimulus, StimulusKind};
pub use sequence::{NumberSequence, SequenceKind};
pub use tiles::{Tile, TilePattern, TilePatternKind};

use rand::Rng;
use rand::seq::SliceRandom;
use std::fmt;

/// Numbers on the Number Tap grid (5×5).
pub const TAP_COUNT: u32 = 25;

/// The shuffled 1..=25 grid tapped in ascending order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TapGrid {
    cells: Vec<u32>,
}

impl TapGrid {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut cells: Vec<u32> = (1..=TAP_COUNT).collect();
        cells.shuffle(rng);
        Self { cells }
    }

    #[must_use]
    pub fn cells(&self) -> &[u32] {
        &self.cells
    }

    #[must_use]
    pub fn contains(&self, value: u32) -> bool {
        (1..=TAP_COUNT).contains(&value)
    }

    /// Render the grid with numbers below `next` blanked out.
    #[must_use]
    pub fn render(&self, next: u32) -> String {
        self.cells
            .chunks(5)
            .map(|row| {
                row.iter()
                    .map(|n| if *n < next { "  ·".to_string() } else { format!("{n:>3}") })
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for TapGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn grid_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(25);
        let grid = TapGrid::generate(&mut rng);
        let mut sorted = grid.cells().to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, (1..=25).collect::<Vec<_>>());
        assert_eq!(grid.render(1).lines().count(), 5);
        assert!(!grid.render(26).chars().any(|c| c.is_ascii_digit()));
    }
}

use rand::Rng;
use rand::seq::IndexedRandom;
use std::fmt;

/// Number of cells on a Prime Hunter board (4×4).
pub const BOARD_CELLS: usize = 16;
const MIN_PRIMES: usize = 3;

pub const PRIMES_UNDER_100: [u32; 25] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
];

/// Trial division over 6k±1 candidates.
#[must_use]
pub fn is_prime(n: u32) -> bool {
    if n <= 1 {
        return false;
    }
    if n <= 3 {
        return true;
    }
    if n % 2 == 0 || n % 3 == 0 {
        return false;
    }
    let mut i = 5u32;
    while i.saturating_mul(i) <= n {
        if n % i == 0 || n % (i + 2) == 0 {
            return false;
        }
        i += 6;
    }
    true
}

/// A 4×4 board of numbers with the prime currently hunted.
///
/// Cells already found are cleared (`None`). The target is always a prime still on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimeBoard {
    cells: Vec<Option<u32>>,
    target: u32,
}

impl PrimeBoard {
    /// A fresh board of values 1..=99 holding at least three primes.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut cells: Vec<u32> = (0..BOARD_CELLS).map(|_| rng.random_range(1..=99)).collect();
        while cells.iter().filter(|n| is_prime(**n)).count() < MIN_PRIMES {
            let composite: Vec<usize> = (0..BOARD_CELLS).filter(|i| !is_prime(cells[*i])).collect();
            if let (Some(index), Some(prime)) = (composite.choose(rng), PRIMES_UNDER_100.choose(rng)) {
                cells[*index] = *prime;
            }
        }
        let cells: Vec<Option<u32>> = cells.into_iter().map(Some).collect();
        let target = choose_target(&cells, rng).unwrap_or(PRIMES_UNDER_100[0]);
        Self { cells, target }
    }

    #[must_use]
    pub fn cells(&self) -> &[Option<u32>] {
        &self.cells
    }

    #[must_use]
    pub fn target(&self) -> u32 {
        self.target
    }

    #[must_use]
    pub fn value_at(&self, index: usize) -> Option<u32> {
        self.cells.get(index).copied().flatten()
    }

    /// First uncleared cell showing `value`.
    #[must_use]
    pub fn position_of(&self, value: u32) -> Option<usize> {
        self.cells.iter().position(|cell| *cell == Some(value))
    }

    /// Primes still on the board, in cell order.
    #[must_use]
    pub fn remaining_primes(&self) -> Vec<u32> {
        self.cells.iter().flatten().copied().filter(|n| is_prime(*n)).collect()
    }

    /// The board after the target at `index` was found, hunting another remaining prime.
    ///
    /// Returns `None` once no primes remain; the caller deals a fresh board.
    pub fn after_found<R: Rng + ?Sized>(&self, index: usize, rng: &mut R) -> Option<Self> {
        let mut cells = self.cells.clone();
        if let Some(cell) = cells.get_mut(index) {
            *cell = None;
        }
        let target = choose_target(&cells, rng)?;
        Some(Self { cells, target })
    }
}

fn choose_target<R: Rng + ?Sized>(cells: &[Option<u32>], rng: &mut R) -> Option<u32> {
    let primes: Vec<u32> = cells.iter().flatten().copied().filter(|n| is_prime(*n)).collect();
    primes.choose(rng).copied()
}

impl fmt::Display for PrimeBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Find this prime: {}", self.target)?;
        for row in self.cells.chunks(4) {
            let line: Vec<String> = row
                .iter()
                .map(|cell| cell.map_or_else(|| "  ·".to_string(), |n| format!("{n:>3}")))
                .collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn primality_matches_the_table() {
        let found: Vec<u32> = (0..100).filter(|n| is_prime(*n)).collect();
        assert_eq!(found, PRIMES_UNDER_100);
    }

    #[test]
    fn boards_hold_at_least_three_primes_and_a_present_target() {
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..300 {
            let board = PrimeBoard::generate(&mut rng);
            assert_eq!(board.cells().len(), BOARD_CELLS);
            assert!(board.remaining_primes().len() >= 3);
            assert!(board.cells().iter().flatten().all(|n| (1..=99).contains(n)));
            assert!(board.position_of(board.target()).is_some());
        }
    }

    #[test]
    fn finding_every_prime_exhausts_the_board() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut board = PrimeBoard::generate(&mut rng);
        let primes = board.remaining_primes().len();
        let mut found = 0;
        loop {
            let index = board.position_of(board.target()).unwrap();
            found += 1;
            match board.after_found(index, &mut rng) {
                Some(next) => {
                    assert_eq!(next.value_at(index), None);
                    board = next;
                }
                None => break,
            }
        }
        assert_eq!(found, primes);
    }
}

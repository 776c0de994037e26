use rand::Rng;
use rand::seq::SliceRandom;

/// Number of answer buttons shown for multiple-choice problems.
pub const OPTION_COUNT: usize = 4;

/// A shuffled set of answer options holding the correct value exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSet<T> {
    options: Vec<T>,
    correct: usize,
}

impl<T: Clone + PartialEq> OptionSet<T> {
    /// Build a set of [`OPTION_COUNT`] pairwise distinct options.
    ///
    /// Candidates are tried in random order; duplicates, the correct value and values
    /// rejected by `valid` are skipped. Missing slots are filled from `pad`, which is
    /// called with an increasing attempt index until it yields an acceptable value.
    pub fn build<R, P>(
        correct: T,
        mut candidates: Vec<T>,
        valid: impl Fn(&T) -> bool,
        mut pad: P,
        rng: &mut R,
    ) -> Self
    where
        R: Rng + ?Sized,
        P: FnMut(usize) -> T,
    {
        let mut options = Vec::with_capacity(OPTION_COUNT);
        options.push(correct.clone());
        candidates.shuffle(rng);
        for candidate in candidates {
            if options.len() == OPTION_COUNT {
                break;
            }
            if valid(&candidate) && !options.contains(&candidate) {
                options.push(candidate);
            }
        }
        let mut attempt = 0;
        while options.len() < OPTION_COUNT {
            let candidate = pad(attempt);
            attempt += 1;
            if valid(&candidate) && !options.contains(&candidate) {
                options.push(candidate);
            }
        }
        options.shuffle(rng);
        let correct = options.iter().position(|o| *o == correct).unwrap_or(0);
        Self { options, correct }
    }

    #[must_use]
    pub fn options(&self) -> &[T] {
        &self.options
    }

    #[must_use]
    pub fn correct_index(&self) -> usize {
        self.correct
    }

    #[must_use]
    pub fn correct(&self) -> &T {
        &self.options[self.correct]
    }

    #[must_use]
    pub fn is_correct(&self, index: usize) -> bool {
        index == self.correct
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.options.get(index)
    }
}

impl OptionSet<i64> {
    /// Numeric options: strictly positive distractors, padded with `correct + 1 + i`.
    pub fn numeric<R: Rng + ?Sized>(correct: i64, candidates: Vec<i64>, rng: &mut R) -> Self {
        Self::build(
            correct,
            candidates,
            |v| *v > 0,
            |attempt| correct + 1 + attempt as i64,
            rng,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn correct_appears_once_and_options_are_distinct() {
        let mut rng = StdRng::seed_from_u64(7);
        for seed in 0..200 {
            let set = OptionSet::numeric(seed, vec![seed, seed, -3, 0, seed + 2], &mut rng);
            assert_eq!(set.options().len(), OPTION_COUNT);
            assert_eq!(set.options().iter().filter(|v| **v == seed).count(), 1);
            assert_eq!(*set.correct(), seed);
            for (i, a) in set.options().iter().enumerate() {
                assert!(set.options()[i + 1..].iter().all(|b| a != b));
            }
            assert!(set.options().iter().filter(|v| **v != seed).all(|v| *v > 0));
        }
    }

    #[test]
    fn pads_when_candidates_run_out() {
        let mut rng = StdRng::seed_from_u64(1);
        let set = OptionSet::numeric(10, Vec::new(), &mut rng);
        let mut values = set.options().to_vec();
        values.sort_unstable();
        assert_eq!(values, vec![10, 11, 12, 13]);
        assert!(set.is_correct(set.correct_index()));
    }
}

use crate::Choice;
use rand::{rngs::StdRng, seq::SliceRandom, RngCore, SeedableRng};

#[derive(Debug, Clone)]
pub struct RngState {
    seed: u64,
    rng: StdRng,
}

impl RngState {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    pub fn below(&mut self, len: usize) -> usize {
        (self.next_u64() % len as u64) as usize
    }

    pub fn choice(&mut self) -> Choice {
        Choice::from_index(self.next_u64())
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }

    /// Up to `count` distinct entries of `pool`, in random order.
    pub fn sample_distinct(&mut self, pool: &[usize], count: usize) -> Vec<usize> {
        let mut picks = pool.to_vec();
        picks.shuffle(&mut self.rng);
        picks.truncate(count);
        picks
    }
}

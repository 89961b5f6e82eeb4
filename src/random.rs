use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub trait RandomSource {
    /// Uniformly distributed integer in `[lo, hi]`, both bounds inclusive.
    fn randint(&mut self, lo: i32, hi: i32) -> i32;

    /// True with a chance of `percent` in 100.
    fn chance(&mut self, percent: u8) -> bool {
        self.randint(0, 99) < percent as i32
    }
}

pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> SeededRandom {
        SeededRandom {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn randint(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }

        self.rng.gen_range(lo..=hi)
    }
}

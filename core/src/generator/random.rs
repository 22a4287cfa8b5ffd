use rand::prelude::*;

use super::*;

/// Ball source backed by a seeded [`SmallRng`], so a game is reproducible from its seed.
#[derive(Clone, Debug)]
pub struct RandomBallSource {
    seed: u64,
    rng: SmallRng,
}

impl RandomBallSource {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl BallSource for RandomBallSource {
    fn uniform_int(&mut self, range: Range<usize>) -> usize {
        self.rng.random_range(range)
    }

    fn uniform_color(&mut self, palette: u8) -> Color {
        let palette = palette.clamp(1, MAX_COLORS);
        let index = self.rng.random_range(1..=palette);
        // palette is clamped to the valid range above
        Color::new(index).unwrap_or(Color::FIRST)
    }
}

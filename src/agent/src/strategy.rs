use common::model::game::{Move, RoundRecord};
use rand::{rngs::SmallRng, Rng, SeedableRng};

pub trait Strategy: Send {
    fn make_move(&mut self, history: &[RoundRecord]) -> Move;
}

// Trivial strategies
pub struct OnlyRock {}
impl Strategy for OnlyRock {
    fn make_move(&mut self, _: &[RoundRecord]) -> Move {
        Move::Rock
    }
}
pub struct OnlyPaper {}
impl Strategy for OnlyPaper {
    fn make_move(&mut self, _: &[RoundRecord]) -> Move {
        Move::Paper
    }
}
pub struct OnlyScissors {}
impl Strategy for OnlyScissors {
    fn make_move(&mut self, _: &[RoundRecord]) -> Move {
        Move::Scissors
    }
}

// Random
pub struct RandomMove {
    rng: SmallRng,
}
impl RandomMove {
    pub fn new() -> Self {
        RandomMove {
            rng: SmallRng::from_rng(&mut rand::rng()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        RandomMove {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}
impl Default for RandomMove {
    fn default() -> Self {
        Self::new()
    }
}
impl Strategy for RandomMove {
    fn make_move(&mut self, _: &[RoundRecord]) -> Move {
        Move::ALL[self.rng.random_range(0..Move::ALL.len())]
    }
}

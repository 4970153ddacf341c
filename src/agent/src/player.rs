use common::model::game::{Move, RoundRecord};
use tracing::debug;

use crate::strategy::{RandomMove, Strategy};

/// Computer-driven player: a strategy plus the last move it made.
pub struct ComputerPlayer {
    strategy: Box<dyn Strategy>,
    last_move: Option<Move>,
}

impl ComputerPlayer {
    pub fn new(strategy: Box<dyn Strategy>) -> Self {
        ComputerPlayer {
            strategy,
            last_move: None,
        }
    }

    /// Uniform random player.
    pub fn random() -> Self {
        Self::new(Box::new(RandomMove::new()))
    }

    pub fn play(&mut self, history: &[RoundRecord]) -> Move {
        let next_move = self.strategy.make_move(history);
        debug!("Computer plays {}", next_move);
        self.last_move = Some(next_move);
        next_move
    }

    pub fn last_move(&self) -> Option<Move> {
        self.last_move
    }
}

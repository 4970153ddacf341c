use common::model::game::{Move, PlayerId};

/// Choices collected for the round in progress, and whose turn it is.
///
/// Has no notion of an active session; `GameSession` guards every call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoundState {
    active_player: PlayerId,
    choice_one: Option<Move>,
    choice_two: Option<Move>,
}

impl RoundState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_player(&self) -> PlayerId {
        self.active_player
    }

    pub fn pending(&self, player: PlayerId) -> Option<Move> {
        match player {
            PlayerId::One => self.choice_one,
            PlayerId::Two => self.choice_two,
        }
    }

    /// Store `value` for `player` and pass the turn. Returns whether both choices are now in.
    pub fn submit(&mut self, player: PlayerId, value: Move) -> bool {
        match player {
            PlayerId::One => self.choice_one = Some(value),
            PlayerId::Two => self.choice_two = Some(value),
        }
        self.active_player = player.other();
        self.choice_one.is_some() && self.choice_two.is_some()
    }

    /// Both choices, clearing them, once both are in.
    pub fn take_both_if_ready(&mut self) -> Option<(Move, Move)> {
        match (self.choice_one, self.choice_two) {
            (Some(one), Some(two)) => {
                self.choice_one = None;
                self.choice_two = None;
                Some((one, two))
            }
            _ => None,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turns_alternate_from_player_one() {
        let mut round = RoundState::new();
        let moves = [Move::Rock, Move::Rock, Move::Paper, Move::Scissors, Move::Paper];
        let mut expected = PlayerId::One;
        for value in moves {
            assert_eq!(round.active_player(), expected);
            round.submit(expected, value);
            round.take_both_if_ready();
            expected = expected.other();
        }
        assert_eq!(round.active_player(), PlayerId::Two);
    }

    #[test]
    fn take_only_when_both_filled() {
        let mut round = RoundState::new();
        assert!(!round.submit(PlayerId::One, Move::Rock));
        assert_eq!(round.take_both_if_ready(), None);
        assert_eq!(round.pending(PlayerId::One), Some(Move::Rock));

        assert!(round.submit(PlayerId::Two, Move::Scissors));
        assert_eq!(
            round.take_both_if_ready(),
            Some((Move::Rock, Move::Scissors))
        );
        assert_eq!(round.pending(PlayerId::One), None);
        assert_eq!(round.pending(PlayerId::Two), None);
        assert_eq!(round.take_both_if_ready(), None);
    }

    #[test]
    fn round_completion_keeps_turn() {
        let mut round = RoundState::new();
        round.submit(PlayerId::One, Move::Rock);
        round.submit(PlayerId::Two, Move::Paper);
        round.take_both_if_ready();
        assert_eq!(round.active_player(), PlayerId::One);
    }

    #[test]
    fn reset_clears_everything() {
        let mut round = RoundState::new();
        round.submit(PlayerId::One, Move::Paper);
        round.reset();
        assert_eq!(round, RoundState::new());
        assert_eq!(round.active_player(), PlayerId::One);
    }
}

use serde::{Deserialize, Serialize};

use crate::model::game::{Move, PlayerId};

/// Token the arbiter includes in its acknowledgement of a reset.
pub const RESET_ACK: &str = "game_reset";

const RESET_LINE: &str = "reset=1";

// Requests sent to the arbiter, one per line
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    Reset,
    Choices { one: Move, two: Move },
}
impl Request {
    pub fn to_line(&self) -> String {
        match self {
            Request::Reset => RESET_LINE.to_owned(),
            Request::Choices { one, two } => format!(
                "choices=playerOne={};playerTwo={}",
                one.to_wire(),
                two.to_wire()
            ),
        }
    }

    /// Arbiter-side parse of a request line. Used by the test arbiters.
    pub fn parse(line: &str) -> Option<Request> {
        let line = line.trim();
        if line == RESET_LINE {
            return Some(Request::Reset);
        }
        let (one, two) = line.strip_prefix("choices=")?.split_once(';')?;
        let wire = |field: &str, key: &str| {
            field
                .strip_prefix(key)?
                .parse::<i64>()
                .ok()
                .and_then(Move::from_wire)
        };
        Some(Request::Choices {
            one: wire(one, "playerOne=")?,
            two: wire(two, "playerTwo=")?,
        })
    }
}

// Arbiter replies
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    InvalidMove,
    ParseError,
    GameWon(PlayerId),
    Draw,
    RoundWon(PlayerId),
    Unrecognized(String),
}

// Checked in order, first match wins. Errors come first, then game, draw, round.
const REPLY_TOKENS: [(&str, Outcome); 7] = [
    ("invalid_move", Outcome::InvalidMove),
    ("error_parsing_xml", Outcome::ParseError),
    ("one_won_game", Outcome::GameWon(PlayerId::One)),
    ("two_won_game", Outcome::GameWon(PlayerId::Two)),
    ("draw", Outcome::Draw),
    ("one_won_round", Outcome::RoundWon(PlayerId::One)),
    ("two_won_round", Outcome::RoundWon(PlayerId::Two)),
];

impl Outcome {
    pub fn classify(reply: &str) -> Outcome {
        REPLY_TOKENS
            .iter()
            .find(|(token, _)| reply.contains(token))
            .map(|(_, outcome)| outcome.clone())
            .unwrap_or_else(|| Outcome::Unrecognized(reply.to_owned()))
    }

    /// The reply token for this outcome, if it has one.
    pub fn token(&self) -> Option<&'static str> {
        REPLY_TOKENS
            .iter()
            .find(|(_, outcome)| outcome == self)
            .map(|(token, _)| *token)
    }

    pub fn is_semantic_error(&self) -> bool {
        matches!(
            self,
            Outcome::InvalidMove | Outcome::ParseError | Outcome::Unrecognized(_)
        )
    }

    /// Label stored in the round history. `None` for outcomes that don't complete a round.
    pub fn round_label(&self) -> Option<String> {
        match self {
            Outcome::GameWon(player) => Some(format!("Player {} wins the entire game!", player)),
            Outcome::Draw => Some("draw".to_owned()),
            Outcome::RoundWon(player) => Some(format!("Player {} won in round", player)),
            _ => None,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Outcome::InvalidMove => "Invalid move!".to_owned(),
            Outcome::ParseError => "Arbiter could not parse the request".to_owned(),
            Outcome::Unrecognized(raw) => format!("Unexpected arbiter response: {}", raw),
            completed => completed.round_label().unwrap_or_default(),
        }
    }
}

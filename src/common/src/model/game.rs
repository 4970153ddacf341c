use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Rock,
    Paper,
    Scissors,
}
impl Move {
    pub const ALL: [Move; 3] = [Move::Rock, Move::Paper, Move::Scissors];

    /// Wire form of the move, as sent to the arbiter.
    pub fn to_wire(self) -> u8 {
        match self {
            Move::Rock => 0,
            Move::Paper => 1,
            Move::Scissors => 2,
        }
    }

    pub fn from_wire(value: i64) -> Option<Move> {
        match value {
            0 => Some(Move::Rock),
            1 => Some(Move::Paper),
            2 => Some(Move::Scissors),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        wire_to_label(Some(self.to_wire().into()))
    }

    pub fn beats(&self, other: &Move) -> Option<bool> {
        if self == other {
            None
        } else {
            Some(matches!(
                (self, other),
                (Move::Rock, Move::Scissors)
                    | (Move::Scissors, Move::Paper)
                    | (Move::Paper, Move::Rock)
            ))
        }
    }
}

/// Display label for an optional wire value. Total: out-of-range values map to "Unknown".
pub fn wire_to_label(value: Option<i64>) -> &'static str {
    match value {
        None => "None",
        Some(0) => "Rock",
        Some(1) => "Paper",
        Some(2) => "Scissors",
        Some(_) => "Unknown",
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("not a move: {0:?}")]
pub struct ParseMoveError(pub String);

impl FromStr for Move {
    type Err = ParseMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rock" | "r" | "0" => Ok(Move::Rock),
            "paper" | "p" | "1" => Ok(Move::Paper),
            "scissors" | "s" | "2" => Ok(Move::Scissors),
            _ => Err(ParseMoveError(s.to_owned())),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlayerId {
    #[default]
    One,
    Two,
}
impl PlayerId {
    pub fn other(self) -> PlayerId {
        match self {
            PlayerId::One => PlayerId::Two,
            PlayerId::Two => PlayerId::One,
        }
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerId::One => f.write_str("One"),
            PlayerId::Two => f.write_str("Two"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameMode {
    PlayerVsPlayer,
    #[default]
    PlayerVsComputer,
    ComputerVsComputer,
}
impl GameMode {
    /// Short code used in the settings file.
    pub fn code(self) -> &'static str {
        match self {
            GameMode::PlayerVsPlayer => "PvP",
            GameMode::PlayerVsComputer => "PvC",
            GameMode::ComputerVsComputer => "CvC",
        }
    }

    pub fn is_human(self, player: PlayerId) -> bool {
        match self {
            GameMode::PlayerVsPlayer => true,
            GameMode::PlayerVsComputer => player == PlayerId::One,
            GameMode::ComputerVsComputer => false,
        }
    }

    pub fn is_autonomous(self) -> bool {
        self == GameMode::ComputerVsComputer
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown game mode {0:?}, expected PvP, PvC or CvC")]
pub struct ParseGameModeError(pub String);

impl FromStr for GameMode {
    type Err = ParseGameModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "PvP" => Ok(GameMode::PlayerVsPlayer),
            "PvC" => Ok(GameMode::PlayerVsComputer),
            "CvC" => Ok(GameMode::ComputerVsComputer),
            _ => Err(ParseGameModeError(s.to_owned())),
        }
    }
}

// One completed round, as kept in the session history
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RoundRecord {
    pub number: usize,
    pub player_one: String,
    pub player_two: String,
    pub outcome: String,
}

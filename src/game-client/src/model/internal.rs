use common::{
    line::LineChannel,
    model::{
        game::{GameMode, Move, PlayerId, RoundRecord},
        messages::Outcome,
    },
};
use serde::Serialize;
use tokio::sync::oneshot;

use super::error::SessionError;

// Types
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Active,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleReason {
    GameOver,
    ProtocolFailure,
    Stopped,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub mode: GameMode,
    pub active_player: PlayerId,
}

/// Result of an accepted move.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    // Waiting for the other player's choice
    Pending,
    Resolved(Outcome),
}

// Notifications for the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Activated { mode: GameMode },
    Deactivated { reason: IdleReason },
    TurnChanged { active: PlayerId },
    RoundCompleted(RoundRecord),
    GameOver { winner: PlayerId },
    Diagnostic(String),
}

// Messages
pub enum SessionRequest {
    Start {
        channel: Option<Box<dyn LineChannel>>,
        mode: GameMode,
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    HumanMove {
        player: PlayerId,
        value: Move,
        reply: oneshot::Sender<Result<Submission, SessionError>>,
    },
    // From the computer-vs-computer loop; answered with the state after the move. Moves from a
    // loop other than the current one are dropped
    ComputerMove {
        generation: u64,
        player: PlayerId,
        reply: oneshot::Sender<SessionState>,
    },
    // Delayed computer answer to a human move in player-vs-computer
    ComputerReply {
        ticket: u64,
    },
    CancelAutonomous,
    Stop {
        reply: oneshot::Sender<()>,
    },
    History {
        reply: oneshot::Sender<Vec<RoundRecord>>,
    },
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
}

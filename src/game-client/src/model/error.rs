use std::{io, time::Duration};

use common::model::game::PlayerId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("no reply within {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no channel selected or open")]
    ChannelUnavailable,
    #[error("reset was not acknowledged (reply: {reply:?})")]
    HandshakeFailure { reply: String },
    #[error("arbiter did not reply within {0:?}")]
    ProtocolTimeout(Duration),
    #[error("error communicating with arbiter: {0}")]
    Transport(#[source] io::Error),
    #[error("no game in progress")]
    NotActive,
    #[error("it is player {expected}'s turn")]
    OutOfTurn { expected: PlayerId },
    #[error("player {0} is computer controlled")]
    NotHumanPlayer(PlayerId),
    #[error("player {0} is human controlled")]
    NotComputerPlayer(PlayerId),
    #[error("waiting for the computer to move")]
    ComputerTurn,
    #[error("move rejected, too soon after the previous one")]
    RateLimited,
    #[error("session thread has exited")]
    SessionClosed,
}

impl SessionError {
    /// Whether the error ended the session.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SessionError::ProtocolTimeout(_) | SessionError::Transport(_)
        )
    }
}

impl From<ExchangeError> for SessionError {
    fn from(error: ExchangeError) -> Self {
        match error {
            ExchangeError::Timeout(deadline) => SessionError::ProtocolTimeout(deadline),
            ExchangeError::Io(e) => SessionError::Transport(e),
        }
    }
}

use agent::player::ComputerPlayer;
use common::{
    line::LineChannel,
    model::{
        game::{GameMode, Move, PlayerId, RoundRecord},
        messages::Outcome,
    },
    utility::Id,
};
use tokio::{sync::broadcast, time::Instant};
use tracing::{debug, error, info, warn};

use crate::{
    config::SessionSettings,
    model::{
        error::SessionError,
        internal::{IdleReason, SessionEvent, SessionSnapshot, SessionState, Submission},
    },
    service::{protocol::ProtocolClient, rate_limiter::RateLimiter, round_state::RoundState},
};

/// One game against the arbiter: the round in progress, the history, and the channel.
pub struct GameSession {
    id: Option<Id>,
    state: SessionState,
    mode: GameMode,
    round: RoundState,
    protocol: Option<ProtocolClient>,
    history: Vec<RoundRecord>,
    limiter: RateLimiter,
    computers: (ComputerPlayer, ComputerPlayer),
    settings: SessionSettings,
    events: broadcast::Sender<SessionEvent>,
}

impl GameSession {
    pub fn new(settings: SessionSettings) -> Self {
        Self::with_computers(settings, ComputerPlayer::random(), ComputerPlayer::random())
    }

    pub fn with_computers(
        settings: SessionSettings,
        one: ComputerPlayer,
        two: ComputerPlayer,
    ) -> Self {
        let (events, _) = broadcast::channel(100);
        GameSession {
            id: None,
            state: SessionState::Idle,
            mode: GameMode::default(),
            round: RoundState::new(),
            protocol: None,
            history: Vec::new(),
            limiter: RateLimiter::new(settings.min_move_interval),
            computers: (one, two),
            settings,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn event_sender(&self) -> broadcast::Sender<SessionEvent> {
        self.events.clone()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn active_player(&self) -> PlayerId {
        self.round.active_player()
    }

    pub fn pending(&self, player: PlayerId) -> Option<Move> {
        self.round.pending(player)
    }

    pub fn history(&self) -> &[RoundRecord] {
        &self.history
    }

    pub fn settings(&self) -> SessionSettings {
        self.settings
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            mode: self.mode,
            active_player: self.round.active_player(),
        }
    }

    fn notify(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    /// Reset handshake on a freshly opened channel. Any previous channel is released first.
    /// On failure the session stays idle and the new channel is closed.
    pub async fn start_game(
        &mut self,
        channel: Option<Box<dyn LineChannel>>,
        mode: GameMode,
    ) -> Result<(), SessionError> {
        let channel = channel.ok_or(SessionError::ChannelUnavailable)?;
        if self.is_active() {
            self.deactivate(IdleReason::Stopped).await;
        } else {
            self.release_channel().await;
        }

        let mut protocol = ProtocolClient::new(channel);
        let reply = protocol
            .exchange(
                &ProtocolClient::build_reset_message(),
                self.settings.exchange_timeout,
            )
            .await;
        let failure = match reply {
            Ok(reply) if ProtocolClient::is_reset_ack(&reply) => None,
            Ok(reply) => Some(SessionError::HandshakeFailure { reply }),
            Err(e) => Some(SessionError::from(e)),
        };
        if let Some(failure) = failure {
            warn!("Failed to reset the game: {}", failure);
            protocol.close().await;
            self.notify(SessionEvent::Diagnostic(failure.to_string()));
            return Err(failure);
        }

        let id = Id::new();
        self.id = Some(id);
        self.mode = mode;
        self.round.reset();
        self.history.clear();
        self.protocol = Some(protocol);
        self.state = SessionState::Active;
        info!("Session {} active in {} mode", id, mode);
        self.notify(SessionEvent::Activated { mode });
        self.notify(SessionEvent::TurnChanged {
            active: self.round.active_player(),
        });
        Ok(())
    }

    /// A move from a person: must be a human-sourced player, on their turn, and not too soon
    /// after the last accepted human move.
    pub async fn submit_human_choice(
        &mut self,
        player: PlayerId,
        value: Move,
        now: Instant,
    ) -> Result<Submission, SessionError> {
        self.ensure_active()?;
        if !self.mode.is_human(player) {
            return Err(SessionError::NotHumanPlayer(player));
        }
        let expected = self.round.active_player();
        if player != expected {
            return Err(SessionError::OutOfTurn { expected });
        }
        if !self.limiter.allow(now) {
            debug!("Rate limited move from player {}", player);
            return Err(SessionError::RateLimited);
        }
        self.submit_choice(player, value).await
    }

    /// A move drawn from the computer player in `player`'s seat. The seat must be computer-sourced
    /// in the current mode.
    pub async fn submit_computer_choice(
        &mut self,
        player: PlayerId,
    ) -> Result<Submission, SessionError> {
        self.ensure_active()?;
        if self.mode.is_human(player) {
            return Err(SessionError::NotComputerPlayer(player));
        }
        let value = match player {
            PlayerId::One => self.computers.0.play(&self.history),
            PlayerId::Two => self.computers.1.play(&self.history),
        };
        self.submit_choice(player, value).await
    }

    pub async fn submit_choice(
        &mut self,
        player: PlayerId,
        value: Move,
    ) -> Result<Submission, SessionError> {
        self.ensure_active()?;
        debug!("Player {} chose {}", player, value);
        self.round.submit(player, value);
        self.notify(SessionEvent::TurnChanged {
            active: self.round.active_player(),
        });

        let Some((one, two)) = self.round.take_both_if_ready() else {
            return Ok(Submission::Pending);
        };
        let protocol = self
            .protocol
            .as_mut()
            .ok_or(SessionError::ChannelUnavailable)?;
        let reply = protocol
            .exchange(
                &ProtocolClient::build_choice_message(one, two),
                self.settings.exchange_timeout,
            )
            .await;
        let reply = match reply {
            Ok(reply) => reply,
            Err(e) => {
                let failure = SessionError::from(e);
                error!("Round abandoned: {}", failure);
                self.notify(SessionEvent::Diagnostic(failure.to_string()));
                self.deactivate(IdleReason::ProtocolFailure).await;
                return Err(failure);
            }
        };

        let outcome = ProtocolClient::classify(&reply);
        self.apply_outcome(one, two, &outcome).await;
        Ok(Submission::Resolved(outcome))
    }

    async fn apply_outcome(&mut self, one: Move, two: Move, outcome: &Outcome) {
        match outcome {
            Outcome::InvalidMove | Outcome::ParseError | Outcome::Unrecognized(_) => {
                warn!("{}", outcome.describe());
                self.notify(SessionEvent::Diagnostic(outcome.describe()));
            }
            Outcome::GameWon(winner) => {
                self.record(one, two, outcome);
                info!("Player {} wins the game", winner);
                self.notify(SessionEvent::GameOver { winner: *winner });
                self.deactivate(IdleReason::GameOver).await;
            }
            Outcome::Draw | Outcome::RoundWon(_) => self.record(one, two, outcome),
        }
    }

    fn record(&mut self, one: Move, two: Move, outcome: &Outcome) {
        let record = RoundRecord {
            number: self.history.len() + 1,
            player_one: one.label().to_owned(),
            player_two: two.label().to_owned(),
            outcome: outcome.round_label().unwrap_or_default(),
        };
        debug!("Round #{} completed: {:?}", record.number, record);
        self.history.push(record.clone());
        self.notify(SessionEvent::RoundCompleted(record));
    }

    /// Explicit stop. No-op when idle.
    pub async fn stop(&mut self) {
        if self.is_active() {
            self.deactivate(IdleReason::Stopped).await;
        }
    }

    async fn deactivate(&mut self, reason: IdleReason) {
        self.state = SessionState::Idle;
        self.release_channel().await;
        if let Some(id) = self.id.take() {
            info!("Session {} idle: {:?}", id, reason);
        }
        self.notify(SessionEvent::Deactivated { reason });
    }

    async fn release_channel(&mut self) {
        if let Some(protocol) = self.protocol.take() {
            protocol.close().await;
        }
    }

    fn ensure_active(&self) -> Result<(), SessionError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(SessionError::NotActive)
        }
    }
}

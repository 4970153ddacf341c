use common::{
    line::LineChannel,
    model::game::{GameMode, Move, PlayerId, RoundRecord},
};
use tokio::{
    sync::{broadcast, mpsc, oneshot},
    task::JoinHandle,
    time::{sleep, Instant},
};
use tracing::{debug, info, warn};

use crate::{
    config::SessionSettings,
    model::{
        error::SessionError,
        internal::{SessionEvent, SessionRequest, SessionSnapshot, SessionState, Submission},
    },
    service::game_session::GameSession,
};

/// Cloneable front for a session running on its own task. Every call is queued to that task, so
/// exchanges with the arbiter never overlap.
#[derive(Clone)]
pub struct SessionHandle {
    sender: mpsc::Sender<SessionRequest>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionHandle {
    /// Move `session` onto a new task. The task ends on shutdown or once every handle is dropped.
    pub fn spawn(
        session: GameSession,
        shutdown_receiver: broadcast::Receiver<()>,
    ) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(100);
        let events = session.event_sender();
        let thread = SessionThread {
            session,
            requests: sender.downgrade(),
            autonomous: None,
            next_generation: 0,
            awaiting_computer: None,
            next_ticket: 0,
        };
        let handle = tokio::spawn(thread.run(receiver, shutdown_receiver));
        (SessionHandle { sender, events }, handle)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn start_game(
        &self,
        channel: Option<Box<dyn LineChannel>>,
        mode: GameMode,
    ) -> Result<(), SessionError> {
        self.request(|reply| SessionRequest::Start {
            channel,
            mode,
            reply,
        })
        .await?
    }

    pub async fn submit_human_choice(
        &self,
        player: PlayerId,
        value: Move,
    ) -> Result<Submission, SessionError> {
        self.request(|reply| SessionRequest::HumanMove {
            player,
            value,
            reply,
        })
        .await?
    }

    pub async fn cancel_autonomous_play(&self) -> Result<(), SessionError> {
        self.sender
            .send(SessionRequest::CancelAutonomous)
            .await
            .map_err(|_| SessionError::SessionClosed)
    }

    pub async fn stop_game(&self) -> Result<(), SessionError> {
        self.request(|reply| SessionRequest::Stop { reply }).await
    }

    pub async fn round_history(&self) -> Result<Vec<RoundRecord>, SessionError> {
        self.request(|reply| SessionRequest::History { reply })
            .await
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot, SessionError> {
        self.request(|reply| SessionRequest::Snapshot { reply })
            .await
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> SessionRequest,
    ) -> Result<T, SessionError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(build(reply))
            .await
            .map_err(|_| SessionError::SessionClosed)?;
        response.await.map_err(|_| SessionError::SessionClosed)
    }
}

struct SessionThread {
    session: GameSession,
    // Weak so the thread doesn't keep its own queue open
    requests: mpsc::WeakSender<SessionRequest>,
    // Generation of the running computer-vs-computer loop and its cancel signal
    autonomous: Option<(u64, broadcast::Sender<()>)>,
    next_generation: u64,
    awaiting_computer: Option<u64>,
    next_ticket: u64,
}

impl SessionThread {
    async fn run(
        mut self,
        mut receiver: mpsc::Receiver<SessionRequest>,
        mut shutdown_receiver: broadcast::Receiver<()>,
    ) {
        info!("Initialized session thread");
        loop {
            tokio::select! {
                request = receiver.recv() => {
                    let Some(request) = request else {
                        break;
                    };
                    self.handle(request).await;
                    if !self.session.is_active() {
                        self.cancel_autonomous();
                        self.awaiting_computer = None;
                    }
                }
                _ = shutdown_receiver.recv() => {
                    break;
                }
            }
        }
        self.cancel_autonomous();
        self.session.stop().await;
        info!("Exited session thread");
    }

    async fn handle(&mut self, request: SessionRequest) {
        match request {
            SessionRequest::Start {
                channel,
                mode,
                reply,
            } => {
                self.cancel_autonomous();
                self.awaiting_computer = None;
                let result = self.session.start_game(channel, mode).await;
                if result.is_ok() && mode.is_autonomous() {
                    self.spawn_autonomous();
                }
                let _ = reply.send(result);
            }
            SessionRequest::HumanMove {
                player,
                value,
                reply,
            } => {
                let result = if self.awaiting_computer.is_some() {
                    Err(SessionError::ComputerTurn)
                } else {
                    self.session
                        .submit_human_choice(player, value, Instant::now())
                        .await
                };
                if result.is_ok() && self.computer_to_answer() {
                    self.schedule_computer_reply();
                }
                let _ = reply.send(result);
            }
            SessionRequest::ComputerMove {
                generation,
                player,
                reply,
            } => {
                if !self.is_current_loop(generation) {
                    debug!("Dropping computer move from stale loop {}", generation);
                    let _ = reply.send(SessionState::Idle);
                    return;
                }
                if let Err(e) = self.session.submit_computer_choice(player).await {
                    debug!("Computer move for player {} failed: {}", player, e);
                }
                let _ = reply.send(self.session.state());
            }
            SessionRequest::ComputerReply { ticket } => {
                if self.awaiting_computer != Some(ticket) {
                    debug!("Dropping stale computer reply {}", ticket);
                    return;
                }
                self.awaiting_computer = None;
                let player = self.session.active_player();
                if let Err(e) = self.session.submit_computer_choice(player).await {
                    debug!("Computer reply failed: {}", e);
                }
            }
            SessionRequest::CancelAutonomous => self.cancel_autonomous(),
            SessionRequest::Stop { reply } => {
                self.cancel_autonomous();
                self.awaiting_computer = None;
                self.session.stop().await;
                let _ = reply.send(());
            }
            SessionRequest::History { reply } => {
                let _ = reply.send(self.session.history().to_vec());
            }
            SessionRequest::Snapshot { reply } => {
                let _ = reply.send(self.session.snapshot());
            }
        }
    }

    fn computer_to_answer(&self) -> bool {
        self.session.is_active()
            && self.session.mode() == GameMode::PlayerVsComputer
            && !self.session.mode().is_human(self.session.active_player())
    }

    fn schedule_computer_reply(&mut self) {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.awaiting_computer = Some(ticket);
        let requests = self.requests.clone();
        let delay = self.session.settings().computer_reply_delay;
        tokio::spawn(async move {
            sleep(delay).await;
            if let Some(sender) = requests.upgrade() {
                let _ = sender.send(SessionRequest::ComputerReply { ticket }).await;
            }
        });
    }

    fn spawn_autonomous(&mut self) {
        let generation = self.next_generation;
        self.next_generation += 1;
        let (cancel_sender, cancel_receiver) = broadcast::channel(1);
        self.autonomous = Some((generation, cancel_sender));
        tokio::spawn(autonomous_play(
            generation,
            self.requests.clone(),
            cancel_receiver,
            self.session.settings(),
        ));
    }

    fn is_current_loop(&self, generation: u64) -> bool {
        matches!(self.autonomous, Some((current, _)) if current == generation)
    }

    fn cancel_autonomous(&mut self) {
        if let Some((generation, cancel)) = self.autonomous.take() {
            debug!("Cancelling computer vs computer play {}", generation);
            let _ = cancel.send(());
        }
    }
}

/// Computer vs computer: pace, move for one, pace, move for two, until cancelled or the
/// session goes idle. Cancelling between the two moves leaves the half-filled round as is.
async fn autonomous_play(
    generation: u64,
    requests: mpsc::WeakSender<SessionRequest>,
    mut cancel: broadcast::Receiver<()>,
    settings: SessionSettings,
) {
    info!("Computer vs computer play {} started", generation);
    let seats = [
        (PlayerId::One, settings.first_pacing),
        (PlayerId::Two, settings.second_pacing),
    ];
    'play: loop {
        for (player, pacing) in seats {
            tokio::select! {
                biased;
                _ = cancel.recv() => break 'play,
                _ = sleep(pacing) => {}
            }
            let Some(sender) = requests.upgrade() else {
                break 'play;
            };
            let (reply, state) = oneshot::channel();
            if sender
                .send(SessionRequest::ComputerMove {
                    generation,
                    player,
                    reply,
                })
                .await
                .is_err()
            {
                warn!("Session thread gone");
                break 'play;
            }
            drop(sender);
            if !matches!(state.await, Ok(SessionState::Active)) {
                break 'play;
            }
        }
    }
    info!("Computer vs computer play {} stopped", generation);
}

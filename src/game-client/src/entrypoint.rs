use std::path::{Path, PathBuf};

use common::{
    line,
    model::game::{GameMode, Move},
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast,
    task::JoinHandle,
};
use tracing::{error, info, warn};

use crate::{
    config::{ClientConfig, SessionSettings},
    model::{
        error::SessionError,
        internal::{SessionEvent, SessionState},
    },
    service::{game_session::GameSession, session_thread::SessionHandle},
};

const COMMAND_HINT: &str = "try rock, paper, scissors, history, cancel, stop, restart, quit";

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub config_path: PathBuf,
    pub port: Option<String>,
    pub mode: Option<GameMode>,
}

/// Console front end: one game per `restart`, moves typed on stdin.
pub async fn run(
    options: ClientOptions,
    shutdown_receiver: broadcast::Receiver<()>,
) -> Result<(), SessionError> {
    let mut config = ClientConfig::load_or_default(&options.config_path);
    if let Some(port) = options.port {
        config.port = Some(port);
    }
    if let Some(mode) = options.mode {
        config.game_mode = mode;
    }

    let mut input_shutdown_receiver = shutdown_receiver.resubscribe();
    let (session, session_thread) = SessionHandle::spawn(
        GameSession::new(SessionSettings::default()),
        shutdown_receiver,
    );
    let printer = spawn_printer(session.subscribe());

    if let Err(e) = start(&session, &config, &options.config_path).await {
        println!("Error: {}", e);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Ok(Some(line)) = line else {
                    break;
                };
                match line.trim() {
                    "" => {}
                    "quit" | "exit" => break,
                    "cancel" => session.cancel_autonomous_play().await?,
                    "stop" => session.stop_game().await?,
                    "restart" => {
                        if let Err(e) = start(&session, &config, &options.config_path).await {
                            println!("Error: {}", e);
                        }
                    }
                    "history" => {
                        let history = session.round_history().await?;
                        match serde_json::to_string_pretty(&history) {
                            Ok(text) => println!("{}", text),
                            Err(e) => warn!("Could not render history: {}", e),
                        }
                    }
                    command => match command.parse::<Move>() {
                        Ok(value) => play(&session, value).await?,
                        Err(e) => println!("{} ({})", e, COMMAND_HINT),
                    },
                }
            }
            _ = input_shutdown_receiver.recv() => {
                break;
            }
        }
    }

    // The thread may already be gone after a shutdown signal
    let _ = session.stop_game().await;
    drop(session);
    if let Err(e) = session_thread.await {
        error!("Session thread exited non-gracefully: {}", e);
    }
    printer.abort();
    Ok(())
}

async fn start(
    session: &SessionHandle,
    config: &ClientConfig,
    config_path: &Path,
) -> Result<(), SessionError> {
    let channel = match &config.port {
        Some(port) => {
            info!("Opening {} at {} baud", port, config.baud_rate);
            match line::open(port).await {
                Ok(channel) => Some(channel),
                Err(e) => {
                    warn!("Could not open {}: {}", port, e);
                    None
                }
            }
        }
        None => None,
    };
    session.start_game(channel, config.game_mode).await?;
    if let Err(e) = config.save(config_path) {
        warn!("Error saving configuration: {}", e);
    }
    Ok(())
}

async fn play(session: &SessionHandle, value: Move) -> Result<(), SessionError> {
    let snapshot = session.snapshot().await?;
    if snapshot.state == SessionState::Idle {
        println!("No game in progress, type restart");
        return Ok(());
    }
    match session
        .submit_human_choice(snapshot.active_player, value)
        .await
    {
        Ok(_) => Ok(()),
        Err(SessionError::SessionClosed) => Err(SessionError::SessionClosed),
        // Fatal errors are already reported through the event stream
        Err(e) if e.is_fatal() => Ok(()),
        Err(e) => {
            println!("{}", e);
            Ok(())
        }
    }
}

fn spawn_printer(mut events: broadcast::Receiver<SessionEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => print_event(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Missed {} session events", skipped)
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

fn print_event(event: SessionEvent) {
    match event {
        SessionEvent::Activated { mode } => println!("Game started ({})", mode),
        SessionEvent::Deactivated { reason } => println!("Game inactive ({:?})", reason),
        SessionEvent::TurnChanged { active } => println!("Current player: {}", active),
        SessionEvent::RoundCompleted(record) => {
            println!("[ ROUND #{} COMPLETED ]", record.number);
            println!("---------------------------------");
            println!("• PLAYER ONE => {}", record.player_one);
            println!("• PLAYER TWO => {}", record.player_two);
            println!("---------------------------------");
            println!("OUTCOME => {}", record.outcome);
        }
        SessionEvent::GameOver { winner } => println!("Player {} wins the entire game!", winner),
        SessionEvent::Diagnostic(message) => println!("{}", message),
    }
}

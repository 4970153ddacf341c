use std::time::Duration;

use agent::{
    player::ComputerPlayer,
    strategy::{OnlyRock, OnlyScissors, RandomMove},
};
use common::{
    model::game::{GameMode, Move, PlayerId},
    test::{RefereeChannel, ScriptedChannel, Step, TestCase},
};
use game_client::{
    config::SessionSettings,
    model::{
        error::SessionError,
        internal::{IdleReason, SessionEvent, SessionState, Submission},
    },
    service::{game_session::GameSession, session_thread::SessionHandle},
};
use tokio::{sync::broadcast, time::sleep};

fn settings() -> SessionSettings {
    SessionSettings {
        min_move_interval: Duration::ZERO,
        ..SessionSettings::default()
    }
}

fn spawn(session: GameSession) -> (SessionHandle, broadcast::Sender<()>) {
    let (shutdown_sender, shutdown_receiver) = broadcast::channel(1);
    let (handle, _) = SessionHandle::spawn(session, shutdown_receiver);
    (handle, shutdown_sender)
}

fn rock_vs_scissors() -> GameSession {
    GameSession::with_computers(
        settings(),
        ComputerPlayer::new(Box::new(OnlyRock {})),
        ComputerPlayer::new(Box::new(OnlyScissors {})),
    )
}

#[tokio::test]
async fn run_game() {
    for (final_reply, final_outcome, active) in [
        ("two_won_round;", "Player Two won in round", true),
        ("one_won_game;", "Player One wins the entire game!", false),
    ] {
        let file_path =
            env!("CARGO_MANIFEST_DIR").to_string() + "/test/data/round_then_game.json";
        let replacements = vec![
            ("final_reply", final_reply.to_string()),
            ("final_outcome", final_outcome.to_string()),
            ("active", active.to_string()),
        ];
        let test_case = TestCase::load(file_path, replacements);

        let (session, _shutdown) = spawn(GameSession::new(settings()));
        session
            .start_game(Some(test_case.channel().boxed()), test_case.mode)
            .await
            .unwrap();
        for (player, value) in test_case.moves.iter() {
            session.submit_human_choice(*player, *value).await.unwrap();
        }

        assert_eq!(session.round_history().await.unwrap(), test_case.history);
        let state = session.snapshot().await.unwrap().state;
        assert_eq!(state == SessionState::Active, test_case.active);
    }
}

#[tokio::test(start_paused = true)]
async fn computers_play_until_game_won() {
    let session = GameSession::with_computers(
        settings(),
        ComputerPlayer::new(Box::new(RandomMove::seeded(3))),
        ComputerPlayer::new(Box::new(RandomMove::seeded(11))),
    );
    let (session, _shutdown) = spawn(session);
    let mut events = session.subscribe();
    let referee = RefereeChannel::new(3);
    let transcript = referee.transcript();

    session
        .start_game(Some(referee.boxed()), GameMode::ComputerVsComputer)
        .await
        .unwrap();

    let winner = loop {
        match events.recv().await {
            Ok(SessionEvent::GameOver { winner }) => break winner,
            Err(broadcast::error::RecvError::Closed) => panic!("Session events closed"),
            _ => continue,
        }
    };

    let history = session.round_history().await.unwrap();
    assert!(!history.is_empty());
    let last = history.last().unwrap();
    assert_eq!(
        last.outcome,
        format!("Player {} wins the entire game!", winner)
    );
    for (index, record) in history.iter().enumerate() {
        assert_eq!(record.number, index + 1);
    }
    assert_eq!(
        session.snapshot().await.unwrap().state,
        SessionState::Idle
    );
    assert!(transcript.is_closed());

    // Loop has stopped: no further requests reach the arbiter
    let sent = transcript.lines().len();
    sleep(Duration::from_secs(5)).await;
    assert_eq!(transcript.lines().len(), sent);
}

#[tokio::test(start_paused = true)]
async fn cancel_between_moves_leaves_round_half_filled() {
    let settings = settings();
    let session = GameSession::with_computers(
        settings,
        ComputerPlayer::new(Box::new(OnlyRock {})),
        ComputerPlayer::new(Box::new(OnlyScissors {})),
    );
    let (session, _shutdown) = spawn(session);
    let channel = ScriptedChannel::new([Step::reply("reset=1", "ok;game_reset;")]);
    let transcript = channel.transcript();

    session
        .start_game(Some(channel.boxed()), GameMode::ComputerVsComputer)
        .await
        .unwrap();
    // Past player one's pacing, before player two's
    sleep(settings.first_pacing + Duration::from_millis(100)).await;
    session.cancel_autonomous_play().await.unwrap();

    let snapshot = session.snapshot().await.unwrap();
    assert_eq!(snapshot.state, SessionState::Active);
    assert_eq!(snapshot.active_player, PlayerId::Two);

    sleep(Duration::from_secs(5)).await;
    assert_eq!(transcript.lines(), vec!["reset=1".to_owned()]);
    assert_eq!(
        session.snapshot().await.unwrap().active_player,
        PlayerId::Two
    );
}

#[tokio::test(start_paused = true)]
async fn restart_mid_computer_play_starts_clean() {
    let settings = settings();
    let (session, _shutdown) = spawn(rock_vs_scissors());
    let first = ScriptedChannel::new([Step::reply("reset=1", "ok;game_reset;")]);
    session
        .start_game(Some(first.boxed()), GameMode::ComputerVsComputer)
        .await
        .unwrap();

    // The loop's first move is due as the restart is queued
    sleep(settings.first_pacing).await;
    let second = ScriptedChannel::new([Step::reply("reset=1", "ok;game_reset;")]);
    let transcript = second.transcript();
    session
        .start_game(Some(second.boxed()), GameMode::PlayerVsPlayer)
        .await
        .unwrap();

    sleep(Duration::from_secs(5)).await;
    let snapshot = session.snapshot().await.unwrap();
    assert_eq!(snapshot.mode, GameMode::PlayerVsPlayer);
    assert_eq!(snapshot.active_player, PlayerId::One);
    assert_eq!(transcript.lines(), vec!["reset=1".to_owned()]);
    assert_eq!(
        session
            .submit_human_choice(PlayerId::One, Move::Rock)
            .await
            .unwrap(),
        Submission::Pending
    );
}

#[tokio::test(start_paused = true)]
async fn timeout_stops_computer_play() {
    let (session, _shutdown) = spawn(rock_vs_scissors());
    let mut events = session.subscribe();
    let channel = ScriptedChannel::new([
        Step::reply("reset=1", "ok;game_reset;"),
        Step::reply("choices=playerOne=0;playerTwo=2", "one_won_round;"),
        Step::silence("choices=playerOne=0;playerTwo=2"),
    ]);
    let transcript = channel.transcript();

    session
        .start_game(Some(channel.boxed()), GameMode::ComputerVsComputer)
        .await
        .unwrap();

    let reason = loop {
        match events.recv().await {
            Ok(SessionEvent::Deactivated { reason }) => break reason,
            Err(broadcast::error::RecvError::Closed) => panic!("Session events closed"),
            _ => continue,
        }
    };
    assert_eq!(reason, IdleReason::ProtocolFailure);
    assert_eq!(session.round_history().await.unwrap().len(), 1);

    sleep(Duration::from_secs(5)).await;
    assert_eq!(transcript.lines().len(), 3);
    assert!(transcript.is_closed());
}

#[tokio::test(start_paused = true)]
async fn computer_answers_human_in_pvc() {
    let settings = settings();
    let session = GameSession::with_computers(
        settings,
        ComputerPlayer::new(Box::new(OnlyRock {})),
        ComputerPlayer::new(Box::new(OnlyScissors {})),
    );
    let (session, _shutdown) = spawn(session);
    let channel = ScriptedChannel::new([
        Step::reply("reset=1", "ok;game_reset;"),
        Step::reply("choices=playerOne=1;playerTwo=2", "two_won_round;"),
    ]);

    session
        .start_game(Some(channel.boxed()), GameMode::PlayerVsComputer)
        .await
        .unwrap();
    assert_eq!(
        session
            .submit_human_choice(PlayerId::One, Move::Paper)
            .await
            .unwrap(),
        Submission::Pending
    );
    assert!(matches!(
        session.submit_human_choice(PlayerId::One, Move::Rock).await,
        Err(SessionError::ComputerTurn)
    ));

    sleep(settings.computer_reply_delay + Duration::from_millis(100)).await;
    let history = session.round_history().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].player_one, "Paper");
    assert_eq!(history[0].player_two, "Scissors");
    assert_eq!(history[0].outcome, "Player Two won in round");
    assert_eq!(
        session.snapshot().await.unwrap().active_player,
        PlayerId::One
    );
}

#[tokio::test]
async fn human_moves_rejected_in_cvc_and_when_idle() {
    let (session, _shutdown) = spawn(rock_vs_scissors());
    assert!(matches!(
        session.submit_human_choice(PlayerId::One, Move::Rock).await,
        Err(SessionError::NotActive)
    ));
    assert!(matches!(
        session.start_game(None, GameMode::PlayerVsPlayer).await,
        Err(SessionError::ChannelUnavailable)
    ));

    let channel = ScriptedChannel::new([Step::reply("reset=1", "game_reset")]);
    session
        .start_game(Some(channel.boxed()), GameMode::ComputerVsComputer)
        .await
        .unwrap();
    assert!(matches!(
        session.submit_human_choice(PlayerId::One, Move::Rock).await,
        Err(SessionError::NotHumanPlayer(PlayerId::One))
    ));
    session.stop_game().await.unwrap();
    assert_eq!(
        session.snapshot().await.unwrap().state,
        SessionState::Idle
    );
}

#[tokio::test]
async fn shutdown_ends_session_thread() {
    let (shutdown_sender, shutdown_receiver) = broadcast::channel(1);
    let (session, thread) = SessionHandle::spawn(rock_vs_scissors(), shutdown_receiver);
    let channel = ScriptedChannel::new([Step::reply("reset=1", "game_reset")]);
    let transcript = channel.transcript();
    session
        .start_game(Some(channel.boxed()), GameMode::PlayerVsPlayer)
        .await
        .unwrap();

    shutdown_sender.send(()).unwrap();
    thread.await.unwrap();
    assert!(transcript.is_closed());
    assert!(matches!(
        session.snapshot().await,
        Err(SessionError::SessionClosed)
    ));
}

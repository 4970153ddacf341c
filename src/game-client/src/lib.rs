pub mod config;
pub mod entrypoint;
pub mod model {
    pub mod error;
    pub mod internal;
}
pub mod service {
    pub mod game_session;
    pub mod protocol;
    pub mod rate_limiter;
    pub mod round_state;
    pub mod session_thread;
}

use std::{fmt, fs, io, path::Path, time::Duration};

use common::model::game::GameMode;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_CONFIG_PATH: &str = "config.ini";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not access settings file: {0}")]
    Io(#[from] io::Error),
    #[error("unknown setting {0:?}")]
    UnknownKey(String),
    #[error("unsupported baud rate {0:?}, expected one of 4800, 9600, 19200, 38400, 57600")]
    UnsupportedBaudRate(String),
    #[error(transparent)]
    UnknownGameMode(#[from] common::model::game::ParseGameModeError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaudRate(u32);
impl BaudRate {
    pub const SUPPORTED: [u32; 5] = [4800, 9600, 19200, 38400, 57600];

    pub fn value(self) -> u32 {
        self.0
    }
}
impl Default for BaudRate {
    fn default() -> Self {
        BaudRate(9600)
    }
}
impl TryFrom<&str> for BaudRate {
    type Error = ConfigError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|rate| Self::SUPPORTED.contains(rate))
            .map(BaudRate)
            .ok_or_else(|| ConfigError::UnsupportedBaudRate(value.to_owned()))
    }
}
impl fmt::Display for BaudRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Persisted client settings, stored as `key=value` lines.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClientConfig {
    pub port: Option<String>,
    pub baud_rate: BaudRate,
    pub game_mode: GameMode,
}

impl ClientConfig {
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "port" => Some(self.port.clone().unwrap_or_default()),
            "baudRate" => Some(self.baud_rate.to_string()),
            "gameMode" => Some(self.game_mode.to_string()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "port" => {
                let value = value.trim();
                self.port = (!value.is_empty()).then(|| value.to_owned());
            }
            "baudRate" => self.baud_rate = BaudRate::try_from(value)?,
            "gameMode" => self.game_mode = value.parse()?,
            _ => return Err(ConfigError::UnknownKey(key.to_owned())),
        }
        Ok(())
    }

    /// Parse settings text. Bad values keep their default; unknown keys are skipped.
    pub fn parse(text: &str) -> Self {
        let mut config = ClientConfig::default();
        for line in text.lines().filter(|line| !line.trim().is_empty()) {
            let Some((key, value)) = line.split_once('=') else {
                debug!("Skipping settings line {:?}", line);
                continue;
            };
            match config.set(key.trim(), value.trim()) {
                Ok(()) => {}
                Err(ConfigError::UnknownKey(key)) => debug!("Ignoring setting {:?}", key),
                Err(e) => warn!("{}, using default", e),
            }
        }
        config
    }

    /// Missing file means defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(Self::parse(&text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            warn!("Error loading configuration: {}", e);
            Self::default()
        })
    }

    pub fn to_ini(&self) -> String {
        ["port", "baudRate", "gameMode"]
            .iter()
            .map(|key| format!("{}={}\n", key, self.get(key).unwrap_or_default()))
            .collect()
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        fs::write(path, self.to_ini())?;
        Ok(())
    }
}

/// Timing used by a game session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSettings {
    pub exchange_timeout: Duration,
    pub min_move_interval: Duration,
    // Computer vs computer: wait before player one moves, then before player two moves
    pub first_pacing: Duration,
    pub second_pacing: Duration,
    pub computer_reply_delay: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        SessionSettings {
            exchange_timeout: Duration::from_millis(2000),
            min_move_interval: Duration::from_millis(500),
            first_pacing: Duration::from_millis(300),
            second_pacing: Duration::from_millis(500),
            computer_reply_delay: Duration::from_millis(500),
        }
    }
}

//! Server configuration.

use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use mafia_room::CoordinatorConfig;

use crate::MafiaError;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

/// Settings for a [`MafiaServer`](crate::MafiaServer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub bind_addr: String,

    /// Capacity of each connection's outbound queue. A client that falls
    /// this many events behind is disconnected.
    pub outbound_buffer: usize,

    /// Capacity of the coordinator's command queue. Readers wait when it
    /// is full.
    pub command_buffer: usize,

    /// Close connections that send nothing for this long. `None` keeps
    /// idle connections open.
    pub idle_timeout: Option<Duration>,

    pub coordinator: CoordinatorConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: format!("{DEFAULT_HOST}:{DEFAULT_PORT}"),
            outbound_buffer: 64,
            command_buffer: 256,
            idle_timeout: None,
            coordinator: CoordinatorConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Reads configuration from the process environment.
    ///
    /// | variable | effect |
    /// |---|---|
    /// | `PORT` | listen port (default 8080) |
    /// | `MAFIA_BIND_HOST` | listen host (default `0.0.0.0`) |
    /// | `MAFIA_OUTBOUND_BUFFER` | per-connection queue capacity |
    /// | `MAFIA_IDLE_TIMEOUT_SECS` | idle timeout in seconds |
    /// | `MAFIA_SEED` | fixed RNG seed for codes and role shuffles |
    ///
    /// # Errors
    /// [`MafiaError::Config`] if a variable is set but doesn't parse.
    pub fn from_env() -> Result<Self, MafiaError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), but reads variables through
    /// `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, MafiaError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let host = lookup("MAFIA_BIND_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse::<u16, _>(&lookup, "PORT")?.unwrap_or(DEFAULT_PORT);
        config.bind_addr = format!("{host}:{port}");

        if let Some(buffer) = parse(&lookup, "MAFIA_OUTBOUND_BUFFER")? {
            config.outbound_buffer = buffer;
        }
        if let Some(secs) = parse(&lookup, "MAFIA_IDLE_TIMEOUT_SECS")? {
            config.idle_timeout = Some(Duration::from_secs(secs));
        }
        config.coordinator.seed = parse(&lookup, "MAFIA_SEED")?;

        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the server can't run with.
    ///
    /// # Errors
    /// [`MafiaError::Config`] naming the offending field.
    pub fn validate(&self) -> Result<(), MafiaError> {
        if self.outbound_buffer == 0 {
            return Err(MafiaError::Config("outbound_buffer must be at least 1".into()));
        }
        if self.command_buffer == 0 {
            return Err(MafiaError::Config("command_buffer must be at least 1".into()));
        }
        if self.coordinator.code_length == 0 {
            return Err(MafiaError::Config("code_length must be at least 1".into()));
        }
        Ok(())
    }
}

fn parse<T, F>(lookup: &F, key: &str) -> Result<Option<T>, MafiaError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|e| MafiaError::Config(format!("{key}={raw:?}: {e}")))
}

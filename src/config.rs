//! Runtime configuration read from the environment (after `.env` is loaded).

use std::env;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_PREFIX: &str = "?";
pub const DEFAULT_IDLE_DISCONNECT_SECS: u64 = 15;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub discord_token: String,
    pub prefix: String,
    /// How long an idle player stays in its voice channel.
    pub idle_timeout: Duration,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let discord_token = lookup("DISCORD_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;

        let prefix = lookup("COMMAND_PREFIX")
            .filter(|prefix| !prefix.is_empty())
            .unwrap_or_else(|| DEFAULT_PREFIX.to_string());

        let idle_secs = match lookup("IDLE_DISCONNECT_SECS") {
            Some(value) => value.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
                name: "IDLE_DISCONNECT_SECS",
                value,
            })?,
            None => DEFAULT_IDLE_DISCONNECT_SECS,
        };

        Ok(Self {
            discord_token,
            prefix,
            idle_timeout: Duration::from_secs(idle_secs),
        })
    }
}

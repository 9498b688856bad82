use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::music::idle_supervisor::IdleConfig;
use crate::music::queue_manager::QueueLimits;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has an invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub environment: Environment,
    pub command_prefix: String,
    pub max_queue_size: usize,
    pub max_track_duration: Duration,
    pub auto_disconnect_timeout: Duration,
    pub idle_poll_interval: Duration,
    pub panel_refresh_interval: Duration,
    pub panel_retire_delay: Duration,
    pub update_marker_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let discord_token = lookup("DISCORD_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;

        let environment = match lookup("ENVIRONMENT").as_deref() {
            None | Some("development") => Environment::Development,
            Some("production") => Environment::Production,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "ENVIRONMENT",
                    value: other.to_string(),
                    reason: "expected development or production".to_string(),
                });
            }
        };

        let command_prefix = match environment {
            Environment::Development => lookup("COMMAND_PREFIX_DEV").unwrap_or_else(|| "?".to_string()),
            Environment::Production => lookup("COMMAND_PREFIX_PROD").unwrap_or_else(|| "!".to_string()),
        };

        let max_queue_size = ranged(&lookup, "MAX_QUEUE_SIZE", 50, 1, 100)?;
        let max_track_duration = ranged(&lookup, "MAX_TRACK_DURATION", 1800, 1, 7200)?;
        let auto_disconnect_timeout = ranged(&lookup, "AUTO_DISCONNECT_TIMEOUT", 300, 60, 3600)?;
        let idle_poll_interval = ranged(&lookup, "IDLE_POLL_INTERVAL", 60, 1, u64::MAX)?;
        let panel_refresh_interval = ranged(&lookup, "PANEL_REFRESH_INTERVAL", 10, 1, u64::MAX)?;
        let panel_retire_delay = ranged(&lookup, "PANEL_RETIRE_DELAY", 2000, 0, u64::MAX)?;

        let update_marker_path = lookup("UPDATE_MARKER_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data/update_completed.json"));

        Ok(Self {
            discord_token,
            environment,
            command_prefix,
            max_queue_size: max_queue_size as usize,
            max_track_duration: Duration::from_secs(max_track_duration),
            auto_disconnect_timeout: Duration::from_secs(auto_disconnect_timeout),
            idle_poll_interval: Duration::from_secs(idle_poll_interval),
            panel_refresh_interval: Duration::from_secs(panel_refresh_interval),
            panel_retire_delay: Duration::from_millis(panel_retire_delay),
            update_marker_path,
        })
    }

    pub fn queue_limits(&self) -> QueueLimits {
        QueueLimits {
            max_queue_size: self.max_queue_size,
            max_track_duration_ms: self.max_track_duration.as_millis() as u64,
        }
    }

    pub fn idle_config(&self) -> IdleConfig {
        IdleConfig {
            poll_interval: self.idle_poll_interval,
            inactive_timeout: self.auto_disconnect_timeout,
        }
    }
}

fn ranged(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: u64,
    min: u64,
    max: u64,
) -> Result<u64, ConfigError> {
    let Some(raw) = lookup(var) else {
        return Ok(default);
    };
    let value: u64 = raw.trim().parse().map_err(|_| ConfigError::Invalid {
        var,
        value: raw.clone(),
        reason: "not a whole number".to_string(),
    })?;
    if value < min || value > max {
        return Err(ConfigError::Invalid {
            var,
            value: raw,
            reason: format!("must be between {} and {}", min, max),
        });
    }
    Ok(value)
}

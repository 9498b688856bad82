//! Process-wide counters shown by `stats` and logged periodically.

use chrono::{DateTime, TimeDelta, Utc};
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::info;

use crate::music::music_manager::SessionRegistry;

pub const STATS_LOG_INTERVAL: Duration = Duration::from_secs(5 * 60);

pub struct BotStats {
    started_at: DateTime<Utc>,
    commands_executed: AtomicU64,
}

impl Default for BotStats {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl BotStats {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            commands_executed: AtomicU64::new(0),
        }
    }

    pub fn record_command(&self) -> u64 {
        self.commands_executed.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn commands_executed(&self) -> u64 {
        self.commands_executed.load(Ordering::Relaxed)
    }

    pub fn uptime_at(&self, now: DateTime<Utc>) -> TimeDelta {
        now.signed_duration_since(self.started_at)
            .max(TimeDelta::zero())
    }

    pub fn uptime(&self) -> TimeDelta {
        self.uptime_at(Utc::now())
    }
}

/// `1d 2h 3m 4s`, dropping leading zero units.
pub fn format_uptime(uptime: TimeDelta) -> String {
    let total = uptime.num_seconds().max(0);
    let (days, hours, minutes, seconds) = (
        total / 86_400,
        total % 86_400 / 3_600,
        total % 3_600 / 60,
        total % 60,
    );

    if days > 0 {
        format!("{}d {}h {}m {}s", days, hours, minutes, seconds)
    } else if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// Status line shown under the bot's name.
pub fn presence_text(prefix: &str, guild_count: usize) -> String {
    let servers = if guild_count == 1 { "server" } else { "servers" };
    format!("{}help | {} {}", prefix, guild_count, servers)
}

/// Log a one-line summary every [`STATS_LOG_INTERVAL`] for the life of the
/// process.
pub fn spawn_stats_logger(
    cache: Arc<serenity::Cache>,
    registry: Arc<SessionRegistry>,
    stats: Arc<BotStats>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(STATS_LOG_INTERVAL);
        // The first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            info!(
                "Bot stats: guilds={} music_sessions={} commands_executed={} uptime={}",
                cache.guild_count(),
                registry.session_count(),
                stats.commands_executed(),
                format_uptime(stats.uptime())
            );
        }
    })
}

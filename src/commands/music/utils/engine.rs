//! The boundary between playback sessions and the audio backend.

use serenity::model::id::{ChannelId, GuildId};
use std::time::Duration;

use super::music_manager::MusicResult;
use super::track::{Track, TrackKey};

/// Asynchronous notifications from the audio backend.
///
/// Every event names the track entry it belongs to so a session can ignore
/// events for a track it has already moved past.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    TrackStarted {
        guild_id: GuildId,
        key: TrackKey,
    },
    TrackEnded {
        guild_id: GuildId,
        key: TrackKey,
    },
    TrackException {
        guild_id: GuildId,
        key: TrackKey,
        error: String,
    },
}

impl EngineEvent {
    pub fn guild_id(&self) -> GuildId {
        match self {
            EngineEvent::TrackStarted { guild_id, .. }
            | EngineEvent::TrackEnded { guild_id, .. }
            | EngineEvent::TrackException { guild_id, .. } => *guild_id,
        }
    }

    pub fn key(&self) -> TrackKey {
        match self {
            EngineEvent::TrackStarted { key, .. }
            | EngineEvent::TrackEnded { key, .. }
            | EngineEvent::TrackException { key, .. } => *key,
        }
    }
}

/// Search, voice connection and playback control for one bot instance.
///
/// Implementations must not call back into a session; results of playback
/// are reported through [`EngineEvent`]s instead.
#[cfg_attr(test, mockall::automock)]
#[serenity::async_trait]
pub trait AudioEngine: Send + Sync {
    /// Resolve a URL or free-text query. An empty result is not an error.
    async fn search(&self, query: &str) -> MusicResult<Vec<Track>>;

    async fn connect(&self, guild_id: GuildId, channel_id: ChannelId) -> MusicResult<()>;

    /// Start `track`, replacing whatever the guild was playing.
    async fn play(&self, guild_id: GuildId, track: &Track, volume: u8) -> MusicResult<()>;

    async fn pause(&self, guild_id: GuildId, paused: bool) -> MusicResult<()>;

    async fn stop(&self, guild_id: GuildId) -> MusicResult<()>;

    async fn set_volume(&self, guild_id: GuildId, volume: u8) -> MusicResult<()>;

    /// Playback position of the active track, if there is one.
    async fn position(&self, guild_id: GuildId) -> Option<Duration>;

    async fn disconnect(&self, guild_id: GuildId) -> MusicResult<()>;
}

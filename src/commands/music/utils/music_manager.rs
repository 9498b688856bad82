use futures::future::join_all;
use poise::serenity_prelude as serenity;
use serenity::client::Context;
use serenity::model::id::{ChannelId, GuildId, UserId};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::engine::{AudioEngine, EngineEvent};
use super::idle_supervisor::IdleConfig;
use super::panel_sync::PanelSynchronizer;
use super::queue_manager::QueueLimits;
use super::session::{Session, SessionMap};

/// Errors that can occur during music operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MusicError {
    #[error("Not in a guild")]
    NotInGuild,

    #[error("Failed to join voice channel: {0}")]
    JoinError(String),

    #[error("Not connected to a voice channel")]
    NotConnected,

    #[error("Failed to get voice manager")]
    NoVoiceManager,

    #[error("User is not in a voice channel")]
    UserNotInVoiceChannel,

    #[error("Nothing is playing")]
    NothingPlaying,

    #[error("Playback is already paused")]
    AlreadyPaused,

    #[error("Playback is not paused")]
    NotPaused,

    #[error("The queue is empty")]
    EmptyQueue,

    #[error("The queue is full ({max} tracks)")]
    QueueFull { max: usize },

    #[error("Track is too long ({}s, the limit is {}s)", .duration_ms / 1000, .max_ms / 1000)]
    TrackTooLong { duration_ms: u64, max_ms: u64 },

    #[error("Volume must be between 0 and 100, got {0}")]
    InvalidVolume(i32),

    #[error("There is no track at position {0}")]
    InvalidPosition(usize),

    #[error("No results for \"{0}\"")]
    NoResults(String),

    #[error("Audio engine error: {0}")]
    EngineCall(String),

    #[error("Failed to render player panel: {0}")]
    PanelRender(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl MusicError {
    /// Validation failures the user caused, as opposed to backend trouble.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            MusicError::NotInGuild
                | MusicError::UserNotInVoiceChannel
                | MusicError::NothingPlaying
                | MusicError::AlreadyPaused
                | MusicError::NotPaused
                | MusicError::EmptyQueue
                | MusicError::QueueFull { .. }
                | MusicError::TrackTooLong { .. }
                | MusicError::InvalidVolume(_)
                | MusicError::InvalidPosition(_)
                | MusicError::NoResults(_)
        )
    }
}

/// Result type for music operations
pub type MusicResult<T> = Result<T, MusicError>;

/// Owns every guild's playback session.
///
/// Built once at startup and shared with commands through the framework's
/// user data.
pub struct SessionRegistry {
    sessions: Arc<SessionMap>,
    engine: Arc<dyn AudioEngine>,
    panels: Arc<PanelSynchronizer>,
    limits: QueueLimits,
    idle: IdleConfig,
}

impl SessionRegistry {
    pub fn new(
        engine: Arc<dyn AudioEngine>,
        panels: Arc<PanelSynchronizer>,
        limits: QueueLimits,
        idle: IdleConfig,
    ) -> Self {
        Self {
            sessions: Arc::new(SessionMap::new()),
            engine,
            panels,
            limits,
            idle,
        }
    }

    pub fn engine(&self) -> &Arc<dyn AudioEngine> {
        &self.engine
    }

    pub fn panels(&self) -> &Arc<PanelSynchronizer> {
        &self.panels
    }

    /// The guild's live session, if it has one.
    pub fn get(&self, guild_id: GuildId) -> Option<Arc<Session>> {
        self.sessions
            .get(&guild_id)
            .map(|session| Arc::clone(session.value()))
            .filter(|session| !session.is_closed())
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Reuse the guild's live session or start a new one. A session that is
    /// still closing is waited out first, so its teardown never touches the
    /// voice connection or panel of its replacement.
    pub async fn get_or_create_session(
        &self,
        guild_id: GuildId,
        text_channel: ChannelId,
    ) -> Arc<Session> {
        loop {
            let closing = {
                let entry = self
                    .sessions
                    .entry(guild_id)
                    .or_insert_with(|| self.new_session(guild_id, text_channel));
                if !entry.is_closed() {
                    return Arc::clone(entry.value());
                }
                Arc::clone(entry.value())
            };

            debug!("Waiting for the closing session of guild {}", guild_id);
            closing.torn_down().await;
            self.sessions
                .remove_if(&guild_id, |_, session| Arc::ptr_eq(session, &closing));
        }
    }

    fn new_session(&self, guild_id: GuildId, text_channel: ChannelId) -> Arc<Session> {
        info!("Creating music session for guild {}", guild_id);
        let session = Session::new(
            guild_id,
            text_channel,
            Arc::clone(&self.engine),
            Arc::clone(&self.panels),
            self.limits,
            Arc::downgrade(&self.sessions),
        );
        session.start_idle_supervisor(self.idle);
        session
    }

    /// Disconnect the guild's session, if any. Returns whether one was closed.
    pub async fn disconnect(&self, guild_id: GuildId) -> bool {
        match self.get(guild_id) {
            Some(session) => session.disconnect().await,
            None => false,
        }
    }

    /// Close every live session at once. Returns how many were closed.
    pub async fn disconnect_all(&self) -> usize {
        let sessions: Vec<Arc<Session>> = self
            .sessions
            .iter()
            .map(|session| Arc::clone(session.value()))
            .collect();
        join_all(sessions.iter().map(|session| session.disconnect()))
            .await
            .into_iter()
            .filter(|closed| *closed)
            .count()
    }

    pub async fn create_or_refresh_panel(&self, session: &Arc<Session>) -> MusicResult<()> {
        self.panels.create_or_update(session).await
    }

    pub async fn refresh_panel_position(&self, session: &Arc<Session>) -> MusicResult<()> {
        self.panels.refresh_position(session).await
    }

    /// Deliver engine events to their sessions, one task per event.
    pub fn spawn_event_router(&self, mut events: UnboundedReceiver<EngineEvent>) -> JoinHandle<()> {
        let sessions = Arc::clone(&self.sessions);
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                let Some(session) = sessions
                    .get(&event.guild_id())
                    .map(|session| Arc::clone(session.value()))
                else {
                    debug!("Dropping engine event for guild without a session: {:?}", event);
                    continue;
                };
                tokio::spawn(async move {
                    session.handle_engine_event(event).await;
                });
            }
            info!("Engine event channel closed");
        })
    }
}

/// Get the voice channel ID that the user is currently in
pub fn get_user_voice_channel(
    ctx: &Context,
    guild_id: GuildId,
    user_id: UserId,
) -> MusicResult<ChannelId> {
    let guild = ctx.cache.guild(guild_id).ok_or(MusicError::NotInGuild)?;

    let voice_state = guild
        .voice_states
        .get(&user_id)
        .ok_or(MusicError::UserNotInVoiceChannel)?;

    voice_state
        .channel_id
        .ok_or(MusicError::UserNotInVoiceChannel)
}

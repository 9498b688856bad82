//! [`AudioEngine`] backed by songbird and yt-dlp.

use dashmap::DashMap;
use serenity::model::id::{ChannelId, GuildId};
use songbird::error::ControlError;
use songbird::input::YoutubeDl;
use songbird::tracks::Track as DriverTrack;
use songbird::{Event, Songbird, TrackEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};

use super::audio_sources;
use super::engine::{AudioEngine, EngineEvent};
use super::event_handlers::{ActiveTrack, ForwardedEvent, TrackEventForwarder};
use super::music_manager::{MusicError, MusicResult};
use super::track::Track;

fn engine_error(err: ControlError) -> MusicError {
    MusicError::EngineCall(err.to_string())
}

fn driver_volume(volume: u8) -> f32 {
    f32::from(volume.min(100)) / 100.0
}

pub struct SongbirdEngine {
    manager: Arc<Songbird>,
    http: reqwest::Client,
    active: Arc<DashMap<GuildId, ActiveTrack>>,
    events: UnboundedSender<EngineEvent>,
}

impl SongbirdEngine {
    /// Build the engine and the receiving end of its event channel.
    pub fn new(manager: Arc<Songbird>, http: reqwest::Client) -> (Self, UnboundedReceiver<EngineEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let engine = Self {
            manager,
            http,
            active: Arc::new(DashMap::new()),
            events,
        };
        (engine, receiver)
    }

    fn active_handle(&self, guild_id: GuildId) -> MusicResult<songbird::tracks::TrackHandle> {
        self.active
            .get(&guild_id)
            .map(|active| active.handle.clone())
            .ok_or(MusicError::NothingPlaying)
    }
}

#[serenity::async_trait]
impl AudioEngine for SongbirdEngine {
    async fn search(&self, query: &str) -> MusicResult<Vec<Track>> {
        audio_sources::search(query).await
    }

    async fn connect(&self, guild_id: GuildId, channel_id: ChannelId) -> MusicResult<()> {
        self.manager
            .join(guild_id, channel_id)
            .await
            .map_err(|e| MusicError::JoinError(e.to_string()))?;
        Ok(())
    }

    async fn play(&self, guild_id: GuildId, track: &Track, volume: u8) -> MusicResult<()> {
        let call = self.manager.get(guild_id).ok_or(MusicError::NotConnected)?;

        // Forget the old handle first so its end event is not reported.
        self.active.remove(&guild_id);

        let input = YoutubeDl::new(self.http.clone(), track.uri.clone());
        let handle = {
            let mut handler = call.lock().await;
            handler.play_only(DriverTrack::from(input).volume(driver_volume(volume)))
        };

        self.active.insert(
            guild_id,
            ActiveTrack {
                key: track.key(),
                handle: handle.clone(),
            },
        );

        for (event, kind) in [
            (TrackEvent::Play, ForwardedEvent::Started),
            (TrackEvent::End, ForwardedEvent::Ended),
            (TrackEvent::Error, ForwardedEvent::Errored),
        ] {
            handle
                .add_event(
                    Event::Track(event),
                    TrackEventForwarder {
                        guild_id,
                        key: track.key(),
                        kind,
                        active: Arc::clone(&self.active),
                        events: self.events.clone(),
                    },
                )
                .map_err(engine_error)?;
        }

        info!("Started '{}' on the voice driver for guild {}", track.title, guild_id);
        Ok(())
    }

    async fn pause(&self, guild_id: GuildId, paused: bool) -> MusicResult<()> {
        let handle = self.active_handle(guild_id)?;
        if paused {
            handle.pause().map_err(engine_error)
        } else {
            handle.play().map_err(engine_error)
        }
    }

    async fn stop(&self, guild_id: GuildId) -> MusicResult<()> {
        let Some((_, active)) = self.active.remove(&guild_id) else {
            return Ok(());
        };
        match active.handle.stop() {
            Ok(()) | Err(ControlError::Finished) => Ok(()),
            Err(err) => Err(engine_error(err)),
        }
    }

    async fn set_volume(&self, guild_id: GuildId, volume: u8) -> MusicResult<()> {
        self.active_handle(guild_id)?
            .set_volume(driver_volume(volume))
            .map_err(engine_error)
    }

    async fn position(&self, guild_id: GuildId) -> Option<Duration> {
        let handle = self.active_handle(guild_id).ok()?;
        handle.get_info().await.ok().map(|state| state.position)
    }

    async fn disconnect(&self, guild_id: GuildId) -> MusicResult<()> {
        self.active.remove(&guild_id);
        if self.manager.get(guild_id).is_none() {
            debug!("No voice call to leave in guild {}", guild_id);
            return Ok(());
        }
        self.manager
            .remove(guild_id)
            .await
            .map_err(|e| MusicError::JoinError(e.to_string()))
    }
}

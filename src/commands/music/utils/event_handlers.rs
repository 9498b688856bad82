use dashmap::DashMap;
use serenity::async_trait;
use serenity::model::id::GuildId;
use songbird::tracks::{PlayMode, TrackHandle};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use super::engine::EngineEvent;
use super::track::TrackKey;

/// The track a guild's voice driver is playing right now.
#[derive(Clone)]
pub struct ActiveTrack {
    pub key: TrackKey,
    pub handle: TrackHandle,
}

/// Which songbird track event a forwarder is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardedEvent {
    Started,
    Ended,
    Errored,
}

/// Turns songbird track events into [`EngineEvent`]s.
///
/// Events from a handle that is no longer the guild's active track (one that
/// was replaced or stopped) are dropped here, so a replay of the same entry
/// is never reported as ended by its predecessor.
pub struct TrackEventForwarder {
    pub guild_id: GuildId,
    pub key: TrackKey,
    pub kind: ForwardedEvent,
    pub active: Arc<DashMap<GuildId, ActiveTrack>>,
    pub events: UnboundedSender<EngineEvent>,
}

impl TrackEventForwarder {
    fn is_active(&self, handle: &TrackHandle) -> bool {
        self.active
            .get(&self.guild_id)
            .is_some_and(|active| active.handle.uuid() == handle.uuid())
    }

    fn to_engine_event(&self, playing: &PlayMode) -> EngineEvent {
        let (guild_id, key) = (self.guild_id, self.key);
        match self.kind {
            ForwardedEvent::Started => EngineEvent::TrackStarted { guild_id, key },
            ForwardedEvent::Ended => EngineEvent::TrackEnded { guild_id, key },
            ForwardedEvent::Errored => EngineEvent::TrackException {
                guild_id,
                key,
                error: format!("{:?}", playing),
            },
        }
    }
}

#[async_trait]
impl songbird::EventHandler for TrackEventForwarder {
    async fn act(&self, ctx: &songbird::EventContext<'_>) -> Option<songbird::Event> {
        let songbird::EventContext::Track(tracks) = ctx else {
            return None;
        };

        for (state, handle) in tracks.iter() {
            if !self.is_active(handle) {
                debug!(
                    "Dropping {:?} from replaced track in guild {}",
                    self.kind, self.guild_id
                );
                continue;
            }
            if matches!(self.kind, ForwardedEvent::Ended | ForwardedEvent::Errored) {
                self.active
                    .remove_if(&self.guild_id, |_, active| active.handle.uuid() == handle.uuid());
            }
            if self.events.send(self.to_engine_event(&state.playing)).is_err() {
                debug!("Engine event receiver is gone");
            }
        }
        None
    }
}

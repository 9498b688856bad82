//! Hand-written fakes for the audio engine and the chat platform. They record
//! every call so tests can assert on what the session asked for.

use async_trait::async_trait;
use serenity::model::id::{ChannelId, GuildId, MessageId};
use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use rusty_dj::music::engine::AudioEngine;
use rusty_dj::music::music_manager::{MusicError, MusicResult};
use rusty_dj::music::panel_sync::PanelTransport;
use rusty_dj::music::panel_view::PanelView;
use rusty_dj::music::track::{Track, TrackKey};

#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Connect(ChannelId),
    Play { title: String, key: TrackKey, volume: u8 },
    Pause(bool),
    Stop,
    SetVolume(u8),
    Disconnect,
}

#[derive(Default)]
pub struct FakeEngine {
    calls: Mutex<Vec<EngineCall>>,
    search_results: Mutex<VecDeque<Vec<Track>>>,
    failing_titles: Mutex<HashSet<String>>,
    refuse_connect: AtomicBool,
}

impl FakeEngine {
    fn record(&self, call: EngineCall) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Titles passed to `play`, in order.
    pub fn played(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                EngineCall::Play { title, .. } => Some(title),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: &EngineCall) -> usize {
        self.calls().iter().filter(|call| *call == wanted).count()
    }

    /// Make every `play` of this title fail.
    pub fn fail_title(&self, title: &str) {
        self.failing_titles.lock().unwrap().insert(title.to_string());
    }

    /// Make every `connect` fail, as when the bot lacks voice permissions.
    pub fn refuse_connect(&self) {
        self.refuse_connect.store(true, Ordering::SeqCst);
    }

    pub fn push_search_results(&self, tracks: Vec<Track>) {
        self.search_results.lock().unwrap().push_back(tracks);
    }
}

#[async_trait]
impl AudioEngine for FakeEngine {
    async fn search(&self, _query: &str) -> MusicResult<Vec<Track>> {
        Ok(self
            .search_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }

    async fn connect(&self, _guild_id: GuildId, channel_id: ChannelId) -> MusicResult<()> {
        self.record(EngineCall::Connect(channel_id));
        if self.refuse_connect.load(Ordering::SeqCst) {
            return Err(MusicError::JoinError("missing permissions".to_string()));
        }
        Ok(())
    }

    async fn play(&self, _guild_id: GuildId, track: &Track, volume: u8) -> MusicResult<()> {
        self.record(EngineCall::Play {
            title: track.title.clone(),
            key: track.key(),
            volume,
        });
        if self.failing_titles.lock().unwrap().contains(&track.title) {
            return Err(MusicError::EngineCall(format!("cannot stream {}", track.title)));
        }
        Ok(())
    }

    async fn pause(&self, _guild_id: GuildId, paused: bool) -> MusicResult<()> {
        self.record(EngineCall::Pause(paused));
        Ok(())
    }

    async fn stop(&self, _guild_id: GuildId) -> MusicResult<()> {
        self.record(EngineCall::Stop);
        Ok(())
    }

    async fn set_volume(&self, _guild_id: GuildId, volume: u8) -> MusicResult<()> {
        self.record(EngineCall::SetVolume(volume));
        Ok(())
    }

    async fn position(&self, _guild_id: GuildId) -> Option<Duration> {
        Some(Duration::from_secs(30))
    }

    async fn disconnect(&self, _guild_id: GuildId) -> MusicResult<()> {
        self.record(EngineCall::Disconnect);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelCall {
    Send { message_id: MessageId, title: String },
    Edit { message_id: MessageId, title: String },
    Delete { message_id: MessageId },
}

/// Chat fake that tracks which panel messages exist. Editing a message that
/// was deleted fails, like the real platform.
pub struct FakePanels {
    calls: Mutex<Vec<PanelCall>>,
    live: Mutex<HashSet<MessageId>>,
    next_id: AtomicU64,
    delete_delay: Mutex<Option<Duration>>,
}

impl Default for FakePanels {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            live: Mutex::new(HashSet::new()),
            next_id: AtomicU64::new(100),
            delete_delay: Mutex::new(None),
        }
    }
}

impl FakePanels {
    pub fn calls(&self) -> Vec<PanelCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn live_messages(&self) -> usize {
        self.live.lock().unwrap().len()
    }

    pub fn sends(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, PanelCall::Send { .. }))
            .count()
    }

    /// Make every delete take `delay`, like a slow chat API.
    pub fn slow_deletes(&self, delay: Duration) {
        *self.delete_delay.lock().unwrap() = Some(delay);
    }

    /// Edits that targeted `message_id`.
    pub fn edits_of(&self, message_id: MessageId) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, PanelCall::Edit { message_id: id, .. } if *id == message_id))
            .count()
    }

    /// Remove a message as if a user deleted it.
    pub fn delete_externally(&self, message_id: MessageId) {
        self.live.lock().unwrap().remove(&message_id);
    }
}

#[async_trait]
impl PanelTransport for FakePanels {
    async fn send(&self, _channel_id: ChannelId, view: &PanelView) -> MusicResult<MessageId> {
        let message_id = MessageId::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.live.lock().unwrap().insert(message_id);
        self.calls.lock().unwrap().push(PanelCall::Send {
            message_id,
            title: view.title.clone(),
        });
        Ok(message_id)
    }

    async fn edit(
        &self,
        _channel_id: ChannelId,
        message_id: MessageId,
        view: &PanelView,
    ) -> MusicResult<()> {
        self.calls.lock().unwrap().push(PanelCall::Edit {
            message_id,
            title: view.title.clone(),
        });
        if !self.live.lock().unwrap().contains(&message_id) {
            return Err(MusicError::PanelRender("Unknown Message".to_string()));
        }
        Ok(())
    }

    async fn delete(&self, _channel_id: ChannelId, message_id: MessageId) -> MusicResult<()> {
        let delay = *self.delete_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.calls.lock().unwrap().push(PanelCall::Delete { message_id });
        if !self.live.lock().unwrap().remove(&message_id) {
            return Err(MusicError::PanelRender("Unknown Message".to_string()));
        }
        Ok(())
    }
}

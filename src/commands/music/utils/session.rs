//! Per-guild playback session: queue, current track and the playback state
//! machine driven by commands and engine events.

use dashmap::DashMap;
use serenity::model::id::{ChannelId, GuildId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::engine::{AudioEngine, EngineEvent};
use super::idle_supervisor::{self, IdleConfig};
use super::music_manager::{MusicError, MusicResult};
use super::panel_sync::PanelSynchronizer;
use super::queue_manager::{QueueLimits, TrackQueue};
use super::track::{Requester, Track};

/// Every live session, keyed by guild.
pub type SessionMap = DashMap<GuildId, Arc<Session>>;

/// How many upcoming tracks a snapshot carries.
pub const UPCOMING_PREVIEW: usize = 10;

pub const DEFAULT_VOLUME: u8 = 100;

/// What happens when the current track finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoopMode {
    #[default]
    Off,
    Track,
    Queue,
}

impl LoopMode {
    /// Order used by the loop button: off, track, queue, off.
    pub fn next(self) -> Self {
        match self {
            LoopMode::Off => LoopMode::Track,
            LoopMode::Track => LoopMode::Queue,
            LoopMode::Queue => LoopMode::Off,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LoopMode::Off => "Off",
            LoopMode::Track => "Track",
            LoopMode::Queue => "Queue",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            LoopMode::Off => "➡️",
            LoopMode::Track => "🔂",
            LoopMode::Queue => "🔁",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
    Paused,
    Disconnected,
}

/// Why the session is moving off the current track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceReason {
    /// The track played to the end. Loop modes apply.
    Finished,
    /// A user skipped it. Loop-track does not hold it.
    Skipped,
    /// The engine could not play it. It is never replayed or recycled.
    Failed,
}

/// Result of [`Session::enqueue_or_play`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    Started,
    Queued { position: usize },
}

#[derive(Debug, Clone, PartialEq)]
enum Transition {
    Unchanged,
    Playing(Track),
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TeardownOrigin {
    Command,
    IdleSupervisor,
}

/// Read-only view of a session, taken under its lock.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub guild_id: GuildId,
    pub text_channel: ChannelId,
    pub state: PlaybackState,
    pub current: Option<Track>,
    pub position: Option<Duration>,
    pub upcoming: Vec<Track>,
    pub queue_len: usize,
    pub queue_duration_ms: u64,
    pub loop_mode: LoopMode,
    pub volume: u8,
}

impl SessionSnapshot {
    /// True while there is a track loaded on a live connection.
    pub fn has_track(&self) -> bool {
        matches!(self.state, PlaybackState::Playing | PlaybackState::Paused)
    }
}

struct SessionState {
    queue: TrackQueue,
    current: Option<Track>,
    loop_mode: LoopMode,
    volume: u8,
    paused: bool,
    last_activity: Instant,
    connected: bool,
    text_channel: ChannelId,
}

impl SessionState {
    fn playback_state(&self) -> PlaybackState {
        if !self.connected {
            PlaybackState::Disconnected
        } else if self.current.is_none() {
            PlaybackState::Idle
        } else if self.paused {
            PlaybackState::Paused
        } else {
            PlaybackState::Playing
        }
    }

    fn touch(&mut self) {
        self.last_activity = Instant::now();
    }
}

/// One guild's playback.
///
/// All transitions run under the state lock, so a command and an engine
/// event for the same guild never interleave. Panel updates happen after
/// the lock is released.
pub struct Session {
    guild_id: GuildId,
    state: Mutex<SessionState>,
    engine: Arc<dyn AudioEngine>,
    panels: Arc<PanelSynchronizer>,
    cancel: CancellationToken,
    closed: AtomicBool,
    torn_down: CancellationToken,
    idle_task: StdMutex<Option<JoinHandle<()>>>,
    registry: Weak<SessionMap>,
}

impl Session {
    pub fn new(
        guild_id: GuildId,
        text_channel: ChannelId,
        engine: Arc<dyn AudioEngine>,
        panels: Arc<PanelSynchronizer>,
        limits: QueueLimits,
        registry: Weak<SessionMap>,
    ) -> Arc<Self> {
        Arc::new(Self {
            guild_id,
            state: Mutex::new(SessionState {
                queue: TrackQueue::new(limits),
                current: None,
                loop_mode: LoopMode::Off,
                volume: DEFAULT_VOLUME,
                paused: false,
                last_activity: Instant::now(),
                connected: false,
                text_channel,
            }),
            engine,
            panels,
            cancel: CancellationToken::new(),
            closed: AtomicBool::new(false),
            torn_down: CancellationToken::new(),
            idle_task: StdMutex::new(None),
            registry,
        })
    }

    pub fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    /// A closed session has been torn down and must be replaced.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Resolves once a closed session has left voice, dropped its panel and
    /// removed itself from the registry.
    pub async fn torn_down(&self) {
        self.torn_down.cancelled().await
    }

    pub fn start_idle_supervisor(self: &Arc<Self>, config: IdleConfig) {
        let handle = idle_supervisor::spawn(Arc::downgrade(self), self.cancel.clone(), config);
        let previous = self
            .idle_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    pub async fn state(&self) -> PlaybackState {
        self.state.lock().await.playback_state()
    }

    pub async fn last_activity(&self) -> Instant {
        self.state.lock().await.last_activity
    }

    pub async fn text_channel(&self) -> ChannelId {
        self.state.lock().await.text_channel
    }

    pub async fn set_text_channel(&self, channel_id: ChannelId) {
        self.state.lock().await.text_channel = channel_id;
    }

    /// Join (or move to) a voice channel. A session that fails its first
    /// join is closed, so it never lingers in the registry unconnected.
    pub async fn join(&self, channel_id: ChannelId) -> MusicResult<()> {
        let mut state = self.state.lock().await;
        if self.is_closed() {
            return Err(MusicError::NotConnected);
        }
        if let Err(err) = self.engine.connect(self.guild_id, channel_id).await {
            if state.connected || self.closed.swap(true, Ordering::SeqCst) {
                return Err(err);
            }
            drop(state);
            warn!("Could not join voice in guild {}: {}", self.guild_id, err);
            self.teardown(TeardownOrigin::Command).await;
            return Err(err);
        }
        state.connected = true;
        state.touch();
        info!("Joined voice channel {} in guild {}", channel_id, self.guild_id);
        Ok(())
    }

    /// Play `track` now if nothing is loaded, otherwise queue it.
    pub async fn enqueue_or_play(
        self: &Arc<Self>,
        mut track: Track,
        requester: Requester,
    ) -> MusicResult<EnqueueOutcome> {
        let mut state = self.state.lock().await;
        if !state.connected {
            return Err(MusicError::NotConnected);
        }

        if state.current.is_some() {
            let position = state.queue.enqueue(track, requester)?;
            state.touch();
            debug!("Queued track at position {} in guild {}", position, self.guild_id);
            return Ok(EnqueueOutcome::Queued { position });
        }

        state.queue.limits().check_duration(&track)?;
        track.attach_requester(requester);
        state.current = Some(track.clone());
        state.paused = false;
        state.touch();

        if let Err(err) = self.engine.play(self.guild_id, &track, state.volume).await {
            error!("Failed to start '{}' in guild {}: {}", track.title, self.guild_id, err);
            let transition = self.advance_locked(&mut state, AdvanceReason::Failed).await;
            drop(state);
            self.after_transition(transition).await;
            return Err(err);
        }

        info!("Now playing '{}' in guild {}", track.title, self.guild_id);
        Ok(EnqueueOutcome::Started)
    }

    /// Move off the current track. A no-op on an idle session with an empty
    /// queue.
    pub async fn advance(self: &Arc<Self>, reason: AdvanceReason) -> PlaybackState {
        let (transition, state) = {
            let mut state = self.state.lock().await;
            let transition = self.advance_locked(&mut state, reason).await;
            (transition, state.playback_state())
        };
        self.after_transition(transition).await;
        state
    }

    /// Skip the current track. Returns the track that plays next, if any.
    pub async fn skip(self: &Arc<Self>) -> MusicResult<Option<Track>> {
        let transition = {
            let mut state = self.state.lock().await;
            if state.current.is_none() {
                return Err(MusicError::NothingPlaying);
            }
            self.advance_locked(&mut state, AdvanceReason::Skipped).await
        };
        let next = match &transition {
            Transition::Playing(track) => Some(track.clone()),
            _ => None,
        };
        self.after_transition(transition).await;
        Ok(next)
    }

    pub async fn pause(self: &Arc<Self>) -> MusicResult<()> {
        self.apply_pause(Some(true)).await.map(|_| ())
    }

    pub async fn resume(self: &Arc<Self>) -> MusicResult<()> {
        self.apply_pause(Some(false)).await.map(|_| ())
    }

    /// Flip the pause flag. Returns the new flag.
    pub async fn toggle_pause(self: &Arc<Self>) -> MusicResult<bool> {
        self.apply_pause(None).await
    }

    async fn apply_pause(self: &Arc<Self>, requested: Option<bool>) -> MusicResult<bool> {
        let (transition, err) = {
            let mut state = self.state.lock().await;
            if state.current.is_none() {
                return Err(MusicError::NothingPlaying);
            }
            let paused = requested.unwrap_or(!state.paused);
            if state.paused == paused {
                return Err(if paused {
                    MusicError::AlreadyPaused
                } else {
                    MusicError::NotPaused
                });
            }

            match self.engine.pause(self.guild_id, paused).await {
                Ok(()) => {
                    state.paused = paused;
                    state.touch();
                    return Ok(paused);
                }
                Err(err) => {
                    error!("Engine pause failed in guild {}: {}", self.guild_id, err);
                    let transition = self.advance_locked(&mut state, AdvanceReason::Failed).await;
                    (transition, err)
                }
            }
        };
        self.after_transition(transition).await;
        Err(err)
    }

    /// Stop the current track. The queue is left alone.
    pub async fn stop(self: &Arc<Self>) {
        {
            let mut state = self.state.lock().await;
            state.current = None;
            state.paused = false;
            state.touch();
            if let Err(err) = self.engine.stop(self.guild_id).await {
                warn!("Engine stop failed in guild {}: {}", self.guild_id, err);
            }
        }
        self.panels.finish(self.guild_id).await;
    }

    /// Set the volume. Values outside 0..=100 are rejected, not clamped.
    pub async fn set_volume(&self, volume: i32) -> MusicResult<u8> {
        let volume = u8::try_from(volume)
            .ok()
            .filter(|v| *v <= 100)
            .ok_or(MusicError::InvalidVolume(volume))?;

        let mut state = self.state.lock().await;
        if state.current.is_some() {
            if let Err(err) = self.engine.set_volume(self.guild_id, volume).await {
                warn!("Engine volume change failed in guild {}: {}", self.guild_id, err);
            }
        }
        state.volume = volume;
        state.touch();
        Ok(volume)
    }

    /// Shuffle the pending tracks. Returns how many were shuffled.
    pub async fn shuffle(&self) -> MusicResult<usize> {
        let mut state = self.state.lock().await;
        if state.queue.is_empty() {
            return Err(MusicError::EmptyQueue);
        }
        state.queue.shuffle();
        state.touch();
        Ok(state.queue.len())
    }

    /// Drop every pending track. Returns how many were dropped.
    pub async fn clear(&self) -> usize {
        let mut state = self.state.lock().await;
        let removed = state.queue.clear();
        state.touch();
        removed
    }

    /// Remove the pending track at a 1-based position.
    pub async fn remove(&self, position: usize) -> MusicResult<Track> {
        let mut state = self.state.lock().await;
        let removed = state
            .queue
            .remove(position)
            .ok_or(MusicError::InvalidPosition(position))?;
        state.touch();
        Ok(removed)
    }

    pub async fn set_loop_mode(&self, mode: LoopMode) {
        let mut state = self.state.lock().await;
        state.loop_mode = mode;
        state.touch();
    }

    pub async fn loop_mode(&self) -> LoopMode {
        self.state.lock().await.loop_mode
    }

    /// Advance the loop mode one step and return the new mode.
    pub async fn cycle_loop_mode(&self) -> LoopMode {
        let mut state = self.state.lock().await;
        state.loop_mode = state.loop_mode.next();
        state.touch();
        state.loop_mode
    }

    pub async fn now_playing(&self) -> Option<Track> {
        self.state.lock().await.current.clone()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock().await;
        let position = match state.current {
            Some(_) => self.engine.position(self.guild_id).await,
            None => None,
        };

        SessionSnapshot {
            guild_id: self.guild_id,
            text_channel: state.text_channel,
            state: state.playback_state(),
            current: state.current.clone(),
            position,
            upcoming: state.queue.peek_n(UPCOMING_PREVIEW),
            queue_len: state.queue.len(),
            queue_duration_ms: state.queue.total_duration_ms(),
            loop_mode: state.loop_mode,
            volume: state.volume,
        }
    }

    /// Apply an engine notification. Events for a track that is no longer
    /// current are dropped.
    pub async fn handle_engine_event(self: &Arc<Self>, event: EngineEvent) {
        let transition = {
            let mut state = self.state.lock().await;
            let is_current = state
                .current
                .as_ref()
                .is_some_and(|track| track.key() == event.key());
            if !is_current || !state.connected {
                debug!("Ignoring stale engine event {:?}", event);
                return;
            }

            match event {
                EngineEvent::TrackStarted { .. } => {
                    state.touch();
                    return;
                }
                EngineEvent::TrackEnded { .. } => {
                    self.advance_locked(&mut state, AdvanceReason::Finished).await
                }
                EngineEvent::TrackException { error, .. } => {
                    error!("Track exception in guild {}: {}", self.guild_id, error);
                    self.advance_locked(&mut state, AdvanceReason::Failed).await
                }
            }
        };
        self.after_transition(transition).await;
    }

    /// Leave voice and remove the session. Returns false if it was already
    /// closed.
    pub async fn disconnect(&self) -> bool {
        {
            let mut state = self.state.lock().await;
            if self.closed.swap(true, Ordering::SeqCst) {
                return false;
            }
            state.connected = false;
        }
        self.teardown(TeardownOrigin::Command).await;
        true
    }

    /// Disconnect if the session has been idle for longer than `timeout`.
    pub(crate) async fn disconnect_if_idle(&self, timeout: Duration) -> bool {
        {
            let mut state = self.state.lock().await;
            if state.playback_state() != PlaybackState::Idle
                || state.last_activity.elapsed() <= timeout
            {
                return false;
            }
            if self.closed.swap(true, Ordering::SeqCst) {
                return false;
            }
            state.connected = false;
        }
        info!(
            "Disconnecting guild {} after {}s without activity",
            self.guild_id,
            timeout.as_secs()
        );
        self.teardown(TeardownOrigin::IdleSupervisor).await;
        true
    }

    async fn teardown(&self, origin: TeardownOrigin) {
        self.cancel.cancel();

        let idle_task = self
            .idle_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let (Some(handle), TeardownOrigin::Command) = (idle_task, origin) {
            if let Err(err) = handle.await {
                warn!("Idle supervisor for guild {} ended badly: {}", self.guild_id, err);
            }
        }

        self.panels.teardown(self.guild_id).await;

        {
            let mut state = self.state.lock().await;
            state.current = None;
            state.paused = false;
            let dropped = state.queue.clear();
            if dropped > 0 {
                debug!("Dropped {} queued tracks for guild {}", dropped, self.guild_id);
            }
            if let Err(err) = self.engine.disconnect(self.guild_id).await {
                warn!("Failed to leave voice in guild {}: {}", self.guild_id, err);
            }
        }

        if let Some(sessions) = self.registry.upgrade() {
            sessions.remove_if(&self.guild_id, |_, session| {
                std::ptr::eq(Arc::as_ptr(session), self)
            });
        }
        self.torn_down.cancel();
        info!("Closed music session for guild {}", self.guild_id);
    }

    async fn advance_locked(&self, state: &mut SessionState, reason: AdvanceReason) -> Transition {
        if state.current.is_none() && state.queue.is_empty() {
            return Transition::Unchanged;
        }

        let mut reason = reason;
        let mut attempts = state.queue.len() + 1;
        loop {
            state.touch();
            state.paused = false;

            let Some(next) = Self::select_next(state, reason) else {
                if let Err(err) = self.engine.stop(self.guild_id).await {
                    warn!("Engine stop failed in guild {}: {}", self.guild_id, err);
                }
                info!("Queue finished in guild {}", self.guild_id);
                return Transition::Idle;
            };

            state.current = Some(next.clone());
            match self.engine.play(self.guild_id, &next, state.volume).await {
                Ok(()) => {
                    info!("Now playing '{}' in guild {}", next.title, self.guild_id);
                    return Transition::Playing(next);
                }
                Err(err) => {
                    error!("Failed to play '{}' in guild {}: {}", next.title, self.guild_id, err);
                    attempts -= 1;
                    if attempts == 0 {
                        state.current = None;
                        return Transition::Idle;
                    }
                    reason = AdvanceReason::Failed;
                }
            }
        }
    }

    /// Pick the next track and leave `current` empty. Never returns a queue
    /// entry that is the same entry as the track being left.
    fn select_next(state: &mut SessionState, reason: AdvanceReason) -> Option<Track> {
        let previous = state.current.take();

        let mut candidate = match (&previous, state.loop_mode, reason) {
            (Some(current), LoopMode::Track, AdvanceReason::Finished) => {
                return Some(current.clone());
            }
            (Some(current), LoopMode::Queue, AdvanceReason::Finished | AdvanceReason::Skipped) => {
                Some(state.queue.cycle(current.duplicate()))
            }
            _ => state.queue.dequeue_front().ok(),
        };

        if let Some(previous) = &previous {
            while candidate
                .as_ref()
                .is_some_and(|next| next.same_entry(previous))
            {
                debug!("Skipping queued duplicate of '{}'", previous.title);
                candidate = state.queue.dequeue_front().ok();
            }
        }
        candidate
    }

    async fn after_transition(self: &Arc<Self>, transition: Transition) {
        match transition {
            Transition::Unchanged => {}
            Transition::Playing(_) => self.panels.update_if_present(self).await,
            Transition::Idle => self.panels.finish(self.guild_id).await,
        }
    }
}

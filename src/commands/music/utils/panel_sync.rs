//! Keeps one live player panel per guild in step with its session.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serenity::all::{CreateMessage, EditMessage, Http};
use serenity::model::id::{ChannelId, GuildId, MessageId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::button_controls::panel_buttons;
use super::embedded_messages::panel_embed;
use super::music_manager::{MusicError, MusicResult};
use super::panel_view::{PanelView, render_finished, render_panel};
use super::session::{Session, SessionSnapshot};

/// Sends, edits and deletes panel messages on the chat platform.
#[cfg_attr(test, mockall::automock)]
#[serenity::async_trait]
pub trait PanelTransport: Send + Sync {
    async fn send(&self, channel_id: ChannelId, view: &PanelView) -> MusicResult<MessageId>;

    async fn edit(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        view: &PanelView,
    ) -> MusicResult<()>;

    async fn delete(&self, channel_id: ChannelId, message_id: MessageId) -> MusicResult<()>;
}

/// Panel transport backed by the serenity HTTP client.
pub struct SerenityPanels {
    http: Arc<Http>,
}

impl SerenityPanels {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[serenity::async_trait]
impl PanelTransport for SerenityPanels {
    async fn send(&self, channel_id: ChannelId, view: &PanelView) -> MusicResult<MessageId> {
        let message = CreateMessage::new()
            .embed(panel_embed(view))
            .components(panel_buttons(view.controls.as_ref()));

        channel_id
            .send_message(&self.http, message)
            .await
            .map(|message| message.id)
            .map_err(|e| MusicError::PanelRender(e.to_string()))
    }

    async fn edit(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        view: &PanelView,
    ) -> MusicResult<()> {
        let edit = EditMessage::new()
            .embed(panel_embed(view))
            .components(panel_buttons(view.controls.as_ref()));

        channel_id
            .edit_message(&self.http, message_id, edit)
            .await
            .map(|_| ())
            .map_err(|e| MusicError::PanelRender(e.to_string()))
    }

    async fn delete(&self, channel_id: ChannelId, message_id: MessageId) -> MusicResult<()> {
        self.http
            .delete_message(channel_id, message_id, None)
            .await
            .map_err(|e| MusicError::PanelRender(e.to_string()))
    }
}

/// Where a guild's live panel is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelRecord {
    pub channel_id: ChannelId,
    pub message_id: MessageId,
    pub last_update: DateTime<Utc>,
    /// Distinguishes successive panels so a stale refresh loop never
    /// removes its successor's record.
    pub generation: u64,
}

struct RefreshLoop {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl RefreshLoop {
    async fn stop(self) {
        self.cancel.cancel();
        if let Err(err) = self.handle.await {
            warn!("Panel refresh loop ended badly: {}", err);
        }
    }
}

#[derive(Default)]
struct GuildPanel {
    record: Option<PanelRecord>,
    refresh: Option<RefreshLoop>,
}

type PanelSlot = Arc<Mutex<GuildPanel>>;

/// Owns every guild's panel record and refresh loop.
///
/// Each guild's panel sits behind its own lock. That lock may be held while
/// a session snapshot is taken, never the other way round.
pub struct PanelSynchronizer {
    transport: Arc<dyn PanelTransport>,
    panels: DashMap<GuildId, PanelSlot>,
    generations: AtomicU64,
    refresh_interval: Duration,
    retire_delay: Duration,
}

impl PanelSynchronizer {
    pub fn new(
        transport: Arc<dyn PanelTransport>,
        refresh_interval: Duration,
        retire_delay: Duration,
    ) -> Self {
        Self {
            transport,
            panels: DashMap::new(),
            generations: AtomicU64::new(0),
            refresh_interval,
            retire_delay,
        }
    }

    fn slot(&self, guild_id: GuildId) -> PanelSlot {
        Arc::clone(self.panels.entry(guild_id).or_default().value())
    }

    fn existing_slot(&self, guild_id: GuildId) -> Option<PanelSlot> {
        self.panels.get(&guild_id).map(|slot| Arc::clone(slot.value()))
    }

    /// The guild's current panel, if one is live.
    pub async fn record(&self, guild_id: GuildId) -> Option<PanelRecord> {
        let slot = self.existing_slot(guild_id)?;
        let panel = slot.lock().await;
        panel.record.clone()
    }

    pub async fn has_refresh_loop(&self, guild_id: GuildId) -> bool {
        match self.existing_slot(guild_id) {
            Some(slot) => slot.lock().await.refresh.is_some(),
            None => false,
        }
    }

    /// Edit the live panel in place, or post one if there is none or the
    /// edit fails.
    pub async fn create_or_update(self: &Arc<Self>, session: &Arc<Session>) -> MusicResult<()> {
        let slot = self.slot(session.guild_id());
        let mut guard = slot.lock().await;
        self.update_locked(&mut guard, &slot, session, true).await
    }

    /// Edit the live panel if there is one. Used after engine-driven
    /// transitions, which never create a panel on their own.
    pub async fn update_if_present(self: &Arc<Self>, session: &Arc<Session>) {
        let Some(slot) = self.existing_slot(session.guild_id()) else {
            return;
        };
        let mut guard = slot.lock().await;
        if let Err(err) = self.update_locked(&mut guard, &slot, session, false).await {
            warn!("Failed to update panel in guild {}: {}", session.guild_id(), err);
        }
    }

    async fn update_locked(
        self: &Arc<Self>,
        panel: &mut GuildPanel,
        slot: &PanelSlot,
        session: &Arc<Session>,
        create: bool,
    ) -> MusicResult<()> {
        let guild_id = session.guild_id();
        if panel.record.is_none() && !create {
            return Ok(());
        }

        let snapshot = session.snapshot().await;
        let view = render_panel(&snapshot);

        if let Some(record) = panel.record.as_mut() {
            match self
                .transport
                .edit(record.channel_id, record.message_id, &view)
                .await
            {
                Ok(()) => {
                    record.last_update = Utc::now();
                    let generation = record.generation;
                    if panel.refresh.is_none() && snapshot.has_track() {
                        panel.refresh = Some(self.spawn_refresh(slot, session, generation));
                    }
                    debug!("Updated panel in guild {}", guild_id);
                    return Ok(());
                }
                Err(err) => {
                    debug!(
                        "Panel edit failed in guild {}, posting a new one: {}",
                        guild_id, err
                    );
                }
            }
        }

        self.replace_locked(panel, slot, session, &snapshot, &view)
            .await
    }

    /// Move the panel to the bottom of the channel: retire the old message
    /// and post a fresh one with a new refresh loop.
    pub async fn refresh_position(self: &Arc<Self>, session: &Arc<Session>) -> MusicResult<()> {
        let slot = self.slot(session.guild_id());
        let mut guard = slot.lock().await;

        let snapshot = session.snapshot().await;
        if guard.record.is_none() && !snapshot.has_track() {
            return Ok(());
        }
        let view = render_panel(&snapshot);
        self.replace_locked(&mut guard, &slot, session, &snapshot, &view)
            .await
    }

    async fn replace_locked(
        self: &Arc<Self>,
        panel: &mut GuildPanel,
        slot: &PanelSlot,
        session: &Arc<Session>,
        snapshot: &SessionSnapshot,
        view: &PanelView,
    ) -> MusicResult<()> {
        if let Some(refresh) = panel.refresh.take() {
            refresh.stop().await;
        }
        if let Some(old) = panel.record.take() {
            self.retire(old);
        }

        let message_id = self.transport.send(snapshot.text_channel, view).await?;
        let generation = self.generations.fetch_add(1, Ordering::Relaxed) + 1;
        panel.record = Some(PanelRecord {
            channel_id: snapshot.text_channel,
            message_id,
            last_update: Utc::now(),
            generation,
        });
        if snapshot.has_track() {
            panel.refresh = Some(self.spawn_refresh(slot, session, generation));
        }

        debug!(
            "Posted panel {} in guild {}",
            message_id, snapshot.guild_id
        );
        Ok(())
    }

    /// Stop refreshing and leave the panel showing that playback finished.
    pub async fn finish(&self, guild_id: GuildId) {
        let Some(slot) = self.existing_slot(guild_id) else {
            return;
        };
        let mut panel = slot.lock().await;
        if let Some(refresh) = panel.refresh.take() {
            refresh.stop().await;
        }
        if let Some(record) = panel.record.take() {
            if let Err(err) = self
                .transport
                .edit(record.channel_id, record.message_id, &render_finished())
                .await
            {
                warn!("Failed to mark panel finished in guild {}: {}", guild_id, err);
            }
        }
    }

    /// Stop refreshing and delete the panel. Used when the session ends.
    pub async fn teardown(&self, guild_id: GuildId) {
        let Some((_, slot)) = self.panels.remove(&guild_id) else {
            return;
        };
        let mut panel = slot.lock().await;
        if let Some(refresh) = panel.refresh.take() {
            refresh.stop().await;
        }
        if let Some(record) = panel.record.take() {
            if let Err(err) = self
                .transport
                .delete(record.channel_id, record.message_id)
                .await
            {
                warn!("Failed to delete panel in guild {}: {}", guild_id, err);
            }
        }
    }

    /// Delete a replaced panel after a short grace delay.
    fn retire(&self, record: PanelRecord) {
        let transport = Arc::clone(&self.transport);
        let delay = self.retire_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(err) = transport.delete(record.channel_id, record.message_id).await {
                debug!("Retired panel {} was already gone: {}", record.message_id, err);
            }
        });
    }

    fn spawn_refresh(
        self: &Arc<Self>,
        slot: &PanelSlot,
        session: &Arc<Session>,
        generation: u64,
    ) -> RefreshLoop {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(Arc::clone(self).refresh_loop(
            Arc::clone(slot),
            Arc::downgrade(session),
            generation,
            cancel.clone(),
        ));
        RefreshLoop { cancel, handle }
    }

    /// Re-render the panel every refresh interval while something is loaded.
    /// Every lock acquisition races the cancellation token, since whoever
    /// cancels this loop holds the slot lock while awaiting it.
    async fn refresh_loop(
        self: Arc<Self>,
        slot: PanelSlot,
        session: Weak<Session>,
        generation: u64,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(self.refresh_interval) => {}
            }

            let Some(session) = session.upgrade() else {
                break;
            };
            let snapshot = session.snapshot().await;
            if !snapshot.has_track() {
                break;
            }
            let view = render_panel(&snapshot);

            let mut panel = tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                panel = slot.lock() => panel,
            };
            let Some(record) = panel
                .record
                .as_mut()
                .filter(|record| record.generation == generation)
            else {
                return;
            };

            match self
                .transport
                .edit(record.channel_id, record.message_id, &view)
                .await
            {
                Ok(()) => record.last_update = Utc::now(),
                Err(err) => {
                    warn!("Panel refresh failed, stopping updates: {}", err);
                    break;
                }
            }
        }

        let mut panel = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            panel = slot.lock() => panel,
        };
        if panel
            .record
            .as_ref()
            .is_some_and(|record| record.generation == generation)
        {
            panel.record = None;
            panel.refresh = None;
            debug!("Panel refresh loop {} finished", generation);
        }
    }
}

//! Platform-independent description of the live player panel.

use super::formatting::{format_duration, format_progress_line, sanitize_for_embed};
use super::session::{LoopMode, PlaybackState, SessionSnapshot};

pub const PANEL_COLOR: u32 = 0x1db954;
pub const FINISHED_COLOR: u32 = 0x95a5a6;

const FIELD_LIMIT: usize = 1024;
const TITLE_LIMIT: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl PanelField {
    fn new(name: &str, value: impl Into<String>, inline: bool) -> Self {
        Self {
            name: name.to_string(),
            value: value.into(),
            inline,
        }
    }
}

/// State the control buttons are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelControls {
    pub paused: bool,
    pub loop_mode: LoopMode,
    pub has_queue: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelView {
    pub title: String,
    pub description: String,
    pub url: Option<String>,
    pub color: u32,
    pub fields: Vec<PanelField>,
    pub thumbnail: Option<String>,
    pub footer: Option<String>,
    /// `None` renders the message without buttons.
    pub controls: Option<PanelControls>,
}

/// Render the panel for a snapshot.
pub fn render_panel(snapshot: &SessionSnapshot) -> PanelView {
    let Some(track) = snapshot.current.as_ref().filter(|_| snapshot.has_track()) else {
        return render_idle(snapshot);
    };

    let position_ms = snapshot
        .position
        .map(|p| p.as_millis() as u64)
        .unwrap_or_default();
    let paused = snapshot.state == PlaybackState::Paused;

    let duration = if track.duration_ms > 0 {
        format_duration(track.duration_ms)
    } else {
        "Live".to_string()
    };

    let fields = vec![
        PanelField::new(
            "🎤 Artist",
            format!("`{}`", sanitize_for_embed(&track.author, 100)),
            true,
        ),
        PanelField::new("⏱️ Duration", format!("`{}`", duration), true),
        PanelField::new("🔊 Volume", format!("`{}%`", snapshot.volume), true),
        PanelField::new(
            "📈 Progress",
            format!("```{}```", format_progress_line(position_ms, track.duration_ms)),
            false,
        ),
        PanelField::new("🔁 Loop", format!("`{}`", snapshot.loop_mode.label()), true),
        PanelField::new("👥 Queue", format!("`{} tracks`", snapshot.queue_len), true),
        PanelField::new(
            "🎧 Status",
            format!("`{}`", if paused { "Paused" } else { "Playing" }),
            true,
        ),
    ];

    let footer = match &track.requester {
        Some(requester) => format!(
            "Requested by {} • Use the buttons below to control playback",
            requester.name
        ),
        None => "Use the buttons below to control playback".to_string(),
    };

    PanelView {
        title: "🎵 Now Playing".to_string(),
        description: format!(
            "**[{}]({})**",
            sanitize_for_embed(&track.title, TITLE_LIMIT),
            track.uri
        ),
        url: Some(track.uri.clone()),
        color: PANEL_COLOR,
        fields: fields
            .into_iter()
            .map(|mut f| {
                f.value = f.value.chars().take(FIELD_LIMIT).collect();
                f
            })
            .collect(),
        thumbnail: track.artwork_url.clone(),
        footer: Some(footer),
        controls: Some(PanelControls {
            paused,
            loop_mode: snapshot.loop_mode,
            has_queue: snapshot.queue_len > 0,
        }),
    }
}

fn render_idle(snapshot: &SessionSnapshot) -> PanelView {
    PanelView {
        title: "⏹️ Nothing Playing".to_string(),
        description: "Add some music with `/play`!".to_string(),
        url: None,
        color: FINISHED_COLOR,
        fields: vec![PanelField::new(
            "👥 Queue",
            format!("`{} tracks`", snapshot.queue_len),
            true,
        )],
        thumbnail: None,
        footer: None,
        controls: None,
    }
}

/// The view a panel is left with once the queue runs out.
pub fn render_finished() -> PanelView {
    PanelView {
        title: "🏁 Playback Finished".to_string(),
        description: "All tracks have been played. Add more music with `/play`!".to_string(),
        url: None,
        color: FINISHED_COLOR,
        fields: Vec::new(),
        thumbnail: None,
        footer: Some("Use /play to add more tracks".to_string()),
        controls: None,
    }
}

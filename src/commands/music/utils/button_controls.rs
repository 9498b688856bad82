use serenity::all::{ButtonStyle, CreateActionRow, CreateButton, ReactionType};

use super::panel_view::PanelControls;
use super::session::LoopMode;

pub const PLAY_PAUSE: &str = "music_play_pause";
pub const SKIP: &str = "music_skip";
pub const STOP: &str = "music_stop";
pub const SHUFFLE: &str = "music_shuffle";
pub const LOOP: &str = "music_loop";
pub const QUEUE: &str = "music_queue";

/// Panel button actions, parsed from a component custom id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusicButton {
    PlayPause,
    Skip,
    Stop,
    Shuffle,
    Loop,
    Queue,
}

impl MusicButton {
    pub fn from_custom_id(custom_id: &str) -> Option<Self> {
        match custom_id {
            PLAY_PAUSE => Some(MusicButton::PlayPause),
            SKIP => Some(MusicButton::Skip),
            STOP => Some(MusicButton::Stop),
            SHUFFLE => Some(MusicButton::Shuffle),
            LOOP => Some(MusicButton::Loop),
            QUEUE => Some(MusicButton::Queue),
            _ => None,
        }
    }
}

fn button(custom_id: &str, emoji: &str, style: ButtonStyle) -> CreateButton {
    CreateButton::new(custom_id)
        .emoji(ReactionType::Unicode(emoji.to_string()))
        .style(style)
}

/// Creates the panel's control rows, or none for a button-less panel
pub fn panel_buttons(controls: Option<&PanelControls>) -> Vec<CreateActionRow> {
    let Some(controls) = controls else {
        return Vec::new();
    };

    let play_pause = button(
        PLAY_PAUSE,
        if controls.paused { "▶️" } else { "⏸️" },
        ButtonStyle::Primary,
    );
    let skip = button(SKIP, "⏭️", ButtonStyle::Secondary);
    let stop = button(STOP, "⏹️", ButtonStyle::Danger);

    let shuffle = button(SHUFFLE, "🔀", ButtonStyle::Secondary).disabled(!controls.has_queue);
    let loop_button = button(
        LOOP,
        controls.loop_mode.emoji(),
        if controls.loop_mode == LoopMode::Off {
            ButtonStyle::Secondary
        } else {
            ButtonStyle::Success
        },
    );
    let queue = button(QUEUE, "📋", ButtonStyle::Secondary);

    vec![
        CreateActionRow::Buttons(vec![play_pause, skip, stop]),
        CreateActionRow::Buttons(vec![shuffle, loop_button, queue]),
    ]
}

use poise::CreateReply;
use serenity::all::{CreateEmbed, CreateEmbedFooter, Timestamp};

use super::formatting::{format_duration, format_volume_bar, sanitize_for_embed};
use super::music_manager::MusicError;
use super::panel_view::PanelView;
use super::session::{LoopMode, SessionSnapshot, UPCOMING_PREVIEW};
use super::track::Track;

const SUCCESS_COLOR: u32 = 0x00ff00;
const ERROR_COLOR: u32 = 0xff0000;
const INFO_COLOR: u32 = 0x3498db;
const WARNING_COLOR: u32 = 0xffaa00;

/// Title, link and display duration of a track
fn parse_track(track: &Track) -> (String, String, String) {
    let title = sanitize_for_embed(&track.title, 200);
    let duration = if track.duration_ms > 0 {
        format_duration(track.duration_ms)
    } else {
        "Unknown duration".to_string()
    };
    (title, track.uri.clone(), duration)
}

/// Build the embed for a rendered panel
pub fn panel_embed(view: &PanelView) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(&view.title)
        .description(&view.description)
        .color(view.color)
        .timestamp(Timestamp::now());

    if let Some(url) = &view.url {
        embed = embed.url(url);
    }
    for field in &view.fields {
        embed = embed.field(&field.name, &field.value, field.inline);
    }
    if let Some(thumbnail) = &view.thumbnail {
        embed = embed.thumbnail(thumbnail);
    }
    if let Some(footer) = &view.footer {
        embed = embed.footer(CreateEmbedFooter::new(footer));
    }
    embed
}

/// Create an embed for when a song starts playing right away
pub fn now_playing(track: &Track) -> CreateEmbed {
    let (title, url, duration) = parse_track(track);

    let mut embed = CreateEmbed::new()
        .title("🎵 Now Playing")
        .description(format!("[{}]({})", title, url))
        .field("Duration", format!("`{}`", duration), true)
        .color(SUCCESS_COLOR);
    if let Some(artwork) = &track.artwork_url {
        embed = embed.thumbnail(artwork);
    }
    embed
}

/// Create an embed for when a song is added to the queue
pub fn added_to_queue(track: &Track, position: usize) -> CreateEmbed {
    let (title, url, duration) = parse_track(track);

    CreateEmbed::new()
        .title("📋 Added to Queue")
        .description(format!("[{}]({})", title, url))
        .field("Position", format!("`#{}`", position), true)
        .field("Duration", format!("`{}`", duration), true)
        .color(SUCCESS_COLOR)
}

/// Create an embed for the music queue
pub fn music_queue(snapshot: &SessionSnapshot) -> CreateEmbed {
    if snapshot.queue_len == 0 {
        return CreateEmbed::new()
            .title("📋 Queue is Empty")
            .description("No tracks in queue. Add some music with `/play`!")
            .color(ERROR_COLOR);
    }

    let mut description = String::new();
    if let Some(current) = &snapshot.current {
        let (title, url, _) = parse_track(current);
        description.push_str(&format!("**🎵 Now Playing:** [{}]({})\n\n", title, url));
    }

    for (index, track) in snapshot.upcoming.iter().enumerate() {
        let (title, _, duration) = parse_track(track);
        description.push_str(&format!(
            "`{}.` **{}** by `{}`  •  `{}`\n",
            index + 1,
            title,
            sanitize_for_embed(&track.author, 100),
            duration
        ));
    }

    if snapshot.queue_len > UPCOMING_PREVIEW {
        description.push_str(&format!(
            "\n*...and {} more tracks*",
            snapshot.queue_len - UPCOMING_PREVIEW
        ));
    }

    CreateEmbed::new()
        .title("📋 Music Queue")
        .description(description)
        .color(INFO_COLOR)
        .timestamp(Timestamp::now())
        .footer(CreateEmbedFooter::new(format!(
            "Total: {} tracks • {}",
            snapshot.queue_len,
            format_duration(snapshot.queue_duration_ms)
        )))
}

/// Create a reply for a failed music operation
pub fn music_error(err: &MusicError) -> CreateReply {
    let title = match err {
        MusicError::UserNotInVoiceChannel => "❌ Voice Channel Required",
        MusicError::NothingPlaying => "❌ Nothing Playing",
        MusicError::AlreadyPaused => "⏸️ Already Paused",
        MusicError::NotPaused => "▶️ Already Playing",
        MusicError::NoResults(_) => "❌ No Results",
        MusicError::InvalidVolume(_) => "❌ Invalid Volume",
        MusicError::QueueFull { .. } => "❌ Queue Full",
        MusicError::TrackTooLong { .. } => "❌ Track Too Long",
        _ => "❌ Error",
    };
    let color = match err {
        MusicError::AlreadyPaused | MusicError::NotPaused => WARNING_COLOR,
        _ => ERROR_COLOR,
    };

    CreateReply::default()
        .embed(
            CreateEmbed::new()
                .title(title)
                .description(err.to_string())
                .color(color),
        )
        .ephemeral(err.is_user_error())
}

/// Create an embed for a generic error message
pub fn generic_error(message: &str) -> CreateReply {
    CreateReply::default()
        .embed(
            CreateEmbed::new()
                .title("❌ Error")
                .description(message)
                .color(ERROR_COLOR),
        )
        .ephemeral(true)
}

/// Create an embed for when a track is paused
pub fn paused(track: &Track) -> CreateReply {
    let (title, url, _) = parse_track(track);
    CreateReply::default().embed(
        CreateEmbed::new()
            .title("⏸️ Paused")
            .description(format!("Paused [{}]({})", title, url))
            .color(SUCCESS_COLOR),
    )
}

/// Create an embed for when a track is resumed
pub fn resumed(track: &Track) -> CreateReply {
    let (title, url, _) = parse_track(track);
    CreateReply::default().embed(
        CreateEmbed::new()
            .title("▶️ Resumed")
            .description(format!("Resumed [{}]({})", title, url))
            .color(SUCCESS_COLOR),
    )
}

/// Create an embed for when a track is skipped
pub fn skipped(skipped: &Track, next: Option<&Track>) -> CreateReply {
    let (title, url, _) = parse_track(skipped);
    let mut embed = CreateEmbed::new()
        .title("⏭️ Skipped")
        .description(format!("Skipped [{}]({})", title, url))
        .color(SUCCESS_COLOR);

    embed = match next {
        Some(next) => {
            let (title, url, _) = parse_track(next);
            embed.field("Up Next", format!("[{}]({})", title, url), false)
        }
        None => embed.field("Up Next", "Nothing, the queue is empty", false),
    };
    CreateReply::default().embed(embed)
}

/// Create an embed for when the bot stops playing music
pub fn stopped(cleared: usize) -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title("⏹️ Stopped")
            .description(format!(
                "Playback stopped and {} queued tracks cleared",
                cleared
            ))
            .color(SUCCESS_COLOR),
    )
}

pub fn queue_cleared(cleared: usize) -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title("🗑️ Queue Cleared")
            .description(format!("Removed {} tracks from the queue", cleared))
            .color(SUCCESS_COLOR),
    )
}

pub fn shuffled(count: usize) -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title("🔀 Queue Shuffled")
            .description(format!("Shuffled {} tracks", count))
            .color(SUCCESS_COLOR),
    )
}

/// Create an embed showing the volume, either just changed or current
pub fn volume(volume: u8, changed: bool) -> CreateEmbed {
    CreateEmbed::new()
        .title(if changed {
            "🔊 Volume Changed"
        } else {
            "🔊 Current Volume"
        })
        .description(format_volume_bar(volume))
        .color(if changed { SUCCESS_COLOR } else { INFO_COLOR })
}

pub fn loop_mode(mode: LoopMode) -> CreateReply {
    let description = match mode {
        LoopMode::Off => "Looping is off",
        LoopMode::Track => "The current track will repeat",
        LoopMode::Queue => "Finished tracks go back to the end of the queue",
    };
    CreateReply::default().embed(
        CreateEmbed::new()
            .title(format!("{} Loop: {}", mode.emoji(), mode.label()))
            .description(description)
            .color(SUCCESS_COLOR),
    )
}

/// Create an embed for when a track is removed from the queue
pub fn track_removed(track: &Track, position: usize) -> CreateReply {
    let (title, url, _) = parse_track(track);
    CreateReply::default().embed(
        CreateEmbed::new()
            .title("🗑️ Track Removed")
            .description(format!(
                "Removed [{}]({}) from position #{}",
                title, url, position
            ))
            .color(SUCCESS_COLOR),
    )
}

/// Create an embed for when the bot leaves a voice channel
pub fn left_voice_channel() -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title("👋 Left Voice Channel")
            .description("Successfully disconnected and cleared the queue")
            .color(SUCCESS_COLOR),
    )
}

/// Notice posted after a restart that followed an update
pub fn back_online(old_version: &str, new_version: &str, mode: &str) -> CreateEmbed {
    CreateEmbed::new()
        .title("✅ Update Completed Successfully!")
        .description(format!(
            "🎉 **Back online!**\n\n• Version: `{}` → `{}`\n• Mode: {}\n• Commands: 🚀 Ready",
            old_version, new_version, mode
        ))
        .color(SUCCESS_COLOR)
        .timestamp(Timestamp::now())
        .footer(CreateEmbedFooter::new("All systems operational"))
}

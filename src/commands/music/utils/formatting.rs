//! Display helpers for durations, progress bars and embed text.

use regex::Regex;
use std::sync::LazyLock;

const FILLED: &str = "▰";
const EMPTY: &str = "▱";

/// Default width of the panel progress bar.
pub const PROGRESS_BAR_LENGTH: usize = 20;

static EMBED_MARKDOWN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[`*_~|]").expect("static regex"));

static URL_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://(www\.)?").expect("static regex"));

/// Format a millisecond duration as "m:ss", or "h:mm:ss" past an hour.
pub fn format_duration(milliseconds: u64) -> String {
    let total_seconds = milliseconds / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// Create a bar of `length` cells filled in proportion to `position / total`.
pub fn format_progress_bar(position_ms: u64, total_ms: u64, length: usize) -> String {
    if total_ms == 0 {
        return EMPTY.repeat(length);
    }

    let progress = (position_ms as f64 / total_ms as f64).min(1.0);
    let filled = (progress * length as f64) as usize;

    format!("{}{}", FILLED.repeat(filled), EMPTY.repeat(length - filled))
}

/// Progress bar with elapsed/total time and percentage, as shown on the panel.
pub fn format_progress_line(position_ms: u64, total_ms: u64) -> String {
    if total_ms == 0 {
        return format!("{} --:-- / --:--", EMPTY.repeat(PROGRESS_BAR_LENGTH));
    }

    let position_ms = position_ms.min(total_ms);
    let percentage = position_ms * 100 / total_ms;

    format!(
        "{} {} {} ({}%)",
        format_duration(position_ms),
        format_progress_bar(position_ms, total_ms, PROGRESS_BAR_LENGTH),
        format_duration(total_ms),
        percentage
    )
}

/// Ten-cell volume gauge.
pub fn format_volume_bar(volume: u8) -> String {
    let filled = (volume.min(100) / 10) as usize;
    format!("{}{} {}%", FILLED.repeat(filled), EMPTY.repeat(10 - filled), volume)
}

/// Truncate to at most `max_chars` characters, ending in "..." when cut.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Strip markdown that would break an embed field and cap its length.
pub fn sanitize_for_embed(text: &str, max_chars: usize) -> String {
    if text.is_empty() {
        return "N/A".to_string();
    }
    truncate(&EMBED_MARKDOWN.replace_all(text, ""), max_chars)
}

/// Drop the scheme and "www." so a link reads well in a field.
pub fn clean_url_for_display(url: &str, max_chars: usize) -> String {
    if url.is_empty() {
        return "N/A".to_string();
    }
    truncate(&URL_SCHEME.replace(url, ""), max_chars)
}

//! Track lookup through yt-dlp.

use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, info, warn};
use url::Url;

use super::music_manager::{MusicError, MusicResult};
use super::track::Track;

/// Result type for audio source operations
pub type AudioSourceResult<T> = Result<T, MusicError>;

/// How many results a free-text search asks for.
pub const SEARCH_RESULTS: usize = 5;

/// Check if a string is a valid URL
pub fn is_url(input: &str) -> bool {
    Url::parse(input).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

/// The argument handed to yt-dlp: URLs as-is, anything else as a search.
pub fn search_target(query: &str) -> String {
    let query = query.trim();
    if is_url(query) {
        query.to_string()
    } else {
        format!("ytsearch{}:{}", SEARCH_RESULTS, query)
    }
}

/// One line of `yt-dlp -j` output.
#[derive(Debug, Deserialize)]
struct YtDlpEntry {
    title: Option<String>,
    uploader: Option<String>,
    channel: Option<String>,
    webpage_url: Option<String>,
    original_url: Option<String>,
    duration: Option<f64>,
    thumbnail: Option<String>,
}

impl YtDlpEntry {
    fn into_track(self) -> Option<Track> {
        let uri = self.webpage_url.or(self.original_url)?;
        let duration_ms = self
            .duration
            .filter(|secs| secs.is_finite() && *secs > 0.0)
            .map(|secs| (secs * 1000.0) as u64)
            .unwrap_or(0);

        let track = Track::new(
            self.title.unwrap_or_else(|| "Unknown Title".to_string()),
            self.uploader
                .or(self.channel)
                .unwrap_or_else(|| "Unknown".to_string()),
            uri,
            duration_ms,
        )
        .with_artwork(self.thumbnail);
        Some(track)
    }
}

/// Parse `yt-dlp -j` output, one JSON object per line. Lines that do not
/// describe a playable entry are skipped.
pub fn parse_search_output(stdout: &str) -> Vec<Track> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match serde_json::from_str::<YtDlpEntry>(line) {
            Ok(entry) => entry.into_track(),
            Err(err) => {
                warn!("Skipping unreadable yt-dlp entry: {}", err);
                None
            }
        })
        .collect()
}

/// Resolve a query to tracks by running yt-dlp.
pub async fn search(query: &str) -> AudioSourceResult<Vec<Track>> {
    let target = search_target(query);
    info!("Searching yt-dlp for: {}", target);

    let output = Command::new("yt-dlp")
        .args(["-j", "--no-playlist", "--no-warnings", &target])
        .output()
        .await
        .map_err(|e| MusicError::EngineCall(format!("Failed to execute yt-dlp: {}", e)))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    if !output.status.success() && stdout.trim().is_empty() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(MusicError::EngineCall(format!(
            "yt-dlp failed: {}",
            stderr.trim()
        )));
    }

    let tracks = parse_search_output(&stdout);
    debug!("yt-dlp returned {} tracks for {}", tracks.len(), target);
    Ok(tracks)
}

//! Marker file left behind by the updater so the bot can announce that it
//! came back online in the channel that asked for the update.

use serde::Deserialize;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum MarkerError {
    #[error("Failed to read restart marker: {0}")]
    Io(#[from] std::io::Error),

    #[error("Restart marker is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateMarker {
    /// Accepts the id as a number or a string.
    #[serde(default)]
    channel_id: Value,
    #[serde(default = "unknown")]
    pub old_version: String,
    #[serde(default = "unknown")]
    pub new_version: String,
    #[serde(default = "standard")]
    pub mode: String,
}

fn unknown() -> String {
    "unknown".to_string()
}

fn standard() -> String {
    "standard".to_string()
}

impl UpdateMarker {
    /// The channel to announce in, if the marker names a usable one.
    pub fn channel_id(&self) -> Option<u64> {
        let id = match &self.channel_id {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }?;
        (id != 0).then_some(id)
    }

    /// The update mode with its first letter capitalised.
    pub fn mode_title(&self) -> String {
        let mut chars = self.mode.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// Read and delete the marker. Returns `None` when there is no marker.
///
/// The file is removed even when it cannot be parsed, so a broken marker is
/// not retried on every start.
pub async fn take(path: &Path) -> Result<Option<UpdateMarker>, MarkerError> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!("No restart marker at {}", path.display());
            return Ok(None);
        }
        Err(err) => return Err(err.into()),
    };

    tokio::fs::remove_file(path).await?;
    let marker: UpdateMarker = serde_json::from_str(&raw)?;
    info!(
        "Found restart marker: {} -> {}",
        marker.old_version, marker.new_version
    );
    Ok(Some(marker))
}

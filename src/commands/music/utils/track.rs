//! Defines the `Track` struct, the typed representation of a playable item
//! resolved from a search result.

use serde::{Deserialize, Serialize};
use serenity::model::id::UserId;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

static NEXT_TRACK_KEY: AtomicU64 = AtomicU64::new(1);

/// Identity of a single track entry.
///
/// Clones of a `Track` share their key; `Track::duplicate` mints a new one.
/// Engine events and the skip guard compare keys, never titles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackKey(u64);

impl TrackKey {
    fn next() -> Self {
        Self(NEXT_TRACK_KEY.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

/// The user who asked for a track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requester {
    pub id: UserId,
    pub name: String,
}

impl Requester {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A playable item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    key: TrackKey,
    /// The title of the track.
    pub title: String,
    /// Uploader or artist.
    pub author: String,
    /// Where the engine streams the track from.
    pub uri: String,
    /// Length in milliseconds. Zero when the source did not report one.
    pub duration_ms: u64,
    /// Thumbnail/artwork image, if the source had one.
    pub artwork_url: Option<String>,
    /// Attached when the track is enqueued.
    pub requester: Option<Requester>,
}

impl Track {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        uri: impl Into<String>,
        duration_ms: u64,
    ) -> Self {
        Self {
            key: TrackKey::next(),
            title: title.into(),
            author: author.into(),
            uri: uri.into(),
            duration_ms,
            artwork_url: None,
            requester: None,
        }
    }

    pub fn with_artwork(mut self, artwork_url: Option<String>) -> Self {
        self.artwork_url = artwork_url;
        self
    }

    pub fn key(&self) -> TrackKey {
        self.key
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Same track data under a new identity. Used when loop-queue re-appends
    /// the finished track.
    pub fn duplicate(&self) -> Self {
        Self {
            key: TrackKey::next(),
            ..self.clone()
        }
    }

    pub(crate) fn attach_requester(&mut self, requester: Requester) {
        self.requester = Some(requester);
    }

    /// True when both values are the same entry.
    pub fn same_entry(&self, other: &Track) -> bool {
        self.key == other.key
    }
}

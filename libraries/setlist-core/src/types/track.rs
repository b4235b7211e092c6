/// Track domain types
use serde::{Deserialize, Serialize};

/// A media item inside a playlist.
///
/// Tracks are immutable values. Structural equality (`==`) compares every
/// field; playlist de-duplication uses [`Track::dedup_key`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Track {
    /// Provider track ID (may be empty for URL-only media)
    #[serde(default)]
    pub id: String,

    /// Track title
    #[serde(default)]
    pub title: String,

    /// Artist name
    #[serde(default)]
    pub artist: String,

    /// Playable media location
    #[serde(default)]
    pub media_url: String,

    /// Artwork location
    #[serde(default)]
    pub thumbnail_url: String,

    /// Duration in milliseconds
    #[serde(default)]
    pub duration_ms: u64,
}

/// Identity of a track for de-duplication purposes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TrackKey {
    /// Non-empty provider ID
    Id(String),
    /// Trimmed, case-folded media URL
    MediaUrl(String),
}

impl Track {
    /// Create a track with an ID, title and artist
    pub fn new(id: impl Into<String>, title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            ..Self::default()
        }
    }

    /// Set the media URL
    #[must_use]
    pub fn with_media_url(mut self, media_url: impl Into<String>) -> Self {
        self.media_url = media_url.into();
        self
    }

    /// Set the thumbnail URL
    #[must_use]
    pub fn with_thumbnail_url(mut self, thumbnail_url: impl Into<String>) -> Self {
        self.thumbnail_url = thumbnail_url.into();
        self
    }

    /// Set the duration
    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// De-duplication key: the ID when non-empty, else the normalized media URL.
    pub fn dedup_key(&self) -> TrackKey {
        if self.id.is_empty() {
            TrackKey::MediaUrl(self.media_url.trim().to_lowercase())
        } else {
            TrackKey::Id(self.id.clone())
        }
    }

    /// Whether two tracks are the same entry for de-duplication purposes.
    pub fn is_same_track(&self, other: &Track) -> bool {
        self.dedup_key() == other.dedup_key()
    }
}

/// Playlist domain types
use crate::error::{Result, SetlistError};
use crate::types::{PlaylistId, Track};
use serde::{Deserialize, Serialize};

/// Playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    /// Unique playlist identifier
    pub id: PlaylistId,

    /// Playlist name
    pub name: String,

    /// Ordered tracks; no two entries share a dedup key
    #[serde(default)]
    pub tracks: Vec<Track>,
}

impl Playlist {
    /// Create a new, empty playlist with a freshly generated ID
    pub fn new(name: &str) -> Result<Self> {
        Ok(Self {
            id: PlaylistId::generate(),
            name: validate_name(name)?,
            tracks: Vec::new(),
        })
    }

    /// Create a playlist with a specific ID (for decoding stored data)
    pub fn with_id(id: PlaylistId, name: impl Into<String>, tracks: Vec<Track>) -> Self {
        Self {
            id,
            name: name.into(),
            tracks,
        }
    }

    /// Replace the name, rejecting names that are empty after trimming
    pub fn rename(&mut self, name: &str) -> Result<()> {
        self.name = validate_name(name)?;
        Ok(())
    }

    /// Whether an equal track (by dedup key) is already present
    pub fn contains(&self, track: &Track) -> bool {
        self.tracks.iter().any(|t| t.is_same_track(track))
    }

    /// Append a track unless an equal one is already present.
    ///
    /// Returns whether the track was appended.
    pub fn push_track(&mut self, track: Track) -> bool {
        if self.contains(&track) {
            return false;
        }
        self.tracks.push(track);
        true
    }

    /// Remove every track equal to the given one.
    ///
    /// Returns whether anything was removed.
    pub fn remove_track(&mut self, track: &Track) -> bool {
        let before = self.tracks.len();
        self.tracks.retain(|t| !t.is_same_track(track));
        self.tracks.len() != before
    }
}

/// Trim a playlist name and reject it if nothing is left.
pub fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(SetlistError::invalid_name(name));
    }
    Ok(trimmed.to_string())
}

/// A playlist versioned by the time of its last local mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistRecord {
    /// The playlist value
    pub playlist: Playlist,

    /// Unix milliseconds of the last create/rename/add/remove
    pub updated_at_ms: i64,
}

impl PlaylistRecord {
    /// Wrap a playlist with its update time
    pub fn new(playlist: Playlist, updated_at_ms: i64) -> Self {
        Self {
            playlist,
            updated_at_ms,
        }
    }

    /// ID of the wrapped playlist
    pub fn id(&self) -> &PlaylistId {
        &self.playlist.id
    }
}

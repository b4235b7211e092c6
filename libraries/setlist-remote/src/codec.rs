//! Snapshot <-> document field mapping.
//!
//! ```text
//! accountKey:           string
//! generatedAtMs:        integer
//! playlists:            array<map{ id, name: string, updatedAtMs: integer,
//!                         songs: array<map{ id, title, artist, mediaUrl,
//!                                           thumbnailUrl: string,
//!                                           durationMs: integer }> }>
//! deletedPlaylistIds:   array<string>
//! ```
//!
//! Decoding is lenient in every direction: missing or mistyped fields take
//! their zero value, playlists without an ID are dropped, and negative
//! durations clamp to zero.

use crate::document::{Document, FieldValue};
use setlist_core::{PartitionKey, Playlist, PlaylistId, PlaylistRecord, Snapshot, Track};
use std::collections::BTreeMap;

/// Field names of the playlist document.
pub mod fields {
    pub const ACCOUNT_KEY: &str = "accountKey";
    pub const GENERATED_AT_MS: &str = "generatedAtMs";
    pub const PLAYLISTS: &str = "playlists";
    pub const DELETED_PLAYLIST_IDS: &str = "deletedPlaylistIds";

    pub const PLAYLIST_ID: &str = "id";
    pub const PLAYLIST_NAME: &str = "name";
    pub const PLAYLIST_UPDATED_AT_MS: &str = "updatedAtMs";
    pub const PLAYLIST_SONGS: &str = "songs";

    pub const SONG_ID: &str = "id";
    pub const SONG_TITLE: &str = "title";
    pub const SONG_ARTIST: &str = "artist";
    pub const SONG_MEDIA_URL: &str = "mediaUrl";
    pub const SONG_THUMBNAIL_URL: &str = "thumbnailUrl";
    pub const SONG_DURATION_MS: &str = "durationMs";
}

// =============================================================================
// Encoding
// =============================================================================

/// Encode a snapshot as the partition's document.
pub fn encode_snapshot(partition: &PartitionKey, snapshot: &Snapshot) -> Document {
    let mut document = Document::default();
    document.insert(fields::ACCOUNT_KEY, FieldValue::string(partition.as_str()));
    document.insert(
        fields::GENERATED_AT_MS,
        FieldValue::Integer(snapshot.generated_at_ms),
    );
    document.insert(
        fields::PLAYLISTS,
        FieldValue::Array(snapshot.records.values().map(encode_record).collect()),
    );
    document.insert(
        fields::DELETED_PLAYLIST_IDS,
        FieldValue::Array(
            snapshot
                .tombstones
                .iter()
                .map(|id| FieldValue::string(id.as_str()))
                .collect(),
        ),
    );
    document
}

fn encode_record(record: &PlaylistRecord) -> FieldValue {
    let playlist = &record.playlist;
    let mut map = BTreeMap::new();
    map.insert(
        fields::PLAYLIST_ID.to_string(),
        FieldValue::string(playlist.id.as_str()),
    );
    map.insert(
        fields::PLAYLIST_NAME.to_string(),
        FieldValue::string(playlist.name.as_str()),
    );
    map.insert(
        fields::PLAYLIST_UPDATED_AT_MS.to_string(),
        FieldValue::Integer(record.updated_at_ms),
    );
    map.insert(
        fields::PLAYLIST_SONGS.to_string(),
        FieldValue::Array(playlist.tracks.iter().map(encode_track).collect()),
    );
    FieldValue::Map(map)
}

fn encode_track(track: &Track) -> FieldValue {
    let mut map = BTreeMap::new();
    for (name, value) in [
        (fields::SONG_ID, &track.id),
        (fields::SONG_TITLE, &track.title),
        (fields::SONG_ARTIST, &track.artist),
        (fields::SONG_MEDIA_URL, &track.media_url),
        (fields::SONG_THUMBNAIL_URL, &track.thumbnail_url),
    ] {
        map.insert(name.to_string(), FieldValue::string(value.as_str()));
    }
    map.insert(
        fields::SONG_DURATION_MS.to_string(),
        FieldValue::Integer(i64::try_from(track.duration_ms).unwrap_or(i64::MAX)),
    );
    FieldValue::Map(map)
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode a partition document into a snapshot.
pub fn decode_snapshot(document: &Document) -> Snapshot {
    let generated_at_ms = integer(document.get(fields::GENERATED_AT_MS));
    let mut snapshot = Snapshot::empty(generated_at_ms);

    for entry in array(document.get(fields::PLAYLISTS)) {
        let Some(record) = decode_record(entry) else {
            continue;
        };
        // Duplicate IDs: the newer entry wins
        match snapshot.records.get(record.id()) {
            Some(existing) if existing.updated_at_ms > record.updated_at_ms => {}
            _ => snapshot.insert_record(record),
        }
    }

    for id in array(document.get(fields::DELETED_PLAYLIST_IDS))
        .iter()
        .filter_map(FieldValue::as_str)
        .filter(|id| !id.is_empty())
    {
        snapshot.tombstone(PlaylistId::new(id));
    }

    snapshot
}

/// The partition a document claims to belong to, if recorded.
pub(crate) fn account_key(document: &Document) -> Option<&str> {
    document.get(fields::ACCOUNT_KEY).and_then(FieldValue::as_str)
}

fn decode_record(value: &FieldValue) -> Option<PlaylistRecord> {
    let map = value.as_map()?;
    let id = string(map.get(fields::PLAYLIST_ID));
    if id.is_empty() {
        return None;
    }

    let tracks = array(map.get(fields::PLAYLIST_SONGS))
        .iter()
        .filter_map(decode_track)
        .collect();
    let playlist = Playlist::with_id(
        PlaylistId::new(id),
        string(map.get(fields::PLAYLIST_NAME)),
        tracks,
    );

    Some(PlaylistRecord::new(
        playlist,
        integer(map.get(fields::PLAYLIST_UPDATED_AT_MS)),
    ))
}

fn decode_track(value: &FieldValue) -> Option<Track> {
    let map = value.as_map()?;
    Some(Track {
        id: string(map.get(fields::SONG_ID)),
        title: string(map.get(fields::SONG_TITLE)),
        artist: string(map.get(fields::SONG_ARTIST)),
        media_url: string(map.get(fields::SONG_MEDIA_URL)),
        thumbnail_url: string(map.get(fields::SONG_THUMBNAIL_URL)),
        duration_ms: u64::try_from(integer(map.get(fields::SONG_DURATION_MS))).unwrap_or(0),
    })
}

fn string(value: Option<&FieldValue>) -> String {
    value
        .and_then(FieldValue::as_str)
        .unwrap_or_default()
        .to_string()
}

fn integer(value: Option<&FieldValue>) -> i64 {
    value.and_then(FieldValue::as_i64).unwrap_or_default()
}

fn array(value: Option<&FieldValue>) -> &[FieldValue] {
    value.and_then(FieldValue::as_array).unwrap_or_default()
}

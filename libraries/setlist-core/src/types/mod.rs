mod ids;
mod playlist;
mod snapshot;
mod track;

pub use ids::PlaylistId;
pub use playlist::{validate_name, Playlist, PlaylistRecord};
pub use snapshot::Snapshot;
pub use track::{Track, TrackKey};

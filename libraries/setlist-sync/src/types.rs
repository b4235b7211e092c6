use serde::{Deserialize, Serialize};
use setlist_core::clock::now_ms;
use std::fmt;

/// Outcome class of a sync cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    /// Nothing was attempted (sync disabled or no identity)
    Offline,
    /// Local state holds the merged result; `detail` says whether the push landed
    ConflictResolved,
    /// Local storage failed; nothing was merged
    Error,
}

/// Status reported by every sync attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStatus {
    pub state: SyncState,
    pub detail: String,
    /// When the status was produced (Unix millis)
    #[serde(default)]
    pub at_ms: i64,
}

impl SyncStatus {
    pub fn new(state: SyncState, detail: impl Into<String>) -> Self {
        Self {
            state,
            detail: detail.into(),
            at_ms: now_ms(),
        }
    }

    pub fn offline(detail: impl Into<String>) -> Self {
        Self::new(SyncState::Offline, detail)
    }

    pub fn resolved(detail: impl Into<String>) -> Self {
        Self::new(SyncState::ConflictResolved, detail)
    }

    pub fn error(detail: impl Into<String>) -> Self {
        Self::new(SyncState::Error, detail)
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Offline => "offline",
            Self::ConflictResolved => "conflict_resolved",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.state, self.detail)
    }
}

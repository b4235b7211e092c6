//! Session state and account partitioning.
//!
//! The session is an explicit context object: who is signed in and whether
//! remote synchronization is allowed. Components receive a [`SessionContext`]
//! handle instead of reading process-wide globals.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Partition key used for the anonymous (signed-out) dataset.
pub const ANONYMOUS_PARTITION: &str = "guest";

/// An authenticated identity handed back by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable subject identifier (e.g. account email)
    pub subject: String,
    /// Bearer credential for the remote store, if one was issued
    pub bearer_token: Option<String>,
}

/// Session configuration consulted by the sync coordinator and replicas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Administrative switch for remote synchronization
    pub sync_enabled: bool,
    /// Signed-in identity, `None` for guests
    pub identity: Option<Identity>,
}

impl Default for Session {
    fn default() -> Self {
        Self::guest()
    }
}

impl Session {
    /// Signed-out session with sync enabled
    pub fn guest() -> Self {
        Self {
            sync_enabled: true,
            identity: None,
        }
    }

    /// Signed-in session with sync enabled
    pub fn signed_in(subject: impl Into<String>, bearer_token: Option<String>) -> Self {
        Self {
            sync_enabled: true,
            identity: Some(Identity {
                subject: subject.into(),
                bearer_token,
            }),
        }
    }

    /// Whether an identity is present
    pub fn is_signed_in(&self) -> bool {
        self.identity.is_some()
    }

    /// Bearer credential of the current identity, if any
    pub fn bearer_token(&self) -> Option<&str> {
        self.identity
            .as_ref()
            .and_then(|identity| identity.bearer_token.as_deref())
    }
}

/// String isolating one account's dataset from every other account's.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartitionKey(String);

impl PartitionKey {
    /// The anonymous partition
    pub fn anonymous() -> Self {
        Self(ANONYMOUS_PARTITION.to_string())
    }

    /// Partition of an authenticated subject: `user:` + trimmed, lowercased subject
    pub fn for_subject(subject: &str) -> Self {
        Self(format!("user:{}", subject.trim().to_lowercase()))
    }

    /// Pure function of the session's signed-in state
    pub fn for_session(session: &Session) -> Self {
        match &session.identity {
            Some(identity) => Self::for_subject(&identity.subject),
            None => Self::anonymous(),
        }
    }

    /// Whether this is the anonymous partition
    pub fn is_anonymous(&self) -> bool {
        self.0 == ANONYMOUS_PARTITION
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shared, mutable handle to the current [`Session`].
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    inner: Arc<RwLock<Session>>,
}

impl SessionContext {
    /// Wrap an initial session
    pub fn new(session: Session) -> Self {
        Self {
            inner: Arc::new(RwLock::new(session)),
        }
    }

    /// Copy of the current session
    pub async fn snapshot(&self) -> Session {
        self.inner.read().await.clone()
    }

    /// Partition key of the current session
    pub async fn partition_key(&self) -> PartitionKey {
        PartitionKey::for_session(&*self.inner.read().await)
    }

    /// Switch to an authenticated identity
    pub async fn sign_in(&self, subject: impl Into<String>, bearer_token: Option<String>) {
        let mut session = self.inner.write().await;
        session.identity = Some(Identity {
            subject: subject.into(),
            bearer_token,
        });
    }

    /// Return to the anonymous partition
    pub async fn sign_out(&self) {
        self.inner.write().await.identity = None;
    }

    /// Turn remote synchronization on or off
    pub async fn set_sync_enabled(&self, enabled: bool) {
        self.inner.write().await.sync_enabled = enabled;
    }
}

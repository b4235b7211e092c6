//! Configuration for the remote replica.

use std::time::Duration;

/// Default collection holding one document per partition.
pub const DEFAULT_COLLECTION: &str = "playlists";

/// Configuration for connecting to the remote document store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    /// Base URL of the document API (e.g. "https://docs.example.com/v1/documents")
    pub url: String,
    /// Collection under the base URL
    pub collection: String,
    /// TCP/TLS connect timeout
    pub connect_timeout: Duration,
    /// Whole-request timeout (covers reading the response)
    pub request_timeout: Duration,
}

impl RemoteConfig {
    /// Create a config with default collection and timeouts.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            collection: DEFAULT_COLLECTION.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(12),
        }
    }

    /// Use a different collection.
    #[must_use]
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    /// Override both timeouts.
    #[must_use]
    pub fn with_timeouts(mut self, connect: Duration, request: Duration) -> Self {
        self.connect_timeout = connect;
        self.request_timeout = request;
        self
    }
}

//! HTTP client for the remote document store.

use crate::codec::{self, decode_snapshot, encode_snapshot};
use crate::document::Document;
use crate::error::{RemoteError, Result};
use crate::types::RemoteConfig;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use setlist_core::clock::now_ms;
use setlist_core::{PartitionKey, Snapshot};
use tracing::{debug, warn};
use url::Url;

/// Pull/push access to the per-partition remote document.
///
/// Implemented by [`RemoteReplica`]; the sync coordinator only depends on
/// this trait so hosts and tests can substitute their own store.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch the partition's snapshot.
    ///
    /// A missing document is an empty snapshot. Every other failure is
    /// [`RemoteError::Unavailable`].
    async fn pull(&self, partition: &PartitionKey, token: Option<&str>) -> Result<Snapshot>;

    /// Replace the partition's document with `snapshot`.
    async fn push(
        &self,
        partition: &PartitionKey,
        snapshot: &Snapshot,
        token: Option<&str>,
    ) -> Result<()>;
}

/// Client for a structured document store holding one document per partition.
///
/// Documents live at `{url}/{collection}/{partition}`.
///
/// # Example
///
/// ```ignore
/// use setlist_remote::{RemoteConfig, RemoteReplica};
///
/// let remote = RemoteReplica::new(RemoteConfig::new("https://docs.example.com/v1/documents"))?;
/// ```
#[derive(Debug, Clone)]
pub struct RemoteReplica {
    http: Client,
    base: Url,
    collection: String,
}

impl RemoteReplica {
    /// Create a new client with the given configuration.
    pub fn new(config: RemoteConfig) -> Result<Self> {
        if config.url.is_empty() {
            return Err(RemoteError::InvalidUrl("URL cannot be empty".into()));
        }

        let url = config.url.trim_end_matches('/');
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(RemoteError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }
        let base = Url::parse(url).map_err(|e| RemoteError::InvalidUrl(e.to_string()))?;

        if config.collection.trim().is_empty() {
            return Err(RemoteError::InvalidUrl(
                "collection cannot be empty".into(),
            ));
        }

        let http = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(format!("Setlist/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base,
            collection: config.collection,
        })
    }

    /// Base URL without trailing slash.
    pub fn url(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    /// Location of a partition's document.
    pub fn document_url(&self, partition: &PartitionKey) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| RemoteError::InvalidUrl(format!("{} cannot be a base URL", self.base)))?
            .pop_if_empty()
            .push(&self.collection)
            .push(partition.as_str());
        Ok(url)
    }

    fn authorize(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl RemoteStore for RemoteReplica {
    async fn pull(&self, partition: &PartitionKey, token: Option<&str>) -> Result<Snapshot> {
        let url = self.document_url(partition)?;
        debug!(url = %url, partition = %partition, "Pulling remote document");

        let response = Self::authorize(self.http.get(url), token)
            .send()
            .await
            .map_err(|e| RemoteError::Unavailable(e.to_string()))?;

        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            debug!(partition = %partition, "No remote document yet");
            return Ok(Snapshot::empty(now_ms()));
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(RemoteError::Unavailable(format!(
                "pull returned {}: {}",
                status.as_u16(),
                error_text
            )));
        }

        let body: serde_json::Value = response.json().await.map_err(|e| {
            RemoteError::Unavailable(format!("Failed to parse remote document: {}", e))
        })?;
        let document = Document::from_json(&body);

        if let Some(claimed) = codec::account_key(&document) {
            if claimed != partition.as_str() {
                warn!(
                    partition = %partition,
                    claimed = %claimed,
                    "Remote document names a different account key"
                );
            }
        }

        let snapshot = decode_snapshot(&document);
        debug!(
            playlists = snapshot.records.len(),
            tombstones = snapshot.tombstones.len(),
            "Pulled remote document"
        );

        Ok(snapshot)
    }

    async fn push(
        &self,
        partition: &PartitionKey,
        snapshot: &Snapshot,
        token: Option<&str>,
    ) -> Result<()> {
        let url = self.document_url(partition)?;
        debug!(url = %url, partition = %partition, "Pushing remote document");

        let body = encode_snapshot(partition, snapshot).to_json();
        let response = Self::authorize(self.http.patch(url), token)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    RemoteError::Unavailable(e.to_string())
                } else {
                    RemoteError::Request(e)
                }
            })?;

        let status = response.status();

        if status.is_success() {
            debug!(playlists = snapshot.records.len(), "Pushed remote document");
            Ok(())
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, "Push rejected: credential missing or expired");
            Err(RemoteError::AuthRequired(error_text))
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Err(RemoteError::ServerError {
                status: status.as_u16(),
                message: error_text,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_validation() {
        assert!(RemoteReplica::new(RemoteConfig::new("https://example.com")).is_ok());
        assert!(RemoteReplica::new(RemoteConfig::new("http://localhost:8080/v1")).is_ok());

        assert!(RemoteReplica::new(RemoteConfig::new("")).is_err());
        assert!(RemoteReplica::new(RemoteConfig::new("not-a-url")).is_err());
        assert!(RemoteReplica::new(RemoteConfig::new("ftp://example.com")).is_err());
        assert!(
            RemoteReplica::new(RemoteConfig::new("https://example.com").with_collection(" "))
                .is_err()
        );
    }

    #[test]
    fn test_document_url() {
        let remote =
            RemoteReplica::new(RemoteConfig::new("https://example.com/v1/documents/")).unwrap();

        let url = remote
            .document_url(&PartitionKey::for_subject("a@example.com"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.com/v1/documents/playlists/user:a@example.com"
        );
        assert_eq!(remote.url(), "https://example.com/v1/documents");
    }

    #[test]
    fn test_document_url_escapes_slashes() {
        let remote = RemoteReplica::new(RemoteConfig::new("https://example.com")).unwrap();

        let url = remote
            .document_url(&PartitionKey::for_subject("a/b"))
            .unwrap();
        assert_eq!(url.as_str(), "https://example.com/playlists/user:a%2Fb");
    }
}

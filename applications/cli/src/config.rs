/// CLI configuration
use serde::{Deserialize, Serialize};
use setlist_core::Session;
use setlist_remote::RemoteConfig;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "setlist.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CliConfig {
    #[serde(default = "default_storage")]
    pub storage: StorageSettings,

    #[serde(default = "default_remote")]
    pub remote: RemoteSettings,

    #[serde(default = "default_sync")]
    pub sync: SyncSettings,

    #[serde(default)]
    pub identity: IdentitySettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_database_url")]
    pub database_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RemoteSettings {
    /// Document API base URL; empty means no remote is configured
    #[serde(default)]
    pub base_url: String,

    #[serde(default = "default_collection")]
    pub collection: String,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncSettings {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct IdentitySettings {
    /// Account subject (e-mail or user ID); absent means guest
    pub subject: Option<String>,

    /// Bearer token sent to the remote store
    pub token: Option<String>,
}

impl CliConfig {
    /// Load configuration from file and environment.
    ///
    /// An explicit `path` must exist; otherwise `setlist.toml` is read when
    /// present. `SETLIST_<SECTION>__<KEY>` variables override both.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables (e.g. SETLIST_REMOTE__BASE_URL)
        settings = settings.add_source(
            config::Environment::with_prefix("SETLIST")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = settings.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.storage.database_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "storage.database_url cannot be empty".to_string(),
            ));
        }

        if self.remote.connect_timeout_secs == 0 || self.remote.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "remote timeouts must be at least one second".to_string(),
            ));
        }

        let base_url = self.remote.base_url.trim();
        if !base_url.is_empty()
            && !base_url.starts_with("http://")
            && !base_url.starts_with("https://")
        {
            return Err(ConfigError::Invalid(format!(
                "remote.base_url must start with http:// or https:// (got {base_url:?})"
            )));
        }

        Ok(())
    }

    /// Session described by the identity and sync settings
    pub fn session(&self) -> Session {
        let subject = self
            .identity
            .subject
            .as_deref()
            .map(str::trim)
            .filter(|subject| !subject.is_empty());

        let mut session = match subject {
            Some(subject) => Session::signed_in(subject, self.identity.token.clone()),
            None => Session::guest(),
        };
        session.sync_enabled = self.sync.enabled;
        session
    }

    /// Remote client settings, or `None` when no remote is configured
    pub fn remote_config(&self) -> Option<RemoteConfig> {
        let base_url = self.remote.base_url.trim();
        if base_url.is_empty() {
            return None;
        }

        Some(
            RemoteConfig::new(base_url)
                .with_collection(self.remote.collection.clone())
                .with_timeouts(
                    Duration::from_secs(self.remote.connect_timeout_secs),
                    Duration::from_secs(self.remote.request_timeout_secs),
                ),
        )
    }
}

// Default values
fn default_storage() -> StorageSettings {
    StorageSettings {
        database_url: default_database_url(),
    }
}

fn default_database_url() -> String {
    "sqlite://./setlist.db".to_string()
}

fn default_remote() -> RemoteSettings {
    RemoteSettings {
        base_url: String::new(),
        collection: default_collection(),
        connect_timeout_secs: default_connect_timeout_secs(),
        request_timeout_secs: default_request_timeout_secs(),
    }
}

fn default_collection() -> String {
    "playlists".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    12
}

fn default_sync() -> SyncSettings {
    SyncSettings {
        enabled: default_enabled(),
    }
}

fn default_enabled() -> bool {
    true
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            storage: default_storage(),
            remote: default_remote(),
            sync: default_sync(),
            identity: IdentitySettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = CliConfig::default();
        assert_eq!(config.storage.database_url, "sqlite://./setlist.db");
        assert_eq!(config.remote.collection, "playlists");
        assert_eq!(config.remote.connect_timeout_secs, 10);
        assert_eq!(config.remote.request_timeout_secs, 12);
        assert!(config.sync.enabled);
        assert!(config.remote_config().is_none());
        assert!(!config.session().is_signed_in());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let file = write_config(
            r#"
            [remote]
            base_url = "https://docs.example.com/v1/documents"
            request_timeout_secs = 5

            [sync]
            enabled = false

            [identity]
            subject = "  Dana@Example.com "
            token = "t0k"
            "#,
        );

        let config = CliConfig::load(Some(file.path())).unwrap();

        assert_eq!(config.remote.request_timeout_secs, 5);
        assert_eq!(config.remote.connect_timeout_secs, 10);
        assert_eq!(config.storage.database_url, "sqlite://./setlist.db");

        let session = config.session();
        assert!(!session.sync_enabled);
        assert_eq!(session.bearer_token(), Some("t0k"));
        assert_eq!(
            setlist_core::PartitionKey::for_session(&session).as_str(),
            "user:dana@example.com"
        );

        let remote = config.remote_config().unwrap();
        assert_eq!(remote.request_timeout, Duration::from_secs(5));
        assert_eq!(remote.collection, "playlists");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = CliConfig::load(Some(&dir.path().join("nope.toml")));
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let mut config = CliConfig::default();
        config.remote.connect_timeout_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let mut config = CliConfig::default();
        config.remote.base_url = "ftp://docs.example.com".to_string();
        assert!(config.validate().is_err());

        config.remote.base_url = "http://localhost:8080".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blank_subject_is_guest() {
        let mut config = CliConfig::default();
        config.identity.subject = Some("   ".to_string());
        assert!(!config.session().is_signed_in());
    }
}

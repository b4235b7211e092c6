//! Setlist Storage
//!
//! Partitioned, offline-first persistence for playlist datasets.
//!
//! # Architecture
//!
//! - **Byte stores**: `MemoryByteStore` for tests and ephemeral hosts,
//!   `SqliteByteStore` for durable on-device storage
//! - **AccountScope**: derives the partition key from the session and moves
//!   pre-partition data into the anonymous partition exactly once
//! - **LocalReplica**: playlist CRUD plus snapshot export/import, with the
//!   timestamps and tombstones the merge engine needs
//!
//! # Example
//!
//! ```rust,no_run
//! use setlist_core::{Session, SessionContext};
//! use setlist_storage::{LocalReplica, SqliteByteStore};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteByteStore::open("sqlite://setlist.db").await?;
//! let session = SessionContext::new(Session::guest());
//! let replica = LocalReplica::new(Arc::new(store), session);
//!
//! let playlist = replica.create("Morning").await?;
//! println!("created {}", playlist.id);
//! # Ok(())
//! # }
//! ```

mod dataset;
mod error;
mod keys;
mod memory;
mod replica;
mod scope;
mod sqlite;

pub use error::StorageError;
pub use memory::MemoryByteStore;
pub use replica::LocalReplica;
pub use scope::{AccountScope, LegacyPlaylist, MigrationOutcome};
pub use sqlite::SqliteByteStore;

use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePool;
use tracing::debug;

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
///
/// Call once at startup before using a [`SqliteByteStore`] built from a raw
/// pool. [`SqliteByteStore::open`] does this itself.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// Create a new `SQLite` pool
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `<sqlite://setlist.db>`)
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    debug!(url = %database_url, "Creating SQLite pool");

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    debug!("SQLite pool ready");

    Ok(pool)
}

/// Setlist - offline-first playlists with account sync
mod config;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use crate::config::CliConfig;
use setlist_core::{PlaylistId, SessionContext, Track};
use setlist_remote::RemoteReplica;
use setlist_storage::{LocalReplica, SqliteByteStore};
use setlist_sync::{SyncCoordinator, SyncStatus};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "setlist")]
#[command(about = "Offline-first playlists that sync across devices", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "SETLIST_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List playlists of the current account
    List,
    /// Create an empty playlist
    Create {
        /// Playlist name
        name: String,
    },
    /// Rename a playlist
    Rename {
        /// Playlist ID
        id: String,
        /// New name
        name: String,
    },
    /// Delete a playlist
    Delete {
        /// Playlist ID
        id: String,
    },
    /// Append a track to a playlist
    AddTrack {
        /// Playlist ID
        playlist: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        id: String,
        #[arg(long, default_value = "")]
        artist: String,
        #[arg(long, default_value = "")]
        media_url: String,
        #[arg(long, default_value = "")]
        thumbnail_url: String,
        #[arg(long, default_value_t = 0)]
        duration_ms: u64,
    },
    /// Remove a track (matched by ID, or by media URL when it has no ID)
    RemoveTrack {
        /// Playlist ID
        playlist: String,
        #[arg(long, default_value = "")]
        id: String,
        #[arg(long, default_value = "")]
        media_url: String,
    },
    /// Reconcile with the remote store
    Sync,
    /// Show the account and the last sync result
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "setlist=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref())?;

    let store = SqliteByteStore::open(&config.storage.database_url)
        .await
        .with_context(|| format!("Failed to open {}", config.storage.database_url))?;
    let session = SessionContext::new(config.session());
    let local = Arc::new(LocalReplica::new(Arc::new(store), session.clone()));

    match cli.command {
        Commands::List => list(&local).await?,
        Commands::Create { name } => {
            let playlist = local.create(&name).await?;
            println!("{}", playlist.id);
        }
        Commands::Rename { id, name } => {
            let playlist = local.rename(&PlaylistId::new(id), &name).await?;
            println!("Renamed {} to {:?}", playlist.id, playlist.name);
        }
        Commands::Delete { id } => {
            local.delete(&PlaylistId::new(id.as_str())).await?;
            println!("Deleted {id}");
        }
        Commands::AddTrack {
            playlist,
            title,
            id,
            artist,
            media_url,
            thumbnail_url,
            duration_ms,
        } => {
            let playlist = PlaylistId::new(playlist);
            if local.get(&playlist).await?.is_none() {
                bail!("Playlist not found: {playlist}");
            }
            let track = Track::new(id, title, artist)
                .with_media_url(media_url)
                .with_thumbnail_url(thumbnail_url)
                .with_duration_ms(duration_ms);
            if local.add_track(&playlist, track).await? {
                println!("Added to {playlist}");
            } else {
                println!("Already in {playlist}");
            }
        }
        Commands::RemoveTrack {
            playlist,
            id,
            media_url,
        } => {
            if id.is_empty() && media_url.is_empty() {
                bail!("Pass --id or --media-url to identify the track");
            }
            let playlist = PlaylistId::new(playlist);
            let track = Track::new(id, "", "").with_media_url(media_url);
            local.remove_track(&playlist, &track).await?;
            println!("Removed from {playlist}");
        }
        Commands::Sync => {
            let status = sync(&config, session, local).await?;
            println!("{status}");
        }
        Commands::Status => status(&config, session, local).await?,
    }

    Ok(())
}

async fn list(local: &LocalReplica) -> anyhow::Result<()> {
    let playlists = local.list().await?;
    if playlists.is_empty() {
        println!("No playlists");
        return Ok(());
    }

    for playlist in playlists {
        println!(
            "{}\t{}\t{} tracks",
            playlist.id,
            playlist.name,
            playlist.tracks.len()
        );
        for track in &playlist.tracks {
            println!("    {} - {}", track.artist, track.title);
        }
    }
    Ok(())
}

fn coordinator(
    config: &CliConfig,
    session: SessionContext,
    local: Arc<LocalReplica>,
) -> anyhow::Result<Option<SyncCoordinator>> {
    let Some(remote_config) = config.remote_config() else {
        return Ok(None);
    };
    let remote = RemoteReplica::new(remote_config)?;
    Ok(Some(SyncCoordinator::new(session, local, Arc::new(remote))))
}

async fn sync(
    config: &CliConfig,
    session: SessionContext,
    local: Arc<LocalReplica>,
) -> anyhow::Result<SyncStatus> {
    match coordinator(config, session, local)? {
        Some(coordinator) => Ok(coordinator.sync_now().await),
        None => {
            tracing::info!("No remote configured (set remote.base_url)");
            Ok(SyncStatus::offline("no remote configured"))
        }
    }
}

async fn status(
    config: &CliConfig,
    session: SessionContext,
    local: Arc<LocalReplica>,
) -> anyhow::Result<()> {
    let partition = local.current_partition().await?;
    println!("Account:   {partition}");
    println!(
        "Sync:      {}",
        if config.session().sync_enabled {
            "enabled"
        } else {
            "disabled"
        }
    );
    println!(
        "Remote:    {}",
        config
            .remote_config()
            .map_or_else(|| "(none)".to_string(), |remote| remote.url)
    );

    let last = match coordinator(config, session, local.clone())? {
        Some(coordinator) => coordinator.last_status().await?,
        None => local.last_sync_status::<SyncStatus>(&partition).await?,
    };
    match last {
        Some(status) => println!("Last sync: {status} (at {} ms)", status.at_ms),
        None => println!("Last sync: never"),
    }
    Ok(())
}

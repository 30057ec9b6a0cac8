//! Trip CLI - company trip mission tracker
//!
//! Main entry point for the trip command-line tool.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use trip::cli::{admin, report, team, token, TripContext};
use trip::storage::{FileKeyValueStore, SharedStore};

#[derive(Parser)]
#[command(name = "trip")]
#[command(about = "Trip - company trip mission tracker", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Storage file (overrides storage.path from the configuration)
    #[arg(long, global = true, env = "TRIP_STORAGE")]
    storage: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List teams and their progress
    Teams,

    /// Select the team reporting from this device
    Select {
        /// Team ID
        id: u32,
        /// Team password, when the team has one
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Lock this device to one team
    Lock {
        /// Team ID
        id: u32,
    },

    /// Remove the team lock
    Unlock,

    /// Submit a mission report
    Submit {
        /// Team ID (defaults to the selected team)
        #[arg(short, long)]
        team: Option<u32>,
        /// Completed mission number (repeatable)
        #[arg(short, long = "mission", required = true)]
        missions: Vec<usize>,
        /// Photo or video file (repeatable)
        #[arg(long = "media", required = true)]
        media: Vec<PathBuf>,
        /// Free-text comment
        #[arg(short, long)]
        comment: Option<String>,
    },

    /// List reports, merged with GitHub when available
    List {
        /// Only this team's reports
        #[arg(short, long)]
        team: Option<u32>,
    },

    /// Delete a local report by timestamp
    Delete {
        /// Report timestamp as shown by `trip list`
        timestamp: String,
    },

    /// Push reports that are not yet on GitHub
    Sync,

    /// Sync and refresh periodically until Ctrl+C
    Watch,

    /// Show the admin progress dashboard
    Dashboard {
        /// Admin password
        #[arg(short, long, env = "TRIP_ADMIN_PASSWORD")]
        password: String,
    },

    /// GitHub access token management
    #[command(subcommand)]
    Token(TokenCommands),
}

#[derive(Subcommand)]
enum TokenCommands {
    /// Save an access token
    Set {
        /// Personal access token (ghp_... or github_pat_...)
        token: String,
    },
    /// Check the token against GitHub
    Validate,
    /// Remove the saved token
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = trip::config::load_config().await?;
    if let Some(path) = cli.storage {
        config.storage.path = path.to_string_lossy().into_owned();
    }

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let kv: SharedStore = Arc::new(FileKeyValueStore::new(config.storage_path()));
    let ctx = TripContext::new(config, kv)?;

    match cli.command {
        Commands::Teams => team::handle_teams(&ctx).await?,
        Commands::Select { id, password } => team::handle_select(&ctx, id, password)?,
        Commands::Lock { id } => team::handle_lock(&ctx, id)?,
        Commands::Unlock => team::handle_unlock(&ctx)?,
        Commands::Submit {
            team,
            missions,
            media,
            comment,
        } => report::handle_submit(&ctx, team, missions, media, comment).await?,
        Commands::List { team } => report::handle_list(&ctx, team).await?,
        Commands::Delete { timestamp } => report::handle_delete(&ctx, &timestamp)?,
        Commands::Sync => report::handle_sync(&ctx).await?,
        Commands::Watch => report::handle_watch(&ctx).await?,
        Commands::Dashboard { password } => admin::handle_dashboard(&ctx, &password).await?,
        Commands::Token(cmd) => match cmd {
            TokenCommands::Set { token } => token::handle_set(&ctx, &token)?,
            TokenCommands::Validate => token::handle_validate(&ctx).await?,
            TokenCommands::Clear => token::handle_clear(&ctx)?,
        },
    }

    Ok(())
}

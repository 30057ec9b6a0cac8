//! # Trip - Company Trip Mission Tracker
//!
//! Teams on a company trip file mission reports (photos, completed
//! missions, a comment). Reports are saved locally first and mirrored to
//! GitHub Issues so every device sees every team's progress.
//!
//! ## Features
//!
//! - **Local-first storage** - Reports persist as a JSON array in a key/value file
//! - **GitHub Issues mirror** - Reports are pushed through a workflow dispatch and read back from labelled issues
//! - **Reconciliation** - Local and remote copies of one submission collapse into a single record
//! - **Sync queue** - Unsynced reports are retried with pacing between pushes
//! - **Background refresh** - Periodic sync-and-reload loop with graceful shutdown
//! - **Dual-Location Config** - User-level and project-level configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use trip::storage::{FileKeyValueStore, LocalReportStore};
//! use trip::reconcile::get_all_reports;
//!
//! # async fn example() -> trip::Result<()> {
//! let config = trip::config::load_config().await?;
//! let store = LocalReportStore::new(Arc::new(FileKeyValueStore::new(config.storage_path())));
//!
//! // Without a remote this is the local view, ordered by time
//! let reports = get_all_reports(&store, None, None).await;
//! println!("{} reports", reports.len());
//! # Ok(())
//! # }
//! ```

// Core modules
pub mod auth;
pub mod cli;
pub mod config;
pub mod media;
pub mod models;
pub mod progress;
pub mod reconcile;
pub mod remote;
pub mod retry;
pub mod scheduler;
pub mod session;
pub mod shutdown;
pub mod storage;
pub mod submission;
pub mod sync;

// Error types and utilities
mod error;

// Re-export key types for convenience
pub use models::{MediaItem, MissionRef, Report, SyncStatus, Team};
pub use reconcile::{get_all_reports, get_team_reports, merge_reports};
pub use remote::{GitHubClient, ReportRemote};
pub use scheduler::BackgroundSync;
pub use shutdown::ShutdownCoordinator;
pub use storage::{KeyValueStore, LocalReportStore};
pub use sync::{sync_pending, SyncSummary};

// Error types
pub use error::{Result, TripError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

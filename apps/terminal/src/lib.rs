//! # Haveli Terminal Library
//!
//! Core library for the Haveli POS billing terminal.
//!
//! ## Module Organization
//! ```text
//! haveli_terminal/
//! ├── lib.rs          ◄─── You are here (startup & wiring)
//! ├── session.rs      ◄─── Session state (cart + last sale)
//! ├── commands/
//! │   ├── mod.rs      ◄─── Command exports
//! │   ├── cart.rs     ◄─── Bill assembly commands
//! │   ├── sale.rs     ◄─── Finalize/void/receipt commands
//! │   ├── product.rs  ◄─── Inventory commands
//! │   ├── settings.rs ◄─── Shop profile commands
//! │   └── insights.rs ◄─── Analytics commands
//! ├── repl.rs         ◄─── Interactive command loop
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! Command handlers are plain async functions over the database handle and
//! the session state; the interactive loop and the integration tests drive
//! them identically.

pub mod commands;
pub mod error;
pub mod repl;
pub mod session;

use std::path::PathBuf;

use directories::ProjectDirs;
use tracing::info;
use tracing_subscriber::EnvFilter;

use haveli_db::{Database, DbConfig};
use session::SessionState;

/// Runs the billing terminal.
///
/// ## Startup Sequence
/// 1. Load `.env` (optional, development convenience)
/// 2. Initialize tracing (RUST_LOG respected, INFO default)
/// 3. Determine database path (HAVELI_DB_PATH override, else data dir)
/// 4. Connect to database & run migrations
/// 5. Enter the interactive command loop
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env is fine; environment variables still apply.
    let _ = dotenvy::dotenv();

    init_tracing();

    info!("Starting Haveli POS terminal");

    let db_path = get_database_path()?;
    info!(?db_path, "Database path determined");

    let db = Database::new(DbConfig::new(db_path)).await?;
    info!("Database connected and migrations applied");

    let session = SessionState::new();

    repl::run_loop(&db, &session).await?;

    db.close().await;
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=haveli=trace` - Show trace for haveli crates only
/// - Default: INFO level, sqlx chatter suppressed
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,haveli=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Determines the database file path.
///
/// ## Resolution Order
/// 1. `HAVELI_DB_PATH` environment variable
/// 2. Platform data directory (e.g. `~/.local/share/haveli-pos/haveli.db`)
fn get_database_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Ok(path) = std::env::var("HAVELI_DB_PATH") {
        return Ok(PathBuf::from(path));
    }

    let proj_dirs = ProjectDirs::from("com", "haveli", "pos")
        .ok_or("Could not determine app data directory")?;

    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)?;

    Ok(data_dir.join("haveli.db"))
}

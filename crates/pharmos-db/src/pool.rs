//! # Database Pool Management
//!
//! Connection pool creation and configuration for SQLite.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Connection Pool                           │
//! │                                                                         │
//! │  API Server Startup                                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbConfig::new(path) ← Configure pool settings                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await ← Create pool + run migrations            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │            SqlitePool                    │                           │
//! │  │  ┌─────┐ ┌─────┐ ┌─────┐ ┌─────┐       │                           │
//! │  │  │Conn1│ │Conn2│ │Conn3│ │Conn4│ ...   │  (max_connections)        │
//! │  │  └─────┘ └─────┘ └─────┘ └─────┘       │                           │
//! │  └─────────────────────────────────────────┘                           │
//! │       │                                                                 │
//! │       │ One connection per request, returned on every exit path        │
//! │       ▼                                                                 │
//! │  GET /api/items   ──► Conn1                                            │
//! │  POST /api/sales  ──► Conn2 (holds the write lock until commit)        │
//! │  POST /api/sales  ──► Conn3 (waits up to busy_timeout for the lock)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! Readers don't block the single writer and the writer doesn't block
//! readers. Concurrent writers queue on SQLite's write lock, bounded by
//! `busy_timeout`.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::item::ItemRepository;
use crate::repository::sale::SaleRepository;
use crate::repository::user::UserRepository;

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("./pharmos.db")
///     .max_connections(5)
///     .sale_timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// How long to wait for a free pooled connection.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// How long a connection waits on SQLite's write lock before failing.
    /// Default: 5 seconds
    pub busy_timeout: Duration,

    /// Upper bound on one whole sale transaction.
    /// Default: 10 seconds
    pub sale_timeout: Duration,

    /// Idle timeout before closing a connection. `None` keeps connections.
    /// Default: 10 minutes
    pub idle_timeout: Option<Duration>,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,

    in_memory: bool,
}

impl DbConfig {
    /// Creates a new database configuration with the given path.
    /// The file is created if it doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_secs(5),
            sale_timeout: Duration::from_secs(10),
            idle_timeout: Some(Duration::from_secs(600)),
            run_migrations: true,
            in_memory: false,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection acquire timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the SQLite busy timeout.
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Sets the bound on a whole sale transaction.
    pub fn sale_timeout(mut self, timeout: Duration) -> Self {
        self.sale_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// Every pooled connection to `:memory:` would open its own empty
    /// database, so the pool is pinned to one connection that never idles out.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            busy_timeout: Duration::from_secs(5),
            sale_timeout: Duration::from_secs(10),
            idle_timeout: None,
            run_migrations: true,
            in_memory: true,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.in_memory
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let base = if self.in_memory {
            SqliteConnectOptions::from_str("sqlite::memory:")
        } else {
            SqliteConnectOptions::from_str(&format!(
                "sqlite://{}?mode=rwc",
                self.database_path.display()
            ))
        }
        .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        Ok(base
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            // SQLite has foreign keys off by default
            .foreign_keys(true)
            .busy_timeout(self.busy_timeout)
            .create_if_missing(true))
    }
}

// =============================================================================
// Database
// =============================================================================

/// Main database handle providing repository access.
///
/// Cloning is cheap: the pool is reference counted. The API server keeps one
/// `Database` in its shared state and every handler asks it for the
/// repository it needs.
///
/// ```rust,ignore
/// async fn get_item(state: web::Data<AppState>, id: web::Path<String>) -> ApiResult<HttpResponse> {
///     let item = state.db.items().get(&id).await?;
///     Ok(HttpResponse::Ok().json(item))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    sale_timeout: Duration,
}

impl Database {
    /// Creates the pool, configures SQLite and runs migrations (if enabled).
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            in_memory = config.in_memory,
            "Initializing database connection"
        );

        let connect_options = config.connect_options()?;
        debug!("Connection options configured");

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(config.idle_timeout);
        if config.in_memory {
            pool_options = pool_options.max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        let db = Database {
            pool,
            sale_timeout: config.sale_timeout,
        };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Applies all pending migrations. Called by `new()` unless disabled.
    pub async fn run_migrations(&self) -> DbResult<()> {
        info!("Running database migrations");
        migrations::run_migrations(&self.pool).await?;
        info!("Migrations complete");
        Ok(())
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the item catalog repository.
    pub fn items(&self) -> ItemRepository {
        ItemRepository::new(self.pool.clone())
    }

    /// Returns the sale repository.
    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone(), self.sale_timeout)
    }

    /// Returns the user account repository.
    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    /// Closes the connection pool. Repository calls fail afterwards.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks if the database can execute queries.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

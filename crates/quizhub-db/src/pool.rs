//! Connection pool creation and configuration.

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use std::time::Duration;
use thiserror::Error;

/// Path that selects a private in-memory database.
const MEMORY_PATH: &str = ":memory:";

/// Runtime tunables for SQLite connection behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbRuntimeSettings {
    /// Busy timeout for SQLite connections, in milliseconds.
    pub busy_timeout_ms: u64,

    /// Maximum number of pooled SQLite connections.
    pub pool_max_size: u32,
}

impl Default for DbRuntimeSettings {
    fn default() -> Self {
        Self {
            busy_timeout_ms: 5_000,
            pool_max_size: 8,
        }
    }
}

/// A type alias for the SQLite connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Errors that can occur when creating the database pool.
#[derive(Debug, Error)]
pub enum PoolError {
    /// Failed to build the connection pool.
    #[error("failed to create database connection pool: {0}")]
    PoolInit(#[from] r2d2::Error),

    /// The configured pool size is zero.
    #[error("database pool size must be at least 1")]
    ZeroPoolSize,
}

/// Creates a new SQLite connection pool with WAL mode and foreign keys enabled.
///
/// Every in-memory connection is its own database, so a `:memory:` pool is
/// capped at a single connection regardless of `settings.pool_max_size`.
///
/// # Errors
///
/// Returns `PoolError::PoolInit` if the connection pool cannot be created,
/// or `PoolError::ZeroPoolSize` if `settings.pool_max_size` is zero.
pub fn create_pool(db_path: &str, settings: DbRuntimeSettings) -> Result<DbPool, PoolError> {
    if settings.pool_max_size == 0 {
        return Err(PoolError::ZeroPoolSize);
    }

    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;

    let manager = SqliteConnectionManager::file(db_path)
        .with_flags(flags)
        .with_init(move |conn| {
            // Set before the WAL switch, which needs an exclusive lock while
            // sibling connections may still be opening.
            conn.busy_timeout(Duration::from_millis(settings.busy_timeout_ms))?;

            // In-memory databases report "memory" instead of "wal".
            let journal_mode: String =
                conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;
            if journal_mode != "wal" && journal_mode != "memory" {
                return Err(rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
                    Some(format!(
                        "failed to set WAL journal mode, got: {}",
                        journal_mode
                    )),
                ));
            }
            conn.execute_batch("PRAGMA foreign_keys = ON;")
        });

    let in_memory = db_path == MEMORY_PATH;
    let max_size = if in_memory {
        if settings.pool_max_size > 1 {
            tracing::debug!(
                requested = settings.pool_max_size,
                "in-memory database, limiting pool to one connection"
            );
        }
        1
    } else {
        settings.pool_max_size
    };

    let mut builder = Pool::builder().max_size(max_size);
    if in_memory {
        // A reaped connection takes the whole database with it.
        builder = builder.idle_timeout(None).max_lifetime(None);
    }
    let pool = builder.build(manager)?;

    tracing::debug!(path = db_path, max_size, "database pool ready");

    Ok(pool)
}

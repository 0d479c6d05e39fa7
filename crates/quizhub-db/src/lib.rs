//! Database layer for the QuizHub forms service.
//!
//! Provides SQLite connection pooling (via `r2d2`), WAL-mode initialization
//! and embedded SQL migrations. The `forms` and `questions` tables are
//! created exclusively through the versioned migrations in this crate.
//!
//! A request handler checks out one pooled connection, does its work inside
//! a transaction where it writes, and hands the connection back on drop.

mod migrations;
mod pool;

pub use migrations::{run_migrations, MigrationError};
pub use pool::{create_pool, DbPool, DbRuntimeSettings, PoolError};

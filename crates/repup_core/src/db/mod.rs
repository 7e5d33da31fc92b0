//! SQLite storage bootstrap, pooling and schema migration entry points.
//!
//! # Responsibility
//! - Build the bounded connection pool shared by every store.
//! - Apply schema migrations in deterministic order.
//! - Provide the scoped transaction used by multi-step store operations.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Every pooled connection has `foreign_keys=ON`.
//! - Stores never read/write application data before migrations succeed.

use r2d2_sqlite::SqliteConnectionManager;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;
mod tx;

pub use open::{open_pool, open_pool_in_memory, ping};
pub use tx::{in_transaction, TxMode};

/// Shared handle to the storage backend. Cloning is cheap (`Arc` inside).
pub type DbPool = r2d2::Pool<SqliteConnectionManager>;

/// One connection checked out of [`DbPool`]; returned to the pool on drop.
pub type PooledConn = r2d2::PooledConnection<SqliteConnectionManager>;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// Pool construction failed or no connection became available in time.
    Pool(r2d2::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Pool(err) => write!(f, "connection pool error: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Pool(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<r2d2::Error> for DbError {
    fn from(value: r2d2::Error) -> Self {
        Self::Pool(value)
    }
}

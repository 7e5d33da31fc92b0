//! Connection pool bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Build file-backed or in-memory connection pools.
//! - Configure per-connection pragmas required by store behavior.
//! - Trigger schema migrations before returning a usable pool.
//!
//! # Invariants
//! - Pooled connections have `foreign_keys=ON` and a busy timeout.
//! - Returned pools have passed a liveness probe and have migrations applied.

use super::migrations::apply_migrations;
use super::{DbPool, DbResult};
use crate::config::DbConfig;
use log::{error, info};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const IN_MEMORY_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens a pool over the configured SQLite file and applies pending migrations.
///
/// # Side effects
/// - Eagerly opens `min_idle` connections, bounded by the acquire timeout.
/// - Emits `db_open` logging events with duration and status.
pub fn open_pool(config: &DbConfig) -> DbResult<DbPool> {
    let started_at = Instant::now();
    info!(
        "event=db_open module=db status=start mode=file max_connections={} min_idle={}",
        config.max_connections,
        config.effective_min_idle()
    );

    let manager =
        SqliteConnectionManager::file(&config.database_path).with_init(init_connection);
    let built = r2d2::Pool::builder()
        .max_size(config.max_connections)
        .min_idle(Some(config.effective_min_idle()))
        .idle_timeout(config.idle_timeout())
        .max_lifetime(config.max_lifetime())
        .connection_timeout(config.acquire_timeout())
        .build(manager);

    let pool = match built {
        Ok(pool) => pool,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode=file duration_ms={} error_code=pool_build_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    finish_open(pool, "file", config.acquire_timeout(), started_at)
}

/// Opens a single-connection pool over a private in-memory database.
///
/// The pool never recycles its connection, so data lives as long as the pool.
pub fn open_pool_in_memory() -> DbResult<DbPool> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=memory");

    let manager = SqliteConnectionManager::memory().with_init(init_connection);
    let built = r2d2::Pool::builder()
        .max_size(1)
        .min_idle(Some(1))
        .idle_timeout(None)
        .max_lifetime(None)
        .connection_timeout(IN_MEMORY_ACQUIRE_TIMEOUT)
        .build(manager);

    let pool = match built {
        Ok(pool) => pool,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode=memory duration_ms={} error_code=pool_build_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    finish_open(pool, "memory", IN_MEMORY_ACQUIRE_TIMEOUT, started_at)
}

/// Checks that a connection can be acquired and answers a trivial query.
pub fn ping(pool: &DbPool) -> DbResult<()> {
    let conn = pool.get()?;
    probe(&conn)
}

fn finish_open(
    pool: DbPool,
    mode: &str,
    acquire_timeout: Duration,
    started_at: Instant,
) -> DbResult<DbPool> {
    match bootstrap_pool(&pool, acquire_timeout) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={} duration_ms={}",
                mode,
                started_at.elapsed().as_millis()
            );
            Ok(pool)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_bootstrap_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_pool(pool: &DbPool, acquire_timeout: Duration) -> DbResult<()> {
    let mut conn = pool.get_timeout(acquire_timeout)?;
    probe(&conn)?;
    apply_migrations(&mut conn)?;
    Ok(())
}

fn init_connection(conn: &mut Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    Ok(())
}

fn probe(conn: &Connection) -> DbResult<()> {
    conn.query_row("SELECT 1;", [], |row| row.get::<_, i64>(0))?;
    Ok(())
}

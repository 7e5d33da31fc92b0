//! Scoped transactions over pooled connections.
//!
//! # Invariants
//! - The connection is checked out for exactly the lifetime of the transaction
//!   and goes back to the pool on every exit path.
//! - A transaction is committed at most once, and only when every step succeeded.
//! - Any step error, commit error or unwinding panic leaves the database as it
//!   was before the transaction started.

use super::{DbError, DbPool};
use log::{debug, warn};
use rusqlite::{Transaction, TransactionBehavior};
use std::fmt::Display;
use std::time::Instant;

/// Locking mode for a scoped transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxMode {
    /// Deferred: takes a shared lock on first read.
    Read,
    /// Immediate: takes the write lock up front, so guard checks and the
    /// mutations that follow observe the same state.
    Write,
}

impl TxMode {
    fn behavior(self) -> TransactionBehavior {
        match self {
            Self::Read => TransactionBehavior::Deferred,
            Self::Write => TransactionBehavior::Immediate,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

/// Runs `steps` inside one transaction on a freshly acquired pooled connection.
///
/// Commits when `steps` returns `Ok`; otherwise rolls back and returns the
/// step error unchanged. Failed transactions are never retried.
pub fn in_transaction<T, E, F>(
    pool: &DbPool,
    mode: TxMode,
    operation: &'static str,
    steps: F,
) -> Result<T, E>
where
    F: FnOnce(&Transaction<'_>) -> Result<T, E>,
    E: From<DbError> + Display,
{
    let started_at = Instant::now();
    let mut conn = pool.get().map_err(DbError::from)?;
    let tx = conn
        .transaction_with_behavior(mode.behavior())
        .map_err(DbError::from)?;

    match steps(&tx) {
        Ok(value) => {
            tx.commit().map_err(DbError::from)?;
            debug!(
                "event=tx_commit module=db status=ok operation={} mode={} duration_ms={}",
                operation,
                mode.as_str(),
                started_at.elapsed().as_millis()
            );
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback() {
                warn!(
                    "event=tx_rollback module=db status=error operation={} error_code=rollback_failed error={}",
                    operation, rollback_err
                );
            }
            debug!(
                "event=tx_rollback module=db status=ok operation={} mode={} duration_ms={} cause={}",
                operation,
                mode.as_str(),
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

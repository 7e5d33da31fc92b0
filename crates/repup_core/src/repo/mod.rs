//! Store layer: repository contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts per entity.
//! - Keep SQL, transaction scoping and guard checks inside the core boundary.
//! - Translate storage outcomes into one shared error vocabulary.
//!
//! # Invariants
//! - Local validation runs before a connection is acquired.
//! - Every multi-statement write runs in one scoped transaction.
//! - Schema constraints back every existence/uniqueness pre-check.

use crate::db::{DbError, DbPool, PooledConn};
use crate::model::{Entity, RecordId, ValidationError};
use rusqlite::ffi;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod body_part_repo;
pub mod exercise_repo;
pub mod guard;
pub mod user_repo;
pub mod workout_exercise_repo;
pub mod workout_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Outcome kinds shared by every store and by outer layers mapping them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    DuplicateRecord,
    ReferentialIntegrity,
    /// Connection loss, unclassified constraint failures, corrupt rows.
    Storage,
}

impl ErrorKind {
    /// Stable snake_case code used in log events.
    pub fn code(self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::NotFound => "not_found",
            Self::DuplicateRecord => "duplicate_record",
            Self::ReferentialIntegrity => "referential_integrity",
            Self::Storage => "storage",
        }
    }
}

/// Store error for every persistence and query operation.
#[derive(Debug)]
pub enum RepoError {
    InvalidInput(ValidationError),
    NotFound { entity: Entity, id: RecordId },
    /// A uniqueness constraint would be violated.
    DuplicateRecord(String),
    /// A delete would orphan dependent rows.
    ReferentialIntegrity(String),
    /// Persisted row cannot be mapped back to a valid record.
    InvalidData(String),
    Db(DbError),
}

impl RepoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::DuplicateRecord(_) => ErrorKind::DuplicateRecord,
            Self::ReferentialIntegrity(_) => ErrorKind::ReferentialIntegrity,
            Self::InvalidData(_) | Self::Db(_) => ErrorKind::Storage,
        }
    }

    pub(crate) fn not_found(entity: Entity, id: RecordId) -> Self {
        Self::NotFound { entity, id }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(err) => write!(f, "invalid input: {err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::DuplicateRecord(message) => write!(f, "duplicate record: {message}"),
            Self::ReferentialIntegrity(message) => {
                write!(f, "referential integrity violation: {message}")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidInput(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. }
            | Self::DuplicateRecord(_)
            | Self::ReferentialIntegrity(_)
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::InvalidInput(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::Sqlite(err) => classify_sqlite_error(err),
            other => Self::Db(other),
        }
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        classify_sqlite_error(value)
    }
}

/// Maps constraint failures that slipped past a pre-check onto semantic kinds.
fn classify_sqlite_error(err: rusqlite::Error) -> RepoError {
    if let rusqlite::Error::FromSqlConversionFailure(..) | rusqlite::Error::InvalidColumnType(..) =
        &err
    {
        return RepoError::InvalidData(err.to_string());
    }
    if let rusqlite::Error::SqliteFailure(failure, message) = &err {
        let detail = message
            .clone()
            .unwrap_or_else(|| failure.to_string());
        match failure.extended_code {
            ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                return RepoError::DuplicateRecord(detail);
            }
            ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                return RepoError::ReferentialIntegrity(detail);
            }
            _ => {}
        }
    }
    RepoError::Db(DbError::Sqlite(err))
}

/// Checks out one pooled connection for a single-statement operation.
pub(crate) fn checkout(pool: &DbPool) -> RepoResult<PooledConn> {
    pool.get().map_err(|err| RepoError::Db(DbError::Pool(err)))
}

#[cfg(test)]
mod tests {
    use super::{ErrorKind, RepoError};
    use crate::db::open_pool_in_memory;
    use crate::model::{Entity, ValidationError};

    #[test]
    fn unique_violation_is_classified_as_duplicate() {
        let pool = open_pool_in_memory().unwrap();
        let conn = pool.get().unwrap();
        conn.execute("INSERT INTO body_parts (name) VALUES ('Chest');", [])
            .unwrap();
        let err: RepoError = conn
            .execute("INSERT INTO body_parts (name) VALUES ('Chest');", [])
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), ErrorKind::DuplicateRecord);
    }

    #[test]
    fn foreign_key_violation_is_classified_as_referential_integrity() {
        let pool = open_pool_in_memory().unwrap();
        let conn = pool.get().unwrap();
        let err: RepoError = conn
            .execute(
                "INSERT INTO exercises (name, description, body_part_id) VALUES ('Row', '', 42);",
                [],
            )
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), ErrorKind::ReferentialIntegrity);
    }

    #[test]
    fn other_failures_are_storage_errors() {
        let pool = open_pool_in_memory().unwrap();
        let conn = pool.get().unwrap();
        let err: RepoError = conn
            .execute_batch("SELECT * FROM no_such_table;")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert_eq!(err.kind().code(), "storage");
    }

    #[test]
    fn unreadable_rows_are_invalid_data() {
        let pool = open_pool_in_memory().unwrap();
        let conn = pool.get().unwrap();
        let err: RepoError = conn
            .query_row("SELECT 'not a date';", [], |row| {
                row.get::<_, chrono::NaiveDate>(0)
            })
            .unwrap_err()
            .into();
        assert!(matches!(err, RepoError::InvalidData(_)));
        assert_eq!(err.kind(), ErrorKind::Storage);
    }

    #[test]
    fn display_names_the_entity() {
        let err = RepoError::not_found(Entity::Workout, 12);
        assert_eq!(err.to_string(), "workout not found: 12");
        let err = RepoError::from(ValidationError::EmptyField("name"));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}

//! User store contracts and SQLite implementation.
//!
//! # Invariants
//! - `(oauth_provider, oauth_id)` identifies at most one user.
//! - Upserts never change a user's provider identity, only profile fields.

use super::{checkout, RepoError, RepoResult};
use crate::db::{in_transaction, DbPool, TxMode};
use crate::model::user::User;
use crate::model::{validate_id, Entity, RecordId};
use log::info;
use rusqlite::{params, OptionalExtension, Row};

const USER_SELECT_SQL: &str = "SELECT
    id,
    email,
    name,
    oauth_provider,
    oauth_id,
    created_at,
    updated_at
FROM users";

/// Which branch an upsert took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// Repository interface for user operations.
pub trait UserRepository {
    fn get_by_id(&self, id: RecordId) -> RepoResult<User>;
    /// Looks a user up by external identity. Absence is `Ok(None)`.
    fn get_by_oauth(&self, provider: &str, oauth_id: &str) -> RepoResult<Option<User>>;
    /// Inserts a new user or refreshes email/name of the one with the same
    /// external identity. Writes id and timestamps back onto `user`.
    fn create_or_update(&self, user: &mut User) -> RepoResult<UpsertOutcome>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'pool> {
    pool: &'pool DbPool,
}

impl<'pool> SqliteUserRepository<'pool> {
    pub fn new(pool: &'pool DbPool) -> Self {
        Self { pool }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn get_by_id(&self, id: RecordId) -> RepoResult<User> {
        validate_id("id", id)?;
        let conn = checkout(self.pool)?;
        conn.query_row(
            &format!("{USER_SELECT_SQL} WHERE id = ?1;"),
            [id],
            parse_user_row,
        )
        .optional()?
        .ok_or_else(|| RepoError::not_found(Entity::User, id))
    }

    fn get_by_oauth(&self, provider: &str, oauth_id: &str) -> RepoResult<Option<User>> {
        let conn = checkout(self.pool)?;
        let user = conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE oauth_provider = ?1 AND oauth_id = ?2;"),
                params![provider, oauth_id],
                parse_user_row,
            )
            .optional()?;
        Ok(user)
    }

    fn create_or_update(&self, user: &mut User) -> RepoResult<UpsertOutcome> {
        user.validate()?;

        let (outcome, id, created_at, updated_at) =
            in_transaction(self.pool, TxMode::Write, "user_upsert", |tx| {
                let existing: Option<RecordId> = tx
                    .query_row(
                        "SELECT id FROM users WHERE oauth_provider = ?1 AND oauth_id = ?2;",
                        params![user.oauth_provider.as_str(), user.oauth_id.as_str()],
                        |row| row.get(0),
                    )
                    .optional()?;

                let (outcome, (id, created_at, updated_at)) = match existing {
                    Some(id) => {
                        let generated = tx.query_row(
                            "UPDATE users
                             SET email = ?1, name = ?2, updated_at = (strftime('%s', 'now') * 1000)
                             WHERE id = ?3
                             RETURNING id, created_at, updated_at;",
                            params![user.email.as_str(), user.name.as_str(), id],
                            read_generated,
                        )?;
                        (UpsertOutcome::Updated, generated)
                    }
                    None => {
                        let generated = tx.query_row(
                            "INSERT INTO users (email, name, oauth_provider, oauth_id)
                             VALUES (?1, ?2, ?3, ?4)
                             RETURNING id, created_at, updated_at;",
                            params![
                                user.email.as_str(),
                                user.name.as_str(),
                                user.oauth_provider.as_str(),
                                user.oauth_id.as_str(),
                            ],
                            read_generated,
                        )?;
                        (UpsertOutcome::Created, generated)
                    }
                };
                Ok::<_, RepoError>((outcome, id, created_at, updated_at))
            })?;

        user.id = id;
        user.created_at = created_at;
        user.updated_at = updated_at;
        info!(
            "event=user_upsert module=repo status=ok id={} outcome={:?}",
            id, outcome
        );
        Ok(outcome)
    }
}

fn read_generated(row: &Row<'_>) -> rusqlite::Result<(RecordId, i64, i64)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
}

fn parse_user_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        email: row.get("email")?,
        name: row.get("name")?,
        oauth_provider: row.get("oauth_provider")?,
        oauth_id: row.get("oauth_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

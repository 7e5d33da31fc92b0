//! Body part store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over `body_parts` with name uniqueness.
//! - Refuse deletion while any exercise is filed under the body part.
//!
//! # Invariants
//! - Names are unique by exact, case-sensitive match; the `UNIQUE` column
//!   constraint is the final authority behind the pre-check.
//! - Listings are ordered by name ascending.

use super::guard::{ensure_no_dependents, Dependents};
use super::{checkout, RepoError, RepoResult};
use crate::db::{in_transaction, DbPool, TxMode};
use crate::model::body_part::BodyPart;
use crate::model::{validate_id, Entity, RecordId};
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row};

const BODY_PART_SELECT_SQL: &str = "SELECT id, name, created_at, updated_at FROM body_parts";

/// Repository interface for body part operations.
pub trait BodyPartRepository {
    fn get_by_id(&self, id: RecordId) -> RepoResult<BodyPart>;
    /// Returns every body part ordered by name. Empty is not an error.
    fn get_all(&self) -> RepoResult<Vec<BodyPart>>;
    /// Inserts a new body part and writes generated fields back onto it.
    fn create(&self, body_part: &mut BodyPart) -> RepoResult<()>;
    /// Renames an existing body part and refreshes `updated_at` on it.
    fn update(&self, body_part: &mut BodyPart) -> RepoResult<()>;
    fn delete(&self, id: RecordId) -> RepoResult<()>;
}

/// SQLite-backed body part repository.
pub struct SqliteBodyPartRepository<'pool> {
    pool: &'pool DbPool,
}

impl<'pool> SqliteBodyPartRepository<'pool> {
    pub fn new(pool: &'pool DbPool) -> Self {
        Self { pool }
    }
}

impl BodyPartRepository for SqliteBodyPartRepository<'_> {
    fn get_by_id(&self, id: RecordId) -> RepoResult<BodyPart> {
        validate_id("id", id)?;
        let conn = checkout(self.pool)?;
        load_body_part(&conn, id)?.ok_or_else(|| RepoError::not_found(Entity::BodyPart, id))
    }

    fn get_all(&self) -> RepoResult<Vec<BodyPart>> {
        let conn = checkout(self.pool)?;
        let mut stmt = conn.prepare(&format!(
            "{BODY_PART_SELECT_SQL} ORDER BY name ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut body_parts = Vec::new();
        while let Some(row) = rows.next()? {
            body_parts.push(parse_body_part_row(row)?);
        }
        Ok(body_parts)
    }

    fn create(&self, body_part: &mut BodyPart) -> RepoResult<()> {
        body_part.validate_new()?;

        let (id, created_at, updated_at) =
            in_transaction(self.pool, TxMode::Write, "body_part_create", |tx| {
                if name_taken(tx, &body_part.name, None)? {
                    return Err(duplicate_name());
                }
                let generated = tx.query_row(
                    "INSERT INTO body_parts (name) VALUES (?1)
                     RETURNING id, created_at, updated_at;",
                    [body_part.name.as_str()],
                    |row| {
                        Ok((
                            row.get::<_, RecordId>(0)?,
                            row.get::<_, i64>(1)?,
                            row.get::<_, i64>(2)?,
                        ))
                    },
                )?;
                Ok(generated)
            })?;

        body_part.id = id;
        body_part.created_at = created_at;
        body_part.updated_at = updated_at;
        Ok(())
    }

    fn update(&self, body_part: &mut BodyPart) -> RepoResult<()> {
        body_part.validate_existing()?;

        let updated_at = in_transaction(self.pool, TxMode::Write, "body_part_update", |tx| {
            if name_taken(tx, &body_part.name, Some(body_part.id))? {
                return Err(duplicate_name());
            }
            tx.query_row(
                "UPDATE body_parts
                 SET name = ?1, updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?2
                 RETURNING updated_at;",
                params![body_part.name.as_str(), body_part.id],
                |row| row.get::<_, i64>(0),
            )
            .optional()?
            .ok_or_else(|| RepoError::not_found(Entity::BodyPart, body_part.id))
        })?;

        body_part.updated_at = updated_at;
        Ok(())
    }

    fn delete(&self, id: RecordId) -> RepoResult<()> {
        validate_id("id", id)?;

        in_transaction(self.pool, TxMode::Write, "body_part_delete", |tx| {
            ensure_no_dependents(tx, Dependents::ExercisesOfBodyPart, id)?;
            let changed = tx.execute("DELETE FROM body_parts WHERE id = ?1;", [id])?;
            if changed == 0 {
                return Err(RepoError::not_found(Entity::BodyPart, id));
            }
            Ok(())
        })?;

        info!("event=body_part_delete module=repo status=ok id={id}");
        Ok(())
    }
}

fn load_body_part(conn: &Connection, id: RecordId) -> RepoResult<Option<BodyPart>> {
    let mut stmt = conn.prepare(&format!("{BODY_PART_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_body_part_row(row)?));
    }
    Ok(None)
}

fn name_taken(conn: &Connection, name: &str, except_id: Option<RecordId>) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM body_parts
            WHERE name = ?1
              AND (?2 IS NULL OR id != ?2)
        );",
        params![name, except_id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn duplicate_name() -> RepoError {
    RepoError::DuplicateRecord("body part name already exists".to_string())
}

fn parse_body_part_row(row: &Row<'_>) -> RepoResult<BodyPart> {
    Ok(BodyPart {
        id: row.get("id")?,
        name: row.get("name")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

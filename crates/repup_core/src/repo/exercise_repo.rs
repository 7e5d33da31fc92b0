//! Exercise store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over `exercises` and listing by body part.
//! - Refuse deletion while any workout entry references the exercise.
//!
//! # Invariants
//! - `body_part_id` references an existing body part whenever a row is written.
//! - Names are not unique.
//! - Listings are ordered by name ascending.

use super::guard::{ensure_no_dependents, ensure_references_exist, Dependents};
use super::{checkout, RepoError, RepoResult};
use crate::db::{in_transaction, DbPool, TxMode};
use crate::model::exercise::Exercise;
use crate::model::{validate_id, Entity, RecordId};
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row};

const EXERCISE_SELECT_SQL: &str = "SELECT
    id,
    name,
    description,
    body_part_id,
    created_at,
    updated_at
FROM exercises";

/// Repository interface for exercise operations.
pub trait ExerciseRepository {
    fn get_by_id(&self, id: RecordId) -> RepoResult<Exercise>;
    fn get_all(&self) -> RepoResult<Vec<Exercise>>;
    /// Lists exercises filed under one body part, ordered by name.
    fn get_by_body_part(&self, body_part_id: RecordId) -> RepoResult<Vec<Exercise>>;
    fn create(&self, exercise: &mut Exercise) -> RepoResult<()>;
    fn update(&self, exercise: &mut Exercise) -> RepoResult<()>;
    fn delete(&self, id: RecordId) -> RepoResult<()>;
}

/// SQLite-backed exercise repository.
pub struct SqliteExerciseRepository<'pool> {
    pool: &'pool DbPool,
}

impl<'pool> SqliteExerciseRepository<'pool> {
    pub fn new(pool: &'pool DbPool) -> Self {
        Self { pool }
    }
}

impl ExerciseRepository for SqliteExerciseRepository<'_> {
    fn get_by_id(&self, id: RecordId) -> RepoResult<Exercise> {
        validate_id("id", id)?;
        let conn = checkout(self.pool)?;
        let mut stmt = conn.prepare(&format!("{EXERCISE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return parse_exercise_row(row);
        }
        Err(RepoError::not_found(Entity::Exercise, id))
    }

    fn get_all(&self) -> RepoResult<Vec<Exercise>> {
        let conn = checkout(self.pool)?;
        query_exercises(
            &conn,
            &format!("{EXERCISE_SELECT_SQL} ORDER BY name ASC, id ASC;"),
            None,
        )
    }

    fn get_by_body_part(&self, body_part_id: RecordId) -> RepoResult<Vec<Exercise>> {
        validate_id("body_part_id", body_part_id)?;
        let conn = checkout(self.pool)?;
        query_exercises(
            &conn,
            &format!("{EXERCISE_SELECT_SQL} WHERE body_part_id = ?1 ORDER BY name ASC, id ASC;"),
            Some(body_part_id),
        )
    }

    fn create(&self, exercise: &mut Exercise) -> RepoResult<()> {
        exercise.validate_new()?;

        let (id, created_at, updated_at) =
            in_transaction(self.pool, TxMode::Write, "exercise_create", |tx| {
                ensure_references_exist(tx, Entity::BodyPart, [exercise.body_part_id])?;
                let generated = tx.query_row(
                    "INSERT INTO exercises (name, description, body_part_id)
                     VALUES (?1, ?2, ?3)
                     RETURNING id, created_at, updated_at;",
                    params![
                        exercise.name.as_str(),
                        exercise.description.as_str(),
                        exercise.body_part_id,
                    ],
                    |row| {
                        Ok((
                            row.get::<_, RecordId>(0)?,
                            row.get::<_, i64>(1)?,
                            row.get::<_, i64>(2)?,
                        ))
                    },
                )?;
                Ok::<_, RepoError>(generated)
            })?;

        exercise.id = id;
        exercise.created_at = created_at;
        exercise.updated_at = updated_at;
        Ok(())
    }

    fn update(&self, exercise: &mut Exercise) -> RepoResult<()> {
        exercise.validate_existing()?;

        let updated_at = in_transaction(self.pool, TxMode::Write, "exercise_update", |tx| {
            ensure_references_exist(tx, Entity::BodyPart, [exercise.body_part_id])?;
            tx.query_row(
                "UPDATE exercises
                 SET
                    name = ?1,
                    description = ?2,
                    body_part_id = ?3,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?4
                 RETURNING updated_at;",
                params![
                    exercise.name.as_str(),
                    exercise.description.as_str(),
                    exercise.body_part_id,
                    exercise.id,
                ],
                |row| row.get::<_, i64>(0),
            )
            .optional()?
            .ok_or_else(|| RepoError::not_found(Entity::Exercise, exercise.id))
        })?;

        exercise.updated_at = updated_at;
        Ok(())
    }

    fn delete(&self, id: RecordId) -> RepoResult<()> {
        validate_id("id", id)?;

        in_transaction(self.pool, TxMode::Write, "exercise_delete", |tx| {
            ensure_no_dependents(tx, Dependents::EntriesOfExercise, id)?;
            let changed = tx.execute("DELETE FROM exercises WHERE id = ?1;", [id])?;
            if changed == 0 {
                return Err(RepoError::not_found(Entity::Exercise, id));
            }
            Ok(())
        })?;

        info!("event=exercise_delete module=repo status=ok id={id}");
        Ok(())
    }
}

fn query_exercises(
    conn: &Connection,
    sql: &str,
    body_part_id: Option<RecordId>,
) -> RepoResult<Vec<Exercise>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = match body_part_id {
        Some(id) => stmt.query([id])?,
        None => stmt.query([])?,
    };
    let mut exercises = Vec::new();
    while let Some(row) = rows.next()? {
        exercises.push(parse_exercise_row(row)?);
    }
    Ok(exercises)
}

fn parse_exercise_row(row: &Row<'_>) -> RepoResult<Exercise> {
    Ok(Exercise {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        body_part_id: row.get("body_part_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

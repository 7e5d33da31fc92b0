//! Workout aggregate store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Read and write a workout header and its entry list as one unit.
//! - Own the full-replace strategy for entry lists on update.
//!
//! # Invariants
//! - Every aggregate read and write runs in exactly one scoped transaction;
//!   no partial aggregate is ever returned or persisted.
//! - Entry references are checked before the first mutation.
//! - Generated ids are written back onto the caller's record only after commit.
//! - Entries are returned in ascending id order; list views carry no entries.

use super::guard::ensure_references_exist;
use super::{checkout, RepoError, RepoResult};
use crate::db::{in_transaction, DbPool, TxMode};
use crate::model::workout::{Workout, WorkoutExercise};
use crate::model::{validate_id, Entity, RecordId};
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row};

const WORKOUT_SELECT_SQL: &str = "SELECT id, user_id, name, date, notes FROM workouts";

const ENTRY_SELECT_SQL: &str = "SELECT
    id,
    workout_id,
    exercise_id,
    sets,
    reps,
    weight,
    notes,
    created_at,
    updated_at
FROM workout_exercises";

/// Repository interface for workout aggregate operations.
pub trait WorkoutRepository {
    /// Loads one workout with all of its entries.
    fn get_by_id(&self, id: RecordId) -> RepoResult<Workout>;
    /// Lists a user's workout headers, most recent date first.
    fn get_all_for_user(&self, user_id: RecordId) -> RepoResult<Vec<Workout>>;
    /// Inserts header and entries atomically; stamps generated ids on success.
    fn create(&self, workout: &mut Workout) -> RepoResult<()>;
    /// Updates the header and replaces the whole entry list atomically.
    fn update(&self, workout: &mut Workout) -> RepoResult<()>;
    /// Deletes the header together with all of its entries.
    fn delete(&self, id: RecordId) -> RepoResult<()>;
}

/// SQLite-backed workout aggregate repository.
pub struct SqliteWorkoutRepository<'pool> {
    pool: &'pool DbPool,
}

impl<'pool> SqliteWorkoutRepository<'pool> {
    pub fn new(pool: &'pool DbPool) -> Self {
        Self { pool }
    }
}

/// Storage-assigned fields of one inserted entry.
#[derive(Debug, Clone, Copy)]
struct InsertedEntry {
    id: RecordId,
    created_at: i64,
    updated_at: i64,
}

impl WorkoutRepository for SqliteWorkoutRepository<'_> {
    fn get_by_id(&self, id: RecordId) -> RepoResult<Workout> {
        validate_id("id", id)?;

        in_transaction(self.pool, TxMode::Read, "workout_get", |tx| {
            let mut workout = tx
                .query_row(
                    &format!("{WORKOUT_SELECT_SQL} WHERE id = ?1;"),
                    [id],
                    parse_workout_row,
                )
                .optional()?
                .ok_or_else(|| RepoError::not_found(Entity::Workout, id))?;
            workout.details = load_entries(tx, id)?;
            Ok(workout)
        })
    }

    fn get_all_for_user(&self, user_id: RecordId) -> RepoResult<Vec<Workout>> {
        validate_id("user_id", user_id)?;

        let conn = checkout(self.pool)?;
        let mut stmt = conn.prepare(&format!(
            "{WORKOUT_SELECT_SQL} WHERE user_id = ?1 ORDER BY date DESC, id DESC;"
        ))?;
        let mut rows = stmt.query([user_id])?;
        let mut workouts = Vec::new();
        while let Some(row) = rows.next()? {
            workouts.push(parse_workout_row(row)?);
        }
        Ok(workouts)
    }

    fn create(&self, workout: &mut Workout) -> RepoResult<()> {
        workout.validate_new()?;

        let (workout_id, inserted) =
            in_transaction(self.pool, TxMode::Write, "workout_create", |tx| {
                ensure_references_exist(tx, Entity::Exercise, workout.referenced_exercise_ids())?;
                let workout_id: RecordId = tx.query_row(
                    "INSERT INTO workouts (user_id, name, date, notes)
                     VALUES (?1, ?2, ?3, ?4)
                     RETURNING id;",
                    params![
                        workout.user_id,
                        workout.name.as_str(),
                        workout.date,
                        workout.notes.as_str(),
                    ],
                    |row| row.get(0),
                )?;
                let inserted = insert_entries(tx, workout_id, &workout.details)?;
                Ok::<_, RepoError>((workout_id, inserted))
            })?;

        workout.id = workout_id;
        stamp_entries(workout, &inserted);
        info!(
            "event=workout_create module=repo status=ok id={} entry_count={}",
            workout_id,
            inserted.len()
        );
        Ok(())
    }

    fn update(&self, workout: &mut Workout) -> RepoResult<()> {
        workout.validate_existing()?;

        let inserted = in_transaction(self.pool, TxMode::Write, "workout_update", |tx| {
            ensure_references_exist(tx, Entity::Exercise, workout.referenced_exercise_ids())?;
            let changed = tx.execute(
                "UPDATE workouts
                 SET user_id = ?1, name = ?2, date = ?3, notes = ?4
                 WHERE id = ?5;",
                params![
                    workout.user_id,
                    workout.name.as_str(),
                    workout.date,
                    workout.notes.as_str(),
                    workout.id,
                ],
            )?;
            if changed == 0 {
                return Err(RepoError::not_found(Entity::Workout, workout.id));
            }

            tx.execute(
                "DELETE FROM workout_exercises WHERE workout_id = ?1;",
                [workout.id],
            )?;
            insert_entries(tx, workout.id, &workout.details)
        })?;

        stamp_entries(workout, &inserted);
        info!(
            "event=workout_update module=repo status=ok id={} entry_count={}",
            workout.id,
            inserted.len()
        );
        Ok(())
    }

    fn delete(&self, id: RecordId) -> RepoResult<()> {
        validate_id("id", id)?;

        let removed_entries = in_transaction(self.pool, TxMode::Write, "workout_delete", |tx| {
            let removed = tx.execute("DELETE FROM workout_exercises WHERE workout_id = ?1;", [id])?;
            let changed = tx.execute("DELETE FROM workouts WHERE id = ?1;", [id])?;
            if changed == 0 {
                return Err(RepoError::not_found(Entity::Workout, id));
            }
            Ok(removed)
        })?;

        info!(
            "event=workout_delete module=repo status=ok id={} entry_count={}",
            id, removed_entries
        );
        Ok(())
    }
}

fn insert_entries(
    conn: &Connection,
    workout_id: RecordId,
    entries: &[WorkoutExercise],
) -> RepoResult<Vec<InsertedEntry>> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO workout_exercises (workout_id, exercise_id, sets, reps, weight, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         RETURNING id, created_at, updated_at;",
    )?;

    let mut inserted = Vec::with_capacity(entries.len());
    for entry in entries {
        let generated = stmt.query_row(
            params![
                workout_id,
                entry.exercise_id,
                entry.sets,
                entry.reps,
                entry.weight,
                entry.notes.as_deref(),
            ],
            |row| {
                Ok(InsertedEntry {
                    id: row.get(0)?,
                    created_at: row.get(1)?,
                    updated_at: row.get(2)?,
                })
            },
        )?;
        inserted.push(generated);
    }
    Ok(inserted)
}

fn stamp_entries(workout: &mut Workout, inserted: &[InsertedEntry]) {
    let workout_id = workout.id;
    for (entry, generated) in workout.details.iter_mut().zip(inserted) {
        entry.id = generated.id;
        entry.workout_id = workout_id;
        entry.created_at = generated.created_at;
        entry.updated_at = generated.updated_at;
    }
}

fn load_entries(conn: &Connection, workout_id: RecordId) -> RepoResult<Vec<WorkoutExercise>> {
    let mut stmt = conn.prepare(&format!(
        "{ENTRY_SELECT_SQL} WHERE workout_id = ?1 ORDER BY id ASC;"
    ))?;
    let mut rows = stmt.query([workout_id])?;
    let mut entries = Vec::new();
    while let Some(row) = rows.next()? {
        entries.push(parse_entry_row(row)?);
    }
    Ok(entries)
}

fn parse_workout_row(row: &Row<'_>) -> rusqlite::Result<Workout> {
    Ok(Workout {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        name: row.get("name")?,
        date: row.get("date")?,
        notes: row.get("notes")?,
        details: Vec::new(),
    })
}

/// Maps one `workout_exercises` row selected with the entry column list.
pub(crate) fn parse_entry_row(row: &Row<'_>) -> rusqlite::Result<WorkoutExercise> {
    Ok(WorkoutExercise {
        id: row.get("id")?,
        workout_id: row.get("workout_id")?,
        exercise_id: row.get("exercise_id")?,
        sets: row.get("sets")?,
        reps: row.get("reps")?,
        weight: row.get("weight")?,
        notes: row.get("notes")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

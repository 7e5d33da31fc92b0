//! Read-side join of workout entries with their exercises.
//!
//! Entries are only written through the workout aggregate; this store never
//! mutates state.

use super::workout_repo::parse_entry_row;
use super::{checkout, RepoResult};
use crate::db::DbPool;
use crate::model::exercise::ExerciseSummary;
use crate::model::workout::WorkoutExerciseDetail;
use crate::model::{validate_id, RecordId};
use rusqlite::Row;

const DETAIL_SELECT_SQL: &str = "SELECT
    we.id AS id,
    we.workout_id AS workout_id,
    we.exercise_id AS exercise_id,
    we.sets AS sets,
    we.reps AS reps,
    we.weight AS weight,
    we.notes AS notes,
    we.created_at AS created_at,
    we.updated_at AS updated_at,
    e.name AS exercise_name,
    e.description AS exercise_description,
    e.body_part_id AS exercise_body_part_id
FROM workout_exercises we
INNER JOIN exercises e ON e.id = we.exercise_id
WHERE we.workout_id = ?1
ORDER BY we.id ASC;";

/// Repository interface for enriched workout entry reads.
pub trait WorkoutExerciseRepository {
    /// Lists a workout's entries with exercise name, description and body part.
    ///
    /// An unknown workout yields an empty list.
    fn list_for_workout(&self, workout_id: RecordId) -> RepoResult<Vec<WorkoutExerciseDetail>>;
}

/// SQLite-backed enriched entry reader.
pub struct SqliteWorkoutExerciseRepository<'pool> {
    pool: &'pool DbPool,
}

impl<'pool> SqliteWorkoutExerciseRepository<'pool> {
    pub fn new(pool: &'pool DbPool) -> Self {
        Self { pool }
    }
}

impl WorkoutExerciseRepository for SqliteWorkoutExerciseRepository<'_> {
    fn list_for_workout(&self, workout_id: RecordId) -> RepoResult<Vec<WorkoutExerciseDetail>> {
        validate_id("workout_id", workout_id)?;

        let conn = checkout(self.pool)?;
        let mut stmt = conn.prepare(DETAIL_SELECT_SQL)?;
        let mut rows = stmt.query([workout_id])?;
        let mut details = Vec::new();
        while let Some(row) = rows.next()? {
            details.push(parse_detail_row(row)?);
        }
        Ok(details)
    }
}

fn parse_detail_row(row: &Row<'_>) -> rusqlite::Result<WorkoutExerciseDetail> {
    let entry = parse_entry_row(row)?;
    let exercise = ExerciseSummary {
        id: entry.exercise_id,
        name: row.get("exercise_name")?,
        description: row.get("exercise_description")?,
        body_part_id: row.get("exercise_body_part_id")?,
    };
    Ok(WorkoutExerciseDetail { entry, exercise })
}

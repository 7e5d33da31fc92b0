//! Referential integrity guard checks.
//!
//! # Responsibility
//! - Answer "does any row reference record X?" before destructive writes.
//! - Answer "do all referenced records exist?" before relationship-creating writes.
//!
//! # Invariants
//! - Checks take the caller's connection, so when called with a transaction
//!   they observe the same state as the mutation that follows.
//! - Guards only report; callers decide which error kind a hit means.

use super::{RepoError, RepoResult};
use crate::model::{Entity, RecordId, ValidationError};
use rusqlite::Connection;

/// A dependent relationship that blocks deletion of its parent record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dependents {
    /// `exercises.body_part_id -> body_parts.id`
    ExercisesOfBodyPart,
    /// `workout_exercises.exercise_id -> exercises.id`
    EntriesOfExercise,
}

impl Dependents {
    fn exists_sql(self) -> &'static str {
        match self {
            Self::ExercisesOfBodyPart => {
                "SELECT EXISTS(SELECT 1 FROM exercises WHERE body_part_id = ?1);"
            }
            Self::EntriesOfExercise => {
                "SELECT EXISTS(SELECT 1 FROM workout_exercises WHERE exercise_id = ?1);"
            }
        }
    }

    /// Entity whose rows hold the reference.
    pub fn dependent(self) -> Entity {
        match self {
            Self::ExercisesOfBodyPart => Entity::Exercise,
            Self::EntriesOfExercise => Entity::WorkoutExercise,
        }
    }

    /// Entity being referenced.
    pub fn parent(self) -> Entity {
        match self {
            Self::ExercisesOfBodyPart => Entity::BodyPart,
            Self::EntriesOfExercise => Entity::Exercise,
        }
    }
}

/// Returns whether at least one row references `id` through `dependents`.
pub fn has_dependents(conn: &Connection, dependents: Dependents, id: RecordId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(dependents.exists_sql(), [id], |row| row.get(0))?;
    Ok(exists == 1)
}

/// Fails with `ReferentialIntegrity` when `id` still has dependents.
pub fn ensure_no_dependents(
    conn: &Connection,
    dependents: Dependents,
    id: RecordId,
) -> RepoResult<()> {
    if has_dependents(conn, dependents, id)? {
        return Err(RepoError::ReferentialIntegrity(format!(
            "{} {} is still referenced by at least one {}",
            dependents.parent(),
            id,
            dependents.dependent()
        )));
    }
    Ok(())
}

/// Returns whether a row with `id` exists for `entity`.
pub fn record_exists(conn: &Connection, entity: Entity, id: RecordId) -> RepoResult<bool> {
    let sql = match entity {
        Entity::BodyPart => "SELECT EXISTS(SELECT 1 FROM body_parts WHERE id = ?1);",
        Entity::Exercise => "SELECT EXISTS(SELECT 1 FROM exercises WHERE id = ?1);",
        Entity::Workout => "SELECT EXISTS(SELECT 1 FROM workouts WHERE id = ?1);",
        Entity::WorkoutExercise => "SELECT EXISTS(SELECT 1 FROM workout_exercises WHERE id = ?1);",
        Entity::User => "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1);",
    };
    let exists: i64 = conn.query_row(sql, [id], |row| row.get(0))?;
    Ok(exists == 1)
}

/// Fails with `InvalidInput(MissingReference)` for the first id with no row.
pub fn ensure_references_exist<I>(conn: &Connection, entity: Entity, ids: I) -> RepoResult<()>
where
    I: IntoIterator<Item = RecordId>,
{
    for id in ids {
        if !record_exists(conn, entity, id)? {
            return Err(ValidationError::MissingReference { entity, id }.into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{ensure_no_dependents, ensure_references_exist, has_dependents, Dependents};
    use crate::db::open_pool_in_memory;
    use crate::model::{Entity, ValidationError};
    use crate::repo::RepoError;

    #[test]
    fn reports_dependents_only_for_referenced_parent() {
        let pool = open_pool_in_memory().unwrap();
        let conn = pool.get().unwrap();
        conn.execute_batch(
            "INSERT INTO body_parts (id, name) VALUES (1, 'Chest'), (2, 'Legs');
             INSERT INTO exercises (name, description, body_part_id) VALUES ('Bench Press', '', 1);",
        )
        .unwrap();

        assert!(has_dependents(&conn, Dependents::ExercisesOfBodyPart, 1).unwrap());
        assert!(!has_dependents(&conn, Dependents::ExercisesOfBodyPart, 2).unwrap());

        let err = ensure_no_dependents(&conn, Dependents::ExercisesOfBodyPart, 1).unwrap_err();
        assert!(matches!(err, RepoError::ReferentialIntegrity(_)));
    }

    #[test]
    fn entry_reference_blocks_exercise_and_names_both_sides() {
        let pool = open_pool_in_memory().unwrap();
        let conn = pool.get().unwrap();
        conn.execute_batch(
            "INSERT INTO body_parts (id, name) VALUES (1, 'Chest');
             INSERT INTO exercises (id, name, description, body_part_id) VALUES (4, 'Fly', '', 1);
             INSERT INTO workouts (id, user_id, name, date) VALUES (1, 7, 'Push', '2024-01-01');
             INSERT INTO workout_exercises (workout_id, exercise_id, sets, reps) VALUES (1, 4, 3, 10);",
        )
        .unwrap();

        let err = ensure_no_dependents(&conn, Dependents::EntriesOfExercise, 4).unwrap_err();
        assert_eq!(
            err.to_string(),
            "referential integrity violation: exercise 4 is still referenced by at least one workout exercise"
        );
    }

    #[test]
    fn missing_reference_reports_first_absent_id() {
        let pool = open_pool_in_memory().unwrap();
        let conn = pool.get().unwrap();
        conn.execute_batch("INSERT INTO body_parts (id, name) VALUES (1, 'Chest');")
            .unwrap();

        ensure_references_exist(&conn, Entity::BodyPart, [1]).unwrap();
        let err = ensure_references_exist(&conn, Entity::BodyPart, [1, 3, 4]).unwrap_err();
        assert!(matches!(
            err,
            RepoError::InvalidInput(ValidationError::MissingReference {
                entity: Entity::BodyPart,
                id: 3
            })
        ));
    }
}

//! Operator diagnostics over a live storage handle.
//!
//! # Responsibility
//! - Report storage liveness without failing the caller.
//! - Enumerate schema tables for quick inspection.
//! - Seed a sample workout through the aggregate store.
//!
//! # Invariants
//! - The service holds the stores it needs; it never re-implements their SQL.
//! - `health()` always returns a report; a dead pool shows up as `Unhealthy`.

use crate::db::{self, DbPool};
use crate::model::workout::{Workout, WorkoutExercise};
use crate::model::{validate_id, RecordId};
use crate::repo::workout_repo::WorkoutRepository;
use crate::repo::{checkout, RepoResult};
use chrono::Utc;
use log::{info, warn};
use serde::Serialize;

const SAMPLE_WORKOUT_NAME: &str = "Test Full Body Workout";
const SAMPLE_WORKOUT_NOTES: &str = "Sample workout created by diagnostics";

/// Entry templates cycled over the exercise ids passed to the seeder.
const SAMPLE_ENTRIES: [(i64, i64, f64, &str); 2] = [
    (3, 10, 135.5, "Warmup set included"),
    (4, 8, 185.0, "Focus on form"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DbStatus {
    Healthy,
    Unhealthy,
}

/// Point-in-time liveness snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    /// Service status; `ok` whenever the report could be produced.
    pub status: &'static str,
    pub db_status: DbStatus,
    /// Epoch milliseconds at which the probe ran.
    pub checked_at_ms: i64,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.db_status == DbStatus::Healthy
    }
}

/// Diagnostics component holding the pool and a workout store.
pub struct DiagnosticsService<'pool, W: WorkoutRepository> {
    pool: &'pool DbPool,
    workouts: W,
}

impl<'pool, W: WorkoutRepository> DiagnosticsService<'pool, W> {
    pub fn new(pool: &'pool DbPool, workouts: W) -> Self {
        Self { pool, workouts }
    }

    /// Probes the pool with a fresh connection.
    pub fn health(&self) -> HealthReport {
        let db_status = match db::ping(self.pool) {
            Ok(()) => DbStatus::Healthy,
            Err(err) => {
                warn!("event=health_check module=service status=error error={err}");
                DbStatus::Unhealthy
            }
        };
        HealthReport {
            status: "ok",
            db_status,
            checked_at_ms: Utc::now().timestamp_millis(),
        }
    }

    /// Lists user tables by name, skipping SQLite internals.
    pub fn list_tables(&self) -> RepoResult<Vec<String>> {
        let conn = checkout(self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT name
             FROM sqlite_master
             WHERE type = 'table'
               AND name NOT LIKE 'sqlite_%'
             ORDER BY name ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut tables = Vec::new();
        while let Some(row) = rows.next()? {
            tables.push(row.get(0)?);
        }
        Ok(tables)
    }

    /// Creates a workout dated today for `user_id`, one entry per exercise id,
    /// and returns it as stored.
    pub fn seed_sample_workout(
        &self,
        user_id: RecordId,
        exercise_ids: &[RecordId],
    ) -> RepoResult<Workout> {
        validate_id("user_id", user_id)?;

        let mut workout = Workout::new(user_id, SAMPLE_WORKOUT_NAME, Utc::now().date_naive())
            .with_notes(SAMPLE_WORKOUT_NOTES);
        for (exercise_id, (sets, reps, weight, notes)) in
            exercise_ids.iter().zip(SAMPLE_ENTRIES.iter().cycle())
        {
            workout = workout.with_entry(
                WorkoutExercise::new(*exercise_id, *sets, *reps)
                    .with_weight(*weight)
                    .with_notes(*notes),
            );
        }

        self.workouts.create(&mut workout)?;
        info!(
            "event=seed_workout module=service status=ok id={} entry_count={}",
            workout.id,
            workout.details.len()
        );
        self.workouts.get_by_id(workout.id)
    }
}

#[cfg(test)]
mod tests {
    use super::{DbStatus, HealthReport};

    #[test]
    fn health_report_serializes_snake_case_status() {
        let report = HealthReport {
            status: "ok",
            db_status: DbStatus::Unhealthy,
            checked_at_ms: 42,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["db_status"], "unhealthy");
        assert_eq!(json["checked_at_ms"], 42);
        assert!(!report.is_healthy());
    }
}

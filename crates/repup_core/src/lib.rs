//! Core storage layer for the workout tracker.
//!
//! Owns the schema, the entity and aggregate stores, and the invariants that
//! keep body parts, exercises and workouts consistent. Transport and auth
//! layers sit outside this crate and talk to it through the store traits.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, DbConfig};
pub use db::{open_pool, open_pool_in_memory, DbError, DbPool};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::body_part::BodyPart;
pub use model::exercise::{Exercise, ExerciseSummary};
pub use model::user::User;
pub use model::workout::{Workout, WorkoutExercise, WorkoutExerciseDetail};
pub use model::{Entity, RecordId, ValidationError};
pub use repo::body_part_repo::{BodyPartRepository, SqliteBodyPartRepository};
pub use repo::exercise_repo::{ExerciseRepository, SqliteExerciseRepository};
pub use repo::user_repo::{SqliteUserRepository, UpsertOutcome, UserRepository};
pub use repo::workout_exercise_repo::{
    SqliteWorkoutExerciseRepository, WorkoutExerciseRepository,
};
pub use repo::workout_repo::{SqliteWorkoutRepository, WorkoutRepository};
pub use repo::{ErrorKind, RepoError, RepoResult};
pub use service::diagnostics::{DbStatus, DiagnosticsService, HealthReport};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}

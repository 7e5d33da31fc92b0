use repup_core::db::open_pool_in_memory;
use repup_core::{
    BodyPart, BodyPartRepository, DbStatus, DiagnosticsService, ErrorKind, Exercise,
    ExerciseRepository, RecordId, SqliteBodyPartRepository, SqliteExerciseRepository,
    SqliteWorkoutExerciseRepository, SqliteWorkoutRepository, WorkoutExerciseRepository,
    WorkoutRepository,
};

#[test]
fn health_reports_live_database() {
    let pool = open_pool_in_memory().unwrap();
    let service = DiagnosticsService::new(&pool, SqliteWorkoutRepository::new(&pool));

    let report = service.health();
    assert_eq!(report.status, "ok");
    assert_eq!(report.db_status, DbStatus::Healthy);
    assert!(report.checked_at_ms > 0);
}

#[test]
fn health_reports_exhausted_pool_as_unhealthy() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = repup_core::DbConfig::new(dir.path().join("busy.db"));
    config.max_connections = 1;
    config.acquire_timeout_secs = 1;
    let pool = repup_core::open_pool(&config).unwrap();
    let service = DiagnosticsService::new(&pool, SqliteWorkoutRepository::new(&pool));

    let held = pool.get().unwrap();
    let report = service.health();
    assert_eq!(report.status, "ok");
    assert_eq!(report.db_status, DbStatus::Unhealthy);
    drop(held);

    assert!(service.health().is_healthy());
}

#[test]
fn list_tables_returns_schema_tables_by_name() {
    let pool = open_pool_in_memory().unwrap();
    let service = DiagnosticsService::new(&pool, SqliteWorkoutRepository::new(&pool));

    assert_eq!(
        service.list_tables().unwrap(),
        vec![
            "body_parts",
            "exercises",
            "users",
            "workout_exercises",
            "workouts"
        ]
    );
}

#[test]
fn seed_creates_sample_workout_through_store() {
    let pool = open_pool_in_memory().unwrap();
    let mut chest = BodyPart::new("Chest");
    SqliteBodyPartRepository::new(&pool)
        .create(&mut chest)
        .unwrap();
    let exercises = SqliteExerciseRepository::new(&pool);
    let exercise_ids: Vec<RecordId> = ["Bench Press", "Squats", "Deadlift"]
        .into_iter()
        .map(|name| {
            let mut exercise = Exercise::new(name, "", chest.id);
            exercises.create(&mut exercise).unwrap();
            exercise.id
        })
        .collect();

    let service = DiagnosticsService::new(&pool, SqliteWorkoutRepository::new(&pool));
    let seeded = service.seed_sample_workout(1, &exercise_ids).unwrap();

    assert!(seeded.id > 0);
    assert_eq!(seeded.user_id, 1);
    assert_eq!(seeded.details.len(), 3);
    assert_eq!(seeded.details[0].weight, Some(135.5));
    assert_eq!(seeded.details[1].sets, 4);
    assert_eq!(seeded.details[2].reps, 10);

    let stored = SqliteWorkoutRepository::new(&pool)
        .get_by_id(seeded.id)
        .unwrap();
    assert_eq!(stored, seeded);
    let enriched = SqliteWorkoutExerciseRepository::new(&pool)
        .list_for_workout(seeded.id)
        .unwrap();
    assert_eq!(enriched[1].exercise.name, "Squats");
}

#[test]
fn seed_with_unknown_exercise_is_rejected_and_persists_nothing() {
    let pool = open_pool_in_memory().unwrap();
    let service = DiagnosticsService::new(&pool, SqliteWorkoutRepository::new(&pool));

    let err = service.seed_sample_workout(1, &[1, 5]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(SqliteWorkoutRepository::new(&pool)
        .get_all_for_user(1)
        .unwrap()
        .is_empty());

    let err = service.seed_sample_workout(0, &[]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

use chrono::NaiveDate;
use repup_core::db::open_pool_in_memory;
use repup_core::{
    BodyPart, BodyPartRepository, ErrorKind, Exercise, ExerciseRepository, RepoError,
    SqliteBodyPartRepository, SqliteExerciseRepository, SqliteWorkoutRepository, Workout,
    WorkoutExercise, WorkoutRepository,
};

#[test]
fn guarded_deletes_unblock_in_dependency_order() {
    let pool = open_pool_in_memory().unwrap();
    let body_parts = SqliteBodyPartRepository::new(&pool);
    let exercises = SqliteExerciseRepository::new(&pool);
    let workouts = SqliteWorkoutRepository::new(&pool);

    let mut chest = BodyPart::new("Chest");
    body_parts.create(&mut chest).unwrap();
    assert_eq!(chest.id, 1);

    let mut bench = Exercise::new("Bench Press", "", chest.id);
    exercises.create(&mut bench).unwrap();
    assert_eq!(bench.id, 1);

    let mut push_day = Workout::new(7, "Push Day", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
        .with_entry(WorkoutExercise::new(1, 3, 10).with_weight(135.5));
    workouts.create(&mut push_day).unwrap();
    assert!(push_day.id > 0);
    assert!(push_day.details[0].id > 0);

    let err = body_parts.delete(1).unwrap_err();
    assert!(matches!(err, RepoError::ReferentialIntegrity(_)));

    let err = exercises.delete(1).unwrap_err();
    assert!(matches!(err, RepoError::ReferentialIntegrity(_)));

    workouts.delete(push_day.id).unwrap();
    exercises.delete(1).unwrap();
    body_parts.delete(1).unwrap();

    assert_eq!(body_parts.get_by_id(1).unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(exercises.get_by_id(1).unwrap_err().kind(), ErrorKind::NotFound);
}

#[test]
fn blocked_delete_changes_nothing() {
    let pool = open_pool_in_memory().unwrap();
    let body_parts = SqliteBodyPartRepository::new(&pool);
    let exercises = SqliteExerciseRepository::new(&pool);

    let mut chest = BodyPart::new("Chest");
    body_parts.create(&mut chest).unwrap();
    let mut bench = Exercise::new("Bench Press", "", chest.id);
    exercises.create(&mut bench).unwrap();
    let mut fly = Exercise::new("Fly", "", chest.id);
    exercises.create(&mut fly).unwrap();

    let err = body_parts.delete(chest.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ReferentialIntegrity);
    assert_eq!(err.kind().code(), "referential_integrity");
    assert_eq!(exercises.get_by_body_part(chest.id).unwrap().len(), 2);
}

#[test]
fn schema_rejects_dangling_references_that_bypass_the_stores() {
    let pool = open_pool_in_memory().unwrap();
    let conn = pool.get().unwrap();
    conn.execute("INSERT INTO body_parts (name) VALUES ('Chest');", [])
        .unwrap();
    conn.execute(
        "INSERT INTO exercises (name, description, body_part_id) VALUES ('Bench', '', 1);",
        [],
    )
    .unwrap();

    let err: RepoError = conn
        .execute("DELETE FROM body_parts WHERE id = 1;", [])
        .unwrap_err()
        .into();
    assert_eq!(err.kind(), ErrorKind::ReferentialIntegrity);
}

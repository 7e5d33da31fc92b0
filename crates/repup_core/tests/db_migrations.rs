use repup_core::db::migrations::latest_version;
use repup_core::db::{open_pool, open_pool_in_memory, ping, DbError};
use repup_core::DbConfig;
use rusqlite::Connection;

const TABLES: [&str; 5] = [
    "body_parts",
    "exercises",
    "users",
    "workout_exercises",
    "workouts",
];

#[test]
fn in_memory_pool_applies_all_migrations() {
    let pool = open_pool_in_memory().unwrap();
    let conn = pool.get().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    for table in TABLES {
        assert_table_exists(&conn, table);
    }
}

#[test]
fn pooled_connections_enforce_foreign_keys() {
    let pool = open_pool_in_memory().unwrap();
    let conn = pool.get().unwrap();

    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);
}

#[test]
fn reopening_file_database_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let config = DbConfig::new(dir.path().join("repup.db"));

    let first = open_pool(&config).unwrap();
    first
        .get()
        .unwrap()
        .execute("INSERT INTO body_parts (name) VALUES ('Chest');", [])
        .unwrap();
    drop(first);

    let second = open_pool(&config).unwrap();
    let conn = second.get().unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM body_parts;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_pool(&DbConfig::new(&path)).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn pool_respects_connection_bound() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = DbConfig::new(dir.path().join("bounded.db"));
    config.max_connections = 2;
    config.min_idle = 5;
    config.acquire_timeout_secs = 1;

    let pool = open_pool(&config).unwrap();
    assert_eq!(pool.max_size(), 2);

    let first = pool.get().unwrap();
    let second = pool.get().unwrap();
    assert!(pool
        .get_timeout(std::time::Duration::from_millis(50))
        .is_err());
    drop(first);
    drop(second);

    ping(&pool).unwrap();
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}

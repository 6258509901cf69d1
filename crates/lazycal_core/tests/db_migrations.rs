use lazycal_core::db::migrations::{apply_migrations, latest_version};
use lazycal_core::db::{open_db, open_db_in_memory, schema_version, DbError};
use rusqlite::Connection;
use std::fs;

const INSERT_EVENT: &str = "INSERT INTO events (event_date, slot, title, description, event_time, priority)
                            VALUES (?1, ?2, 't', '', '08:00 AM', 'low');";

#[test]
fn fresh_database_has_calendar_schema() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn).unwrap(), latest_version());
    assert_eq!(
        column_names(&conn, "events"),
        vec!["event_date", "slot", "title", "description", "event_time", "priority"]
    );
    assert_eq!(
        column_names(&conn, "snapshot_saves"),
        vec!["id", "saved_at", "date_count", "event_count"]
    );
}

#[test]
fn events_are_keyed_by_date_and_slot() {
    let conn = open_db_in_memory().unwrap();

    conn.execute(INSERT_EVENT, rusqlite::params!["2024-05-01", 0]).unwrap();
    conn.execute(INSERT_EVENT, rusqlite::params!["2024-05-02", 0]).unwrap();
    conn.execute(INSERT_EVENT, rusqlite::params!["2024-05-01", 1]).unwrap();
    assert!(conn
        .execute(INSERT_EVENT, rusqlite::params!["2024-05-01", 0])
        .is_err());
}

#[test]
fn negative_slots_are_rejected() {
    let conn = open_db_in_memory().unwrap();
    assert!(conn
        .execute(INSERT_EVENT, rusqlite::params!["2024-05-01", -1])
        .is_err());
}

#[test]
fn save_record_is_a_single_row() {
    let conn = open_db_in_memory().unwrap();
    let insert = "INSERT INTO snapshot_saves (id, saved_at, date_count, event_count)
                  VALUES (?1, 0, 0, 0);";

    conn.execute(insert, [1]).unwrap();
    assert!(conn.execute(insert, [2]).is_err());
}

#[test]
fn version_one_database_gains_save_record_and_keeps_events() {
    let mut conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE events (
            event_date TEXT NOT NULL,
            slot INTEGER NOT NULL CHECK (slot >= 0),
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            event_time TEXT NOT NULL,
            priority TEXT NOT NULL,
            PRIMARY KEY (event_date, slot)
        );
        PRAGMA user_version = 1;",
    )
    .unwrap();
    conn.execute(INSERT_EVENT, rusqlite::params!["2024-05-01", 0]).unwrap();

    apply_migrations(&mut conn).unwrap();

    assert_eq!(schema_version(&conn).unwrap(), latest_version());
    let events: i64 = conn
        .query_row("SELECT COUNT(*) FROM events;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(events, 1);
    let saves: i64 = conn
        .query_row("SELECT COUNT(*) FROM snapshot_saves;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(saves, 0);
}

#[test]
fn database_from_newer_binary_is_refused_and_left_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("CREATE TABLE future_only (x INTEGER); PRAGMA user_version = 999;")
        .unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::NewerSchema { found, supported } => {
            assert_eq!(found, 999);
            assert_eq!(supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }

    let conn = Connection::open(&path).unwrap();
    assert_eq!(schema_version(&conn).unwrap(), 999);
    assert!(column_names(&conn, "events").is_empty());
}

#[test]
fn missing_parent_directories_are_created() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app").join("data").join("calendar.sqlite3");

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn).unwrap(), latest_version());
    assert!(path.is_file());
}

#[test]
fn parent_that_is_a_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("occupied");
    fs::write(&blocker, b"not a directory").unwrap();

    match open_db(blocker.join("calendar.sqlite3")).unwrap_err() {
        DbError::CreateDir { path, .. } => assert_eq!(path, blocker),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn failed_step_names_its_version_and_commits_nothing() {
    let mut conn = Connection::open_in_memory().unwrap();
    // An index already owns the name of the save-record table.
    conn.execute_batch(
        "CREATE TABLE scratch (x INTEGER);
         CREATE INDEX snapshot_saves ON scratch (x);",
    )
    .unwrap();

    match apply_migrations(&mut conn).unwrap_err() {
        DbError::Migration { version, .. } => assert_eq!(version, 2),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(schema_version(&conn).unwrap(), 0);
    assert!(column_names(&conn, "events").is_empty());
}

fn column_names(conn: &Connection, table: &str) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid;")
        .unwrap();
    let names = stmt
        .query_map([table], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap();
    names
}

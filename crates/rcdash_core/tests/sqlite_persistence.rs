use chrono::{TimeZone, Utc};
use rcdash_core::db::migrations::latest_version;
use rcdash_core::db::{open_db, DbError};
use rcdash_core::{
    EntityStore, FixedClock, Grant, Lab, Project, RepoError, Researcher, ResearcherId,
    SqliteCollectionStore, StoreError,
};
use rusqlite::{params, Connection};
use std::path::Path;

fn clock() -> FixedClock {
    FixedClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap())
}

fn open_store(path: &Path) -> EntityStore<SqliteCollectionStore, FixedClock> {
    let conn = open_db(path).unwrap();
    EntityStore::open(SqliteCollectionStore::try_new(conn).unwrap(), clock()).unwrap()
}

#[test]
fn first_open_persists_all_five_collections() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir.path().join("rcdash.sqlite3"));

    assert_eq!(
        store.backend().keys().unwrap(),
        vec!["computeResources", "grants", "labs", "projects", "researchers"]
    );
    let version: u32 = store
        .backend()
        .connection()
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .unwrap();
    assert_eq!(version, latest_version());
}

#[test]
fn missing_data_directory_is_created() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("data").join("rcdash.sqlite3");

    let store = open_store(&path);

    assert!(path.exists());
    assert_eq!(store.backend().keys().unwrap().len(), 5);
}

#[test]
fn cascade_and_notes_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rcdash.sqlite3");
    let r2 = ResearcherId::from("r2");

    let expected = {
        let mut store = open_store(&path);
        store.delete::<Researcher>(&"r1".into()).unwrap();
        store.add_note(&r2, "Asked for more GPU hours").unwrap();
        store.snapshot().clone()
    };

    let reopened = open_store(&path);
    assert_eq!(reopened.snapshot(), &expected);
    assert_eq!(
        reopened.get::<Lab>(&"l1".into()).unwrap().principal_investigator_id,
        None
    );
    assert_eq!(
        reopened.get::<Project>(&"p1".into()).unwrap().lead_researcher_id,
        None
    );
    assert_eq!(
        reopened.get::<Grant>(&"g3".into()).unwrap().principal_investigator_id,
        None
    );
    assert_eq!(reopened.notes(&r2).unwrap().len(), 1);
}

#[test]
fn corrupt_row_fails_open_with_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rcdash.sqlite3");
    drop(open_store(&path));

    let conn = Connection::open(&path).unwrap();
    conn.execute(
        "UPDATE collections SET payload = ?1 WHERE key = 'grants';",
        params![r#"[{"id": "g1"}]"#],
    )
    .unwrap();
    drop(conn);

    let conn = open_db(&path).unwrap();
    let err = EntityStore::open(SqliteCollectionStore::try_new(conn).unwrap(), clock())
        .err()
        .unwrap();
    assert!(matches!(err, StoreError::Corrupt { key: "grants", .. }));
}

#[test]
fn unmigrated_connection_is_rejected() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteCollectionStore::try_new(conn).err().unwrap();
    assert!(matches!(err, RepoError::MissingRequiredTable("collections")));
}

#[test]
fn newer_schema_version_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
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

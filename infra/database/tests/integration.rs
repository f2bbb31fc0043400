use sc_database::{Database, DatabaseError, Document, Schema, SurrealValue};

#[derive(Debug, Clone, PartialEq, SurrealValue)]
struct Note {
    note_id: String,
    title: String,
    tags: Vec<String>,
    archived_by: Option<String>,
}

impl Document for Note {
    const COLLECTION: &'static str = "note";
    const ID_FIELD: &'static str = "note_id";
}

const NOTES: Schema = Schema::new(
    "notes",
    "DEFINE TABLE IF NOT EXISTS note SCHEMALESS;
     DEFINE INDEX IF NOT EXISTS note_id_unique ON TABLE note COLUMNS note_id UNIQUE;",
);

fn note(id: &str, title: &str) -> Note {
    Note { note_id: id.to_owned(), title: title.to_owned(), tags: vec!["a".to_owned()], archived_by: None }
}

async fn database(db_name: &str) -> Database {
    Database::builder()
        .url("mem://")
        .session("test_ns", db_name)
        .schema(NOTES)
        .init()
        .await
        .expect("connect to mem://")
}

#[tokio::test]
async fn connect_in_memory_and_health_check() {
    let db = database("health").await;

    db.health().await.expect("health check");
    assert_eq!(db.namespace(), "test_ns");
    assert_eq!(db.database(), "health");
}

#[tokio::test]
async fn missing_parameters_fail_validation() {
    let err = Database::builder().init().await.unwrap_err();
    assert!(matches!(err, DatabaseError::Validation { .. }));

    let err = Database::builder().url("  ").session("ns", "db").init().await.unwrap_err();
    assert!(matches!(err, DatabaseError::Validation { .. }));
}

#[tokio::test]
async fn sessions_store_and_load_documents() {
    let db = database("roundtrip").await;

    let writer = db.lightweight_session();
    writer.insert(note("n2", "second")).await.expect("insert n2");
    writer.insert(note("n1", "first")).await.expect("insert n1");

    let reader = db.lightweight_session();
    let loaded = reader.load::<Note>("n1").await.expect("load n1");
    assert_eq!(loaded, Some(note("n1", "first")));

    let missing = reader.load::<Note>("nope").await.expect("load missing");
    assert_eq!(missing, None);

    let all = reader.list::<Note>().await.expect("list");
    assert_eq!(all.iter().map(|n| n.note_id.as_str()).collect::<Vec<_>>(), vec!["n1", "n2"]);
}

#[tokio::test]
async fn unique_index_rejects_duplicate_keys() {
    let db = database("unique").await;
    let session = db.lightweight_session();

    session.insert(note("dup", "one")).await.expect("first insert");
    assert!(session.insert(note("dup", "two")).await.is_err());
}

#[tokio::test]
async fn invalid_schema_fails_init() {
    let err = Database::builder()
        .url("mem://")
        .session("test_ns", "broken")
        .schema(Schema::new("broken", "DEFINE TABLEE nope;"))
        .init()
        .await
        .unwrap_err();

    assert!(matches!(err, DatabaseError::Surreal { .. } | DatabaseError::Schema { .. }));
}

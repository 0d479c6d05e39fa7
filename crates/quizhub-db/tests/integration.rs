use quizhub_db::{create_pool, run_migrations, DbRuntimeSettings};

#[test]
fn db_initialization_works() {
    let pool = create_pool(":memory:", DbRuntimeSettings::default()).expect("failed to create pool");
    let conn = pool.get().expect("failed to get connection");
    let applied = run_migrations(&conn).expect("failed to run migrations");
    assert_eq!(applied, 3);

    let mut stmt = conn
        .prepare(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .expect("failed to prepare table query");
    let tables: Vec<String> = stmt
        .query_map([], |row| row.get(0))
        .expect("failed to execute table query")
        .map(|r| r.expect("failed to read table name"))
        .collect();

    assert_eq!(tables, vec!["_quizhub_migrations", "forms", "questions"]);
}

#[test]
fn schema_survives_reopen_and_cascades_deletes() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("quizhub.db");
    let path = path.to_str().expect("utf-8 path");

    {
        let pool = create_pool(path, DbRuntimeSettings::default()).expect("failed to create pool");
        let conn = pool.get().expect("failed to get connection");
        run_migrations(&conn).expect("failed to run migrations");
        conn.execute_batch(
            "INSERT INTO forms (id, title) VALUES (1, 'Persisted');
             INSERT INTO questions (form_id, position, text, question_type) VALUES (1, 0, 'q', 'text');",
        )
        .expect("failed to seed rows");
    }

    let pool = create_pool(path, DbRuntimeSettings::default()).expect("failed to reopen pool");
    let conn = pool.get().expect("failed to get connection");
    let applied = run_migrations(&conn).expect("failed to rerun migrations");
    assert_eq!(applied, 0, "reopened database is already migrated");

    conn.execute("DELETE FROM forms WHERE id = 1", [])
        .expect("failed to delete form");
    let remaining: i64 = conn
        .query_row("SELECT COUNT(*) FROM questions", [], |row| row.get(0))
        .expect("failed to count questions");
    assert_eq!(remaining, 0, "questions should cascade with their form");
}

#[test]
fn orphan_questions_are_rejected() {
    let pool = create_pool(":memory:", DbRuntimeSettings::default()).expect("failed to create pool");
    let conn = pool.get().expect("failed to get connection");
    run_migrations(&conn).expect("failed to run migrations");

    let result = conn.execute(
        "INSERT INTO questions (form_id, position, text, question_type) VALUES (99, 0, 'q', 'text')",
        [],
    );
    assert!(result.is_err(), "foreign key to forms must be enforced");
}

use super::*;
use quizhub_types::QuestionCreate;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().expect("should open in-memory db");
    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .expect("should enable foreign keys");
    quizhub_db::run_migrations(&conn).expect("migrations should succeed");
    conn
}

fn payload(title: &str, questions: &[(&str, &str)]) -> FormCreate {
    FormCreate {
        title: title.to_string(),
        description: None,
        questions: questions
            .iter()
            .map(|(text, kind)| QuestionCreate {
                text: text.to_string(),
                question_type: kind.to_string(),
            })
            .collect(),
    }
}

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
        row.get(0)
    })
    .expect("should count rows")
}

#[test]
fn create_form_returns_stored_form_with_ids() {
    let mut conn = setup();
    let mut body = payload(
        "Rust basics",
        &[("What is ownership?", "text"), ("Pick a smart pointer", "multiple_choice")],
    );
    body.description = Some("Week one".to_string());

    let form = create_form(&mut conn, &body).expect("create should succeed");

    assert!(form.id > 0);
    assert_eq!(form.title, "Rust basics");
    assert_eq!(form.description.as_deref(), Some("Week one"));
    assert_eq!(form.status, FormStatus::Draft);
    assert!(!form.created_at.is_empty());
    assert_eq!(form.questions.len(), 2);
    assert_eq!(form.questions[0].text, "What is ownership?");
    assert_eq!(form.questions[1].question_type, "multiple_choice");
    assert_ne!(form.questions[0].id, form.questions[1].id);
}

#[test]
fn create_form_without_questions() {
    let mut conn = setup();
    let form = create_form(&mut conn, &payload("Empty", &[])).expect("create should succeed");
    assert!(form.questions.is_empty());
    assert_eq!(count(&conn, "forms"), 1);
}

#[test]
fn create_form_rejects_invalid_payload_before_writing() {
    let mut conn = setup();
    let err = create_form(&mut conn, &payload("Quiz", &[("ok", "text"), ("  ", "text")]))
        .expect_err("blank question text must fail");

    match err {
        FormError::Invalid(v) => assert_eq!(v.field(), "questions[1].text"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(count(&conn, "forms"), 0);
    assert_eq!(count(&conn, "questions"), 0);
}

#[test]
fn failed_question_insert_rolls_back_form() {
    let mut conn = setup();
    conn.execute_batch(
        "CREATE TRIGGER reject_poison BEFORE INSERT ON questions
         WHEN NEW.text = 'poison'
         BEGIN SELECT RAISE(ABORT, 'poisoned question'); END;",
    )
    .expect("should create trigger");

    let err = create_form(
        &mut conn,
        &payload("Half written", &[("fine", "text"), ("poison", "text")]),
    )
    .expect_err("trigger should abort the insert");

    assert!(matches!(err, FormError::Database(_)), "got {err:?}");
    assert_eq!(count(&conn, "forms"), 0, "form row must be rolled back");
    assert_eq!(count(&conn, "questions"), 0);
}

#[test]
fn get_form_preserves_submission_order() {
    let mut conn = setup();
    let created = create_form(
        &mut conn,
        &payload("Ordered", &[("third?", "text"), ("first?", "text"), ("second?", "text")]),
    )
    .expect("create should succeed");

    let fetched = get_form(&conn, created.id).expect("get should succeed");
    let texts: Vec<&str> = fetched.questions.iter().map(|q| q.text.as_str()).collect();
    assert_eq!(texts, vec!["third?", "first?", "second?"]);
    assert_eq!(fetched, created);
}

#[test]
fn get_missing_form_is_not_found() {
    let conn = setup();
    assert!(matches!(get_form(&conn, 42), Err(FormError::NotFound(42))));
}

#[test]
fn list_forms_newest_first_with_counts() {
    let mut conn = setup();
    let a = create_form(&mut conn, &payload("A", &[("q", "text")])).unwrap();
    let b = create_form(&mut conn, &payload("B", &[("q", "text"), ("q2", "text")])).unwrap();

    let forms = list_forms(&conn, &ListParams::default()).expect("list should succeed");
    let ids: Vec<i64> = forms.iter().map(|f| f.id).collect();
    assert_eq!(ids, vec![b.id, a.id]);
    assert_eq!(forms[0].question_count, 2);
    assert_eq!(forms[1].question_count, 1);
}

#[test]
fn list_forms_filters_by_status_and_pages() {
    let mut conn = setup();
    let mut ids = Vec::new();
    for i in 0..5 {
        ids.push(create_form(&mut conn, &payload(&format!("F{i}"), &[])).unwrap().id);
    }
    publish_form(&conn, ids[1]).unwrap();
    publish_form(&conn, ids[3]).unwrap();

    let published = list_forms(
        &conn,
        &ListParams {
            status: Some(FormStatus::Published),
            ..ListParams::default()
        },
    )
    .unwrap();
    assert_eq!(
        published.iter().map(|f| f.id).collect::<Vec<_>>(),
        vec![ids[3], ids[1]]
    );

    let page = list_forms(
        &conn,
        &ListParams {
            status: None,
            limit: Some(2),
            offset: Some(1),
        },
    )
    .unwrap();
    assert_eq!(
        page.iter().map(|f| f.id).collect::<Vec<_>>(),
        vec![ids[3], ids[2]]
    );
}

#[test]
fn list_limit_is_clamped() {
    assert_eq!(ListParams::default().effective_limit(), DEFAULT_LIST_LIMIT);
    let zero = ListParams {
        limit: Some(0),
        ..ListParams::default()
    };
    assert_eq!(zero.effective_limit(), 1);
    let huge = ListParams {
        limit: Some(10_000),
        ..ListParams::default()
    };
    assert_eq!(huge.effective_limit(), MAX_LIST_LIMIT);
}

#[test]
fn publish_form_transitions_once() {
    let mut conn = setup();
    let form = create_form(&mut conn, &payload("Draft", &[("q", "text")])).unwrap();

    let published = publish_form(&conn, form.id).expect("first publish should succeed");
    assert_eq!(published.status, FormStatus::Published);
    assert_eq!(published.questions, form.questions);

    let again = publish_form(&conn, form.id).expect_err("second publish must fail");
    assert!(matches!(again, FormError::AlreadyPublished(id) if id == form.id));

    assert!(matches!(
        publish_form(&conn, 999),
        Err(FormError::NotFound(999))
    ));
}

#[test]
fn delete_form_cascades_to_questions() {
    let mut conn = setup();
    let keep = create_form(&mut conn, &payload("Keep", &[("k", "text")])).unwrap();
    let gone = create_form(&mut conn, &payload("Gone", &[("a", "text"), ("b", "text")])).unwrap();

    delete_form(&conn, gone.id).expect("delete should succeed");

    assert!(matches!(get_form(&conn, gone.id), Err(FormError::NotFound(_))));
    assert_eq!(count(&conn, "questions"), 1);
    assert_eq!(get_form(&conn, keep.id).unwrap().questions.len(), 1);

    assert!(matches!(
        delete_form(&conn, gone.id),
        Err(FormError::NotFound(id)) if id == gone.id
    ));
}

#[test]
fn unknown_status_in_database_is_a_conversion_error() {
    let conn = setup();
    // Bypass the CHECK constraint to simulate a row written by a newer schema.
    conn.execute_batch(
        "PRAGMA ignore_check_constraints = ON;
         INSERT INTO forms (id, title, status) VALUES (1, 'odd', 'archived');
         PRAGMA ignore_check_constraints = OFF;",
    )
    .unwrap();

    match get_form(&conn, 1) {
        Err(FormError::Database(rusqlite::Error::FromSqlConversionFailure(idx, _, _))) => {
            assert_eq!(idx, 3)
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn update_form_rewrites_draft() {
    let mut conn = setup();
    let original = create_form(
        &mut conn,
        &payload("Draft", &[("old one", "text"), ("old two", "text"), ("old three", "text")]),
    )
    .unwrap();

    let mut revised = payload("Draft v2", &[("new one", "multiple_choice"), ("new two", "text")]);
    revised.description = Some("Revised".to_string());
    let updated = update_form(&mut conn, original.id, &revised).expect("update should succeed");

    assert_eq!(updated.id, original.id);
    assert_eq!(updated.title, "Draft v2");
    assert_eq!(updated.description.as_deref(), Some("Revised"));
    assert_eq!(updated.status, FormStatus::Draft);
    assert_eq!(updated.created_at, original.created_at);
    let texts: Vec<&str> = updated.questions.iter().map(|q| q.text.as_str()).collect();
    assert_eq!(texts, vec!["new one", "new two"]);
    assert_eq!(updated.questions[0].question_type, "multiple_choice");

    assert_eq!(get_form(&conn, original.id).unwrap(), updated);
    assert_eq!(count(&conn, "questions"), 2, "old questions must be gone");
}

#[test]
fn update_form_leaves_other_forms_alone() {
    let mut conn = setup();
    let target = create_form(&mut conn, &payload("Target", &[("t", "text")])).unwrap();
    let bystander = create_form(&mut conn, &payload("Other", &[("o", "text")])).unwrap();

    update_form(&mut conn, target.id, &payload("Target", &[])).unwrap();

    assert_eq!(get_form(&conn, bystander.id).unwrap(), bystander);
    assert!(get_form(&conn, target.id).unwrap().questions.is_empty());
}

#[test]
fn update_published_form_is_refused() {
    let mut conn = setup();
    let form = create_form(&mut conn, &payload("Live", &[("q", "text")])).unwrap();
    let published = publish_form(&conn, form.id).unwrap();

    let err = update_form(&mut conn, form.id, &payload("Sneaky edit", &[]))
        .expect_err("published forms are frozen");
    assert!(matches!(err, FormError::AlreadyPublished(id) if id == form.id));
    assert_eq!(get_form(&conn, form.id).unwrap(), published);
}

#[test]
fn update_missing_form_is_not_found() {
    let mut conn = setup();
    let err = update_form(&mut conn, 77, &payload("Ghost", &[("q", "text")]))
        .expect_err("missing form must fail");
    assert!(matches!(err, FormError::NotFound(77)));
    assert_eq!(count(&conn, "questions"), 0);
}

#[test]
fn update_form_validates_and_keeps_old_content() {
    let mut conn = setup();
    let form = create_form(&mut conn, &payload("Keep me", &[("q", "text")])).unwrap();

    let err = update_form(&mut conn, form.id, &payload("", &[]))
        .expect_err("blank title must fail");
    assert!(matches!(err, FormError::Invalid(ref v) if v.field() == "title"));
    assert_eq!(get_form(&conn, form.id).unwrap(), form);
}

#[test]
fn failed_update_rolls_back_title_and_questions() {
    let mut conn = setup();
    let form = create_form(&mut conn, &payload("Stable", &[("a", "text"), ("b", "text")])).unwrap();
    conn.execute_batch(
        "CREATE TRIGGER reject_poison BEFORE INSERT ON questions
         WHEN NEW.text = 'poison'
         BEGIN SELECT RAISE(ABORT, 'poisoned question'); END;",
    )
    .unwrap();

    let err = update_form(&mut conn, form.id, &payload("Changed", &[("poison", "text")]))
        .expect_err("trigger should abort the update");
    assert!(matches!(err, FormError::Database(_)), "got {err:?}");
    assert_eq!(get_form(&conn, form.id).unwrap(), form);
}

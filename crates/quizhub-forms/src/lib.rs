//! Form and question persistence for the QuizHub forms service.
//!
//! A form owns an ordered list of questions. Forms are written together with
//! all of their questions in a single transaction and read back with the
//! questions in the order they were submitted. Drafts may be rewritten;
//! published forms are frozen. Every function here takes a borrowed SQLite
//! connection; pooling and threading are the caller's concern.

use quizhub_types::{Form, FormCreate, FormStatus, FormSummary, Question, ValidationError};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Deserialize;
use thiserror::Error;

/// Page size used when a list request does not specify one.
pub const DEFAULT_LIST_LIMIT: u32 = 50;
/// Largest page a single list request may return.
pub const MAX_LIST_LIMIT: u32 = 100;

/// Errors that can occur during form operations.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("invalid form: {0}")]
    Invalid(#[from] ValidationError),
    #[error("form not found: {0}")]
    NotFound(i64),
    #[error("form already published: {0}")]
    AlreadyPublished(i64),
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Filters and paging for [`list_forms`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ListParams {
    /// Only return forms in this state.
    pub status: Option<FormStatus>,
    /// Page size, clamped to `1..=MAX_LIST_LIMIT`.
    pub limit: Option<u32>,
    /// Number of forms to skip.
    pub offset: Option<u32>,
}

impl ListParams {
    fn effective_limit(&self) -> u32 {
        self.limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, MAX_LIST_LIMIT)
    }
}

/// Creates a form and its questions, returning the stored form.
///
/// The payload is validated first. The form row and every question row are
/// inserted in one transaction: if any insert fails nothing is committed.
pub fn create_form(conn: &mut Connection, payload: &FormCreate) -> Result<Form, FormError> {
    payload.validate()?;

    let tx = conn.transaction()?;

    tx.execute(
        "INSERT INTO forms (title, description) VALUES (?1, ?2)",
        params![payload.title, payload.description],
    )?;
    let form_id = tx.last_insert_rowid();

    insert_questions(&tx, form_id, payload)?;

    let form = load_form(&tx, form_id)?;
    tx.commit()?;

    tracing::info!(
        form_id,
        questions = form.questions.len(),
        "form created"
    );

    Ok(form)
}

/// Replaces the title, description and questions of a draft form.
///
/// The question list is rewritten wholesale, so the returned questions carry
/// fresh ids. Published forms are frozen and yield `AlreadyPublished`.
pub fn update_form(
    conn: &mut Connection,
    form_id: i64,
    payload: &FormCreate,
) -> Result<Form, FormError> {
    payload.validate()?;

    let tx = conn.transaction()?;

    // Writing first takes the write lock before anything is read.
    let updated = tx.execute(
        "UPDATE forms SET title = ?1, description = ?2 WHERE id = ?3 AND status = ?4",
        params![
            payload.title,
            payload.description,
            form_id,
            FormStatus::Draft.as_str()
        ],
    )?;
    if updated == 0 {
        return Err(missing_or_published(&tx, form_id)?);
    }

    tx.execute("DELETE FROM questions WHERE form_id = ?1", [form_id])?;
    insert_questions(&tx, form_id, payload)?;

    let form = load_form(&tx, form_id)?;
    tx.commit()?;

    tracing::info!(
        form_id,
        questions = form.questions.len(),
        "form updated"
    );

    Ok(form)
}

/// Retrieves a form with its questions in submission order.
pub fn get_form(conn: &Connection, form_id: i64) -> Result<Form, FormError> {
    load_form(conn, form_id)
}

/// Lists forms newest first, without their questions.
pub fn list_forms(conn: &Connection, list: &ListParams) -> Result<Vec<FormSummary>, FormError> {
    let mut stmt = conn.prepare(
        "SELECT f.id, f.title, f.description, f.status, f.created_at,
                (SELECT COUNT(*) FROM questions q WHERE q.form_id = f.id)
         FROM forms f
         WHERE ?1 IS NULL OR f.status = ?1
         ORDER BY f.id DESC
         LIMIT ?2 OFFSET ?3",
    )?;

    let rows = stmt.query_map(
        params![
            list.status.map(FormStatus::as_str),
            list.effective_limit(),
            list.offset.unwrap_or(0),
        ],
        map_row_to_summary,
    )?;

    let mut forms = Vec::new();
    for row in rows {
        forms.push(row?);
    }
    Ok(forms)
}

/// Marks a draft form as published and returns it.
///
/// The state check and the update are one statement, so two concurrent
/// publishes cannot both succeed.
pub fn publish_form(conn: &Connection, form_id: i64) -> Result<Form, FormError> {
    let updated = conn.execute(
        "UPDATE forms SET status = ?1 WHERE id = ?2 AND status = ?3",
        params![
            FormStatus::Published.as_str(),
            form_id,
            FormStatus::Draft.as_str()
        ],
    )?;

    if updated == 0 {
        return Err(missing_or_published(conn, form_id)?);
    }

    tracing::info!(form_id, "form published");
    load_form(conn, form_id)
}

/// Deletes a form; its questions go with it.
pub fn delete_form(conn: &Connection, form_id: i64) -> Result<(), FormError> {
    let count = conn.execute("DELETE FROM forms WHERE id = ?1", [form_id])?;
    if count == 0 {
        return Err(FormError::NotFound(form_id));
    }
    tracing::info!(form_id, "form deleted");
    Ok(())
}

fn insert_questions(conn: &Connection, form_id: i64, payload: &FormCreate) -> Result<(), FormError> {
    let mut stmt = conn.prepare(
        "INSERT INTO questions (form_id, position, text, question_type)
         VALUES (?1, ?2, ?3, ?4)",
    )?;
    for (position, question) in payload.questions.iter().enumerate() {
        stmt.execute(params![
            form_id,
            position as i64,
            question.text,
            question.question_type,
        ])?;
    }
    Ok(())
}

/// Explains why a draft-only update touched no row.
fn missing_or_published(conn: &Connection, form_id: i64) -> Result<FormError, FormError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM forms WHERE id = ?1)",
        [form_id],
        |row| row.get(0),
    )?;
    Ok(if exists {
        FormError::AlreadyPublished(form_id)
    } else {
        FormError::NotFound(form_id)
    })
}

fn load_form(conn: &Connection, form_id: i64) -> Result<Form, FormError> {
    let mut form = conn
        .query_row(
            "SELECT id, title, description, status, created_at FROM forms WHERE id = ?1",
            [form_id],
            map_row_to_form,
        )
        .optional()?
        .ok_or(FormError::NotFound(form_id))?;

    let mut stmt = conn.prepare(
        "SELECT id, text, question_type FROM questions
         WHERE form_id = ?1 ORDER BY position ASC",
    )?;
    let rows = stmt.query_map([form_id], map_row_to_question)?;
    for row in rows {
        form.questions.push(row?);
    }

    Ok(form)
}

fn read_status(row: &Row, idx: usize) -> rusqlite::Result<FormStatus> {
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn map_row_to_form(row: &Row) -> rusqlite::Result<Form> {
    Ok(Form {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status: read_status(row, 3)?,
        created_at: row.get(4)?,
        questions: Vec::new(),
    })
}

fn map_row_to_summary(row: &Row) -> rusqlite::Result<FormSummary> {
    Ok(FormSummary {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status: read_status(row, 3)?,
        created_at: row.get(4)?,
        question_count: row.get(5)?,
    })
}

fn map_row_to_question(row: &Row) -> rusqlite::Result<Question> {
    Ok(Question {
        id: row.get(0)?,
        text: row.get(1)?,
        question_type: row.get(2)?,
    })
}

#[cfg(test)]
mod tests;

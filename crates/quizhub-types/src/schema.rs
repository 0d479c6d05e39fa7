//! Request and response bodies for the forms API.

use crate::{
    FormStatus, MAX_DESCRIPTION_LEN, MAX_QUESTIONS_PER_FORM, MAX_QUESTION_TEXT_LEN,
    MAX_QUESTION_TYPE_LEN, MAX_TITLE_LEN,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A question as submitted when creating a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionCreate {
    /// The question prompt.
    pub text: String,
    /// Free-form kind label, e.g. `text` or `multiple_choice`.
    #[serde(rename = "type")]
    pub question_type: String,
}

/// Request body for `POST /forms`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormCreate {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub questions: Vec<QuestionCreate>,
}

/// A stored question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: String,
}

/// A stored form with its questions in submission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Form {
    pub id: i64,
    pub title: String,
    /// Always serialized, as `null` when the form has no description.
    pub description: Option<String>,
    pub status: FormStatus,
    /// Creation timestamp (`YYYY-MM-DD HH:MM:SS`, UTC).
    pub created_at: String,
    pub questions: Vec<Question>,
}

/// A form without its questions, used in list responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSummary {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: FormStatus,
    pub created_at: String,
    pub question_count: i64,
}

/// A field of a [`FormCreate`] that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must not be blank")]
    Blank { field: String },

    #[error("{field} exceeds {max} characters")]
    TooLong { field: String, max: usize },

    #[error("a form may have at most {max} questions, got {count}")]
    TooManyQuestions { count: usize, max: usize },
}

impl ValidationError {
    /// Name of the offending field, e.g. `title` or `questions[3].type`.
    pub fn field(&self) -> &str {
        match self {
            Self::Blank { field } | Self::TooLong { field, .. } => field,
            Self::TooManyQuestions { .. } => "questions",
        }
    }
}

fn check_text(field: impl Into<String>, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Blank {
            field: field.into(),
        });
    }
    check_len(field, value, max)
}

fn check_len(field: impl Into<String>, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.into(),
            max,
        });
    }
    Ok(())
}

impl FormCreate {
    /// Checks every field against the storage limits.
    ///
    /// Returns the first violation found, scanning the form fields before
    /// the questions and the questions in order.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_text("title", &self.title, MAX_TITLE_LEN)?;
        if let Some(description) = &self.description {
            check_len("description", description, MAX_DESCRIPTION_LEN)?;
        }

        if self.questions.len() > MAX_QUESTIONS_PER_FORM {
            return Err(ValidationError::TooManyQuestions {
                count: self.questions.len(),
                max: MAX_QUESTIONS_PER_FORM,
            });
        }

        for (i, question) in self.questions.iter().enumerate() {
            check_text(
                format!("questions[{i}].text"),
                &question.text,
                MAX_QUESTION_TEXT_LEN,
            )?;
            check_text(
                format!("questions[{i}].type"),
                &question.question_type,
                MAX_QUESTION_TYPE_LEN,
            )?;
        }

        Ok(())
    }
}

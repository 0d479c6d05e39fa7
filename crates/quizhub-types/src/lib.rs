//! Shared types for the QuizHub forms service.
//!
//! This crate holds the wire-level data-transfer objects (request bodies and
//! response shapes), the form lifecycle status, and the field limits enforced
//! before anything reaches the database. Every other crate in the workspace
//! speaks in these types, so they carry no storage or HTTP dependencies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

mod schema;

pub use schema::{Form, FormCreate, FormSummary, Question, QuestionCreate, ValidationError};

/// Maximum length of a form title, in characters.
pub const MAX_TITLE_LEN: usize = 255;
/// Maximum length of a form description, in characters.
pub const MAX_DESCRIPTION_LEN: usize = 10_000;
/// Maximum length of a question prompt, in characters.
pub const MAX_QUESTION_TEXT_LEN: usize = 10_000;
/// Maximum length of a question type label, in characters.
pub const MAX_QUESTION_TYPE_LEN: usize = 50;
/// Maximum number of questions accepted in a single form.
pub const MAX_QUESTIONS_PER_FORM: usize = 200;

/// Lifecycle state of a form.
///
/// Forms are created as drafts and move to `Published` exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormStatus {
    /// Still being edited; not visible to respondents.
    #[default]
    Draft,
    /// Frozen and available to respondents.
    Published,
}

impl FormStatus {
    /// Returns the canonical lowercase label, as stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
        }
    }
}

impl fmt::Display for FormStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormStatus {
    type Err = ParseFormStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            _ => Err(ParseFormStatusError(s.to_string())),
        }
    }
}

/// Error returned when parsing an unknown form status string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown form status: {0}")]
pub struct ParseFormStatusError(pub String);
